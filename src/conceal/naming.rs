//! Deterministic field-name derivation
//!
//! Both injected fields get names seeded by the carrier's class name, so two
//! carriers disguise their payload under different, crypto-plausible
//! identifiers while extraction can re-derive them from the class alone.

/// The host VM's canonical 32-bit string hash: polynomial with multiplier
/// 31, seed 0, over UTF-16 code units. Must match bit-for-bit or classes
/// concealed by one implementation fail extraction by another.
pub fn utf16_hash(units: &[u16]) -> i32 {
    units.iter().fold(0i32, |h, &u| h.wrapping_mul(31).wrapping_add(u as i32))
}

/// Hash of a Rust string as the host would hash it.
pub fn hash_str(s: &str) -> i32 {
    let units: Vec<u16> = s.encode_utf16().collect();
    utf16_hash(&units)
}

/// Derive `(table_field, check_field)` from the internal class name.
///
/// Table field: `_T<d>` for even hashes, `_S<d>` for odd, `d = |h| mod 10`.
/// Check field: `_<c>k` with `c = 'a' + (|h| mod 26)`.
/// The magnitude is `unsigned_abs`, which keeps `d` and `c` in range for
/// every hash value including `i32::MIN`.
pub fn derive_field_names(class_name_units: &[u16]) -> (String, String) {
    let hash = utf16_hash(class_name_units);
    let magnitude = hash.unsigned_abs();

    let prefix = if hash % 2 == 0 { "_T" } else { "_S" };
    let table_field = format!("{prefix}{}", magnitude % 10);

    let check_char = (b'a' + (magnitude % 26) as u8) as char;
    let check_field = format!("_{check_char}k");

    (table_field, check_field)
}
