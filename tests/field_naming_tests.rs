// The field-name derivation is a cross-implementation contract: the hash
// must equal the host's String.hashCode bit-for-bit, and the derived names
// must stay inside their documented shapes.

mod common;

use anyhow::Result;
use common::build_carrier;
use ghostclass::classfile::parse;
use ghostclass::conceal::naming::{derive_field_names, hash_str};
use ghostclass::conceal_sbox;

#[test]
fn hash_agrees_with_host_string_hash_vectors() {
    // values computed with java.lang.String#hashCode
    assert_eq!(hash_str(""), 0);
    assert_eq!(hash_str("A"), 65);
    assert_eq!(hash_str("Ab"), 2113);
    assert_eq!(hash_str("TestClass"), 797_745_126);
    assert_eq!(hash_str("Alpha"), 63_357_246);
    assert_eq!(hash_str("Beta"), 2_066_960);
    assert_eq!(hash_str("Ghost"), 68_778_607);
    assert_eq!(hash_str("com/example/Test"), 520_500_229);
    assert_eq!(hash_str("java/lang/Object"), 2_080_463_411);
    assert_eq!(hash_str("Carrier"), -2_075_953_448);
}

#[test]
fn injected_field_names_match_the_derivation() -> Result<()> {
    for name in ["TestClass", "Alpha", "Beta", "com/example/Test"] {
        let units: Vec<u16> = name.encode_utf16().collect();
        let (table_name, check_name) = derive_field_names(&units);

        let emitted = conceal_sbox(&build_carrier(name), b"naming probe")?;
        let class = parse(&emitted)?;
        let names: Vec<String> = class
            .fields
            .iter()
            .filter_map(|f| class.constant_pool.utf8_at(f.name_index))
            .collect();
        assert!(names.contains(&table_name), "{name}: missing {table_name} in {names:?}");
        assert!(names.contains(&check_name), "{name}: missing {check_name} in {names:?}");
    }
    Ok(())
}

#[test]
fn derived_names_fit_the_documented_regexes() {
    for name in ["Alpha", "Beta", "Ghost", "a/b/C", "Name$Inner", "x", ""] {
        let units: Vec<u16> = name.encode_utf16().collect();
        let (table, check) = derive_field_names(&units);
        let t = table.as_bytes();
        assert_eq!(t.len(), 3);
        assert_eq!(t[0], b'_');
        assert!(t[1] == b'T' || t[1] == b'S');
        assert!(t[2].is_ascii_digit());
        let c = check.as_bytes();
        assert_eq!(c.len(), 3);
        assert_eq!(c[0], b'_');
        assert!(c[1].is_ascii_lowercase());
        assert_eq!(c[2], b'k');
    }
}

#[test]
fn hash_distance_separates_field_names() {
    // Alpha (63357246) and Beta (2066960) differ mod 10 and mod 26
    let alpha: Vec<u16> = "Alpha".encode_utf16().collect();
    let beta: Vec<u16> = "Beta".encode_utf16().collect();
    let (alpha_table, alpha_check) = derive_field_names(&alpha);
    let (beta_table, beta_check) = derive_field_names(&beta);
    assert_ne!(alpha_table, beta_table);
    assert_ne!(alpha_check, beta_check);
}
