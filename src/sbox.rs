//! S-Box payload table codec
//!
//! Encodes an opaque byte string into an `int[]` shaped like a cryptographic
//! substitution table. The table carries no plaintext marker: the payload
//! length hides in `table[0] ^ table[N-1]` and a CRC32 in slot 1 guards the
//! extraction.
//!
//! Layout:
//! - slot 0: random validation component
//! - slot 1: CRC32 of the payload (signed reinterpretation)
//! - slots 2..: payload bytes packed big-endian, four per int
//! - remaining slots: random noise
//! - last slot: `slot[0] ^ payload_len`

use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::common::error::{Error, Result};

/// Table sizes that mimic real crypto lookup tables
pub const SIZE_128: usize = 128;
pub const SIZE_192: usize = 192;
pub const SIZE_256: usize = 256;

// Two header slots (random component + CRC32) and one trailing signature slot
// never hold payload bytes.
const RESERVED_SLOTS: usize = 3;

/// Capacity in payload bytes of a table with `table_size` slots.
pub fn max_payload_size(table_size: usize) -> usize {
    (table_size - RESERVED_SLOTS) * 4
}

/// Smallest table that fits `payload_len` bytes. Oversized payloads still
/// map to the largest table; `encode` rejects them against its capacity.
pub fn select_table_size(payload_len: usize) -> usize {
    if payload_len <= max_payload_size(SIZE_128) {
        SIZE_128
    } else if payload_len <= max_payload_size(SIZE_192) {
        SIZE_192
    } else {
        SIZE_256
    }
}

pub fn is_valid_table_size(size: usize) -> bool {
    size == SIZE_128 || size == SIZE_192 || size == SIZE_256
}

/// Encode a payload into a fake S-Box table.
///
/// Two encodes of the same payload differ in slot 0, the last slot, and the
/// noise region; the packed payload and CRC32 slots are deterministic.
pub fn encode(payload: &[u8]) -> Result<Vec<i32>> {
    let table_size = select_table_size(payload.len());
    let capacity = max_payload_size(table_size);
    if payload.len() > capacity {
        return Err(Error::PayloadTooLarge { size: payload.len(), max: capacity });
    }

    let mut table = vec![0i32; table_size];
    table[0] = OsRng.next_u32() as i32;
    table[1] = crc32fast::hash(payload) as i32;

    let payload_ints = payload.len().div_ceil(4);
    for (i, chunk) in payload.chunks(4).enumerate() {
        let mut value = 0i32;
        for (b, &byte) in chunk.iter().enumerate() {
            value |= (byte as i32) << (24 - b * 8);
        }
        table[2 + i] = value;
    }

    for slot in table.iter_mut().take(table_size - 1).skip(2 + payload_ints) {
        *slot = OsRng.next_u32() as i32;
    }

    table[table_size - 1] = table[0] ^ payload.len() as i32;

    debug!("encoded {} payload bytes into a {table_size}-entry table", payload.len());
    Ok(table)
}

/// Decode a payload from an S-Box table, verifying size, the implicit
/// length signature, and the CRC32.
pub fn decode(table: &[i32]) -> Result<Vec<u8>> {
    if !is_valid_table_size(table.len()) {
        return Err(Error::BadSize { size: table.len() });
    }

    let capacity = max_payload_size(table.len());
    let payload_len = table[0] ^ table[table.len() - 1];
    if payload_len < 0 || payload_len as usize > capacity {
        return Err(Error::BadLength { length: payload_len as i64, available: capacity });
    }
    let payload_len = payload_len as usize;

    let mut payload = Vec::with_capacity(payload_len);
    for i in 0..payload_len {
        let value = table[2 + i / 4];
        payload.push((value >> (24 - (i % 4) * 8)) as u8);
    }

    let stored = table[1] as u32;
    let computed = crc32fast::hash(&payload);
    if stored != computed {
        return Err(Error::BadChecksum { stored, computed });
    }

    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_payload() {
        let payload = b"Hello S-Box World!";
        let table = encode(payload).unwrap();
        assert_eq!(decode(&table).unwrap(), payload);
    }

    #[test]
    fn implicit_signature_encodes_length() {
        let payload = b"Test data";
        let table = encode(payload).unwrap();
        assert_eq!(table[0] ^ table[table.len() - 1], payload.len() as i32);
    }

    #[test]
    fn crc_slot_holds_payload_checksum() {
        let payload: Vec<u8> = (0u8..=255).collect();
        let table = encode(&payload).unwrap();
        assert_eq!(table[1], 0x29058C73u32 as i32);
    }

    #[test]
    fn table_size_selection_boundaries() {
        assert_eq!(select_table_size(0), SIZE_128);
        assert_eq!(select_table_size(500), SIZE_128);
        assert_eq!(select_table_size(501), SIZE_192);
        assert_eq!(select_table_size(756), SIZE_192);
        assert_eq!(select_table_size(757), SIZE_256);
        assert_eq!(select_table_size(1012), SIZE_256);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let payload = vec![0x42u8; 1013];
        let err = encode(&payload).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { size: 1013, max: 1012 }));
    }

    #[test]
    fn empty_payload_round_trips() {
        let table = encode(&[]).unwrap();
        assert_eq!(table.len(), SIZE_128);
        assert_eq!(decode(&table).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn two_encodes_differ_in_random_slots() {
        let payload = b"Same payload";
        let a = encode(payload).unwrap();
        let b = encode(payload).unwrap();
        assert_ne!(a[0], b[0]);
        assert_ne!(a[a.len() - 1], b[b.len() - 1]);
        // noise region starts after the packed payload
        let noise_start = 2 + payload.len().div_ceil(4);
        assert_ne!(&a[noise_start..a.len() - 1], &b[noise_start..b.len() - 1]);
        assert_eq!(decode(&a).unwrap(), decode(&b).unwrap());
    }

    #[test]
    fn corrupted_signature_fails_decode() {
        let mut table = encode(b"Valid payload").unwrap();
        let last = table.len() - 1;
        table[last] ^= 0x12345678;
        assert!(matches!(
            decode(&table),
            Err(Error::BadLength { .. }) | Err(Error::BadChecksum { .. })
        ));
    }

    #[test]
    fn corrupted_payload_slot_fails_checksum() {
        let mut table = encode(b"Valid payload").unwrap();
        table[2] ^= 1;
        assert!(matches!(decode(&table), Err(Error::BadChecksum { .. })));
    }

    #[test]
    fn corrupted_crc_slot_fails_checksum() {
        let mut table = encode(b"Valid payload").unwrap();
        table[1] ^= 1;
        assert!(matches!(decode(&table), Err(Error::BadChecksum { .. })));
    }

    #[test]
    fn wrong_table_size_is_rejected() {
        assert!(matches!(decode(&[0i32; 64]), Err(Error::BadSize { size: 64 })));
    }
}
