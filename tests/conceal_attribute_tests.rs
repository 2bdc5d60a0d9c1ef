// Attribute-mode conceal/reveal: container layout, replacement semantics,
// corruption reporting, and the auto-reveal fallback.

mod common;

use anyhow::Result;
use common::build_carrier;
use ghostclass::classfile::parse;
use ghostclass::{conceal_attribute, reveal_attribute, reveal_auto, Error};

const CONTAINER: [u8; 17] = [
    0x47, 0x50, 0x48, 0x01, 0x00, 0x00, 0x00, 0x09, 0x54, 0x65, 0x73, 0x74, 0x20, 0x64, 0x61,
    0x74, 0x61,
];

#[test]
fn conceals_nine_ascii_bytes_in_a_ghost_payload_attribute() -> Result<()> {
    let carrier = build_carrier("TestClass");
    let emitted = conceal_attribute(&carrier, b"Test data")?;
    assert!(emitted.len() >= carrier.len() + 8);

    let class = parse(&emitted)?;
    let matches: Vec<_> = class
        .attributes
        .iter()
        .filter(|a| class.attribute_name(a).as_deref() == Some("GhostPayload"))
        .collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].info, CONTAINER);

    assert_eq!(reveal_attribute(&emitted)?, b"Test data");
    Ok(())
}

#[test]
fn reconceal_replaces_the_existing_container() -> Result<()> {
    let carrier = build_carrier("TestClass");
    let first = conceal_attribute(&carrier, b"first secret")?;
    let second = conceal_attribute(&first, b"second secret")?;

    assert_eq!(reveal_attribute(&second)?, b"second secret");
    let class = parse(&second)?;
    let count = class
        .attributes
        .iter()
        .filter(|a| class.attribute_name(a).as_deref() == Some("GhostPayload"))
        .count();
    assert_eq!(count, 1);
    Ok(())
}

#[test]
fn conceal_is_deterministic() -> Result<()> {
    let carrier = build_carrier("TestClass");
    let a = conceal_attribute(&carrier, b"same inputs")?;
    let b = conceal_attribute(&carrier, b"same inputs")?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn empty_payload_round_trips() -> Result<()> {
    let carrier = build_carrier("TestClass");
    let emitted = conceal_attribute(&carrier, &[])?;
    assert_eq!(reveal_attribute(&emitted)?, Vec::<u8>::new());
    Ok(())
}

#[test]
fn large_payload_round_trips() -> Result<()> {
    let carrier = build_carrier("TestClass");
    let payload: Vec<u8> = (0..100_000u32).map(|i| (i * 31) as u8).collect();
    let emitted = conceal_attribute(&carrier, &payload)?;
    assert_eq!(reveal_attribute(&emitted)?, payload);
    Ok(())
}

#[test]
fn clean_carrier_reveals_no_payload() {
    let carrier = build_carrier("TestClass");
    assert!(matches!(reveal_attribute(&carrier), Err(Error::NoPayload)));
    assert!(matches!(reveal_auto(&carrier), Err(Error::NoPayload)));
}

#[test]
fn unparseable_carrier_is_a_parse_error() {
    assert!(matches!(reveal_attribute(&[1, 2, 3]), Err(Error::Parse { .. })));
    assert!(matches!(reveal_auto(&[1, 2, 3]), Err(Error::Parse { .. })));
}

fn find_container(haystack: &[u8]) -> usize {
    haystack
        .windows(4)
        .position(|w| w == [0x47, 0x50, 0x48, 0x01])
        .expect("container magic present")
}

#[test]
fn flipped_magic_bit_yields_bad_magic_with_both_values() -> Result<()> {
    let carrier = build_carrier("TestClass");
    let mut emitted = conceal_attribute(&carrier, b"Test data")?;
    let at = find_container(&emitted);
    emitted[at] ^= 0x20;
    match reveal_attribute(&emitted) {
        Err(Error::BadMagic { expected, found }) => {
            assert_eq!(expected, 0x4750_4801);
            assert_eq!(found, 0x6750_4801);
        }
        other => panic!("expected BadMagic, got {other:?}"),
    }
    Ok(())
}

#[test]
fn inflated_length_yields_bad_length() -> Result<()> {
    let carrier = build_carrier("TestClass");
    let mut emitted = conceal_attribute(&carrier, b"Test data")?;
    let at = find_container(&emitted);
    // declared length 9 -> 0x0909: exceeds the container body
    emitted[at + 6] = 0x09;
    match reveal_attribute(&emitted) {
        Err(Error::BadLength { length, available }) => {
            assert_eq!(length, 0x0909);
            assert_eq!(available, 9);
        }
        other => panic!("expected BadLength, got {other:?}"),
    }
    Ok(())
}

#[test]
fn auto_reveal_finds_the_attribute_payload() -> Result<()> {
    let carrier = build_carrier("TestClass");
    let emitted = conceal_attribute(&carrier, b"via auto")?;
    assert_eq!(reveal_auto(&emitted)?, b"via auto");
    Ok(())
}
