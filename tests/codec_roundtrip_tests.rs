// Codec round-trip guarantees: parse then serialize reproduces the input
// byte-for-byte, and foreign attributes survive untouched.

mod common;

use anyhow::Result;
use common::{build_carrier, build_carrier_with_clinit, build_carrier_with_ping};
use ghostclass::classfile::{class_file_to_bytes, parse};

#[test]
fn carriers_round_trip_byte_for_byte() -> Result<()> {
    for bytes in [
        build_carrier("TestClass"),
        build_carrier("com/example/Test"),
        build_carrier_with_clinit("ClinitCarrier"),
        build_carrier_with_ping("PingCarrier"),
    ] {
        let class = parse(&bytes)?;
        assert_eq!(class_file_to_bytes(&class), bytes);
    }
    Ok(())
}

#[test]
fn concealed_outputs_round_trip_byte_for_byte() -> Result<()> {
    let carrier = build_carrier("TestClass");
    for bytes in [
        ghostclass::conceal_attribute(&carrier, b"round trip me")?,
        ghostclass::conceal_sbox(&carrier, b"round trip me")?,
    ] {
        let class = parse(&bytes)?;
        assert_eq!(class_file_to_bytes(&class), bytes);
    }
    Ok(())
}

#[test]
fn foreign_attribute_survives_a_round_trip() -> Result<()> {
    let mut class = parse(&build_carrier("TestClass"))?;
    class.append_attribute("VendorMetadata", vec![0xDE, 0xAD, 0xBE, 0xEF])?;
    let emitted = class_file_to_bytes(&class);

    let reparsed = parse(&emitted)?;
    let attr = reparsed.find_attribute("VendorMetadata").expect("attribute kept");
    assert_eq!(attr.info, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(class_file_to_bytes(&reparsed), emitted);
    Ok(())
}

#[test]
fn truncated_input_fails_to_parse() {
    let bytes = build_carrier("TestClass");
    for cut in [0, 3, 9, bytes.len() / 2, bytes.len() - 1] {
        assert!(parse(&bytes[..cut]).is_err(), "prefix of {cut} bytes parsed");
    }
}

#[test]
fn trailing_garbage_fails_to_parse() {
    let mut bytes = build_carrier("TestClass");
    bytes.push(0);
    assert!(parse(&bytes).is_err());
}

#[test]
fn class_name_resolves_through_the_pool() -> anyhow::Result<()> {
    let class = parse(&build_carrier("com/example/Test"))?;
    assert_eq!(class.class_name().as_deref(), Some("com/example/Test"));
    Ok(())
}
