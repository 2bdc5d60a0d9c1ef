//! Attribute-mode concealment
//!
//! The payload rides in a single class-level attribute named `GhostPayload`.
//! The host loader ignores attributes it does not recognize, so the class
//! loads and runs unchanged. The attribute body is a versioned container:
//! 4-byte magic, 4-byte big-endian length, then the payload verbatim.

use log::debug;

use crate::classfile::visitor::{accept, ClassVisitor};
use crate::classfile::{class_file_to_bytes, parse, AttributeInfo, ClassFile};
use crate::common::error::{Error, Result};

/// The attribute name used in the class file
pub const ATTRIBUTE_NAME: &str = "GhostPayload";

/// Container magic: "GPH" + version 1
pub const CONTAINER_MAGIC: u32 = 0x4750_4801;

/// Magic and length prefix
pub const CONTAINER_HEADER_LEN: usize = 8;

/// Largest payload the container can declare; the length field is read back
/// as a signed 32-bit value.
pub const MAX_PAYLOAD: usize = i32::MAX as usize - CONTAINER_HEADER_LEN;

/// Build the container body: `[MAGIC:4][LENGTH:4][DATA:N]`.
pub fn build_container(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD {
        return Err(Error::PayloadTooLarge { size: payload.len(), max: MAX_PAYLOAD });
    }
    let mut container = Vec::with_capacity(CONTAINER_HEADER_LEN + payload.len());
    container.extend_from_slice(&CONTAINER_MAGIC.to_be_bytes());
    container.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    container.extend_from_slice(payload);
    Ok(container)
}

/// Validate a container body and return the payload bytes.
pub fn parse_container(container: &[u8]) -> Result<&[u8]> {
    if container.len() < CONTAINER_HEADER_LEN {
        return Err(Error::corrupted(format!(
            "container is {} bytes, need at least {CONTAINER_HEADER_LEN}",
            container.len()
        )));
    }
    let magic = u32::from_be_bytes([container[0], container[1], container[2], container[3]]);
    if magic != CONTAINER_MAGIC {
        return Err(Error::BadMagic { expected: CONTAINER_MAGIC, found: magic });
    }
    let declared = i32::from_be_bytes([container[4], container[5], container[6], container[7]]);
    let available = container.len() - CONTAINER_HEADER_LEN;
    if declared < 0 || declared as usize > available {
        return Err(Error::BadLength { length: declared as i64, available });
    }
    Ok(&container[CONTAINER_HEADER_LEN..CONTAINER_HEADER_LEN + declared as usize])
}

/// Conceal `payload` in `class_bytes` as a `GhostPayload` attribute.
///
/// Any attribute of that name already present is replaced, never duplicated,
/// so reveal-then-reconceal keeps exactly one container in the class.
pub fn conceal(class_bytes: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let mut class = parse(class_bytes)?;
    let container = build_container(payload)?;
    class.remove_attributes_named(ATTRIBUTE_NAME);
    class.append_attribute(ATTRIBUTE_NAME, container)?;
    debug!("concealed {} payload bytes in a {ATTRIBUTE_NAME} attribute", payload.len());
    Ok(class_file_to_bytes(&class))
}

struct ContainerScan {
    container: Option<Vec<u8>>,
}

impl ClassVisitor for ContainerScan {
    fn visit_attribute(&mut self, class: &ClassFile, attribute: &AttributeInfo) {
        if self.container.is_none() && class.constant_pool.utf8_eq(attribute.name_index, ATTRIBUTE_NAME)
        {
            self.container = Some(attribute.info.clone());
        }
    }
}

/// Recover the payload concealed by [`conceal`].
pub fn reveal(class_bytes: &[u8]) -> Result<Vec<u8>> {
    let class = parse(class_bytes)?;
    let mut scan = ContainerScan { container: None };
    accept(&class, &mut scan);
    let container = scan.container.ok_or(Error::NoPayload)?;
    parse_container(&container).map(|payload| payload.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_lays_out_magic_length_payload() {
        let container = build_container(b"Test data").unwrap();
        assert_eq!(
            container,
            [
                0x47, 0x50, 0x48, 0x01, 0x00, 0x00, 0x00, 0x09, 0x54, 0x65, 0x73, 0x74, 0x20,
                0x64, 0x61, 0x74, 0x61
            ]
        );
        assert_eq!(parse_container(&container).unwrap(), b"Test data");
    }

    #[test]
    fn short_container_is_corrupted() {
        let err = parse_container(&[0x47, 0x50]).unwrap_err();
        assert!(matches!(err, Error::Corrupted { .. }));
    }

    #[test]
    fn flipped_magic_reports_both_values() {
        let mut container = build_container(b"x").unwrap();
        container[0] ^= 0x01;
        match parse_container(&container).unwrap_err() {
            Error::BadMagic { expected, found } => {
                assert_eq!(expected, CONTAINER_MAGIC);
                assert_eq!(found, 0x4650_4801);
            }
            other => panic!("expected BadMagic, got {other:?}"),
        }
    }

    #[test]
    fn overlong_declared_length_is_rejected() {
        let mut container = build_container(b"abc").unwrap();
        container[7] = 200;
        match parse_container(&container).unwrap_err() {
            Error::BadLength { length, available } => {
                assert_eq!(length, 200);
                assert_eq!(available, 3);
            }
            other => panic!("expected BadLength, got {other:?}"),
        }
    }

    #[test]
    fn negative_declared_length_is_rejected() {
        let mut container = build_container(b"abc").unwrap();
        container[4] = 0x80;
        assert!(matches!(parse_container(&container).unwrap_err(), Error::BadLength { .. }));
    }

    #[test]
    fn container_tolerates_trailing_slack() {
        // a re-written attribute may be longer than its declared payload
        let mut container = build_container(b"abc").unwrap();
        container.extend_from_slice(&[0, 0]);
        assert_eq!(parse_container(&container).unwrap(), b"abc");
    }
}
