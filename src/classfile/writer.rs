//! Class-file serializer
//!
//! Emits sections in file order. Sections the caller never touched come back
//! from their parsed representation byte-for-byte.

use super::class::ClassFile;

pub fn class_file_to_bytes(class: &ClassFile) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&class.magic.to_be_bytes());
    bytes.extend_from_slice(&class.minor_version.to_be_bytes());
    bytes.extend_from_slice(&class.major_version.to_be_bytes());
    bytes.extend_from_slice(&class.constant_pool.to_bytes());
    bytes.extend_from_slice(&class.access_flags.to_be_bytes());
    bytes.extend_from_slice(&class.this_class.to_be_bytes());
    bytes.extend_from_slice(&class.super_class.to_be_bytes());
    bytes.extend_from_slice(&(class.interfaces.len() as u16).to_be_bytes());
    for interface in &class.interfaces {
        bytes.extend_from_slice(&interface.to_be_bytes());
    }
    bytes.extend_from_slice(&(class.fields.len() as u16).to_be_bytes());
    for field in &class.fields {
        bytes.extend_from_slice(&field.to_bytes());
    }
    bytes.extend_from_slice(&(class.methods.len() as u16).to_be_bytes());
    for method in &class.methods {
        bytes.extend_from_slice(&method.to_bytes());
    }
    bytes.extend_from_slice(&(class.attributes.len() as u16).to_be_bytes());
    for attribute in &class.attributes {
        bytes.extend_from_slice(&attribute.to_bytes());
    }
    bytes
}
