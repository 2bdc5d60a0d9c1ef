//! Field table checks

use std::collections::HashSet;

use crate::classfile::class::ClassFile;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FieldVerifyError {
    #[error("Field {0} name index {1} is not a Utf8 entry")]
    InvalidNameIndex(usize, u16),
    #[error("Field {0} descriptor index {1} is not a Utf8 entry")]
    InvalidDescriptorIndex(usize, u16),
    #[error("Field {0} has an empty or malformed descriptor")]
    MalformedDescriptor(usize),
    #[error("Field {0} attribute name index {1} is not a Utf8 entry")]
    InvalidAttributeNameIndex(usize, u16),
    #[error("Duplicate field {name}:{descriptor}")]
    DuplicateField { name: String, descriptor: String },
}

pub fn verify(class_file: &ClassFile) -> Vec<FieldVerifyError> {
    use FieldVerifyError::*;
    let pool = &class_file.constant_pool;
    let mut errors = Vec::new();
    let mut seen: HashSet<(Vec<u8>, Vec<u8>)> = HashSet::new();

    for (i, field) in class_file.fields.iter().enumerate() {
        let name = pool.utf8_bytes_at(field.name_index);
        if name.is_none() {
            errors.push(InvalidNameIndex(i, field.name_index));
        }
        match pool.utf8_bytes_at(field.descriptor_index) {
            None => errors.push(InvalidDescriptorIndex(i, field.descriptor_index)),
            Some(descriptor) => {
                if !matches!(
                    descriptor.first(),
                    Some(b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b'L' | b'[')
                ) {
                    errors.push(MalformedDescriptor(i));
                }
                if let Some(name) = name {
                    if !seen.insert((name.to_vec(), descriptor.to_vec())) {
                        errors.push(DuplicateField {
                            name: pool.utf8_at(field.name_index).unwrap_or_default(),
                            descriptor: pool.utf8_at(field.descriptor_index).unwrap_or_default(),
                        });
                    }
                }
            }
        }
        for attribute in &field.attributes {
            if pool.utf8_bytes_at(attribute.name_index).is_none() {
                errors.push(InvalidAttributeNameIndex(i, attribute.name_index));
            }
        }
    }
    errors
}
