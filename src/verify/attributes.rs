//! Class-level attribute checks

use crate::classfile::class::ClassFile;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AttributeVerifyError {
    #[error("Class attribute {0} name index {1} is not a Utf8 entry")]
    InvalidNameIndex(usize, u16),
}

pub fn verify(class_file: &ClassFile) -> Vec<AttributeVerifyError> {
    let pool = &class_file.constant_pool;
    let mut errors = Vec::new();
    for (i, attribute) in class_file.attributes.iter().enumerate() {
        if pool.utf8_bytes_at(attribute.name_index).is_none() {
            errors.push(AttributeVerifyError::InvalidNameIndex(i, attribute.name_index));
        }
    }
    errors
}
