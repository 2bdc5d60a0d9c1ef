//! Method table checks, including Code attribute framing

use std::collections::HashSet;

use crate::classfile::attribute::CodeAttribute;
use crate::classfile::class::ClassFile;
use crate::classfile::constpool::Constant;
use crate::classfile::defs::attribute_names;
use crate::classfile::frame::StackMapTable;

#[derive(thiserror::Error, Debug)]
pub enum MethodVerifyError {
    #[error("Method {0} name index {1} is not a Utf8 entry")]
    InvalidNameIndex(usize, u16),
    #[error("Method {0} descriptor index {1} is not a Utf8 entry")]
    InvalidDescriptorIndex(usize, u16),
    #[error("Method {0} attribute name index {1} is not a Utf8 entry")]
    InvalidAttributeNameIndex(usize, u16),
    #[error("Duplicate method {name}{descriptor}")]
    DuplicateMethod { name: String, descriptor: String },
    #[error("Method {0} carries {1} Code attributes")]
    MultipleCodeAttributes(usize, usize),
    #[error("Method {0} Code attribute is malformed: {1}")]
    MalformedCode(usize, String),
    #[error("Method {0} Code attribute has an empty body")]
    EmptyCode(usize),
    #[error("Method {method} exception handler range {start}..{end}/{handler} exceeds code length {len}")]
    HandlerOutOfRange { method: usize, start: u16, end: u16, handler: u16, len: usize },
    #[error("Method {0} exception handler catch type {1} is not a Class entry")]
    BadCatchType(usize, u16),
    #[error("Method {0} StackMapTable is malformed: {1}")]
    MalformedStackMapTable(usize, String),
}

pub fn verify(class_file: &ClassFile) -> Vec<MethodVerifyError> {
    use MethodVerifyError::*;
    let pool = &class_file.constant_pool;
    let mut errors = Vec::new();
    let mut seen: HashSet<(Vec<u8>, Vec<u8>)> = HashSet::new();

    for (i, method) in class_file.methods.iter().enumerate() {
        let name = pool.utf8_bytes_at(method.name_index);
        if name.is_none() {
            errors.push(InvalidNameIndex(i, method.name_index));
        }
        let descriptor = pool.utf8_bytes_at(method.descriptor_index);
        if descriptor.is_none() {
            errors.push(InvalidDescriptorIndex(i, method.descriptor_index));
        }
        if let (Some(name), Some(descriptor)) = (name, descriptor) {
            if !seen.insert((name.to_vec(), descriptor.to_vec())) {
                errors.push(DuplicateMethod {
                    name: pool.utf8_at(method.name_index).unwrap_or_default(),
                    descriptor: pool.utf8_at(method.descriptor_index).unwrap_or_default(),
                });
            }
        }

        let mut code_attrs = 0usize;
        for attribute in &method.attributes {
            if pool.utf8_bytes_at(attribute.name_index).is_none() {
                errors.push(InvalidAttributeNameIndex(i, attribute.name_index));
                continue;
            }
            if !pool.utf8_eq(attribute.name_index, attribute_names::CODE) {
                continue;
            }
            code_attrs += 1;
            let code = match CodeAttribute::parse(&attribute.info) {
                Ok(code) => code,
                Err(err) => {
                    errors.push(MalformedCode(i, err.to_string()));
                    continue;
                }
            };
            if code.code.is_empty() {
                errors.push(EmptyCode(i));
            }
            for entry in &code.exception_table {
                let len = code.code.len();
                if entry.start_pc as usize >= len
                    || entry.end_pc as usize > len
                    || entry.handler_pc as usize >= len
                {
                    errors.push(HandlerOutOfRange {
                        method: i,
                        start: entry.start_pc,
                        end: entry.end_pc,
                        handler: entry.handler_pc,
                        len,
                    });
                }
                if entry.catch_type != 0
                    && !matches!(pool.get(entry.catch_type), Some(Constant::Class(_)))
                {
                    errors.push(BadCatchType(i, entry.catch_type));
                }
            }
            for inner in &code.attributes {
                if pool.utf8_eq(inner.name_index, attribute_names::STACK_MAP_TABLE) {
                    if let Err(err) = StackMapTable::parse(&inner.info) {
                        errors.push(MalformedStackMapTable(i, err.to_string()));
                    }
                }
            }
        }
        if code_attrs > 1 {
            errors.push(MultipleCodeAttributes(i, code_attrs));
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::attribute::AttributeInfo;
    use crate::classfile::defs::access_flags::ACC_STATIC;
    use crate::classfile::method::MethodInfo;
    use crate::classfile::opcodes::RETURN;

    #[test]
    fn empty_code_body_is_reported() {
        let mut class = ClassFile::new();
        let name = class.constant_pool.try_add_utf8("run").unwrap();
        let descriptor = class.constant_pool.try_add_utf8("()V").unwrap();
        let code_name = class.constant_pool.try_add_utf8("Code").unwrap();
        let mut method = MethodInfo::new(ACC_STATIC, name, descriptor);
        let code = CodeAttribute::new(0, 0, Vec::new());
        method.attributes.push(AttributeInfo::new(code_name, code.to_bytes()));
        class.methods.push(method);
        assert!(verify(&class).iter().any(|e| matches!(e, MethodVerifyError::EmptyCode(0))));
    }

    #[test]
    fn sound_method_passes() {
        let mut class = ClassFile::new();
        let code = CodeAttribute::new(0, 0, vec![RETURN]);
        class.append_static_initializer(code).unwrap();
        assert!(verify(&class).is_empty());
    }
}
