//! Constant pool and constants for Java class files
//!
//! The pool is grow-only: parsing records every entry in file order and
//! concealment appends at the end, so untouched indices never move and an
//! unmodified pool serializes back byte-for-byte.

use std::collections::HashMap;
use thiserror::Error;

/// Hard cap on pool entries; `constant_pool_count` is a u16 equal to len + 1.
pub const MAX_POOL_ENTRIES: usize = (u16::MAX as usize) - 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConstPoolError {
    #[error("Constant pool size limit exceeded: current={current}, adding={adding}, max={max}")]
    SizeLimitExceeded { current: usize, adding: usize, max: usize },
}

pub mod constant_tags {
    pub const CONSTANT_UTF8: u8 = 1;
    pub const CONSTANT_INTEGER: u8 = 3;
    pub const CONSTANT_FLOAT: u8 = 4;
    pub const CONSTANT_LONG: u8 = 5;
    pub const CONSTANT_DOUBLE: u8 = 6;
    pub const CONSTANT_CLASS: u8 = 7;
    pub const CONSTANT_STRING: u8 = 8;
    pub const CONSTANT_FIELDREF: u8 = 9;
    pub const CONSTANT_METHODREF: u8 = 10;
    pub const CONSTANT_INTERFACEMETHODREF: u8 = 11;
    pub const CONSTANT_NAMEANDTYPE: u8 = 12;
    pub const CONSTANT_METHODHANDLE: u8 = 15;
    pub const CONSTANT_METHODTYPE: u8 = 16;
    pub const CONSTANT_DYNAMIC: u8 = 17;
    pub const CONSTANT_INVOKEDYNAMIC: u8 = 18;
    pub const CONSTANT_MODULE: u8 = 19;
    pub const CONSTANT_PACKAGE: u8 = 20;
}

/// A single constant pool entry.
///
/// Utf8 carries the raw modified-UTF-8 bytes from the file: they are not
/// always valid Rust UTF-8, and the round-trip guarantee needs them verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(Vec<u8>),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    Module(u16),
    Package(u16),
    /// Phantom slot after a Long or Double entry (JVMS 4.4.5); emits nothing.
    Placeholder,
}

impl Constant {
    pub fn to_bytes(&self) -> Vec<u8> {
        use constant_tags::*;
        let mut bytes = Vec::new();
        match self {
            Constant::Utf8(raw) => {
                bytes.push(CONSTANT_UTF8);
                bytes.extend_from_slice(&(raw.len() as u16).to_be_bytes());
                bytes.extend_from_slice(raw);
            }
            Constant::Integer(value) => {
                bytes.push(CONSTANT_INTEGER);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Float(value) => {
                bytes.push(CONSTANT_FLOAT);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Long(value) => {
                bytes.push(CONSTANT_LONG);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Double(value) => {
                bytes.push(CONSTANT_DOUBLE);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Class(name_index) => {
                bytes.push(CONSTANT_CLASS);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::String(string_index) => {
                bytes.push(CONSTANT_STRING);
                bytes.extend_from_slice(&string_index.to_be_bytes());
            }
            Constant::FieldRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_FIELDREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::MethodRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_METHODREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::InterfaceMethodRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_INTERFACEMETHODREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::NameAndType(name_index, descriptor_index) => {
                bytes.push(CONSTANT_NAMEANDTYPE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
                bytes.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            Constant::MethodHandle(reference_kind, reference_index) => {
                bytes.push(CONSTANT_METHODHANDLE);
                bytes.push(*reference_kind);
                bytes.extend_from_slice(&reference_index.to_be_bytes());
            }
            Constant::MethodType(descriptor_index) => {
                bytes.push(CONSTANT_METHODTYPE);
                bytes.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            Constant::Dynamic(bootstrap_index, name_and_type_index) => {
                bytes.push(CONSTANT_DYNAMIC);
                bytes.extend_from_slice(&bootstrap_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::InvokeDynamic(bootstrap_index, name_and_type_index) => {
                bytes.push(CONSTANT_INVOKEDYNAMIC);
                bytes.extend_from_slice(&bootstrap_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::Module(name_index) => {
                bytes.push(CONSTANT_MODULE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::Package(name_index) => {
                bytes.push(CONSTANT_PACKAGE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::Placeholder => {}
        }
        bytes
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    pub(crate) constants: Vec<Constant>,
    utf8_map: HashMap<Vec<u8>, u16>,
    integer_map: HashMap<i32, u16>,
    long_map: HashMap<i64, u16>,
    class_map: HashMap<Vec<u8>, u16>,
    name_and_type_map: HashMap<(u16, u16), u16>,
    fieldref_map: HashMap<(u16, u16), u16>,
    methodref_map: HashMap<(u16, u16), u16>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a pool from entries read off a class file, indexing the
    /// existing entries so later additions intern instead of duplicating.
    pub fn from_entries(constants: Vec<Constant>) -> Self {
        let mut pool = Self { constants, ..Self::default() };
        for pos in 0..pool.constants.len() {
            let idx = (pos + 1) as u16;
            match pool.constants[pos].clone() {
                Constant::Utf8(raw) => {
                    pool.utf8_map.entry(raw).or_insert(idx);
                }
                Constant::Integer(v) => {
                    pool.integer_map.entry(v).or_insert(idx);
                }
                Constant::Long(v) => {
                    pool.long_map.entry(v).or_insert(idx);
                }
                Constant::Class(name_index) => {
                    let name = pool.utf8_bytes_at(name_index).map(|raw| raw.to_vec());
                    if let Some(name) = name {
                        pool.class_map.entry(name).or_insert(idx);
                    }
                }
                Constant::NameAndType(n, d) => {
                    pool.name_and_type_map.entry((n, d)).or_insert(idx);
                }
                Constant::FieldRef(c, nt) => {
                    pool.fieldref_map.entry((c, nt)).or_insert(idx);
                }
                Constant::MethodRef(c, nt) => {
                    pool.methodref_map.entry((c, nt)).or_insert(idx);
                }
                _ => {}
            }
        }
        pool
    }

    /// Number of slots, including phantom slots after Long/Double.
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }

    /// The `constant_pool_count` value written to the file.
    pub fn count(&self) -> u16 {
        (self.constants.len() + 1) as u16
    }

    pub fn get(&self, index: u16) -> Option<&Constant> {
        if index == 0 {
            return None;
        }
        self.constants.get((index - 1) as usize)
    }

    pub fn utf8_bytes_at(&self, index: u16) -> Option<&[u8]> {
        match self.get(index) {
            Some(Constant::Utf8(raw)) => Some(raw),
            _ => None,
        }
    }

    /// Decode a Utf8 entry to UTF-16 code units, the unit the host's string
    /// hash is defined over. `None` if the index is not a well-formed Utf8.
    pub fn utf16_units_at(&self, index: u16) -> Option<Vec<u16>> {
        self.utf8_bytes_at(index).and_then(mutf8_to_utf16)
    }

    /// Decode a Utf8 entry to a Rust string, replacing unpaired surrogates.
    pub fn utf8_at(&self, index: u16) -> Option<String> {
        self.utf16_units_at(index).map(|units| String::from_utf16_lossy(&units))
    }

    /// Resolve a Class entry to its internal name.
    pub fn class_name_at(&self, index: u16) -> Option<String> {
        match self.get(index) {
            Some(Constant::Class(name_index)) => self.utf8_at(*name_index),
            _ => None,
        }
    }

    /// Resolve a Class entry to the UTF-16 code units of its internal name.
    pub fn class_name_units_at(&self, index: u16) -> Option<Vec<u16>> {
        match self.get(index) {
            Some(Constant::Class(name_index)) => self.utf16_units_at(*name_index),
            _ => None,
        }
    }

    /// True if the Utf8 entry at `index` spells exactly `expected`.
    pub fn utf8_eq(&self, index: u16, expected: &str) -> bool {
        match self.utf8_bytes_at(index) {
            Some(raw) => raw == encode_modified_utf8(expected).as_slice(),
            None => false,
        }
    }

    /// Space checks run after interning lookups, immediately before each
    /// slot is actually pushed, so only real net-new growth can fail: a pool
    /// one entry short of the cap still accepts a ref whose class, name, and
    /// descriptor are all interned already.
    fn ensure_space(&self, adding: usize) -> Result<(), ConstPoolError> {
        let count_after = self.constants.len() + adding + 1;
        if count_after > u16::MAX as usize {
            return Err(ConstPoolError::SizeLimitExceeded {
                current: self.constants.len(),
                adding,
                max: MAX_POOL_ENTRIES,
            });
        }
        Ok(())
    }

    pub fn try_add_utf8(&mut self, value: &str) -> Result<u16, ConstPoolError> {
        let raw = encode_modified_utf8(value);
        if let Some(idx) = self.utf8_map.get(&raw) {
            return Ok(*idx);
        }
        self.ensure_space(1)?;
        self.constants.push(Constant::Utf8(raw.clone()));
        let idx = self.constants.len() as u16;
        self.utf8_map.insert(raw, idx);
        Ok(idx)
    }

    pub fn try_add_integer(&mut self, value: i32) -> Result<u16, ConstPoolError> {
        if let Some(idx) = self.integer_map.get(&value) {
            return Ok(*idx);
        }
        self.ensure_space(1)?;
        self.constants.push(Constant::Integer(value));
        let idx = self.constants.len() as u16;
        self.integer_map.insert(value, idx);
        Ok(idx)
    }

    /// Long entries occupy two slots; the phantom slot is pushed here.
    pub fn try_add_long(&mut self, value: i64) -> Result<u16, ConstPoolError> {
        if let Some(idx) = self.long_map.get(&value) {
            return Ok(*idx);
        }
        self.ensure_space(2)?;
        self.constants.push(Constant::Long(value));
        let idx = self.constants.len() as u16;
        self.constants.push(Constant::Placeholder);
        self.long_map.insert(value, idx);
        Ok(idx)
    }

    pub fn try_add_class(&mut self, name: &str) -> Result<u16, ConstPoolError> {
        let raw = encode_modified_utf8(name);
        if let Some(idx) = self.class_map.get(&raw) {
            return Ok(*idx);
        }
        let name_index = self.try_add_utf8(name)?;
        self.ensure_space(1)?;
        self.constants.push(Constant::Class(name_index));
        let idx = self.constants.len() as u16;
        self.class_map.insert(raw, idx);
        Ok(idx)
    }

    pub fn try_add_name_and_type(
        &mut self,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, ConstPoolError> {
        let name_index = self.try_add_utf8(name)?;
        let descriptor_index = self.try_add_utf8(descriptor)?;
        if let Some(idx) = self.name_and_type_map.get(&(name_index, descriptor_index)) {
            return Ok(*idx);
        }
        self.ensure_space(1)?;
        self.constants.push(Constant::NameAndType(name_index, descriptor_index));
        let idx = self.constants.len() as u16;
        self.name_and_type_map.insert((name_index, descriptor_index), idx);
        Ok(idx)
    }

    pub fn try_add_field_ref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, ConstPoolError> {
        let class_index = self.try_add_class(class)?;
        let nt_index = self.try_add_name_and_type(name, descriptor)?;
        if let Some(idx) = self.fieldref_map.get(&(class_index, nt_index)) {
            return Ok(*idx);
        }
        self.ensure_space(1)?;
        self.constants.push(Constant::FieldRef(class_index, nt_index));
        let idx = self.constants.len() as u16;
        self.fieldref_map.insert((class_index, nt_index), idx);
        Ok(idx)
    }

    pub fn try_add_method_ref(
        &mut self,
        class: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<u16, ConstPoolError> {
        let class_index = self.try_add_class(class)?;
        let nt_index = self.try_add_name_and_type(name, descriptor)?;
        if let Some(idx) = self.methodref_map.get(&(class_index, nt_index)) {
            return Ok(*idx);
        }
        self.ensure_space(1)?;
        self.constants.push(Constant::MethodRef(class_index, nt_index));
        let idx = self.constants.len() as u16;
        self.methodref_map.insert((class_index, nt_index), idx);
        Ok(idx)
    }

    /// Serialize the pool: count, then entries in slot order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.count().to_be_bytes());
        for constant in &self.constants {
            bytes.extend_from_slice(&constant.to_bytes());
        }
        bytes
    }
}

/// Encode a Rust string as JVM modified UTF-8 (JVMS 4.4.7): NUL becomes
/// `C0 80`, supplementary characters become a surrogate pair of 3-byte units.
pub fn encode_modified_utf8(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for unit in s.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | ((unit >> 6) as u8 & 0x1F));
                out.push(0x80 | (unit as u8 & 0x3F));
            }
            _ => {
                out.push(0xE0 | ((unit >> 12) as u8 & 0x0F));
                out.push(0x80 | ((unit >> 6) as u8 & 0x3F));
                out.push(0x80 | (unit as u8 & 0x3F));
            }
        }
    }
    out
}

/// Decode modified UTF-8 to UTF-16 code units. Surrogate pairs are kept as
/// two units, exactly the char sequence the host hashes over.
pub fn mutf8_to_utf16(bytes: &[u8]) -> Option<Vec<u16>> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b & 0x80 == 0 {
            out.push(b as u16);
            i += 1;
        } else if b & 0xE0 == 0xC0 {
            let b2 = *bytes.get(i + 1)?;
            if b2 & 0xC0 != 0x80 {
                return None;
            }
            out.push(((b as u16 & 0x1F) << 6) | (b2 as u16 & 0x3F));
            i += 2;
        } else if b & 0xF0 == 0xE0 {
            let b2 = *bytes.get(i + 1)?;
            let b3 = *bytes.get(i + 2)?;
            if b2 & 0xC0 != 0x80 || b3 & 0xC0 != 0x80 {
                return None;
            }
            out.push(((b as u16 & 0x0F) << 12) | ((b2 as u16 & 0x3F) << 6) | (b3 as u16 & 0x3F));
            i += 3;
        } else {
            return None;
        }
    }
    Some(out)
}
