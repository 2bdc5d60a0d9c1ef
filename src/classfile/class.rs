//! Core classfile structure and the edit operations concealment relies on

use log::debug;

use super::attribute::{AttributeInfo, CodeAttribute};
use super::constpool::ConstantPool;
use super::defs::{access_flags, attribute_names, major_versions, MAGIC};
use super::defs::{STATIC_INITIALIZER_DESCRIPTOR, STATIC_INITIALIZER_METHOD_NAME};
use super::field::FieldInfo;
use super::method::MethodInfo;
use crate::common::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub magic: u32,
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<AttributeInfo>,
}

impl ClassFile {
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            minor_version: 0,
            major_version: major_versions::JAVA_8,
            constant_pool: ConstantPool::new(),
            access_flags: 0,
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Internal name of this class (e.g. `com/example/Test`).
    pub fn class_name(&self) -> Option<String> {
        self.constant_pool.class_name_at(self.this_class)
    }

    /// UTF-16 code units of the internal name, as the host would hash them.
    pub fn class_name_units(&self) -> Option<Vec<u16>> {
        self.constant_pool.class_name_units_at(self.this_class)
    }

    /// Resolve an attribute's name through the pool.
    pub fn attribute_name(&self, attribute: &AttributeInfo) -> Option<String> {
        self.constant_pool.utf8_at(attribute.name_index)
    }

    /// Append a class-level attribute, interning its name.
    pub fn append_attribute(&mut self, name: &str, info: Vec<u8>) -> Result<()> {
        let name_index = self.constant_pool.try_add_utf8(name)?;
        self.attributes.push(AttributeInfo::new(name_index, info));
        Ok(())
    }

    /// Drop every class-level attribute called `name`; returns how many went.
    pub fn remove_attributes_named(&mut self, name: &str) -> usize {
        let pool = &self.constant_pool;
        let before = self.attributes.len();
        self.attributes.retain(|a| !pool.utf8_eq(a.name_index, name));
        let removed = before - self.attributes.len();
        if removed > 0 {
            debug!("removed {removed} existing {name} attribute(s)");
        }
        removed
    }

    /// First class-level attribute called `name`, if any.
    pub fn find_attribute(&self, name: &str) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|a| self.constant_pool.utf8_eq(a.name_index, name))
    }

    /// Append a new field with no attributes.
    pub fn append_field(&mut self, access: u16, name: &str, descriptor: &str) -> Result<()> {
        let name_index = self.constant_pool.try_add_utf8(name)?;
        let descriptor_index = self.constant_pool.try_add_utf8(descriptor)?;
        self.fields.push(FieldInfo::new(access, name_index, descriptor_index));
        Ok(())
    }

    /// Index of the method `name`/`descriptor`, if present.
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<usize> {
        self.methods.iter().position(|m| {
            self.constant_pool.utf8_eq(m.name_index, name)
                && self.constant_pool.utf8_eq(m.descriptor_index, descriptor)
        })
    }

    /// Index of the static initializer, if the class has one.
    pub fn find_static_initializer(&self) -> Option<usize> {
        self.find_method(STATIC_INITIALIZER_METHOD_NAME, STATIC_INITIALIZER_DESCRIPTOR)
    }

    /// Decode the `Code` attribute of method `index`.
    pub fn method_code(&self, index: usize) -> Result<CodeAttribute> {
        let method = self
            .methods
            .get(index)
            .ok_or_else(|| Error::parse(format!("no method at index {index}")))?;
        let attr = method
            .attributes
            .iter()
            .find(|a| self.constant_pool.utf8_eq(a.name_index, attribute_names::CODE))
            .ok_or_else(|| Error::parse(format!("method {index} has no Code attribute")))?;
        CodeAttribute::parse(&attr.info)
    }

    /// Replace the `Code` attribute of method `index` with a new encoding.
    pub fn set_method_code(&mut self, index: usize, code: CodeAttribute) -> Result<()> {
        let code_name = self.constant_pool.try_add_utf8(attribute_names::CODE)?;
        let position = self
            .methods
            .get(index)
            .ok_or_else(|| Error::parse(format!("no method at index {index}")))?
            .attributes
            .iter()
            .position(|a| self.constant_pool.utf8_eq(a.name_index, attribute_names::CODE));
        let info = code.to_bytes();
        let method = &mut self.methods[index];
        match position {
            Some(at) => method.attributes[at].info = info,
            None => method.attributes.push(AttributeInfo::new(code_name, info)),
        }
        Ok(())
    }

    /// Append a `static {}` initializer carrying `code`. The caller must
    /// first have checked that none exists.
    pub fn append_static_initializer(&mut self, code: CodeAttribute) -> Result<()> {
        let name_index = self.constant_pool.try_add_utf8(STATIC_INITIALIZER_METHOD_NAME)?;
        let descriptor_index = self.constant_pool.try_add_utf8(STATIC_INITIALIZER_DESCRIPTOR)?;
        let code_name = self.constant_pool.try_add_utf8(attribute_names::CODE)?;
        let mut method = MethodInfo::new(access_flags::ACC_STATIC, name_index, descriptor_index);
        method.attributes.push(AttributeInfo::new(code_name, code.to_bytes()));
        self.methods.push(method);
        Ok(())
    }
}

impl Default for ClassFile {
    fn default() -> Self {
        Self::new()
    }
}
