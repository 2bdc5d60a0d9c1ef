//! Class-file parser
//!
//! Builds the editable in-memory tree. Every section lands either in a typed
//! structure that re-serializes canonically or in an opaque byte buffer, so
//! `writer::class_file_to_bytes(parse(x)) == x` holds for any accepted input.

use log::trace;

use super::attribute::{AttributeInfo, SliceReader};
use super::class::ClassFile;
use super::constpool::{constant_tags, Constant, ConstantPool};
use super::defs::{MAGIC, MAX_SUPPORTED_MAJOR, MIN_SUPPORTED_MAJOR};
use super::field::FieldInfo;
use super::method::MethodInfo;
use crate::common::error::{Error, Result};

/// Parse a class file. Fails on short input, magic mismatch, unsupported
/// version, malformed constant pool, or truncated bodies; never panics.
pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
    // magic + versions + pool count
    if bytes.len() < 10 {
        return Err(Error::parse(format!("input too short: {} bytes", bytes.len())));
    }
    let mut r = SliceReader::new(bytes);
    let magic = r.read_u32("magic")?;
    if magic != MAGIC {
        return Err(Error::parse(format!("bad magic {magic:#010X}, expected {MAGIC:#010X}")));
    }
    let minor_version = r.read_u16("minor_version")?;
    let major_version = r.read_u16("major_version")?;
    if !(MIN_SUPPORTED_MAJOR..=MAX_SUPPORTED_MAJOR).contains(&major_version) {
        return Err(Error::parse(format!(
            "unsupported class file version {major_version}.{minor_version} \
             (supported majors {MIN_SUPPORTED_MAJOR}..={MAX_SUPPORTED_MAJOR})"
        )));
    }

    let constant_pool = parse_constant_pool(&mut r)?;

    let access_flags = r.read_u16("access_flags")?;
    let this_class = r.read_u16("this_class")?;
    let super_class = r.read_u16("super_class")?;

    let interface_count = r.read_u16("interfaces_count")? as usize;
    let mut interfaces = Vec::with_capacity(interface_count);
    for _ in 0..interface_count {
        interfaces.push(r.read_u16("interface index")?);
    }

    let field_count = r.read_u16("fields_count")? as usize;
    let mut fields = Vec::with_capacity(field_count);
    for _ in 0..field_count {
        fields.push(parse_field(&mut r, &constant_pool)?);
    }

    let method_count = r.read_u16("methods_count")? as usize;
    let mut methods = Vec::with_capacity(method_count);
    for _ in 0..method_count {
        let f = parse_field(&mut r, &constant_pool)?;
        methods.push(MethodInfo {
            access_flags: f.access_flags,
            name_index: f.name_index,
            descriptor_index: f.descriptor_index,
            attributes: f.attributes,
        });
    }

    let attribute_count = r.read_u16("attributes_count")? as usize;
    let mut attributes = Vec::with_capacity(attribute_count);
    for _ in 0..attribute_count {
        attributes.push(parse_attribute(&mut r, &constant_pool)?);
    }

    if !r.is_at_end() {
        return Err(Error::parse("trailing bytes after class attributes"));
    }

    trace!(
        "parsed class ver {major_version}.{minor_version}: {} pool slots, {} fields, {} methods",
        constant_pool.len(),
        fields.len(),
        methods.len()
    );

    Ok(ClassFile {
        magic,
        minor_version,
        major_version,
        constant_pool,
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        attributes,
    })
}

fn parse_constant_pool(r: &mut SliceReader<'_>) -> Result<ConstantPool> {
    use constant_tags::*;
    let count = r.read_u16("constant_pool_count")?;
    if count == 0 {
        return Err(Error::parse("constant_pool_count is zero"));
    }
    let slots = (count - 1) as usize;
    let mut constants = Vec::with_capacity(slots);
    while constants.len() < slots {
        let tag = r.read_u8("constant tag")?;
        let constant = match tag {
            CONSTANT_UTF8 => {
                let len = r.read_u16("Utf8 length")? as usize;
                Constant::Utf8(r.read_bytes(len, "Utf8 bytes")?.to_vec())
            }
            CONSTANT_INTEGER => Constant::Integer(r.read_u32("Integer value")? as i32),
            CONSTANT_FLOAT => Constant::Float(f32::from_bits(r.read_u32("Float value")?)),
            CONSTANT_LONG => {
                let hi = r.read_u32("Long high word")? as u64;
                let lo = r.read_u32("Long low word")? as u64;
                Constant::Long(((hi << 32) | lo) as i64)
            }
            CONSTANT_DOUBLE => {
                let hi = r.read_u32("Double high word")? as u64;
                let lo = r.read_u32("Double low word")? as u64;
                Constant::Double(f64::from_bits((hi << 32) | lo))
            }
            CONSTANT_CLASS => Constant::Class(r.read_u16("Class name index")?),
            CONSTANT_STRING => Constant::String(r.read_u16("String value index")?),
            CONSTANT_FIELDREF => {
                Constant::FieldRef(r.read_u16("FieldRef class")?, r.read_u16("FieldRef nat")?)
            }
            CONSTANT_METHODREF => {
                Constant::MethodRef(r.read_u16("MethodRef class")?, r.read_u16("MethodRef nat")?)
            }
            CONSTANT_INTERFACEMETHODREF => Constant::InterfaceMethodRef(
                r.read_u16("InterfaceMethodRef class")?,
                r.read_u16("InterfaceMethodRef nat")?,
            ),
            CONSTANT_NAMEANDTYPE => Constant::NameAndType(
                r.read_u16("NameAndType name")?,
                r.read_u16("NameAndType descriptor")?,
            ),
            CONSTANT_METHODHANDLE => Constant::MethodHandle(
                r.read_u8("MethodHandle kind")?,
                r.read_u16("MethodHandle reference")?,
            ),
            CONSTANT_METHODTYPE => Constant::MethodType(r.read_u16("MethodType descriptor")?),
            CONSTANT_DYNAMIC => {
                Constant::Dynamic(r.read_u16("Dynamic bootstrap")?, r.read_u16("Dynamic nat")?)
            }
            CONSTANT_INVOKEDYNAMIC => Constant::InvokeDynamic(
                r.read_u16("InvokeDynamic bootstrap")?,
                r.read_u16("InvokeDynamic nat")?,
            ),
            CONSTANT_MODULE => Constant::Module(r.read_u16("Module name")?),
            CONSTANT_PACKAGE => Constant::Package(r.read_u16("Package name")?),
            other => {
                return Err(Error::parse(format!(
                    "bad constant tag {other} at pool slot {}",
                    constants.len() + 1
                )))
            }
        };
        let wide = matches!(constant, Constant::Long(_) | Constant::Double(_));
        constants.push(constant);
        if wide {
            if constants.len() >= slots {
                return Err(Error::parse("Long/Double entry overruns constant pool"));
            }
            constants.push(Constant::Placeholder);
        }
    }
    Ok(ConstantPool::from_entries(constants))
}

fn parse_field(r: &mut SliceReader<'_>, pool: &ConstantPool) -> Result<FieldInfo> {
    let access_flags = r.read_u16("member access_flags")?;
    let name_index = r.read_u16("member name_index")?;
    let descriptor_index = r.read_u16("member descriptor_index")?;
    for (index, what) in [(name_index, "name"), (descriptor_index, "descriptor")] {
        if pool.utf8_bytes_at(index).is_none() {
            return Err(Error::parse(format!("member {what} index {index} is not a Utf8 entry")));
        }
    }
    let attribute_count = r.read_u16("member attributes_count")? as usize;
    let mut field = FieldInfo::new(access_flags, name_index, descriptor_index);
    for _ in 0..attribute_count {
        field.attributes.push(parse_attribute(r, pool)?);
    }
    Ok(field)
}

fn parse_attribute(r: &mut SliceReader<'_>, pool: &ConstantPool) -> Result<AttributeInfo> {
    let name_index = r.read_u16("attribute name_index")?;
    if pool.utf8_bytes_at(name_index).is_none() {
        return Err(Error::parse(format!("attribute name index {name_index} is not a Utf8 entry")));
    }
    let length = r.read_u32("attribute length")? as usize;
    let info = r.read_bytes(length, "attribute body")?.to_vec();
    Ok(AttributeInfo::new(name_index, info))
}
