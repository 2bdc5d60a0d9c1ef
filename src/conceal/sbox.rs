//! S-Box smearing: conceal a payload as a static crypto-lookalike table
//!
//! Concealment adds two static fields named off the class hash, then plants
//! a class-initializer prefix that fills the table and derives the check
//! field from every slot. Extraction walks the initializer with a minimal
//! stack machine and rebuilds the array literal, so the payload never
//! appears as contiguous bytes anywhere in the file.

use log::debug;

use crate::classfile::constpool::Constant;
use crate::classfile::defs::access_flags::{ACC_FINAL, ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC};
use crate::classfile::defs::{INT_ARRAY_DESCRIPTOR, LONG_DESCRIPTOR, STACK_MAP_MAJOR};
use crate::classfile::opcodes as op;
use crate::classfile::visitor::{accept, ClassVisitor};
use crate::classfile::{class_file_to_bytes, parse, ClassFile, FieldInfo};
use crate::common::error::{Error, Result};
use crate::conceal::clinit::{InitializerEmitter, InitializerRefs};
use crate::conceal::naming::derive_field_names;
use crate::{sbox, verify};

/// Conceal `payload` in `class_bytes` by S-Box smearing. The emitted bytes
/// are structurally verified before being returned; a verifier rejection is
/// fatal for the call.
pub fn conceal(class_bytes: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let mut class = parse(class_bytes)?;
    let table = sbox::encode(payload)?;
    inject_table(&mut class, &table)?;
    let bytes = class_file_to_bytes(&class);
    verify::verify_structural(&bytes)?;
    Ok(bytes)
}

/// Splice an already-encoded table into a parsed class: the two fields plus
/// the initializer prefix that populates them.
pub fn inject_table(class: &mut ClassFile, table: &[i32]) -> Result<()> {
    let units = class
        .class_name_units()
        .ok_or_else(|| Error::parse("this_class does not resolve to a class name"))?;
    let class_name = String::from_utf16_lossy(&units);
    let (table_name, check_name) = derive_field_names(&units);
    debug!("smearing {} table slots into {class_name} as {table_name}/{check_name}", table.len());

    class.append_field(ACC_PRIVATE | ACC_STATIC | ACC_FINAL, &table_name, INT_ARRAY_DESCRIPTOR)?;
    class.append_field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, &check_name, LONG_DESCRIPTOR)?;

    let refs = InitializerRefs {
        table_field: class.constant_pool.try_add_field_ref(
            &class_name,
            &table_name,
            INT_ARRAY_DESCRIPTOR,
        )?,
        check_field: class.constant_pool.try_add_field_ref(
            &class_name,
            &check_name,
            LONG_DESCRIPTOR,
        )?,
        int_array_class: class.constant_pool.try_add_class(INT_ARRAY_DESCRIPTOR)?,
    };

    let with_frames = class.major_version >= STACK_MAP_MAJOR;
    match class.find_static_initializer() {
        Some(index) => {
            let original = class.method_code(index)?;
            let mut emitter = InitializerEmitter::new(&mut class.constant_pool, refs);
            let merged = emitter.prepend(&original, table, with_frames)?;
            class.set_method_code(index, merged)?;
        }
        None => {
            let mut emitter = InitializerEmitter::new(&mut class.constant_pool, refs);
            let code = emitter.build_fresh(table, with_frames)?;
            class.append_static_initializer(code)?;
        }
    }
    Ok(())
}

/// Collects the names of `static int[]` fields; every one is a candidate
/// table regardless of its other access flags.
struct CandidateScan {
    names: Vec<String>,
}

impl ClassVisitor for CandidateScan {
    fn visit_field(&mut self, class: &ClassFile, field: &FieldInfo) {
        if field.access_flags & ACC_STATIC != 0
            && class.constant_pool.utf8_eq(field.descriptor_index, INT_ARRAY_DESCRIPTOR)
        {
            if let Some(name) = class.constant_pool.utf8_at(field.name_index) {
                self.names.push(name);
            }
        }
    }
}

/// Recover a payload concealed by [`conceal`].
///
/// Candidates that fail to simulate are skipped; a candidate whose table
/// simulates but does not decode surfaces its decode error, so corruption
/// never degrades into a silent wrong payload.
pub fn reveal(class_bytes: &[u8]) -> Result<Vec<u8>> {
    let class = parse(class_bytes)?;
    let mut scan = CandidateScan { names: Vec::new() };
    accept(&class, &mut scan);
    if scan.names.is_empty() {
        return Err(Error::NoPayload);
    }

    let initializer = class.find_static_initializer().ok_or(Error::NoPayload)?;
    // the class itself parsed; an unreadable initializer only disqualifies
    // this strategy, it is not a carrier parse failure
    let code = class
        .method_code(initializer)
        .map_err(|err| Error::corrupted(format!("static initializer unreadable: {err}")))?;

    let mut last_error: Option<Error> = None;
    for name in &scan.names {
        let Some(table) = simulate_initializer(&code.code, &class, name) else {
            debug!("candidate {name}: initializer does not reduce to an array literal");
            continue;
        };
        match sbox::decode(&table) {
            Ok(payload) => {
                debug!("candidate {name}: decoded {} payload bytes", payload.len());
                return Ok(payload);
            }
            Err(err) => {
                debug!("candidate {name}: table of {} rejected: {err}", table.len());
                last_error = Some(err);
            }
        }
    }
    Err(last_error.unwrap_or(Error::NoPayload))
}

#[derive(Debug, Clone, PartialEq)]
enum SimValue {
    Int(i32),
    Array,
}

/// Replay the initializer over a minimal stack machine covering exactly the
/// opcodes the emitter's array literal uses: constant pushes, `newarray`,
/// `dup`, `iastore`, and `put-static`. The walk ends at the first put-static
/// of an `int[]` into `target` on this class; any opcode outside the subset
/// aborts this candidate only.
fn simulate_initializer(code: &[u8], class: &ClassFile, target: &str) -> Option<Vec<i32>> {
    let pool = &class.constant_pool;
    let mut stack: Vec<SimValue> = Vec::new();
    let mut array: Option<Vec<i32>> = None;
    let mut pc = 0usize;

    while pc < code.len() {
        let opcode = code[pc];
        match opcode {
            op::NOP => pc += 1,
            op::ICONST_M1..=op::ICONST_5 => {
                stack.push(SimValue::Int(opcode as i32 - op::ICONST_0 as i32));
                pc += 1;
            }
            op::BIPUSH => {
                stack.push(SimValue::Int(*code.get(pc + 1)? as i8 as i32));
                pc += 2;
            }
            op::SIPUSH => {
                let hi = *code.get(pc + 1)?;
                let lo = *code.get(pc + 2)?;
                stack.push(SimValue::Int(i16::from_be_bytes([hi, lo]) as i32));
                pc += 3;
            }
            op::LDC => {
                let index = *code.get(pc + 1)? as u16;
                match pool.get(index)? {
                    Constant::Integer(v) => stack.push(SimValue::Int(*v)),
                    _ => return None,
                }
                pc += 2;
            }
            op::LDC_W => {
                let index = u16::from_be_bytes([*code.get(pc + 1)?, *code.get(pc + 2)?]);
                match pool.get(index)? {
                    Constant::Integer(v) => stack.push(SimValue::Int(*v)),
                    _ => return None,
                }
                pc += 3;
            }
            op::NEWARRAY => {
                if *code.get(pc + 1)? != op::T_INT || array.is_some() {
                    return None;
                }
                let size = match stack.pop()? {
                    SimValue::Int(v) if (0..=u16::MAX as i32).contains(&v) => v as usize,
                    _ => return None,
                };
                array = Some(vec![0i32; size]);
                stack.push(SimValue::Array);
                pc += 2;
            }
            op::DUP => {
                let top = stack.last()?.clone();
                stack.push(top);
                pc += 1;
            }
            op::IASTORE => {
                let value = match stack.pop()? {
                    SimValue::Int(v) => v,
                    _ => return None,
                };
                let index = match stack.pop()? {
                    SimValue::Int(v) if v >= 0 => v as usize,
                    _ => return None,
                };
                if stack.pop()? != SimValue::Array {
                    return None;
                }
                let slots = array.as_mut()?;
                if index >= slots.len() {
                    return None;
                }
                slots[index] = value;
                pc += 1;
            }
            op::PUTSTATIC => {
                let index = u16::from_be_bytes([*code.get(pc + 1)?, *code.get(pc + 2)?]);
                let (owner, name, descriptor) = resolve_field_ref(class, index)?;
                let this_name = class.class_name()?;
                if owner == this_name && name == target && descriptor == INT_ARRAY_DESCRIPTOR {
                    if stack.pop()? != SimValue::Array {
                        return None;
                    }
                    return array;
                }
                // some other field's initialization; drop its value and walk on
                let slots = if descriptor.starts_with('J') || descriptor.starts_with('D') { 2 } else { 1 };
                for _ in 0..slots {
                    if stack.pop()? == SimValue::Array {
                        array = None;
                    }
                }
                pc += 3;
            }
            _ => return None,
        }
    }
    None
}

fn resolve_field_ref(class: &ClassFile, index: u16) -> Option<(String, String, String)> {
    let pool = &class.constant_pool;
    let (class_index, nt_index) = match pool.get(index)? {
        Constant::FieldRef(c, nt) => (*c, *nt),
        _ => return None,
    };
    let owner = pool.class_name_at(class_index)?;
    let (name_index, descriptor_index) = match pool.get(nt_index)? {
        Constant::NameAndType(n, d) => (*n, *d),
        _ => return None,
    };
    Some((owner, pool.utf8_at(name_index)?, pool.utf8_at(descriptor_index)?))
}
