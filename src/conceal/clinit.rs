//! Synthesized class-initializer emitter
//!
//! Builds the `<clinit>` block that materializes the S-Box table at class
//! load and folds every slot into a checksum field, so dead-code elimination
//! cannot drop the table without severing a live data flow. The block is
//! always a self-contained prefix at the method entry: when the carrier
//! already has an initializer, the original body follows untouched except
//! for offset-bearing metadata, which is relocated.
//!
//! Emitted shape (semantically):
//!
//! ```text
//! _T3 = new int[] { ... };
//! long acc = 0;
//! for (int i = 0; i < _T3.length; i++) acc ^= _T3[i] * 31L;
//! _rk = acc;
//! ```

use std::collections::HashMap;

use log::debug;

use crate::classfile::attribute::{
    shift_line_number_table, shift_local_variable_table, AttributeInfo, CodeAttribute,
};
use crate::classfile::constpool::{Constant, ConstantPool};
use crate::classfile::defs::attribute_names;
use crate::classfile::frame::{StackMapFrame, StackMapTable, VerificationType};
use crate::classfile::opcodes as op;
use crate::common::error::{Error, Result};

/// The VM caps a method body at 65535 code bytes.
const MAX_CODE_BYTES: usize = u16::MAX as usize;

/// Pool entries the emitted code refers to.
#[derive(Debug, Clone, Copy)]
pub struct InitializerRefs {
    /// FieldRef of the `int[]` table field
    pub table_field: u16,
    /// FieldRef of the `long` check field
    pub check_field: u16,
    /// Class entry for `[I`, named in the loop frames
    pub int_array_class: u16,
}

/// The emitted prefix, before padding: code bytes plus the two loop targets
/// that need stack-map frames.
struct Prefix {
    code: Vec<u8>,
    loop_start: usize,
    loop_end: usize,
}

pub struct InitializerEmitter<'a> {
    pool: &'a mut ConstantPool,
    refs: InitializerRefs,
}

impl<'a> InitializerEmitter<'a> {
    pub fn new(pool: &'a mut ConstantPool, refs: InitializerRefs) -> Self {
        Self { pool, refs }
    }

    /// Build a complete `<clinit>` body for a carrier that has none.
    pub fn build_fresh(&mut self, table: &[i32], with_frames: bool) -> Result<CodeAttribute> {
        let prefix = self.emit_prefix(table)?;
        let mut code = prefix.code.clone();
        code.push(op::RETURN);

        let max_stack = compute_max_stack(&code, self.pool)?;
        let max_locals = compute_max_locals(&code)?;
        let mut attr = CodeAttribute::new(max_stack, max_locals, code);
        if with_frames {
            let frames = StackMapTable { frames: self.loop_frames(&prefix) };
            let name_index = self.pool.try_add_utf8(attribute_names::STACK_MAP_TABLE)?;
            attr.attributes.push(AttributeInfo::new(name_index, frames.to_bytes()));
        }
        debug!("built fresh initializer: {} code bytes", attr.code.len());
        Ok(attr)
    }

    /// Prepend the initializer block to an existing `<clinit>` body.
    ///
    /// Relative branches in the original body need no fixup. The exception
    /// table, stack-map deltas (with `Uninitialized` offsets), and the debug
    /// tables shift by the prefix length; the prefix is NOP-padded to a
    /// 4-byte boundary so switch-instruction padding in the body survives.
    pub fn prepend(&mut self, original: &CodeAttribute, table: &[i32], with_frames: bool) -> Result<CodeAttribute> {
        let mut prefix = self.emit_prefix(table)?;
        while prefix.code.len() % 4 != 0 {
            prefix.code.push(op::NOP);
        }
        let boundary = prefix.code.len();
        if boundary + original.code.len() > MAX_CODE_BYTES {
            return Err(Error::PayloadTooLarge {
                size: boundary + original.code.len(),
                max: MAX_CODE_BYTES,
            });
        }

        let mut code = prefix.code.clone();
        code.extend_from_slice(&original.code);

        let max_stack = compute_max_stack(&prefix.code, self.pool)?.max(original.max_stack);
        let max_locals = compute_max_locals(&prefix.code)?.max(original.max_locals);
        let mut attr = CodeAttribute::new(max_stack, max_locals, code);

        attr.exception_table = original
            .exception_table
            .iter()
            .map(|entry| entry.shifted(boundary as u16))
            .collect();

        let mut saw_stack_map = false;
        for attribute in &original.attributes {
            let rewritten = if self.pool.utf8_eq(attribute.name_index, attribute_names::STACK_MAP_TABLE) {
                saw_stack_map = true;
                let original_table = StackMapTable::parse(&attribute.info)?;
                let merged = self.merge_frames(&prefix, boundary, &original_table)?;
                AttributeInfo::new(attribute.name_index, merged.to_bytes())
            } else if self.pool.utf8_eq(attribute.name_index, attribute_names::LINE_NUMBER_TABLE) {
                match shift_line_number_table(&attribute.info, boundary as u16) {
                    Some(info) => AttributeInfo::new(attribute.name_index, info),
                    None => attribute.clone(),
                }
            } else if self.pool.utf8_eq(attribute.name_index, attribute_names::LOCAL_VARIABLE_TABLE)
                || self.pool.utf8_eq(attribute.name_index, attribute_names::LOCAL_VARIABLE_TYPE_TABLE)
            {
                match shift_local_variable_table(&attribute.info, boundary as u16) {
                    Some(info) => AttributeInfo::new(attribute.name_index, info),
                    None => attribute.clone(),
                }
            } else {
                attribute.clone()
            };
            attr.attributes.push(rewritten);
        }

        if with_frames && !saw_stack_map {
            let merged = self.merge_frames(&prefix, boundary, &StackMapTable::new())?;
            let name_index = self.pool.try_add_utf8(attribute_names::STACK_MAP_TABLE)?;
            attr.attributes.push(AttributeInfo::new(name_index, merged.to_bytes()));
        }

        debug!(
            "prepended {} initializer bytes ahead of {} original bytes",
            boundary,
            original.code.len()
        );
        Ok(attr)
    }

    /// Emit through the final put-static; no padding, no return.
    fn emit_prefix(&mut self, table: &[i32]) -> Result<Prefix> {
        let mut code = Vec::with_capacity(table.len() * 8 + 64);

        // new int[N], then dup/index/value/iastore per slot
        self.push_int(&mut code, table.len() as i32)?;
        code.push(op::NEWARRAY);
        code.push(op::T_INT);
        for (i, &value) in table.iter().enumerate() {
            code.push(op::DUP);
            self.push_int(&mut code, i as i32)?;
            self.push_int(&mut code, value)?;
            code.push(op::IASTORE);
        }
        code.push(op::PUTSTATIC);
        code.extend_from_slice(&self.refs.table_field.to_be_bytes());

        // long acc = 0; int[] a = table; int i = 0;
        code.push(op::LCONST_0);
        code.push(op::LSTORE_0);
        code.push(op::GETSTATIC);
        code.extend_from_slice(&self.refs.table_field.to_be_bytes());
        code.push(op::ASTORE_2);
        code.push(op::ICONST_0);
        code.push(op::ISTORE_3);

        // while (i < a.length) { acc ^= a[i] * 31L; i++; }
        let loop_start = code.len();
        code.push(op::ILOAD_3);
        code.push(op::ALOAD_2);
        code.push(op::ARRAYLENGTH);
        let branch_at = code.len();
        code.push(op::IF_ICMPGE);
        code.extend_from_slice(&[0, 0]); // patched below
        code.push(op::LLOAD_0);
        code.push(op::ALOAD_2);
        code.push(op::ILOAD_3);
        code.push(op::IALOAD);
        code.push(op::I2L);
        let long_31 = self.pool.try_add_long(31)?;
        code.push(op::LDC2_W);
        code.extend_from_slice(&long_31.to_be_bytes());
        code.push(op::LMUL);
        code.push(op::LXOR);
        code.push(op::LSTORE_0);
        code.push(op::IINC);
        code.push(3);
        code.push(1);
        let goto_at = code.len();
        code.push(op::GOTO);
        let back = (loop_start as i32 - goto_at as i32) as i16;
        code.extend_from_slice(&back.to_be_bytes());

        let loop_end = code.len();
        let exit = (loop_end as i32 - branch_at as i32) as i16;
        code[branch_at + 1..branch_at + 3].copy_from_slice(&exit.to_be_bytes());

        code.push(op::LLOAD_0);
        code.push(op::PUTSTATIC);
        code.extend_from_slice(&self.refs.check_field.to_be_bytes());

        Ok(Prefix { code, loop_start, loop_end })
    }

    /// Push an int constant with the tightest encoding its value allows.
    fn push_int(&mut self, code: &mut Vec<u8>, value: i32) -> Result<()> {
        match value {
            -1..=5 => code.push((op::ICONST_0 as i32 + value) as u8),
            -128..=127 => {
                code.push(op::BIPUSH);
                code.push(value as i8 as u8);
            }
            -32768..=32767 => {
                code.push(op::SIPUSH);
                code.extend_from_slice(&(value as i16).to_be_bytes());
            }
            _ => {
                let index = self.pool.try_add_integer(value)?;
                if index <= u8::MAX as u16 {
                    code.push(op::LDC);
                    code.push(index as u8);
                } else {
                    code.push(op::LDC_W);
                    code.extend_from_slice(&index.to_be_bytes());
                }
            }
        }
        Ok(())
    }

    /// Frames for the two branch targets inside the checksum loop. Locals
    /// there are `{ long acc, int[] a, int i }` on an empty operand stack.
    fn loop_frames(&self, prefix: &Prefix) -> Vec<StackMapFrame> {
        vec![
            StackMapFrame::Append {
                k: 3,
                offset_delta: prefix.loop_start as u16,
                locals: vec![
                    VerificationType::Long,
                    VerificationType::Object(self.refs.int_array_class),
                    VerificationType::Integer,
                ],
            },
            StackMapFrame::Same { offset_delta: (prefix.loop_end - prefix.loop_start - 1) as u16 },
        ]
    }

    /// Chain our loop frames, a state restore at the original entry, and the
    /// original frames into one table.
    ///
    /// A `<clinit>` starts with no locals, so chopping our three loop locals
    /// at the boundary reproduces the state the original frames chain from.
    /// When the original body carried a frame at its old offset 0 it gets
    /// converted to the absolute equivalent instead, since two frames cannot
    /// share an offset.
    fn merge_frames(
        &self,
        prefix: &Prefix,
        boundary: usize,
        original: &StackMapTable,
    ) -> Result<StackMapTable> {
        let mut frames = self.loop_frames(prefix);
        let restore_delta = (boundary - prefix.loop_end - 1) as u16;

        let mut rest = original.frames.iter();
        match rest.next() {
            None => frames.push(StackMapFrame::Chop { k: 3, offset_delta: restore_delta }),
            Some(first) => {
                let first = first.shifted_types(boundary as u16);
                if first.offset_delta() == 0 {
                    // the original entry itself was a branch target; its
                    // frame is relative to the empty initial state
                    let converted = match first {
                        StackMapFrame::Same { .. } | StackMapFrame::SameExtended { .. } => {
                            StackMapFrame::Chop { k: 3, offset_delta: restore_delta }
                        }
                        StackMapFrame::SameLocals1StackItem { stack, .. } => StackMapFrame::Full {
                            offset_delta: restore_delta,
                            locals: Vec::new(),
                            stack: vec![stack],
                        },
                        StackMapFrame::Append { locals, .. } => StackMapFrame::Full {
                            offset_delta: restore_delta,
                            locals,
                            stack: Vec::new(),
                        },
                        StackMapFrame::Full { locals, stack, .. } => {
                            StackMapFrame::Full { offset_delta: restore_delta, locals, stack }
                        }
                        StackMapFrame::Chop { .. } => {
                            return Err(Error::parse(
                                "chop frame at initializer entry has no locals to drop",
                            ))
                        }
                    };
                    frames.push(converted);
                } else {
                    frames.push(StackMapFrame::Chop { k: 3, offset_delta: restore_delta });
                    frames.push(first.with_offset_delta(first.offset_delta() - 1));
                }
                for frame in rest {
                    frames.push(frame.shifted_types(boundary as u16));
                }
            }
        }
        Ok(StackMapTable { frames })
    }
}

/// Width in code bytes of an instruction from the emitted subset, operands
/// included. `None` marks an opcode outside the subset.
fn instruction_length(opcode: u8) -> Option<usize> {
    Some(match opcode {
        op::NOP
        | op::ICONST_M1..=op::LCONST_1
        | op::ILOAD_0..=op::ILOAD_3
        | op::LLOAD_0
        | op::ALOAD_0..=op::ALOAD_3
        | op::ISTORE_0..=op::ISTORE_3
        | op::LSTORE_0
        | op::ASTORE_0..=op::ASTORE_3
        | op::IALOAD
        | op::IASTORE
        | op::POP
        | op::DUP
        | op::LMUL
        | op::LXOR
        | op::I2L
        | op::ARRAYLENGTH
        | op::RETURN => 1,
        op::BIPUSH | op::LDC | op::ILOAD | op::LLOAD | op::ALOAD | op::ISTORE | op::LSTORE
        | op::ASTORE | op::NEWARRAY => 2,
        op::SIPUSH | op::LDC_W | op::LDC2_W | op::IINC | op::IF_ICMPGE | op::GOTO
        | op::GETSTATIC | op::PUTSTATIC => 3,
        _ => return None,
    })
}

/// Slots a field of `descriptor` occupies on the operand stack.
fn field_slot_count(pool: &ConstantPool, field_ref: u16) -> Result<u16> {
    let nt = match pool.get(field_ref) {
        Some(Constant::FieldRef(_, nt)) => *nt,
        other => return Err(Error::parse(format!("pool index {field_ref} is not a FieldRef ({other:?})"))),
    };
    let descriptor_index = match pool.get(nt) {
        Some(Constant::NameAndType(_, descriptor)) => *descriptor,
        other => return Err(Error::parse(format!("pool index {nt} is not a NameAndType ({other:?})"))),
    };
    match pool.utf8_bytes_at(descriptor_index).and_then(|raw| raw.first()) {
        Some(b'J') | Some(b'D') => Ok(2),
        Some(_) => Ok(1),
        None => Err(Error::parse(format!("descriptor index {descriptor_index} is not a Utf8 entry"))),
    }
}

/// Conservative operand-stack bound by symbolic execution of the emitted
/// subset: every reachable offset gets the deepest stack seen on any path.
pub fn compute_max_stack(code: &[u8], pool: &ConstantPool) -> Result<u16> {
    let mut max: u16 = 0;
    let mut seen: HashMap<usize, u16> = HashMap::new();
    let mut worklist: Vec<(usize, u16)> = vec![(0, 0)];

    while let Some((mut pc, mut depth)) = worklist.pop() {
        loop {
            if pc >= code.len() {
                break;
            }
            match seen.get(&pc) {
                Some(&recorded) if recorded >= depth => break,
                _ => {
                    seen.insert(pc, depth);
                }
            }
            let opcode = code[pc];
            let length = instruction_length(opcode)
                .ok_or_else(|| Error::parse(format!("unexpected opcode {opcode:#04x} at {pc}")))?;
            if pc + length > code.len() {
                return Err(Error::parse(format!("instruction at {pc} overruns code")));
            }

            let mut next = pc + length;
            match opcode {
                op::ICONST_M1..=op::ICONST_5
                | op::BIPUSH
                | op::SIPUSH
                | op::LDC
                | op::LDC_W
                | op::ILOAD
                | op::ILOAD_0..=op::ILOAD_3
                | op::ALOAD
                | op::ALOAD_0..=op::ALOAD_3
                | op::DUP
                | op::I2L => depth += 1,
                op::LCONST_0 | op::LCONST_1 | op::LDC2_W | op::LLOAD | op::LLOAD_0 => depth += 2,
                // iaload pops two and pushes one, a net single-slot drop
                op::ISTORE | op::ISTORE_0..=op::ISTORE_3 | op::ASTORE
                | op::ASTORE_0..=op::ASTORE_3 | op::POP | op::IALOAD => {
                    depth = checked_pop(depth, 1, pc)?;
                }
                op::LSTORE | op::LSTORE_0 | op::LMUL | op::LXOR => depth = checked_pop(depth, 2, pc)?,
                op::IASTORE => depth = checked_pop(depth, 3, pc)?,
                op::GETSTATIC => {
                    let index = u16::from_be_bytes([code[pc + 1], code[pc + 2]]);
                    depth += field_slot_count(pool, index)?;
                }
                op::PUTSTATIC => {
                    let index = u16::from_be_bytes([code[pc + 1], code[pc + 2]]);
                    depth = checked_pop(depth, field_slot_count(pool, index)?, pc)?;
                }
                op::IF_ICMPGE => {
                    depth = checked_pop(depth, 2, pc)?;
                    let rel = i16::from_be_bytes([code[pc + 1], code[pc + 2]]) as i32;
                    let target = pc as i32 + rel;
                    if target < 0 || target as usize > code.len() {
                        return Err(Error::parse(format!("branch target {target} out of range")));
                    }
                    worklist.push((target as usize, depth));
                }
                op::GOTO => {
                    let rel = i16::from_be_bytes([code[pc + 1], code[pc + 2]]) as i32;
                    let target = pc as i32 + rel;
                    if target < 0 || target as usize > code.len() {
                        return Err(Error::parse(format!("branch target {target} out of range")));
                    }
                    next = target as usize;
                }
                op::RETURN => break,
                op::NOP | op::IINC | op::ARRAYLENGTH | op::NEWARRAY => {}
                other => {
                    return Err(Error::parse(format!("unexpected opcode {other:#04x} at {pc}")))
                }
            }
            max = max.max(depth);
            pc = next;
        }
    }
    Ok(max)
}

fn checked_pop(depth: u16, slots: u16, pc: usize) -> Result<u16> {
    depth
        .checked_sub(slots)
        .ok_or_else(|| Error::parse(format!("operand stack underflow at {pc}")))
}

/// Local-slot bound: one past the widest local any instruction touches.
pub fn compute_max_locals(code: &[u8]) -> Result<u16> {
    let mut max: u16 = 0;
    let mut touch = |slot: u16, wide: bool| {
        max = max.max(slot + if wide { 2 } else { 1 });
    };
    let mut pc = 0;
    while pc < code.len() {
        let opcode = code[pc];
        let length = instruction_length(opcode)
            .ok_or_else(|| Error::parse(format!("unexpected opcode {opcode:#04x} at {pc}")))?;
        if pc + length > code.len() {
            return Err(Error::parse(format!("instruction at {pc} overruns code")));
        }
        match opcode {
            op::ILOAD_0..=op::ILOAD_3 => touch((opcode - op::ILOAD_0) as u16, false),
            op::ISTORE_0..=op::ISTORE_3 => touch((opcode - op::ISTORE_0) as u16, false),
            op::ALOAD_0..=op::ALOAD_3 => touch((opcode - op::ALOAD_0) as u16, false),
            op::ASTORE_0..=op::ASTORE_3 => touch((opcode - op::ASTORE_0) as u16, false),
            op::LLOAD_0 | op::LSTORE_0 => touch(0, true),
            op::ILOAD | op::ISTORE | op::ALOAD | op::ASTORE => touch(code[pc + 1] as u16, false),
            op::LLOAD | op::LSTORE => touch(code[pc + 1] as u16, true),
            op::IINC => touch(code[pc + 1] as u16, false),
            _ => {}
        }
        pc += length;
    }
    Ok(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::ExceptionTableEntry;

    fn refs_in(pool: &mut ConstantPool) -> InitializerRefs {
        InitializerRefs {
            table_field: pool.try_add_field_ref("TestClass", "_T6", "[I").unwrap(),
            check_field: pool.try_add_field_ref("TestClass", "_wk", "J").unwrap(),
            int_array_class: pool.try_add_class("[I").unwrap(),
        }
    }

    #[test]
    fn fresh_initializer_has_loop_frames_and_return() {
        let mut pool = ConstantPool::new();
        let refs = refs_in(&mut pool);
        let mut emitter = InitializerEmitter::new(&mut pool, refs);
        let attr = emitter.build_fresh(&[1, 2, 3, -7], true).unwrap();
        assert_eq!(attr.code.last(), Some(&op::RETURN));
        assert_eq!(attr.max_stack, 6);
        assert_eq!(attr.max_locals, 4);
        assert_eq!(attr.attributes.len(), 1);
        let table = StackMapTable::parse(&attr.attributes[0].info).unwrap();
        assert_eq!(table.frames.len(), 2);
        assert!(matches!(table.frames[0], StackMapFrame::Append { k: 3, .. }));
    }

    #[test]
    fn fresh_initializer_without_frames_for_old_majors() {
        let mut pool = ConstantPool::new();
        let refs = refs_in(&mut pool);
        let mut emitter = InitializerEmitter::new(&mut pool, refs);
        let attr = emitter.build_fresh(&[0; 8], false).unwrap();
        assert!(attr.attributes.is_empty());
    }

    #[test]
    fn push_int_picks_tightest_encoding() {
        let mut pool = ConstantPool::new();
        let refs = refs_in(&mut pool);
        let mut emitter = InitializerEmitter::new(&mut pool, refs);
        let mut code = Vec::new();
        emitter.push_int(&mut code, 5).unwrap();
        emitter.push_int(&mut code, -100).unwrap();
        emitter.push_int(&mut code, 1000).unwrap();
        emitter.push_int(&mut code, 100_000).unwrap();
        assert_eq!(code[0], op::ICONST_5);
        assert_eq!(code[1], op::BIPUSH);
        assert_eq!(code[3], op::SIPUSH);
        assert_eq!(code[6], op::LDC);
    }

    #[test]
    fn prepend_pads_to_four_byte_boundary_and_keeps_body() {
        let mut pool = ConstantPool::new();
        let refs = refs_in(&mut pool);
        let original = CodeAttribute::new(2, 1, vec![op::ICONST_0, op::RETURN]);
        let mut emitter = InitializerEmitter::new(&mut pool, refs);
        let merged = emitter.prepend(&original, &[9, 8, 7], true).unwrap();
        let boundary = merged.code.len() - original.code.len();
        assert_eq!(boundary % 4, 0);
        assert!(merged.code.ends_with(&original.code));
        assert!(merged.max_stack >= 6);
        assert_eq!(merged.max_locals, 4);
    }

    #[test]
    fn prepend_shifts_exception_table() {
        let mut pool = ConstantPool::new();
        let refs = refs_in(&mut pool);
        let mut original = CodeAttribute::new(1, 1, vec![op::NOP, op::RETURN]);
        original.exception_table.push(ExceptionTableEntry {
            start_pc: 0,
            end_pc: 1,
            handler_pc: 1,
            catch_type: 0,
        });
        let mut emitter = InitializerEmitter::new(&mut pool, refs);
        let merged = emitter.prepend(&original, &[1], false).unwrap();
        let boundary = (merged.code.len() - original.code.len()) as u16;
        assert_eq!(merged.exception_table[0].start_pc, boundary);
        assert_eq!(merged.exception_table[0].end_pc, boundary + 1);
    }

    #[test]
    fn prepend_restores_entry_state_with_a_chop_frame() {
        let mut pool = ConstantPool::new();
        let refs = refs_in(&mut pool);
        let original = CodeAttribute::new(0, 0, vec![op::RETURN]);
        let mut emitter = InitializerEmitter::new(&mut pool, refs);
        let merged = emitter.prepend(&original, &[4, 5], true).unwrap();
        let smt_info = &merged.attributes.last().unwrap().info;
        let table = StackMapTable::parse(smt_info).unwrap();
        assert_eq!(table.frames.len(), 3);
        assert!(matches!(table.frames[2], StackMapFrame::Chop { k: 3, .. }));
    }

    #[test]
    fn prepend_rechains_original_frames() {
        let mut pool = ConstantPool::new();
        let refs = refs_in(&mut pool);
        // body: goto over a nop landing on a frame at old offset 4
        let body = vec![op::GOTO, 0, 4, op::NOP, op::RETURN];
        let original_frames = StackMapTable { frames: vec![StackMapFrame::Same { offset_delta: 4 }] };
        let smt_name = pool.try_add_utf8("StackMapTable").unwrap();
        let mut original = CodeAttribute::new(0, 0, body);
        original.attributes.push(AttributeInfo::new(smt_name, original_frames.to_bytes()));

        let mut emitter = InitializerEmitter::new(&mut pool, refs);
        let merged = emitter.prepend(&original, &[1, 2], true).unwrap();
        let table = StackMapTable::parse(&merged.attributes.last().unwrap().info).unwrap();
        // loop head, loop exit, restore chop, then the original frame one
        // delta earlier relative to the chop
        assert_eq!(table.frames.len(), 4);
        assert_eq!(table.frames[3], StackMapFrame::Same { offset_delta: 3 });
    }

    #[test]
    fn max_stack_of_checksum_loop_is_six() {
        let mut pool = ConstantPool::new();
        let refs = refs_in(&mut pool);
        let mut emitter = InitializerEmitter::new(&mut pool, refs);
        let prefix = emitter.emit_prefix(&[10, 20, 30]).unwrap();
        assert_eq!(compute_max_stack(&prefix.code, &pool).unwrap(), 6);
        assert_eq!(compute_max_locals(&prefix.code).unwrap(), 4);
    }

    #[test]
    fn foreign_opcode_fails_stack_computation() {
        let pool = ConstantPool::new();
        assert!(compute_max_stack(&[0xC4], &pool).is_err());
    }
}
