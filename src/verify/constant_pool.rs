//! Constant pool well-formedness checks

use crate::classfile::class::ClassFile;
use crate::classfile::constpool::Constant;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConstantPoolVerifyError {
    #[error("Invalid constant pool index {index} referenced from slot {from}")]
    InvalidConstantPoolIndex { from: u16, index: u16 },
    #[error("Constant pool index {index} referenced from slot {from} has the wrong kind")]
    InvalidConstantPoolIndexType { from: u16, index: u16 },
    #[error("Long/Double at slot {0} is not followed by a phantom slot")]
    MissingPhantomSlot(u16),
    #[error("Phantom slot {0} does not follow a Long/Double entry")]
    StrayPhantomSlot(u16),
    #[error("Invalid method handle kind {kind} at slot {from}")]
    InvalidMethodHandleKind { from: u16, kind: u8 },
}

/// Verify every cross-reference inside the pool. All findings are collected
/// rather than stopping at the first.
pub fn verify(class_file: &ClassFile) -> Vec<ConstantPoolVerifyError> {
    use ConstantPoolVerifyError::*;
    let pool = &class_file.constant_pool;
    let mut errors = Vec::new();

    let expect = |errors: &mut Vec<ConstantPoolVerifyError>,
                      from: u16,
                      index: u16,
                      kind: fn(&Constant) -> bool| match pool.get(index) {
        Some(c) if kind(c) => {}
        Some(_) => errors.push(InvalidConstantPoolIndexType { from, index }),
        None => errors.push(InvalidConstantPoolIndex { from, index }),
    };

    let is_utf8 = |c: &Constant| matches!(c, Constant::Utf8(_));
    let is_class = |c: &Constant| matches!(c, Constant::Class(_));
    let is_nat = |c: &Constant| matches!(c, Constant::NameAndType(_, _));

    for slot in 1..=pool.len() as u16 {
        let from = slot;
        match pool.get(slot) {
            Some(Constant::Class(i) | Constant::Module(i) | Constant::Package(i)) => {
                expect(&mut errors, from, *i, is_utf8)
            }
            Some(Constant::String(i) | Constant::MethodType(i)) => {
                expect(&mut errors, from, *i, is_utf8)
            }
            Some(
                Constant::FieldRef(c, nt)
                | Constant::MethodRef(c, nt)
                | Constant::InterfaceMethodRef(c, nt),
            ) => {
                expect(&mut errors, from, *c, is_class);
                expect(&mut errors, from, *nt, is_nat);
            }
            Some(Constant::NameAndType(n, d)) => {
                expect(&mut errors, from, *n, is_utf8);
                expect(&mut errors, from, *d, is_utf8);
            }
            Some(Constant::MethodHandle(kind, reference)) => {
                if !(1..=9).contains(kind) {
                    errors.push(InvalidMethodHandleKind { from, kind: *kind });
                }
                if pool.get(*reference).is_none() {
                    errors.push(InvalidConstantPoolIndex { from, index: *reference });
                }
            }
            Some(Constant::Dynamic(_, nt) | Constant::InvokeDynamic(_, nt)) => {
                expect(&mut errors, from, *nt, is_nat)
            }
            Some(Constant::Long(_) | Constant::Double(_)) => {
                if !matches!(pool.get(slot + 1), Some(Constant::Placeholder)) {
                    errors.push(MissingPhantomSlot(slot));
                }
            }
            Some(Constant::Placeholder) => {
                let prev = if slot >= 2 { pool.get(slot - 1) } else { None };
                if !matches!(prev, Some(Constant::Long(_) | Constant::Double(_))) {
                    errors.push(StrayPhantomSlot(slot));
                }
            }
            Some(Constant::Utf8(_) | Constant::Integer(_) | Constant::Float(_)) | None => {}
        }
    }
    errors
}
