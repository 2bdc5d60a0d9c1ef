//! StackMapTable frames: serialization, parsing, and relocation

use super::attribute::SliceReader;
use crate::common::error::{Error, Result};

/// VerificationTypeInfo as defined in JVMS 4.7.4
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationType {
    Top,
    Integer,
    Float,
    Double,
    Long,
    Null,
    UninitializedThis,
    Object(u16),        // cpool index to CONSTANT_Class
    Uninitialized(u16), // code offset of the creating `new`
}

impl VerificationType {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        match self {
            VerificationType::Top => bytes.push(0),
            VerificationType::Integer => bytes.push(1),
            VerificationType::Float => bytes.push(2),
            VerificationType::Double => bytes.push(3),
            VerificationType::Long => bytes.push(4),
            VerificationType::Null => bytes.push(5),
            VerificationType::UninitializedThis => bytes.push(6),
            VerificationType::Object(cp_index) => {
                bytes.push(7);
                bytes.extend_from_slice(&cp_index.to_be_bytes());
            }
            VerificationType::Uninitialized(offset) => {
                bytes.push(8);
                bytes.extend_from_slice(&offset.to_be_bytes());
            }
        }
        bytes
    }

    fn parse(r: &mut SliceReader<'_>) -> Result<Self> {
        Ok(match r.read_u8("verification type tag")? {
            0 => VerificationType::Top,
            1 => VerificationType::Integer,
            2 => VerificationType::Float,
            3 => VerificationType::Double,
            4 => VerificationType::Long,
            5 => VerificationType::Null,
            6 => VerificationType::UninitializedThis,
            7 => VerificationType::Object(r.read_u16("Object class index")?),
            8 => VerificationType::Uninitialized(r.read_u16("Uninitialized offset")?),
            other => return Err(Error::parse(format!("bad verification type tag {other}"))),
        })
    }

    /// Relocate an `Uninitialized` offset; every other type is positionless.
    fn shifted(&self, delta: u16) -> Self {
        match self {
            VerificationType::Uninitialized(offset) => {
                VerificationType::Uninitialized(offset + delta)
            }
            other => other.clone(),
        }
    }
}

/// StackMapFrame variants as defined in JVMS 4.7.4
#[derive(Debug, Clone, PartialEq)]
pub enum StackMapFrame {
    Same { offset_delta: u16 },
    SameLocals1StackItem { offset_delta: u16, stack: VerificationType },
    Chop { k: u8, offset_delta: u16 }, // k in {1,2,3}
    SameExtended { offset_delta: u16 },
    Append { k: u8, offset_delta: u16, locals: Vec<VerificationType> }, // k in {1,2,3}
    Full { offset_delta: u16, locals: Vec<VerificationType>, stack: Vec<VerificationType> },
}

impl StackMapFrame {
    pub fn offset_delta(&self) -> u16 {
        match self {
            StackMapFrame::Same { offset_delta }
            | StackMapFrame::SameLocals1StackItem { offset_delta, .. }
            | StackMapFrame::Chop { offset_delta, .. }
            | StackMapFrame::SameExtended { offset_delta }
            | StackMapFrame::Append { offset_delta, .. }
            | StackMapFrame::Full { offset_delta, .. } => *offset_delta,
        }
    }

    pub fn with_offset_delta(&self, offset_delta: u16) -> Self {
        let mut frame = self.clone();
        match &mut frame {
            StackMapFrame::Same { offset_delta: d }
            | StackMapFrame::SameLocals1StackItem { offset_delta: d, .. }
            | StackMapFrame::Chop { offset_delta: d, .. }
            | StackMapFrame::SameExtended { offset_delta: d }
            | StackMapFrame::Append { offset_delta: d, .. }
            | StackMapFrame::Full { offset_delta: d, .. } => *d = offset_delta,
        }
        frame
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        match self {
            StackMapFrame::Same { offset_delta } => {
                if *offset_delta <= 63 {
                    bytes.push(*offset_delta as u8);
                } else {
                    bytes.push(251); // same_frame_extended
                    bytes.extend_from_slice(&offset_delta.to_be_bytes());
                }
            }
            StackMapFrame::SameLocals1StackItem { offset_delta, stack } => {
                if *offset_delta <= 63 {
                    bytes.push(64 + *offset_delta as u8);
                } else {
                    bytes.push(247); // same_locals_1_stack_item_frame_extended
                    bytes.extend_from_slice(&offset_delta.to_be_bytes());
                }
                bytes.extend_from_slice(&stack.to_bytes());
            }
            StackMapFrame::Chop { k, offset_delta } => {
                // chop frames occupy tags 248-250; tag = 251 - k
                bytes.push(251 - *k);
                bytes.extend_from_slice(&offset_delta.to_be_bytes());
            }
            StackMapFrame::SameExtended { offset_delta } => {
                bytes.push(251);
                bytes.extend_from_slice(&offset_delta.to_be_bytes());
            }
            StackMapFrame::Append { k, offset_delta, locals } => {
                // append frames occupy tags 252-254; tag = 251 + k
                bytes.push(251 + *k);
                bytes.extend_from_slice(&offset_delta.to_be_bytes());
                for local in locals {
                    bytes.extend_from_slice(&local.to_bytes());
                }
            }
            StackMapFrame::Full { offset_delta, locals, stack } => {
                bytes.push(255);
                bytes.extend_from_slice(&offset_delta.to_be_bytes());
                bytes.extend_from_slice(&(locals.len() as u16).to_be_bytes());
                for local in locals {
                    bytes.extend_from_slice(&local.to_bytes());
                }
                bytes.extend_from_slice(&(stack.len() as u16).to_be_bytes());
                for item in stack {
                    bytes.extend_from_slice(&item.to_bytes());
                }
            }
        }
        bytes
    }

    fn parse(r: &mut SliceReader<'_>) -> Result<Self> {
        let tag = r.read_u8("stack map frame tag")?;
        Ok(match tag {
            0..=63 => StackMapFrame::Same { offset_delta: tag as u16 },
            64..=127 => StackMapFrame::SameLocals1StackItem {
                offset_delta: (tag - 64) as u16,
                stack: VerificationType::parse(r)?,
            },
            247 => StackMapFrame::SameLocals1StackItem {
                offset_delta: r.read_u16("frame offset delta")?,
                stack: VerificationType::parse(r)?,
            },
            248..=250 => StackMapFrame::Chop {
                k: 251 - tag,
                offset_delta: r.read_u16("frame offset delta")?,
            },
            251 => StackMapFrame::SameExtended { offset_delta: r.read_u16("frame offset delta")? },
            252..=254 => {
                let k = tag - 251;
                let offset_delta = r.read_u16("frame offset delta")?;
                let mut locals = Vec::with_capacity(k as usize);
                for _ in 0..k {
                    locals.push(VerificationType::parse(r)?);
                }
                StackMapFrame::Append { k, offset_delta, locals }
            }
            255 => {
                let offset_delta = r.read_u16("frame offset delta")?;
                let local_count = r.read_u16("frame locals count")? as usize;
                let mut locals = Vec::with_capacity(local_count);
                for _ in 0..local_count {
                    locals.push(VerificationType::parse(r)?);
                }
                let stack_count = r.read_u16("frame stack count")? as usize;
                let mut stack = Vec::with_capacity(stack_count);
                for _ in 0..stack_count {
                    stack.push(VerificationType::parse(r)?);
                }
                StackMapFrame::Full { offset_delta, locals, stack }
            }
            other => return Err(Error::parse(format!("bad stack map frame tag {other}"))),
        })
    }

    pub(crate) fn shifted_types(&self, delta: u16) -> Self {
        match self {
            StackMapFrame::SameLocals1StackItem { offset_delta, stack } => {
                StackMapFrame::SameLocals1StackItem {
                    offset_delta: *offset_delta,
                    stack: stack.shifted(delta),
                }
            }
            StackMapFrame::Append { k, offset_delta, locals } => StackMapFrame::Append {
                k: *k,
                offset_delta: *offset_delta,
                locals: locals.iter().map(|t| t.shifted(delta)).collect(),
            },
            StackMapFrame::Full { offset_delta, locals, stack } => StackMapFrame::Full {
                offset_delta: *offset_delta,
                locals: locals.iter().map(|t| t.shifted(delta)).collect(),
                stack: stack.iter().map(|t| t.shifted(delta)).collect(),
            },
            other => other.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct StackMapTable {
    pub frames: Vec<StackMapFrame>,
}

impl StackMapTable {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn parse(info: &[u8]) -> Result<Self> {
        let mut r = SliceReader::new(info);
        let count = r.read_u16("stack map frame count")? as usize;
        let mut frames = Vec::with_capacity(count);
        for _ in 0..count {
            frames.push(StackMapFrame::parse(&mut r)?);
        }
        if !r.is_at_end() {
            return Err(Error::parse("trailing bytes after stack map frames"));
        }
        Ok(Self { frames })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(self.frames.len() as u16).to_be_bytes());
        for frame in &self.frames {
            bytes.extend_from_slice(&frame.to_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_round_trip_through_bytes() {
        let table = StackMapTable {
            frames: vec![
                StackMapFrame::Append {
                    k: 3,
                    offset_delta: 1500,
                    locals: vec![
                        VerificationType::Long,
                        VerificationType::Object(9),
                        VerificationType::Integer,
                    ],
                },
                StackMapFrame::Same { offset_delta: 22 },
                StackMapFrame::Chop { k: 3, offset_delta: 7 },
                StackMapFrame::Full {
                    offset_delta: 90,
                    locals: vec![VerificationType::Uninitialized(3)],
                    stack: vec![VerificationType::Null],
                },
            ],
        };
        let bytes = table.to_bytes();
        assert_eq!(StackMapTable::parse(&bytes).unwrap(), table);
    }

    #[test]
    fn chop_frame_uses_jvms_tag_range() {
        let frame = StackMapFrame::Chop { k: 3, offset_delta: 4 };
        assert_eq!(frame.to_bytes()[0], 248);
        let frame = StackMapFrame::Chop { k: 1, offset_delta: 4 };
        assert_eq!(frame.to_bytes()[0], 250);
    }

    #[test]
    fn wide_same_frame_falls_back_to_extended() {
        let frame = StackMapFrame::Same { offset_delta: 100 };
        let bytes = frame.to_bytes();
        assert_eq!(bytes[0], 251);
        assert_eq!(StackMapFrame::parse(&mut SliceReader::new(&bytes)).unwrap(),
            StackMapFrame::SameExtended { offset_delta: 100 });
    }

    #[test]
    fn type_shift_moves_uninitialized_offsets_only() {
        let frame = StackMapFrame::Full {
            offset_delta: 10,
            locals: vec![VerificationType::Uninitialized(2), VerificationType::Long],
            stack: vec![VerificationType::Uninitialized(7)],
        };
        assert_eq!(
            frame.shifted_types(40),
            StackMapFrame::Full {
                offset_delta: 10,
                locals: vec![VerificationType::Uninitialized(42), VerificationType::Long],
                stack: vec![VerificationType::Uninitialized(47)],
            }
        );
        let same = StackMapFrame::Same { offset_delta: 5 };
        assert_eq!(same.shifted_types(40), same);
    }
}
