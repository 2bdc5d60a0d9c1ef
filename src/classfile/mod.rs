//! Round-trippable class-file codec
//!
//! Parses a class file into an editable tree and serializes it back. Any
//! region the caller does not rewrite is emitted byte-for-byte.

pub mod attribute;
pub mod class;
pub mod constpool;
pub mod defs;
pub mod field;
pub mod frame;
pub mod method;
pub mod opcodes;
pub mod reader;
pub mod visitor;
pub mod writer;

pub use attribute::{AttributeInfo, CodeAttribute, ExceptionTableEntry};
pub use class::ClassFile;
pub use constpool::{Constant, ConstantPool};
pub use field::FieldInfo;
pub use frame::{StackMapFrame, StackMapTable, VerificationType};
pub use method::MethodInfo;
pub use reader::parse;
pub use visitor::{accept, ClassVisitor};
pub use writer::class_file_to_bytes;
