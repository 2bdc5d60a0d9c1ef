//! Java bytecode instruction opcodes
//!
//! Values follow the Java Virtual Machine Specification, ordered by opcode.
//! Only the families the initializer emitter and its simulator touch are
//! listed; the codec itself never interprets code it does not rewrite.

// 0x00 - 0x0F: Constants
pub const NOP: u8 = 0x00;
pub const ICONST_M1: u8 = 0x02;
pub const ICONST_0: u8 = 0x03;
pub const ICONST_1: u8 = 0x04;
pub const ICONST_2: u8 = 0x05;
pub const ICONST_3: u8 = 0x06;
pub const ICONST_4: u8 = 0x07;
pub const ICONST_5: u8 = 0x08;
pub const LCONST_0: u8 = 0x09;
pub const LCONST_1: u8 = 0x0a;

// 0x10 - 0x14: Pushes and pool loads
pub const BIPUSH: u8 = 0x10;
pub const SIPUSH: u8 = 0x11;
pub const LDC: u8 = 0x12;
pub const LDC_W: u8 = 0x13;
pub const LDC2_W: u8 = 0x14;

// 0x15 - 0x2D: Loads
pub const ILOAD: u8 = 0x15;
pub const LLOAD: u8 = 0x16;
pub const ALOAD: u8 = 0x19;
pub const ILOAD_0: u8 = 0x1a;
pub const ILOAD_1: u8 = 0x1b;
pub const ILOAD_2: u8 = 0x1c;
pub const ILOAD_3: u8 = 0x1d;
pub const LLOAD_0: u8 = 0x1e;
pub const ALOAD_0: u8 = 0x2a;
pub const ALOAD_1: u8 = 0x2b;
pub const ALOAD_2: u8 = 0x2c;
pub const ALOAD_3: u8 = 0x2d;

// 0x2E: Array loads
pub const IALOAD: u8 = 0x2e;

// 0x36 - 0x4E: Stores
pub const ISTORE: u8 = 0x36;
pub const LSTORE: u8 = 0x37;
pub const ASTORE: u8 = 0x3a;
pub const ISTORE_0: u8 = 0x3b;
pub const ISTORE_1: u8 = 0x3c;
pub const ISTORE_2: u8 = 0x3d;
pub const ISTORE_3: u8 = 0x3e;
pub const LSTORE_0: u8 = 0x3f;
pub const ASTORE_0: u8 = 0x4b;
pub const ASTORE_1: u8 = 0x4c;
pub const ASTORE_2: u8 = 0x4d;
pub const ASTORE_3: u8 = 0x4e;

// 0x4F: Array stores
pub const IASTORE: u8 = 0x4f;

// 0x57 - 0x5F: Stack operations
pub const POP: u8 = 0x57;
pub const DUP: u8 = 0x59;

// 0x60 - 0x83: Arithmetic and logic
pub const LMUL: u8 = 0x69;
pub const LXOR: u8 = 0x83;
pub const IINC: u8 = 0x84;

// 0x85: Conversions
pub const I2L: u8 = 0x85;

// 0x99 - 0xB1: Control flow
pub const IF_ICMPGE: u8 = 0xa2;
pub const GOTO: u8 = 0xa7;
pub const RETURN: u8 = 0xb1;

// 0xB2 - 0xB8: Field and method access
pub const GETSTATIC: u8 = 0xb2;
pub const PUTSTATIC: u8 = 0xb3;
pub const INVOKESPECIAL: u8 = 0xb7;
pub const INVOKESTATIC: u8 = 0xb8;

// 0xBC - 0xBE: Arrays
pub const NEWARRAY: u8 = 0xbc;
pub const ARRAYLENGTH: u8 = 0xbe;

/// `newarray` element type code for `int[]`
pub const T_INT: u8 = 10;
