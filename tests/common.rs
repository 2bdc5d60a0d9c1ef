// Common test utilities: synthetic carrier classes built with the crate's
// own writer, mirroring the javac output the engine is normally fed.
#![allow(dead_code)]

use ghostclass::classfile::defs::access_flags::{ACC_PUBLIC, ACC_STATIC, ACC_SUPER};
use ghostclass::classfile::opcodes as op;
use ghostclass::classfile::{
    class_file_to_bytes, AttributeInfo, ClassFile, CodeAttribute, MethodInfo,
};

/// `public class <name> { public <name>() {} }`
pub fn carrier_class(name: &str) -> ClassFile {
    let mut class = ClassFile::new();
    class.access_flags = ACC_PUBLIC | ACC_SUPER;
    class.this_class = class.constant_pool.try_add_class(name).unwrap();
    class.super_class = class.constant_pool.try_add_class("java/lang/Object").unwrap();

    let object_init = class
        .constant_pool
        .try_add_method_ref("java/lang/Object", "<init>", "()V")
        .unwrap();
    let mut code = vec![op::ALOAD_0, op::INVOKESPECIAL];
    code.extend_from_slice(&object_init.to_be_bytes());
    code.push(op::RETURN);

    let name_index = class.constant_pool.try_add_utf8("<init>").unwrap();
    let descriptor_index = class.constant_pool.try_add_utf8("()V").unwrap();
    let code_name = class.constant_pool.try_add_utf8("Code").unwrap();
    let mut ctor = MethodInfo::new(ACC_PUBLIC, name_index, descriptor_index);
    ctor.attributes.push(AttributeInfo::new(code_name, CodeAttribute::new(1, 1, code).to_bytes()));
    class.methods.push(ctor);
    class
}

pub fn build_carrier(name: &str) -> Vec<u8> {
    class_file_to_bytes(&carrier_class(name))
}

/// A carrier that already owns a `<clinit>` storing 42 into `static int SEED`.
pub fn build_carrier_with_clinit(name: &str) -> Vec<u8> {
    let mut class = carrier_class(name);
    class.append_field(ACC_PUBLIC | ACC_STATIC, "SEED", "I").unwrap();
    let seed_ref = class.constant_pool.try_add_field_ref(name, "SEED", "I").unwrap();

    let mut code = vec![op::BIPUSH, 42, op::PUTSTATIC];
    code.extend_from_slice(&seed_ref.to_be_bytes());
    code.push(op::RETURN);
    class.append_static_initializer(CodeAttribute::new(1, 0, code)).unwrap();
    class_file_to_bytes(&class)
}

/// A carrier with a `public static void ping() {}` entry point.
pub fn build_carrier_with_ping(name: &str) -> Vec<u8> {
    let mut class = carrier_class(name);
    let name_index = class.constant_pool.try_add_utf8("ping").unwrap();
    let descriptor_index = class.constant_pool.try_add_utf8("()V").unwrap();
    let code_name = class.constant_pool.try_add_utf8("Code").unwrap();
    let mut ping = MethodInfo::new(ACC_PUBLIC | ACC_STATIC, name_index, descriptor_index);
    ping.attributes
        .push(AttributeInfo::new(code_name, CodeAttribute::new(0, 0, vec![op::RETURN]).to_bytes()));
    class.methods.push(ping);
    class_file_to_bytes(&class)
}

/// The original `<clinit>` body bytes of [`build_carrier_with_clinit`], for
/// suffix-preservation assertions.
pub fn clinit_body_of(class_bytes: &[u8]) -> Vec<u8> {
    let class = ghostclass::classfile::parse(class_bytes).unwrap();
    let index = class.find_static_initializer().expect("carrier has a <clinit>");
    class.method_code(index).unwrap().code
}
