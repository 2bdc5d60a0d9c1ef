//! Structural verification orchestration
//!
//! Answers the gateway's first question: is the byte sequence a well-formed
//! class file? Sub-verifiers each sweep one area; their findings accumulate
//! into a single diagnostic text instead of stopping at the first problem.

use crate::classfile::constpool::Constant;
use crate::classfile::defs::access_flags;
use crate::classfile::{parse, ClassFile};
use crate::common::error::{Error, Result};

use super::{attributes, constant_pool, fields, methods};

/// Verify that `bytes` are a structurally well-formed class file.
pub fn verify_structural(bytes: &[u8]) -> Result<()> {
    let class = match parse(bytes) {
        Ok(class) => class,
        Err(err) => return Err(Error::VerifyFailed { details: err.to_string() }),
    };
    let diagnostics = verify_class(&class);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(Error::VerifyFailed { details: diagnostics.join("; ") })
    }
}

/// Run every sub-verifier over a parsed class and collect the diagnostics.
pub fn verify_class(class: &ClassFile) -> Vec<String> {
    let mut diagnostics: Vec<String> = Vec::new();

    diagnostics.extend(verify_header(class));
    diagnostics.extend(constant_pool::verify(class).iter().map(ToString::to_string));
    diagnostics.extend(fields::verify(class).iter().map(ToString::to_string));
    diagnostics.extend(methods::verify(class).iter().map(ToString::to_string));
    diagnostics.extend(attributes::verify(class).iter().map(ToString::to_string));

    diagnostics
}

fn verify_header(class: &ClassFile) -> Vec<String> {
    let mut diagnostics = Vec::new();

    match class.constant_pool.get(class.this_class) {
        Some(Constant::Class(_)) => {}
        Some(_) => diagnostics.push(format!(
            "this_class index {} has the wrong constant kind",
            class.this_class
        )),
        None => diagnostics.push(format!("this_class index {} is out of range", class.this_class)),
    }

    // a super class of 0 is only legal for java/lang/Object itself
    if class.super_class != 0 {
        match class.constant_pool.get(class.super_class) {
            Some(Constant::Class(_)) => {}
            Some(_) => diagnostics.push(format!(
                "super_class index {} has the wrong constant kind",
                class.super_class
            )),
            None => {
                diagnostics.push(format!("super_class index {} is out of range", class.super_class))
            }
        }
    }

    for interface in &class.interfaces {
        if !matches!(class.constant_pool.get(*interface), Some(Constant::Class(_))) {
            diagnostics.push(format!("interface index {interface} is not a Class entry"));
        }
    }

    let flags = class.access_flags;
    if flags & access_flags::ACC_FINAL != 0 && flags & access_flags::ACC_ABSTRACT != 0 {
        diagnostics.push("class is both final and abstract".to_string());
    }
    if flags & access_flags::ACC_INTERFACE != 0 && flags & access_flags::ACC_ABSTRACT == 0 {
        diagnostics.push("interface is not marked abstract".to_string());
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolvable_this_class_is_reported() {
        let mut class = ClassFile::new();
        class.this_class = 40;
        let diagnostics = verify_class(&class);
        assert!(diagnostics.iter().any(|d| d.contains("this_class")));
    }

    #[test]
    fn diagnostics_accumulate_across_areas() {
        let mut class = ClassFile::new();
        class.this_class = 40;
        class.access_flags = access_flags::ACC_FINAL | access_flags::ACC_ABSTRACT;
        let diagnostics = verify_class(&class);
        assert!(diagnostics.len() >= 2);
    }
}
