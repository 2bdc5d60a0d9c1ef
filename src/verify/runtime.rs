//! Runtime verification gateway
//!
//! Answers the gateway's second question: does the host environment accept
//! and execute the emitted bytes? The class is written to a uniquely-named
//! scratch directory together with a probe class synthesized by this crate's
//! own writer; the host launcher then loads the probe, which either forces
//! resolution of the target class or invokes a static no-arg entry point.
//! The scratch directory is released on every exit path.

use std::path::PathBuf;
use std::process::Command;
use std::{env, fs, process};

use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::classfile::defs::access_flags::{ACC_PUBLIC, ACC_STATIC, ACC_SUPER};
use crate::classfile::opcodes as op;
use crate::classfile::{class_file_to_bytes, AttributeInfo, ClassFile, CodeAttribute, MethodInfo};
use crate::common::error::{Error, Result};
use crate::verify::verify_structural;

/// Environment variable overriding the host launcher binary.
pub const LAUNCHER_ENV: &str = "GHOSTCLASS_JAVA";

const PROBE_CLASS_NAME: &str = "LoaderProbe";

/// Structural check, then load (and optionally run) on the host VM.
///
/// `class_name` is the internal name the carrier declares; `entry_point`, if
/// given, names a public static no-arg void method to invoke after loading.
pub fn verify_runtime(bytes: &[u8], class_name: &str, entry_point: Option<&str>) -> Result<()> {
    verify_structural(bytes)?;

    let scratch = ScratchDir::create()?;
    let class_path = scratch.path.join(format!("{class_name}.class"));
    if let Some(parent) = class_path.parent() {
        fs::create_dir_all(parent).map_err(|e| gateway_failure("create package directory", &e))?;
    }
    fs::write(&class_path, bytes).map_err(|e| gateway_failure("write class file", &e))?;

    let probe = build_probe(class_name, entry_point)?;
    fs::write(scratch.path.join(format!("{PROBE_CLASS_NAME}.class")), probe)
        .map_err(|e| gateway_failure("write probe class", &e))?;

    let launcher = launcher();
    debug!("running {launcher} -cp {} {PROBE_CLASS_NAME}", scratch.path.display());
    let output = Command::new(&launcher)
        .arg("-cp")
        .arg(&scratch.path)
        .arg(PROBE_CLASS_NAME)
        .output()
        .map_err(|e| Error::VerifyFailed {
            details: format!("failed to launch '{launcher}': {e}"),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        let mut details = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if details.is_empty() {
            details = String::from_utf8_lossy(&output.stdout).trim().to_string();
        }
        Err(Error::VerifyFailed {
            details: format!("host rejected class ({}): {details}", output.status),
        })
    }
}

/// Structural plus load-only runtime verification.
pub fn verify_full(bytes: &[u8], class_name: &str) -> Result<()> {
    verify_runtime(bytes, class_name, None)
}

/// True when the host launcher is present; lets callers and tests skip
/// runtime verification on hosts without a VM.
pub fn runtime_available() -> bool {
    Command::new(launcher()).arg("-version").output().is_ok()
}

fn launcher() -> String {
    env::var(LAUNCHER_ENV).unwrap_or_else(|_| "java".to_string())
}

fn gateway_failure(what: &str, err: &std::io::Error) -> Error {
    Error::VerifyFailed { details: format!("could not {what}: {err}") }
}

/// Synthesize the probe: `public class LoaderProbe { public static void
/// main(String[]) { <ldc target.class, pop | invokestatic target.entry()> } }`
fn build_probe(target: &str, entry_point: Option<&str>) -> Result<Vec<u8>> {
    let mut class = ClassFile::new();
    class.access_flags = ACC_PUBLIC | ACC_SUPER;
    class.this_class = class.constant_pool.try_add_class(PROBE_CLASS_NAME)?;
    class.super_class = class.constant_pool.try_add_class("java/lang/Object")?;

    let mut code = Vec::new();
    match entry_point {
        Some(entry) => {
            let target_method =
                class.constant_pool.try_add_method_ref(target, entry, "()V")?;
            code.push(op::INVOKESTATIC);
            code.extend_from_slice(&target_method.to_be_bytes());
        }
        None => {
            // an ldc of the class constant forces loading and verification
            let target_class = class.constant_pool.try_add_class(target)?;
            if target_class <= u8::MAX as u16 {
                code.push(op::LDC);
                code.push(target_class as u8);
            } else {
                code.push(op::LDC_W);
                code.extend_from_slice(&target_class.to_be_bytes());
            }
            code.push(op::POP);
        }
    }
    code.push(op::RETURN);

    let name_index = class.constant_pool.try_add_utf8("main")?;
    let descriptor_index = class.constant_pool.try_add_utf8("([Ljava/lang/String;)V")?;
    let code_name = class.constant_pool.try_add_utf8("Code")?;
    let mut main = MethodInfo::new(ACC_PUBLIC | ACC_STATIC, name_index, descriptor_index);
    main.attributes.push(AttributeInfo::new(code_name, CodeAttribute::new(1, 1, code).to_bytes()));
    class.methods.push(main);

    Ok(class_file_to_bytes(&class))
}

/// Uniquely-named scratch directory, removed when dropped.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create() -> Result<Self> {
        let mut tag = [0u8; 8];
        OsRng.fill_bytes(&mut tag);
        let suffix: String = tag.iter().map(|b| format!("{b:02x}")).collect();
        let path = env::temp_dir().join(format!("ghostclass-{}-{suffix}", process::id()));
        fs::create_dir_all(&path).map_err(|e| gateway_failure("create scratch directory", &e))?;
        Ok(Self { path })
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_dir_all(&self.path) {
            debug!("scratch directory {} not removed: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::parse;

    #[test]
    fn probe_class_parses_with_own_codec() {
        let bytes = build_probe("TestClass", None).unwrap();
        let class = parse(&bytes).unwrap();
        assert_eq!(class.class_name().as_deref(), Some(PROBE_CLASS_NAME));
        assert_eq!(class.methods.len(), 1);

        let bytes = build_probe("TestClass", Some("ping")).unwrap();
        let class = parse(&bytes).unwrap();
        let code = class.method_code(0).unwrap();
        assert_eq!(code.code[0], op::INVOKESTATIC);
        assert_eq!(code.code.last(), Some(&op::RETURN));
    }

    #[test]
    fn scratch_directory_is_released() {
        let path = {
            let scratch = ScratchDir::create().unwrap();
            assert!(scratch.path.is_dir());
            scratch.path.clone()
        };
        assert!(!path.exists());
    }
}
