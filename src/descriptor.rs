//! Launch descriptor (`kernel.json`) rewriting.
//!
//! The build script writes `argv[0]` as the bare `kayton_kernel`, which only
//! works if the kernel is on the registry's `PATH`. Rewriting it to the
//! absolute executable path makes the kernelspec self-contained.
//!
//! Only `argv[0]` changes. Every other key, and its position in the object,
//! is written back as it was read.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::DescriptorPatchFailure;

/// Result of a rewrite attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// `argv[0]` now points at `executable`.
    Rewritten { previous: String, executable: PathBuf },
    /// `argv` was missing or empty; the file was not written.
    ArgvEmpty,
}

/// Point `argv[0]` of the descriptor at the absolute path of `executable_path`.
///
/// Nothing is written unless the descriptor was read and parsed. The write
/// goes to a sibling temporary file that is renamed over the descriptor, so a
/// failed write leaves the original in place.
pub fn patch_descriptor(
    descriptor_path: &Path,
    executable_path: &Path,
) -> Result<PatchOutcome, DescriptorPatchFailure> {
    let executable = fs::canonicalize(executable_path).map_err(|source| {
        DescriptorPatchFailure::ResolveExecutable {
            path: executable_path.to_path_buf(),
            source,
        }
    })?;

    let bytes = fs::read(descriptor_path).map_err(|source| DescriptorPatchFailure::Read {
        path: descriptor_path.to_path_buf(),
        source,
    })?;
    let mut document: Value =
        serde_json::from_slice(&bytes).map_err(|source| DescriptorPatchFailure::Parse {
            path: descriptor_path.to_path_buf(),
            source,
        })?;

    let object = document
        .as_object_mut()
        .ok_or_else(|| DescriptorPatchFailure::NotAnObject {
            path: descriptor_path.to_path_buf(),
        })?;

    let argv = match object.get_mut("argv") {
        None | Some(Value::Null) => return Ok(PatchOutcome::ArgvEmpty),
        Some(Value::Array(argv)) => argv,
        Some(_) => {
            return Err(DescriptorPatchFailure::InvalidArgv {
                path: descriptor_path.to_path_buf(),
            })
        }
    };
    let Some(first) = argv.first_mut() else {
        return Ok(PatchOutcome::ArgvEmpty);
    };

    let previous = match &*first {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    *first = Value::String(executable.display().to_string());

    let rendered = serde_json::to_vec_pretty(&document).map_err(|source| {
        DescriptorPatchFailure::Serialize {
            path: descriptor_path.to_path_buf(),
            source,
        }
    })?;
    write_replacing(descriptor_path, &rendered).map_err(|source| DescriptorPatchFailure::Write {
        path: descriptor_path.to_path_buf(),
        source,
    })?;

    Ok(PatchOutcome::Rewritten {
        previous,
        executable,
    })
}

/// Replace the file at `path`, following symlinks so the link target is what
/// gets rewritten.
fn write_replacing(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path)?;
    let tmp = tmp_sibling(&target);
    let written = fs::write(&tmp, bytes).and_then(|()| fs::rename(&tmp, &target));
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|part| part.to_str())
        .unwrap_or("kernel.json");
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
