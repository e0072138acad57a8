//! Preflight checks on build artifacts.
//!
//! Runs before anything is mutated or executed, so a missing artifact never
//! leaves a half-patched kernelspec or a registry entry behind.
//!
//! # Example
//!
//! ```rust
//! use std::path::PathBuf;
//! use kayton_kernel_installer::layout::{Profile, WorkspaceLayout};
//! use kayton_kernel_installer::preflight::validate_artifacts;
//!
//! let layout = WorkspaceLayout::resolve(None, PathBuf::from("/nonexistent"), Profile::Debug);
//! assert!(validate_artifacts(&layout, Profile::Debug, false).is_err());
//! ```

use crate::error::InstallError;
use crate::layout::{Profile, WorkspaceLayout};

/// Check that the kernelspec exists and, when the descriptor will be pointed
/// at it, that the kernel executable exists too.
///
/// The descriptor is checked first; the executable only when
/// `use_absolute_exe` is set.
pub fn validate_artifacts(
    layout: &WorkspaceLayout,
    profile: Profile,
    use_absolute_exe: bool,
) -> Result<(), InstallError> {
    if !layout.descriptor_path.is_file() {
        return Err(InstallError::MissingArtifact {
            path: layout.descriptor_path.clone(),
            profile,
        });
    }

    if use_absolute_exe && !layout.executable_path.is_file() {
        return Err(InstallError::MissingExecutable {
            path: layout.executable_path.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn layout_in(temp: &TempDir) -> WorkspaceLayout {
        WorkspaceLayout::resolve(None, temp.path().join("target"), Profile::Debug)
    }

    fn write_descriptor(layout: &WorkspaceLayout) {
        fs::create_dir_all(&layout.spec_dir).unwrap();
        fs::write(&layout.descriptor_path, r#"{"argv": ["kayton_kernel"]}"#).unwrap();
    }

    #[test]
    fn test_missing_descriptor_reported_first() {
        let temp = TempDir::new().unwrap();
        let layout = layout_in(&temp);

        let err = validate_artifacts(&layout, Profile::Debug, true).unwrap_err();
        match err {
            InstallError::MissingArtifact { path, profile } => {
                assert_eq!(path, layout.descriptor_path);
                assert_eq!(profile, Profile::Debug);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_executable_ignored_without_absolute_exe() {
        let temp = TempDir::new().unwrap();
        let layout = layout_in(&temp);
        write_descriptor(&layout);

        assert!(validate_artifacts(&layout, Profile::Debug, false).is_ok());
    }

    #[test]
    fn test_missing_executable_with_absolute_exe() {
        let temp = TempDir::new().unwrap();
        let layout = layout_in(&temp);
        write_descriptor(&layout);

        let err = validate_artifacts(&layout, Profile::Debug, true).unwrap_err();
        match err {
            InstallError::MissingExecutable { path } => assert_eq!(path, layout.executable_path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_artifacts_present() {
        let temp = TempDir::new().unwrap();
        let layout = layout_in(&temp);
        write_descriptor(&layout);
        fs::write(&layout.executable_path, b"\x7fELF").unwrap();

        assert!(validate_artifacts(&layout, Profile::Debug, true).is_ok());
    }
}
