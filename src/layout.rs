//! Build output layout for the Kayton kernel.
//!
//! The kernel's build script writes its kernelspec under
//! `<target>/<profile>/kayton_kernelspec/kayton/kernel.json` and cargo puts the
//! executable at `<target>/<profile>/kayton_kernel`. Everything here is derived
//! from the target directory and profile; nothing is persisted.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::InstallError;

/// Directory the kernel build script writes its kernelspec into.
pub const KERNELSPEC_DIR: &str = "kayton_kernelspec";

/// Fixed leaf under [`KERNELSPEC_DIR`]. The registry name is chosen at install
/// time and does not change where the build script writes.
pub const KERNELSPEC_LEAF: &str = "kayton";

pub const DESCRIPTOR_FILENAME: &str = "kernel.json";

pub const KERNEL_BIN_NAME: &str = "kayton_kernel";

/// How many parents of the running executable are searched for a workspace.
const MAX_ROOT_DEPTH: usize = 6;

/// Cargo build profile whose artifacts are installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Profile {
    #[default]
    Debug,
    Release,
}

impl Profile {
    pub fn dir_name(self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Platform file name of the kernel executable (`kayton_kernel.exe` on Windows).
pub fn kernel_exe_name() -> String {
    format!("{KERNEL_BIN_NAME}{}", std::env::consts::EXE_SUFFIX)
}

/// Resolved artifact paths for one install run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    /// `None` when the target directory was given explicitly.
    pub workspace_root: Option<PathBuf>,
    pub target_dir: PathBuf,
    pub spec_dir: PathBuf,
    pub descriptor_path: PathBuf,
    pub executable_path: PathBuf,
}

impl WorkspaceLayout {
    /// Derive every artifact path from a target directory and profile.
    pub fn resolve(workspace_root: Option<PathBuf>, target_dir: PathBuf, profile: Profile) -> Self {
        let profile_dir = target_dir.join(profile.dir_name());
        let spec_dir = profile_dir.join(KERNELSPEC_DIR).join(KERNELSPEC_LEAF);
        let descriptor_path = spec_dir.join(DESCRIPTOR_FILENAME);
        let executable_path = profile_dir.join(kernel_exe_name());
        Self {
            workspace_root,
            target_dir,
            spec_dir,
            descriptor_path,
            executable_path,
        }
    }

    /// Resolve the layout, consulting `discovery` only when no target
    /// directory override is given.
    pub fn locate(
        target_dir_override: Option<&Path>,
        profile: Profile,
        discovery: &dyn RootDiscovery,
    ) -> Result<Self, InstallError> {
        if let Some(target_dir) = target_dir_override {
            return Ok(Self::resolve(None, target_dir.to_path_buf(), profile));
        }
        let root = discovery.discover()?;
        let target_dir = root.join("target");
        Ok(Self::resolve(Some(root), target_dir, profile))
    }
}

/// Strategy for finding the workspace whose `target/` holds the artifacts.
pub trait RootDiscovery {
    fn discover(&self) -> Result<PathBuf, InstallError>;
}

/// A root supplied up front.
#[derive(Debug, Clone)]
pub struct FixedRoot(pub PathBuf);

impl RootDiscovery for FixedRoot {
    fn discover(&self) -> Result<PathBuf, InstallError> {
        Ok(self.0.clone())
    }
}

/// Walks up from the installer's own executable (normally
/// `<ws>/target/<profile>/kayton-kernel`) to the first directory holding a
/// `Cargo.toml`, falling back to the working directory.
#[derive(Debug, Clone)]
pub struct ExecutableAncestors {
    exe: PathBuf,
    cwd: PathBuf,
}

impl ExecutableAncestors {
    pub fn new(exe: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            cwd: cwd.into(),
        }
    }

    /// Discovery rooted at the running process.
    pub fn from_process() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_exe()?, std::env::current_dir()?))
    }
}

impl RootDiscovery for ExecutableAncestors {
    fn discover(&self) -> Result<PathBuf, InstallError> {
        let found = self
            .exe
            .ancestors()
            .skip(1)
            .take(MAX_ROOT_DEPTH)
            .find(|candidate| candidate.join("Cargo.toml").is_file());
        if let Some(root) = found {
            return Ok(root.to_path_buf());
        }
        if self.cwd.join("Cargo.toml").is_file() {
            return Ok(self.cwd.clone());
        }
        Err(InstallError::WorkspaceRootNotFound {
            start: self.exe.clone(),
        })
    }
}
