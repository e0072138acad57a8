//! Registers a built Kayton kernel with Jupyter.
//!
//! The kernel's build script leaves a kernelspec under the cargo target
//! directory. This crate finds it, optionally points its `argv[0]` at the
//! built executable, and hands the directory to `jupyter kernelspec install`.
//!
//! # Architecture
//!
//! ```text
//! kayton-kernel (bin)
//!     │
//!     └── install::Installer
//!             ├── layout      target/profile paths, workspace root discovery
//!             ├── preflight   artifact existence checks
//!             ├── descriptor  best-effort kernel.json argv[0] rewrite
//!             └── registry    jupyter lookup, argv, child process
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use kayton_kernel_installer::install::{InstallRequest, Installer};
//! use kayton_kernel_installer::layout::ExecutableAncestors;
//! use kayton_kernel_installer::registry::{ProcessRunner, ToolLookup};
//!
//! let mut installer = Installer::new(
//!     ExecutableAncestors::from_process()?,
//!     ToolLookup::from_env(None)?,
//!     ProcessRunner,
//! );
//! let report = installer.install(&InstallRequest::default())?;
//! println!("installed {} from {}", report.name, report.spec_dir().display());
//! ```

pub mod descriptor;
pub mod error;
pub mod install;
pub mod layout;
pub mod logging;
pub mod preflight;
pub mod registry;

pub use error::{DescriptorPatchFailure, InstallError, RegistryFailure};
pub use install::{InstallReport, InstallRequest, Installer, PatchStatus};
pub use layout::{Profile, WorkspaceLayout};
pub use registry::InstallScope;
