//! Failure taxonomy for a kernel install.
//!
//! [`InstallError`] is fatal: the run stops and the process exits with
//! [`InstallError::exit_code`]. [`DescriptorPatchFailure`] is warn-only and is
//! deliberately not convertible into [`InstallError`].

use std::io;
use std::path::PathBuf;

use crate::layout::Profile;

/// Fatal install failures.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error(
        "unable to locate workspace root from '{}'; pass --target-dir to skip discovery",
        start.display()
    )]
    WorkspaceRootNotFound { start: PathBuf },

    #[error(
        "kernelspec not found at {}. Build the kernel first:\n  cargo build -p kayton_kernel --profile {profile}",
        path.display()
    )]
    MissingArtifact { path: PathBuf, profile: Profile },

    #[error("built executable not found at {}. Build first.", path.display())]
    MissingExecutable { path: PathBuf },

    #[error("{tool} executable not found on {searched}. Please install Jupyter first.")]
    MissingRegistryTool {
        tool: String,
        searched: &'static str,
    },

    #[error(transparent)]
    RegistryInvocationFailure(#[from] RegistryFailure),
}

/// The registry tool was found but did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum RegistryFailure {
    #[error("kernelspec {action} failed with exit code {code}")]
    Exited {
        action: &'static str,
        code: i32,
        stderr_message: Option<String>,
    },

    #[error("failed to run {}", tool.display())]
    Spawn {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InstallError {
    /// Process exit status for this failure.
    ///
    /// A registry tool that ran and failed hands its own code through so
    /// scripts can tell its failure reasons apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            InstallError::RegistryInvocationFailure(RegistryFailure::Exited { code, .. }) => *code,
            _ => 1,
        }
    }
}

/// Why the `argv[0]` rewrite of a launch descriptor did not happen.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorPatchFailure {
    #[error("resolving absolute path of '{}'", path.display())]
    ResolveExecutable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("reading '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parsing '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{}' is not a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("'{}' has an argv that is not a list", path.display())]
    InvalidArgv { path: PathBuf },

    #[error("serializing '{}'", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("writing '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// `err` followed by each of its sources, `: `-separated.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
