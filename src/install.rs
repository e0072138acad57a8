//! Install orchestration.
//!
//! Strictly sequential: resolve paths, validate artifacts, optionally patch
//! the launch descriptor, locate the registry tool, run it. Any failure ends
//! the run except the descriptor patch, which degrades to a warning because
//! the unpatched kernelspec is still installable.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::descriptor::{patch_descriptor, PatchOutcome};
use crate::error::{error_chain, DescriptorPatchFailure, InstallError};
use crate::layout::{Profile, RootDiscovery, WorkspaceLayout};
use crate::preflight::validate_artifacts;
use crate::registry::{
    run_registry_command, CommandRunner, InstallScope, RegistryCommand, ToolLookup,
};

/// Registry name used when none is given.
pub const DEFAULT_KERNEL_NAME: &str = "kayton";

/// One install run's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub profile: Profile,
    pub name: String,
    pub target_dir_override: Option<PathBuf>,
    pub use_absolute_exe: bool,
    pub scope: InstallScope,
    pub replace: bool,
}

impl Default for InstallRequest {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            name: DEFAULT_KERNEL_NAME.to_string(),
            target_dir_override: None,
            use_absolute_exe: false,
            scope: InstallScope::default(),
            replace: false,
        }
    }
}

/// What happened to the launch descriptor.
#[derive(Debug)]
pub enum PatchStatus {
    NotRequested,
    Applied(PatchOutcome),
    /// The rewrite failed; registration went ahead with the file as it was.
    Failed(DescriptorPatchFailure),
}

/// Summary of a successful install.
#[derive(Debug)]
pub struct InstallReport {
    pub name: String,
    pub layout: WorkspaceLayout,
    pub patch: PatchStatus,
}

impl InstallReport {
    pub fn spec_dir(&self) -> &std::path::Path {
        &self.layout.spec_dir
    }
}

/// Drives installs and uninstalls against one registry tool.
pub struct Installer<R> {
    discovery: Box<dyn RootDiscovery>,
    tool: ToolLookup,
    runner: R,
}

impl<R: CommandRunner> Installer<R> {
    pub fn new(discovery: impl RootDiscovery + 'static, tool: ToolLookup, runner: R) -> Self {
        Self {
            discovery: Box::new(discovery),
            tool,
            runner,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Register the built kernelspec with the registry.
    pub fn install(&mut self, request: &InstallRequest) -> Result<InstallReport, InstallError> {
        let layout = WorkspaceLayout::locate(
            request.target_dir_override.as_deref(),
            request.profile,
            self.discovery.as_ref(),
        )?;
        debug!(?layout, "resolved kernel artifact layout");

        validate_artifacts(&layout, request.profile, request.use_absolute_exe)?;

        let patch = if request.use_absolute_exe {
            apply_patch(&layout)
        } else {
            PatchStatus::NotRequested
        };

        let program = self.tool.locate()?;
        info!(tool = %program.display(), "located registry tool");

        let command = RegistryCommand::install(
            &program,
            &layout.spec_dir,
            &request.name,
            request.replace,
            request.scope,
        );
        println!("Running: {}", command.display());
        run_registry_command(&mut self.runner, &command, "install")?;

        Ok(InstallReport {
            name: request.name.clone(),
            layout,
            patch,
        })
    }

    /// Remove a kernelspec from the registry by name.
    pub fn uninstall(&mut self, name: &str) -> Result<(), InstallError> {
        let program = self.tool.locate()?;
        info!(tool = %program.display(), "located registry tool");

        let command = RegistryCommand::uninstall(&program, name);
        println!("Running: {}", command.display());
        run_registry_command(&mut self.runner, &command, "uninstall")
    }
}

fn apply_patch(layout: &WorkspaceLayout) -> PatchStatus {
    match patch_descriptor(&layout.descriptor_path, &layout.executable_path) {
        Ok(outcome) => {
            match &outcome {
                PatchOutcome::Rewritten { executable, .. } => println!(
                    "Rewrote argv[0] in {} to {}",
                    layout.descriptor_path.display(),
                    executable.display()
                ),
                PatchOutcome::ArgvEmpty => info!(
                    path = %layout.descriptor_path.display(),
                    "descriptor has no argv; left unchanged"
                ),
            }
            PatchStatus::Applied(outcome)
        }
        Err(failure) => {
            warn!(
                "failed to rewrite kernel.json: {}; registering it unchanged",
                error_chain(&failure)
            );
            PatchStatus::Failed(failure)
        }
    }
}
