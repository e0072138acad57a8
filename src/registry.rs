//! Jupyter kernelspec registration.
//!
//! The registry is driven only through its `jupyter kernelspec` CLI. The tool
//! is looked up on a search path, its argument vector is built from the
//! request, and the child runs through a [`CommandRunner`] so tests can stand
//! in a fake.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::{InstallError, RegistryFailure};

/// Executable name of the registry tool.
pub const REGISTRY_TOOL: &str = "jupyter";

/// Where the kernelspec is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallScope {
    /// Per-user Jupyter data directory.
    #[default]
    User,
    /// The Python environment's `sys.prefix`.
    SysPrefix,
}

impl InstallScope {
    /// User scope is the default; a system-prefix request replaces it rather
    /// than being combined with it.
    pub fn from_flags(sys_prefix: bool) -> Self {
        if sys_prefix {
            InstallScope::SysPrefix
        } else {
            InstallScope::User
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            InstallScope::User => "--user",
            InstallScope::SysPrefix => "--sys-prefix",
        }
    }
}

/// Exit status of a registry tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutcome {
    pub exit_code: i32,
    pub stderr_message: Option<String>,
}

impl InvocationOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A fully built registry tool command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryCommand {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl RegistryCommand {
    /// `jupyter kernelspec install <spec_dir> --name <name> [--replace] <scope>`
    pub fn install(
        program: &Path,
        spec_dir: &Path,
        name: &str,
        replace: bool,
        scope: InstallScope,
    ) -> Self {
        let mut args: Vec<OsString> = vec![
            "kernelspec".into(),
            "install".into(),
            spec_dir.as_os_str().to_owned(),
            "--name".into(),
            name.into(),
        ];
        if replace {
            args.push("--replace".into());
        }
        args.push(scope.flag().into());
        Self {
            program: program.to_path_buf(),
            args,
        }
    }

    /// `jupyter kernelspec uninstall -y <name>`
    pub fn uninstall(program: &Path, name: &str) -> Self {
        Self {
            program: program.to_path_buf(),
            args: vec![
                "kernelspec".into(),
                "uninstall".into(),
                "-y".into(),
                name.into(),
            ],
        }
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&OsStr> {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .collect()
    }

    /// Space-joined command line for progress output.
    pub fn display(&self) -> String {
        self.argv()
            .iter()
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs a registry command to completion.
pub trait CommandRunner {
    /// `Err` means the child could not be started at all.
    fn run(&mut self, command: &RegistryCommand) -> io::Result<InvocationOutcome>;
}

/// Spawns the real child with inherited stdio and waits for it, without a
/// timeout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &RegistryCommand) -> io::Result<InvocationOutcome> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .status()?;
        Ok(outcome_from_status(status))
    }
}

fn outcome_from_status(status: ExitStatus) -> InvocationOutcome {
    if let Some(code) = status.code() {
        return InvocationOutcome {
            exit_code: code,
            stderr_message: None,
        };
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return InvocationOutcome {
                exit_code: 128 + signal,
                stderr_message: Some(format!("terminated by signal {signal}")),
            };
        }
    }

    InvocationOutcome {
        exit_code: 1,
        stderr_message: Some(format!("terminated abnormally ({status})")),
    }
}

/// How to find the registry tool.
#[derive(Debug, Clone)]
pub struct ToolLookup {
    /// Bare name searched on `search_path`, or a path used as given.
    pub program: String,
    pub search_path: Option<OsString>,
    /// Base for relative `search_path` entries and relative programs.
    pub cwd: PathBuf,
}

impl ToolLookup {
    /// Lookup against the process `PATH`, optionally for an explicit program.
    pub fn from_env(program: Option<String>) -> io::Result<Self> {
        Ok(Self {
            program: program.unwrap_or_else(|| REGISTRY_TOOL.to_string()),
            search_path: std::env::var_os("PATH"),
            cwd: std::env::current_dir()?,
        })
    }

    pub fn locate(&self) -> Result<PathBuf, InstallError> {
        which::which_in(&self.program, self.search_path.as_ref(), &self.cwd).map_err(|_| {
            InstallError::MissingRegistryTool {
                tool: self.program.clone(),
                searched: if self.is_explicit_path() {
                    "the given path"
                } else {
                    "PATH"
                },
            }
        })
    }

    fn is_explicit_path(&self) -> bool {
        Path::new(&self.program).components().count() > 1
    }
}

/// Run a registry command and map its outcome onto the install taxonomy.
pub fn run_registry_command(
    runner: &mut dyn CommandRunner,
    command: &RegistryCommand,
    action: &'static str,
) -> Result<(), InstallError> {
    let outcome = runner
        .run(command)
        .map_err(|source| RegistryFailure::Spawn {
            tool: command.program.clone(),
            source,
        })?;

    if outcome.success() {
        return Ok(());
    }
    Err(RegistryFailure::Exited {
        action,
        code: outcome.exit_code,
        stderr_message: outcome.stderr_message,
    }
    .into())
}
