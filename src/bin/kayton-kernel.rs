use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use kayton_kernel_installer::install::{
    InstallRequest, Installer, PatchStatus, DEFAULT_KERNEL_NAME,
};
use kayton_kernel_installer::layout::{ExecutableAncestors, Profile};
use kayton_kernel_installer::logging::init_logging;
use kayton_kernel_installer::registry::{InstallScope, ProcessRunner, ToolLookup};
use kayton_kernel_installer::error::error_chain;
use kayton_kernel_installer::{InstallError, RegistryFailure};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "kayton-kernel",
    version,
    about = "Install the Kayton Jupyter kernel from a cargo build"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    install: InstallArgs,

    /// Registry tool to run instead of `jupyter` from PATH
    #[arg(long, env = "KAYTON_JUPYTER", global = true)]
    jupyter: Option<String>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Remove a kernelspec from Jupyter
    Uninstall {
        /// Kernelspec name to remove
        #[arg(long, default_value = DEFAULT_KERNEL_NAME)]
        name: String,
    },
}

#[derive(Args, Debug)]
struct InstallArgs {
    /// Build profile whose kernelspec to install
    #[arg(long, value_enum, default_value_t = Profile::Debug)]
    profile: Profile,

    /// Kernelspec name to register in Jupyter
    #[arg(long, default_value = DEFAULT_KERNEL_NAME)]
    name: String,

    /// Override target directory (defaults to <workspace>/target)
    #[arg(long, env = "CARGO_TARGET_DIR")]
    target_dir: Option<PathBuf>,

    /// Rewrite kernel.json argv[0] to the absolute path of the built kayton_kernel
    #[arg(long)]
    use_absolute_exe: bool,

    /// Install for the current user (default)
    #[arg(long, default_value_t = true)]
    user: bool,

    /// Install into sys.prefix instead of the user directory
    #[arg(long)]
    sys_prefix: bool,

    /// Replace an existing kernelspec with the same name
    #[arg(long)]
    replace: bool,
}

impl InstallArgs {
    fn into_request(self) -> InstallRequest {
        if self.user && self.sys_prefix {
            debug!("--sys-prefix given; not passing --user");
        }
        InstallRequest {
            profile: self.profile,
            name: self.name,
            target_dir_override: self.target_dir,
            use_absolute_exe: self.use_absolute_exe,
            scope: InstallScope::from_flags(self.sys_prefix),
            replace: self.replace,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        let code = match err.downcast_ref::<InstallError>() {
            Some(install_err) => {
                if let InstallError::RegistryInvocationFailure(RegistryFailure::Exited {
                    stderr_message: Some(message),
                    ..
                }) = install_err
                {
                    eprintln!("  {message}");
                }
                install_err.exit_code()
            }
            None => 1,
        };
        std::process::exit(code);
    }
}

fn run(cli: Cli) -> Result<()> {
    let tool = ToolLookup::from_env(cli.jupyter).context("resolving current directory")?;
    let discovery =
        ExecutableAncestors::from_process().context("resolving installer executable path")?;
    let mut installer = Installer::new(discovery, tool, ProcessRunner);

    match cli.command {
        Some(Commands::Uninstall { name }) => {
            installer.uninstall(&name)?;
            println!("Uninstalled Jupyter kernelspec '{name}'");
        }
        None => {
            let request = cli.install.into_request();
            let report = installer.install(&request)?;
            if let PatchStatus::Failed(failure) = &report.patch {
                eprintln!("warning: kernel.json left unpatched: {}", error_chain(failure));
            }
            println!(
                "Installed Jupyter kernelspec '{}' from {}",
                report.name,
                report.spec_dir().display()
            );
        }
    }
    Ok(())
}
