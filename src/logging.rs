//! Diagnostic logging setup.
//!
//! Progress lines meant for the operator are printed directly; everything
//! else goes through `tracing` to stderr. `RUST_LOG` always wins over the
//! verbosity flag.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Colour only for an interactive stderr, and never under `NO_COLOR`.
fn ansi_enabled(no_color: bool, stderr_is_terminal: bool) -> bool {
    !no_color && stderr_is_terminal
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(verbosity: u8) {
    let env_filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(default_filter(verbosity)),
    };

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(ansi_enabled(
                    std::env::var_os("NO_COLOR").is_some(),
                    std::io::stderr().is_terminal(),
                )),
        )
        .with(env_filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_filter(0), "warn");
        assert_eq!(default_filter(1), "info");
        assert_eq!(default_filter(2), "debug");
        assert_eq!(default_filter(9), "debug");
    }

    #[test]
    fn colour_needs_terminal_and_no_no_color() {
        assert!(ansi_enabled(false, true));
        assert!(!ansi_enabled(false, false));
        assert!(!ansi_enabled(true, true));
    }

    #[test]
    fn repeated_init_is_harmless() {
        init_logging(0);
        init_logging(2);
    }
}
