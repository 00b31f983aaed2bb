//! Command line interface.
//!
//! `-h` prints the usage and exits with a failure status, the same as a
//! missing or invalid `-p`, so the built-in clap help flag is replaced.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};

/// Banner printed above the usage text.
pub const BANNER: &str = "rsh-server: single-client command relay";

/// Footer printed below the version line.
pub const FOOTER: &str = "Waits for one remote shell at a time and relays operator commands to it.";

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "rsh-server")]
#[command(version)]
#[command(about = "Relay operator commands to a connecting remote shell")]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Specify the port to bind the server
    #[arg(short = 'p', long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// YAML configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show this message
    #[arg(short = 'h', long, action = ArgAction::SetTrue)]
    pub help: bool,
}

/// Arguments for a server run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// TCP port to listen on
    pub port: u16,
    /// Optional configuration file
    pub config: Option<PathBuf>,
}

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Start the relay
    Run(RunArgs),
    /// Print usage and fail, with an optional reason
    Usage(Option<String>),
    /// Print the version and exit successfully
    Version(String),
}

impl Cli {
    /// Parse arguments (program name first) into an [`Invocation`].
    pub fn invocation<I, T>(args: I) -> Invocation
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_from(args) {
            Ok(cli) => cli.into_invocation(),
            Err(e) if e.kind() == ErrorKind::DisplayVersion => {
                Invocation::Version(e.render().to_string())
            }
            Err(e) => Invocation::Usage(Some(e.render().to_string())),
        }
    }

    fn into_invocation(self) -> Invocation {
        if self.help {
            return Invocation::Usage(None);
        }

        match self.port {
            Some(port) => Invocation::Run(RunArgs {
                port,
                config: self.config,
            }),
            None => Invocation::Usage(Some(
                "error: the -p <PORT> option is required".to_string(),
            )),
        }
    }
}

/// Banner, version and usage text.
pub fn usage() -> String {
    let mut command = Cli::command();
    format!(
        "{BANNER} v{}\n{FOOTER}\n\n{}",
        env!("CARGO_PKG_VERSION"),
        command.render_help()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(port: u16, config: Option<&str>) -> Invocation {
        Invocation::Run(RunArgs {
            port,
            config: config.map(PathBuf::from),
        })
    }

    #[test]
    fn test_port_short_flag() {
        let invocation = Cli::invocation(["rsh-server", "-p", "4444"]);
        assert_eq!(invocation, run_args(4444, None));
    }

    #[test]
    fn test_port_and_config_long_flags() {
        let invocation = Cli::invocation(["rsh-server", "--port", "8080", "--config", "relay.yaml"]);
        assert_eq!(invocation, run_args(8080, Some("relay.yaml")));
    }

    #[test]
    fn test_help_flag_is_usage() {
        assert_eq!(Cli::invocation(["rsh-server", "-h"]), Invocation::Usage(None));
        assert_eq!(
            Cli::invocation(["rsh-server", "-p", "4444", "-h"]),
            Invocation::Usage(None)
        );
    }

    #[test]
    fn test_missing_port_is_usage_error() {
        let invocation = Cli::invocation(["rsh-server"]);
        assert!(matches!(invocation, Invocation::Usage(Some(msg)) if msg.contains("-p")));
    }

    #[test]
    fn test_port_zero_rejected() {
        let invocation = Cli::invocation(["rsh-server", "-p", "0"]);
        assert!(matches!(invocation, Invocation::Usage(Some(_))));
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(matches!(
            Cli::invocation(["rsh-server", "-p", "http"]),
            Invocation::Usage(Some(_))
        ));
        assert!(matches!(
            Cli::invocation(["rsh-server", "-p", "70000"]),
            Invocation::Usage(Some(_))
        ));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let invocation = Cli::invocation(["rsh-server", "-x"]);
        assert!(matches!(invocation, Invocation::Usage(Some(_))));
    }

    #[test]
    fn test_version_flag() {
        let invocation = Cli::invocation(["rsh-server", "--version"]);
        assert!(
            matches!(invocation, Invocation::Version(v) if v.contains(env!("CARGO_PKG_VERSION")))
        );
    }

    #[test]
    fn test_usage_text() {
        let text = usage();
        assert!(text.starts_with(BANNER));
        assert!(text.contains("--port"));
        assert!(text.contains("-h, --help"));
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }
}
