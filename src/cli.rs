//! CLI argument parsing and dispatch

use anyhow::Result;
use clap::Parser;

use crate::commands;
use create_openfort::output::{ColorChoice, OutputConfig};

/// Create a new Openfort project.
///
/// With no arguments, starts in interactive mode.
#[derive(Parser, Debug)]
#[command(name = "create-openfort")]
#[command(version, long_about = None, disable_version_flag = true)]
pub struct Cli {
    #[command(flatten)]
    create: commands::create::CreateArgs,

    /// Print version
    #[arg(short = 'v', long)]
    version: bool,

    /// Colorize output
    #[arg(long, global = true, value_name = "WHEN", value_enum, ignore_case = true, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        if self.version {
            println!("create-openfort version: {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        init_logging(self.effective_log_level());
        let output = OutputConfig::new(self.color);
        commands::create::execute(self.create, &output)
    }

    /// `--verbose-debug` and `--verbose` raise the level given by `--log-level`.
    fn effective_log_level(&self) -> &str {
        if self.create.verbose_debug {
            "debug"
        } else if self.create.verbose {
            "info"
        } else {
            &self.log_level
        }
    }
}

/// Initialise `env_logger` with `level`; `RUST_LOG` directives take precedence.
fn init_logging(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.parse_filters(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp(None).format_target(false);
    // A logger may already be installed when running under a test harness.
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_raises_log_level() {
        let cli = Cli::parse_from(["create-openfort", "my-app", "-V"]);
        assert_eq!(cli.effective_log_level(), "info");

        let cli = Cli::parse_from(["create-openfort", "--verbose-debug"]);
        assert_eq!(cli.effective_log_level(), "debug");

        let cli = Cli::parse_from(["create-openfort", "--log-level", "error"]);
        assert_eq!(cli.effective_log_level(), "error");
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "create-openfort",
            "my-app",
            "-t",
            "headless",
            "-o",
            "-d",
            "--dashboard",
            "--no-validate",
        ]);
        assert_eq!(cli.create.directory.as_deref(), Some("my-app"));
        assert_eq!(cli.create.template.as_deref(), Some("headless"));
        assert!(cli.create.overwrite);
        assert!(cli.create.use_defaults);
        assert!(cli.create.no_validate);
        assert_eq!(cli.create.dashboard.as_deref(), Some("https://dashboard.openfort.io"));
        assert_eq!(cli.create.timeout, 60);
    }

    #[test]
    fn test_color_flag_values() {
        let cli = Cli::parse_from(["create-openfort"]);
        assert_eq!(cli.color, ColorChoice::Auto);

        let cli = Cli::parse_from(["create-openfort", "--color", "NEVER"]);
        assert_eq!(cli.color, ColorChoice::Never);

        assert!(Cli::try_parse_from(["create-openfort", "--color", "sometimes"]).is_err());
    }

    #[test]
    fn test_version_flag_short_is_lowercase() {
        let cli = Cli::parse_from(["create-openfort", "-v"]);
        assert!(cli.version);
        assert!(!cli.create.verbose);
    }

    #[test]
    fn test_template_conflicts_with_framework() {
        let result = Cli::try_parse_from(["create-openfort", "-t", "headless", "--framework", "vite"]);
        assert!(result.is_err());
    }
}
