//! # Terminal Output
//!
//! Styled status lines and download spinners for the `create-openfort`
//! binary. Colours follow `--color`; in `auto` mode the first environment
//! variable that states a preference decides, in this order:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `NO_COLOR` (non-empty) | off |
//! | `FORCE_COLOR` | on, unless `0` or `false` |
//! | `CLICOLOR_FORCE` (non-empty, not `0`) | on |
//! | `CLICOLOR=0` | off |
//! | `TERM=dumb` | off |
//!
//! With no preference, colours are on when stdout is a colour terminal.
//! `FORCE_COLOR` is the variable the Node tooling around Openfort projects
//! already understands.
//!
//! ```rust,ignore
//! use create_openfort::output::{self, ColorChoice, OutputConfig};
//!
//! let config = OutputConfig::new(ColorChoice::Auto);
//! output::step(&config, "Scaffolding project in ./my-app...");
//! ```

use std::env;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Value of `--color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Whether to colour output, reading variables through `var` and asking
    /// `is_color_terminal` only when nothing else decides.
    pub fn resolve(
        self,
        var: impl Fn(&str) -> Option<String>,
        is_color_terminal: impl FnOnce() -> bool,
    ) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => env_preference(var).unwrap_or_else(is_color_terminal),
        }
    }
}

fn env_preference(var: impl Fn(&str) -> Option<String>) -> Option<bool> {
    if var("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return Some(false);
    }
    if let Some(force) = var("FORCE_COLOR") {
        return Some(!matches!(force.as_str(), "0" | "false"));
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return Some(true);
    }
    if var("CLICOLOR").as_deref() == Some("0") || var("TERM").as_deref() == Some("dumb") {
        return Some(false);
    }
    None
}

/// Resolved output settings shared by every printing helper.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Colours and emoji glyphs are on.
    pub use_color: bool,
}

impl OutputConfig {
    /// Resolve `choice` against the process environment and apply the result
    /// to `console` for both streams.
    pub fn new(choice: ColorChoice) -> Self {
        let use_color = choice.resolve(
            |name| env::var(name).ok(),
            || console::Term::stdout().features().colors_supported(),
        );
        console::set_colors_enabled(use_color);
        console::set_colors_enabled_stderr(use_color);
        Self { use_color }
    }
}

/// The emoji when colours are on, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// A step of the run, e.g. "Scaffolding project in ...".
pub fn step(config: &OutputConfig, message: &str) {
    println!("{} {}", style(emoji(config, "◇", "*")).cyan().bold(), message);
}

pub fn info(config: &OutputConfig, message: &str) {
    println!("{} {}", style(emoji(config, "ℹ", "[INFO]")).blue().bold(), message);
}

pub fn success(config: &OutputConfig, message: &str) {
    println!("{} {}", style(emoji(config, "✓", "[OK]")).green().bold(), message);
}

pub fn warning(config: &OutputConfig, message: &str) {
    eprintln!("{} {}", style(emoji(config, "⚠", "[WARN]")).yellow().bold(), message);
}

pub fn error(config: &OutputConfig, message: &str) {
    eprintln!("{} {}", style(emoji(config, "✗", "[ERROR]")).red().bold(), message);
}

/// Closing message, printed verbatim below a blank line.
pub fn outro(message: &str) {
    println!("\n{}", message);
}

/// Spinner shown while a download runs. Hidden when stderr is not a terminal.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let spinner_style = ProgressStyle::with_template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ");
    pb.set_style(spinner_style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
