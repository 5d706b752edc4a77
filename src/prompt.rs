//! Interactive input needed while setting up a workspace.
//!
//! The library never talks to the terminal itself. Whatever drives it
//! supplies a [`Prompter`]; the `create-openfort` binary uses `dialoguer`,
//! tests and non-interactive runs use [`Defaults`].

use crate::error::{Error, Result};

/// What to do with a target directory that already has files in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Stop; nothing is touched.
    Abort,
    /// Remove existing files (except `.git`) and continue.
    Purge,
    /// Leave existing files in place and continue.
    Keep,
}

/// Source of answers for the questions asked during workspace setup.
///
/// Every method may return [`Error::Cancelled`] when the user backs out.
pub trait Prompter {
    /// Ask for the project directory, offering `default`.
    fn project_name(&self, default: &str) -> Result<String>;

    /// Ask how to handle a non-empty target. `target` is a human label such
    /// as `Target directory "my-app"`.
    fn overwrite_policy(&self, target: &str) -> Result<OverwritePolicy>;

    /// Ask for a package name, offering the sanitized `suggested` one. An
    /// empty answer means "use the suggestion".
    fn package_name(&self, suggested: &str) -> Result<String>;
}

/// Answers every question with its default, without user interaction.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    /// Policy used for a non-empty target directory
    pub overwrite: OverwritePolicy,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            overwrite: OverwritePolicy::Abort,
        }
    }
}

impl Prompter for Defaults {
    fn project_name(&self, default: &str) -> Result<String> {
        Ok(default.to_string())
    }

    fn overwrite_policy(&self, target: &str) -> Result<OverwritePolicy> {
        if self.overwrite == OverwritePolicy::Abort {
            return Err(Error::Cancelled {
                message: format!("{} is not empty. Use --overwrite to replace its files.", target),
            });
        }
        Ok(self.overwrite)
    }

    fn package_name(&self, suggested: &str) -> Result<String> {
        Ok(suggested.to_string())
    }
}
