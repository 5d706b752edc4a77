//! Filling `.env` files from their `.env.example` counterpart.
//!
//! The example file is rewritten line by line. Comments, blank lines and
//! lines without `=` pass through untouched, as do key-value lines with no
//! matching value. A matching line becomes `KEY=value`; the key and the line
//! order never change.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, info};

use crate::error::Result;
use crate::framework::Framework;
use crate::workspace::Workspace;

pub const ENV_EXAMPLE_FILE: &str = ".env.example";
pub const ENV_FILE: &str = ".env";

/// Values to write, keyed by variable name. `None` leaves the line alone.
pub type EnvValues = BTreeMap<String, Option<String>>;

/// How a line's key is looked up in [`EnvValues`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMatch {
    /// The key without its first `_`-separated segment, or the whole key
    /// when it has no `_` (`VITE_OPENFORT_PUBLISHABLE_KEY` finds
    /// `OPENFORT_PUBLISHABLE_KEY`). The full key itself is never consulted.
    Suffix,
    /// The full key only.
    Exact,
}

/// One line of an env file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvLine<'a> {
    Blank,
    Comment,
    /// A line with content but no `=`
    Other,
    KeyValue { key: &'a str, value: &'a str },
}

impl<'a> EnvLine<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return EnvLine::Blank;
        }
        if trimmed.starts_with('#') {
            return EnvLine::Comment;
        }
        match line.split_once('=') {
            Some((key, value)) if !key.is_empty() => EnvLine::KeyValue { key, value },
            _ => EnvLine::Other,
        }
    }
}

/// Key looked up for `key` when matching by suffix: everything after the
/// first `_`, or the whole key when it has none.
pub fn lookup_key(key: &str) -> &str {
    key.split_once('_').map(|(_, rest)| rest).unwrap_or(key)
}

fn find_value<'v>(values: &'v EnvValues, key: &str, mode: KeyMatch) -> Option<&'v str> {
    let key = match mode {
        KeyMatch::Exact => key,
        KeyMatch::Suffix => lookup_key(key),
    };
    values.get(key).and_then(Option::as_deref)
}

/// Fill `content` (the text of an example file) with `values`.
pub fn fill_env_content(content: &str, values: &EnvValues, mode: KeyMatch) -> String {
    content
        .split('\n')
        .map(|line| match EnvLine::parse(line) {
            EnvLine::KeyValue { key, .. } => match find_value(values, key, mode) {
                Some(value) => format!("{}={}", key, value),
                None => line.to_string(),
            },
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read `<dir>/.env.example` and write the filled result to `<dir>/.env`.
pub fn fill_env_in(dir: &Path, values: &EnvValues, mode: KeyMatch) -> Result<()> {
    let example = dir.join(ENV_EXAMPLE_FILE);
    let target = dir.join(ENV_FILE);
    debug!("Reading {} and writing {}", example.display(), target.display());

    let content = fs::read_to_string(&example)?;
    fs::write(&target, fill_env_content(&content, values, mode))?;
    Ok(())
}

fn fill_frontend_env(workspace: &Workspace, values: &EnvValues, mode: KeyMatch) -> Result<()> {
    info!(
        "Filling .env with {}",
        values.keys().cloned().collect::<Vec<_>>().join(", ")
    );
    fill_env_in(&workspace.frontend_dir()?, values, mode)
}

/// Fill the frontend `.env` of `workspace`, matching keys by suffix.
pub fn fill_env(workspace: &Workspace, values: &EnvValues) -> Result<()> {
    fill_frontend_env(workspace, values, KeyMatch::Suffix)
}

/// Give every key the `prefix`, unless it already carries it.
pub fn prefix_keys(prefix: &str, values: &EnvValues) -> EnvValues {
    values
        .iter()
        .map(|(key, value)| {
            let key = if key.starts_with(prefix) {
                key.clone()
            } else {
                format!("{}{}", prefix, key)
            };
            (key, value.clone())
        })
        .collect()
}

/// Fill the frontend `.env` with keys prefixed the way `framework` exposes
/// them to the client. Lines match their prefixed key exactly.
pub fn fill_framework_env(workspace: &Workspace, framework: Framework, values: &EnvValues) -> Result<()> {
    let prefixed = prefix_keys(framework.info().env_prefix, values);
    fill_frontend_env(workspace, &prefixed, KeyMatch::Exact)
}
