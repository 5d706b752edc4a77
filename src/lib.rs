//! # create-openfort
//!
//! Library behind the `create-openfort` command-line tool, which scaffolds a
//! new Openfort project: it prepares a target directory, downloads or
//! assembles a frontend template, optionally provisions a sample backend,
//! and fills in the project's `.env` files.
//!
//! ## Quick Example
//!
//! ```
//! use create_openfort::env::{fill_env_content, EnvValues, KeyMatch};
//!
//! let mut values = EnvValues::new();
//! values.insert("OPENFORT_PUBLISHABLE_KEY".to_string(), Some("pk_test_123".to_string()));
//!
//! let example = "# Openfort\nVITE_OPENFORT_PUBLISHABLE_KEY=\nVITE_OPENFORT_THEME=auto";
//! let filled = fill_env_content(example, &values, KeyMatch::Suffix);
//! assert_eq!(filled, "# Openfort\nVITE_OPENFORT_PUBLISHABLE_KEY=pk_test_123\nVITE_OPENFORT_THEME=auto");
//! ```
//!
//! ## Core Concepts
//!
//! - **Workspace (`workspace`)**: the target directory, its package name and
//!   whether frontend and backend live in separate subfolders.
//! - **Downloads (`download`)**: runs the external fetch tool with a timeout
//!   and classifies its failures.
//! - **Materialization (`materialize`)**: copies layered framework templates
//!   and deep-merges their `package.json` fragments.
//! - **Environment files (`env`)**: fills `.env` from `.env.example`.
//! - **Pipeline (`scaffold`)**: runs the steps above in order.
//!
//! Interactive input goes through the [`prompt::Prompter`] trait so the
//! library never talks to the terminal directly.

pub mod defaults;
pub mod download;
pub mod env;
pub mod error;
pub mod framework;
pub mod fsops;
pub mod keys;
pub mod materialize;
pub mod output;
pub mod package_name;
pub mod prompt;
pub mod scaffold;
pub mod workspace;

#[cfg(test)]
mod package_name_proptest;
