//! # CLI Command Implementations
//!
//! `create` drives a single scaffolding run and `prompts` holds its
//! `dialoguer` questions. The library crate does the actual work; nothing
//! here touches the filesystem directly.

pub mod create;
pub mod prompts;
