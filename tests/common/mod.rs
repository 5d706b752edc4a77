//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let templates = TemplatesFixture::new().with_vite_raw();
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::env;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::keys;
    #[allow(unused_imports)]
    pub use super::should_skip_network_tests;
    pub use super::TemplatesFixture;
}

/// Well-formed key values that pass validation.
#[allow(dead_code)]
pub mod keys {
    pub const PUBLISHABLE_KEY: &str = "pk_test_0a1b2c3d-4e5f-6789-abcd-ef0123456789";
    pub const SECRET_KEY: &str = "sk_test_0a1b2c3d-4e5f-6789-abcd-ef0123456789";
    pub const SHIELD_PUBLISHABLE_KEY: &str = "0a1b2c3d-4e5f-6789-abcd-ef0123456789";
    pub const SHIELD_SECRET_KEY: &str = "f0e1d2c3-b4a5-9687-dcba-9876543210fe";
    pub const ENCRYPTION_SHARE: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQR";
}

/// Check if network-dependent tests should be skipped.
///
/// Set `SKIP_NETWORK_TESTS=1` to skip them even when the
/// `integration-tests` feature is enabled.
#[allow(dead_code)]
pub fn should_skip_network_tests() -> bool {
    env::var("SKIP_NETWORK_TESTS").is_ok()
}

/// A temporary templates root laid out the way the layered materializer
/// expects (`raw-templates/`, `updated-files/`).
///
/// # Example
///
/// ```rust,ignore
/// let templates = TemplatesFixture::new()
///     .with_vite_raw()
///     .with_file("updated-files/openfortkit/common/src/App.tsx", "app");
/// ```
pub struct TemplatesFixture {
    temp_dir: assert_fs::TempDir,
}

impl TemplatesFixture {
    /// Create a fixture with an empty templates root.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file at `path`, relative to the templates root.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a minimal raw Vite starter, including the files the Vite layer
    /// must not copy.
    pub fn with_vite_raw(self) -> Self {
        self.with_file(
            "raw-templates/template-vite/package.json",
            r#"{"name":"vite-project","private":true,"scripts":{"dev":"vite"},"dependencies":{"react":"^18.2.0"}}"#,
        )
        .with_file("raw-templates/template-vite/index.html", "<div id=\"root\"></div>")
        .with_file("raw-templates/template-vite/src/App.tsx", "raw app")
        .with_file("raw-templates/template-vite/src/main.tsx", "raw main")
        .with_file("raw-templates/template-vite/public/vite.svg", "<svg/>")
        .with_file("raw-templates/template-vite/_gitignore", "node_modules\n")
        .with_file(
            "raw-templates/template-vite/.env.example",
            "# Openfort\nVITE_OPENFORT_PUBLISHABLE_KEY=\nVITE_SHIELD_PUBLISHABLE_KEY=\nVITE_CREATE_ENCRYPTED_SESSION_ENDPOINT=\n",
        )
    }

    /// Add product overrides for Vite under the given product folder.
    #[allow(dead_code)]
    pub fn with_vite_product(self, product: &str) -> Self {
        self.with_file(
            &format!("updated-files/{}/template-vite/src/App.tsx", product),
            "product app",
        )
        .with_file(
            &format!("updated-files/{}/template-vite/package.json", product),
            r#"{"dependencies":{"@openfort/react":"^0.1.0"}}"#,
        )
        .with_file(
            &format!("updated-files/{}/common/package.json", product),
            r#"{"scripts":{"dev":"vite --port 3000"}}"#,
        )
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

impl Default for TemplatesFixture {
    fn default() -> Self {
        Self::new()
    }
}
