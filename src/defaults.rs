//! Default values for create-openfort.
//!
//! This module provides centralized default values used across the driver
//! and the library, ensuring consistency and avoiding duplication.

use std::path::PathBuf;
use std::time::Duration;

/// Directory name offered when the user does not provide one.
pub const DEFAULT_TARGET_DIR: &str = "openfort-project";

/// Package name used when a workspace has none.
pub const FALLBACK_PACKAGE_NAME: &str = "openfort-app";

pub const DEFAULT_DASHBOARD_URL: &str = "https://dashboard.openfort.io";

/// Encryption-session endpoint served by the sample backend.
pub const DEFAULT_API_ENDPOINT: &str =
    "http://localhost:3110/api/protected-create-encryption-session";

/// Repository holding the quickstart templates.
pub const QUICKSTART_REPO: &str = "openfort-xyz/openfort-react";

/// Subpath of a quickstart template inside [`QUICKSTART_REPO`].
pub fn quickstart_subpath(template: &str) -> String {
    format!("examples/quickstarts/{}", template)
}

/// Repository holding the sample recovery backend.
pub const BACKEND_REPO: &str = "openfort-xyz/openfort-backend-quickstart";

pub const BACKEND_PORT: u16 = 3110;

/// Download executable invoked through the shell.
pub const DEFAULT_DOWNLOADER: &str = "npx degit";

pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Product folder under `updated-files/`.
pub const DEFAULT_PRODUCT: &str = "openfortkit";

/// Returns the default templates root directory.
///
/// Uses the platform data directory (for example `~/.local/share` on Linux)
/// and falls back to `.create-openfort/templates` in the current directory
/// if it cannot be determined.
///
/// This can be overridden by the `--templates-root` CLI flag or the
/// `CREATE_OPENFORT_TEMPLATES` environment variable.
pub fn default_templates_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("create-openfort"))
        .unwrap_or_else(|| PathBuf::from(".create-openfort"))
        .join("templates")
}
