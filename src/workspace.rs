//! # Project Workspace
//!
//! The [`Workspace`] owns the target directory of a scaffolding run: it
//! resolves and creates the directory, decides what happens to existing
//! files, derives the package name, and maps workspace-relative file names to
//! absolute paths.
//!
//! A workspace starts uninitialized. Every path-producing method fails with
//! [`Error::NotInitialized`] until [`Workspace::initialize`] has succeeded.
//! Once a backend is added the workspace switches to subfolder mode and all
//! frontend paths are rooted under `frontend/`; backend paths always use an
//! explicit `backend/` segment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::defaults::{BACKEND_PORT, BACKEND_REPO, FALLBACK_PACKAGE_NAME};
use crate::download::{DownloadTask, Downloader, FetchOptions};
use crate::env::{fill_env_in, EnvValues, KeyMatch};
use crate::error::{Error, Result};
use crate::fsops;
use crate::package_name::{format_target_dir, is_valid_name, to_valid_name};
use crate::prompt::{OverwritePolicy, Prompter};

pub const FRONTEND_DIR: &str = "frontend";
pub const BACKEND_DIR: &str = "backend";
/// Scratch directory under the root used while picking a template.
pub const TMP_DIR: &str = "tmp";

/// Package manager inferred from the `npm_config_user_agent` variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManager {
    pub name: String,
    pub version: Option<String>,
}

impl PackageManager {
    /// Parse a user agent such as `pnpm/9.1.0 npm/? node/v20.11.0 darwin arm64`.
    pub fn from_user_agent(user_agent: &str) -> Option<Self> {
        let spec = user_agent.split_whitespace().next()?;
        let mut parts = spec.split('/');
        let name = parts.next().filter(|name| !name.is_empty())?;
        Some(Self {
            name: name.to_string(),
            version: parts.next().map(str::to_string),
        })
    }

    /// Detect from the environment, defaulting to `npm`.
    pub fn detect() -> Self {
        env::var("npm_config_user_agent")
            .ok()
            .and_then(|agent| Self::from_user_agent(&agent))
            .unwrap_or_default()
    }
}

impl Default for PackageManager {
    fn default() -> Self {
        Self {
            name: "npm".to_string(),
            version: None,
        }
    }
}

/// Secrets written to the sample backend's `.env`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSecrets {
    pub openfort_secret_key: String,
    pub shield_secret_key: String,
    pub shield_api_key: String,
    pub shield_encryption_share: String,
    pub port: u16,
}

impl BackendSecrets {
    pub fn new(
        openfort_secret_key: impl Into<String>,
        shield_secret_key: impl Into<String>,
        shield_api_key: impl Into<String>,
        shield_encryption_share: impl Into<String>,
    ) -> Self {
        Self {
            openfort_secret_key: openfort_secret_key.into(),
            shield_secret_key: shield_secret_key.into(),
            shield_api_key: shield_api_key.into(),
            shield_encryption_share: shield_encryption_share.into(),
            port: BACKEND_PORT,
        }
    }

    pub fn env_values(&self) -> EnvValues {
        [
            ("OPENFORT_SECRET_KEY", self.openfort_secret_key.clone()),
            ("SHIELD_SECRET_KEY", self.shield_secret_key.clone()),
            ("SHIELD_API_KEY", self.shield_api_key.clone()),
            ("SHIELD_ENCRYPTION_SHARE", self.shield_encryption_share.clone()),
            ("PORT", self.port.to_string()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), Some(value)))
        .collect()
    }
}

/// Hints from the command line for [`Workspace::initialize`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Target directory given as an argument; prompted for when absent
    pub target_dir: Option<String>,
    /// Policy for a non-empty target; prompted for when absent
    pub overwrite: Option<OverwritePolicy>,
    pub default_target_dir: String,
}

/// The directory being scaffolded and its derived metadata.
#[derive(Debug, Clone)]
pub struct Workspace {
    cwd: PathBuf,
    root: Option<PathBuf>,
    target_dir: String,
    package_name: String,
    uses_subfolders: bool,
    package_manager: PackageManager,
}

impl Workspace {
    /// An uninitialized workspace whose relative target is resolved against `cwd`.
    pub fn new(cwd: impl Into<PathBuf>, package_manager: PackageManager) -> Self {
        Self {
            cwd: cwd.into(),
            root: None,
            target_dir: String::new(),
            package_name: String::new(),
            uses_subfolders: false,
            package_manager,
        }
    }

    /// Resolve the target directory, settle what happens to existing files,
    /// derive the package name and create the root directory.
    ///
    /// Returns [`Error::Cancelled`] if the user aborts at any question.
    pub fn initialize(&mut self, options: &InitOptions, prompter: &dyn Prompter) -> Result<()> {
        let target_dir = match &options.target_dir {
            Some(dir) => format_target_dir(dir),
            None => format_target_dir(&prompter.project_name(&options.default_target_dir)?),
        };
        let target_dir = if target_dir.is_empty() {
            options.default_target_dir.clone()
        } else {
            target_dir
        };
        info!("Project name: {}", target_dir);

        let root = if target_dir == "." {
            self.cwd.clone()
        } else {
            self.cwd.join(&target_dir)
        };
        if root.is_dir() && !fsops::is_empty(&root)? {
            let label = if target_dir == "." {
                "Current directory".to_string()
            } else {
                format!("Target directory \"{}\"", target_dir)
            };
            let policy = match options.overwrite {
                Some(policy) => policy,
                None => prompter.overwrite_policy(&label)?,
            };
            match policy {
                OverwritePolicy::Abort => return Err(Error::cancelled()),
                OverwritePolicy::Purge => {
                    debug!("Emptying {}", root.display());
                    fsops::empty_dir(&root)?;
                }
                OverwritePolicy::Keep => debug!("Keeping existing files in {}", root.display()),
            }
        }

        let package_name = self.derive_package_name(&root, prompter)?;

        fs::create_dir_all(&root)?;
        debug!("Workspace root {} (package {})", root.display(), package_name);

        self.target_dir = target_dir;
        self.package_name = package_name;
        self.root = Some(root);
        Ok(())
    }

    fn derive_package_name(&self, root: &Path, prompter: &dyn Prompter) -> Result<String> {
        let base = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .or_else(|| {
                root.canonicalize()
                    .ok()
                    .and_then(|path| path.file_name().map(|name| name.to_string_lossy().into_owned()))
            })
            .unwrap_or_else(|| FALLBACK_PACKAGE_NAME.to_string());

        if is_valid_name(&base) {
            return Ok(base);
        }

        let suggested = to_valid_name(&base);
        let answer = prompter.package_name(&suggested)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(suggested);
        }
        if !is_valid_name(answer) {
            return Err(Error::InvalidPackageName {
                name: answer.to_string(),
            });
        }
        Ok(answer.to_string())
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Result<&Path> {
        self.root.as_deref().ok_or(Error::NotInitialized)
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Target directory as given by the user.
    pub fn target_dir(&self) -> &str {
        &self.target_dir
    }

    pub fn package_name(&self) -> &str {
        if self.package_name.is_empty() {
            FALLBACK_PACKAGE_NAME
        } else {
            &self.package_name
        }
    }

    pub fn package_manager(&self) -> &PackageManager {
        &self.package_manager
    }

    pub fn uses_subfolders(&self) -> bool {
        self.uses_subfolders
    }

    /// Switch to subfolder mode: frontend files go to `frontend/`.
    pub fn enable_subfolders(&mut self) {
        self.uses_subfolders = true;
    }

    /// Directory that receives frontend files.
    pub fn frontend_dir(&self) -> Result<PathBuf> {
        let root = self.root()?;
        Ok(if self.uses_subfolders {
            root.join(FRONTEND_DIR)
        } else {
            root.to_path_buf()
        })
    }

    /// Absolute path of a frontend file.
    pub fn resolve_path(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(self.frontend_dir()?.join(relative))
    }

    /// Absolute path of a backend file.
    pub fn backend_path(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        Ok(self.root()?.join(BACKEND_DIR).join(relative))
    }

    pub fn read(&self, relative: impl AsRef<Path>) -> Result<String> {
        Ok(fs::read_to_string(self.resolve_path(relative)?)?)
    }

    pub fn write(&self, relative: impl AsRef<Path>, content: &str) -> Result<()> {
        let path = self.resolve_path(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    pub fn edit_file<F>(&self, relative: impl AsRef<Path>, edit: F) -> Result<()>
    where
        F: FnOnce(String) -> String,
    {
        fsops::edit_file(&self.resolve_path(relative)?, edit)
    }

    /// Download `repo` into `<root>/tmp` and copy its `subpath` into the
    /// frontend directory. The scratch directory is removed on every path.
    pub fn git_pick(
        &self,
        downloader: &Downloader,
        repo: &str,
        subpath: &str,
        options: &FetchOptions,
    ) -> Result<()> {
        let tmp = self.root()?.join(TMP_DIR);
        let target = self.frontend_dir()?;
        info!("Picking {} from {} into {}", subpath, repo, target.display());

        let result = pick_into(downloader, repo, subpath, &tmp, &target, options);
        fsops::remove_dir_best_effort(&tmp);
        result
    }

    /// Switch to subfolder mode, download the sample backend into
    /// `<root>/backend` and write its `.env` from `secrets`.
    pub fn create_backend(
        &mut self,
        downloader: &Downloader,
        secrets: &BackendSecrets,
        options: &FetchOptions,
    ) -> Result<()> {
        self.enable_subfolders();
        let backend = self.root()?.join(BACKEND_DIR);
        info!("Creating backend in {}", backend.display());

        downloader.fetch(&DownloadTask::new(BACKEND_REPO, &backend).with_options(options))?;
        fill_env_in(&backend, &secrets.env_values(), KeyMatch::Exact)
    }

    /// Instructions printed once the project has been created.
    pub fn next_steps(&self) -> Result<String> {
        let root = self.root()?;
        let pm = &self.package_manager.name;
        let mut message = String::from("Done.\n\nNow run:");

        if root != self.cwd {
            let relative = root
                .strip_prefix(&self.cwd)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| root.to_path_buf());
            let relative = relative.to_string_lossy();
            if relative.contains(' ') {
                message.push_str(&format!("\n  cd \"{}\"", relative));
            } else {
                message.push_str(&format!("\n  cd {}", relative));
            }
        }

        let run = |message: &mut String| {
            message.push_str(&format!("\n  {} install", pm));
            message.push_str(&format!("\n  {} run dev", pm));
        };

        if self.uses_subfolders {
            message.push_str("\n\nFor the backend project, run in one terminal.");
            message.push_str(&format!("\n  cd {}", BACKEND_DIR));
            run(&mut message);
            message.push_str("\n\nThen run the frontend project in another terminal.");
            message.push_str(&format!("\n  cd {}", FRONTEND_DIR));
        }
        run(&mut message);

        Ok(message)
    }
}

fn pick_into(
    downloader: &Downloader,
    repo: &str,
    subpath: &str,
    tmp: &Path,
    target: &Path,
    options: &FetchOptions,
) -> Result<()> {
    downloader.fetch(&DownloadTask::new(repo, tmp).with_options(options))?;

    let source = tmp.join(subpath);
    if !source.is_dir() {
        return Err(Error::TemplateNotFound {
            framework: subpath.to_string(),
            path: format!("{}/{}", repo, subpath),
        });
    }
    fsops::copy_dir(&source, target, &[])
}
