//! # Create Command Implementation
//!
//! Collects the answers for a new project (from flags, environment variables
//! or interactive prompts), then hands a [`ScaffoldPlan`] to the library.
//!
//! When stdin or stdout is not a terminal, no prompt is shown: every answer
//! must come from a flag or falls back to its default.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use log::{debug, info};

use create_openfort::defaults::{
    default_templates_root, DEFAULT_API_ENDPOINT, DEFAULT_DASHBOARD_URL, DEFAULT_DOWNLOADER,
    DEFAULT_PRODUCT, DEFAULT_TARGET_DIR,
};
use create_openfort::download::{Downloader, FetchOptions};
use create_openfort::error::Error;
use create_openfort::framework::{is_known_theme, Framework, Template};
use create_openfort::keys::{self, KeyKind};
use create_openfort::output::{self, OutputConfig};
use create_openfort::prompt::{Defaults, OverwritePolicy, Prompter};
use create_openfort::scaffold::{self, ScaffoldPlan, Stage, TemplatePlan};
use create_openfort::workspace::{BackendSecrets, InitOptions, PackageManager, Workspace};

use super::prompts::Interactive;

/// Arguments for creating a project
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Directory to create the project in
    #[arg(value_name = "DIRECTORY")]
    pub directory: Option<String>,

    /// Quickstart template (openfort-ui, headless, firebase)
    #[arg(short, long, value_name = "NAME")]
    pub template: Option<String>,

    /// Build a layered framework template (vite, nextjs) from a local templates root
    #[arg(long, value_name = "NAME", conflicts_with = "template")]
    pub framework: Option<String>,

    /// Templates root used with --framework
    #[arg(long, value_name = "PATH", env = "CREATE_OPENFORT_TEMPLATES")]
    pub templates_root: Option<PathBuf>,

    /// Product folder under updated-files/ used with --framework
    #[arg(long, value_name = "NAME", default_value = DEFAULT_PRODUCT)]
    pub product: String,

    /// Remove existing files in the target directory without asking
    #[arg(short, long)]
    pub overwrite: bool,

    /// Use default values for all inputs
    #[arg(short = 'd', long = "default")]
    pub use_defaults: bool,

    /// Enable verbose mode
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Enable verbose mode with debug logging
    #[arg(long)]
    pub verbose_debug: bool,

    /// Disable input validation
    #[arg(long)]
    pub no_validate: bool,

    /// Show where to manage the project
    #[arg(long, value_name = "URL", num_args = 0..=1, default_missing_value = DEFAULT_DASHBOARD_URL)]
    pub dashboard: Option<String>,

    /// Download timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub timeout: u64,

    /// Openfort publishable key
    #[arg(long, value_name = "KEY", env = "OPENFORT_PUBLISHABLE_KEY", hide_env_values = true)]
    pub publishable_key: Option<String>,

    /// Openfort secret key (sample backend)
    #[arg(long, value_name = "KEY", env = "OPENFORT_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Shield publishable key
    #[arg(long, value_name = "KEY", env = "SHIELD_PUBLISHABLE_KEY", hide_env_values = true)]
    pub shield_publishable_key: Option<String>,

    /// Shield secret key (sample backend)
    #[arg(long, value_name = "KEY", env = "SHIELD_SECRET_KEY", hide_env_values = true)]
    pub shield_secret_key: Option<String>,

    /// Shield encryption share (sample backend)
    #[arg(long, value_name = "SHARE", env = "SHIELD_ENCRYPTION_SHARE", hide_env_values = true)]
    pub shield_encryption_share: Option<String>,

    /// Existing endpoint that creates encryption sessions (no sample backend)
    #[arg(long, value_name = "URL", conflicts_with = "no_backend")]
    pub api_endpoint: Option<String>,

    /// Theme for the openfort-ui template
    #[arg(long, value_name = "THEME")]
    pub theme: Option<String>,

    /// Do not create a sample backend
    #[arg(long)]
    pub no_backend: bool,

    /// Command used to download templates
    #[arg(long, value_name = "COMMAND", env = "CREATE_OPENFORT_DOWNLOADER", default_value = DEFAULT_DOWNLOADER, hide = true)]
    pub downloader: String,
}

/// How the encryption session is served.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Recovery {
    /// Provision the sample backend
    SampleBackend,
    /// Use an existing endpoint
    Endpoint(String),
}

/// Answers come from flags first, then from prompts when interactive.
struct Session<'a> {
    args: &'a CreateArgs,
    output: &'a OutputConfig,
    interactive: Option<Interactive>,
}

impl<'a> Session<'a> {
    fn validate(&self) -> bool {
        !self.args.no_validate
    }

    fn template(&self) -> Result<TemplatePlan> {
        if let Some(name) = &self.args.framework {
            let framework: Framework = name.parse()?;
            let root = self
                .args
                .templates_root
                .clone()
                .unwrap_or_else(default_templates_root);
            return Ok(TemplatePlan::layered(framework, root, self.args.product.as_str()));
        }

        let template = match self.args.template.as_deref() {
            Some(name) => match name.parse::<Template>() {
                Ok(template) => {
                    info!("Using template from argument: {}", template);
                    template
                }
                Err(e) => match &self.interactive {
                    Some(interactive) => interactive.template(Some(name))?,
                    None => return Err(e.into()),
                },
            },
            None => match &self.interactive {
                Some(interactive) => interactive.template(None)?,
                None => Template::OpenfortUi,
            },
        };
        Ok(TemplatePlan::Quickstart(template))
    }

    fn recovery(&self) -> Result<Recovery> {
        if let Some(endpoint) = &self.args.api_endpoint {
            if self.validate() {
                keys::validate_endpoint(endpoint).map_err(anyhow::Error::msg)?;
            }
            return Ok(Recovery::Endpoint(endpoint.clone()));
        }
        let default_endpoint = Recovery::Endpoint(DEFAULT_API_ENDPOINT.to_string());
        if self.args.no_backend {
            return Ok(default_endpoint);
        }

        let Some(interactive) = &self.interactive else {
            return Ok(if self.args.secret_key.is_some() {
                Recovery::SampleBackend
            } else {
                default_endpoint
            });
        };

        let automatic = self.args.use_defaults || interactive.automatic_recovery()?;
        if !automatic {
            return Ok(default_endpoint);
        }
        if interactive.create_backend()? {
            Ok(Recovery::SampleBackend)
        } else {
            Ok(Recovery::Endpoint(interactive.api_endpoint(DEFAULT_API_ENDPOINT)?))
        }
    }

    fn theme(&self, plan: &TemplatePlan) -> Result<Option<String>> {
        let supports_theme = matches!(plan, TemplatePlan::Quickstart(template) if template.supports_theme());
        if !supports_theme {
            return Ok(None);
        }
        if let Some(theme) = &self.args.theme {
            if self.validate() && !is_known_theme(theme) {
                bail!("Unknown theme '{}'", theme);
            }
            return Ok(Some(theme.clone()));
        }
        match &self.interactive {
            Some(interactive) => Ok(Some(interactive.theme()?)),
            None => Ok(None),
        }
    }

    /// A key from its flag, or from a prompt when interactive.
    fn key(&self, kind: KeyKind, arg: &Option<String>) -> Result<Option<String>> {
        if let Some(value) = arg {
            if self.validate() {
                keys::validate_key(kind, value).map_err(anyhow::Error::msg)?;
            }
            return Ok(Some(value.clone()));
        }
        match &self.interactive {
            Some(interactive) => Ok(Some(interactive.key(kind)?)),
            None => Ok(None),
        }
    }

    /// Secrets for the sample backend, asked in dashboard order. Also
    /// returns the Shield publishable key, which the frontend needs too.
    fn backend_secrets(&self) -> Result<(BackendSecrets, Option<String>)> {
        let secret_key = self.key(KeyKind::SecretKey, &self.args.secret_key)?;
        let shield_key = self.key(KeyKind::ShieldPublishableKey, &self.args.shield_publishable_key)?;
        let encryption_share = self.key(KeyKind::ShieldEncryptionShare, &self.args.shield_encryption_share)?;
        let shield_secret = self.key(KeyKind::ShieldSecretKey, &self.args.shield_secret_key)?;

        match (secret_key, shield_secret, &shield_key, encryption_share) {
            (Some(secret), Some(shield_secret), Some(shield), Some(share)) => Ok((
                BackendSecrets::new(secret, shield_secret, shield.as_str(), share),
                shield_key.clone(),
            )),
            _ => bail!(
                "Missing Openfort Secret, Shield Secret, Shield Publishable Key or Shield Encryption Share"
            ),
        }
    }
}

fn stage_message(stage: Stage) -> Option<&'static str> {
    match stage {
        Stage::WorkspaceReady => Some("Downloading template..."),
        Stage::BackendProvisioned => Some("Backend created. Downloading template..."),
        Stage::TemplateMaterialized => Some("Filling .env..."),
        _ => None,
    }
}

/// Execute the create command.
pub fn execute(args: CreateArgs, output: &OutputConfig) -> Result<()> {
    let interactive = console::Term::stdout().is_term() && console::Term::stderr().is_term() && is_stdin_tty();
    let session = Session {
        args: &args,
        output,
        interactive: interactive.then(|| Interactive::new(!args.no_validate)),
    };
    debug!("Interactive session: {}", interactive);

    output::step(output, "Let's create a new Openfort project!");
    if args.verbose || args.verbose_debug {
        output::success(output, "Verbose mode enabled");
        output::info(
            output,
            &format!("create-openfort version: {}", env!("CARGO_PKG_VERSION")),
        );
    }
    if let Some(dashboard) = &args.dashboard {
        output::info(output, &format!("You can manage your Openfort project at {}", dashboard));
    }
    if args.no_validate {
        output::warning(
            output,
            "No validation will be performed on the input values.\nPlease make sure to provide valid values.",
        );
    }

    let cwd = env::current_dir()?;
    let mut workspace = Workspace::new(cwd, PackageManager::detect());
    let init = InitOptions {
        target_dir: args.directory.clone(),
        overwrite: args.overwrite.then_some(OverwritePolicy::Purge),
        default_target_dir: DEFAULT_TARGET_DIR.to_string(),
    };
    let defaults = Defaults {
        overwrite: if args.overwrite {
            OverwritePolicy::Purge
        } else {
            OverwritePolicy::Abort
        },
    };
    let prompter: &dyn Prompter = match &session.interactive {
        Some(interactive) => interactive,
        None => &defaults,
    };
    workspace.initialize(&init, prompter)?;
    output::success(output, &format!("Project name: {}", workspace.target_dir()));

    let template = session.template()?;
    let recovery = session.recovery()?;
    let theme = session.theme(&template)?;

    if session.interactive.is_some() {
        let dashboard = args.dashboard.as_deref().unwrap_or(DEFAULT_DASHBOARD_URL);
        output::success(
            output,
            &format!(
                "Good! You are all set.\nPlease provide the following keys to continue.\nGet your keys from {}/developers/api-keys",
                dashboard
            ),
        );
    }

    let publishable_key = session.key(KeyKind::PublishableKey, &args.publishable_key)?;
    let (backend, shield_publishable_key, endpoint) = match &recovery {
        Recovery::SampleBackend => {
            let (secrets, shield_key) = session.backend_secrets()?;
            (Some(secrets), shield_key, DEFAULT_API_ENDPOINT.to_string())
        }
        Recovery::Endpoint(endpoint) => {
            let shield_key = session.key(KeyKind::ShieldPublishableKey, &args.shield_publishable_key)?;
            (None, shield_key, endpoint.clone())
        }
    };

    let mut plan = ScaffoldPlan::new(template)
        .with_env("SHIELD_PUBLISHABLE_KEY", shield_publishable_key)
        .with_env("OPENFORT_PUBLISHABLE_KEY", publishable_key)
        .with_env("CREATE_ENCRYPTED_SESSION_ENDPOINT", Some(endpoint))
        .with_fetch(FetchOptions {
            timeout: Duration::from_secs(args.timeout),
            verbose: args.verbose || args.verbose_debug,
        });
    if let Some(theme) = theme {
        plan = plan.with_env("OPENFORT_THEME", Some(theme));
    }
    if let Some(secrets) = backend {
        plan = plan.with_backend(secrets);
    }

    if let Ok(root) = workspace.root() {
        output::step(output, &format!("Scaffolding project in {}...", root.display()));
    }

    let downloader = Downloader::new(args.downloader.as_str())?;
    let spinner = if plan.fetch.verbose || session.interactive.is_none() {
        indicatif::ProgressBar::hidden()
    } else {
        output::spinner("Preparing workspace...")
    };
    let result = scaffold::run(&plan, &mut workspace, &downloader, |stage| {
        if let Some(message) = stage_message(stage) {
            spinner.set_message(message);
        }
    });

    match result {
        Ok(()) => {
            spinner.finish_and_clear();
            output::success(
                session.output,
                &format!("Template download completed successfully! {}", output::emoji(session.output, "🚀", "")),
            );
            output::outro(&workspace.next_steps()?);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            if let Error::Download(_) = &e {
                output::error(output, "Failed to download template.");
            }
            Err(e.into())
        }
    }
}

fn is_stdin_tty() -> bool {
    use std::io::IsTerminal;
    std::io::stdin().is_terminal()
}
