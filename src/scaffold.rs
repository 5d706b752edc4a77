//! # Scaffolding Pipeline
//!
//! Runs the steps of one scaffolding invocation strictly in order:
//!
//! ```text
//! Uninitialized -> WorkspaceReady -> (BackendProvisioned) -> TemplateMaterialized -> EnvWritten -> Done
//! ```
//!
//! The first failing step moves the run to [`Stage::Aborted`] and its error
//! is returned unchanged. Nothing is retried and files already written stay
//! on disk; re-running with `--overwrite` is the recovery path.

use std::fmt;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::defaults::{quickstart_subpath, QUICKSTART_REPO};
use crate::download::{Downloader, FetchOptions};
use crate::env::{self, EnvValues};
use crate::error::Result;
use crate::framework::{Framework, Template};
use crate::materialize::{self, TemplateSource};
use crate::workspace::{BackendSecrets, Workspace};

/// Where a run is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Uninitialized,
    WorkspaceReady,
    BackendProvisioned,
    TemplateMaterialized,
    EnvWritten,
    Done,
    Aborted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Uninitialized => "uninitialized",
            Stage::WorkspaceReady => "workspace ready",
            Stage::BackendProvisioned => "backend provisioned",
            Stage::TemplateMaterialized => "template materialized",
            Stage::EnvWritten => "env written",
            Stage::Done => "done",
            Stage::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Where the frontend files come from.
#[derive(Debug, Clone)]
pub enum TemplatePlan {
    /// A quickstart picked from the quickstart repository.
    Quickstart(Template),
    /// A framework template layered from a local templates root.
    Layered(TemplateSource),
}

impl TemplatePlan {
    pub fn layered(framework: Framework, templates_root: impl Into<PathBuf>, product: impl Into<String>) -> Self {
        TemplatePlan::Layered(TemplateSource::new(framework, templates_root, product))
    }
}

/// Everything needed to scaffold a project once the questions are answered.
#[derive(Debug, Clone)]
pub struct ScaffoldPlan {
    pub template: TemplatePlan,
    /// Provision the sample backend with these secrets
    pub backend: Option<BackendSecrets>,
    /// Frontend env values, unprefixed (`OPENFORT_PUBLISHABLE_KEY`, ...)
    pub env: EnvValues,
    pub fetch: FetchOptions,
}

impl ScaffoldPlan {
    pub fn new(template: TemplatePlan) -> Self {
        Self {
            template,
            backend: None,
            env: EnvValues::new(),
            fetch: FetchOptions::default(),
        }
    }

    pub fn with_backend(mut self, secrets: BackendSecrets) -> Self {
        self.backend = Some(secrets);
        self
    }

    pub fn with_env(mut self, key: &str, value: Option<String>) -> Self {
        self.env.insert(key.to_string(), value);
        self
    }

    pub fn with_fetch(mut self, fetch: FetchOptions) -> Self {
        self.fetch = fetch;
        self
    }
}

/// Execute `plan` against an initialized `workspace`.
///
/// `observe` is told about every stage the run enters, including the final
/// `Done` or `Aborted`.
pub fn run<F>(plan: &ScaffoldPlan, workspace: &mut Workspace, downloader: &Downloader, mut observe: F) -> Result<()>
where
    F: FnMut(Stage),
{
    let mut stage = Stage::Uninitialized;
    let mut enter = |next: Stage, stage: &mut Stage| {
        debug!("Scaffold stage: {} -> {}", stage, next);
        *stage = next;
        observe(next);
    };

    let result = execute(plan, workspace, downloader, &mut |next| enter(next, &mut stage));
    match result {
        Ok(()) => {
            if let Ok(root) = workspace.root() {
                info!("Scaffolded project in {}", root.display());
            }
            enter(Stage::Done, &mut stage);
            Ok(())
        }
        Err(e) => {
            warn!("Scaffolding aborted after stage '{}': {}", stage, e);
            enter(Stage::Aborted, &mut stage);
            Err(e)
        }
    }
}

fn execute(
    plan: &ScaffoldPlan,
    workspace: &mut Workspace,
    downloader: &Downloader,
    enter: &mut dyn FnMut(Stage),
) -> Result<()> {
    workspace.root()?;
    enter(Stage::WorkspaceReady);

    if let Some(secrets) = &plan.backend {
        workspace.create_backend(downloader, secrets, &plan.fetch)?;
        enter(Stage::BackendProvisioned);
    }

    match &plan.template {
        TemplatePlan::Quickstart(template) => {
            workspace.git_pick(
                downloader,
                QUICKSTART_REPO,
                &quickstart_subpath(template.name()),
                &plan.fetch,
            )?;
        }
        TemplatePlan::Layered(source) => materialize::materialize(source, workspace)?,
    }
    enter(Stage::TemplateMaterialized);

    match &plan.template {
        TemplatePlan::Quickstart(_) => env::fill_env(workspace, &plan.env)?,
        TemplatePlan::Layered(source) => env::fill_framework_env(workspace, source.framework, &plan.env)?,
    }
    enter(Stage::EnvWritten);
    Ok(())
}
