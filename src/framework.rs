//! Template registry.
//!
//! Supported frameworks and quickstart templates are closed enumerations that
//! carry their static metadata as data. Behaviour that differs per framework
//! (env prefix, files the raw template must not copy) is looked up here and
//! passed to plain functions in `materialize` and `env`.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A frontend framework with a layered local template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framework {
    Vite,
    NextJs,
}

/// Static metadata for a [`Framework`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameworkInfo {
    /// Identifier used on the command line and in template folder names
    pub name: &'static str,
    pub display: &'static str,
    /// Prefix the framework requires on client-visible env variables
    pub env_prefix: &'static str,
    /// Paths, relative to the raw template, that must not be copied verbatim
    pub raw_exceptions: &'static [&'static str],
}

const VITE: FrameworkInfo = FrameworkInfo {
    name: "vite",
    display: "Vite (React)",
    env_prefix: "VITE_",
    raw_exceptions: &[
        "package.json",
        "src/App.tsx",
        "src/assets/react.svg",
        "public/vite.svg",
    ],
};

const NEXTJS: FrameworkInfo = FrameworkInfo {
    name: "nextjs",
    display: "Next.js",
    env_prefix: "NEXT_PUBLIC_",
    raw_exceptions: &["package.json"],
};

impl Framework {
    pub const ALL: [Framework; 2] = [Framework::Vite, Framework::NextJs];

    pub fn info(&self) -> &'static FrameworkInfo {
        match self {
            Framework::Vite => &VITE,
            Framework::NextJs => &NEXTJS,
        }
    }

    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Folder name of this framework's layers, e.g. `template-vite`.
    pub fn template_dir_name(&self) -> String {
        format!("template-{}", self.name())
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Framework {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Framework::ALL
            .into_iter()
            .find(|framework| framework.name() == s)
            .ok_or_else(|| Error::UnknownTemplate {
                name: s.to_string(),
            })
    }
}

/// A quickstart template downloaded from the quickstart repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    OpenfortUi,
    Headless,
    Firebase,
}

impl Template {
    pub const ALL: [Template; 3] = [Template::OpenfortUi, Template::Headless, Template::Firebase];

    pub fn name(&self) -> &'static str {
        match self {
            Template::OpenfortUi => "openfort-ui",
            Template::Headless => "headless",
            Template::Firebase => "firebase",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Template::OpenfortUi => "Openfort UI",
            Template::Headless => "Headless UI",
            Template::Firebase => "Third party auth",
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            Template::OpenfortUi => "default",
            Template::Headless => "custom, unstyled",
            Template::Firebase => "with Firebase",
        }
    }

    /// Whether the template ships the themable prebuilt UI.
    pub fn supports_theme(&self) -> bool {
        matches!(self, Template::OpenfortUi)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Template {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|template| template.name() == s)
            .ok_or_else(|| Error::UnknownTemplate {
                name: s.to_string(),
            })
    }
}

/// Themes offered for the prebuilt UI, first one is the default.
pub const THEMES: [(&str, &str); 8] = [
    ("auto", "Default"),
    ("midnight", "Midnight"),
    ("minimal", "Minimal"),
    ("soft", "Soft"),
    ("web95", "Web95"),
    ("rounded", "Rounded"),
    ("retro", "Retro"),
    ("nouns", "Nouns"),
];

pub fn is_known_theme(theme: &str) -> bool {
    THEMES.iter().any(|(value, _)| *value == theme)
}
