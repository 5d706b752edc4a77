//! Format checks for the API keys and endpoint collected during setup.
//!
//! A value of `-` is accepted for every key so a user can skip a key and
//! fill it in later. All checks can be turned off with `--no-validate`.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Answer that skips validation of a key.
pub const SKIP_VALUE: &str = "-";

const UUID_PATTERN: &str = r"[\da-f]{8}-[\da-f]{4}-[\da-f]{4}-[\da-f]{4}-[\da-f]{12}";

static PUBLISHABLE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^pk_(test|live)_{}$", UUID_PATTERN)).expect("publishable key regex is valid")
});

static SECRET_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^sk_(test|live)_{}$", UUID_PATTERN)).expect("secret key regex is valid")
});

static UUID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{}$", UUID_PATTERN)).expect("uuid regex is valid"));

static ENCRYPTION_SHARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.{44}$").expect("encryption share regex is valid"));

/// The kinds of credential asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    PublishableKey,
    SecretKey,
    ShieldPublishableKey,
    ShieldSecretKey,
    ShieldEncryptionShare,
}

impl KeyKind {
    /// Human name used in prompts and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            KeyKind::PublishableKey => "Openfort Publishable Key",
            KeyKind::SecretKey => "Openfort Secret Key",
            KeyKind::ShieldPublishableKey => "Shield Publishable Key",
            KeyKind::ShieldSecretKey => "Shield Secret Key",
            KeyKind::ShieldEncryptionShare => "Shield Encryption Share",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            KeyKind::PublishableKey => "pk...",
            KeyKind::SecretKey => "sk...",
            KeyKind::ShieldPublishableKey => "Your Shield Publishable Key",
            KeyKind::ShieldSecretKey => "Your Shield Secret",
            KeyKind::ShieldEncryptionShare => "Your Shield Encryption Share",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            KeyKind::PublishableKey => &PUBLISHABLE_KEY_RE,
            KeyKind::SecretKey => &SECRET_KEY_RE,
            KeyKind::ShieldPublishableKey | KeyKind::ShieldSecretKey => &UUID_RE,
            KeyKind::ShieldEncryptionShare => &ENCRYPTION_SHARE_RE,
        }
    }
}

/// Check `value` as a `kind`, returning the message to show when it fails.
pub fn validate_key(kind: KeyKind, value: &str) -> Result<(), String> {
    if value == SKIP_VALUE {
        return Ok(());
    }
    if value.is_empty() {
        return Err(format!("{} is required", kind.label()));
    }
    if !kind.pattern().is_match(value) {
        return Err(format!("{} is invalid", kind.label()));
    }
    Ok(())
}

/// Check that an encryption-session endpoint is an absolute http(s) URL.
pub fn validate_endpoint(value: &str) -> Result<(), String> {
    let url = Url::parse(value).map_err(|e| format!("Invalid endpoint '{}': {}", value, e))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!(
            "Invalid endpoint '{}': unsupported scheme '{}'",
            value, scheme
        )),
    }
}
