//! Package-name validation and sanitization for generated `package.json` files

use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of a package.json `name`.
pub const MAX_PACKAGE_NAME_LENGTH: usize = 214;

static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9~-][a-z0-9._~-]*$").expect("package segment regex is valid")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

static INVALID_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9~-]+").expect("invalid-run regex is valid"));

fn is_valid_segment(segment: &str) -> bool {
    SEGMENT_RE.is_match(segment) && !segment.ends_with('.')
}

/// Check whether `name` can be used as a package.json `name`.
///
/// Unscoped names must match `^[a-z0-9~-][a-z0-9._~-]*$` and not end in a
/// dot. Scoped names (`@scope/name`) must contain exactly one `/` and both
/// segments must satisfy the unscoped rule.
pub fn is_valid_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_PACKAGE_NAME_LENGTH {
        return false;
    }
    if name.contains('*') || name.ends_with('.') {
        return false;
    }

    if let Some(scoped) = name.strip_prefix('@') {
        let mut parts = scoped.split('/');
        let (scope, pkg) = match (parts.next(), parts.next(), parts.next()) {
            (Some(scope), Some(pkg), None) => (scope, pkg),
            _ => return false,
        };
        return is_valid_segment(scope) && is_valid_segment(pkg);
    }

    is_valid_segment(name)
}

/// Turn an arbitrary directory name into a package.json-friendly name.
///
/// Trims, lowercases, turns whitespace into hyphens, drops one leading `.` or
/// `_`, drops trailing dots, and collapses every run of characters outside
/// `[a-z0-9-~]` into a single hyphen. The result is truncated to 214 chars.
pub fn to_valid_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let hyphenated = WHITESPACE_RE.replace_all(&lowered, "-");
    let unprefixed = hyphenated
        .strip_prefix('.')
        .or_else(|| hyphenated.strip_prefix('_'))
        .unwrap_or(&hyphenated);
    let trimmed = unprefixed.trim_end_matches('.');

    let mut sanitized = INVALID_RUN_RE.replace_all(trimmed, "-").into_owned();
    // Only ASCII survives the replacement, so byte truncation is safe.
    sanitized.truncate(MAX_PACKAGE_NAME_LENGTH);
    sanitized
}

/// Normalize a user-supplied target directory: trim whitespace and drop
/// trailing slashes.
pub fn format_target_dir(target_dir: &str) -> String {
    target_dir.trim().trim_end_matches('/').to_string()
}
