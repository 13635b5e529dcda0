use std::sync::LazyLock;

use regex::Regex;

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^A-Za-z0-9]+").expect("static pattern is valid"));

/// Turn an identifier into an environment variable fragment.
///
/// The result is uppercased and every run of characters outside `[A-Za-z0-9]` becomes a
/// single underscore: `dry-run` becomes `DRY_RUN`, `a--b.c` becomes `A_B_C`.
#[must_use]
pub fn normalize_envvar(name: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(name, "_")
        .to_ascii_uppercase()
}

/// Prefix a child command gets when attached under a parent with `parent_prefix`.
#[must_use]
pub fn inherit_envvar_prefix(parent_prefix: Option<&str>, child_name: &str) -> String {
    let normalized = normalize_envvar(child_name);
    match parent_prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}_{normalized}"),
        _ => normalized,
    }
}

/// Environment variable consulted for an option when its command has an auto prefix.
#[must_use]
pub fn auto_envvar(prefix: &str, option_key: &str) -> String {
    format!("{prefix}_{}", normalize_envvar(option_key))
}
