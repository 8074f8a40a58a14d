//! Small helpers shared by the Workbench CLI and TUI.

mod path_processing;
pub mod preferences;

pub use path_processing::expand_tilde;
pub use preferences::{PreferencesError, PreferencesPayload, UserPreferences};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static SENSITIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s*(?:bearer\s+)?)([\w\-\.=:/+]+)",
        r"(?i)([A-Z0-9_]*?(?:KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
        r#"(?i)("(?:api_key|token|password|secret)"\s*:\s*")([^"]*)"#,
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// Only the value is replaced; the key or header prefix is kept so the line
/// stays readable.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in SENSITIVE_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |caps: &Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}<redacted>")
            })
            .to_string();
    }
    redacted
}
