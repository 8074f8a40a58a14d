use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_untouched() {
        assert_eq!(expand_tilde(" /tmp/prefs.json "), PathBuf::from("/tmp/prefs.json"));
    }

    #[test]
    fn tilde_prefix_joins_home() {
        let expanded = expand_tilde("~/workbench/prefs.json");
        assert!(expanded.ends_with("workbench/prefs.json"));
        assert!(!expanded.starts_with("~") || home_dir().is_none());
    }
}
