//! Theme styling module for the TUI UI layer.
//!
//! Two truecolor palettes (Dracula and Nord), the semantic role table and
//! helper builders for Ratatui widgets. Prefer these helpers over hard-coding
//! colors.

use std::{env, fmt};

use tracing::debug;

pub mod dracula;
pub mod nord;
pub mod roles;
pub mod theme_helpers;

pub use dracula::DraculaTheme;
pub use nord::NordTheme;
pub use roles::Theme;

/// Environment variable that overrides the persisted theme choice.
pub const THEME_ENV: &str = "TUI_THEME";

/// Identifier of a built-in theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeId {
    #[default]
    Dracula,
    Nord,
}

impl ThemeId {
    const ALL: [ThemeId; 2] = [ThemeId::Dracula, ThemeId::Nord];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dracula => "dracula",
            Self::Nord => "nord",
        }
    }

    pub fn resolve(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|id| id.as_str().eq_ignore_ascii_case(name))
    }

    /// The theme after this one, wrapping around.
    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|id| *id == self).unwrap_or_default();
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn build(self) -> Box<dyn Theme> {
        match self {
            Self::Dracula => Box::new(DraculaTheme::new()),
            Self::Nord => Box::new(NordTheme::new()),
        }
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selects a theme from `TUI_THEME`, then the persisted preference, then the default.
pub fn load(preferred_theme: Option<&str>) -> ThemeId {
    if let Ok(theme_name) = env::var(THEME_ENV)
        && let Some(id) = ThemeId::resolve(&theme_name)
    {
        debug!(theme = %id, "theme selected from environment");
        return id;
    }

    preferred_theme.and_then(ThemeId::resolve).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_wraps_around() {
        assert_eq!(ThemeId::Dracula.next(), ThemeId::Nord);
        assert_eq!(ThemeId::Nord.next(), ThemeId::Dracula);
    }

    #[test]
    fn environment_wins_over_preference() {
        temp_env::with_var(THEME_ENV, Some("NORD"), || {
            assert_eq!(load(Some("dracula")), ThemeId::Nord);
        });
        temp_env::with_var(THEME_ENV, Some("unknown"), || {
            assert_eq!(load(Some("nord")), ThemeId::Nord);
        });
        temp_env::with_var_unset(THEME_ENV, || {
            assert_eq!(load(None), ThemeId::Dracula);
        });
    }
}
