//! Navigation rail item descriptors and route matching.
//!
//! Items are immutable once built and cheap to clone: the label producer and
//! the optional selection predicate are shared behind `Arc`s.

use std::fmt;
use std::sync::Arc;

/// Produces the label shown in an item's tooltip.
pub type LabelFn = Arc<dyn Fn() -> String + Send + Sync>;

/// Custom selection predicate evaluated against the current path.
pub type SelectionPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Icon pair for a navigation item.
///
/// `selected` is optional; when absent the default glyph is used for both
/// states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavIcon {
    pub default: String,
    pub selected: Option<String>,
}

impl NavIcon {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            selected: None,
        }
    }

    pub fn with_selected(mut self, selected: impl Into<String>) -> Self {
        self.selected = Some(selected.into());
        self
    }

    /// Glyph to draw for the given selection state.
    pub fn glyph(&self, is_selected: bool) -> &str {
        match (&self.selected, is_selected) {
            (Some(selected), true) => selected,
            _ => &self.default,
        }
    }
}

/// Where a navigation item links to.
///
/// `as_path` mirrors the display path of a link when it differs from `href`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub href: String,
    pub as_path: Option<String>,
}

impl LinkTarget {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            as_path: None,
        }
    }

    pub fn with_as(mut self, as_path: impl Into<String>) -> Self {
        self.as_path = Some(as_path.into());
        self
    }

    /// Absolute path the router should land on when this link is followed.
    ///
    /// `as_path` wins over `href`; relative targets resolve against the root.
    pub fn resolved_path(&self) -> String {
        let raw = self.as_path.as_deref().unwrap_or(&self.href).trim();
        if raw.starts_with('/') {
            raw.to_string()
        } else {
            format!("/{raw}")
        }
    }
}

/// A single entry in the navigation rail.
#[derive(Clone)]
pub struct NavigationItem {
    pub id: String,
    pub icon: NavIcon,
    pub link: LinkTarget,
    label: LabelFn,
    is_selected: Option<SelectionPredicate>,
}

impl NavigationItem {
    pub fn new(id: impl Into<String>, icon: NavIcon, label: impl Into<String>, link: LinkTarget) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            icon,
            link,
            label: Arc::new(move || label.clone()),
            is_selected: None,
        }
    }

    /// Replace the static label with a producer evaluated on each render.
    pub fn with_label_fn(mut self, label: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.label = Arc::new(label);
        self
    }

    pub fn with_selection_predicate(mut self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.is_selected = Some(Arc::new(predicate));
        self
    }

    pub fn label(&self) -> String {
        (self.label)()
    }

    pub fn has_selection_predicate(&self) -> bool {
        self.is_selected.is_some()
    }

    /// Whether this item represents `pathname`.
    ///
    /// Without a custom predicate the path must match `^/<id>[/]*`, which is a
    /// plain prefix test since the trailing slash group may be empty.
    pub fn is_selected(&self, pathname: &str) -> bool {
        match &self.is_selected {
            Some(predicate) => predicate(pathname),
            None => pathname
                .strip_prefix('/')
                .is_some_and(|rest| rest.starts_with(self.id.as_str())),
        }
    }
}

impl fmt::Debug for NavigationItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationItem")
            .field("id", &self.id)
            .field("label", &self.label())
            .field("icon", &self.icon)
            .field("link", &self.link)
            .field("custom_selection", &self.is_selected.is_some())
            .finish()
    }
}

/// The rail used when the caller does not supply any items.
pub fn default_navigation_items() -> Vec<NavigationItem> {
    vec![
        NavigationItem::new(
            "pipelines",
            NavIcon::new("[P]").with_selected("<P>"),
            "Pipelines",
            LinkTarget::new("pipelines"),
        ),
        NavigationItem::new(
            "pipeline-runs",
            NavIcon::new("[R]").with_selected("<R>"),
            "Pipelines runs",
            LinkTarget::new("pipeline-runs"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matcher_is_anchored_prefix() {
        let items = default_navigation_items();
        let runs = &items[1];
        assert!(runs.is_selected("/pipeline-runs"));
        assert!(runs.is_selected("/pipeline-runs/123"));
        assert!(runs.is_selected("/pipeline-runs///"));
        assert!(!runs.is_selected("pipeline-runs"));
        assert!(!runs.is_selected("/manage/pipeline-runs"));
    }

    #[test]
    fn pipeline_runs_path_does_not_select_pipelines() {
        let items = default_navigation_items();
        let selected: Vec<_> = items
            .iter()
            .filter(|item| item.is_selected("/pipeline-runs/123"))
            .map(|item| item.id.as_str())
            .collect();
        assert_eq!(selected, vec!["pipeline-runs"]);
    }

    #[test]
    fn custom_predicate_overrides_id_matching() {
        let item = NavigationItem::new("workspaces", NavIcon::new("[W]"), "Workspaces", LinkTarget::new("/manage"))
            .with_selection_predicate(|path| path.starts_with("/manage"));
        assert!(item.is_selected("/manage/settings"));
        assert!(!item.is_selected("/workspaces"));
    }

    #[test]
    fn selected_glyph_falls_back_to_default() {
        let icon = NavIcon::new("o");
        assert_eq!(icon.glyph(true), "o");
        let icon = icon.with_selected("*");
        assert_eq!(icon.glyph(true), "*");
        assert_eq!(icon.glyph(false), "o");
    }

    #[test]
    fn link_resolution_prefers_as_path() {
        assert_eq!(LinkTarget::new("pipelines").resolved_path(), "/pipelines");
        assert_eq!(LinkTarget::new("/manage").resolved_path(), "/manage");
        assert_eq!(
            LinkTarget::new("/pipelines/[id]").with_as("/pipelines/etl").resolved_path(),
            "/pipelines/etl"
        );
    }

    #[test]
    fn label_producer_is_evaluated_lazily() {
        let item = NavigationItem::new("x", NavIcon::new("x"), "ignored", LinkTarget::new("x"))
            .with_label_fn(|| "Computed".to_string());
        assert_eq!(item.label(), "Computed");
    }
}
