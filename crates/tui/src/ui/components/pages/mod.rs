//! Content pages shown to the right of the navigation rail.

mod placeholder;
mod workspaces;

pub use placeholder::PlaceholderPage;
pub use workspaces::{CreatedWorkspace, WorkspacesPage, WorkspacesState};

/// Prefix of the workspace management page.
pub const WORKSPACES_PATH: &str = "/manage";

/// Page selected by the router's pathname.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRoute {
    Pipelines,
    PipelineRuns,
    Workspaces,
    NotFound,
}

impl PageRoute {
    pub fn for_path(pathname: &str) -> Self {
        let first_segment = pathname.trim_start_matches('/').split('/').next().unwrap_or_default();
        match first_segment {
            "pipelines" => Self::Pipelines,
            "pipeline-runs" => Self::PipelineRuns,
            "manage" => Self::Workspaces,
            _ => Self::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_by_first_segment() {
        assert_eq!(PageRoute::for_path("/pipelines/etl"), PageRoute::Pipelines);
        assert_eq!(PageRoute::for_path("/pipeline-runs/123"), PageRoute::PipelineRuns);
        assert_eq!(PageRoute::for_path(WORKSPACES_PATH), PageRoute::Workspaces);
        assert_eq!(PageRoute::for_path("/"), PageRoute::NotFound);
    }
}
