//! UI components: navigation rail, pages, the workspace form and logs.

pub mod common;
pub mod component;
pub mod logs;
pub mod nav_rail;
pub mod pages;
pub mod workspace_form;

pub(crate) use component::Component;
pub use logs::LogsComponent;
pub use nav_rail::NavigationRailComponent;
pub use workspace_form::WorkspaceFormComponent;

use ratatui::layout::{Position, Rect};

/// Index of the item area containing `(x, y)`, if the point is inside `container`.
pub fn find_target_index_by_mouse_position(container: &Rect, item_areas: &[Rect], x: u16, y: u16) -> Option<usize> {
    let position = Position::new(x, y);
    if !container.contains(position) {
        return None;
    }
    item_areas.iter().position(|area| area.contains(position))
}
