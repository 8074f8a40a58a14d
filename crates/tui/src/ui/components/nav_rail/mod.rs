//! Vertical navigation rail.
//!
//! One icon button per [`NavigationItem`](workbench_types::NavigationItem).
//! The item matching the current route is drawn as an emphasized,
//! non-interactive button; every other item is a link that emits
//! `Effect::Navigate` when activated and shows its label as a tooltip while
//! focused or hovered.

mod nav_rail_component;
mod state;

pub use nav_rail_component::NavigationRailComponent;
pub use state::{NavigationRailState, RailButton, RailButtonKind};
