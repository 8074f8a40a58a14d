//! Terminal UI: runtime loop, main view, components, themes and layout helpers.

pub mod components;
pub mod main_component;
pub mod runtime;
pub mod theme;
pub mod utils;
