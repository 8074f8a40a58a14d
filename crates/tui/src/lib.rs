//! # Workbench TUI
//!
//! Terminal dashboard with a navigation rail, content pages and a modal form
//! that creates workspaces through the Workbench API.
//!
//! The UI is component based: each panel implements
//! `ui::components::Component`, reads and mutates the shared `App` state and
//! returns `Effect`s that the runtime turns into navigation, modal changes or
//! background requests.

mod app;
mod cmd;
mod ui;

use anyhow::Result;

pub use app::{TuiOptions, dashboard_navigation_items};
pub use ui::components::pages::WORKSPACES_PATH;

/// Runs the TUI until the user quits.
///
/// # Errors
///
/// Terminal setup or teardown failures (raw mode, alternate screen) and
/// drawing errors.
pub async fn run(options: TuiOptions) -> Result<()> {
    ui::runtime::run_app(options).await
}
