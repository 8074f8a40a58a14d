//! Component system for the Workbench TUI.
//!
//! Components are self-contained UI elements. They read and mutate the shared
//! [`App`] state, return [`Effect`]s for anything the runtime must carry out
//! (navigation, modals, network calls), and draw themselves into a frame.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{Frame, layout::Rect, text::Span};
use workbench_types::{Effect, Msg};

use crate::app::App;

/// Common interface of every panel, page and modal.
///
/// All handlers default to doing nothing so components only implement the
/// events they care about.
pub(crate) trait Component {
    /// React to an application message (tick, resize, background result).
    fn handle_message(&mut self, _app: &mut App, _msg: &Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle a key press while this component owns focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle a mouse event routed to this component.
    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Draw the component into `rect`.
    ///
    /// Rendering may record geometry (hit areas, scroll offsets) in state,
    /// hence the mutable borrow.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);

    /// Key hints shown in the footer while this component is focused.
    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'static>> {
        Vec::new()
    }

    /// Split `area` into the sub-areas this component draws into.
    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        vec![area]
    }
}
