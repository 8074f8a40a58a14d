//! In-app log panel: a scrolling list of timestamped, redacted entries.

use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
};
use workbench_types::Effect;

use super::state::{LogEntry, LogLevel};
use crate::app::App;
use crate::ui::{
    components::component::Component,
    theme::{Theme, theme_helpers as th},
};

#[derive(Debug, Default)]
pub struct LogsComponent;

impl LogsComponent {
    fn entry_line(theme: &dyn Theme, entry: &LogEntry) -> Line<'static> {
        let level_style = match entry.level {
            LogLevel::Info => theme.status_info(),
            LogLevel::Warn => theme.status_warning(),
            LogLevel::Error => theme.status_error(),
        };
        Line::from(vec![
            Span::styled(entry.at.format("%H:%M:%S ").to_string(), theme.text_muted_style()),
            Span::styled(format!("{:<5} ", entry.level.as_str()), level_style),
            Span::styled(entry.message.clone(), theme.text_primary_style()),
        ])
    }
}

impl Component for LogsComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up => app.logs.select_previous(),
            KeyCode::Down => app.logs.select_next(),
            KeyCode::Tab => {
                app.focus.next();
            }
            KeyCode::BackTab => {
                app.focus.prev();
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        match mouse.kind {
            MouseEventKind::ScrollUp => app.logs.select_previous(),
            MouseEventKind::ScrollDown => app.logs.select_next(),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let focused = app.logs.focus.get();
        let title = format!("Logs ({})", app.logs.entries.len());
        let block = th::block(theme, Some(title.as_str()), focused);

        let items: Vec<ListItem> = app
            .logs
            .entries
            .iter()
            .map(|entry| ListItem::new(Self::entry_line(theme, entry)))
            .collect();
        // Follow the tail unless the user picked a line
        let selected = app.logs.selected.or(app.logs.entries.len().checked_sub(1));
        let mut list_state = ListState::default().with_selected(selected);
        let list = List::new(items)
            .block(block)
            .highlight_style(theme.selection_style().add_modifier(Modifier::BOLD));

        frame.render_stateful_widget(list, area, &mut list_state);
        app.logs.last_area = area;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" ↑/↓", " Scroll"), (" Ctrl+L", " Hide logs")])
    }
}
