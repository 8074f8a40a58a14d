use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::Span,
    widgets::{Borders, Clear, Paragraph},
};
use unicode_width::UnicodeWidthStr;
use workbench_types::Effect;

use super::NavigationRailState;
use crate::app::App;
use crate::ui::{
    components::{Component, find_target_index_by_mouse_position},
    theme::theme_helpers::{self as th, ButtonRenderOptions, ButtonType, render_button},
    utils::tooltip_rect,
};

/// Renders the rail and turns activation into `Effect::Navigate`.
#[derive(Debug, Default)]
pub struct NavigationRailComponent;

impl NavigationRailComponent {
    pub fn new() -> Self {
        Self
    }

    fn navigate_effect(app: &mut App, index: usize) -> Vec<Effect> {
        let pathname = app.router.pathname().to_string();
        app.nav_rail
            .activate(index, &pathname)
            .map(|target| vec![Effect::Navigate(target)])
            .unwrap_or_default()
    }

    fn render_tooltip(frame: &mut Frame, app: &mut App, index: usize, label: &str) {
        let Some(anchor) = app.nav_rail.per_item_areas.get(index).copied() else {
            return;
        };
        let text = format!(" {label} ");
        let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
        if let Some(area) = tooltip_rect(anchor, width, frame.area()) {
            frame.render_widget(Clear, area);
            frame.render_widget(Paragraph::new(text).style(app.ctx.theme.selection_style()), area);
        }
    }
}

impl Component for NavigationRailComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        // Entering the rail focuses its first item
        if app.nav_rail.container_focus.get() && app.nav_rail.focused_index().is_none() {
            app.focus.focus(&app.nav_rail);
        }

        match key.code {
            KeyCode::Tab => {
                app.focus.next();
            }
            KeyCode::BackTab => {
                app.focus.prev();
            }
            KeyCode::Down | KeyCode::Up => {
                if let Some(flag) = app.nav_rail.cycle_focus(key.code == KeyCode::Down) {
                    app.focus.focus(&flag);
                }
            }
            KeyCode::Enter => {
                if let Some(index) = app.nav_rail.focused_index() {
                    return Self::navigate_effect(app, index);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let NavigationRailState {
            last_area, per_item_areas, ..
        } = &app.nav_rail;
        let target = find_target_index_by_mouse_position(last_area, per_item_areas, mouse.column, mouse.row);

        match mouse.kind {
            MouseEventKind::Moved => {
                app.nav_rail.hovered_index = target;
                Vec::new()
            }
            MouseEventKind::Down(MouseButton::Left) => {
                let Some(index) = target else {
                    return Vec::new();
                };
                if let Some(flag) = app.nav_rail.item_focus_flags.get(index) {
                    app.focus.focus(flag);
                }
                Self::navigate_effect(app, index)
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let pathname = app.router.pathname().to_string();
        let buttons = app.nav_rail.buttons(&pathname);
        let any_focused = app.nav_rail.focused_index().is_some();

        let theme = &*app.ctx.theme;
        frame.render_widget(th::block(theme, None, any_focused), area);

        let item_areas = self.get_preferred_layout(app, area);
        for (index, button) in buttons.iter().enumerate() {
            let Some(item_area) = item_areas.get(index).copied() else {
                continue;
            };
            let focused = app.nav_rail.item_focus_flags.get(index).is_some_and(|flag| flag.get());
            let options = if button.is_selected() {
                ButtonRenderOptions::new(true, false, true, Borders::NONE, ButtonType::Emphasized)
            } else {
                let borders = if focused { Borders::ALL } else { Borders::NONE };
                ButtonRenderOptions::new(true, focused, false, borders, ButtonType::Secondary)
            };
            render_button(frame, item_area, &button.glyph, theme, options);
        }
        app.nav_rail.last_area = area;
        app.nav_rail.per_item_areas = item_areas;

        if let Some(index) = app.nav_rail.tooltip_index()
            && let Some(button) = buttons.get(index)
            && !button.is_selected()
        {
            Self::render_tooltip(frame, app, index, &button.label);
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" ↑/↓", " Navigate"), (" Enter", " Open")])
    }

    fn get_preferred_layout(&self, app: &App, area: Rect) -> Vec<Rect> {
        let count = app.nav_rail.items().len();
        let constraints = vec![Constraint::Length(3); count];
        Layout::vertical(constraints).margin(1).split(area).to_vec()
    }
}
