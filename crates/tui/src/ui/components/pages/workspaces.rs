use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
};
use serde_json::Value;
use workbench_types::{ClusterType, Effect, Modal};

use crate::app::App;
use crate::ui::{components::component::Component, theme::theme_helpers as th};

/// A workspace the server confirmed during this session.
#[derive(Debug, Clone)]
pub struct CreatedWorkspace {
    pub name: String,
    pub cluster_type: ClusterType,
    pub created_at: DateTime<Local>,
    /// Resource echoed by the server, if any.
    pub resource: Value,
}

#[derive(Debug)]
pub struct WorkspacesState {
    pub created: Vec<CreatedWorkspace>,
    pub focus: FocusFlag,
    pub last_area: Rect,
}

impl Default for WorkspacesState {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            focus: FocusFlag::named("page.workspaces"),
            last_area: Rect::default(),
        }
    }
}

impl WorkspacesState {
    pub fn record(&mut self, name: impl Into<String>, cluster_type: ClusterType, resource: Value) {
        self.created.push(CreatedWorkspace {
            name: name.into(),
            cluster_type,
            created_at: Local::now(),
            resource,
        });
    }
}

impl HasFocus for WorkspacesState {
    fn build(&self, builder: &mut FocusBuilder) {
        builder.leaf_widget(self);
    }

    fn focus(&self) -> FocusFlag {
        self.focus.clone()
    }

    fn area(&self) -> Rect {
        self.last_area
    }
}

/// Workspace management page: lists created workspaces and opens the form.
#[derive(Debug, Default)]
pub struct WorkspacesPage;

impl Component for WorkspacesPage {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('n') | KeyCode::Enter => vec![Effect::ShowModal(Modal::CreateWorkspace)],
            KeyCode::Tab => {
                app.focus.next();
                Vec::new()
            }
            KeyCode::BackTab => {
                app.focus.prev();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let focused = app.workspaces.focus.get();
        let title = format!("Workspaces ({})", app.workspaces.created.len());
        let block = th::block(theme, Some(title.as_str()), focused);

        if app.workspaces.created.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from(Span::styled("No workspaces created yet.", theme.text_secondary_style())),
                Line::from(vec![
                    Span::styled("Press ", theme.text_muted_style()),
                    Span::styled("n", theme.accent_emphasis_style()),
                    Span::styled(" to create one.", theme.text_muted_style()),
                ]),
            ])
            .block(block);
            frame.render_widget(empty, rect);
        } else {
            let header = Row::new(["Name", "Cluster", "Created"])
                .style(theme.text_secondary_style().add_modifier(Modifier::BOLD));
            let rows = app.workspaces.created.iter().map(|workspace| {
                Row::new([
                    Cell::from(workspace.name.clone()),
                    Cell::from(workspace.cluster_type.to_string()),
                    Cell::from(workspace.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
                ])
                .style(theme.text_primary_style())
            });
            let table = Table::new(
                rows,
                [Constraint::Percentage(45), Constraint::Length(12), Constraint::Min(19)],
            )
            .header(header)
            .block(block);
            frame.render_widget(table, rect);
        }
        app.workspaces.last_area = rect;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" n", " New workspace")])
    }
}
