use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::app::App;
use crate::ui::{components::component::Component, theme::theme_helpers as th};

/// Static page for routes that only need to show where the user is.
#[derive(Debug)]
pub struct PlaceholderPage {
    title: &'static str,
    body: &'static str,
}

impl PlaceholderPage {
    pub fn pipelines() -> Self {
        Self {
            title: "Pipelines",
            body: "Pipelines of the active workspace appear here.",
        }
    }

    pub fn pipeline_runs() -> Self {
        Self {
            title: "Pipeline runs",
            body: "Recent pipeline runs appear here.",
        }
    }

    pub fn not_found() -> Self {
        Self {
            title: "Not found",
            body: "Nothing lives at this path. Pick a destination from the rail.",
        }
    }
}

impl Component for PlaceholderPage {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let lines = vec![
            Line::from(Span::styled(app.router.pathname().to_string(), theme.text_muted_style())),
            Line::default(),
            Line::from(Span::styled(self.body, theme.text_primary_style())),
        ];
        let paragraph = Paragraph::new(lines)
            .block(th::block(theme, Some(self.title), false))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, rect);
    }
}
