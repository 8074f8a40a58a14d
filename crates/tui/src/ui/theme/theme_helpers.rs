use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders, Padding, Paragraph},
};

use super::roles::{Theme, ThemeRoles};

/// Build a standard Block with theme surfaces and borders.
pub fn block<'a, T: Theme + ?Sized>(theme: &'a T, title: Option<&'a str>, focused: bool) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(theme.border_style(focused))
        .style(panel_style(theme));
    if let Some(t) = title {
        block = block.title(Span::styled(t, theme.text_secondary_style().add_modifier(Modifier::BOLD)));
    }
    block
}

/// Style for panel-like containers (set background on widget using `.style`).
pub fn panel_style<T: Theme + ?Sized>(theme: &T) -> Style {
    let ThemeRoles { surface, text, .. } = *theme.roles();
    Style::default().bg(surface).fg(text)
}

/// Style for input values; invalid input switches to the error color.
pub fn input_style<T: Theme + ?Sized>(theme: &T, valid: bool, focused: bool) -> Style {
    let ThemeRoles { surface, text, error, .. } = *theme.roles();
    let mut style = Style::default().bg(surface).fg(if valid { text } else { error });
    if focused {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

/// Primary button style (filled accent background).
pub fn button_primary_style<T: Theme + ?Sized>(theme: &T, enabled: bool) -> Style {
    let ThemeRoles {
        accent_primary,
        background,
        surface_muted,
        text_muted,
        ..
    } = *theme.roles();
    if enabled {
        Style::default().bg(accent_primary).fg(background).add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(surface_muted).fg(text_muted)
    }
}

/// Secondary button style (outline-like, rely on border color in Block).
pub fn button_secondary_style<T: Theme + ?Sized>(theme: &T, enabled: bool, selected: bool) -> Style {
    if !enabled {
        return theme.text_muted_style();
    }
    let ThemeRoles {
        accent_secondary,
        selection_bg,
        ..
    } = *theme.roles();
    let style = Style::default().fg(accent_secondary);
    if selected { style.bg(selection_bg) } else { style }
}

/// Visual weight of a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonType {
    Primary,
    Secondary,
    /// Marks the current location; rendered filled and never focus-styled.
    Emphasized,
}

#[derive(Debug, Clone, Copy)]
pub struct ButtonRenderOptions {
    pub enabled: bool,
    pub focused: bool,
    pub selected: bool,
    pub borders: Borders,
    pub button_type: ButtonType,
}

impl ButtonRenderOptions {
    pub fn new(enabled: bool, focused: bool, selected: bool, borders: Borders, button_type: ButtonType) -> Self {
        Self {
            enabled,
            focused,
            selected,
            borders,
            button_type,
        }
    }
}

/// Renders a standard button
pub fn render_button<T: Theme + ?Sized>(frame: &mut Frame, area: Rect, label: &str, theme: &T, options: ButtonRenderOptions) {
    let ButtonRenderOptions {
        enabled,
        focused,
        selected,
        borders,
        button_type,
    } = options;

    let border_style = if enabled {
        theme.border_style(focused)
    } else {
        theme.text_muted_style()
    };

    let button_style = match button_type {
        ButtonType::Primary => button_primary_style(theme, enabled),
        ButtonType::Secondary => button_secondary_style(theme, enabled, selected),
        ButtonType::Emphasized => theme.selection_style().add_modifier(Modifier::BOLD),
    };

    // Borderless buttons get padding so they occupy the same rows as bordered ones
    let padding = if borders.is_empty() {
        Padding::uniform(1)
    } else {
        Padding::uniform(0)
    };

    frame.render_widget(
        Paragraph::new(label)
            .centered()
            .block(Block::bordered().borders(borders).border_style(border_style).padding(padding))
            .style(button_style),
        area,
    );
}

/// Builds `key description` hint spans with the key emphasized.
pub fn build_hint_spans<T: Theme + ?Sized>(theme: &T, hints: &[(&str, &str)]) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, description) in hints {
        spans.push(Span::styled(key.to_string(), theme.accent_emphasis_style()));
        spans.push(Span::styled(description.to_string(), theme.text_muted_style()));
    }
    spans
}
