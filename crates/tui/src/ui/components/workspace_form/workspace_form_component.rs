use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use rat_focus::FocusBuilder;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Borders, Clear, Paragraph, Wrap},
};
use workbench_types::{Effect, FieldDescriptor, GENERAL_K8S_FIELDS, VOLUME_CLAIM_K8S_FIELDS, WORKSPACE_FIELDS};

use super::state::{FormControl, LOADING_MESSAGE, SUBMISSION_FAILED_MESSAGE, WorkspaceFormState};
use crate::app::App;
use crate::ui::{
    components::{component::Component, logs::LogLevel},
    theme::{
        Theme,
        theme_helpers::{self as th, ButtonRenderOptions, ButtonType, render_button},
    },
};

const MARKER_WIDTH: u16 = 2;
const LABEL_WIDTH: usize = 26;
const EDITOR_GUTTER: &str = "  │ ";
const EDITOR_MIN_LINES: usize = 3;
const THROBBER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Rendered body lines plus where each control landed.
#[derive(Default)]
struct FormBody {
    lines: Vec<Line<'static>>,
    anchors: Vec<(FormControl, usize)>,
    /// Line and column of the text cursor for the focused input.
    cursor: Option<(usize, u16)>,
}

impl FormBody {
    fn push(&mut self, line: Line<'static>) -> usize {
        self.lines.push(line);
        self.lines.len() - 1
    }

    fn anchor(&mut self, control: FormControl, line: Line<'static>) -> usize {
        let index = self.push(line);
        self.anchors.push((control, index));
        index
    }

    fn blank(&mut self) {
        self.push(Line::default());
    }
}

/// Modal form collecting workspace settings and submitting them.
#[derive(Debug, Default)]
pub struct WorkspaceFormComponent;

impl WorkspaceFormComponent {
    pub fn new() -> Self {
        Self
    }

    fn submit(app: &mut App) -> Vec<Effect> {
        let Some(form) = app.workspace_form.as_mut() else {
            return Vec::new();
        };
        match form.submit() {
            Some(request) => {
                app.logs
                    .push(LogLevel::Info, format!("Creating workspace '{}'", request.name()));
                vec![Effect::CreateWorkspace {
                    form: form.id(),
                    request: Box::new(request),
                }]
            }
            None => {
                if let Some(error) = form.error() {
                    app.logs.push(LogLevel::Warn, error.to_string());
                }
                Vec::new()
            }
        }
    }

    /// Activation shared by Enter, Space and clicks on non-text controls.
    fn activate(app: &mut App, control: FormControl) -> Vec<Effect> {
        match control {
            FormControl::CreateButton => return Self::submit(app),
            FormControl::CancelButton => return vec![Effect::CloseModal],
            FormControl::AccessMode => {
                if let Some(form) = app.workspace_form.as_mut() {
                    form.cycle_access_mode(true);
                }
            }
            _ => {
                if let Some(form) = app.workspace_form.as_mut() {
                    form.toggle(control);
                }
                // Toggles change the set of visible controls.
                let old = std::mem::take(&mut app.focus);
                app.focus = FocusBuilder::rebuild_for(app, Some(old));
            }
        }
        Vec::new()
    }

    fn marker(theme: &dyn Theme, focused: bool) -> Span<'static> {
        if focused {
            Span::styled("› ", theme.accent_emphasis_style())
        } else {
            Span::raw("  ")
        }
    }

    fn label_span(theme: &dyn Theme, label: &str, required: bool, focused: bool) -> Span<'static> {
        let text = if required { format!("{label}*") } else { label.to_string() };
        let style = if focused {
            theme.text_primary_style().add_modifier(Modifier::BOLD)
        } else {
            theme.text_secondary_style()
        };
        Span::styled(format!("{text:<LABEL_WIDTH$}"), style)
    }

    fn push_text_row(
        body: &mut FormBody,
        theme: &dyn Theme,
        control: FormControl,
        descriptor: TextRow<'_>,
        focused: Option<FormControl>,
    ) {
        let is_focused = focused == Some(control);
        let value_span = if descriptor.value.is_empty() {
            Span::styled(descriptor.placeholder.unwrap_or_default().to_string(), theme.text_muted_style())
        } else {
            Span::styled(descriptor.value.to_string(), th::input_style(theme, true, is_focused))
        };
        let line = Line::from(vec![
            Self::marker(theme, is_focused),
            Self::label_span(theme, descriptor.label, descriptor.required, is_focused),
            value_span,
        ]);
        let index = body.anchor(control, line);
        if is_focused {
            body.cursor = Some((index, MARKER_WIDTH + LABEL_WIDTH as u16 + descriptor.cursor_columns));
        }
        if let Some(description) = descriptor.description {
            body.push(Line::from(Span::styled(format!("    {description}"), theme.text_muted_style())));
        }
    }

    fn push_field(body: &mut FormBody, form: &WorkspaceFormState, theme: &dyn Theme, descriptor: &FieldDescriptor, focused: Option<FormControl>) {
        let input = form.input(descriptor.uuid);
        let row = TextRow {
            label: descriptor.label,
            required: descriptor.required,
            value: input.map(|input| input.input()).unwrap_or_default(),
            cursor_columns: input.map(|input| input.cursor_columns()).unwrap_or_default(),
            placeholder: descriptor.placeholder,
            description: descriptor.description,
        };
        Self::push_text_row(body, theme, FormControl::Field(descriptor.uuid), row, focused);
    }

    fn push_section(body: &mut FormBody, theme: &dyn Theme, control: FormControl, title: &str, expanded: bool, focused: Option<FormControl>) {
        let is_focused = focused == Some(control);
        let chevron = if expanded { "▾ " } else { "▸ " };
        let line = Line::from(vec![
            Self::marker(theme, is_focused),
            Span::styled(format!("{chevron}{title}"), theme.accent_emphasis_style()),
        ]);
        body.anchor(control, line);
    }

    fn push_toggle(body: &mut FormBody, theme: &dyn Theme, control: FormControl, label: &str, on: bool, focused: Option<FormControl>) {
        let is_focused = focused == Some(control);
        let (check, style) = if on {
            ("[x] ", theme.status_success())
        } else {
            ("[ ] ", theme.text_muted_style())
        };
        let line = Line::from(vec![
            Self::marker(theme, is_focused),
            Span::styled(check, style),
            Span::styled(label.to_string(), theme.text_primary_style()),
        ]);
        body.anchor(control, line);
    }

    fn push_heading(body: &mut FormBody, theme: &dyn Theme, title: &str) {
        body.push(Line::from(Span::styled(
            format!("    {title}"),
            theme.text_secondary_style().add_modifier(Modifier::UNDERLINED),
        )));
    }

    fn push_editor(body: &mut FormBody, form: &WorkspaceFormState, theme: &dyn Theme, focused: Option<FormControl>) {
        let is_focused = focused == Some(FormControl::ContainerEditor);
        let header = Line::from(vec![
            Self::marker(theme, is_focused),
            Span::styled("Container config (YAML)", theme.text_secondary_style()),
        ]);
        let header_index = body.anchor(FormControl::ContainerEditor, header);

        let gutter_style = theme.border_style(is_focused);
        let editor = form.container_editor();
        let mut lines: Vec<&str> = editor.text().split('\n').collect();
        while lines.len() < EDITOR_MIN_LINES {
            lines.push("");
        }
        for text in lines {
            body.push(Line::from(vec![
                Span::styled(EDITOR_GUTTER, gutter_style),
                Span::styled(text.to_string(), theme.text_primary_style()),
            ]));
        }

        if is_focused {
            let (line, column) = editor.cursor_line_and_column();
            body.cursor = Some((header_index + 1 + line, EDITOR_GUTTER.chars().count() as u16 + column));
        }
    }

    fn build_body(form: &WorkspaceFormState, theme: &dyn Theme) -> FormBody {
        let focused = form.focused_control();
        let mut body = FormBody::default();

        for descriptor in WORKSPACE_FIELDS {
            Self::push_field(&mut body, form, theme, descriptor, focused);
        }

        if form.cluster_type().supports_kubernetes_settings() {
            body.blank();
            Self::push_section(&mut body, theme, FormControl::KubernetesSection, "Kubernetes", form.kubernetes_expanded(), focused);
            if form.kubernetes_expanded() {
                Self::push_heading(&mut body, theme, "General settings");
                for descriptor in GENERAL_K8S_FIELDS.iter().filter(|descriptor| !descriptor.disabled) {
                    Self::push_field(&mut body, form, theme, descriptor, focused);
                }
                Self::push_heading(&mut body, theme, "Volume claim parameters");
                for descriptor in VOLUME_CLAIM_K8S_FIELDS.iter().filter(|descriptor| !descriptor.disabled) {
                    Self::push_field(&mut body, form, theme, descriptor, focused);
                }

                let is_focused = focused == Some(FormControl::AccessMode);
                let value = match form.config().storage_access_mode {
                    Some(mode) => Span::styled(format!("‹ {} ›", mode.as_str()), th::input_style(theme, true, is_focused)),
                    None => Span::styled("‹ select ›", theme.text_muted_style()),
                };
                let line = Line::from(vec![
                    Self::marker(theme, is_focused),
                    Self::label_span(theme, "Storage access mode", false, is_focused),
                    value,
                ]);
                body.anchor(FormControl::AccessMode, line);

                body.blank();
                Self::push_toggle(
                    &mut body,
                    theme,
                    FormControl::ConfigureContainer,
                    "Configure container",
                    form.configure_container(),
                    focused,
                );
                if form.configure_container() {
                    Self::push_editor(&mut body, form, theme, focused);
                }
            }
        }

        body.blank();
        Self::push_section(&mut body, theme, FormControl::LifecycleSection, "Lifecycle (optional)", form.lifecycle_expanded(), focused);
        if form.lifecycle_expanded() {
            Self::push_toggle(
                &mut body,
                theme,
                FormControl::AutoTermination,
                "Enable auto termination",
                form.lifecycle().auto_termination_enabled(),
                focused,
            );
            let input = form.max_idle_input();
            let row = TextRow {
                label: "Max idle seconds",
                required: false,
                value: input.input(),
                cursor_columns: input.cursor_columns(),
                placeholder: Some("3600"),
                description: Some("Terminate the workspace after this many idle seconds"),
            };
            Self::push_text_row(&mut body, theme, FormControl::MaxIdleSeconds, row, focused);
        }
        body
    }

    fn status_lines(form: &WorkspaceFormState, theme: &dyn Theme, throbber_idx: usize) -> Vec<Line<'static>> {
        if form.is_loading() {
            let frame = THROBBER_FRAMES[throbber_idx % THROBBER_FRAMES.len()];
            return vec![Line::from(vec![
                Span::styled(format!("{frame} "), theme.accent_primary_style()),
                Span::styled(LOADING_MESSAGE, theme.status_info()),
            ])];
        }
        match form.error() {
            Some(error) => vec![
                Line::from(Span::styled(SUBMISSION_FAILED_MESSAGE, theme.status_warning())),
                Line::from(Span::styled(error.to_string(), theme.status_error().add_modifier(Modifier::BOLD))),
            ],
            None => Vec::new(),
        }
    }

    /// Keep `line` inside the visible window of `height` rows.
    fn scroll_to(offset: u16, line: usize, height: u16) -> u16 {
        let line = u16::try_from(line).unwrap_or(u16::MAX);
        if line < offset {
            line
        } else if height > 0 && line >= offset.saturating_add(height) {
            line.saturating_sub(height - 1)
        } else {
            offset
        }
    }
}

/// Inputs for one labelled single-line text row.
struct TextRow<'a> {
    label: &'a str,
    required: bool,
    value: &'a str,
    cursor_columns: u16,
    placeholder: Option<&'a str>,
    description: Option<&'a str>,
}

impl Component for WorkspaceFormComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Esc {
            return vec![Effect::CloseModal];
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return Self::submit(app);
        }

        let Some(form) = app.workspace_form.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Tab => {
                app.focus.next();
                return Vec::new();
            }
            KeyCode::BackTab => {
                app.focus.prev();
                return Vec::new();
            }
            _ => {}
        }

        let Some(control) = form.focused_control() else {
            app.focus.first();
            return Vec::new();
        };
        if form.is_loading() && control != FormControl::CancelButton {
            return Vec::new();
        }

        match key.code {
            KeyCode::Enter => match control {
                FormControl::ContainerEditor => form.insert_newline(),
                FormControl::Field(_) | FormControl::MaxIdleSeconds => {
                    app.focus.next();
                }
                _ => return Self::activate(app, control),
            },
            KeyCode::Char(' ') if !control.is_text_input() => return Self::activate(app, control),
            KeyCode::Char(character) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                form.insert_char(control, character);
            }
            KeyCode::Backspace => form.backspace(control),
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                if control == FormControl::AccessMode {
                    form.cycle_access_mode(forward);
                } else {
                    form.move_cursor(control, forward);
                }
            }
            KeyCode::Up | KeyCode::Down => {
                let down = key.code == KeyCode::Down;
                let moved = control == FormControl::ContainerEditor && form.move_editor_line(down);
                if !moved {
                    if down {
                        app.focus.next();
                    } else {
                        app.focus.prev();
                    }
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Vec::new();
        }
        let Some(form) = app.workspace_form.as_ref() else {
            return Vec::new();
        };
        let position = Position::new(mouse.column, mouse.row);
        let Some(control) = form
            .hit_areas
            .iter()
            .find(|(_, area)| area.contains(position))
            .map(|(control, _)| *control)
        else {
            return Vec::new();
        };
        if let Some(flag) = form.flag(control) {
            app.focus.focus(flag);
        }
        if control.is_text_input() || (form.is_loading() && control != FormControl::CancelButton) {
            return Vec::new();
        }
        Self::activate(app, control)
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let throbber_idx = app.throbber_idx;
        let theme = &*app.ctx.theme;
        let Some(form) = app.workspace_form.as_mut() else {
            return;
        };

        let title = format!("Create workspace ({})", form.cluster_type());
        let block = th::block(theme, Some(title.as_str()), true);
        let inner = block.inner(rect);
        frame.render_widget(Clear, rect);
        frame.render_widget(block, rect);

        let status = Self::status_lines(form, theme, throbber_idx);
        let status_height = if status.is_empty() { 0 } else { 3 };
        let [body_area, status_area, buttons_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(status_height),
            Constraint::Length(3),
        ])
        .areas(inner);

        let body = Self::build_body(form, theme);
        let focus_line = body.cursor.map(|(line, _)| line).or_else(|| {
            let focused = form.focused_control()?;
            body.anchors.iter().find(|(control, _)| *control == focused).map(|(_, line)| *line)
        });
        if let Some(line) = focus_line {
            form.scroll_offset = Self::scroll_to(form.scroll_offset, line, body_area.height);
        }
        let offset = form.scroll_offset;
        frame.render_widget(Paragraph::new(body.lines).scroll((offset, 0)), body_area);

        let mut hit_areas = Vec::with_capacity(body.anchors.len() + 2);
        for (control, line) in &body.anchors {
            let Some(row) = u16::try_from(*line).ok().and_then(|line| line.checked_sub(offset)) else {
                continue;
            };
            if row < body_area.height {
                hit_areas.push((*control, Rect::new(body_area.x, body_area.y + row, body_area.width, 1)));
            }
        }

        if !status.is_empty() {
            frame.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), status_area);
        }

        let [_, cancel_area, _, create_area] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(12),
            Constraint::Length(1),
            Constraint::Length(12),
        ])
        .areas(buttons_area);
        let focused = form.focused_control();
        let cancel_focused = focused == Some(FormControl::CancelButton);
        let create_focused = focused == Some(FormControl::CreateButton);
        let create_enabled = !form.is_loading();
        render_button(
            frame,
            cancel_area,
            "Cancel",
            theme,
            ButtonRenderOptions::new(true, cancel_focused, false, Borders::ALL, ButtonType::Secondary),
        );
        render_button(
            frame,
            create_area,
            "Create",
            theme,
            ButtonRenderOptions::new(create_enabled, create_focused, false, Borders::ALL, ButtonType::Primary),
        );
        hit_areas.push((FormControl::CancelButton, cancel_area));
        hit_areas.push((FormControl::CreateButton, create_area));

        if let Some((line, column)) = body.cursor
            && let Some(row) = u16::try_from(line).ok().and_then(|line| line.checked_sub(offset))
            && row < body_area.height
        {
            let x = body_area.x.saturating_add(column).min(body_area.right().saturating_sub(1));
            frame.set_cursor_position((x, body_area.y + row));
        }

        form.hit_areas = hit_areas;
        form.last_area = rect;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[
                (" Tab", " Next field"),
                (" Space", " Toggle"),
                (" Ctrl+S", " Create"),
                (" Esc", " Cancel"),
            ],
        )
    }
}
