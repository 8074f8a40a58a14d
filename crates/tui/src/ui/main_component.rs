use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use rat_focus::FocusBuilder;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
};
use tracing::debug;
use workbench_types::{Effect, Modal, Msg};

use super::components::{
    Component, LogsComponent, NavigationRailComponent, WorkspaceFormComponent,
    pages::{PageRoute, PlaceholderPage, WorkspacesPage},
    workspace_form::FormControl,
};
use super::theme::theme_helpers as th;
use super::utils::centered_rect;
use crate::app::App;
use workbench_types::WorkspaceField;

/// Width of the navigation rail column.
const RAIL_WIDTH: u16 = 9;

pub struct ModalLayout(Box<dyn Fn(Rect) -> Rect>);

impl std::fmt::Debug for ModalLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ModalLayout")
    }
}

type ModalView = (Box<dyn Component>, ModalLayout);

/// Root component: rail on the left, the routed page, optional logs, a hint
/// bar and at most one modal on top.
pub struct MainView {
    content_view: Option<Box<dyn Component>>,
    content_route: Option<PageRoute>,
    nav_rail_view: NavigationRailComponent,
    modal_view: Option<ModalView>,
    logs_view: LogsComponent,

    /// Widget focused before the modal opened.
    transient_focus_id: Option<usize>,
}

impl MainView {
    pub fn new() -> Self {
        Self {
            content_view: None,
            content_route: None,
            nav_rail_view: NavigationRailComponent::new(),
            modal_view: None,
            logs_view: LogsComponent,
            transient_focus_id: None,
        }
    }

    /// Swap the content view when the router points at a different page.
    pub fn sync_route(&mut self, app: &mut App) {
        let route = app.router.route();
        if self.content_route == Some(route) {
            return;
        }
        let view: Box<dyn Component> = match route {
            PageRoute::Pipelines => Box::new(PlaceholderPage::pipelines()),
            PageRoute::PipelineRuns => Box::new(PlaceholderPage::pipeline_runs()),
            PageRoute::Workspaces => Box::new(WorkspacesPage),
            PageRoute::NotFound => Box::new(PlaceholderPage::not_found()),
        };
        debug!(?route, "content view changed");
        self.content_view = Some(view);
        self.content_route = Some(route);
        app.focus = FocusBuilder::build_for(app);
    }

    pub fn set_open_modal_kind(&mut self, app: &mut App, modal: Option<Modal>) {
        match modal {
            Some(Modal::CreateWorkspace) => {
                if self.modal_view.is_none() {
                    self.transient_focus_id = app.focus.focused().map(|focus| focus.widget_id());
                }
                app.open_workspace_form();
                self.modal_view = Some((
                    Box::new(WorkspaceFormComponent::new()),
                    ModalLayout(Box::new(|rect| centered_rect(70, 85, rect))),
                ));
                app.focus = FocusBuilder::build_for(app);
                if let Some(flag) = app
                    .workspace_form
                    .as_ref()
                    .and_then(|form| form.flag(FormControl::Field(WorkspaceField::Name)))
                {
                    app.focus.focus(flag);
                }
            }
            None => {
                app.close_workspace_form();
                self.modal_view = None;
                app.focus = FocusBuilder::build_for(app);
                self.restore_focus(app);
            }
        }
    }

    pub fn restore_focus(&mut self, app: &mut App) {
        if let Some(id) = self.transient_focus_id.take()
            && self.modal_view.is_none()
        {
            app.focus.by_widget_id(id);
        } else {
            app.focus.first();
        }
    }

    /// Carry out the effects that change views; everything else is returned.
    pub fn apply_view_effects(&mut self, app: &mut App, effects: Vec<Effect>) -> Vec<Effect> {
        let mut remaining = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                Effect::Navigate(target) => {
                    app.navigate(&target);
                    self.sync_route(app);
                }
                Effect::ShowModal(modal) => self.set_open_modal_kind(app, Some(modal)),
                Effect::CloseModal => self.set_open_modal_kind(app, None),
                Effect::CycleTheme => app.cycle_theme(),
                other => remaining.push(other),
            }
        }
        remaining
    }
}

impl Default for MainView {
    fn default() -> Self {
        Self::new()
    }
}

fn render_overlay(frame: &mut Frame, app: &App) {
    let overlay = Block::default().style(app.ctx.theme.modal_background_style());
    frame.render_widget(overlay, frame.area());
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        let mut effects = app.update(msg);
        if let Some((modal, _)) = self.modal_view.as_mut() {
            effects.extend(modal.handle_message(app, msg));
        } else if let Some(content) = self.content_view.as_mut() {
            effects.extend(content.handle_message(app, msg));
        }
        effects
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if let Some((modal, _)) = self.modal_view.as_mut() {
            return modal.handle_key_events(app, key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('l') => {
                    app.logs.is_visible = !app.logs.is_visible;
                    app.focus = FocusBuilder::build_for(app);
                    if app.logs.is_visible {
                        app.focus.focus(&app.logs);
                    } else {
                        app.focus.first();
                    }
                    return Vec::new();
                }
                KeyCode::Char('t') => return vec![Effect::CycleTheme],
                KeyCode::Char('n') => return vec![Effect::ShowModal(Modal::CreateWorkspace)],
                _ => {}
            }
        }

        if app.focus.focused().is_none() {
            self.restore_focus(app);
        }

        if app.nav_rail.container_focus.get() {
            return self.nav_rail_view.handle_key_events(app, key);
        }

        if app.logs.is_visible && app.logs.focus.get() {
            return self.logs_view.handle_key_events(app, key);
        }

        if let Some(content) = self.content_view.as_mut() {
            return content.handle_key_events(app, key);
        }

        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if let Some((modal, _)) = self.modal_view.as_mut() {
            return modal.handle_mouse_events(app, mouse);
        }

        let mut effects = self.nav_rail_view.handle_mouse_events(app, mouse);
        if let Some(content) = self.content_view.as_mut() {
            effects.extend(content.handle_mouse_events(app, mouse));
        }
        if app.logs.is_visible {
            effects.extend(self.logs_view.handle_mouse_events(app, mouse));
        }
        effects
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let background = Paragraph::new("").style(Style::default().bg(app.ctx.theme.roles().background));
        frame.render_widget(background, area);

        let layout = self.get_preferred_layout(app, area);
        if let Some(content) = self.content_view.as_mut() {
            content.render(frame, layout[2], app);
        }
        if app.logs.is_visible {
            self.logs_view.render(frame, layout[3], app);
        }

        let hints = Paragraph::new(Line::from(self.get_hint_spans(app))).style(app.ctx.theme.text_muted_style());
        frame.render_widget(hints, layout[1]);

        // Drawn after the page so its tooltip overlaps the content.
        self.nav_rail_view.render(frame, layout[0], app);

        if let Some((modal, position)) = self.modal_view.as_mut() {
            render_overlay(frame, app);
            let modal_area = position.0(area);
            frame.render_widget(Clear, modal_area);

            let modal_hints = modal.get_hint_spans(app);
            if modal_hints.is_empty() {
                modal.render(frame, modal_area, app);
            } else {
                let [body, hint_row] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(modal_area);
                let hints = Paragraph::new(Line::from(modal_hints))
                    .style(app.ctx.theme.text_muted_style().bg(app.ctx.theme.roles().background));
                frame.render_widget(hints, hint_row);
                modal.render(frame, body, app);
            }
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        let theme = &*app.ctx.theme;
        let mut spans = vec![Span::styled("Hints: ", theme.text_muted_style())];

        if app.nav_rail.container_focus.get() {
            spans.extend(self.nav_rail_view.get_hint_spans(app));
        } else if app.logs.is_visible && app.logs.focus.get() {
            spans.extend(self.logs_view.get_hint_spans(app));
        } else if let Some(content) = self.content_view.as_ref() {
            spans.extend(content.get_hint_spans(app));
        }

        spans.extend(th::build_hint_spans(
            theme,
            &[
                (" Ctrl+N", " New workspace "),
                (" Ctrl+L", " Logs "),
                (" Ctrl+T", " Theme "),
                (" Ctrl+C", " Quit"),
            ],
        ));
        spans
    }

    /// `[rail, hints, content, logs]`
    fn get_preferred_layout(&self, app: &App, area: Rect) -> Vec<Rect> {
        let [rail, wrapper] = Layout::horizontal([Constraint::Length(RAIL_WIDTH), Constraint::Min(1)]).areas(area);
        let [main, hints] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(wrapper);
        let [content, logs] = if app.logs.is_visible {
            Layout::horizontal([Constraint::Percentage(65), Constraint::Fill(1)]).areas(main)
        } else {
            Layout::horizontal([Constraint::Percentage(100), Constraint::Length(0)]).areas(main)
        };
        vec![rail, hints, content, logs]
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyEventKind;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;
    use workbench_api::CreateWorkspaceResponse;
    use workbench_types::{ClusterType, ExecOutcome, FormId};

    use super::*;
    use crate::app::test_support::{FakeWorkspaceService, app_with};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn ctrl(character: char) -> KeyEvent {
        KeyEvent::new_with_kind(KeyCode::Char(character), KeyModifiers::CONTROL, KeyEventKind::Press)
    }

    fn draw(app: &mut App, view: &mut MainView) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).expect("terminal");
        terminal
            .draw(|frame| view.render(frame, frame.area(), app))
            .expect("draw");
        terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect()
    }

    /// Feed keys and apply view effects; returns the effects left for the command layer.
    fn press(app: &mut App, view: &mut MainView, keys: impl IntoIterator<Item = KeyEvent>) -> Vec<Effect> {
        let mut leftover = Vec::new();
        for event in keys {
            let effects = view.handle_key_events(app, event);
            leftover.extend(view.apply_view_effects(app, effects));
        }
        leftover
    }

    fn type_text(text: &str) -> Vec<KeyEvent> {
        text.chars().map(|character| key(KeyCode::Char(character))).collect()
    }

    fn submitted_form(effects: Vec<Effect>) -> FormId {
        match effects.as_slice() {
            [Effect::CreateWorkspace { form, .. }] => *form,
            other => panic!("expected one creation effect, got {other:?}"),
        }
    }

    fn setup(cluster_type: ClusterType) -> (App, MainView) {
        let api = FakeWorkspaceService::answering(CreateWorkspaceResponse::Created { workspace: json!({}) });
        let mut app = app_with(api, cluster_type);
        let mut view = MainView::new();
        view.sync_route(&mut app);
        (app, view)
    }

    #[test]
    fn ctrl_n_opens_the_form_with_name_focused() {
        let (mut app, mut view) = setup(ClusterType::K8s);
        press(&mut app, &mut view, [ctrl('n')]);
        assert!(view.modal_view.is_some());
        let form = app.workspace_form.as_ref().expect("form");
        assert_eq!(form.focused_control(), Some(FormControl::Field(WorkspaceField::Name)));

        let screen = draw(&mut app, &mut view);
        assert!(screen.contains("Workspace name"), "{screen}");
        assert!(screen.contains("Kubernetes"), "{screen}");
    }

    #[test]
    fn empty_name_submission_shows_validation_and_sends_nothing() {
        let (mut app, mut view) = setup(ClusterType::K8s);
        press(&mut app, &mut view, [ctrl('n')]);
        let leftover = press(&mut app, &mut view, [ctrl('s')]);
        assert!(leftover.is_empty());

        let screen = draw(&mut app, &mut view);
        assert!(screen.contains("Failed to create instance, see error below."), "{screen}");
        assert!(screen.contains("Please enter a valid name!"), "{screen}");
    }

    #[test]
    fn typed_name_is_sanitized_for_ecs_on_submit() {
        let (mut app, mut view) = setup(ClusterType::Ecs);
        press(&mut app, &mut view, [ctrl('n')]);
        press(&mut app, &mut view, type_text("My Workspace"));
        let leftover = press(&mut app, &mut view, [ctrl('s')]);

        let [Effect::CreateWorkspace { form, request }] = leftover.as_slice() else {
            panic!("expected one creation effect, got {leftover:?}");
        };
        assert_eq!(Some(*form), app.workspace_form.as_ref().map(|open| open.id()));
        assert_eq!(request.name(), "My_Workspace");
        assert_eq!(request.workspace.cluster_type, ClusterType::Ecs);

        let screen = draw(&mut app, &mut view);
        assert!(screen.contains("This may take up to a few minutes..."), "{screen}");
        // A second submit while loading is ignored.
        assert!(press(&mut app, &mut view, [ctrl('s')]).is_empty());
    }

    #[test]
    fn escape_closes_the_form_and_drops_its_state() {
        let (mut app, mut view) = setup(ClusterType::K8s);
        press(&mut app, &mut view, [ctrl('n')]);
        press(&mut app, &mut view, type_text("draft"));
        press(&mut app, &mut view, [key(KeyCode::Esc)]);
        assert!(view.modal_view.is_none());
        assert!(app.workspace_form.is_none());

        press(&mut app, &mut view, [ctrl('n')]);
        assert!(app.workspace_form.as_ref().expect("form").config().name.is_none());
    }

    #[test]
    fn rejection_message_is_rendered_and_nothing_is_recorded() {
        let (mut app, mut view) = setup(ClusterType::K8s);
        press(&mut app, &mut view, [ctrl('n')]);
        press(&mut app, &mut view, type_text("ws"));
        let form = submitted_form(press(&mut app, &mut view, [ctrl('s')]));

        let outcome = ExecOutcome::WorkspaceCreateFailed {
            form,
            name: "ws".into(),
            message: "quota exceeded".into(),
        };
        let effects = view.handle_message(&mut app, &Msg::ExecCompleted(Box::new(outcome)));
        view.apply_view_effects(&mut app, effects);

        assert!(view.modal_view.is_some());
        assert!(app.workspaces.created.is_empty());
        let screen = draw(&mut app, &mut view);
        assert!(screen.contains("quota exceeded"), "{screen}");
    }

    #[test]
    fn success_closes_the_form_and_lists_the_workspace() {
        let (mut app, mut view) = setup(ClusterType::K8s);
        press(&mut app, &mut view, [ctrl('n')]);
        press(&mut app, &mut view, type_text("analytics"));
        let form = submitted_form(press(&mut app, &mut view, [ctrl('s')]));

        let outcome = ExecOutcome::WorkspaceCreated {
            form,
            name: "analytics".into(),
            workspace: json!({"name": "analytics"}),
        };
        let effects = view.handle_message(&mut app, &Msg::ExecCompleted(Box::new(outcome)));
        view.apply_view_effects(&mut app, effects);

        assert!(view.modal_view.is_none());
        assert_eq!(app.workspaces.created.len(), 1);
        let screen = draw(&mut app, &mut view);
        assert!(screen.contains("analytics"), "{screen}");
    }

    #[test]
    fn container_toggle_reveals_editor_and_enter_adds_lines() {
        let (mut app, mut view) = setup(ClusterType::K8s);
        press(&mut app, &mut view, [ctrl('n')]);
        press(&mut app, &mut view, type_text("ws"));
        press(&mut app, &mut view, [key(KeyCode::Tab), key(KeyCode::Char(' '))]);
        assert!(app.workspace_form.as_ref().expect("form").kubernetes_expanded());

        // Four Kubernetes text fields and the access mode come first.
        press(&mut app, &mut view, std::iter::repeat_n(key(KeyCode::Tab), 6));
        let focused = app.workspace_form.as_ref().and_then(|form| form.focused_control());
        assert_eq!(focused, Some(FormControl::ConfigureContainer));
        press(&mut app, &mut view, [key(KeyCode::Char(' '))]);
        assert!(app.workspace_form.as_ref().expect("form").configure_container());

        press(&mut app, &mut view, [key(KeyCode::Tab)]);
        press(&mut app, &mut view, type_text("a: 1"));
        press(&mut app, &mut view, [key(KeyCode::Enter)]);
        press(&mut app, &mut view, type_text("b: 2"));

        let leftover = press(&mut app, &mut view, [ctrl('s')]);
        let [Effect::CreateWorkspace { request, .. }] = leftover.as_slice() else {
            panic!("expected one creation effect, got {leftover:?}");
        };
        assert_eq!(request.workspace.config.container_config.as_deref(), Some("a: 1\nb: 2"));
    }

    #[test]
    fn ecs_form_offers_no_container_settings() {
        let (mut app, mut view) = setup(ClusterType::Ecs);
        press(&mut app, &mut view, [ctrl('n')]);
        let controls = app.workspace_form.as_ref().expect("form").visible_controls();
        assert!(!controls.contains(&FormControl::ConfigureContainer));
        assert!(!controls.contains(&FormControl::ContainerEditor));

        let screen = draw(&mut app, &mut view);
        assert!(!screen.contains("Configure container"), "{screen}");
    }

    #[test]
    fn navigate_effect_switches_page() {
        let (mut app, mut view) = setup(ClusterType::K8s);
        let target = workbench_types::LinkTarget::new("pipeline-runs");
        view.apply_view_effects(&mut app, vec![Effect::Navigate(target)]);
        assert_eq!(app.router.pathname(), "/pipeline-runs");
        let screen = draw(&mut app, &mut view);
        assert!(screen.contains("Pipeline runs"), "{screen}");
    }
}
