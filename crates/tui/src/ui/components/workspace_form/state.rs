use std::collections::HashMap;

use rat_focus::{FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use thiserror::Error;
use tracing::{debug, info};
use workbench_types::{
    AccessMode, ClusterType, CreateWorkspaceRequest, FieldDescriptor, FieldInputType, FormId, GENERAL_K8S_FIELDS,
    INVALID_NAME_MESSAGE, LifecycleConfig, VOLUME_CLAIM_K8S_FIELDS, WORKSPACE_FIELDS, WorkspaceConfig, WorkspaceField,
};

use crate::ui::components::common::{TextAreaState, TextInputState};

pub const LOADING_MESSAGE: &str = "This may take up to a few minutes... Once the service is created, it may take another 5-10 minutes for the service to be accessible.";
pub const SUBMISSION_FAILED_MESSAGE: &str = "Failed to create instance, see error below.";

/// Why the form is not submitting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{message}", message = INVALID_NAME_MESSAGE)]
    InvalidName,
    #[error("{0}")]
    Submission(String),
}

/// Submission lifecycle of the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPhase {
    Editing { error: Option<FormError> },
    Submitting,
    Created,
}

impl Default for FormPhase {
    fn default() -> Self {
        Self::Editing { error: None }
    }
}

/// Every focusable element of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormControl {
    Field(WorkspaceField),
    KubernetesSection,
    AccessMode,
    ConfigureContainer,
    ContainerEditor,
    LifecycleSection,
    AutoTermination,
    MaxIdleSeconds,
    CancelButton,
    CreateButton,
}

impl FormControl {
    fn focus_name(self) -> String {
        match self {
            Self::Field(field) => format!("workspace.form.{}", field.key()),
            other => format!("workspace.form.{other:?}").to_lowercase(),
        }
    }

    /// Controls that take printable characters.
    pub fn is_text_input(self) -> bool {
        matches!(self, Self::Field(_) | Self::ContainerEditor | Self::MaxIdleSeconds)
    }
}

fn all_descriptors() -> impl Iterator<Item = &'static FieldDescriptor> {
    WORKSPACE_FIELDS
        .iter()
        .chain(GENERAL_K8S_FIELDS)
        .chain(VOLUME_CLAIM_K8S_FIELDS)
}

/// Descriptor of `field` from the static tables.
pub fn descriptor(field: WorkspaceField) -> Option<&'static FieldDescriptor> {
    all_descriptors().find(|descriptor| descriptor.uuid == field)
}

/// State of one open workspace form.
///
/// Created when the modal opens and dropped when it closes, taking both
/// accumulators with it.
#[derive(Debug)]
pub struct WorkspaceFormState {
    id: FormId,
    cluster_type: ClusterType,
    submit_lifecycle_config: bool,
    config: WorkspaceConfig,
    lifecycle: LifecycleConfig,
    configure_container: bool,
    kubernetes_expanded: bool,
    lifecycle_expanded: bool,
    phase: FormPhase,

    inputs: HashMap<WorkspaceField, TextInputState>,
    container_editor: TextAreaState,
    max_idle_input: TextInputState,

    pub container_focus: FocusFlag,
    flags: HashMap<FormControl, FocusFlag>,

    /// First body line shown; adjusted by the renderer to keep focus visible.
    pub scroll_offset: u16,
    /// Clickable rows recorded by the last render.
    pub hit_areas: Vec<(FormControl, Rect)>,
    pub last_area: Rect,
}

impl WorkspaceFormState {
    pub fn new(cluster_type: ClusterType, submit_lifecycle_config: bool) -> Self {
        let controls = all_descriptors()
            .map(|descriptor| FormControl::Field(descriptor.uuid))
            .chain([
                FormControl::KubernetesSection,
                FormControl::AccessMode,
                FormControl::ConfigureContainer,
                FormControl::ContainerEditor,
                FormControl::LifecycleSection,
                FormControl::AutoTermination,
                FormControl::MaxIdleSeconds,
                FormControl::CancelButton,
                FormControl::CreateButton,
            ]);
        let flags: HashMap<_, _> = controls
            .map(|control| (control, FocusFlag::named(&control.focus_name())))
            .collect();
        if let Some(flag) = flags.get(&FormControl::Field(WorkspaceField::Name)) {
            flag.set(true);
        }

        Self {
            id: FormId::default(),
            cluster_type,
            submit_lifecycle_config,
            config: WorkspaceConfig::default(),
            lifecycle: LifecycleConfig::default(),
            configure_container: false,
            kubernetes_expanded: false,
            lifecycle_expanded: false,
            phase: FormPhase::default(),
            inputs: HashMap::new(),
            container_editor: TextAreaState::new(),
            max_idle_input: TextInputState::new(),
            container_focus: FocusFlag::named("workspace.form"),
            flags,
            scroll_offset: 0,
            hit_areas: Vec::new(),
            last_area: Rect::default(),
        }
    }

    pub fn with_id(mut self, id: FormId) -> Self {
        self.id = id;
        self
    }

    /// Tag carried by this form's creation request and its result.
    pub fn id(&self) -> FormId {
        self.id
    }

    pub fn cluster_type(&self) -> &ClusterType {
        &self.cluster_type
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> &LifecycleConfig {
        &self.lifecycle
    }

    pub fn phase(&self) -> &FormPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    /// Error to display; never shown while loading.
    pub fn error(&self) -> Option<&FormError> {
        match &self.phase {
            FormPhase::Editing { error } => error.as_ref(),
            _ => None,
        }
    }

    pub fn configure_container(&self) -> bool {
        self.configure_container
    }

    pub fn kubernetes_expanded(&self) -> bool {
        self.kubernetes_expanded
    }

    pub fn lifecycle_expanded(&self) -> bool {
        self.lifecycle_expanded
    }

    /// Text state of a free-text field, if it was edited.
    pub fn input(&self, field: WorkspaceField) -> Option<&TextInputState> {
        self.inputs.get(&field)
    }

    pub fn container_editor(&self) -> &TextAreaState {
        &self.container_editor
    }

    pub fn max_idle_input(&self) -> &TextInputState {
        &self.max_idle_input
    }

    /// Focusable controls in visual order for the current toggles and cluster type.
    pub fn visible_controls(&self) -> Vec<FormControl> {
        let mut controls: Vec<FormControl> = WORKSPACE_FIELDS
            .iter()
            .map(|descriptor| FormControl::Field(descriptor.uuid))
            .collect();

        if self.cluster_type.supports_kubernetes_settings() {
            controls.push(FormControl::KubernetesSection);
            if self.kubernetes_expanded {
                controls.extend(
                    GENERAL_K8S_FIELDS
                        .iter()
                        .chain(VOLUME_CLAIM_K8S_FIELDS)
                        .filter(|descriptor| !descriptor.disabled)
                        .map(|descriptor| FormControl::Field(descriptor.uuid)),
                );
                controls.push(FormControl::AccessMode);
                controls.push(FormControl::ConfigureContainer);
                if self.configure_container {
                    controls.push(FormControl::ContainerEditor);
                }
            }
        }

        controls.push(FormControl::LifecycleSection);
        if self.lifecycle_expanded {
            controls.push(FormControl::AutoTermination);
            controls.push(FormControl::MaxIdleSeconds);
        }

        controls.push(FormControl::CancelButton);
        if !self.is_loading() {
            controls.push(FormControl::CreateButton);
        }
        controls
    }

    pub fn flag(&self, control: FormControl) -> Option<&FocusFlag> {
        self.flags.get(&control)
    }

    pub fn focused_control(&self) -> Option<FormControl> {
        self.visible_controls()
            .into_iter()
            .find(|control| self.flags.get(control).is_some_and(FocusFlag::get))
    }

    /// Type a character into a text control. Characters the field's input
    /// type rejects are ignored.
    pub fn insert_char(&mut self, control: FormControl, character: char) {
        match control {
            FormControl::Field(field) => {
                let input_type = descriptor(field).map_or(FieldInputType::Text, |descriptor| descriptor.input_type);
                if input_type.accepts(character) {
                    self.edit_field(field, |input| input.insert_char(character));
                }
            }
            FormControl::ContainerEditor => self.edit_container(|editor| editor.insert_char(character)),
            FormControl::MaxIdleSeconds if FieldInputType::Number.accepts(character) => {
                self.edit_max_idle(|input| input.insert_char(character));
            }
            _ => {}
        }
    }

    pub fn backspace(&mut self, control: FormControl) {
        match control {
            FormControl::Field(field) => self.edit_field(field, TextInputState::backspace),
            FormControl::ContainerEditor => self.edit_container(TextAreaState::backspace),
            FormControl::MaxIdleSeconds => self.edit_max_idle(TextInputState::backspace),
            _ => {}
        }
    }

    pub fn insert_newline(&mut self) {
        self.edit_container(TextAreaState::insert_newline);
    }

    /// Horizontal cursor movement inside text controls.
    pub fn move_cursor(&mut self, control: FormControl, forward: bool) {
        match control {
            FormControl::Field(field) => {
                let input = self.inputs.entry(field).or_default();
                if forward { input.move_right() } else { input.move_left() }
            }
            FormControl::ContainerEditor if forward => self.container_editor.move_right(),
            FormControl::ContainerEditor => self.container_editor.move_left(),
            FormControl::MaxIdleSeconds if forward => self.max_idle_input.move_right(),
            FormControl::MaxIdleSeconds => self.max_idle_input.move_left(),
            _ => {}
        }
    }

    /// Vertical movement inside the editor; `false` when already on the edge line.
    pub fn move_editor_line(&mut self, down: bool) -> bool {
        if down {
            self.container_editor.move_down()
        } else {
            self.container_editor.move_up()
        }
    }

    /// Flip a toggle or accordion.
    pub fn toggle(&mut self, control: FormControl) {
        match control {
            FormControl::KubernetesSection => self.kubernetes_expanded = !self.kubernetes_expanded,
            FormControl::LifecycleSection => self.lifecycle_expanded = !self.lifecycle_expanded,
            FormControl::ConfigureContainer => {
                self.configure_container = !self.configure_container;
                debug!(enabled = self.configure_container, "configure container toggled");
            }
            FormControl::AutoTermination => {
                let enabled = !self.lifecycle.auto_termination_enabled();
                self.lifecycle.set_auto_termination(enabled);
            }
            _ => {}
        }
    }

    pub fn cycle_access_mode(&mut self, forward: bool) {
        let mode = AccessMode::cycle(self.config.storage_access_mode, forward);
        self.config.set_access_mode(mode);
    }

    /// Try to leave `Editing`.
    ///
    /// Returns the request to send, or `None` when a request is already in
    /// flight, the workspace was created, or the name is empty (which
    /// records [`FormError::InvalidName`]).
    pub fn submit(&mut self) -> Option<CreateWorkspaceRequest> {
        if !matches!(self.phase, FormPhase::Editing { .. }) {
            debug!(phase = ?self.phase, "ignoring submit outside of editing");
            return None;
        }

        let lifecycle = self.submit_lifecycle_config.then_some(&self.lifecycle);
        let configure_container = self.configure_container && self.cluster_type.supports_kubernetes_settings();
        match CreateWorkspaceRequest::compose(&self.config, &self.cluster_type, configure_container, lifecycle) {
            Some(request) => {
                info!(name = request.name(), cluster_type = %self.cluster_type, "submitting workspace");
                self.phase = FormPhase::Submitting;
                Some(request)
            }
            None => {
                self.phase = FormPhase::Editing {
                    error: Some(FormError::InvalidName),
                };
                None
            }
        }
    }

    /// Apply the result of the request started by [`submit`](Self::submit).
    ///
    /// Returns `true` exactly once, when the workspace was created. Results
    /// arriving outside `Submitting` are ignored.
    pub fn complete(&mut self, result: Result<(), String>) -> bool {
        if !self.is_loading() {
            debug!("dropping creation result for a form that is not submitting");
            return false;
        }
        match result {
            Ok(()) => {
                self.phase = FormPhase::Created;
                true
            }
            Err(message) => {
                self.phase = FormPhase::Editing {
                    error: Some(FormError::Submission(message)),
                };
                false
            }
        }
    }

    fn edit_field(&mut self, field: WorkspaceField, edit: impl FnOnce(&mut TextInputState)) {
        let input = self.inputs.entry(field).or_default();
        edit(input);
        self.config.set_value(field, input.input());
    }

    fn edit_container(&mut self, edit: impl FnOnce(&mut TextAreaState)) {
        edit(&mut self.container_editor);
        self.config.set_container_config(self.container_editor.text());
    }

    fn edit_max_idle(&mut self, edit: impl FnOnce(&mut TextInputState)) {
        edit(&mut self.max_idle_input);
        self.lifecycle.set_max_idle_seconds(self.max_idle_input.input());
    }
}

impl HasFocus for WorkspaceFormState {
    fn build(&self, builder: &mut FocusBuilder) {
        let tag = builder.start(self);
        for control in self.visible_controls() {
            if let Some(flag) = self.flags.get(&control) {
                builder.leaf_widget(flag);
            }
        }
        builder.end(tag);
    }

    fn focus(&self) -> FocusFlag {
        self.container_focus.clone()
    }

    fn area(&self) -> Rect {
        self.last_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn type_text(form: &mut WorkspaceFormState, control: FormControl, text: &str) {
        for character in text.chars() {
            form.insert_char(control, character);
        }
    }

    const NAME: FormControl = FormControl::Field(WorkspaceField::Name);

    #[test]
    fn empty_name_records_invalid_name_and_yields_no_request() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        assert!(form.submit().is_none());
        assert_eq!(form.error(), Some(&FormError::InvalidName));
        assert_eq!(form.error().map(ToString::to_string).as_deref(), Some("Please enter a valid name!"));

        type_text(&mut form, NAME, "x");
        form.backspace(NAME);
        assert!(form.submit().is_none());
        assert!(!form.is_loading());
    }

    #[test]
    fn spaces_only_name_is_submitted_sanitized() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        type_text(&mut form, NAME, "  ");
        assert_eq!(form.submit().expect("request").name(), "--");
        assert!(form.is_loading());
    }

    #[test]
    fn names_are_sanitized_per_cluster_type() {
        let mut ecs = WorkspaceFormState::new(ClusterType::Ecs, false);
        type_text(&mut ecs, NAME, "My Workspace");
        assert_eq!(ecs.submit().expect("request").name(), "My_Workspace");

        let mut other = WorkspaceFormState::new(ClusterType::CloudRun, false);
        type_text(&mut other, NAME, "My Workspace");
        assert_eq!(other.submit().expect("request").name(), "My-Workspace");
    }

    #[test]
    fn container_config_is_cleared_when_toggle_is_off() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        type_text(&mut form, NAME, "ws");
        form.toggle(FormControl::ConfigureContainer);
        type_text(&mut form, FormControl::ContainerEditor, "image: custom");
        form.toggle(FormControl::ConfigureContainer);

        let request = form.submit().expect("request");
        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(body["workspace"]["container_config"], json!(null));
    }

    #[test]
    fn container_config_is_sent_while_toggle_is_on() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        type_text(&mut form, NAME, "ws");
        form.toggle(FormControl::ConfigureContainer);
        type_text(&mut form, FormControl::ContainerEditor, "a: 1");
        form.insert_newline();
        type_text(&mut form, FormControl::ContainerEditor, "b: 2");

        let request = form.submit().expect("request");
        assert_eq!(request.workspace.config.container_config.as_deref(), Some("a: 1\nb: 2"));
    }

    #[test]
    fn submit_is_ignored_while_submitting() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        type_text(&mut form, NAME, "ws");
        assert!(form.submit().is_some());
        assert!(form.is_loading());
        assert!(form.submit().is_none());
        assert!(!form.visible_controls().contains(&FormControl::CreateButton));
    }

    #[test]
    fn rejection_returns_to_editing_with_message() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        type_text(&mut form, NAME, "ws");
        form.submit();
        assert!(!form.complete(Err("quota exceeded".into())));
        assert_eq!(form.error(), Some(&FormError::Submission("quota exceeded".into())));

        // The user can retry after a failure.
        assert!(form.submit().is_some());
        assert!(form.complete(Ok(())));
        assert_eq!(form.phase(), &FormPhase::Created);
        assert!(!form.complete(Ok(())));
    }

    #[test]
    fn lifecycle_is_attached_only_when_enabled() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        type_text(&mut form, NAME, "ws");
        form.toggle(FormControl::AutoTermination);
        type_text(&mut form, FormControl::MaxIdleSeconds, "36x00");
        assert_eq!(form.lifecycle().max_idle_seconds(), Some("3600"));
        assert!(form.submit().expect("request").workspace.lifecycle_config.is_none());

        let mut opted_in = WorkspaceFormState::new(ClusterType::K8s, true);
        type_text(&mut opted_in, NAME, "ws");
        opted_in.toggle(FormControl::AutoTermination);
        let lifecycle = opted_in.submit().expect("request").workspace.lifecycle_config.expect("lifecycle");
        assert!(lifecycle.auto_termination_enabled());
    }

    #[test]
    fn kubernetes_controls_follow_cluster_type_and_accordion() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        assert!(form.visible_controls().contains(&FormControl::KubernetesSection));
        assert!(!form.visible_controls().contains(&FormControl::AccessMode));
        form.toggle(FormControl::KubernetesSection);
        let controls = form.visible_controls();
        assert!(controls.contains(&FormControl::Field(WorkspaceField::StorageRequestSize)));
        assert!(controls.contains(&FormControl::AccessMode));

        let ecs = WorkspaceFormState::new(ClusterType::Ecs, false);
        assert!(!ecs.visible_controls().contains(&FormControl::KubernetesSection));
    }

    #[test]
    fn container_controls_live_in_the_kubernetes_section() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        assert!(!form.visible_controls().contains(&FormControl::ConfigureContainer));
        form.toggle(FormControl::KubernetesSection);
        form.toggle(FormControl::ConfigureContainer);
        let controls = form.visible_controls();
        assert!(controls.contains(&FormControl::ConfigureContainer));
        assert!(controls.contains(&FormControl::ContainerEditor));

        let mut ecs = WorkspaceFormState::new(ClusterType::Ecs, false);
        ecs.toggle(FormControl::ConfigureContainer);
        let controls = ecs.visible_controls();
        assert!(!controls.contains(&FormControl::ConfigureContainer));
        assert!(!controls.contains(&FormControl::ContainerEditor));

        type_text(&mut ecs, NAME, "ws");
        type_text(&mut ecs, FormControl::ContainerEditor, "image: x");
        let body = serde_json::to_value(ecs.submit().expect("request")).expect("serialize");
        assert_eq!(body["workspace"]["container_config"], json!(null));
    }

    #[test]
    fn field_edits_do_not_touch_other_keys() {
        let mut form = WorkspaceFormState::new(ClusterType::K8s, false);
        let size = FormControl::Field(WorkspaceField::StorageRequestSize);
        type_text(&mut form, size, "1O0");
        type_text(&mut form, FormControl::Field(WorkspaceField::IngressName), "edge");
        form.backspace(size);
        form.cycle_access_mode(true);

        let config = form.config();
        assert_eq!(config.storage_request_size.as_deref(), Some("1"));
        assert_eq!(config.ingress_name.as_deref(), Some("edge"));
        assert_eq!(config.storage_access_mode, Some(AccessMode::ReadWriteOnce));
        assert!(config.name.is_none());
    }

    #[test]
    fn name_has_initial_focus() {
        let form = WorkspaceFormState::new(ClusterType::K8s, false);
        assert_eq!(form.focused_control(), Some(NAME));
    }
}
