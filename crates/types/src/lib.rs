//! Shared types for the Workbench dashboard: navigation descriptors, the
//! workspace configuration model, and the message/effect vocabulary used
//! between the terminal UI and its runtime.

pub mod navigation;
pub mod workspace;

pub use navigation::{LinkTarget, NavIcon, NavigationItem, default_navigation_items};
pub use workspace::{
    ACCESS_MODES, AccessMode, ClusterType, CreateWorkspaceRequest, FieldDescriptor, FieldInputType, GENERAL_K8S_FIELDS,
    INVALID_NAME_MESSAGE, LifecycleConfig, TerminationPolicy, VOLUME_CLAIM_K8S_FIELDS, WORKSPACE_FIELDS, WorkspaceConfig,
    WorkspaceField, WorkspacePayload, sanitize_workspace_name,
};

use std::fmt;

use serde_json::Value;

/// Identifies one opening of the workspace form so a late creation result
/// can be matched to the form that sent it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form#{}", self.0)
    }
}

/// Messages that can be sent to update the application state.
///
/// This enum defines the user actions and system events that can trigger
/// state changes in the application.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (e.g., throbbers)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Background execution completed with outcome
    ExecCompleted(Box<ExecOutcome>),
}

/// Side effects that can be triggered by state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Follow a navigation link; the runtime owns the router
    Navigate(LinkTarget),
    /// Display a modal view
    ShowModal(Modal),
    /// Hide any open modal
    CloseModal,
    /// Send a workspace creation request in the background on behalf of `form`
    CreateWorkspace {
        form: FormId,
        request: Box<CreateWorkspaceRequest>,
    },
    /// Switch to the next theme and remember the choice
    CycleTheme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    CreateWorkspace,
}

/// Result of a background task, delivered back to the event loop.
#[derive(Debug, Clone)]
pub enum ExecOutcome {
    /// The server accepted the workspace; `workspace` is the echoed resource
    WorkspaceCreated { form: FormId, name: String, workspace: Value },
    /// Transport, API or business failure flattened to a display string
    WorkspaceCreateFailed { form: FormId, name: String, message: String },
    /// Plain log line
    Log(String),
}
