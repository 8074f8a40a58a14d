//! Workspace creation form shown as a modal.
//!
//! The state object owns the two accumulators (workspace settings and
//! lifecycle settings), the tagged submission phase and the rat-focus flags
//! of every control. The component maps keys and clicks onto it and renders
//! the field tables, accordions, the YAML editor and the status area.

mod state;
mod workspace_form_component;

pub use state::{FormControl, FormError, FormPhase, LOADING_MESSAGE, SUBMISSION_FAILED_MESSAGE, WorkspaceFormState};
pub use workspace_form_component::WorkspaceFormComponent;
