//! # Command execution layer
//!
//! Translates [`Effect`]s that need I/O into [`Cmd`]s and runs them. Network
//! calls are spawned on the tokio runtime; their [`ExecOutcome`] is collected
//! by the event loop and fed back to the app as `Msg::ExecCompleted`.

use std::sync::Arc;

use tokio::task::{JoinHandle, spawn};
use tracing::{debug, warn};
use workbench_api::{CreateWorkspaceResponse, WorkspaceService};
use workbench_types::{CreateWorkspaceRequest, Effect, ExecOutcome, FormId};

use crate::app::App;

#[derive(Debug)]
pub enum Cmd {
    CreateWorkspace {
        form: FormId,
        request: Box<CreateWorkspaceRequest>,
    },
}

/// Outcomes available right away plus tasks still running.
#[derive(Debug, Default)]
pub struct CommandBatch {
    pub immediate: Vec<ExecOutcome>,
    pub pending: Vec<JoinHandle<ExecOutcome>>,
}

/// Keep the effects that require I/O; the runtime handles the rest itself.
pub fn from_effects(effects: Vec<Effect>) -> Vec<Cmd> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::CreateWorkspace { form, request } => Some(Cmd::CreateWorkspace { form, request }),
            _ => None,
        })
        .collect()
}

pub fn run_cmds(app: &App, commands: Vec<Cmd>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for command in commands {
        match command {
            Cmd::CreateWorkspace { form, request } => {
                let api = Arc::clone(&app.ctx.api);
                batch.pending.push(spawn(create_workspace(api, form, *request)));
            }
        }
    }
    batch
}

pub fn run_from_effects(app: &App, effects: Vec<Effect>) -> CommandBatch {
    run_cmds(app, from_effects(effects))
}

/// Send one creation request for `form` and flatten every failure to a
/// display string.
pub async fn create_workspace(
    api: Arc<dyn WorkspaceService>,
    form: FormId,
    request: CreateWorkspaceRequest,
) -> ExecOutcome {
    let name = request.name().to_string();
    debug!(name, %form, "dispatching workspace creation");
    match api.create_workspace(&request).await {
        Ok(CreateWorkspaceResponse::Created { workspace }) => ExecOutcome::WorkspaceCreated { form, name, workspace },
        Ok(CreateWorkspaceResponse::Rejected { error_message }) => {
            warn!(name, error_message, "workspace creation rejected");
            ExecOutcome::WorkspaceCreateFailed {
                form,
                name,
                message: error_message,
            }
        }
        Err(error) => ExecOutcome::WorkspaceCreateFailed {
            form,
            name,
            message: error.to_string(),
        },
    }
}
