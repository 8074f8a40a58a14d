//! Workspace endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};
use workbench_types::CreateWorkspaceRequest;

use crate::{ApiError, WorkbenchClient};

/// Provisioning can take minutes; the default client timeout is too short.
const CREATE_WORKSPACE_TIMEOUT: Duration = Duration::from_secs(600);

/// Successful HTTP exchange with the creation endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateWorkspaceResponse {
    /// The workspace was accepted; carries the `workspace` object when echoed.
    Created { workspace: Value },
    /// The server answered normally but refused with an `error_message`.
    Rejected { error_message: String },
}

/// Operations on workspaces.
#[async_trait]
pub trait WorkspaceService: Send + Sync + std::fmt::Debug {
    async fn create_workspace(&self, request: &CreateWorkspaceRequest) -> Result<CreateWorkspaceResponse, ApiError>;
}

#[async_trait]
impl WorkspaceService for WorkbenchClient {
    async fn create_workspace(&self, request: &CreateWorkspaceRequest) -> Result<CreateWorkspaceResponse, ApiError> {
        info!(name = request.name(), cluster_type = %request.workspace.cluster_type, "creating workspace");
        let response = self
            .request(Method::POST, "/workspaces")
            .timeout(CREATE_WORKSPACE_TIMEOUT)
            .json(request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, "workspace creation responded");

        let outcome = interpret_create_response(status, &body);
        if let Err(error) = &outcome {
            warn!(status, %error, "workspace creation failed");
        }
        outcome
    }
}

/// Classify a creation response body.
///
/// Precedence: an `error` object is an API error regardless of status; a
/// non-success status is a status error; a non-empty top-level
/// `error_message` is a business rejection; anything else is success.
pub fn interpret_create_response(status: u16, body: &str) -> Result<CreateWorkspaceResponse, ApiError> {
    let is_success = (200..300).contains(&status);
    let value = if body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => value,
            Err(_) if !is_success => {
                return Err(ApiError::Status {
                    status,
                    body: body.to_string(),
                });
            }
            Err(error) => return Err(ApiError::Decode(error)),
        }
    };

    if let Some(error) = value.get("error").filter(|error| error.is_object()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        return Err(ApiError::Server {
            status,
            message,
            errors: error.get("errors").cloned(),
        });
    }

    if !is_success {
        return Err(ApiError::Status {
            status,
            body: body.to_string(),
        });
    }

    if let Some(error_message) = value
        .get("error_message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
    {
        return Ok(CreateWorkspaceResponse::Rejected {
            error_message: error_message.to_string(),
        });
    }

    let workspace = value.get("workspace").cloned().unwrap_or(value);
    Ok(CreateWorkspaceResponse::Created { workspace })
}
