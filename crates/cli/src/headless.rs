//! Non-interactive workspace creation from a YAML document.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_yaml::Value;
use tracing::{info, warn};
use workbench_api::{CreateWorkspaceResponse, WorkspaceService};
use workbench_types::{
    AccessMode, ClusterType, CreateWorkspaceRequest, INVALID_NAME_MESSAGE, LifecycleConfig, WorkspaceConfig,
    WorkspaceField,
};

/// Settings accepted by `workbench create --file`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceDocument {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cluster_type: Option<ClusterType>,
    #[serde(default)]
    pub service_account_name: Option<String>,
    #[serde(default)]
    pub ingress_name: Option<String>,
    #[serde(default)]
    pub storage_class_name: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub storage_request_size: Option<String>,
    #[serde(default)]
    pub storage_access_mode: Option<AccessMode>,
    #[serde(default)]
    pub container_config: Option<String>,
    #[serde(default)]
    pub lifecycle: Option<LifecycleDocument>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LifecycleDocument {
    #[serde(default)]
    pub enable_auto_termination: Option<bool>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub max_idle_seconds: Option<String>,
}

/// Numbers are kept as their textual form, the way the form stores them.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a string or number, found {other:?}"))),
    }
}

impl WorkspaceDocument {
    pub fn parse(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("invalid workspace document")
    }

    /// Cluster type precedence: explicit flag, then the document, then `fallback`.
    pub fn resolve_cluster_type(&self, flag: Option<ClusterType>, fallback: Option<ClusterType>) -> ClusterType {
        flag.or_else(|| self.cluster_type.clone())
            .or(fallback)
            .unwrap_or_default()
    }

    /// Build the creation request with the same rules as the form: the name
    /// is required and sanitized, the container override is sent only when it
    /// has content, lifecycle settings only when `submit_lifecycle` is set.
    pub fn to_request(&self, cluster_type: &ClusterType, submit_lifecycle: bool) -> Result<CreateWorkspaceRequest> {
        let mut config = WorkspaceConfig::default();
        let text_fields = [
            (WorkspaceField::Name, &self.name),
            (WorkspaceField::ServiceAccountName, &self.service_account_name),
            (WorkspaceField::IngressName, &self.ingress_name),
            (WorkspaceField::StorageClassName, &self.storage_class_name),
            (WorkspaceField::StorageRequestSize, &self.storage_request_size),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                config.set_value(field, value.clone());
            }
        }
        if !cluster_type.supports_kubernetes_settings() && self.has_kubernetes_settings() {
            warn!(%cluster_type, "Kubernetes settings are sent as given for a non-k8s cluster");
        }
        if let Some(mode) = self.storage_access_mode {
            config.set_access_mode(mode);
        }

        let container = self.container_config.as_deref().filter(|text| !text.trim().is_empty());
        if let Some(text) = container {
            config.set_container_config(text);
        }

        let lifecycle = self.lifecycle_config();
        if lifecycle.is_some() && !submit_lifecycle {
            warn!("lifecycle settings ignored; pass --submit-lifecycle to send them");
        }
        let lifecycle = lifecycle.filter(|_| submit_lifecycle);

        CreateWorkspaceRequest::compose(&config, cluster_type, container.is_some(), lifecycle.as_ref())
            .ok_or_else(|| anyhow!(INVALID_NAME_MESSAGE))
    }

    fn has_kubernetes_settings(&self) -> bool {
        self.service_account_name.is_some()
            || self.ingress_name.is_some()
            || self.storage_class_name.is_some()
            || self.storage_request_size.is_some()
            || self.storage_access_mode.is_some()
            || self.container_config.is_some()
    }

    fn lifecycle_config(&self) -> Option<LifecycleConfig> {
        let document = self.lifecycle.as_ref()?;
        let mut lifecycle = LifecycleConfig::default();
        if let Some(enabled) = document.enable_auto_termination {
            lifecycle.set_auto_termination(enabled);
        }
        if let Some(seconds) = &document.max_idle_seconds {
            lifecycle.set_max_idle_seconds(seconds.clone());
        }
        (!lifecycle.is_empty()).then_some(lifecycle)
    }
}

/// Read `path`, send the request and print the created workspace.
pub async fn create_from_file(
    api: &dyn WorkspaceService,
    path: &Path,
    cluster_type: Option<ClusterType>,
    fallback_cluster_type: Option<ClusterType>,
    submit_lifecycle: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let document = WorkspaceDocument::parse(&text)?;
    let cluster_type = document.resolve_cluster_type(cluster_type, fallback_cluster_type);
    let request = document.to_request(&cluster_type, submit_lifecycle)?;

    info!(name = request.name(), %cluster_type, "creating workspace from file");
    match api.create_workspace(&request).await? {
        CreateWorkspaceResponse::Created { workspace } => {
            println!("Created workspace '{}'", request.name());
            if !workspace.is_null() {
                println!("{}", serde_json::to_string_pretty(&workspace)?);
            }
            Ok(())
        }
        CreateWorkspaceResponse::Rejected { error_message } => bail!(error_message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
name: data team
service_account_name: runner
storage_request_size: 20
storage_access_mode: ReadWriteMany
container_config: |
  resources:
    limits:
      cpu: "2"
lifecycle:
  enable_auto_termination: true
  max_idle_seconds: 3600
"#;

    #[test]
    fn full_document_composes_k8s_request() {
        let document = WorkspaceDocument::parse(FULL).expect("parse");
        let request = document.to_request(&ClusterType::K8s, true).expect("request");
        let config = &request.workspace.config;
        assert_eq!(request.name(), "data-team");
        assert_eq!(config.service_account_name.as_deref(), Some("runner"));
        assert_eq!(config.storage_request_size.as_deref(), Some("20"));
        assert_eq!(config.storage_access_mode, Some(AccessMode::ReadWriteMany));
        assert!(config.container_config.as_deref().is_some_and(|text| text.contains("cpu")));

        let lifecycle = request.workspace.lifecycle_config.as_ref().expect("lifecycle attached");
        assert!(lifecycle.auto_termination_enabled());
        assert_eq!(lifecycle.max_idle_seconds(), Some("3600"));
    }

    #[test]
    fn lifecycle_is_dropped_without_opt_in() {
        let document = WorkspaceDocument::parse(FULL).expect("parse");
        let request = document.to_request(&ClusterType::Ecs, false).expect("request");
        assert_eq!(request.name(), "data_team");
        assert!(request.workspace.lifecycle_config.is_none());
    }

    #[test]
    fn blank_container_config_is_sent_as_null() {
        let document = WorkspaceDocument::parse("name: ws\ncontainer_config: \"  \"\n").expect("parse");
        let request = document.to_request(&ClusterType::K8s, false).expect("request");
        assert!(request.workspace.config.container_config.is_none());
        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(body["workspace"]["container_config"], serde_json::Value::Null);
    }

    #[test]
    fn missing_or_empty_name_is_rejected() {
        for text in ["ingress_name: edge\n", "name: \"\"\n"] {
            let document = WorkspaceDocument::parse(text).expect("parse");
            let error = document.to_request(&ClusterType::K8s, false).expect_err("no name");
            assert_eq!(error.to_string(), INVALID_NAME_MESSAGE);
        }

        let spaces = WorkspaceDocument::parse("name: \"  \"\n").expect("parse");
        assert_eq!(spaces.to_request(&ClusterType::Ecs, false).expect("request").name(), "__");
    }

    #[test]
    fn unknown_keys_are_reported() {
        let error = WorkspaceDocument::parse("name: ws\nreplicas: 3\n").expect_err("unknown key");
        assert!(format!("{error:#}").contains("replicas"), "{error:#}");
    }

    #[test]
    fn cluster_type_prefers_flag_then_document_then_fallback() {
        let document = WorkspaceDocument::parse("name: ws\ncluster_type: ecs\n").expect("parse");
        assert_eq!(
            document.resolve_cluster_type(Some(ClusterType::CloudRun), Some(ClusterType::K8s)),
            ClusterType::CloudRun
        );
        assert_eq!(document.resolve_cluster_type(None, Some(ClusterType::K8s)), ClusterType::Ecs);

        let bare = WorkspaceDocument::parse("name: ws\n").expect("parse");
        assert_eq!(bare.resolve_cluster_type(None, None), ClusterType::K8s);
    }

    #[derive(Debug)]
    struct RecordingService {
        response: CreateWorkspaceResponse,
        requests: std::sync::Mutex<Vec<CreateWorkspaceRequest>>,
    }

    #[async_trait::async_trait]
    impl WorkspaceService for RecordingService {
        async fn create_workspace(
            &self,
            request: &CreateWorkspaceRequest,
        ) -> Result<CreateWorkspaceResponse, workbench_api::ApiError> {
            self.requests.lock().expect("lock").push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn write_document(text: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("workspace.yaml");
        std::fs::write(&path, text).expect("write");
        (dir, path)
    }

    #[tokio::test]
    async fn file_is_sent_with_resolved_cluster_type() {
        let (_dir, path) = write_document("name: from disk\n");
        let service = RecordingService {
            response: CreateWorkspaceResponse::Created {
                workspace: serde_json::json!({"name": "from_disk"}),
            },
            requests: Default::default(),
        };
        create_from_file(&service, &path, None, Some(ClusterType::Ecs), false)
            .await
            .expect("created");
        let requests = service.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name(), "from_disk");
    }

    #[tokio::test]
    async fn rejection_becomes_error_with_server_message() {
        let (_dir, path) = write_document("name: ws\n");
        let service = RecordingService {
            response: CreateWorkspaceResponse::Rejected {
                error_message: "quota exceeded".into(),
            },
            requests: Default::default(),
        };
        let error = create_from_file(&service, &path, None, None, false)
            .await
            .expect_err("rejected");
        assert_eq!(error.to_string(), "quota exceeded");
    }
}
