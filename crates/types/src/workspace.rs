//! Workspace configuration model, declarative field tables and the
//! creation payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Message shown when a submission is attempted without a name.
pub const INVALID_NAME_MESSAGE: &str = "Please enter a valid name!";

/// Target platform of a workspace.
///
/// Unknown values are preserved verbatim so that newer servers can be
/// addressed without a client release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ClusterType {
    #[default]
    K8s,
    Ecs,
    CloudRun,
    Other(String),
}

impl ClusterType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::K8s => "k8s",
            Self::Ecs => "ecs",
            Self::CloudRun => "cloud_run",
            Self::Other(value) => value,
        }
    }

    /// Replacement used for spaces in workspace names.
    pub fn name_separator(&self) -> char {
        match self {
            Self::Ecs => '_',
            _ => '-',
        }
    }

    /// Kubernetes settings are only offered for `k8s`.
    pub fn supports_kubernetes_settings(&self) -> bool {
        matches!(self, Self::K8s)
    }
}

impl From<String> for ClusterType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "k8s" => Self::K8s,
            "ecs" => Self::Ecs,
            "cloud_run" => Self::CloudRun,
            _ => Self::Other(value),
        }
    }
}

impl From<ClusterType> for String {
    fn from(value: ClusterType) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for ClusterType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.trim().to_string()))
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replace every space in `name` with the cluster's separator.
pub fn sanitize_workspace_name(name: &str, cluster_type: &ClusterType) -> String {
    let separator = cluster_type.name_separator();
    name.chars()
        .map(|character| if character == ' ' { separator } else { character })
        .collect()
}

/// Free-text workspace settings addressable from the field tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkspaceField {
    Name,
    ServiceAccountName,
    IngressName,
    StorageClassName,
    StorageRequestSize,
}

impl WorkspaceField {
    /// Key used in the request payload.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::ServiceAccountName => "service_account_name",
            Self::IngressName => "ingress_name",
            Self::StorageClassName => "storage_class_name",
            Self::StorageRequestSize => "storage_request_size",
        }
    }
}

/// Input kind rendered for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInputType {
    Text,
    Number,
}

impl FieldInputType {
    /// Whether `character` may be typed into an input of this kind.
    pub fn accepts(self, character: char) -> bool {
        match self {
            Self::Text => !character.is_control(),
            Self::Number => character.is_ascii_digit() || character == '.',
        }
    }
}

/// Declarative description of one form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub uuid: WorkspaceField,
    pub label: &'static str,
    pub input_type: FieldInputType,
    pub required: bool,
    pub disabled: bool,
    pub autocomplete: Option<&'static str>,
    pub description: Option<&'static str>,
    pub placeholder: Option<&'static str>,
}

impl FieldDescriptor {
    const fn text(uuid: WorkspaceField, label: &'static str) -> Self {
        Self {
            uuid,
            label,
            input_type: FieldInputType::Text,
            required: false,
            disabled: false,
            autocomplete: None,
            description: None,
            placeholder: None,
        }
    }
}

pub const WORKSPACE_FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
    required: true,
    autocomplete: Some("off"),
    placeholder: Some("my workspace"),
    ..FieldDescriptor::text(WorkspaceField::Name, "Workspace name")
}];

pub const GENERAL_K8S_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        description: Some("Service account used by the workspace pods"),
        ..FieldDescriptor::text(WorkspaceField::ServiceAccountName, "Service account name")
    },
    FieldDescriptor {
        description: Some("Existing ingress to attach the workspace to"),
        ..FieldDescriptor::text(WorkspaceField::IngressName, "Ingress name")
    },
];

pub const VOLUME_CLAIM_K8S_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::text(WorkspaceField::StorageClassName, "Storage class name"),
    FieldDescriptor {
        input_type: FieldInputType::Number,
        description: Some("Size of the volume claim in Gi"),
        ..FieldDescriptor::text(WorkspaceField::StorageRequestSize, "Storage request size")
    },
];

/// Persistent volume access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    ReadWriteOnce,
    ReadOnlyMany,
    ReadWriteMany,
    ReadWriteOncePod,
}

pub const ACCESS_MODES: &[AccessMode] = &[
    AccessMode::ReadWriteOnce,
    AccessMode::ReadOnlyMany,
    AccessMode::ReadWriteMany,
    AccessMode::ReadWriteOncePod,
];

impl AccessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReadWriteOnce => "ReadWriteOnce",
            Self::ReadOnlyMany => "ReadOnlyMany",
            Self::ReadWriteMany => "ReadWriteMany",
            Self::ReadWriteOncePod => "ReadWriteOncePod",
        }
    }

    /// Step through [`ACCESS_MODES`], starting from the first mode when none
    /// is selected yet.
    pub fn cycle(current: Option<Self>, forward: bool) -> Self {
        let len = ACCESS_MODES.len();
        let next_index = match current.and_then(|mode| ACCESS_MODES.iter().position(|m| *m == mode)) {
            None => 0,
            Some(index) if forward => (index + 1) % len,
            Some(index) => (index + len - 1) % len,
        };
        ACCESS_MODES[next_index]
    }
}

/// Accumulated workspace settings.
///
/// Every setter touches exactly one key; the last write for a key wins.
/// `container_config` is always serialized so that a cleared editor is sent
/// as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_request_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_access_mode: Option<AccessMode>,
    #[serde(default)]
    pub container_config: Option<String>,
}

impl WorkspaceConfig {
    fn slot(&mut self, field: WorkspaceField) -> &mut Option<String> {
        match field {
            WorkspaceField::Name => &mut self.name,
            WorkspaceField::ServiceAccountName => &mut self.service_account_name,
            WorkspaceField::IngressName => &mut self.ingress_name,
            WorkspaceField::StorageClassName => &mut self.storage_class_name,
            WorkspaceField::StorageRequestSize => &mut self.storage_request_size,
        }
    }

    pub fn value(&self, field: WorkspaceField) -> Option<&str> {
        let value = match field {
            WorkspaceField::Name => &self.name,
            WorkspaceField::ServiceAccountName => &self.service_account_name,
            WorkspaceField::IngressName => &self.ingress_name,
            WorkspaceField::StorageClassName => &self.storage_class_name,
            WorkspaceField::StorageRequestSize => &self.storage_request_size,
        };
        value.as_deref()
    }

    pub fn set_value(&mut self, field: WorkspaceField, value: impl Into<String>) {
        *self.slot(field) = Some(value.into());
    }

    pub fn set_access_mode(&mut self, mode: AccessMode) {
        self.storage_access_mode = Some(mode);
    }

    pub fn set_container_config(&mut self, text: impl Into<String>) {
        self.container_config = Some(text.into());
    }

    /// Name as typed, if it is non-empty.
    pub fn present_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Automatic shutdown rule for idle workspaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminationPolicy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_auto_termination: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_idle_seconds: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_policy: Option<TerminationPolicy>,
}

impl LifecycleConfig {
    pub fn auto_termination_enabled(&self) -> bool {
        self.termination_policy
            .as_ref()
            .and_then(|policy| policy.enable_auto_termination)
            .unwrap_or(false)
    }

    pub fn max_idle_seconds(&self) -> Option<&str> {
        self.termination_policy.as_ref().and_then(|policy| policy.max_idle_seconds.as_deref())
    }

    pub fn set_auto_termination(&mut self, enabled: bool) {
        self.termination_policy.get_or_insert_with(TerminationPolicy::default).enable_auto_termination = Some(enabled);
    }

    pub fn set_max_idle_seconds(&mut self, seconds: impl Into<String>) {
        self.termination_policy.get_or_insert_with(TerminationPolicy::default).max_idle_seconds = Some(seconds.into());
    }

    pub fn is_empty(&self) -> bool {
        self.termination_policy.is_none()
    }
}

/// Body of the workspace creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspacePayload {
    #[serde(flatten)]
    pub config: WorkspaceConfig,
    pub cluster_type: ClusterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_config: Option<LifecycleConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub workspace: WorkspacePayload,
}

impl CreateWorkspaceRequest {
    /// Compose the payload sent to the creation endpoint.
    ///
    /// Returns `None` when the name is empty. The name is sanitized
    /// for the cluster type, the container override is kept only while
    /// `configure_container` is on, and the lifecycle accumulator is attached
    /// only when given.
    pub fn compose(
        config: &WorkspaceConfig,
        cluster_type: &ClusterType,
        configure_container: bool,
        lifecycle: Option<&LifecycleConfig>,
    ) -> Option<Self> {
        let name = config.present_name()?;
        let mut updated = config.clone();
        updated.name = Some(sanitize_workspace_name(name, cluster_type));
        if !configure_container {
            updated.container_config = None;
        }
        Some(Self {
            workspace: WorkspacePayload {
                config: updated,
                cluster_type: cluster_type.clone(),
                lifecycle_config: lifecycle.filter(|lifecycle| !lifecycle.is_empty()).cloned(),
            },
        })
    }

    pub fn name(&self) -> &str {
        self.workspace.config.name.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config_named(name: &str) -> WorkspaceConfig {
        let mut config = WorkspaceConfig::default();
        config.set_value(WorkspaceField::Name, name);
        config
    }

    #[test]
    fn ecs_names_use_underscores() {
        let request = CreateWorkspaceRequest::compose(&config_named("My Workspace"), &ClusterType::Ecs, false, None)
            .expect("named config composes");
        assert_eq!(request.name(), "My_Workspace");
    }

    #[test]
    fn other_cluster_names_use_dashes() {
        for cluster_type in [ClusterType::K8s, ClusterType::CloudRun, ClusterType::from("gke".to_string())] {
            let request = CreateWorkspaceRequest::compose(&config_named("My Workspace"), &cluster_type, false, None)
                .expect("named config composes");
            assert_eq!(request.name(), "My-Workspace", "cluster type {cluster_type}");
        }
    }

    #[test]
    fn empty_name_does_not_compose() {
        assert!(CreateWorkspaceRequest::compose(&WorkspaceConfig::default(), &ClusterType::K8s, false, None).is_none());
        assert!(CreateWorkspaceRequest::compose(&config_named(""), &ClusterType::K8s, false, None).is_none());
    }

    #[test]
    fn spaces_only_name_composes_to_separators() {
        let request = CreateWorkspaceRequest::compose(&config_named("  "), &ClusterType::K8s, false, None)
            .expect("non-empty name composes");
        assert_eq!(request.name(), "--");
    }

    #[test]
    fn only_spaces_are_replaced_in_names() {
        assert_eq!(sanitize_workspace_name("a b\tc\nd", &ClusterType::Ecs), "a_b\tc\nd");
        assert_eq!(sanitize_workspace_name("a  b", &ClusterType::K8s), "a--b");
    }

    #[test]
    fn container_config_is_cleared_when_toggle_is_off() {
        let mut config = config_named("ws");
        config.set_container_config("image: custom:latest");

        let off = CreateWorkspaceRequest::compose(&config, &ClusterType::K8s, false, None).expect("composes");
        let body = serde_json::to_value(&off).expect("serialize");
        assert_eq!(body["workspace"]["container_config"], serde_json::Value::Null);

        let on = CreateWorkspaceRequest::compose(&config, &ClusterType::K8s, true, None).expect("composes");
        let body = serde_json::to_value(&on).expect("serialize");
        assert_eq!(body["workspace"]["container_config"], json!("image: custom:latest"));
    }

    #[test]
    fn payload_shape_matches_endpoint_contract() {
        let mut config = config_named("data team");
        config.set_value(WorkspaceField::StorageRequestSize, "10");
        config.set_access_mode(AccessMode::ReadWriteMany);
        let request = CreateWorkspaceRequest::compose(&config, &ClusterType::K8s, false, None).expect("composes");
        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            body,
            json!({
                "workspace": {
                    "name": "data-team",
                    "storage_request_size": "10",
                    "storage_access_mode": "ReadWriteMany",
                    "container_config": null,
                    "cluster_type": "k8s",
                }
            })
        );
    }

    #[test]
    fn lifecycle_is_attached_only_when_requested_and_non_empty() {
        let config = config_named("ws");
        let mut lifecycle = LifecycleConfig::default();
        let request = CreateWorkspaceRequest::compose(&config, &ClusterType::K8s, false, Some(&lifecycle)).expect("composes");
        assert!(request.workspace.lifecycle_config.is_none());

        lifecycle.set_auto_termination(true);
        lifecycle.set_max_idle_seconds("3600");
        let request = CreateWorkspaceRequest::compose(&config, &ClusterType::K8s, false, Some(&lifecycle)).expect("composes");
        let body = serde_json::to_value(&request).expect("serialize");
        assert_eq!(
            body["workspace"]["lifecycle_config"],
            json!({"termination_policy": {"enable_auto_termination": true, "max_idle_seconds": "3600"}})
        );
    }

    #[test]
    fn setters_do_not_interfere_across_keys() {
        let mut config = WorkspaceConfig::default();
        config.set_value(WorkspaceField::Name, "a");
        config.set_value(WorkspaceField::IngressName, "ingress");
        config.set_value(WorkspaceField::Name, "b");
        assert_eq!(config.value(WorkspaceField::Name), Some("b"));
        assert_eq!(config.value(WorkspaceField::IngressName), Some("ingress"));
        assert_eq!(config.value(WorkspaceField::StorageClassName), None);
    }

    #[test]
    fn access_mode_cycles_in_table_order() {
        assert_eq!(AccessMode::cycle(None, true), AccessMode::ReadWriteOnce);
        assert_eq!(AccessMode::cycle(Some(AccessMode::ReadWriteOncePod), true), AccessMode::ReadWriteOnce);
        assert_eq!(AccessMode::cycle(Some(AccessMode::ReadWriteOnce), false), AccessMode::ReadWriteOncePod);
    }

    #[test]
    fn cluster_type_preserves_unknown_values() {
        let parsed: ClusterType = serde_json::from_value(json!("nomad")).expect("deserialize");
        assert_eq!(parsed, ClusterType::Other("nomad".into()));
        assert_eq!(serde_json::to_value(&ClusterType::CloudRun).expect("serialize"), json!("cloud_run"));
    }

    #[test]
    fn config_deserializes_from_yaml_document() {
        let yaml = "name: analytics\nstorage_access_mode: ReadOnlyMany\ncontainer_config: |\n  image: x\n";
        let config: WorkspaceConfig = serde_yaml::from_str(yaml).expect("yaml config");
        assert_eq!(config.name.as_deref(), Some("analytics"));
        assert_eq!(config.storage_access_mode, Some(AccessMode::ReadOnlyMany));
        assert_eq!(config.container_config.as_deref(), Some("image: x\n"));
    }
}
