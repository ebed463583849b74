use std::fmt;

use tracing::warn;

use crate::error::{ParameterListing, QaBotError};

pub const DEFAULT_PARAMETER_ROOT: &str = "qabot";

/// Hierarchical key-value store holding deployment parameters.
pub trait ParameterStore {
    /// Point lookup by full path. `Ok(None)` means the parameter does not exist.
    fn get_parameter(&self, name: &str) -> Result<Option<String>, String>;

    /// Full names of every parameter stored directly under `path`.
    fn list_parameter_names(&self, path: &str) -> Result<Vec<String>, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKey {
    ClusterName,
    TaskDefinitionArn,
    ContainerName,
    Subnet,
    TableName,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 5] = [
        Self::ClusterName,
        Self::TaskDefinitionArn,
        Self::ContainerName,
        Self::Subnet,
        Self::TableName,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClusterName => "ECS_CLUSTER_NAME",
            Self::TaskDefinitionArn => "ECS_TASK_DEFINITION_ARN",
            Self::ContainerName => "CONTAINER_NAME",
            Self::Subnet => "ECS_TASK_VPC_SUBNET_1",
            Self::TableName => "TABLE_NAME",
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Slash-delimited path scoping every parameter of one deployment,
/// e.g. `/qabot/223/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePrefix(String);

impl NamespacePrefix {
    pub fn for_student(root: &str, student_id: &str) -> Result<Self, QaBotError> {
        let root = root.trim().trim_matches('/');
        let student_id = student_id.trim();
        if root.is_empty() {
            return Err(QaBotError::InvalidNamespace(
                "parameter root cannot be empty".to_string(),
            ));
        }
        if student_id.is_empty() {
            return Err(QaBotError::InvalidNamespace(
                "student id cannot be empty (set STUDENT_ID, e.g. `export STUDENT_ID=223`)"
                    .to_string(),
            ));
        }
        if student_id.contains('/') {
            return Err(QaBotError::InvalidNamespace(format!(
                "student id '{student_id}' must not contain '/'"
            )));
        }
        Ok(Self(format!("/{root}/{student_id}/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn path_for(&self, name: &str) -> String {
        format!("{}{name}", self.0)
    }
}

impl fmt::Display for NamespacePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deployment values needed to launch a task and read its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaBotConfig {
    pub cluster_name: String,
    pub task_definition_arn: String,
    pub container_name: String,
    pub subnet_id: String,
    pub table_name: String,
}

pub struct ParameterResolver<'a, S: ParameterStore + ?Sized> {
    store: &'a S,
    prefix: NamespacePrefix,
}

impl<'a, S: ParameterStore + ?Sized> ParameterResolver<'a, S> {
    pub fn new(store: &'a S, prefix: NamespacePrefix) -> Self {
        Self { store, prefix }
    }

    pub fn prefix(&self) -> &NamespacePrefix {
        &self.prefix
    }

    /// Reads `<prefix><name>`. A miss carries the sibling listing as diagnostic.
    pub fn resolve(&self, name: &str) -> Result<String, QaBotError> {
        let full_name = self.prefix.path_for(name);
        match self.store.get_parameter(&full_name) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => {
                let diagnostic = self.available_parameters();
                match &diagnostic {
                    ParameterListing::Available(names) => warn!(
                        parameter = %full_name,
                        available = ?names,
                        "parameter not found"
                    ),
                    ParameterListing::Unavailable(message) => warn!(
                        parameter = %full_name,
                        listing_error = %message,
                        "parameter not found and listing failed"
                    ),
                }
                Err(QaBotError::ConfigurationNotFound {
                    name: full_name,
                    diagnostic,
                })
            }
            Err(message) => Err(QaBotError::ConfigurationUnavailable {
                name: full_name,
                message,
            }),
        }
    }

    /// Every parameter currently present under the prefix, sorted by name.
    pub fn available_parameters(&self) -> ParameterListing {
        match self.store.list_parameter_names(self.prefix.as_str()) {
            Ok(mut names) => {
                names.sort();
                ParameterListing::Available(names)
            }
            Err(message) => ParameterListing::Unavailable(message),
        }
    }

    pub fn load_config(&self) -> Result<QaBotConfig, QaBotError> {
        Ok(QaBotConfig {
            cluster_name: self.resolve(ParameterKey::ClusterName.as_str())?,
            task_definition_arn: self.resolve(ParameterKey::TaskDefinitionArn.as_str())?,
            container_name: self.resolve(ParameterKey::ContainerName.as_str())?,
            subnet_id: self.resolve(ParameterKey::Subnet.as_str())?,
            table_name: self.resolve(ParameterKey::TableName.as_str())?,
        })
    }
}
