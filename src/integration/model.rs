//! Camel K `Integration` custom resource

use crate::error::Result;
use crate::resources::kind::{ResourceKind, ResourceMetadata};
use crate::traits::TraitConfiguration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    api_version: String,
    kind: String,
    metadata: ResourceMetadata,
    spec: IntegrationSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status: Option<IntegrationStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSpec {
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "TraitConfiguration::is_empty")]
    pub traits: TraitConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl Integration {
    pub(crate) fn new(name: String, namespace: String, spec: IntegrationSpec) -> Self {
        Self {
            api_version: ResourceKind::Integration.api_version(),
            kind: ResourceKind::Integration.kind().to_string(),
            metadata: ResourceMetadata {
                name,
                namespace: Some(namespace),
                ..Default::default()
            },
            spec,
            status: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn spec(&self) -> &IntegrationSpec {
        &self.spec
    }

    pub fn traits(&self) -> &TraitConfiguration {
        &self.spec.traits
    }

    pub fn phase(&self) -> Option<&str> {
        self.status.as_ref()?.phase.as_deref()
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
