//! Known custom resource kinds and custom resource type derivation

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub const CAMEL_GROUP: &str = "camel.apache.org";

/// Maximum length of a Kubernetes resource name
const MAX_NAME_LENGTH: usize = 253;

/// Closed set of resource kinds the steps know how to manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Integration,
    Kamelet,
    KameletBinding,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Integration,
        ResourceKind::Kamelet,
        ResourceKind::KameletBinding,
    ];

    pub fn kind(&self) -> &'static str {
        match self {
            ResourceKind::Integration => "Integration",
            ResourceKind::Kamelet => "Kamelet",
            ResourceKind::KameletBinding => "KameletBinding",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            ResourceKind::Integration => "integrations",
            ResourceKind::Kamelet => "kamelets",
            ResourceKind::KameletBinding => "kameletbindings",
        }
    }

    pub fn group(&self) -> &'static str {
        CAMEL_GROUP
    }

    pub fn version(&self) -> &'static str {
        match self {
            ResourceKind::Integration => "v1",
            ResourceKind::Kamelet | ResourceKind::KameletBinding => "v1alpha1",
        }
    }

    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group(), self.version())
    }

    /// Type string in `<plural>.<group>/<version>` form
    pub fn resource_type(&self) -> String {
        format!("{}.{}/{}", self.plural(), self.group(), self.version())
    }

    /// Find a kind by kind name (case-insensitive), plural, `<plural>.<group>`
    /// or full resource type
    pub fn lookup(name: &str) -> Option<ResourceKind> {
        Self::ALL.into_iter().find(|kind| {
            kind.kind().eq_ignore_ascii_case(name)
                || kind.plural() == name
                || format!("{}.{}", kind.plural(), kind.group()) == name
                || kind.resource_type() == name
        })
    }

    /// Like [`ResourceKind::lookup`] but reports unknown kinds as validation errors
    pub fn resolve(name: &str) -> Result<ResourceKind> {
        Self::lookup(name).ok_or_else(|| {
            AppError::ValidationError(format!("Unsupported custom resource kind '{}'", name))
        })
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Custom resource type coordinates derived from a step configuration table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomResourceType {
    pub kind: String,
    pub group: String,
    pub version: String,
    pub resource_type: String,
}

/// How a custom resource is selected for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceSelector {
    Name(String),
    Label { key: String, value: String },
}

/// Resource type plus selector, as described by a configuration table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomResourceQuery {
    pub resource_type: CustomResourceType,
    pub selector: ResourceSelector,
}

impl CustomResourceType {
    /// Derive the type from `kind`, `apiVersion`, `group`, `version` and `type` keys
    pub fn from_configuration(configuration: &HashMap<String, String>) -> Result<Self> {
        let kind = configuration.get("kind").ok_or_else(|| {
            AppError::ValidationError(
                "Invalid custom resource type configuration - must use proper \"kind\" setting"
                    .to_string(),
            )
        })?;

        let (api_group, api_version) = match configuration.get("apiVersion") {
            Some(api_version) if !api_version.is_empty() => {
                api_version.split_once('/').ok_or_else(|| {
                    AppError::ValidationError(format!(
                        "Invalid apiVersion '{}' - expected <group>/<version>",
                        api_version
                    ))
                })?
            }
            _ => ("", ""),
        };

        let group = configuration
            .get("group")
            .cloned()
            .unwrap_or_else(|| api_group.to_string());
        let version = configuration
            .get("version")
            .cloned()
            .unwrap_or_else(|| api_version.to_string());
        let resource_type = configuration.get("type").cloned().unwrap_or_else(|| {
            format!("{}s.{}/{}", kind.to_lowercase(), group, version)
        });

        Ok(Self {
            kind: kind.clone(),
            group,
            version,
            resource_type,
        })
    }
}

impl CustomResourceQuery {
    /// Resolve type and selector; `name` wins over `label` when both are present
    pub fn from_configuration(configuration: &HashMap<String, String>) -> Result<Self> {
        let resource_type = CustomResourceType::from_configuration(configuration)?;

        let selector = if let Some(name) = configuration.get("name") {
            let name = if name.contains('/') {
                name.clone()
            } else {
                format!("{}/{}", resource_type.kind, name)
            };
            ResourceSelector::Name(name)
        } else if let Some(label) = configuration.get("label") {
            let (key, value) = label.split_once('=').unwrap_or((label.as_str(), ""));
            ResourceSelector::Label {
                key: key.to_string(),
                value: value.to_string(),
            }
        } else {
            return Err(AppError::ValidationError(
                "Invalid custom resource type configuration - must identify resource via \"name\" or \"label\""
                    .to_string(),
            ));
        };

        Ok(Self {
            resource_type,
            selector,
        })
    }
}

/// The identifying header of an arbitrary custom resource document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHeader {
    pub api_version: String,
    pub kind: String,
    pub metadata: ResourceMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

impl ResourceHeader {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let header: ResourceHeader = serde_yaml::from_str(yaml)?;
        validate_resource_name(&header.metadata.name)?;
        Ok(header)
    }

    pub fn resource_kind(&self) -> Result<ResourceKind> {
        ResourceKind::resolve(&self.kind)
    }
}

/// Check a name against the Kubernetes resource naming rules
pub fn validate_resource_name(name: &str) -> Result<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    let valid_edges = name
        .chars()
        .next()
        .zip(name.chars().last())
        .map(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric())
        .unwrap_or(false);

    if name.len() > MAX_NAME_LENGTH || !valid_chars || !valid_edges {
        return Err(AppError::ValidationError(format!(
            "Invalid resource name '{}' - must consist of lowercase alphanumeric characters or '-'",
            name
        )));
    }

    Ok(())
}
