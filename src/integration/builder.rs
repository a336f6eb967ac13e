//! Builder for `Integration` resources
//!
//! Explicit traits are applied first and modeline traits second, so a modeline
//! entry overrides an explicit one for the same trait property.

use super::model::{Integration, IntegrationSpec, SourceSpec};
use crate::config::Settings;
use crate::error::{AppError, Result};
use crate::resources::kind::validate_resource_name;
use crate::traits::{parse_trait_list, Modeline, TraitConfiguration, TraitToken};
use tracing::{debug, info};

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_SOURCE_TYPE: &str = "groovy";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Building,
    Built,
}

#[derive(Debug, Clone)]
pub struct IntegrationBuilder {
    state: BuilderState,
    name: Option<String>,
    namespace: String,
    source: Option<String>,
    source_name: Option<String>,
    source_type: String,
    traits: Vec<String>,
    dependencies: Vec<String>,
}

impl Default for IntegrationBuilder {
    fn default() -> Self {
        Self {
            state: BuilderState::Building,
            name: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            source: None,
            source_name: None,
            source_type: DEFAULT_SOURCE_TYPE.to_string(),
            traits: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

impl IntegrationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder preset with the namespace and source type from `settings`
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            namespace: settings.namespace.clone(),
            source_type: settings.source_type.clone(),
            ..Self::default()
        }
    }

    pub fn name(&mut self, name: impl Into<String>) -> Result<&mut Self> {
        self.ensure_building()?;
        self.name = Some(name.into());
        Ok(self)
    }

    pub fn namespace(&mut self, namespace: impl Into<String>) -> Result<&mut Self> {
        self.ensure_building()?;
        self.namespace = namespace.into();
        Ok(self)
    }

    pub fn source(&mut self, content: impl Into<String>) -> Result<&mut Self> {
        self.ensure_building()?;
        self.source = Some(content.into());
        Ok(self)
    }

    /// File name of the source; defaults to `<name>.<source type>`
    pub fn source_name(&mut self, file_name: impl Into<String>) -> Result<&mut Self> {
        self.ensure_building()?;
        self.source_name = Some(file_name.into());
        Ok(self)
    }

    pub fn source_type(&mut self, extension: impl Into<String>) -> Result<&mut Self> {
        self.ensure_building()?;
        self.source_type = extension.into();
        Ok(self)
    }

    /// Comma separated `trait.property=value` list; repeated calls append
    pub fn traits(&mut self, traits: impl Into<String>) -> Result<&mut Self> {
        self.ensure_building()?;
        self.traits.push(traits.into());
        Ok(self)
    }

    /// Comma separated dependency list; repeated calls append
    pub fn dependencies(&mut self, dependencies: &str) -> Result<&mut Self> {
        self.ensure_building()?;
        self.dependencies.extend(
            dependencies
                .split(',')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
        );
        Ok(self)
    }

    pub fn is_built(&self) -> bool {
        self.state == BuilderState::Built
    }

    /// Finalize the integration. Succeeds at most once.
    pub fn build(&mut self) -> Result<Integration> {
        self.ensure_building()?;

        let name = self
            .name
            .as_deref()
            .ok_or_else(|| AppError::ValidationError("Integration name is required".to_string()))?;
        validate_resource_name(name)?;
        let source = self.source.as_deref().ok_or_else(|| {
            AppError::ValidationError(format!("Integration '{}' has no source", name))
        })?;

        let explicit: Vec<TraitToken> = self
            .traits
            .iter()
            .map(|traits| parse_trait_list(traits))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();
        let modeline = Modeline::new(source);
        let declared: Vec<TraitToken> = modeline.traits().collect::<Result<_>>()?;
        debug!(
            "🔍 Integration '{}': {} explicit and {} modeline trait tokens",
            name,
            explicit.len(),
            declared.len()
        );
        let traits = TraitConfiguration::merge([explicit, declared]);

        let mut dependencies: Vec<String> = Vec::new();
        for dependency in self
            .dependencies
            .iter()
            .map(String::as_str)
            .chain(modeline.dependencies())
        {
            if !dependencies.iter().any(|d| d == dependency) {
                dependencies.push(dependency.to_string());
            }
        }

        let source_name = self
            .source_name
            .clone()
            .unwrap_or_else(|| format!("{}.{}", name, self.source_type));

        let integration = Integration::new(
            name.to_string(),
            self.namespace.clone(),
            IntegrationSpec {
                sources: vec![SourceSpec {
                    name: source_name,
                    content: source.to_string(),
                }],
                dependencies,
                traits,
            },
        );

        self.state = BuilderState::Built;
        info!(
            "🏗️ Built integration '{}' with {} traits",
            integration.name(),
            integration.traits().len()
        );
        Ok(integration)
    }

    fn ensure_building(&self) -> Result<()> {
        match self.state {
            BuilderState::Building => Ok(()),
            BuilderState::Built => Err(AppError::InvalidBuilderState(
                "integration builder has already been finalized".to_string(),
            )),
        }
    }
}
