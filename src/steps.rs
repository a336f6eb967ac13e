//! Scenario scoped step glue
//!
//! One [`CamelKSteps`] value lives for one scenario. It remembers every resource
//! it created so they can be removed when the scenario finishes.

use crate::actions::{
    CreateIntegrationAction, CreateResourceAction, DeleteResourceAction, Expectation,
    ResourceAction, VerifyResourceAction,
};
use crate::config::{parse_number, Settings};
use crate::error::Result;
use crate::integration::{Integration, IntegrationBuilder};
use crate::resources::{CustomResourceQuery, ResourceKind, ResourceSelector, ResourceStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub const TRAITS_KEY: &str = "traits";
pub const DEPENDENCIES_KEY: &str = "dependencies";
pub const MAX_ATTEMPTS_KEY: &str = "maxAttempts";
pub const DELAY_BETWEEN_ATTEMPTS_KEY: &str = "delayBetweenAttempts";

const RUNNING_PHASE: &str = "Running";
const READY_CONDITION: &str = "Ready";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CreatedResource {
    kind: ResourceKind,
    namespace: String,
    name: String,
}

#[derive(Debug)]
pub struct CamelKSteps {
    store: Arc<dyn ResourceStore>,
    settings: Settings,
    created: Vec<CreatedResource>,
}

impl CamelKSteps {
    pub fn new(store: Arc<dyn ResourceStore>, settings: Settings) -> Self {
        Self {
            store,
            settings,
            created: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn disable_auto_remove(&mut self) {
        self.settings.auto_remove_resources = false;
    }

    pub fn enable_auto_remove(&mut self) {
        self.settings.auto_remove_resources = true;
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.settings.namespace = namespace.into();
    }

    /// Apply `maxAttempts` and `delayBetweenAttempts` (ms) entries; others are ignored
    pub fn configure_resource_polling(&mut self, configuration: &HashMap<String, String>) -> Result<()> {
        if let Some(value) = configuration.get(MAX_ATTEMPTS_KEY) {
            self.settings.max_attempts = parse_number(MAX_ATTEMPTS_KEY, value)?;
        }
        if let Some(value) = configuration.get(DELAY_BETWEEN_ATTEMPTS_KEY) {
            self.settings.delay_between_attempts =
                Duration::from_millis(parse_number(DELAY_BETWEEN_ATTEMPTS_KEY, value)?);
        }
        debug!(
            "⚙️ Resource polling: {} attempts every {:?}",
            self.settings.max_attempts, self.settings.delay_between_attempts
        );
        Ok(())
    }

    /// Bound verification by total time; the attempt count is derived from the
    /// current delay between attempts
    pub fn configure_timeout(&mut self, timeout: Duration) {
        let delay = self.settings.delay_between_attempts.as_millis().max(1);
        let attempts = timeout.as_millis().div_ceil(delay);
        self.settings.max_attempts = u32::try_from(attempts).unwrap_or(u32::MAX).max(1);
        debug!(
            "⚙️ Resource polling timeout {:?}: {} attempts",
            timeout, self.settings.max_attempts
        );
    }

    pub async fn create_integration(&mut self, file_name: &str, source: &str) -> Result<Integration> {
        self.create_integration_with_configuration(file_name, source, &HashMap::new())
            .await
    }

    /// Create an integration from `foo.groovy` style file name, source and an
    /// optional `traits` / `dependencies` configuration table
    pub async fn create_integration_with_configuration(
        &mut self,
        file_name: &str,
        source: &str,
        configuration: &HashMap<String, String>,
    ) -> Result<Integration> {
        let (name, extension) = split_file_name(file_name);

        let mut builder = IntegrationBuilder::with_settings(&self.settings);
        builder.name(name)?.source(source)?;
        if extension.is_some() {
            builder.source_name(file_name)?;
        }
        if let Some(traits) = configuration.get(TRAITS_KEY) {
            builder.traits(traits.as_str())?;
        }
        if let Some(dependencies) = configuration.get(DEPENDENCIES_KEY) {
            builder.dependencies(dependencies)?;
        }
        let integration = builder.build()?;

        CreateIntegrationAction::new(integration.clone())
            .execute(self.store.as_ref())
            .await?;
        self.remember(ResourceKind::Integration, integration.name());
        Ok(integration)
    }

    pub async fn create_custom_resource(&mut self, yaml: &str) -> Result<()> {
        let action = CreateResourceAction::from_yaml(yaml, &self.settings.namespace)?;
        action.execute(self.store.as_ref()).await?;
        self.created.push(CreatedResource {
            kind: action.kind(),
            namespace: action.namespace().to_string(),
            name: action.name().to_string(),
        });
        Ok(())
    }

    pub async fn delete_integration(&mut self, name: &str) -> Result<()> {
        self.delete(ResourceKind::Integration, name).await
    }

    /// Delete a resource of the kind named by `kind` (kind, plural or type string)
    pub async fn delete_custom_resource(&mut self, kind: &str, name: &str) -> Result<()> {
        self.delete(ResourceKind::resolve(kind)?, name).await
    }

    /// Wait for the `Ready` condition on `name` (`Kind/name` or plain name) of
    /// the given kind or resource type string
    pub async fn resource_should_be_ready(&self, name: &str, resource_type: &str) -> Result<()> {
        self.verify(
            ResourceKind::resolve(resource_type)?,
            ResourceSelector::Name(name.to_string()),
            Expectation::Condition(READY_CONDITION.to_string()),
        )
        .await
    }

    /// Wait for the `Ready` condition on `name`, typed by a configuration table
    pub async fn resource_should_be_ready_with_configuration(
        &self,
        name: &str,
        configuration: &HashMap<String, String>,
    ) -> Result<()> {
        let mut configuration = configuration.clone();
        configuration.insert("name".to_string(), name.to_string());
        self.wait_for_condition(READY_CONDITION, &configuration).await
    }

    /// Wait for the `Ready` condition on a resource labeled `label=value`
    pub async fn resource_labeled_should_be_ready(
        &self,
        resource_type: &str,
        label: &str,
        value: &str,
    ) -> Result<()> {
        self.verify(
            ResourceKind::resolve(resource_type)?,
            ResourceSelector::Label {
                key: label.to_string(),
                value: value.to_string(),
            },
            Expectation::Condition(READY_CONDITION.to_string()),
        )
        .await
    }

    pub async fn integration_should_be_running(&self, name: &str) -> Result<()> {
        self.integration_should_be_in_phase(name, RUNNING_PHASE).await
    }

    pub async fn integration_should_be_in_phase(&self, name: &str, phase: &str) -> Result<()> {
        self.verify(
            ResourceKind::Integration,
            ResourceSelector::Name(name.to_string()),
            Expectation::Phase(phase.to_string()),
        )
        .await
    }

    /// Wait for `condition` on the resource described by a configuration table
    /// (`kind`, `apiVersion`, `name` or `label`, ...)
    pub async fn wait_for_condition(
        &self,
        condition: &str,
        configuration: &HashMap<String, String>,
    ) -> Result<()> {
        let query = CustomResourceQuery::from_configuration(configuration)?;
        let kind = match ResourceKind::lookup(&query.resource_type.resource_type) {
            Some(kind) => kind,
            None => ResourceKind::resolve(&query.resource_type.kind)?,
        };

        self.verify(kind, query.selector, Expectation::Condition(condition.to_string()))
            .await
    }

    /// Remove everything created in this scenario, newest first, when auto
    /// removal is enabled
    ///
    /// A resource leaves the list only once its delete succeeded, so a failed
    /// cleanup can be retried.
    pub async fn finish_scenario(&mut self) -> Result<()> {
        if !self.settings.auto_remove_resources {
            debug!(
                "Keeping {} resources, auto removal is disabled",
                self.created.len()
            );
            self.created.clear();
            return Ok(());
        }

        let mut removed = 0;
        while let Some(resource) = self.created.last() {
            DeleteResourceAction::new(resource.kind, resource.namespace.clone(), resource.name.clone())
                .execute(self.store.as_ref())
                .await?;
            self.created.pop();
            removed += 1;
        }
        info!("🧹 Removed {} resources after scenario", removed);
        Ok(())
    }

    async fn verify(
        &self,
        kind: ResourceKind,
        selector: ResourceSelector,
        expectation: Expectation,
    ) -> Result<()> {
        VerifyResourceAction::new(kind, self.settings.namespace.clone(), selector, expectation)
            .max_attempts(self.settings.max_attempts)
            .delay_between_attempts(self.settings.delay_between_attempts)
            .execute(self.store.as_ref())
            .await
    }

    /// Delete in the namespace the resource was created in, falling back to the
    /// current namespace for resources this scenario did not create
    async fn delete(&mut self, kind: ResourceKind, name: &str) -> Result<()> {
        let namespace = self
            .created
            .iter()
            .rev()
            .find(|r| r.kind == kind && r.name == name)
            .map(|r| r.namespace.clone())
            .unwrap_or_else(|| self.settings.namespace.clone());
        DeleteResourceAction::new(kind, namespace.clone(), name)
            .execute(self.store.as_ref())
            .await?;
        self.created
            .retain(|r| !(r.kind == kind && r.namespace == namespace && r.name == name));
        Ok(())
    }

    fn remember(&mut self, kind: ResourceKind, name: &str) {
        self.created.push(CreatedResource {
            kind,
            namespace: self.settings.namespace.clone(),
            name: name.to_string(),
        });
    }
}

/// Split `foo.groovy` into `("foo", Some("groovy"))`
fn split_file_name(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((name, extension)) if !name.is_empty() && !extension.is_empty() => {
            (name, Some(extension))
        }
        _ => (file_name, None),
    }
}
