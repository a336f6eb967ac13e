//! Actions executed against a [`ResourceStore`]
//!
//! Every supported resource kind shares the same create, delete and verify
//! capability. Integrations get a dedicated create action because they are
//! assembled by the [`IntegrationBuilder`](crate::integration::IntegrationBuilder).

use crate::error::{AppError, Result};
use crate::integration::{Integration, DEFAULT_NAMESPACE};
use crate::resources::{
    resource_label, ResourceHeader, ResourceKind, ResourceSelector, ResourceStore,
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Core trait that all resource actions implement
#[async_trait]
pub trait ResourceAction: Send + Sync {
    async fn execute(&self, store: &dyn ResourceStore) -> Result<()>;

    /// Short description used in logs
    fn describe(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct CreateIntegrationAction {
    integration: Integration,
}

impl CreateIntegrationAction {
    pub fn new(integration: Integration) -> Self {
        Self { integration }
    }

    pub fn integration(&self) -> &Integration {
        &self.integration
    }
}

#[async_trait]
impl ResourceAction for CreateIntegrationAction {
    async fn execute(&self, store: &dyn ResourceStore) -> Result<()> {
        let namespace = self.integration.namespace().unwrap_or(DEFAULT_NAMESPACE);
        store
            .create(ResourceKind::Integration, namespace, self.integration.to_value()?)
            .await?;
        info!("🚀 {}", self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Created integration '{}'", self.integration.name())
    }
}

/// Create an arbitrary custom resource of a known kind from its YAML document
#[derive(Debug, Clone)]
pub struct CreateResourceAction {
    kind: ResourceKind,
    namespace: String,
    name: String,
    content: Value,
}

impl CreateResourceAction {
    /// The document's own `metadata.namespace` wins over `namespace`
    pub fn from_yaml(yaml: &str, namespace: &str) -> Result<Self> {
        let header = ResourceHeader::from_yaml(yaml)?;
        let kind = header.resource_kind()?;
        let content: Value = serde_yaml::from_str(yaml)?;

        Ok(Self {
            kind,
            namespace: header
                .metadata
                .namespace
                .unwrap_or_else(|| namespace.to_string()),
            name: header.metadata.name,
            content,
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ResourceAction for CreateResourceAction {
    async fn execute(&self, store: &dyn ResourceStore) -> Result<()> {
        store
            .create(self.kind, &self.namespace, self.content.clone())
            .await?;
        info!("🚀 {}", self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Created {} '{}'", self.kind, self.name)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteResourceAction {
    kind: ResourceKind,
    namespace: String,
    name: String,
}

impl DeleteResourceAction {
    pub fn new(kind: ResourceKind, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

#[async_trait]
impl ResourceAction for DeleteResourceAction {
    async fn execute(&self, store: &dyn ResourceStore) -> Result<()> {
        if store.delete(self.kind, &self.namespace, &self.name).await? {
            info!("🗑️ {}", self.describe());
        } else {
            warn!(
                "⚠️ {} {}/{} was already gone",
                self.kind, self.namespace, self.name
            );
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Deleted {} '{}'", self.kind, self.name)
    }
}

/// State a verified resource has to reach
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// `status.phase` equals the value, ignoring case
    Phase(String),
    /// `status.conditions` holds an entry of this type with status `True`
    Condition(String),
}

impl Expectation {
    pub fn matches(&self, resource: &Value) -> bool {
        let Some(status) = resource.get("status") else {
            return false;
        };

        match self {
            Expectation::Phase(phase) => status
                .get("phase")
                .and_then(Value::as_str)
                .map(|current| current.eq_ignore_ascii_case(phase))
                .unwrap_or(false),
            Expectation::Condition(condition) => status
                .get("conditions")
                .and_then(Value::as_array)
                .map(|conditions| {
                    conditions.iter().any(|c| {
                        c.get("type").and_then(Value::as_str) == Some(condition.as_str())
                            && c.get("status").and_then(Value::as_str) == Some("True")
                    })
                })
                .unwrap_or(false),
        }
    }
}

/// Poll the store until a resource meets an [`Expectation`]
#[derive(Debug, Clone)]
pub struct VerifyResourceAction {
    kind: ResourceKind,
    namespace: String,
    selector: ResourceSelector,
    expectation: Expectation,
    max_attempts: u32,
    delay_between_attempts: Duration,
}

impl VerifyResourceAction {
    pub fn new(
        kind: ResourceKind,
        namespace: impl Into<String>,
        selector: ResourceSelector,
        expectation: Expectation,
    ) -> Self {
        Self {
            kind,
            namespace: namespace.into(),
            selector,
            expectation,
            max_attempts: crate::config::DEFAULT_MAX_ATTEMPTS,
            delay_between_attempts: Duration::from_millis(
                crate::config::DEFAULT_DELAY_BETWEEN_ATTEMPTS_MS,
            ),
        }
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn delay_between_attempts(mut self, delay: Duration) -> Self {
        self.delay_between_attempts = delay;
        self
    }

    async fn candidates(&self, store: &dyn ResourceStore) -> Result<Vec<Value>> {
        match &self.selector {
            ResourceSelector::Name(name) => {
                // accept `Kind/name` as produced by configuration tables
                let name = name.rsplit('/').next().unwrap_or(name.as_str());
                Ok(store
                    .get(self.kind, &self.namespace, name)
                    .await?
                    .into_iter()
                    .collect())
            }
            ResourceSelector::Label { key, value } => Ok(store
                .list(self.kind, &self.namespace)
                .await?
                .into_iter()
                .filter(|resource| resource_label(resource, key) == Some(value.as_str()))
                .collect()),
        }
    }

    fn target(&self) -> String {
        match &self.selector {
            ResourceSelector::Name(name) => format!("{} '{}'", self.kind, name),
            ResourceSelector::Label { key, value } => {
                format!("{} labeled with {}={}", self.kind, key, value)
            }
        }
    }
}

#[async_trait]
impl ResourceAction for VerifyResourceAction {
    async fn execute(&self, store: &dyn ResourceStore) -> Result<()> {
        for attempt in 1..=self.max_attempts {
            let candidates = self.candidates(store).await?;
            if candidates.iter().any(|r| self.expectation.matches(r)) {
                info!("✅ {}", self.describe());
                return Ok(());
            }

            debug!(
                "⏳ {} not yet in state {:?} (attempt {}/{})",
                self.target(),
                self.expectation,
                attempt,
                self.max_attempts
            );
            if attempt < self.max_attempts {
                tokio::time::sleep(self.delay_between_attempts).await;
            }
        }

        warn!("❌ Gave up waiting for {}", self.target());
        Err(AppError::Timeout {
            attempts: self.max_attempts,
            message: format!("{} did not reach {:?}", self.target(), self.expectation),
        })
    }

    fn describe(&self) -> String {
        format!("Verified {} reached {:?}", self.target(), self.expectation)
    }
}
