//! Resource store capability
//!
//! The steps never talk to a cluster directly. Everything goes through a
//! [`ResourceStore`], keyed by kind, namespace and name.

use super::kind::ResourceKind;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::RwLock;
use tracing::debug;

/// Core trait that all resource stores must implement
#[async_trait]
pub trait ResourceStore: Send + Sync + fmt::Debug {
    /// Store a new resource; the name is read from `metadata.name`
    async fn create(&self, kind: ResourceKind, namespace: &str, resource: Value) -> Result<()>;

    async fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<Option<Value>>;

    /// All resources of a kind in a namespace, ordered by name
    async fn list(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<Value>>;

    /// Remove a resource; returns whether it existed
    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<bool>;
}

/// Read `metadata.name` from a resource document
pub fn resource_name(resource: &Value) -> Result<&str> {
    resource
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::ValidationError("Resource is missing metadata.name".to_string()))
}

/// Read `metadata.labels[key]` from a resource document
pub fn resource_label<'a>(resource: &'a Value, key: &str) -> Option<&'a str> {
    resource
        .get("metadata")?
        .get("labels")?
        .get(key)?
        .as_str()
}

type ResourceKey = (ResourceKind, String, String);

/// Store backed by an in-process map, used in tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryResourceStore {
    resources: RwLock<BTreeMap<ResourceKey, Value>>,
}

impl InMemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.resources.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.resources.read().await.is_empty()
    }

    /// Set `status.phase`, standing in for the operator reconciling the resource
    pub async fn set_phase(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        phase: &str,
    ) -> Result<()> {
        self.update_status(kind, namespace, name, |status| {
            status.insert("phase".to_string(), json!(phase));
        })
        .await
    }

    /// Add or replace a `status.conditions` entry
    pub async fn set_condition(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        condition: &str,
        condition_status: &str,
    ) -> Result<()> {
        self.update_status(kind, namespace, name, |status| {
            let conditions = status
                .entry("conditions")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(conditions) = conditions {
                conditions.retain(|c| c.get("type").and_then(Value::as_str) != Some(condition));
                conditions.push(json!({ "type": condition, "status": condition_status }));
            }
        })
        .await
    }

    async fn update_status<F>(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        update: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut serde_json::Map<String, Value>),
    {
        let mut resources = self.resources.write().await;
        let resource = resources
            .get_mut(&(kind, namespace.to_string(), name.to_string()))
            .ok_or_else(|| {
                AppError::ResourceNotFound(format!("{} {}/{}", kind, namespace, name))
            })?;

        let object = resource.as_object_mut().ok_or_else(|| {
            AppError::ValidationError(format!("{} {} is not an object", kind, name))
        })?;
        let status = object
            .entry("status")
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if !status.is_object() {
            *status = Value::Object(serde_json::Map::new());
        }
        if let Value::Object(status) = status {
            update(status);
        }

        Ok(())
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn create(&self, kind: ResourceKind, namespace: &str, resource: Value) -> Result<()> {
        let name = resource_name(&resource)?.to_string();
        let key = (kind, namespace.to_string(), name);

        let mut resources = self.resources.write().await;
        if resources.contains_key(&key) {
            return Err(AppError::ResourceAlreadyExists(format!(
                "{} {}/{}",
                kind, namespace, key.2
            )));
        }

        debug!("🗂️ Storing {} {}/{}", kind, namespace, key.2);
        resources.insert(key, resource);
        Ok(())
    }

    async fn get(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<Option<Value>> {
        let resources = self.resources.read().await;
        Ok(resources
            .get(&(kind, namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn list(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<Value>> {
        let resources = self.resources.read().await;
        Ok(resources
            .iter()
            .filter(|((k, ns, _), _)| *k == kind && ns == namespace)
            .map(|(_, resource)| resource.clone())
            .collect())
    }

    async fn delete(&self, kind: ResourceKind, namespace: &str, name: &str) -> Result<bool> {
        let mut resources = self.resources.write().await;
        Ok(resources
            .remove(&(kind, namespace.to_string(), name.to_string()))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(name: &str) -> Value {
        json!({
            "apiVersion": "camel.apache.org/v1",
            "kind": "Integration",
            "metadata": { "name": name, "labels": { "app": "demo" } }
        })
    }

    #[tokio::test]
    async fn test_create_get_delete() {
        let store = InMemoryResourceStore::new();
        store
            .create(ResourceKind::Integration, "default", resource("foo"))
            .await
            .unwrap();

        let stored = store
            .get(ResourceKind::Integration, "default", "foo")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resource_label(&stored, "app"), Some("demo"));

        // same name in another namespace or kind is a different resource
        assert!(store
            .get(ResourceKind::Integration, "other", "foo")
            .await
            .unwrap()
            .is_none());
        assert!(store
            .get(ResourceKind::Kamelet, "default", "foo")
            .await
            .unwrap()
            .is_none());

        assert!(store.delete(ResourceKind::Integration, "default", "foo").await.unwrap());
        assert!(!store.delete(ResourceKind::Integration, "default", "foo").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected() {
        let store = InMemoryResourceStore::new();
        store
            .create(ResourceKind::Integration, "default", resource("foo"))
            .await
            .unwrap();

        let result = store
            .create(ResourceKind::Integration, "default", resource("foo"))
            .await;
        assert!(matches!(result, Err(AppError::ResourceAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_missing_name_is_rejected() {
        let store = InMemoryResourceStore::new();
        let result = store
            .create(ResourceKind::Integration, "default", json!({ "metadata": {} }))
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_name() {
        let store = InMemoryResourceStore::new();
        for name in ["b", "a", "c"] {
            store
                .create(ResourceKind::Integration, "default", resource(name))
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .list(ResourceKind::Integration, "default")
            .await
            .unwrap()
            .iter()
            .map(|r| resource_name(r).unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_status_updates() {
        let store = InMemoryResourceStore::new();
        store
            .create(ResourceKind::Integration, "default", resource("foo"))
            .await
            .unwrap();

        store
            .set_phase(ResourceKind::Integration, "default", "foo", "Running")
            .await
            .unwrap();
        store
            .set_condition(ResourceKind::Integration, "default", "foo", "Ready", "False")
            .await
            .unwrap();
        store
            .set_condition(ResourceKind::Integration, "default", "foo", "Ready", "True")
            .await
            .unwrap();

        let stored = store
            .get(ResourceKind::Integration, "default", "foo")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.pointer("/status/phase"), Some(&json!("Running")));
        assert_eq!(
            stored.pointer("/status/conditions"),
            Some(&json!([{ "type": "Ready", "status": "True" }]))
        );

        let missing = store
            .set_phase(ResourceKind::Integration, "default", "bar", "Running")
            .await;
        assert!(matches!(missing, Err(AppError::ResourceNotFound(_))));
    }
}
