//! BDD test harness using cucumber
//!
//! Runs the scenarios in `tests/features` against an in-memory resource store.
//! The "operator reports" steps play the part of the Camel K operator.

use camelk_steps::{
    AppError, CamelKSteps, InMemoryResourceStore, Integration, ResourceKind, ResourceStore,
    Settings, TraitValue,
};
use cucumber::{gherkin::Step, given, then, when, World};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, World)]
#[world(init = Self::new)]
pub struct CamelKWorld {
    store: Arc<InMemoryResourceStore>,
    steps: CamelKSteps,
    last_error: Option<AppError>,
}

impl CamelKWorld {
    fn new() -> Self {
        let store = Arc::new(InMemoryResourceStore::new());
        let settings = Settings {
            max_attempts: 3,
            delay_between_attempts: Duration::from_millis(10),
            ..Settings::default()
        };
        Self {
            steps: CamelKSteps::new(store.clone(), settings),
            store,
            last_error: None,
        }
    }

    fn namespace(&self) -> String {
        self.steps.settings().namespace.clone()
    }

    fn record<T>(&mut self, result: camelk_steps::Result<T>) {
        self.last_error = result.err();
    }

    async fn integration(&self, name: &str) -> Integration {
        let value = self
            .store
            .get(ResourceKind::Integration, &self.namespace(), name)
            .await
            .expect("store lookup")
            .unwrap_or_else(|| panic!("integration {} does not exist", name));
        Integration::from_value(value).expect("valid integration")
    }
}

fn docstring(step: &Step) -> String {
    step.docstring
        .as_deref()
        .expect("step needs a doc string")
        .trim()
        .to_string()
}

fn table(step: &Step) -> HashMap<String, String> {
    step.table
        .as_ref()
        .expect("step needs a data table")
        .rows
        .iter()
        .filter(|row| row.len() >= 2)
        .map(|row| (row[0].clone(), row[1].clone()))
        .collect()
}

#[given(regex = r"^Disable auto removal of Camel K resources$")]
async fn disable_auto_remove(world: &mut CamelKWorld) {
    world.steps.disable_auto_remove();
}

#[given(regex = r"^Camel K resource polling configuration$")]
async fn resource_polling(world: &mut CamelKWorld, step: &Step) {
    world
        .steps
        .configure_resource_polling(&table(step))
        .expect("valid polling configuration");
}

#[given(regex = r"^Camel K namespace ([^\s]+)$")]
async fn namespace(world: &mut CamelKWorld, namespace_name: String) {
    world.steps.set_namespace(namespace_name);
}

#[given(regex = r"^create Camel K integration ([a-z0-9.-]+)$")]
async fn create_integration(world: &mut CamelKWorld, step: &Step, file_name: String) {
    let source = docstring(step);
    let result = world.steps.create_integration(&file_name, &source).await;
    world.record(result);
}

#[given(regex = r"^create Camel K integration ([a-z0-9.-]+) with traits ([^\s]+)$")]
async fn create_integration_with_traits(
    world: &mut CamelKWorld,
    step: &Step,
    file_name: String,
    traits: String,
) {
    let source = docstring(step);
    let configuration = HashMap::from([("traits".to_string(), traits)]);
    let result = world
        .steps
        .create_integration_with_configuration(&file_name, &source, &configuration)
        .await;
    world.record(result);
}

#[given(regex = r"^create Camel K integration ([a-z0-9.-]+) with configuration$")]
async fn create_integration_with_configuration(
    world: &mut CamelKWorld,
    step: &Step,
    file_name: String,
) {
    let mut configuration = table(step);
    let source = configuration.remove("source").expect("configuration needs a source");
    let result = world
        .steps
        .create_integration_with_configuration(&file_name, &source, &configuration)
        .await;
    world.record(result);
}

#[given(regex = r"^create Camel K custom resource$")]
async fn create_custom_resource(world: &mut CamelKWorld, step: &Step) {
    let yaml = docstring(step);
    let result = world.steps.create_custom_resource(&yaml).await;
    world.record(result);
}

#[given(regex = r"^the operator reports Camel K integration ([a-z0-9-]+) in phase ([A-Za-z]+)$")]
async fn operator_sets_phase(world: &mut CamelKWorld, name: String, phase: String) {
    world
        .store
        .set_phase(ResourceKind::Integration, &world.namespace(), &name, &phase)
        .await
        .expect("integration exists");
}

#[given(regex = r"^the operator reports condition ([A-Za-z]+) on ([a-z.]+) ([a-z0-9-]+)$")]
async fn operator_sets_condition(world: &mut CamelKWorld, condition: String, kind: String, name: String) {
    let kind = ResourceKind::resolve(&kind).expect("known kind");
    world
        .store
        .set_condition(kind, &world.namespace(), &name, &condition, "True")
        .await
        .expect("resource exists");
}

#[when(regex = r"^delete Camel K integration ([a-z0-9-]+)$")]
async fn delete_integration(world: &mut CamelKWorld, name: String) {
    world
        .steps
        .delete_integration(&name)
        .await
        .expect("delete succeeds");
}

#[when(regex = r"^delete Camel K custom resource ([A-Za-z.]+) ([a-z0-9-]+)$")]
async fn delete_custom_resource(world: &mut CamelKWorld, kind: String, name: String) {
    world
        .steps
        .delete_custom_resource(&kind, &name)
        .await
        .expect("delete succeeds");
}

#[when(regex = r"^the scenario finishes$")]
async fn scenario_finishes(world: &mut CamelKWorld) {
    world
        .steps
        .finish_scenario()
        .await
        .expect("cleanup succeeds");
}

#[then(regex = r"^Camel K integration ([a-z0-9-]+) should be running$")]
async fn integration_should_be_running(world: &mut CamelKWorld, name: String) {
    world
        .steps
        .integration_should_be_running(&name)
        .await
        .expect("integration is running");
}

#[then(regex = r"^Camel K integration ([a-z0-9-]+) should not become running$")]
async fn integration_should_not_be_running(world: &mut CamelKWorld, name: String) {
    let result = world.steps.integration_should_be_running(&name).await;
    assert!(
        matches!(result, Err(AppError::Timeout { .. })),
        "expected a timeout, got {:?}",
        result
    );
}

#[then(regex = r"^wait for condition=([A-Za-z]+) on Camel K custom resource$")]
async fn wait_for_condition(world: &mut CamelKWorld, step: &Step, condition: String) {
    world
        .steps
        .wait_for_condition(&condition, &table(step))
        .await
        .expect("condition is met");
}

#[given(regex = r"^Camel K resource timeout is (\d+)(?: ms| milliseconds)$")]
async fn resource_timeout(world: &mut CamelKWorld, timeout: u64) {
    world.steps.configure_timeout(Duration::from_millis(timeout));
}

#[then(regex = r"^Camel K custom resource ([^\s]+) in ([^\s]+) should be ready$")]
async fn resource_should_be_ready(world: &mut CamelKWorld, name: String, resource_type: String) {
    world
        .steps
        .resource_should_be_ready(&name, &resource_type)
        .await
        .expect("resource is ready");
}

#[then(regex = r"^Camel K custom resource ([^\s]+) should be ready$")]
async fn resource_should_be_ready_with_configuration(
    world: &mut CamelKWorld,
    step: &Step,
    name: String,
) {
    world
        .steps
        .resource_should_be_ready_with_configuration(&name, &table(step))
        .await
        .expect("resource is ready");
}

#[then(regex = r"^Camel K custom resource ([^\s]+) labeled with ([^\s]+)=([^\s]+) should be ready$")]
async fn resource_labeled_should_be_ready(
    world: &mut CamelKWorld,
    resource_type: String,
    label: String,
    value: String,
) {
    world
        .steps
        .resource_labeled_should_be_ready(&resource_type, &label, &value)
        .await
        .expect("labeled resource is ready");
}

#[then(regex = r"^Camel K integration ([a-z0-9-]+) should have (\d+) properties in trait ([a-z0-9-]+)$")]
async fn trait_property_count(world: &mut CamelKWorld, name: String, count: usize, trait_name: String) {
    let integration = world.integration(&name).await;
    let properties = integration
        .traits()
        .get(&trait_name)
        .unwrap_or_else(|| panic!("trait {} is not configured", trait_name));
    assert_eq!(properties.len(), count);
}

#[then(regex = r"^Camel K integration ([a-z0-9-]+) should have trait property ([a-z0-9-]+)\.([a-z0-9-]+) set to (true|false)$")]
async fn boolean_trait_property(
    world: &mut CamelKWorld,
    name: String,
    trait_name: String,
    property: String,
    expected: bool,
) {
    let integration = world.integration(&name).await;
    assert_eq!(
        integration.traits().value(&trait_name, &property),
        Some(&TraitValue::Bool(expected))
    );
}

#[then(regex = r#"^Camel K integration ([a-z0-9-]+) should have trait property ([a-z0-9-]+)\.([a-z0-9-]+) set to "(.*)"$"#)]
async fn text_trait_property(
    world: &mut CamelKWorld,
    name: String,
    trait_name: String,
    property: String,
    expected: String,
) {
    let integration = world.integration(&name).await;
    assert_eq!(
        integration.traits().value(&trait_name, &property),
        Some(&TraitValue::Text(expected))
    );
}

#[then(regex = r"^Camel K integration ([a-z0-9-]+) should have source ([a-zA-Z0-9.-]+)$")]
async fn integration_source(world: &mut CamelKWorld, name: String, source_name: String) {
    let integration = world.integration(&name).await;
    assert_eq!(integration.spec().sources[0].name, source_name);
}

#[then(regex = r"^creating the integration should have failed with a malformed trait$")]
async fn malformed_trait(world: &mut CamelKWorld) {
    assert!(
        matches!(world.last_error, Some(AppError::MalformedTraitToken(_))),
        "expected a malformed trait error, got {:?}",
        world.last_error
    );
}

#[then(regex = r"^(\d+) Camel K resources? should exist$")]
async fn resource_count(world: &mut CamelKWorld, count: usize) {
    assert!(world.last_error.is_none(), "unexpected error {:?}", world.last_error);
    assert_eq!(world.store.len().await, count);
}

#[tokio::main]
async fn main() {
    CamelKWorld::cucumber()
        .max_concurrent_scenarios(1)
        .fail_on_skipped()
        .run_and_exit("tests/features")
        .await;
}
