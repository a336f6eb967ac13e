//! camelk-steps - step glue for behavior driven Camel K integration tests
//!
//! This library turns integration sources and trait expressions into Camel K
//! `Integration` resources, submits them to a resource store, and verifies
//! that they reach the expected state.

pub mod actions;
pub mod config;
pub mod core;
pub mod error;
pub mod integration;
pub mod resources;
pub mod steps;
pub mod traits;

// Re-export commonly used types
pub use config::Settings;
pub use error::{AppError, Result};
pub use integration::{Integration, IntegrationBuilder};
pub use resources::{InMemoryResourceStore, ResourceKind, ResourceStore};
pub use steps::CamelKSteps;
pub use traits::{TraitConfiguration, TraitToken, TraitValue};
