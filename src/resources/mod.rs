//! Custom resource kinds and the store they are submitted to

pub mod kind;
pub mod store;

pub use kind::{
    validate_resource_name, CustomResourceQuery, CustomResourceType, ResourceHeader,
    ResourceKind, ResourceMetadata, ResourceSelector,
};
pub use store::{resource_label, resource_name, InMemoryResourceStore, ResourceStore};
