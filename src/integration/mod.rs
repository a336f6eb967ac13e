pub mod builder;
pub mod model;

pub use builder::{IntegrationBuilder, DEFAULT_NAMESPACE, DEFAULT_SOURCE_TYPE};
pub use model::{Integration, IntegrationSpec, IntegrationStatus, SourceSpec};
