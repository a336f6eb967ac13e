//! Integration trait parsing and merging
//!
//! Traits reach an integration from two places: an explicit comma separated
//! list (`quarkus.enabled=true,route.enabled=true`) and modeline comments in the
//! integration source. Both produce [`TraitToken`]s that are merged into one
//! [`TraitConfiguration`].

pub mod config;
pub mod modeline;
pub mod token;

pub use config::{PropertyMap, TraitConfiguration, TraitSpec, TraitValue};
pub use modeline::{Modeline, ModelineOption, MODELINE_TAG};
pub use token::{parse_trait_list, TraitToken};
