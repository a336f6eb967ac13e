//! Nested trait configuration and merge rules

use super::token::TraitToken;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Property that toggles a trait; the only property coerced to a boolean
pub const ENABLED_PROPERTY: &str = "enabled";

/// Typed trait property value
///
/// Coercion only yields `Bool` and `Text`. `Integer` and `Other` hold values of
/// resources read back from a store, such as list or object properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    Bool(bool),
    Integer(i64),
    Text(String),
    Other(Value),
}

impl TraitValue {
    /// Coerce a raw token value for the given property.
    ///
    /// `enabled` accepts exactly `true` or `false` as a boolean. Everything else,
    /// numeric-looking text included, stays a string.
    pub fn coerce(property_name: &str, raw_value: &str) -> Self {
        if property_name == ENABLED_PROPERTY {
            match raw_value {
                "true" => return TraitValue::Bool(true),
                "false" => return TraitValue::Bool(false),
                _ => {}
            }
        }
        TraitValue::Text(raw_value.to_string())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TraitValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TraitValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for TraitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraitValue::Bool(value) => write!(f, "{}", value),
            TraitValue::Integer(value) => write!(f, "{}", value),
            TraitValue::Text(value) => f.write_str(value),
            TraitValue::Other(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for TraitValue {
    fn from(value: bool) -> Self {
        TraitValue::Bool(value)
    }
}

impl From<&str> for TraitValue {
    fn from(value: &str) -> Self {
        TraitValue::Text(value.to_string())
    }
}

/// Property name to value, in insertion order
pub type PropertyMap = IndexMap<String, TraitValue>;

/// Configuration block of one trait
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitSpec {
    #[serde(default)]
    pub configuration: PropertyMap,
}

/// Trait name to trait configuration, with last-write-wins merging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitConfiguration {
    traits: IndexMap<String, TraitSpec>,
}

impl TraitConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge token sources in priority order; later sources win on collisions
    pub fn merge<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = TraitToken>,
    {
        let mut config = Self::new();
        for source in sources {
            config.extend(source);
        }
        config
    }

    /// Write one token, replacing any earlier value for the same trait property.
    ///
    /// An earlier value that renders to the same text is kept as is, so a
    /// configuration survives replaying its own [`tokens`](Self::tokens).
    pub fn apply(&mut self, token: &TraitToken) {
        let properties = &mut self
            .traits
            .entry(token.trait_name().to_string())
            .or_default()
            .configuration;
        if let Some(existing) = properties.get(token.property_name()) {
            if existing.to_string() == token.raw_value() {
                return;
            }
        }

        let value = TraitValue::coerce(token.property_name(), token.raw_value());
        let previous = properties.insert(token.property_name().to_string(), value);

        if let Some(previous) = previous {
            debug!(
                trait_name = token.trait_name(),
                property = token.property_name(),
                "🔁 Overriding trait property value '{}'",
                previous
            );
        }
    }

    pub fn get(&self, trait_name: &str) -> Option<&PropertyMap> {
        self.traits.get(trait_name).map(|spec| &spec.configuration)
    }

    pub fn value(&self, trait_name: &str, property_name: &str) -> Option<&TraitValue> {
        self.get(trait_name)?.get(property_name)
    }

    pub fn contains_trait(&self, trait_name: &str) -> bool {
        self.traits.contains_key(trait_name)
    }

    /// Number of configured traits
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyMap)> {
        self.traits
            .iter()
            .map(|(name, spec)| (name.as_str(), &spec.configuration))
    }

    /// Flatten back into tokens, in insertion order
    pub fn tokens(&self) -> Vec<TraitToken> {
        self.iter()
            .flat_map(|(trait_name, properties)| {
                properties.iter().map(move |(property, value)| {
                    TraitToken::new(trait_name, property.as_str(), value.to_string())
                })
            })
            .collect()
    }
}

impl Extend<TraitToken> for TraitConfiguration {
    fn extend<T: IntoIterator<Item = TraitToken>>(&mut self, tokens: T) {
        for token in tokens {
            self.apply(&token);
        }
    }
}

impl<'a> Extend<&'a TraitToken> for TraitConfiguration {
    fn extend<T: IntoIterator<Item = &'a TraitToken>>(&mut self, tokens: T) {
        for token in tokens {
            self.apply(token);
        }
    }
}

impl FromIterator<TraitToken> for TraitConfiguration {
    fn from_iter<T: IntoIterator<Item = TraitToken>>(tokens: T) -> Self {
        let mut config = Self::new();
        config.extend(tokens);
        config
    }
}
