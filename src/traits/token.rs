//! Trait token parsing
//!
//! A trait token has the form `trait.property=value`. The value is everything
//! after the first `=` and may itself contain `=` characters.

use crate::error::{AppError, Result};
use std::fmt;
use tracing::debug;

/// One `trait.property=value` fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraitToken {
    trait_name: String,
    property_name: String,
    raw_value: String,
}

impl TraitToken {
    pub fn new(
        trait_name: impl Into<String>,
        property_name: impl Into<String>,
        raw_value: impl Into<String>,
    ) -> Self {
        Self {
            trait_name: trait_name.into(),
            property_name: property_name.into(),
            raw_value: raw_value.into(),
        }
    }

    /// Parse a single `trait.property=value` expression
    pub fn parse(expression: &str) -> Result<Self> {
        let (key, value) = expression.split_once('=').ok_or_else(|| {
            AppError::MalformedTraitToken(format!(
                "'{}' is missing the '=' between property and value",
                expression
            ))
        })?;

        let (trait_name, property_name) = key.split_once('.').ok_or_else(|| {
            AppError::MalformedTraitToken(format!(
                "'{}' is missing the '.' between trait and property",
                expression
            ))
        })?;

        if property_name.contains('.') {
            return Err(AppError::MalformedTraitToken(format!(
                "'{}' must contain exactly one '.' before '='",
                expression
            )));
        }

        if trait_name.is_empty() || property_name.is_empty() {
            return Err(AppError::MalformedTraitToken(format!(
                "'{}' has an empty trait or property name",
                expression
            )));
        }

        Ok(Self::new(trait_name, property_name, value))
    }

    pub fn trait_name(&self) -> &str {
        &self.trait_name
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }
}

impl fmt::Display for TraitToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}={}", self.trait_name, self.property_name, self.raw_value)
    }
}

/// Parse a comma separated list of trait tokens, skipping blank segments
pub fn parse_trait_list(traits: &str) -> Result<Vec<TraitToken>> {
    let tokens = traits
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(TraitToken::parse)
        .collect::<Result<Vec<_>>>()?;

    debug!("🔍 Parsed {} trait tokens from explicit trait list", tokens.len());
    Ok(tokens)
}
