//! Modeline directive extraction
//!
//! Sources may declare configuration in comment lines such as
//!
//! ```text
//! // camel-k: trait=quarkus.enabled=true dependency=camel:jackson
//! ```
//!
//! The extractor only reads those lines. It never strips them from the source.

use super::token::TraitToken;
use crate::error::Result;
use tracing::debug;

/// Tag that marks a comment line as a modeline directive
pub const MODELINE_TAG: &str = "camel-k:";

const COMMENT_PREFIXES: [&str; 2] = ["//", "#"];

/// A single `option=value` entry of a modeline directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelineOption<'a> {
    pub name: &'a str,
    pub value: &'a str,
}

/// Read-only view over source text; every iterator starts from the first line
#[derive(Debug, Clone, Copy)]
pub struct Modeline<'a> {
    source: &'a str,
}

impl<'a> Modeline<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// All directive options in line order
    pub fn options(&self) -> impl Iterator<Item = ModelineOption<'a>> + 'a {
        self.source
            .lines()
            .filter_map(directive_body)
            .flat_map(str::split_whitespace)
            .filter_map(|entry| match entry.split_once('=') {
                Some((name, value)) => Some(ModelineOption { name, value }),
                None => {
                    debug!("Ignoring modeline entry without value: {}", entry);
                    None
                }
            })
    }

    /// Trait tokens declared with `trait=` options
    pub fn traits(&self) -> impl Iterator<Item = Result<TraitToken>> + 'a {
        self.options_named("trait").map(TraitToken::parse)
    }

    /// Dependencies declared with `dependency=` options
    pub fn dependencies(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.options_named("dependency")
    }

    fn options_named(&self, name: &'static str) -> impl Iterator<Item = &'a str> + 'a {
        self.options()
            .filter(move |option| option.name == name)
            .map(|option| option.value)
    }
}

/// Returns the text after the tag when `line` is a modeline directive
fn directive_body(line: &str) -> Option<&str> {
    let line = line.trim_start();
    let comment = COMMENT_PREFIXES
        .iter()
        .find_map(|prefix| line.strip_prefix(prefix))?;
    comment.trim_start().strip_prefix(MODELINE_TAG)
}
