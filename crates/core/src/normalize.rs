//! Environment substitution for resource names and tags.
//!
//! Raw configuration is authored against the development environment: every
//! environment-scoped name embeds the literal `dev` (for example
//! `vnet-itz-dev-jpe-001`) and every tag embeds `Dev`. Normalization swaps those
//! tokens for the selected environment.

use tracing::warn;

use crate::config::{ConfigValue, Environment, FlatMapping};
use crate::error::ConfigError;

/// Lower-case token embedded in resource names.
pub const NAME_PLACEHOLDER: &str = "dev";
/// Capitalized token embedded in tags and display names.
pub const TAG_PLACEHOLDER: &str = "Dev";

/// Environment-scoped resource names.
pub const NAME_KEYS: &[&str] = &[
    "rg_name",
    "vnet_name",
    "subnet_name",
    "pip_name",
    "agw_name",
    "waf_name",
    "asp_name",
    "appinsights_name",
    "kv_name",
    "cosmos_name",
    "openai_name",
    "search_name",
    "app_name",
    "bot_name",
];

/// Human-readable values carrying the capitalized token.
pub const TAG_KEYS: &[&str] = &["anpi_tag", "shared_tag", "teams_app_name"];

pub fn normalize_name(value: &str, env: Environment) -> String {
    value.replace(NAME_PLACEHOLDER, env.as_str())
}

pub fn normalize_tag(value: &str, env: Environment) -> String {
    value.replace(TAG_PLACEHOLDER, env.capitalized())
}

/// Result of normalizing a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub environment: Environment,
    pub mapping: FlatMapping,
    /// Name keys whose value did not contain the placeholder and passed through untouched.
    pub unplaced: Vec<&'static str>,
}

impl Normalized {
    pub fn fully_placed(&self) -> bool { self.unplaced.is_empty() }
}

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    env: Environment,
}

impl Normalizer {
    pub fn new(env: Environment) -> Self { Self { env } }

    /// Returns a new mapping with all name and tag keys substituted. Every name
    /// and tag key must be present; nothing is defaulted here.
    pub fn normalize(&self, raw: &FlatMapping) -> Result<Normalized, ConfigError> {
        let mut mapping = raw.clone();
        let mut unplaced = Vec::new();

        for &key in NAME_KEYS {
            let value = raw.text(key)?;
            if !value.contains(NAME_PLACEHOLDER) {
                warn!(key, value, placeholder = NAME_PLACEHOLDER, "resource name has no environment placeholder; left unchanged");
                unplaced.push(key);
            }
            mapping.insert(key, ConfigValue::Text(normalize_name(value, self.env)));
        }
        for &key in TAG_KEYS {
            let value = raw.text(key)?;
            mapping.insert(key, ConfigValue::Text(normalize_tag(value, self.env)));
        }

        Ok(Normalized { environment: self.env, mapping, unplaced })
    }
}
