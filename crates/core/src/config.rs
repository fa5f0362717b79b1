use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Key holding the selected environment.
pub const ENVIRONMENT_KEY: &str = "environment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl ConfigValue {
    fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Integer(_) => "an integer",
            ConfigValue::Text(_) => "a string",
            ConfigValue::List(_) => "a list",
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self { ConfigValue::Text(s.to_string()) }
}
impl From<String> for ConfigValue {
    fn from(s: String) -> Self { ConfigValue::Text(s) }
}
impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self { ConfigValue::Integer(n) }
}
impl From<Vec<String>> for ConfigValue {
    fn from(v: Vec<String>) -> Self { ConfigValue::List(v) }
}

/// Flat key/value configuration as collected from a form or a config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlatMapping(BTreeMap<String, ConfigValue>);

impl FlatMapping {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> { self.0.remove(key) }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> { self.0.get(key) }

    pub fn contains_key(&self, key: &str) -> bool { self.0.contains_key(key) }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.0.keys().map(String::as_str) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    fn require(&self, key: &str) -> Result<&ConfigValue, ConfigError> {
        self.0.get(key).ok_or_else(|| ConfigError::missing(key))
    }

    pub fn text(&self, key: &str) -> Result<&str, ConfigError> {
        match self.require(key)? {
            ConfigValue::Text(s) => Ok(s),
            other => Err(ConfigError::WrongType { key: key.to_string(), expected: "a string", found: other.kind() }),
        }
    }

    /// Integers are accepted as-is; strings are accepted when they parse as one,
    /// since form layers frequently hand numbers over as text.
    pub fn integer(&self, key: &str) -> Result<i64, ConfigError> {
        match self.require(key)? {
            ConfigValue::Integer(n) => Ok(*n),
            ConfigValue::Text(s) => s.trim().parse().map_err(|_| ConfigError::WrongType {
                key: key.to_string(),
                expected: "an integer",
                found: "a non-numeric string",
            }),
            other => Err(ConfigError::WrongType { key: key.to_string(), expected: "an integer", found: other.kind() }),
        }
    }

    pub fn count(&self, key: &str) -> Result<u32, ConfigError> {
        let n = self.integer(key)?;
        u32::try_from(n).map_err(|_| ConfigError::WrongType {
            key: key.to_string(),
            expected: "a non-negative integer",
            found: "an out-of-range integer",
        })
    }

    /// A list either given natively or as a string holding a JSON array.
    pub fn string_list(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        match self.require(key)? {
            ConfigValue::List(items) => Ok(items.clone()),
            ConfigValue::Text(s) => serde_json::from_str::<Vec<String>>(s)
                .map_err(|e| ConfigError::InvalidOrigins { key: key.to_string(), reason: e.to_string() }),
            other => Err(ConfigError::WrongType { key: key.to_string(), expected: "a list of strings", found: other.kind() }),
        }
    }

    pub fn environment(&self) -> Result<Environment, ConfigError> {
        self.text(ENVIRONMENT_KEY)?.parse()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for FlatMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FlatMapping(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Test,
    #[serde(alias = "preprd")]
    Preprod,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 4] = [Environment::Dev, Environment::Test, Environment::Preprod, Environment::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Test => "test",
            Environment::Preprod => "preprod",
            Environment::Prod => "prod",
        }
    }

    /// `Dev`, `Test`, `Preprod`, `Prod`; used in tags and display names.
    pub fn capitalized(&self) -> &'static str {
        match self {
            Environment::Dev => "Dev",
            Environment::Test => "Test",
            Environment::Preprod => "Preprod",
            Environment::Prod => "Prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "test" => Ok(Environment::Test),
            "preprod" | "preprd" => Ok(Environment::Preprod),
            "prod" => Ok(Environment::Prod),
            _ => Err(ConfigError::UnknownEnvironment(s.to_string())),
        }
    }
}
