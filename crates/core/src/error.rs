use thiserror::Error;

use crate::phase::Phase;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing configuration key '{key}'")]
    MissingKey { key: String },

    #[error("configuration key '{key}' must be {expected}, found {found}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown environment '{0}'; expected one of dev, test, preprod, prod")]
    UnknownEnvironment(String),

    #[error("configuration key '{key}' is not a JSON array of strings: {reason}")]
    InvalidOrigins { key: String, reason: String },
}

impl ConfigError {
    pub fn missing(key: &str) -> Self {
        ConfigError::MissingKey { key: key.to_string() }
    }

    /// The configuration key the error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::MissingKey { key }
            | ConfigError::WrongType { key, .. }
            | ConfigError::InvalidOrigins { key, .. } => Some(key),
            ConfigError::UnknownEnvironment(_) => None,
        }
    }
}

/// Static violations of the cross-phase shell variable contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("phase {phase} consumes ${var} but no phase produces it")]
    Unproduced { phase: Phase, var: String },

    #[error("${var} is produced by both {first} and {second}")]
    DuplicateProducer {
        var: String,
        first: Phase,
        second: Phase,
    },

    #[error("dependency cycle detected between phases")]
    Cycle,

    #[error("phase {consumer} consumes ${var} from {producer}, which runs later")]
    OutOfOrder {
        var: String,
        producer: Phase,
        consumer: Phase,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("section '{0}' was not rendered")]
    MissingSection(Phase),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}
