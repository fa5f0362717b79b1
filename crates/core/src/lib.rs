//! Configuration, normalization and assembly for the deployment script generator.
//!
//! Rendering of the individual sections lives in `azscript-azure`; this crate
//! owns everything around it: the flat configuration mapping, environment
//! substitution, the phase table with its shell-variable contract, and the
//! assembler producing the section registry.

pub mod assemble;
pub mod config;
pub mod contract;
pub mod defaults;
pub mod error;
pub mod normalize;
pub mod phase;
pub mod registry;
pub mod settings;

pub use assemble::{header, Assembler, FOOTER, TOOL_NAME};
pub use config::{ConfigValue, Environment, FlatMapping};
pub use error::{AssemblyError, ConfigError, ContractError, GenerateError};
pub use normalize::{normalize_name, normalize_tag, Normalized, Normalizer};
pub use phase::{Phase, COMPLETE_KEY};
pub use registry::SectionRegistry;
pub use settings::{check_required, Settings, REQUIRED_KEYS};
