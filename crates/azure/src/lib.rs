//! Azure CLI rendering of the deployment phases.
//!
//! [`generate`] is the entry point: it validates and normalizes a flat
//! configuration, renders every section and assembles the registry.

pub mod sections;
pub mod shell;

use azscript_core::{check_required, Assembler, FlatMapping, GenerateError, Normalized, Normalizer, SectionRegistry, Settings};
use chrono::NaiveDateTime;
use tracing::instrument;

pub use sections::{render_phase, render_sections};

/// Registry together with the normalized view it was rendered from.
#[derive(Debug, Clone)]
pub struct Generated {
    pub registry: SectionRegistry,
    pub normalized: Normalized,
}

pub fn generate(config: &FlatMapping, generated_at: NaiveDateTime) -> Result<SectionRegistry, GenerateError> {
    generate_with_report(config, generated_at).map(|g| g.registry)
}

/// Like [`generate`], also returning which name fields kept their raw value.
#[instrument(skip_all, fields(env = tracing::field::Empty))]
pub fn generate_with_report(config: &FlatMapping, generated_at: NaiveDateTime) -> Result<Generated, GenerateError> {
    check_required(config)?;
    let env = config.environment()?;
    tracing::Span::current().record("env", env.as_str());

    let normalized = Normalizer::new(env).normalize(config)?;
    let settings = Settings::from_normalized(&normalized)?;
    let registry = Assembler::new(env, generated_at).assemble(render_sections(&settings))?;
    Ok(Generated { registry, normalized })
}
