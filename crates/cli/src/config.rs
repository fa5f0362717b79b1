//! Loading the flat configuration mapping from files and command-line overrides.

use anyhow::{Context, Result};
use azscript_core::config::ENVIRONMENT_KEY;
use azscript_core::{ConfigValue, Environment, FlatMapping};
use secrecy::ExposeSecret;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads a YAML or JSON mapping; `.age` files are decrypted with `age_ids` first.
pub fn load(path: &Path, age_ids: &[PathBuf]) -> Result<FlatMapping> {
    let mapping: FlatMapping = if path.extension().and_then(|s| s.to_str()) == Some("age") {
        if age_ids.is_empty() {
            anyhow::bail!("{} is encrypted; pass --age-identity", path.display());
        }
        let mut ids = Vec::new();
        for p in age_ids { ids.extend(azscript_crypto::load_identities(p)?); }
        let f = std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        let dec = azscript_crypto::decrypt_age_bytes(std::io::BufReader::new(f), &ids)
            .with_context(|| format!("decrypt {}", path.display()))?;
        serde_yaml::from_slice(dec.expose_secret()).with_context(|| format!("parse {}", path.display()))?
    } else {
        let raw = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        serde_yaml::from_slice(&raw).with_context(|| format!("parse {}", path.display()))?
    };
    debug!(path = %path.display(), keys = mapping.len(), "loaded configuration");
    Ok(mapping)
}

/// Parses `key=value`. The value is kept as text; numeric keys parse it when read,
/// so digit-only secrets keep their leading zeros.
pub fn parse_override(s: &str) -> Result<(String, ConfigValue), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), ConfigValue::Text(value.to_string())))
}

pub fn apply_overrides(mapping: &mut FlatMapping, env: Option<Environment>, sets: &[(String, ConfigValue)]) {
    if let Some(env) = env {
        mapping.insert(ENVIRONMENT_KEY, env.as_str());
    }
    for (k, v) in sets {
        mapping.insert(k.as_str(), v.clone());
    }
}
