//! Writing a generated registry to disk and checking the host can run it.

use anyhow::{Context, Result};
use azscript_core::{Phase, SectionRegistry};
use serde_json::{json, Value as Json};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TIMESTAMP_FORMAT: &str = azscript_core::assemble::TIMESTAMP_FORMAT;

/// Writes `<key>.sh` for every registry entry into `out`, returning the paths in registry order.
pub fn write_registry(reg: &SectionRegistry, out: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out).with_context(|| format!("create {}", out.display()))?;
    let mut written = Vec::new();
    for (key, text) in reg.entries() {
        let path = out.join(format!("{key}.sh"));
        std::fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
        make_executable(&path)?;
        written.push(path);
    }
    info!(dir = %out.display(), files = written.len(), "wrote deployment scripts");
    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> { Ok(()) }

/// One `## Title` heading with a fenced bash block per phase, in registry order.
pub fn render_markdown(reg: &SectionRegistry) -> String {
    let mut md = String::new();
    writeln!(md, "# Azure ANPI Bot Deployment ({})\n", reg.environment()).ok();
    writeln!(md, "Generated on {}.\n", reg.generated_at().format(TIMESTAMP_FORMAT)).ok();
    for phase in Phase::ALL {
        let text = reg.section(phase).trim_end_matches('\n');
        writeln!(md, "## {}\n\n```bash\n{text}\n```\n", phase.title()).ok();
    }
    md
}

pub fn to_json(reg: &SectionRegistry) -> Json {
    json!({
        "environment": reg.environment().as_str(),
        "generated_at": reg.generated_at().format(TIMESTAMP_FORMAT).to_string(),
        "sections": reg.to_map(),
    })
}

pub fn write_markdown(reg: &SectionRegistry, path: &Path) -> Result<()> {
    std::fs::write(path, render_markdown(reg)).with_context(|| format!("write {}", path.display()))
}

pub fn write_json(reg: &SectionRegistry, path: &Path) -> Result<()> {
    let text = serde_json::to_string_pretty(&to_json(reg))?;
    std::fs::write(path, text).with_context(|| format!("write {}", path.display()))
}

/// Programs the generated script needs on `PATH`.
pub const REQUIRED_TOOLS: &[&str] = &["bash", "az"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: &'static str,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn found(&self) -> bool { self.path.is_some() }
}

pub fn preflight() -> Vec<ToolStatus> {
    REQUIRED_TOOLS.iter().map(|&name| ToolStatus { name, path: which::which(name).ok() }).collect()
}

/// Like [`preflight`] but fails naming every missing tool.
pub fn require_tools() -> Result<Vec<ToolStatus>> {
    let tools = preflight();
    let missing: Vec<_> = tools.iter().filter(|t| !t.found()).map(|t| t.name).collect();
    if !missing.is_empty() {
        anyhow::bail!("not found in PATH: {}", missing.join(", "));
    }
    Ok(tools)
}
