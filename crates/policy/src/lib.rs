use anyhow::Result;
use azscript_core::{Normalized, Phase, SectionRegistry};
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

static ASSIGNMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([A-Z][A-Z0-9_]*)=").expect("assignment regex is valid"));
static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^\\])\$\{?([A-Z][A-Z0-9_]*)").expect("reference regex is valid"));

/// Generation-time checks layered over the core pipeline.
pub struct Policy { pub strict_placeholders: bool }

impl Policy {
    pub fn new(strict_placeholders: bool) -> Self { Self { strict_placeholders } }

    /// Name fields that kept their raw value are an error under the strict policy.
    pub fn check_placeholders(&self, n: &Normalized) -> Result<()> {
        if n.fully_placed() {
            return Ok(());
        }
        if self.strict_placeholders {
            anyhow::bail!(
                "Policy: resource names without the 'dev' placeholder would not change with the environment: {}",
                n.unplaced.join(", ")
            );
        }
        warn!(keys = ?n.unplaced, env = %n.environment, "resource names are shared across environments");
        Ok(())
    }

    /// Fails when any section's shell variables disagree with its phase declaration.
    pub fn check_registry(&self, reg: &SectionRegistry) -> Result<()> {
        let findings = lint_registry(reg);
        if findings.is_empty() {
            return Ok(());
        }
        let lines: Vec<String> = findings.iter().map(ToString::to_string).collect();
        anyhow::bail!("Policy: shell variable contract violated:\n  {}", lines.join("\n  "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FindingKind {
    /// Read without a local assignment or a declared input.
    UndeclaredInput,
    /// Assigned without being declared as an output.
    UndeclaredOutput,
    /// Declared as an output but never assigned.
    MissingOutput,
    /// Declared as an input but never read.
    UnusedInput,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Finding {
    pub phase: Phase,
    pub var: String,
    pub kind: FindingKind,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            FindingKind::UndeclaredInput => "reads undeclared",
            FindingKind::UndeclaredOutput => "assigns undeclared",
            FindingKind::MissingOutput => "never assigns declared",
            FindingKind::UnusedInput => "never reads declared",
        };
        write!(f, "{} {what} ${}", self.phase, self.var)
    }
}

/// Upper-case shell variables a section assigns and reads.
///
/// Comments and quoted heredoc bodies are skipped. Lines continuing a previous
/// `\`-terminated line are command arguments, so `NAME=` there is not an assignment.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShellVars {
    pub assigned: BTreeSet<String>,
    pub referenced: BTreeSet<String>,
}

pub fn scan(text: &str) -> ShellVars {
    let mut vars = ShellVars::default();
    let mut in_heredoc = false;
    let mut continued = false;

    for line in text.lines() {
        if in_heredoc {
            in_heredoc = line.trim() != "EOF";
            continue;
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            continued = false;
            continue;
        }
        if !continued {
            if let Some(c) = ASSIGNMENT.captures(line) {
                vars.assigned.insert(c[1].to_string());
            }
        }
        for c in REFERENCE.captures_iter(line) {
            vars.referenced.insert(c[1].to_string());
        }
        in_heredoc = line.contains("<< 'EOF'");
        continued = line.ends_with('\\');
    }
    vars
}

pub fn lint_section(phase: Phase, text: &str) -> Vec<Finding> {
    let vars = scan(text);
    let produces: BTreeSet<&str> = phase.produces().iter().copied().collect();
    let consumes: BTreeSet<&str> = phase.consumes().iter().copied().collect();
    let finding = |var: &str, kind: FindingKind| Finding { phase, var: var.to_string(), kind };

    let mut out = Vec::new();
    for v in &vars.referenced {
        if !vars.assigned.contains(v) && !consumes.contains(v.as_str()) {
            out.push(finding(v.as_str(), FindingKind::UndeclaredInput));
        }
    }
    for v in &vars.assigned {
        if !produces.contains(v.as_str()) {
            out.push(finding(v.as_str(), FindingKind::UndeclaredOutput));
        }
    }
    for v in &produces {
        if !vars.assigned.contains(*v) {
            out.push(finding(*v, FindingKind::MissingOutput));
        }
    }
    for v in &consumes {
        if !vars.referenced.contains(*v) {
            out.push(finding(*v, FindingKind::UnusedInput));
        }
    }
    out
}

pub fn lint_registry(reg: &SectionRegistry) -> Vec<Finding> {
    Phase::ALL.into_iter().flat_map(|p| lint_section(p, reg.section(p))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use azscript_core::{Environment, FlatMapping};

    #[test]
    fn scan_skips_continuations_comments_and_heredocs() {
        let text = "# uses $NOT_ME\n\
                    APP_URL=\"x\"\n\
                    az webapp config appsettings set \\\n  \
                    SCM_ENABLED=true \\\n  \
                    Env=\"$ENVIRONMENT\"\n\
                    cat > /tmp/a << 'EOF'\n\
                    HIDDEN=$ALSO_HIDDEN\n\
                    EOF\n\
                    echo \"${APP_URL} \\$ESCAPED\"\n";
        let vars = scan(text);
        assert_eq!(vars.assigned, BTreeSet::from(["APP_URL".to_string()]));
        assert_eq!(vars.referenced, BTreeSet::from(["APP_URL".to_string(), "ENVIRONMENT".to_string()]));
    }

    #[test]
    fn reports_each_kind() {
        // TeamsIntegration produces TEAMS_APP_ID and TEAMS_APP_SECRET and reads RG_NAME.
        let text = "TEAMS_APP_ID=1\nEXTRA=2\necho \"$TEAMS_APP_ID $LOCATION\"\n";
        let mut kinds: Vec<_> = lint_section(Phase::TeamsIntegration, text).into_iter().map(|f| (f.var, f.kind)).collect();
        kinds.sort();
        assert_eq!(
            kinds,
            vec![
                ("EXTRA".to_string(), FindingKind::UndeclaredOutput),
                ("LOCATION".to_string(), FindingKind::UndeclaredInput),
                ("RG_NAME".to_string(), FindingKind::UnusedInput),
                ("TEAMS_APP_SECRET".to_string(), FindingKind::MissingOutput),
            ]
        );
    }

    fn normalized(unplaced: Vec<&'static str>) -> Normalized {
        Normalized { environment: Environment::Prod, mapping: FlatMapping::new(), unplaced }
    }

    #[test]
    fn placeholder_policy() {
        assert!(Policy::new(true).check_placeholders(&normalized(vec![])).is_ok());
        assert!(Policy::new(false).check_placeholders(&normalized(vec!["rg_name"])).is_ok());
        let err = Policy::new(true).check_placeholders(&normalized(vec!["rg_name", "kv_name"])).unwrap_err();
        assert!(err.to_string().contains("rg_name, kv_name"));
    }
}
