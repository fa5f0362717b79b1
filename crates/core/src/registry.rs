use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use crate::config::Environment;
use crate::phase::{Phase, COMPLETE_KEY};

/// Output of one generation run: every phase's text plus the assembled script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRegistry {
    pub(crate) environment: Environment,
    pub(crate) generated_at: NaiveDateTime,
    pub(crate) sections: BTreeMap<Phase, String>,
    pub(crate) complete: String,
}

impl SectionRegistry {
    pub fn environment(&self) -> Environment { self.environment }

    pub fn generated_at(&self) -> NaiveDateTime { self.generated_at }

    pub fn section(&self, phase: Phase) -> &str {
        self.sections.get(&phase).map(String::as_str).unwrap_or_default()
    }

    pub fn complete(&self) -> &str { &self.complete }

    /// Looks up a phase key or `complete_script`.
    pub fn get(&self, key: &str) -> Option<&str> {
        if key == COMPLETE_KEY {
            return Some(&self.complete);
        }
        key.parse::<Phase>().ok().map(|p| self.section(p))
    }

    /// All entries in registry order, `complete_script` last.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Phase::ALL
            .into_iter()
            .map(move |p| (p.key(), self.section(p)))
            .chain(std::iter::once((COMPLETE_KEY, self.complete.as_str())))
    }

    pub fn keys() -> impl Iterator<Item = &'static str> {
        Phase::ALL.into_iter().map(|p| p.key()).chain(std::iter::once(COMPLETE_KEY))
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }
}
