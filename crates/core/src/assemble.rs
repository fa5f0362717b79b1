use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::config::Environment;
use crate::contract::verify_order;
use crate::error::AssemblyError;
use crate::phase::Phase;
use crate::registry::SectionRegistry;

pub const TOOL_NAME: &str = "azscript";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const FOOTER: &str = "echo \"Deployment completed successfully!\"\n";

pub fn header(env: Environment, generated_at: NaiveDateTime) -> String {
    format!(
        "#!/bin/bash\n# Azure ANPI Bot Deployment Script ({TOOL_NAME})\n# Generated on {}\n# For environment: {env}\n\n",
        generated_at.format(TIMESTAMP_FORMAT)
    )
}

#[derive(Debug, Clone, Copy)]
pub struct Assembler {
    env: Environment,
    generated_at: NaiveDateTime,
}

impl Assembler {
    pub fn new(env: Environment, generated_at: NaiveDateTime) -> Self { Self { env, generated_at } }

    /// Joins the rendered sections in `Phase::ASSEMBLY_ORDER` with nothing in
    /// between; sections carry their own trailing blank line. The map's own
    /// iteration order is irrelevant.
    pub fn assemble(&self, mut rendered: HashMap<Phase, String>) -> Result<SectionRegistry, AssemblyError> {
        verify_order(&Phase::ASSEMBLY_ORDER)?;

        let mut sections = BTreeMap::new();
        for phase in Phase::ALL {
            let text = rendered.remove(&phase).ok_or(AssemblyError::MissingSection(phase))?;
            sections.insert(phase, text);
        }

        let mut complete = header(self.env, self.generated_at);
        for phase in Phase::ASSEMBLY_ORDER {
            complete.push_str(&sections[&phase]);
        }
        complete.push_str(FOOTER);
        debug!(bytes = complete.len(), env = %self.env, "assembled deployment script");

        Ok(SectionRegistry { environment: self.env, generated_at: self.generated_at, sections, complete })
    }
}
