//! One module per deployment phase. Each renders from a small parameter
//! struct borrowed out of [`Settings`] and never fails.

pub mod api_management;
pub mod app_service;
pub mod bot_service;
pub mod data_ai;
pub mod environment_vars;
pub mod networking;
pub mod resource_group;
pub mod teams;
pub mod verification;
pub mod web_app;

use std::collections::HashMap;

use azscript_core::{Phase, Settings};
use tracing::debug;

pub fn render_phase(phase: Phase, s: &Settings) -> String {
    match phase {
        Phase::EnvironmentVars => environment_vars::render(&environment_vars::EnvironmentVarsParams::from_settings(s)),
        Phase::ResourceGroup => resource_group::render(),
        Phase::Networking => networking::render(&networking::NetworkingParams::from_settings(s)),
        Phase::AppService => app_service::render(&app_service::AppServiceParams::from_settings(s)),
        Phase::DataAiServices => data_ai::render(&data_ai::DataAiParams::from_settings(s)),
        Phase::ApiManagement => api_management::render(&api_management::ApiManagementParams::from_settings(s)),
        Phase::WebApp => web_app::render(&web_app::WebAppParams::from_settings(s)),
        Phase::BotService => bot_service::render(&bot_service::BotServiceParams::from_settings(s)),
        Phase::TeamsIntegration => teams::render(&teams::TeamsParams::from_settings(s)),
        Phase::NetworkVerification => verification::render(&verification::VerificationParams::from_settings(s)),
    }
}

pub fn render_sections(s: &Settings) -> HashMap<Phase, String> {
    Phase::ALL
        .into_iter()
        .map(|phase| {
            let text = render_phase(phase, s);
            debug!(section = %phase, lines = text.lines().count(), "rendered section");
            (phase, text)
        })
        .collect()
}
