use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registry key of the assembled document.
pub const COMPLETE_KEY: &str = "complete_script";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    EnvironmentVars,
    ResourceGroup,
    Networking,
    AppService,
    DataAiServices,
    ApiManagement,
    WebApp,
    BotService,
    TeamsIntegration,
    NetworkVerification,
}

impl Phase {
    /// Registry (display) order.
    pub const ALL: [Phase; 10] = [
        Phase::EnvironmentVars,
        Phase::ResourceGroup,
        Phase::Networking,
        Phase::AppService,
        Phase::DataAiServices,
        Phase::ApiManagement,
        Phase::WebApp,
        Phase::BotService,
        Phase::TeamsIntegration,
        Phase::NetworkVerification,
    ];

    /// Order of the sections inside the assembled script. API Management comes
    /// before networking because the gateway's backend pool points at it.
    pub const ASSEMBLY_ORDER: [Phase; 10] = [
        Phase::EnvironmentVars,
        Phase::ResourceGroup,
        Phase::ApiManagement,
        Phase::Networking,
        Phase::AppService,
        Phase::DataAiServices,
        Phase::WebApp,
        Phase::BotService,
        Phase::TeamsIntegration,
        Phase::NetworkVerification,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Phase::EnvironmentVars => "environment_vars",
            Phase::ResourceGroup => "resource_group",
            Phase::Networking => "networking",
            Phase::AppService => "app_service",
            Phase::DataAiServices => "data_ai_services",
            Phase::ApiManagement => "api_management",
            Phase::WebApp => "web_app",
            Phase::BotService => "bot_service",
            Phase::TeamsIntegration => "teams_integration",
            Phase::NetworkVerification => "network_verification",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Phase::EnvironmentVars => "Environment Variables",
            Phase::ResourceGroup => "Resource Group",
            Phase::Networking => "Networking",
            Phase::AppService => "App Service",
            Phase::DataAiServices => "Data & AI Services",
            Phase::ApiManagement => "API Management",
            Phase::WebApp => "Web App",
            Phase::BotService => "Bot Service",
            Phase::TeamsIntegration => "Teams Integration",
            Phase::NetworkVerification => "Network Verification",
        }
    }

    /// Shell variables this phase assigns.
    pub fn produces(&self) -> &'static [&'static str] {
        match self {
            Phase::EnvironmentVars => &[
                "ENV",
                "SUBSCRIPTION_ID",
                "LOCATION",
                "RG_NAME",
                "ENVIRONMENT",
                "SHARED_TAG",
                "ANPI_TAG",
                "MS_APP_TYPE",
                "MS_APP_ID",
                "MS_APP_PASSWORD",
                "MS_APP_TENANT_ID",
                "AZURE_OPENAI_MODEL",
                "MODEL_VERSION",
                "EMBEDDING_MODEL",
                "EMBEDDING_MODEL_VERSION",
            ],
            Phase::ResourceGroup => &[],
            Phase::ApiManagement => &[],
            Phase::Networking => &[
                "WAF_POLICY_ID",
                "APIM_HOST",
                "APIM_GATEWAY_URL",
                "LISTENER_NAME",
                "HTTP_SETTINGS_NAME",
            ],
            Phase::AppService => &["APPINSIGHTS_KEY", "APPINSIGHTS_CONNECTION_STRING"],
            Phase::DataAiServices => &[
                "COSMOS_CONNECTION_STRING",
                "AZURE_OPENAI_ENDPOINT",
                "AZURE_OPENAI_KEY",
                "AZURE_SEARCH_KEY",
                "AZURE_SEARCH_ENDPOINT",
            ],
            Phase::WebApp => &["APP_PRINCIPAL_ID", "APP_SERVICE_URL", "KV_URI"],
            Phase::BotService => &["APIM_API_URL", "APIM_MESSAGES_ENDPOINT"],
            Phase::TeamsIntegration => &["TEAMS_APP_ID", "TEAMS_APP_SECRET"],
            Phase::NetworkVerification => &[
                "APP_IDENTITY_ASSIGNMENTS",
                "KV_ACCESS_POLICIES",
                "APIM_BACKEND",
                "APP_URL",
                "APIM_URL",
                "APIM_HOSTNAME",
                "AGW_PUBLIC_IP",
                "BACKEND_POOL",
            ],
        }
    }

    /// Shell variables this phase reads from earlier phases.
    pub fn consumes(&self) -> &'static [&'static str] {
        match self {
            Phase::EnvironmentVars => &[],
            Phase::ResourceGroup => &["SUBSCRIPTION_ID", "RG_NAME", "LOCATION", "SHARED_TAG"],
            Phase::ApiManagement => &["RG_NAME", "LOCATION", "SHARED_TAG", "ENVIRONMENT"],
            Phase::Networking => &["RG_NAME", "LOCATION", "SHARED_TAG", "ENVIRONMENT"],
            Phase::AppService => &["RG_NAME", "LOCATION", "SHARED_TAG"],
            Phase::DataAiServices => &[
                "RG_NAME",
                "LOCATION",
                "SHARED_TAG",
                "AZURE_OPENAI_MODEL",
                "MODEL_VERSION",
                "EMBEDDING_MODEL",
                "EMBEDDING_MODEL_VERSION",
            ],
            Phase::WebApp => &[
                "RG_NAME",
                "ANPI_TAG",
                "ENVIRONMENT",
                "MS_APP_ID",
                "MS_APP_PASSWORD",
                "MS_APP_TENANT_ID",
                "APPINSIGHTS_KEY",
                "APPINSIGHTS_CONNECTION_STRING",
                "COSMOS_CONNECTION_STRING",
                "AZURE_OPENAI_ENDPOINT",
                "AZURE_OPENAI_KEY",
                "AZURE_OPENAI_MODEL",
                "EMBEDDING_MODEL",
                "AZURE_SEARCH_KEY",
                "AZURE_SEARCH_ENDPOINT",
            ],
            Phase::BotService => &["RG_NAME", "MS_APP_ID", "MS_APP_TENANT_ID", "MS_APP_TYPE"],
            Phase::TeamsIntegration => &["RG_NAME"],
            Phase::NetworkVerification => &["RG_NAME"],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.key()) }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|p| p.key() == s)
            .ok_or_else(|| format!("unknown section '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn orders_cover_every_phase_once() {
        let all: BTreeSet<_> = Phase::ALL.into_iter().collect();
        let assembly: BTreeSet<_> = Phase::ASSEMBLY_ORDER.into_iter().collect();
        assert_eq!(all.len(), 10);
        assert_eq!(all, assembly);
    }

    #[test]
    fn keys_round_trip() {
        for p in Phase::ALL {
            assert_eq!(p.key().parse::<Phase>().unwrap(), p);
        }
        assert!("complete_script".parse::<Phase>().is_err());
    }

    #[test]
    fn self_check_runs_last() {
        assert_eq!(Phase::ASSEMBLY_ORDER.last(), Some(&Phase::NetworkVerification));
    }
}
