use azscript_core::{Environment, Settings};

use crate::shell::{dq, Script};

pub struct EnvironmentVarsParams<'a> {
    pub env: Environment,
    pub subscription_id: &'a str,
    pub location: &'a str,
    pub rg_name: &'a str,
    pub anpi_tag: &'a str,
    pub shared_tag: &'a str,
    pub ms_app_id: &'a str,
    pub ms_app_password: &'a str,
    pub ms_app_tenant_id: &'a str,
    pub openai_model: &'a str,
    pub model_version: &'a str,
    pub embedding_model: &'a str,
    pub embedding_model_version: u32,
}

impl<'a> EnvironmentVarsParams<'a> {
    pub fn from_settings(s: &'a Settings) -> Self {
        Self {
            env: s.env,
            subscription_id: &s.subscription_id,
            location: &s.location,
            rg_name: &s.rg_name,
            anpi_tag: &s.anpi_tag,
            shared_tag: &s.shared_tag,
            ms_app_id: &s.ms_app_id,
            ms_app_password: &s.ms_app_password,
            ms_app_tenant_id: &s.ms_app_tenant_id,
            openai_model: &s.openai_model,
            model_version: &s.model_version,
            embedding_model: &s.embedding_model,
            embedding_model_version: s.embedding_model_version,
        }
    }
}

/// Variables every later section reads.
pub fn render(p: &EnvironmentVarsParams) -> String {
    let mut s = Script::section("Environment Variables");
    s.comment("Set environment name and basic settings")
        .assign("ENV", dq(p.env.as_str()))
        .assign("SUBSCRIPTION_ID", dq(p.subscription_id))
        .assign("LOCATION", dq(p.location))
        .assign("RG_NAME", dq(p.rg_name))
        .assign("ENVIRONMENT", dq(p.env.capitalized()))
        .blank()
        .comment("Shared Tags")
        .assign("SHARED_TAG", dq(p.shared_tag))
        .assign("ANPI_TAG", dq(p.anpi_tag))
        .blank()
        .comment("Bot Framework Settings")
        .assign("MS_APP_TYPE", dq("SingleTenant"))
        .assign("MS_APP_ID", dq(p.ms_app_id))
        .assign("MS_APP_PASSWORD", dq(p.ms_app_password))
        .assign("MS_APP_TENANT_ID", dq(p.ms_app_tenant_id))
        .blank()
        .comment("Azure OpenAI Settings")
        .assign("AZURE_OPENAI_MODEL", dq(p.openai_model))
        .assign("MODEL_VERSION", dq(p.model_version))
        .assign("EMBEDDING_MODEL", dq(p.embedding_model))
        .assign("EMBEDDING_MODEL_VERSION", p.embedding_model_version);
    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EnvironmentVarsParams<'static> {
        EnvironmentVarsParams {
            env: Environment::Preprod,
            subscription_id: "sub-1",
            location: "japaneast",
            rg_name: "itz-preprod-jpe-001",
            anpi_tag: "Project=AnpiBot Environment=Preprod",
            shared_tag: "Environment=Preprod Project=ITZ-Chatbot",
            ms_app_id: "app-id",
            ms_app_password: "p$ss\"word",
            ms_app_tenant_id: "tenant",
            openai_model: "gpt-4o-mini",
            model_version: "2024-07-18",
            embedding_model: "text-embedding-ada-002",
            embedding_model_version: 2,
        }
    }

    #[test]
    fn renders_quoted_assignments() {
        let out = render(&params());
        assert!(out.contains("ENV=\"preprod\"\n"));
        assert!(out.contains("ENVIRONMENT=\"Preprod\"\n"));
        assert!(out.contains("RG_NAME=\"itz-preprod-jpe-001\"\n"));
        assert!(out.contains("MS_APP_PASSWORD=\"p\\$ss\\\"word\"\n"));
    }

    #[test]
    fn version_number_is_bare() {
        assert!(render(&params()).contains("EMBEDDING_MODEL_VERSION=2\n"));
    }
}
