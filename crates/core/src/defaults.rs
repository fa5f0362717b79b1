//! Form defaults for a new configuration.
//!
//! Names carry the `dev` placeholder and tags carry `Dev` regardless of the
//! target environment; normalization performs the substitution at generation time.

use crate::config::{Environment, FlatMapping, ENVIRONMENT_KEY};

pub const DEFAULT_TIMEOUT_MINUTES: i64 = 30;
pub const DEFAULT_JWT_EXPIRY_MINUTES: i64 = 60;
pub const DEFAULT_EMBEDDING_MODEL_VERSION: i64 = 2;

pub const LOCATIONS: &[&str] = &["japaneast", "eastus", "westus", "northeurope", "southeastasia"];
pub const OPENAI_REGIONS: &[&str] = &["japaneast", "eastus", "southeastasia"];
pub const ASP_SKUS: &[&str] = &["B1", "S1", "P1V2", "P2V2", "P3V2"];
pub const APIM_SKUS: &[&str] = &["Consumption", "Developer", "Basic", "Standard", "Premium"];
pub const SEARCH_SKUS: &[&str] = &["Basic", "Standard", "Standard2", "Standard3"];

pub fn default_mapping(env: Environment) -> FlatMapping {
    let mut m = FlatMapping::new();
    m.insert(ENVIRONMENT_KEY, env.as_str());
    m.insert("subscription_id", "your-subscription-id");
    m.insert("location", LOCATIONS[0]);
    m.insert("ms_app_id", "your-bot-app-id");
    m.insert("ms_app_password", "your-bot-app-password");
    m.insert("ms_app_tenant_id", "your-tenant-id");

    m.insert("rg_name", "itz-dev-jpe-001");
    m.insert("anpi_tag", "Project=AnpiBot Environment=Dev");
    m.insert("shared_tag", "Environment=Dev Project=ITZ-Chatbot");
    m.insert("api_base_url", "https://api-test.fjpservice.net");
    m.insert("timeout_minutes", DEFAULT_TIMEOUT_MINUTES);
    m.insert("jwt_issuer", "https://api.botframework.com");
    m.insert("jwt_secret_key", "replace-with-generated-secret");
    m.insert("jwt_expiry_minutes", DEFAULT_JWT_EXPIRY_MINUTES);

    m.insert("vnet_name", "vnet-itz-dev-jpe-001");
    m.insert("vnet_address_prefix", "10.0.0.0/16");
    m.insert("subnet_name", "snet-itz-dev-jpe-001");
    m.insert("subnet_prefix", "10.0.1.0/24");
    m.insert("pip_name", "pip-itz-anpi-dev-jpe-001");
    m.insert("agw_name", "agw-itz-dev-jpe-001");
    m.insert("waf_name", "waf-itz-dev-jpe-001");

    m.insert("asp_name", "asp-itz-dev-001");
    m.insert("asp_sku", ASP_SKUS[0]);
    m.insert("app_name", "app-itz-anpi-dev-001");
    m.insert("app_runtime", "DOTNETCORE|6.0");
    m.insert("appinsights_name", "appi-itz-anpi-dev-jpe-001");
    m.insert("bot_name", "bot-itz-anpi-dev");

    m.insert("kv_name", "kv-itz-dev-jpe-001");
    m.insert("cosmos_name", "cosmos-itz-dev");
    m.insert("cosmos_db_name", "AnpiDb");
    m.insert("openai_name", "oai-itz-dev");
    m.insert("openai_region", OPENAI_REGIONS[1]);
    m.insert("openai_model", "gpt-4o-mini");
    m.insert("model_version", "2024-07-18");
    m.insert("embedding_model", "text-embedding-ada-002");
    m.insert("embedding_model_version", DEFAULT_EMBEDDING_MODEL_VERSION);
    m.insert("search_name", "srch-itz-dev");
    m.insert("search_sku", SEARCH_SKUS[0]);
    m.insert("search_index_name", "anpi-knowledge");
    m.insert("semantic_config_name", "my-semantic-config");

    m.insert("apim_name", "apim-itz-fjp");
    m.insert("apim_sku", APIM_SKUS[0]);
    m.insert("apim_publisher_email", "admin@example.com");
    m.insert("apim_publisher_name", "FJP Japan Holding");
    m.insert("api_id", "anpi-bot-api");
    m.insert("api_path", "anpi");
    m.insert("api_display_name", "ANPI Bot API");
    m.insert(
        "allowed_origins",
        vec!["https://*.fjpservice.net".to_string(), "https://localhost:4200".to_string()],
    );

    m.insert("teams_app_name", "ANPI Teams Bot Dev");
    m.insert("teams_redirect_uri", "https://token.botframework.com/.auth/web/redirect");
    m
}
