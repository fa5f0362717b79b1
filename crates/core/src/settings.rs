use crate::config::{Environment, FlatMapping};
use crate::error::ConfigError;
use crate::normalize::Normalized;

/// Every key a generation run reads. Used for presence checks and tests.
pub const REQUIRED_KEYS: &[&str] = &[
    "environment",
    "subscription_id",
    "location",
    "ms_app_id",
    "ms_app_password",
    "ms_app_tenant_id",
    "rg_name",
    "anpi_tag",
    "shared_tag",
    "api_base_url",
    "timeout_minutes",
    "jwt_issuer",
    "jwt_secret_key",
    "jwt_expiry_minutes",
    "vnet_name",
    "vnet_address_prefix",
    "subnet_name",
    "subnet_prefix",
    "pip_name",
    "agw_name",
    "waf_name",
    "asp_name",
    "asp_sku",
    "app_name",
    "app_runtime",
    "appinsights_name",
    "bot_name",
    "kv_name",
    "cosmos_name",
    "cosmos_db_name",
    "openai_name",
    "openai_region",
    "openai_model",
    "model_version",
    "embedding_model",
    "embedding_model_version",
    "search_name",
    "search_sku",
    "search_index_name",
    "semantic_config_name",
    "apim_name",
    "apim_sku",
    "apim_publisher_email",
    "apim_publisher_name",
    "api_id",
    "api_path",
    "api_display_name",
    "allowed_origins",
    "teams_app_name",
    "teams_redirect_uri",
];

/// Typed, normalized view of the configuration mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub env: Environment,
    pub subscription_id: String,
    pub location: String,
    pub ms_app_id: String,
    pub ms_app_password: String,
    pub ms_app_tenant_id: String,

    pub rg_name: String,
    pub anpi_tag: String,
    pub shared_tag: String,
    pub api_base_url: String,
    pub timeout_minutes: u32,
    pub jwt_issuer: String,
    pub jwt_secret_key: String,
    pub jwt_expiry_minutes: u32,

    pub vnet_name: String,
    pub vnet_address_prefix: String,
    pub subnet_name: String,
    pub subnet_prefix: String,
    pub pip_name: String,
    pub agw_name: String,
    pub waf_name: String,

    pub asp_name: String,
    pub asp_sku: String,
    pub app_name: String,
    pub app_runtime: String,
    pub appinsights_name: String,
    pub bot_name: String,

    pub kv_name: String,
    pub cosmos_name: String,
    pub cosmos_db_name: String,
    pub openai_name: String,
    pub openai_region: String,
    pub openai_model: String,
    pub model_version: String,
    pub embedding_model: String,
    pub embedding_model_version: u32,
    pub search_name: String,
    pub search_sku: String,
    pub search_index_name: String,
    pub semantic_config_name: String,

    pub apim_name: String,
    pub apim_sku: String,
    pub apim_publisher_email: String,
    pub apim_publisher_name: String,
    pub api_id: String,
    pub api_path: String,
    pub api_display_name: String,
    pub allowed_origins: Vec<String>,

    pub teams_app_name: String,
    pub teams_redirect_uri: String,
}

impl Settings {
    /// Reads every required key, in `REQUIRED_KEYS` order, so the first missing
    /// key reported is deterministic.
    pub fn from_normalized(n: &Normalized) -> Result<Self, ConfigError> {
        let m = &n.mapping;
        check_required(m)?;
        let t = |key: &str| m.text(key).map(str::to_string);

        Ok(Settings {
            env: n.environment,
            subscription_id: t("subscription_id")?,
            location: t("location")?,
            ms_app_id: t("ms_app_id")?,
            ms_app_password: t("ms_app_password")?,
            ms_app_tenant_id: t("ms_app_tenant_id")?,

            rg_name: t("rg_name")?,
            anpi_tag: t("anpi_tag")?,
            shared_tag: t("shared_tag")?,
            api_base_url: t("api_base_url")?,
            timeout_minutes: m.count("timeout_minutes")?,
            jwt_issuer: t("jwt_issuer")?,
            jwt_secret_key: t("jwt_secret_key")?,
            jwt_expiry_minutes: m.count("jwt_expiry_minutes")?,

            vnet_name: t("vnet_name")?,
            vnet_address_prefix: t("vnet_address_prefix")?,
            subnet_name: t("subnet_name")?,
            subnet_prefix: t("subnet_prefix")?,
            pip_name: t("pip_name")?,
            agw_name: t("agw_name")?,
            waf_name: t("waf_name")?,

            asp_name: t("asp_name")?,
            asp_sku: t("asp_sku")?,
            app_name: t("app_name")?,
            app_runtime: t("app_runtime")?,
            appinsights_name: t("appinsights_name")?,
            bot_name: t("bot_name")?,

            kv_name: t("kv_name")?,
            cosmos_name: t("cosmos_name")?,
            cosmos_db_name: t("cosmos_db_name")?,
            openai_name: t("openai_name")?,
            openai_region: t("openai_region")?,
            openai_model: t("openai_model")?,
            model_version: t("model_version")?,
            embedding_model: t("embedding_model")?,
            embedding_model_version: m.count("embedding_model_version")?,
            search_name: t("search_name")?,
            search_sku: t("search_sku")?,
            search_index_name: t("search_index_name")?,
            semantic_config_name: t("semantic_config_name")?,

            apim_name: t("apim_name")?,
            apim_sku: t("apim_sku")?,
            apim_publisher_email: t("apim_publisher_email")?,
            apim_publisher_name: t("apim_publisher_name")?,
            api_id: t("api_id")?,
            api_path: t("api_path")?,
            api_display_name: t("api_display_name")?,
            allowed_origins: m.string_list("allowed_origins")?,

            teams_app_name: t("teams_app_name")?,
            teams_redirect_uri: t("teams_redirect_uri")?,
        })
    }
}

/// Fails on the first required key absent from `m`.
pub fn check_required(m: &FlatMapping) -> Result<(), ConfigError> {
    match REQUIRED_KEYS.iter().find(|k| !m.contains_key(k)) {
        Some(key) => Err(ConfigError::missing(key)),
        None => Ok(()),
    }
}
