use azscript_core::Settings;

use crate::shell::{dq, sq, var, xml_escape, Command, Script};

pub const BACKEND_ID: &str = "anpi-app-service";
const POLICY_FILE: &str = "/tmp/apim-policy.xml";
const OPENAI_API_VERSION: &str = "2024-02-15-preview";
const EMBEDDING_API_VERSION: &str = "2023-05-15";

/// Secrets stored in Key Vault and referenced from app settings.
const VAULT_SECRETS: &[(&str, &str)] = &[
    ("anpi-MicrosoftAppId", "MS_APP_ID"),
    ("anpi-MicrosoftAppPassword", "MS_APP_PASSWORD"),
    ("anpi-MicrosoftAppTenantId", "MS_APP_TENANT_ID"),
    ("anpi-CosmosDbConnectionString", "COSMOS_CONNECTION_STRING"),
    ("anpi-AzureOpenAIKey", "AZURE_OPENAI_KEY"),
    ("anpi-AzureSearchApiKey", "AZURE_SEARCH_KEY"),
];
const JWT_SECRET_NAME: &str = "anpi-JwtSecretKey";

pub struct WebAppParams<'a> {
    pub app_name: &'a str,
    pub asp_name: &'a str,
    pub app_runtime: &'a str,
    pub kv_name: &'a str,
    pub apim_name: &'a str,
    pub api_id: &'a str,
    pub allowed_origins: &'a [String],
    pub api_base_url: &'a str,
    pub timeout_minutes: u32,
    pub jwt_issuer: &'a str,
    pub jwt_secret_key: &'a str,
    pub jwt_expiry_minutes: u32,
    pub cosmos_db_name: &'a str,
    pub search_index_name: &'a str,
    pub semantic_config_name: &'a str,
}

impl<'a> WebAppParams<'a> {
    pub fn from_settings(s: &'a Settings) -> Self {
        Self {
            app_name: &s.app_name,
            asp_name: &s.asp_name,
            app_runtime: &s.app_runtime,
            kv_name: &s.kv_name,
            apim_name: &s.apim_name,
            api_id: &s.api_id,
            allowed_origins: &s.allowed_origins,
            api_base_url: &s.api_base_url,
            timeout_minutes: s.timeout_minutes,
            jwt_issuer: &s.jwt_issuer,
            jwt_secret_key: &s.jwt_secret_key,
            jwt_expiry_minutes: s.jwt_expiry_minutes,
            cosmos_db_name: &s.cosmos_db_name,
            search_index_name: &s.search_index_name,
            semantic_config_name: &s.semantic_config_name,
        }
    }
}

/// Inbound policy routing to the App Service backend with CORS for `origins`.
pub fn cors_policy(origins: &[String]) -> String {
    let origin_lines: String =
        origins.iter().map(|o| format!("        <origin>{}</origin>\n", xml_escape(o))).collect();
    let method_lines: String = ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"]
        .iter()
        .map(|m| format!("        <method>{m}</method>\n"))
        .collect();
    format!(
        "<policies>\n  <inbound>\n    <base />\n    <set-backend-service backend-id=\"{BACKEND_ID}\" />\n    <cors>\n      \
         <allowed-origins>\n{origin_lines}      </allowed-origins>\n      <allowed-methods>\n{method_lines}      \
         </allowed-methods>\n      <allowed-headers>\n        <header>Content-Type</header>\n        \
         <header>Authorization</header>\n      </allowed-headers>\n      <expose-headers>\n        \
         <header>*</header>\n      </expose-headers>\n    </cors>\n  </inbound>\n  <backend>\n    <base />\n  \
         </backend>\n  <outbound>\n    <base />\n  </outbound>\n  <on-error>\n    <base />\n  </on-error>\n\
         </policies>\n"
    )
}

fn vault_ref(secret: &str) -> String {
    format!("\"@Microsoft.KeyVault(SecretUri=${{KV_URI}}secrets/{secret}/)\"")
}

pub fn render(p: &WebAppParams) -> String {
    let rg = var("RG_NAME");
    let origins_json = serde_json::Value::from(p.allowed_origins.to_vec()).to_string();
    let mut s = Script::section("Web App");

    s.comment("Create Web App").run(
        &Command::az("webapp create")
            .opt("--name", dq(p.app_name))
            .opt("--resource-group", &rg)
            .opt("--plan", dq(p.asp_name))
            .opt("--runtime", dq(p.app_runtime))
            .opt("--tags", var("ANPI_TAG")),
    );
    s.blank()
        .comment("Assign managed identity")
        .run(&Command::az("webapp identity assign").opt("--name", dq(p.app_name)).opt("--resource-group", &rg));
    s.blank().comment("Get the principal ID for permissions").capture(
        "APP_PRINCIPAL_ID",
        &Command::az("webapp identity show").opt("--name", dq(p.app_name)).opt("--resource-group", &rg).tsv("principalId"),
    );

    s.blank()
        .comment("Create backend for App Service")
        .assign("APP_SERVICE_URL", dq(&format!("https://{}.azurewebsites.net", p.app_name)))
        .run(
            &Command::az("apim backend create")
                .opt("--resource-group", &rg)
                .opt("--service-name", dq(p.apim_name))
                .opt("--backend-id", dq(BACKEND_ID))
                .opt("--url", var("APP_SERVICE_URL"))
                .opt("--protocol", "http")
                .opt("--description", dq("ANPI Bot App Service")),
        );

    s.blank()
        .comment("Set API policy to use the backend")
        .heredoc(POLICY_FILE, &cors_policy(p.allowed_origins))
        .blank()
        .run(
            &Command::az("apim api policy set")
                .opt("--resource-group", &rg)
                .opt("--service-name", dq(p.apim_name))
                .opt("--api-id", dq(p.api_id))
                .opt("--value-file", POLICY_FILE),
        )
        .blank()
        .line(format!("rm {POLICY_FILE}"));

    s.blank().comment("Store secrets in Key Vault");
    let secret_set = |name: &str, value: String| {
        Command::az("keyvault secret set").opt("--vault-name", dq(p.kv_name)).opt("--name", name).opt("--value", value)
    };
    for &(name, source) in &VAULT_SECRETS[..3] {
        s.run_inline(&secret_set(name, var(source)));
    }
    s.run_inline(&secret_set(JWT_SECRET_NAME, dq(p.jwt_secret_key)));
    for &(name, source) in &VAULT_SECRETS[3..] {
        s.run_inline(&secret_set(name, var(source)));
    }

    let kv_show = Command::az("keyvault show").opt("--name", dq(p.kv_name));
    s.blank().comment("Grant Key Vault access to App Service").run(
        &Command::az("role assignment create")
            .opt("--assignee-object-id", var("APP_PRINCIPAL_ID"))
            .opt("--assignee-principal-type", "ServicePrincipal")
            .opt("--scope", format!("\"$({})\"", kv_show.clone().opt("--resource-group", &rg).tsv("id").inline()))
            .opt("--role", dq("Key Vault Secrets User")),
    );
    s.blank()
        .comment("Get Key Vault URI for App Settings")
        .capture_inline("KV_URI", &kv_show.tsv("properties.vaultUri"));

    s.blank().comment("Configure application settings").run(
        &Command::az("webapp config appsettings set")
            .opt("--name", dq(p.app_name))
            .opt("--resource-group", &rg)
            .flag("--settings")
            .arg(format!("MicrosoftAppId={}", vault_ref("anpi-MicrosoftAppId")))
            .arg(format!("MicrosoftAppPassword={}", vault_ref("anpi-MicrosoftAppPassword")))
            .arg(format!("MicrosoftAppTenantId={}", vault_ref("anpi-MicrosoftAppTenantId")))
            .arg(format!("CosmosDbConnectionString={}", vault_ref("anpi-CosmosDbConnectionString")))
            .arg("APPINSIGHTS_INSTRUMENTATIONKEY=\"$APPINSIGHTS_KEY\"")
            .arg("APPLICATIONINSIGHTS_CONNECTION_STRING=\"$APPINSIGHTS_CONNECTION_STRING\"")
            .arg("Environment=\"$ENVIRONMENT\"")
            .arg("ApplicationName=\"ANPI Bot ${ENVIRONMENT}\"")
            .arg(format!("ApiBaseUrl={}", dq(p.api_base_url)))
            .arg(format!("TimeoutMinutes={}", p.timeout_minutes))
            .arg(format!("AllowedOrigins={}", sq(&origins_json)))
            .arg(format!("JwtSettings__Issuer={}", dq(p.jwt_issuer)))
            .arg("JwtSettings__Audience=\"$MS_APP_ID\"")
            .arg(format!("JwtSettings__SecretKey={}", vault_ref(JWT_SECRET_NAME)))
            .arg(format!("JwtSettings__ExpiryInMinutes={}", p.jwt_expiry_minutes))
            .arg(format!("CosmosDb__DatabaseName={}", dq(p.cosmos_db_name)))
            .arg("AzureOpenAI__Endpoint=\"$AZURE_OPENAI_ENDPOINT\"")
            .arg(format!("AzureOpenAI__Key={}", vault_ref("anpi-AzureOpenAIKey")))
            .arg("AzureOpenAI__DeploymentId=\"$AZURE_OPENAI_MODEL\"")
            .arg(format!("AzureOpenAI__ApiVersion={}", dq(OPENAI_API_VERSION)))
            .arg(format!("AzureOpenAI__EmbeddingApiVersion={}", dq(EMBEDDING_API_VERSION)))
            .arg("AzureOpenAI__EmbeddingDeploymentId=\"$EMBEDDING_MODEL\"")
            .arg("AzureSearch__Endpoint=\"$AZURE_SEARCH_ENDPOINT\"")
            .arg(format!("AzureSearch__ApiKey={}", vault_ref("anpi-AzureSearchApiKey")))
            .arg(format!("AzureSearch__IndexName={}", dq(p.search_index_name)))
            .arg(format!("AzureSearch__SemanticConfig={}", dq(p.semantic_config_name)))
            .arg("SCM_ENABLED=true"),
    );

    s.blank()
        .comment("Verification:")
        .comment("Azure Portal:")
        .comment(&format!("- Go to App Services and check {}", p.app_name))
        .comment("- Check App Service > Configuration for app settings")
        .comment("- Check Identity settings are enabled")
        .comment("- Check Key Vault for stored secrets")
        .blank()
        .comment("CLI Verification:")
        .verify(&Command::az("webapp show").opt("--name", dq(p.app_name)).opt("--resource-group", &rg).table())
        .verify(&Command::az("webapp identity show").opt("--name", dq(p.app_name)).opt("--resource-group", &rg).table())
        .verify(
            &Command::az("webapp config appsettings list").opt("--name", dq(p.app_name)).opt("--resource-group", &rg).table(),
        )
        .verify(&Command::az("keyvault secret list").opt("--vault-name", dq(p.kv_name)).table())
        .verify(
            &Command::az("apim backend show")
                .opt("--backend-id", dq(BACKEND_ID))
                .opt("--service-name", dq(p.apim_name))
                .opt("--resource-group", &rg)
                .table(),
        );
    s.finish()
}
