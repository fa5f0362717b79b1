//! Post-deployment connectivity checks between the provisioned resources.

use azscript_core::Settings;

use super::web_app::BACKEND_ID;
use crate::shell::{dq, dq_escape, var, Command, Script};

const COSMOS_PROBE_FILE: &str = "/tmp/cosmos-test.cs";
const OPENAI_PROBE_FILE: &str = "/tmp/openai-test.cs";

/// Diagnostic controller reading the Cosmos database; `@DATABASE@` is replaced.
const COSMOS_PROBE: &str = r#"using Microsoft.Azure.Cosmos;
using Microsoft.AspNetCore.Mvc;

[ApiController]
[Route("api/diagnostics")]
public class DiagnosticsController : ControllerBase
{
    private readonly CosmosClient _cosmosClient;

    public DiagnosticsController(CosmosClient cosmosClient)
    {
        _cosmosClient = cosmosClient;
    }

    [HttpGet("cosmos-test")]
    public async Task<IActionResult> TestCosmosConnection()
    {
        try
        {
            var db = _cosmosClient.GetDatabase("@DATABASE@");
            var response = await db.ReadAsync();
            return Ok(new { Status = "Connected", DatabaseName = response.Resource.Id });
        }
        catch (Exception ex)
        {
            return StatusCode(500, new { Status = "Failed", Error = ex.Message });
        }
    }
}
"#;

const OPENAI_PROBE: &str = r#"using Microsoft.AspNetCore.Mvc;
using Azure.AI.OpenAI;
using Azure;

[ApiController]
[Route("api/diagnostics")]
public class OpenAIDiagnosticsController : ControllerBase
{
    private readonly OpenAIClient _openAIClient;
    private readonly IConfiguration _configuration;

    public OpenAIDiagnosticsController(OpenAIClient openAIClient, IConfiguration configuration)
    {
        _openAIClient = openAIClient;
        _configuration = configuration;
    }

    [HttpGet("openai-test")]
    public async Task<IActionResult> TestOpenAIConnection()
    {
        try
        {
            var deploymentId = _configuration["AzureOpenAI:DeploymentId"];
            var response = await _openAIClient.GetCompletionsAsync(
                deploymentId,
                new CompletionsOptions("Hello, world") { MaxTokens = 5 }
            );
            return Ok(new { Status = "Connected", Model = deploymentId, Response = response.Value.Choices[0].Text });
        }
        catch (Exception ex)
        {
            return StatusCode(500, new { Status = "Failed", Error = ex.Message });
        }
    }
}
"#;

pub struct VerificationParams<'a> {
    pub app_name: &'a str,
    pub kv_name: &'a str,
    pub cosmos_name: &'a str,
    pub cosmos_db_name: &'a str,
    pub apim_name: &'a str,
    pub agw_name: &'a str,
    pub pip_name: &'a str,
    pub search_name: &'a str,
    pub api_path: &'a str,
}

impl<'a> VerificationParams<'a> {
    pub fn from_settings(s: &'a Settings) -> Self {
        Self {
            app_name: &s.app_name,
            kv_name: &s.kv_name,
            cosmos_name: &s.cosmos_name,
            cosmos_db_name: &s.cosmos_db_name,
            apim_name: &s.apim_name,
            agw_name: &s.agw_name,
            pip_name: &s.pip_name,
            search_name: &s.search_name,
            api_path: &s.api_path,
        }
    }

    fn domains(&self) -> [String; 5] {
        [
            format!("{}.azurewebsites.net", self.app_name),
            format!("{}.azure-api.net", self.apim_name),
            format!("{}.vault.azure.net", self.kv_name),
            format!("{}.documents.azure.com", self.cosmos_name),
            format!("{}.search.windows.net", self.search_name),
        ]
    }
}

pub fn render(p: &VerificationParams) -> String {
    let rg = var("RG_NAME");
    let app_url = format!("https://{}.azurewebsites.net", p.app_name);
    let apim_show = Command::az("apim show").opt("--name", dq(p.apim_name)).opt("--resource-group", &rg);
    let mut s = Script::section("Network and Resource Connectivity Verification");

    s.blank().echo("Starting network and connectivity verification...");

    s.blank()
        .comment("1. App Service identity against Key Vault")
        .echo("Verifying App Service to Key Vault connectivity...")
        .capture_inline(
            "APP_IDENTITY_ASSIGNMENTS",
            &Command::az("webapp identity show").opt("--name", dq(p.app_name)).opt("--resource-group", &rg).tsv("principalId"),
        )
        .capture_inline(
            "KV_ACCESS_POLICIES",
            &Command::az("keyvault show")
                .opt("--name", dq(p.kv_name))
                .opt("--resource-group", &rg)
                .opt("--query", "properties.accessPolicies")
                .opt("-o", "json"),
        )
        .blank()
        .line("if [[ -n \"$APP_IDENTITY_ASSIGNMENTS\" && \"$KV_ACCESS_POLICIES\" == *\"$APP_IDENTITY_ASSIGNMENTS\"* ]]; then")
        .line("  echo \"✅ App Service has proper identity assignment to access Key Vault\"")
        .line("else")
        .line("  echo \"❌ App Service is missing proper Key Vault access. Check managed identity configuration.\"")
        .line("fi");

    s.blank()
        .comment("2. App Service against Cosmos DB")
        .echo("Verifying App Service can access Cosmos DB...")
        .heredoc(COSMOS_PROBE_FILE, &COSMOS_PROBE.replace("@DATABASE@", p.cosmos_db_name))
        .blank()
        .echo(&format!("Diagnostic endpoint code has been written to {COSMOS_PROBE_FILE}"))
        .echo("Please add this file to your project and deploy it to verify Cosmos DB connectivity.")
        .echo(&format!("After deployment, access: {}/api/diagnostics/cosmos-test", dq_escape(&app_url)));

    s.blank()
        .comment("3. App Service against Azure OpenAI")
        .echo("Verifying App Service can access OpenAI Service...")
        .heredoc(OPENAI_PROBE_FILE, OPENAI_PROBE)
        .blank()
        .echo(&format!("OpenAI test endpoint code has been written to {OPENAI_PROBE_FILE}"))
        .echo("Please add this file to your project and deploy it to verify OpenAI connectivity.")
        .echo(&format!("After deployment, access: {}/api/diagnostics/openai-test", dq_escape(&app_url)));

    s.blank()
        .comment("4. API Management backend against App Service")
        .echo("Verifying API Management can reach App Service...")
        .capture_inline(
            "APIM_BACKEND",
            &Command::az("apim backend show")
                .opt("--backend-id", dq(BACKEND_ID))
                .opt("--service-name", dq(p.apim_name))
                .opt("--resource-group", &rg)
                .tsv("url"),
        )
        .assign("APP_URL", dq(&app_url))
        .blank()
        .line("if [[ \"$APIM_BACKEND\" == \"$APP_URL\" ]]; then")
        .line("  echo \"✅ API Management backend is correctly configured to App Service URL\"")
        .line("else")
        .line("  echo \"❌ API Management backend URL doesn't match App Service URL. Check configuration.\"")
        .line("  echo \"APIM Backend URL: $APIM_BACKEND\"")
        .line("  echo \"App Service URL: $APP_URL\"")
        .line("fi");

    s.blank()
        .comment("Gateway URL: gatewayUrl, then the first hostname configuration, then the service name")
        .capture_inline("APIM_URL", &apim_show.clone().tsv("\"properties.gatewayUrl\""))
        .if_empty("APIM_URL", |f| {
            f.capture_inline(
                "APIM_HOSTNAME",
                &apim_show.clone().tsv("\"properties.hostnameConfigurations[0].hostName\""),
            )
            .line("if [ -n \"$APIM_HOSTNAME\" ]; then")
            .line("  APIM_URL=\"https://$APIM_HOSTNAME\"")
            .line("else")
            .line(format!("  APIM_URL={}", dq(&format!("https://{}.azure-api.net", p.apim_name))))
            .line("fi");
        })
        .blank()
        .echo("To test API Management connectivity to App Service, run:")
        .echo(&format!("curl -v $APIM_URL/{}/api/alive", dq_escape(p.api_path)));

    s.blank()
        .comment("5. Application Gateway")
        .echo("Verifying Application Gateway connectivity...")
        .capture_inline(
            "AGW_PUBLIC_IP",
            &Command::az("network public-ip show").opt("--name", dq(p.pip_name)).opt("--resource-group", &rg).tsv("ipAddress"),
        )
        .capture_inline(
            "BACKEND_POOL",
            &Command::az("network application-gateway address-pool list")
                .opt("--gateway-name", dq(p.agw_name))
                .opt("--resource-group", &rg)
                .opt("-o", "json"),
        )
        .blank()
        .echo("Application Gateway Public IP: $AGW_PUBLIC_IP")
        .echo("Backend pools: $BACKEND_POOL")
        .echo("To test Application Gateway connectivity, open a browser and navigate to:")
        .echo("http://$AGW_PUBLIC_IP/api/alive");

    s.blank()
        .comment("DNS resolution")
        .echo("Testing DNS resolution for resources...")
        .line(format!("for domain in {}; do", p.domains().join(" ")))
        .line("  echo \"Resolving $domain...\"")
        .line("  nslookup \"$domain\" || echo \"Could not resolve $domain\"")
        .line("done");

    s.blank().echo("Network connectivity verification completed. Review any errors and warnings above.");
    s.finish()
}
