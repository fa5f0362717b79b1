use azscript_core::Settings;

use crate::shell::{dq, var, Command, Script};

pub struct ApiManagementParams<'a> {
    pub apim_name: &'a str,
    pub apim_sku: &'a str,
    pub apim_publisher_email: &'a str,
    pub apim_publisher_name: &'a str,
    pub api_id: &'a str,
    pub api_path: &'a str,
    pub api_display_name: &'a str,
    pub app_name: &'a str,
}

impl<'a> ApiManagementParams<'a> {
    pub fn from_settings(s: &'a Settings) -> Self {
        Self {
            apim_name: &s.apim_name,
            apim_sku: &s.apim_sku,
            apim_publisher_email: &s.apim_publisher_email,
            apim_publisher_name: &s.apim_publisher_name,
            api_id: &s.api_id,
            api_path: &s.api_path,
            api_display_name: &s.api_display_name,
            app_name: &s.app_name,
        }
    }
}

/// Operations served behind the gateway, grouped as in the OpenAPI document.
const OPERATION_GROUPS: &[(&str, &str)] = &[
    ("Authentication", "/api/auth/token, /api/auth/refresh-token, /api/auth/validate"),
    (
        "Broadcast",
        "/api/broadcast/anpi-confirms, /api/broadcast/leaderships-earthquakealert, \
         /api/broadcast/leaderships-statusreport, /api/broadcast/notify",
    ),
    ("Health", "/api/alive, /api/alive/version, /api/alive/status"),
    ("Bot", "/api/messages"),
];

pub fn render(p: &ApiManagementParams) -> String {
    let rg = var("RG_NAME");
    let app_url = format!("https://{}.azurewebsites.net", p.app_name);
    let mut s = Script::section("API Management");

    s.comment("Create API Management service").run(
        &Command::az("apim create")
            .opt("--name", dq(p.apim_name))
            .opt("--resource-group", &rg)
            .opt("--location", var("LOCATION"))
            .opt("--publisher-email", dq(p.apim_publisher_email))
            .opt("--publisher-name", dq(p.apim_publisher_name))
            .opt("--sku-name", dq(p.apim_sku))
            .opt("--tags", format!("{} \"Project=AnpiBot Environment=$ENVIRONMENT\"", var("SHARED_TAG"))),
    );
    s.blank().comment("Create the API fronting the App Service").run(
        &Command::az("apim api create")
            .opt("--resource-group", &rg)
            .opt("--service-name", dq(p.apim_name))
            .opt("--api-id", dq(p.api_id))
            .opt("--path", dq(p.api_path))
            .opt("--display-name", dq(p.api_display_name))
            .opt("--service-url", dq(&app_url))
            .opt("--protocols", "https"),
    );

    s.blank()
        .comment("Operations are imported from the OpenAPI document through the Azure Portal:")
        .comment("1. Open the API Management service in the Azure Portal")
        .comment(&format!("2. Select APIs > {}", p.api_display_name))
        .comment("3. Choose Import and upload the OpenAPI YAML")
        .comment("")
        .comment("The document covers these paths:");
    for (group, paths) in OPERATION_GROUPS {
        s.comment(&format!("- {group}: {paths}"));
    }
    s.comment("")
        .comment("Set servers.url in the document to:")
        .comment(&format!("1. https://{}.azure-api.net/{}", p.apim_name, p.api_path))
        .comment(&format!("2. {app_url}"));

    s.blank()
        .comment("CLI Verification:")
        .verify(&Command::az("apim show").opt("--name", dq(p.apim_name)).opt("--resource-group", &rg).table())
        .verify(
            &Command::az("apim api show")
                .opt("--api-id", dq(p.api_id))
                .opt("--service-name", dq(p.apim_name))
                .opt("--resource-group", &rg)
                .table(),
        )
        .verify(
            &Command::az("apim api operation list")
                .opt("--api-id", dq(p.api_id))
                .opt("--service-name", dq(p.apim_name))
                .opt("--resource-group", &rg)
                .table(),
        );
    s.finish()
}
