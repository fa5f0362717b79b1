use azscript_core::Settings;

use crate::shell::{dq, var, Command, Script};

pub struct AppServiceParams<'a> {
    pub asp_name: &'a str,
    pub asp_sku: &'a str,
    pub appinsights_name: &'a str,
}

impl<'a> AppServiceParams<'a> {
    pub fn from_settings(s: &'a Settings) -> Self {
        Self { asp_name: &s.asp_name, asp_sku: &s.asp_sku, appinsights_name: &s.appinsights_name }
    }
}

pub fn render(p: &AppServiceParams) -> String {
    let rg = var("RG_NAME");
    let insights = Command::az("monitor app-insights component show")
        .opt("--app", dq(p.appinsights_name))
        .opt("--resource-group", &rg);
    let mut s = Script::section("App Service");

    s.comment("Create App Service Plan").run(
        &Command::az("appservice plan create")
            .opt("--name", dq(p.asp_name))
            .opt("--resource-group", &rg)
            .opt("--location", var("LOCATION"))
            .opt("--sku", dq(p.asp_sku))
            .flag("--is-linux")
            .opt("--tags", var("SHARED_TAG")),
    );
    s.blank().comment("Create Application Insights").run(
        &Command::az("monitor app-insights component create")
            .opt("--app", dq(p.appinsights_name))
            .opt("--resource-group", &rg)
            .opt("--location", var("LOCATION"))
            .opt("--application-type", "web")
            .opt("--tags", var("SHARED_TAG")),
    );
    s.blank()
        .comment("Get Application Insights Instrumentation Key")
        .capture("APPINSIGHTS_KEY", &insights.clone().tsv("instrumentationKey"))
        .blank()
        .comment("Get Application Insights Connection String")
        .capture("APPINSIGHTS_CONNECTION_STRING", &insights.clone().tsv("connectionString"));

    s.blank()
        .comment("Verification:")
        .comment("Azure Portal:")
        .comment(&format!("- Go to App Service Plans and check {}", p.asp_name))
        .comment(&format!("- Go to Application Insights and check {}", p.appinsights_name))
        .blank()
        .comment("CLI Verification:")
        .verify(&Command::az("appservice plan show").opt("--name", dq(p.asp_name)).opt("--resource-group", &rg).table())
        .verify(&insights.table())
        .line("echo \"$APPINSIGHTS_KEY\"")
        .line("echo \"$APPINSIGHTS_CONNECTION_STRING\"");
    s.finish()
}
