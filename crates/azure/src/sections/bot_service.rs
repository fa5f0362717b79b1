use azscript_core::Settings;

use crate::shell::{dq, var, Command, Script};

pub struct BotServiceParams<'a> {
    pub bot_name: &'a str,
    pub app_name: &'a str,
    pub apim_name: &'a str,
    pub api_id: &'a str,
    pub api_path: &'a str,
}

impl<'a> BotServiceParams<'a> {
    pub fn from_settings(s: &'a Settings) -> Self {
        Self {
            bot_name: &s.bot_name,
            app_name: &s.app_name,
            apim_name: &s.apim_name,
            api_id: &s.api_id,
            api_path: &s.api_path,
        }
    }
}

pub fn render(p: &BotServiceParams) -> String {
    let rg = var("RG_NAME");
    let mut s = Script::section("Bot Service");

    s.comment("Create Bot Service").run(
        &Command::az("bot create")
            .opt("--resource-group", &rg)
            .opt("--name", dq(p.bot_name))
            .opt("--appid", var("MS_APP_ID"))
            .opt("--endpoint", dq(&format!("https://{}.azurewebsites.net/api/messages", p.app_name)))
            .opt("--app-type", var("MS_APP_TYPE"))
            .opt("--tenant-id", var("MS_APP_TENANT_ID")),
    );

    s.blank()
        .comment("Get APIM API URL")
        .capture(
            "APIM_API_URL",
            &Command::az("apim api show")
                .opt("--resource-group", &rg)
                .opt("--service-name", dq(p.apim_name))
                .opt("--api-id", dq(p.api_id))
                .tsv("serviceUrl"),
        )
        .if_empty("APIM_API_URL", |f| {
            f.comment("Older CLI versions leave serviceUrl empty; derive it from the service name")
                .assign("APIM_API_URL", dq(&format!("https://{}.azure-api.net/{}", p.apim_name, p.api_path)));
        })
        .blank()
        .assign("APIM_MESSAGES_ENDPOINT", "\"$APIM_API_URL/api/messages\"");

    s.blank().comment("Update Bot Service to use APIM URL").run(
        &Command::az("bot update")
            .opt("--resource-group", &rg)
            .opt("--name", dq(p.bot_name))
            .opt("--endpoint", var("APIM_MESSAGES_ENDPOINT")),
    );

    let bot_show = Command::az("bot show").opt("--name", dq(p.bot_name)).opt("--resource-group", &rg);
    s.blank()
        .comment("Verification:")
        .comment("Azure Portal:")
        .comment(&format!("- Go to Azure Bot Services and check {}", p.bot_name))
        .comment("- Verify the endpoint is configured to use APIM")
        .blank()
        .comment("CLI Verification:")
        .verify(&bot_show.clone().table())
        .comment("Verify the endpoint points to APIM")
        .verify(&bot_show.tsv("properties.endpoint"));
    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_has_name_derived_fallback() {
        let out = render(&BotServiceParams {
            bot_name: "bot-itz-anpi-prod",
            app_name: "app-itz-anpi-prod-001",
            apim_name: "apim-itz-fjp",
            api_id: "anpi-bot-api",
            api_path: "anpi",
        });
        let lookup = out.find("APIM_API_URL=$(az apim api show").unwrap();
        let fallback = out.find("  APIM_API_URL=\"https://apim-itz-fjp.azure-api.net/anpi\"").unwrap();
        let endpoint = out.find("APIM_MESSAGES_ENDPOINT=\"$APIM_API_URL/api/messages\"").unwrap();
        assert!(lookup < fallback && fallback < endpoint);
        assert!(out.contains("--app-type \"$MS_APP_TYPE\""));
        assert!(out.contains("--endpoint \"https://app-itz-anpi-prod-001.azurewebsites.net/api/messages\""));
    }
}
