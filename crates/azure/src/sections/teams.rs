use azscript_core::Settings;

use crate::shell::{dq, var, Command, Script};

pub struct TeamsParams<'a> {
    pub teams_app_name: &'a str,
    pub teams_redirect_uri: &'a str,
    pub kv_name: &'a str,
    pub bot_name: &'a str,
}

impl<'a> TeamsParams<'a> {
    pub fn from_settings(s: &'a Settings) -> Self {
        Self {
            teams_app_name: &s.teams_app_name,
            teams_redirect_uri: &s.teams_redirect_uri,
            kv_name: &s.kv_name,
            bot_name: &s.bot_name,
        }
    }
}

pub fn render(p: &TeamsParams) -> String {
    let mut s = Script::section("Teams Integration");

    s.comment("Create App Registration for Teams").run(
        &Command::az("ad app create")
            .opt("--display-name", dq(p.teams_app_name))
            .opt("--sign-in-audience", "AzureADMyOrg")
            .opt("--web-redirect-uris", dq(p.teams_redirect_uri)),
    );
    s.blank()
        .comment("Get the app ID")
        .capture_inline("TEAMS_APP_ID", &Command::az("ad app show").opt("--display-name", dq(p.teams_app_name)).tsv("appId"))
        .blank()
        .comment("Create App Secret")
        .capture_inline(
            "TEAMS_APP_SECRET",
            &Command::az("ad app credential reset")
                .opt("--id", var("TEAMS_APP_ID"))
                .opt("--credential-description", dq("Bot secret"))
                .tsv("password"),
        );

    let secret_set = |name: &str, source: &str| {
        Command::az("keyvault secret set").opt("--vault-name", dq(p.kv_name)).opt("--name", name).opt("--value", var(source))
    };
    s.blank()
        .comment("Store Teams app credentials in Key Vault")
        .run_inline(&secret_set("anpi-TeamsAppId", "TEAMS_APP_ID"))
        .run_inline(&secret_set("anpi-TeamsAppSecret", "TEAMS_APP_SECRET"));

    s.blank().comment("Enable the Microsoft Teams channel on the bot").run(
        &Command::az("bot msteams create").opt("--name", dq(p.bot_name)).opt("--resource-group", var("RG_NAME")),
    );

    s.blank()
        .comment("Verification:")
        .comment("Azure Portal:")
        .comment(&format!("- Go to Microsoft Entra ID > App Registrations and check for {}", p.teams_app_name))
        .comment("- Check Key Vault for Teams app secrets")
        .blank()
        .comment("CLI Verification:")
        .verify(&Command::az("ad app list").opt("--display-name", dq(p.teams_app_name)).table())
        .verify(
            &Command::az("keyvault secret show")
                .opt("--vault-name", dq(p.kv_name))
                .opt("--name", "anpi-TeamsAppId")
                .tsv("value"),
        )
        .verify(&Command::az("bot msteams show").opt("--name", dq(p.bot_name)).opt("--resource-group", var("RG_NAME")).table());
    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_app_and_channel() {
        let out = render(&TeamsParams {
            teams_app_name: "ANPI Teams Bot Test",
            teams_redirect_uri: "https://token.botframework.com/.auth/web/redirect",
            kv_name: "kv-itz-test-jpe-001",
            bot_name: "bot-itz-anpi-test",
        });
        assert!(out.contains("TEAMS_APP_ID=$(az ad app show --display-name \"ANPI Teams Bot Test\" --query appId -o tsv)"));
        assert!(out.contains("--credential-description \"Bot secret\""));
        assert!(out.contains("az bot msteams create \\\n  --name \"bot-itz-anpi-test\" \\\n  --resource-group \"$RG_NAME\"\n"));
    }
}
