use crate::shell::{var, Command, Script};

/// Selects the subscription and creates the resource group named by `$RG_NAME`.
pub fn render() -> String {
    let mut s = Script::section("Resource Group");
    s.comment("Set Azure subscription")
        .run(&Command::az("account set").opt("--subscription", var("SUBSCRIPTION_ID")))
        .blank()
        .comment("Create Resource Group")
        .run(
            &Command::az("group create")
                .opt("--name", var("RG_NAME"))
                .opt("--location", var("LOCATION"))
                .opt("--tags", var("SHARED_TAG")),
        )
        .blank()
        .comment("Verification:")
        .comment("Azure Portal: Go to Resource Groups and search for the resource group")
        .comment("CLI Verification:")
        .verify(&Command::az("group show").opt("--name", var("RG_NAME")).table());
    s.finish()
}
