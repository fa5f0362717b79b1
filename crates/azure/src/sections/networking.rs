use azscript_core::{Environment, Settings};

use crate::shell::{dq, var, Command, Script};

const AGW_INITIAL_CAPACITY: u32 = 2;
const AGW_MIN_CAPACITY: u32 = 0;
const AGW_MAX_CAPACITY: u32 = 10;
const HTTP_PORT: u32 = 80;
const DEFAULT_RULE_PRIORITY: u32 = 100;
const APIM_RULE_PRIORITY: u32 = 200;
const WAF_POLICY_SETTINGS: &str =
    "state=Enabled mode=Prevention requestBodyCheck=false maxRequestBodySizeInKb=128 fileUploadLimitInMb=100";
const APIM_POOL: &str = "apim-backend-pool";

pub struct NetworkingParams<'a> {
    pub env: Environment,
    pub vnet_name: &'a str,
    pub vnet_address_prefix: &'a str,
    pub subnet_name: &'a str,
    pub subnet_prefix: &'a str,
    pub pip_name: &'a str,
    pub agw_name: &'a str,
    pub waf_name: &'a str,
    pub apim_name: &'a str,
}

impl<'a> NetworkingParams<'a> {
    pub fn from_settings(s: &'a Settings) -> Self {
        Self {
            env: s.env,
            vnet_name: &s.vnet_name,
            vnet_address_prefix: &s.vnet_address_prefix,
            subnet_name: &s.subnet_name,
            subnet_prefix: &s.subnet_prefix,
            pip_name: &s.pip_name,
            agw_name: &s.agw_name,
            waf_name: &s.waf_name,
            apim_name: &s.apim_name,
        }
    }
}

/// VNet, public IP, WAF policy and an Application Gateway whose backend pool
/// points at the API Management gateway created in the previous section.
pub fn render(p: &NetworkingParams) -> String {
    let rg = var("RG_NAME");
    let agw = dq(p.agw_name);
    let mut s = Script::section("Networking");

    s.comment("Create Virtual Network").run(
        &Command::az("network vnet create")
            .opt("--name", dq(p.vnet_name))
            .opt("--resource-group", &rg)
            .opt("--location", var("LOCATION"))
            .opt("--address-prefix", dq(p.vnet_address_prefix))
            .opt("--tags", var("SHARED_TAG")),
    );
    s.blank().comment("Create subnet").run(
        &Command::az("network vnet subnet create")
            .opt("--name", dq(p.subnet_name))
            .opt("--resource-group", &rg)
            .opt("--vnet-name", dq(p.vnet_name))
            .opt("--address-prefix", dq(p.subnet_prefix)),
    );
    s.blank().comment("Create Public IP for Application Gateway").run(
        &Command::az("network public-ip create")
            .opt("--name", dq(p.pip_name))
            .opt("--resource-group", &rg)
            .opt("--location", var("LOCATION"))
            .opt("--allocation-method", "Static")
            .opt("--sku", "Standard")
            .opt("--zone", "1 2 3")
            .opt("--dns-name", dq(&format!("anpi-{}", p.env)))
            .opt("--tags", var("SHARED_TAG")),
    );
    s.blank().comment("Create WAF policy").run(
        &Command::az("network application-gateway waf-policy create")
            .opt("--name", dq(p.waf_name))
            .opt("--resource-group", &rg)
            .opt("--location", var("LOCATION"))
            .opt("--tags", var("SHARED_TAG"))
            .opt("--policy-settings", WAF_POLICY_SETTINGS),
    );
    s.blank().comment("Get WAF policy ID for use in Application Gateway creation").capture_inline(
        "WAF_POLICY_ID",
        &Command::az("network application-gateway waf-policy show")
            .opt("--name", dq(p.waf_name))
            .opt("--resource-group", &rg)
            .tsv("id"),
    );

    let apim_show = Command::az("apim show").opt("--name", dq(p.apim_name)).opt("--resource-group", &rg);
    s.blank()
        .comment("Resolve the API Management gateway host for the backend pool")
        .capture_inline("APIM_HOST", &apim_show.clone().tsv("hostname"));
    s.blank()
        .comment("Older Azure CLI versions do not expose 'hostname'; derive it from the gateway URL")
        .if_empty("APIM_HOST", |f| {
            f.capture_inline("APIM_GATEWAY_URL", &apim_show.clone().tsv("properties.gatewayUrl"))
                .assign("APIM_HOST", "${APIM_GATEWAY_URL#https://}")
                .comment("Strip any path component")
                .assign("APIM_HOST", "${APIM_HOST%%/*}");
        });

    s.blank().echo("Creating Application Gateway with minimal configuration...").run(
        &Command::az("network application-gateway create")
            .opt("--name", &agw)
            .opt("--resource-group", &rg)
            .opt("--location", var("LOCATION"))
            .opt("--vnet-name", dq(p.vnet_name))
            .opt("--subnet", dq(p.subnet_name))
            .opt("--public-ip-address", dq(p.pip_name))
            .opt("--sku", "Standard_v2")
            .opt("--capacity", AGW_INITIAL_CAPACITY)
            .opt("--frontend-port", HTTP_PORT)
            .opt("--http-settings-cookie-based-affinity", "Disabled")
            .opt("--http-settings-port", HTTP_PORT)
            .opt("--http-settings-protocol", "Http")
            .opt("--routing-rule-type", "Basic")
            .opt("--priority", DEFAULT_RULE_PRIORITY)
            .opt("--tags", "\"Project=AnpiBot Environment=$ENVIRONMENT\""),
    );
    s.blank().echo("Upgrading to WAF_v2...").run(
        &Command::az("network application-gateway update")
            .opt("--name", &agw)
            .opt("--resource-group", &rg)
            .opt("--sku", "WAF_v2")
            .flag("--enable-http2"),
    );
    s.blank().echo("Setting autoscale configuration...").run(
        &Command::az("network application-gateway autoscale-configuration update")
            .opt("--gateway-name", &agw)
            .opt("--resource-group", &rg)
            .opt("--min-capacity", AGW_MIN_CAPACITY)
            .opt("--max-capacity", AGW_MAX_CAPACITY),
    );
    s.blank().echo("Setting availability zones...").run(
        &Command::az("network application-gateway update")
            .opt("--name", &agw)
            .opt("--resource-group", &rg)
            .opt("--zones", "1 2 3"),
    );
    s.blank().echo("Linking WAF policy...").run(
        &Command::az("network application-gateway waf-policy-link update")
            .opt("--resource-group", &rg)
            .opt("--gateway-name", &agw)
            .opt("--policy", var("WAF_POLICY_ID")),
    );

    s.blank().comment("Get name of the default HTTP listener").capture(
        "LISTENER_NAME",
        &Command::az("network application-gateway http-listener list")
            .opt("--gateway-name", &agw)
            .opt("--resource-group", &rg)
            .tsv("\"[0].name\""),
    );
    s.blank().comment("Get name of the default HTTP settings").capture(
        "HTTP_SETTINGS_NAME",
        &Command::az("network application-gateway http-settings list")
            .opt("--gateway-name", &agw)
            .opt("--resource-group", &rg)
            .tsv("\"[0].name\""),
    );
    s.blank().comment("Backend pool pointing at the API Management gateway").run(
        &Command::az("network application-gateway address-pool create")
            .opt("--name", dq(APIM_POOL))
            .opt("--gateway-name", &agw)
            .opt("--resource-group", &rg)
            .opt("--servers", var("APIM_HOST")),
    );
    s.blank().comment("Route the default listener to the API Management pool").run(
        &Command::az("network application-gateway rule create")
            .opt("--gateway-name", &agw)
            .opt("--resource-group", &rg)
            .opt("--name", dq("apim-rule"))
            .opt("--http-listener", var("LISTENER_NAME"))
            .opt("--http-settings", var("HTTP_SETTINGS_NAME"))
            .opt("--address-pool", dq(APIM_POOL))
            .opt("--priority", APIM_RULE_PRIORITY)
            .opt("--rule-type", "Basic"),
    );

    s.blank()
        .comment("Verification:")
        .comment("Azure Portal:")
        .comment(&format!("- Go to Virtual Networks and check {}", p.vnet_name))
        .comment(&format!("- Go to Application Gateway and check {}", p.agw_name))
        .comment(&format!("- Go to Public IP addresses and check {}", p.pip_name))
        .blank()
        .comment("CLI Verification:")
        .verify(&Command::az("network vnet show").opt("--name", dq(p.vnet_name)).opt("--resource-group", &rg).table())
        .verify(
            &Command::az("network vnet subnet show")
                .opt("--name", dq(p.subnet_name))
                .opt("--resource-group", &rg)
                .opt("--vnet-name", dq(p.vnet_name))
                .table(),
        )
        .verify(&Command::az("network public-ip show").opt("--name", dq(p.pip_name)).opt("--resource-group", &rg).table())
        .verify(&Command::az("network application-gateway show").opt("--name", &agw).opt("--resource-group", &rg).table())
        .verify(
            &Command::az("network application-gateway address-pool list")
                .opt("--gateway-name", &agw)
                .opt("--resource-group", &rg)
                .table(),
        )
        .verify(
            &Command::az("network application-gateway waf-policy show")
                .opt("--name", dq(p.waf_name))
                .opt("--resource-group", &rg)
                .table(),
        )
        .verify(
            &Command::az("network application-gateway rule list")
                .opt("--gateway-name", &agw)
                .opt("--resource-group", &rg)
                .table(),
        );
    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> NetworkingParams<'static> {
        NetworkingParams {
            env: Environment::Test,
            vnet_name: "vnet-itz-test-jpe-001",
            vnet_address_prefix: "10.0.0.0/16",
            subnet_name: "snet-itz-test-jpe-001",
            subnet_prefix: "10.0.1.0/24",
            pip_name: "pip-itz-anpi-test-jpe-001",
            agw_name: "agw-itz-test-jpe-001",
            waf_name: "waf-itz-test-jpe-001",
            apim_name: "apim-itz-fjp",
        }
    }

    #[test]
    fn gateway_host_has_fallback() {
        let out = render(&params());
        let primary = out.find("APIM_HOST=$(az apim show").unwrap();
        let fallback = out.find("if [ -z \"$APIM_HOST\" ]; then").unwrap();
        let pool = out.find("--servers \"$APIM_HOST\"").unwrap();
        assert!(primary < fallback && fallback < pool);
        assert!(out.contains("  APIM_HOST=${APIM_GATEWAY_URL#https://}\n"));
    }

    #[test]
    fn capacities_are_numeric() {
        let out = render(&params());
        assert!(out.contains("--capacity 2 \\\n"));
        assert!(out.contains("--max-capacity 10\n"));
        assert!(out.contains("--priority 200 \\\n"));
    }

    #[test]
    fn dns_label_uses_environment() {
        assert!(render(&params()).contains("--dns-name \"anpi-test\""));
    }
}
