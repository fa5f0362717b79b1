use azscript_core::Settings;
use serde_json::json;

use crate::shell::{dq, var, Command, Script};

/// Cosmos DB containers and their partition key paths.
pub const CONTAINERS: &[(&str, &str)] = &[
    ("users", "/partitionKey"),
    ("conversations", "/id"),
    ("events", "/partitionKey"),
    ("responses", "/eventId"),
    ("chatLogs", "/userId"),
    ("knowledge", "/partitionKey"),
];

const EMBEDDING_DIMENSIONS: u32 = 1536;
const DEPLOYMENT_CAPACITY: u32 = 1;
const SEARCH_API_VERSION: &str = "2023-07-01-Preview";
const INDEX_FILE: &str = "/tmp/search-index.json";

pub struct DataAiParams<'a> {
    pub kv_name: &'a str,
    pub cosmos_name: &'a str,
    pub cosmos_db_name: &'a str,
    pub openai_name: &'a str,
    pub openai_region: &'a str,
    pub search_name: &'a str,
    pub search_sku: &'a str,
    pub search_index_name: &'a str,
    pub semantic_config_name: &'a str,
}

impl<'a> DataAiParams<'a> {
    pub fn from_settings(s: &'a Settings) -> Self {
        Self {
            kv_name: &s.kv_name,
            cosmos_name: &s.cosmos_name,
            cosmos_db_name: &s.cosmos_db_name,
            openai_name: &s.openai_name,
            openai_region: &s.openai_region,
            search_name: &s.search_name,
            search_sku: &s.search_sku,
            search_index_name: &s.search_index_name,
            semantic_config_name: &s.semantic_config_name,
        }
    }
}

fn field(name: &str, ty: &str, filterable: bool, sortable: bool) -> serde_json::Value {
    json!({
        "name": name,
        "type": ty,
        "searchable": true,
        "filterable": filterable,
        "sortable": sortable,
    })
}

/// Search index with a vector field and one semantic configuration.
pub fn search_index_definition(index_name: &str, semantic_config_name: &str) -> serde_json::Value {
    let mut id = field("id", "Edm.String", true, true);
    id["key"] = json!(true);
    let mut embedding = field("embedding", "Collection(Edm.Single)", false, false);
    embedding["dimensions"] = json!(EMBEDDING_DIMENSIONS);
    embedding["vectorSearchConfiguration"] = json!("vector-config");

    json!({
        "name": index_name,
        "fields": [
            id,
            field("title", "Edm.String", true, true),
            field("content", "Edm.String", false, false),
            field("category", "Edm.String", true, true),
            field("language", "Edm.String", true, true),
            field("tags", "Collection(Edm.String)", true, false),
            embedding,
        ],
        "vectorSearch": {
            "algorithmConfigurations": [ { "name": "vector-config", "kind": "hnsw" } ]
        },
        "semantic": {
            "configurations": [{
                "name": semantic_config_name,
                "prioritizedFields": {
                    "titleField": { "fieldName": "title" },
                    "contentFields": [ { "fieldName": "content" } ],
                    "keywordsFields": [ { "fieldName": "category" }, { "fieldName": "tags" } ]
                }
            }]
        }
    })
}

pub fn render(p: &DataAiParams) -> String {
    let rg = var("RG_NAME");
    let mut s = Script::section("Data & AI Services");

    s.comment("Create Key Vault").run(
        &Command::az("keyvault create")
            .opt("--name", dq(p.kv_name))
            .opt("--resource-group", &rg)
            .opt("--location", var("LOCATION"))
            .opt("--tags", var("SHARED_TAG")),
    );
    s.blank().comment("Create CosmosDB Account").run(
        &Command::az("cosmosdb create")
            .opt("--name", dq(p.cosmos_name))
            .opt("--resource-group", &rg)
            .opt("--locations", "regionName=\"$LOCATION\"")
            .opt("--tags", var("SHARED_TAG")),
    );
    s.blank().comment("Create database").run(
        &Command::az("cosmosdb sql database create")
            .opt("--account-name", dq(p.cosmos_name))
            .opt("--resource-group", &rg)
            .opt("--name", dq(p.cosmos_db_name)),
    );
    for (container, partition_key) in CONTAINERS {
        s.blank().comment(&format!("Create '{container}' container")).run(
            &Command::az("cosmosdb sql container create")
                .opt("--account-name", dq(p.cosmos_name))
                .opt("--resource-group", &rg)
                .opt("--database-name", dq(p.cosmos_db_name))
                .opt("--name", dq(container))
                .opt("--partition-key-path", dq(partition_key)),
        );
    }
    s.blank().comment("Get CosmosDB Connection String").capture(
        "COSMOS_CONNECTION_STRING",
        &Command::az("cosmosdb keys list")
            .opt("--name", dq(p.cosmos_name))
            .opt("--resource-group", &rg)
            .opt("--type", "connection-strings")
            .tsv("\"connectionStrings[0].connectionString\""),
    );

    s.blank()
        .comment("Create OpenAI service")
        .comment("Azure OpenAI is only offered in some regions, so it may differ from $LOCATION")
        .run(
            &Command::az("cognitiveservices account create")
                .opt("--name", dq(p.openai_name))
                .opt("--resource-group", &rg)
                .opt("--location", dq(p.openai_region))
                .opt("--kind", "OpenAI")
                .opt("--sku", "S0")
                .opt("--tags", var("SHARED_TAG")),
        );
    s.blank()
        .comment("Get Azure OpenAI endpoint and key")
        .capture(
            "AZURE_OPENAI_ENDPOINT",
            &Command::az("cognitiveservices account show")
                .opt("--name", dq(p.openai_name))
                .opt("--resource-group", &rg)
                .tsv("properties.endpoint"),
        )
        .blank()
        .capture(
            "AZURE_OPENAI_KEY",
            &Command::az("cognitiveservices account keys list")
                .opt("--name", dq(p.openai_name))
                .opt("--resource-group", &rg)
                .tsv("key1"),
        );

    s.blank().comment("Create OpenAI model deployments");
    for (model, version) in [("AZURE_OPENAI_MODEL", "MODEL_VERSION"), ("EMBEDDING_MODEL", "EMBEDDING_MODEL_VERSION")] {
        s.run(
            &Command::az("cognitiveservices account deployment create")
                .opt("--name", dq(p.openai_name))
                .opt("--resource-group", &rg)
                .opt("--deployment-name", var(model))
                .opt("--model-name", var(model))
                .opt("--model-version", var(version))
                .opt("--model-format", "OpenAI")
                .opt("--sku-name", "Standard")
                .opt("--sku-capacity", DEPLOYMENT_CAPACITY),
        )
        .blank();
    }

    s.comment("Create Azure Search service").run(
        &Command::az("search service create")
            .opt("--name", dq(p.search_name))
            .opt("--resource-group", &rg)
            .opt("--location", var("LOCATION"))
            .opt("--sku", dq(p.search_sku))
            .opt("--tags", var("SHARED_TAG")),
    );
    s.blank()
        .comment("Get Azure Search key")
        .capture(
            "AZURE_SEARCH_KEY",
            &Command::az("search admin-key show")
                .opt("--service-name", dq(p.search_name))
                .opt("--resource-group", &rg)
                .tsv("primaryKey"),
        )
        .blank()
        .assign("AZURE_SEARCH_ENDPOINT", dq(&format!("https://{}.search.windows.net", p.search_name)));

    let index = search_index_definition(p.search_index_name, p.semantic_config_name);
    s.blank()
        .comment("Write the index definition")
        .heredoc(INDEX_FILE, &format!("{index:#}"))
        .blank()
        .comment("Create the index using the REST API")
        .run(
            &Command::az("rest")
                .opt("--method", "put")
                .opt(
                    "--uri",
                    format!(
                        "\"${{AZURE_SEARCH_ENDPOINT}}/indexes/{}?api-version={SEARCH_API_VERSION}\"",
                        p.search_index_name
                    ),
                )
                .opt("--headers", "\"Content-Type=application/json\" \"api-key=${AZURE_SEARCH_KEY}\"")
                .opt("--body", format!("@{INDEX_FILE}")),
        )
        .blank()
        .comment("Clean up")
        .line(format!("rm {INDEX_FILE}"));

    s.blank()
        .comment("Verification:")
        .comment("Azure Portal:")
        .comment(&format!("- Go to Key Vaults and check {}", p.kv_name))
        .comment(&format!("- Go to Azure Cosmos DB and check {}", p.cosmos_name))
        .comment(&format!("- Go to Azure OpenAI and check {}", p.openai_name))
        .comment(&format!("- Go to Azure AI Search and check {}", p.search_name))
        .blank()
        .comment("CLI Verification:")
        .verify(&Command::az("keyvault show").opt("--name", dq(p.kv_name)).opt("--resource-group", &rg).table())
        .verify(&Command::az("cosmosdb show").opt("--name", dq(p.cosmos_name)).opt("--resource-group", &rg).table())
        .verify(
            &Command::az("cosmosdb sql database show")
                .opt("--name", dq(p.cosmos_db_name))
                .opt("--account-name", dq(p.cosmos_name))
                .opt("--resource-group", &rg)
                .table(),
        )
        .verify(
            &Command::az("cosmosdb sql container list")
                .opt("--database-name", dq(p.cosmos_db_name))
                .opt("--account-name", dq(p.cosmos_name))
                .opt("--resource-group", &rg)
                .table(),
        )
        .verify(
            &Command::az("cognitiveservices account show")
                .opt("--name", dq(p.openai_name))
                .opt("--resource-group", &rg)
                .table(),
        )
        .verify(
            &Command::az("cognitiveservices account deployment list")
                .opt("--name", dq(p.openai_name))
                .opt("--resource-group", &rg)
                .table(),
        )
        .verify(&Command::az("search service show").opt("--name", dq(p.search_name)).opt("--resource-group", &rg).table())
        .verify(
            &Command::az("search index show")
                .opt("--name", dq(p.search_index_name))
                .opt("--service-name", dq(p.search_name))
                .opt("--resource-group", &rg)
                .table(),
        );
    s.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DataAiParams<'static> {
        DataAiParams {
            kv_name: "kv-itz-dev-jpe-001",
            cosmos_name: "cosmos-itz-dev",
            cosmos_db_name: "AnpiDb",
            openai_name: "oai-itz-dev",
            openai_region: "eastus",
            search_name: "srch-itz-dev",
            search_sku: "Basic",
            search_index_name: "anpi-knowledge",
            semantic_config_name: "my-semantic-config",
        }
    }

    #[test]
    fn creates_every_container() {
        let out = render(&params());
        for (name, key) in CONTAINERS {
            assert!(out.contains(&format!("--name \"{name}\" \\\n  --partition-key-path \"{key}\"")));
        }
    }

    #[test]
    fn index_definition_carries_names() {
        let index = search_index_definition("anpi-knowledge", "sem");
        assert_eq!(index["name"], "anpi-knowledge");
        assert_eq!(index["semantic"]["configurations"][0]["name"], "sem");
        assert_eq!(index["fields"][6]["dimensions"], 1536);
        assert_eq!(index["fields"][0]["key"], true);
    }

    #[test]
    fn openai_uses_its_own_region() {
        let out = render(&params());
        assert!(out.contains("--name \"oai-itz-dev\" \\\n  --resource-group \"$RG_NAME\" \\\n  --location \"eastus\""));
        assert!(out.contains("--sku-capacity 1\n"));
    }
}
