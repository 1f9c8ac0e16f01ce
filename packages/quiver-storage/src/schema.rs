use serde_json::{Value, json};

/// Collection name for stored query documents. Namespaced per account as
/// `{account}-queries` (tenant) or `{account}queries` (system).
pub const IDX_QUERY: &str = "queries";

/// Index template for the queries collections, applied once at startup.
pub fn queries_index_template(shards: u32) -> Value {
	json!({
		"index_patterns": [format!("*-{IDX_QUERY}")],
		"settings": {
			"index": {
				"number_of_shards": shards
			}
		},
		"mappings": {
			"_doc": {
				"_source": {
					"enabled": true
				},
				"properties": {
					"machine_name": { "type": "text" },
					"display_name": { "type": "text" },
					"description_brief": { "type": "text" },
					"description": { "type": "text" },
					"group": { "type": "keyword" },
					"model": { "type": "keyword" },
					"idx_pattern": { "type": "text" },
					"query_template": { "type": "text" },
					"query_json": { "type": "text" },
					"parameters": { "type": "nested" },
					"fields": { "type": "nested" }
				}
			}
		}
	})
}
