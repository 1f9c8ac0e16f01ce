use serde_json::Value;

use quiver_domain::{Namespace, QueryDef};
use quiver_storage::schema;

use crate::{Error, QueryService, Result, resolve};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QueryHit {
	pub id: String,
	pub score: Option<f64>,
	pub source: QueryDef,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct QuerySearchResults {
	pub total: u64,
	pub hits: Vec<QueryHit>,
}

impl QueryService {
	/// Search the stored query definitions of a namespace with an opaque
	/// criteria object.
	pub async fn search_queries(
		&self,
		ns: &Namespace,
		criteria: &Value,
	) -> Result<QuerySearchResults> {
		let index = ns.document_index(schema::IDX_QUERY);
		let res = self.backend.search(&index, criteria).await?;
		let body = resolve::classify(res)?;

		parse_hits(&body)
	}
}

fn parse_hits(body: &Value) -> Result<QuerySearchResults> {
	let hits = body.get("hits").cloned().unwrap_or(Value::Null);
	// Older backends report a bare total, newer ones an object with a value.
	let total = match hits.get("total") {
		Some(Value::Number(number)) => number.as_u64().unwrap_or(0),
		Some(Value::Object(object)) => object.get("value").and_then(Value::as_u64).unwrap_or(0),
		_ => 0,
	};
	let mut out = Vec::new();

	if let Some(list) = hits.get("hits").and_then(Value::as_array) {
		for hit in list {
			let Some(source) = hit.get("_source") else {
				continue;
			};
			let source: QueryDef = serde_json::from_value(source.clone()).map_err(|err| {
				Error::BackendUnavailable {
					detail: format!("Stored query document could not be decoded: {err}."),
				}
			})?;

			out.push(QueryHit {
				id: hit.get("_id").and_then(Value::as_str).unwrap_or_default().to_string(),
				score: hit.get("_score").and_then(Value::as_f64),
				source,
			});
		}
	}

	Ok(QuerySearchResults { total, hits: out })
}
