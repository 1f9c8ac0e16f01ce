use serde_json::Value;

use quiver_domain::{Namespace, QueryDef};
use quiver_storage::schema;

use crate::{Error, QueryService, Result, resolve};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpsertResponse {
	pub index: String,
	pub id: String,
	pub result: String,
}

impl QueryService {
	/// Whole-document replace, keyed by machine name within the namespace.
	///
	/// A directly-supplied structured `query` is serialized into
	/// `query_json` before storage and the structured field itself is
	/// cleared; a present template leaves `query_json` untouched.
	pub async fn upsert_query(&self, ns: &Namespace, mut def: QueryDef) -> Result<UpsertResponse> {
		def.normalize();
		def.validate()?;

		if let Some(query) = def.query.take() {
			let encoded =
				serde_json::to_string(&Value::Object(query)).map_err(|err| Error::InvalidRequest {
					message: format!("Structured query could not be encoded: {err}."),
				})?;

			def.query_json = Some(encoded);
		}

		let index = ns.document_index(schema::IDX_QUERY);

		tracing::info!(%index, machine_name = %def.machine_name, "Upserting query definition.");

		let doc = serde_json::to_value(&def).map_err(|err| Error::InvalidRequest {
			message: format!("Query definition could not be encoded: {err}."),
		})?;
		let res = self.backend.put_doc(&index, &def.machine_name, &doc).await?;
		let body = resolve::classify(res)?;

		Ok(UpsertResponse {
			index: body.get("_index").and_then(Value::as_str).unwrap_or(&index).to_string(),
			id: body.get("_id").and_then(Value::as_str).unwrap_or(&def.machine_name).to_string(),
			result: body.get("result").and_then(Value::as_str).unwrap_or("updated").to_string(),
		})
	}
}
