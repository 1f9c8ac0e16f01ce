use std::collections::HashMap;

use serde_json::{Map, Value};
use time::OffsetDateTime;

use quiver_domain::{QueryBody, QueryDef, bind, compile, scope};
use quiver_storage::BackendResponse;

use crate::{Error, QueryService, RenderStage, Result};

/// A definition made concrete for one execution: compiled body plus the data
/// path it dispatches to. Lives only for the duration of one request.
#[derive(Debug)]
pub(crate) struct ResolvedQuery {
	pub(crate) body: Map<String, Value>,
	pub(crate) data_index: String,
}

impl QueryService {
	/// Turn a stored or inline definition into an executable query.
	///
	/// Templated definitions run bind → render body → render index pattern →
	/// compile; static definitions use the stored structured body as-is.
	/// `data_account` is the account component of the dispatch path, which
	/// diverges from the document namespace for system executions.
	pub(crate) fn resolve(
		&self,
		def: &QueryDef,
		supplied: &HashMap<String, String>,
		data_account: &str,
	) -> Result<ResolvedQuery> {
		let at = OffsetDateTime::now_utc();

		match def.body()? {
			QueryBody::Templated { template, parameters } => {
				let bound = bind::bind(parameters, supplied);
				let rendered_body =
					self.renderer.render(template, &bound, at).map_err(|err| Error::Template {
						stage: RenderStage::QueryBody,
						detail: format!("{err:#}"),
					})?;
				let idx_pattern = self
					.renderer
					.render(&def.idx_pattern, &bound, at)
					.map_err(|err| Error::Template {
						stage: RenderStage::IndexPattern,
						detail: format!("{err:#}"),
					})?;
				let body = compile::compile(&rendered_body)?;

				Ok(ResolvedQuery {
					body,
					data_index: scope::data_index(data_account, &def.model, &idx_pattern),
				})
			},
			QueryBody::Static(body) => Ok(ResolvedQuery {
				body,
				data_index: scope::data_index(data_account, &def.model, &def.idx_pattern),
			}),
		}
	}

	/// Dispatch a resolved query and classify the backend's answer.
	pub(crate) async fn dispatch(&self, resolved: ResolvedQuery) -> Result<Value> {
		let body = Value::Object(resolved.body);
		let res = self.backend.search(&resolved.data_index, &body).await?;

		tracing::info!(code = res.status, path = %resolved.data_index, "Search dispatched.");

		classify(res)
	}
}

/// Status in [200,300) is success and the payload is returned verbatim;
/// [400,500) is a client/query failure (commonly a missing target index);
/// everything else is the backend being unavailable. Nothing is retried.
pub(crate) fn classify(res: BackendResponse) -> Result<Value> {
	match res.status {
		200..=299 => Ok(res.body),
		400..=499 =>
			Err(Error::ClientQuery { status: res.status, detail: backend_reason(&res.body) }),
		_ => Err(Error::BackendUnavailable {
			detail: format!("status {}: {}", res.status, backend_reason(&res.body)),
		}),
	}
}

/// Surface the backend's own error reason when it sent one.
fn backend_reason(body: &Value) -> String {
	body.get("error")
		.and_then(|err| err.get("reason"))
		.and_then(Value::as_str)
		.map(str::to_string)
		.unwrap_or_else(|| body.to_string())
}
