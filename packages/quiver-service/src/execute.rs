use std::collections::HashMap;

use serde_json::Value;

use quiver_domain::{ExecutionScope, Namespace, QueryDef};
use quiver_storage::schema;

use crate::{Error, QueryService, Result, resolve};

impl QueryService {
	/// Execute a stored query by id.
	///
	/// The definition is always fetched from the caller's own document
	/// index; for system executions only the dispatch path swaps the
	/// account component for the configured system prefix.
	pub async fn execute_stored(
		&self,
		ns: &Namespace,
		id: &str,
		exec_scope: ExecutionScope,
		supplied: &HashMap<String, String>,
	) -> Result<Value> {
		let def = self.fetch_definition(ns, id).await?;
		let data_account = match exec_scope {
			ExecutionScope::Tenant => ns.account(),
			ExecutionScope::System => self.cfg.namespace.system_prefix.as_str(),
		};
		let resolved = self.resolve(&def, supplied, data_account)?;

		self.dispatch(resolved).await
	}

	pub(crate) async fn fetch_definition(&self, ns: &Namespace, id: &str) -> Result<QueryDef> {
		let index = ns.document_index(schema::IDX_QUERY);
		let res = self.backend.get_doc(&index, id).await?;

		if res.status == 404 {
			return Err(Error::DefinitionNotFound { index, id: id.to_string() });
		}

		let body = resolve::classify(res)?;
		let source = body.get("_source").cloned().ok_or_else(|| Error::BackendUnavailable {
			detail: format!("Document response for {id:?} is missing _source."),
		})?;

		serde_json::from_value(source).map_err(|err| Error::BackendUnavailable {
			detail: format!("Stored query document {id:?} could not be decoded: {err}."),
		})
	}
}
