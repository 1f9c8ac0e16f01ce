use quiver_domain::{Namespace, QueryDef, compile};

use crate::{QueryService, Result};

impl QueryService {
	/// Fetch a stored definition for display.
	///
	/// When no template is present the structured `query` is re-populated
	/// by parsing the cached `query_json`; templated definitions are
	/// returned as stored, since their cached body is not authoritative.
	pub async fn get_query(&self, ns: &Namespace, id: &str) -> Result<QueryDef> {
		let mut def = self.fetch_definition(ns, id).await?;
		let templated =
			def.query_template.as_deref().is_some_and(|template| !template.trim().is_empty());

		if !templated
			&& def.query.is_none()
			&& let Some(json) = def.query_json.as_deref()
			&& !json.trim().is_empty()
		{
			def.query = Some(compile::compile(json)?);
		}

		Ok(def)
	}
}
