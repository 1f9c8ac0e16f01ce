use std::collections::HashMap;

use serde_json::Value;

use quiver_domain::{Namespace, QueryDef};

use crate::{QueryService, Result};

impl QueryService {
	/// One-off execution of an inline definition, always against the
	/// caller's own data namespace.
	pub async fn run_query(
		&self,
		ns: &Namespace,
		def: &QueryDef,
		supplied: &HashMap<String, String>,
	) -> Result<Value> {
		let resolved = self.resolve(def, supplied, ns.account())?;

		self.dispatch(resolved).await
	}
}
