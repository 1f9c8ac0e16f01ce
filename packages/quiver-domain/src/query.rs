use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result, compile};

/// A declared, defaultable input bound into a query template at execution
/// time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameter {
	pub machine_name: String,
	#[serde(default)]
	pub default_value: String,
	#[serde(default)]
	pub display_name: String,
	#[serde(default)]
	pub description: String,
}

/// Declarative description of one expected output field. Opaque to the
/// engine, passed through to callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultField {
	pub machine_name: String,
	#[serde(default)]
	pub display_name: String,
	#[serde(default)]
	pub description: String,
}

/// A stored query definition, keyed by `machine_name` within an account
/// namespace. Upserts replace the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryDef {
	/// Lowercase identifier, unique per account. Lowercased on write.
	pub machine_name: String,
	#[serde(default)]
	pub display_name: String,
	#[serde(default, rename = "description_brief")]
	pub brief_description: String,
	#[serde(default)]
	pub description: String,
	#[serde(default)]
	pub group: String,
	/// Feeds the data path together with `idx_pattern`.
	#[serde(default)]
	pub model: String,
	/// Literal suffix (e.g. "-*") or a template string.
	#[serde(default)]
	pub idx_pattern: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query: Option<Map<String, Value>>,
	/// Cached serialization of the last directly-supplied structured query.
	/// Not authoritative while `query_template` is present.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query_json: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query_template: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub parameters: Vec<Parameter>,
	#[serde(default, rename = "fields", skip_serializing_if = "Vec::is_empty")]
	pub result_fields: Vec<ResultField>,
}

/// How a definition resolves at execution time. A non-empty template always
/// wins over stored structured content.
#[derive(Debug)]
pub enum QueryBody<'a> {
	Static(Map<String, Value>),
	Templated { template: &'a str, parameters: &'a [Parameter] },
}

impl QueryDef {
	pub fn normalize(&mut self) {
		self.machine_name = self.machine_name.to_lowercase();
	}

	pub fn validate(&self) -> Result<()> {
		if self.machine_name.trim().is_empty() {
			return Err(Error::InvalidDefinition {
				message: "machine_name must be non-empty.".to_string(),
			});
		}

		Ok(())
	}

	pub fn body(&self) -> Result<QueryBody<'_>> {
		if let Some(template) = self.query_template.as_deref()
			&& !template.trim().is_empty()
		{
			return Ok(QueryBody::Templated { template, parameters: &self.parameters });
		}
		if let Some(query) = self.query.as_ref() {
			return Ok(QueryBody::Static(query.clone()));
		}
		if let Some(json) = self.query_json.as_deref()
			&& !json.trim().is_empty()
		{
			return Ok(QueryBody::Static(compile::compile(json)?));
		}

		Err(Error::InvalidDefinition {
			message: format!(
				"Query {:?} has neither a structured query nor a query template.",
				self.machine_name
			),
		})
	}
}
