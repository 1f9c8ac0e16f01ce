use serde_json::{Map, Value};

use crate::{Error, Result};

/// Parse rendered query-body text into a structured, order-insensitive
/// object.
///
/// A syntactically valid template can still render text that is not valid
/// JSON; that is reported with the parser's position and the rendered text,
/// never repaired.
pub fn compile(rendered: &str) -> Result<Map<String, Value>> {
	let value: Value = serde_json::from_str(rendered).map_err(|err| Error::Compile {
		line: err.line(),
		column: err.column(),
		message: err.to_string(),
		rendered: rendered.to_string(),
	})?;

	match value {
		Value::Object(map) => Ok(map),
		other => Err(Error::Compile {
			line: 1,
			column: 1,
			message: format!("Expected a JSON object, found {}.", kind_of(&other)),
			rendered: rendered.to_string(),
		}),
	}
}

fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
