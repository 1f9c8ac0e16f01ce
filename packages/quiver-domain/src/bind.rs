use std::collections::{BTreeMap, HashMap};

use crate::query::Parameter;

/// Resolve the effective value for every declared parameter.
///
/// Caller-supplied values win over declared defaults; a declared parameter
/// with neither resolves to the empty string. Caller keys that are not
/// declared never enter the mapping, so requests cannot inject template
/// variables. Cannot fail.
pub fn bind(declared: &[Parameter], supplied: &HashMap<String, String>) -> BTreeMap<String, String> {
	declared
		.iter()
		.map(|param| {
			let value = supplied
				.get(&param.machine_name)
				.cloned()
				.unwrap_or_else(|| param.default_value.clone());

			(param.machine_name.clone(), value)
		})
		.collect()
}
