/// Owning namespace for stored query documents.
///
/// Classified exactly once, at the transport boundary, from the configured
/// separator suffix. Everything below the boundary matches on the variant
/// and never re-inspects string shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
	Tenant(String),
	System(String),
}

impl Namespace {
	pub fn classify(account: &str, system_separator: char) -> Self {
		if account.ends_with(system_separator) {
			Self::System(account.to_string())
		} else {
			Self::Tenant(account.to_string())
		}
	}

	pub fn account(&self) -> &str {
		match self {
			Self::Tenant(account) | Self::System(account) => account,
		}
	}

	/// Index holding the stored query documents of this namespace.
	///
	/// System identifiers already carry the trailing separator, so the
	/// tenant delimiter is omitted.
	pub fn document_index(&self, collection: &str) -> String {
		match self {
			Self::Tenant(account) => format!("{account}-{collection}"),
			Self::System(account) => format!("{account}{collection}"),
		}
	}
}

/// Whether a stored query executes against the caller's own data or the
/// shared system namespace. The definition itself is always fetched from
/// the caller's document index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionScope {
	Tenant,
	System,
}

/// Index pattern a compiled query is dispatched against.
pub fn data_index(account: &str, model: &str, idx_pattern: &str) -> String {
	format!("{account}-data-{model}{idx_pattern}")
}
