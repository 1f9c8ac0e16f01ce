pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which of the two per-execution renders failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
	QueryBody,
	IndexPattern,
}
impl std::fmt::Display for RenderStage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Self::QueryBody => "query body",
			Self::IndexPattern => "index pattern",
		})
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Template failed for the {stage}: {detail}")]
	Template { stage: RenderStage, detail: String },
	#[error("Rendered query did not compile (line {line}, column {column}): {message}")]
	Compile { line: usize, column: usize, message: String, rendered: String },
	#[error("Query {id:?} not found in {index}.")]
	DefinitionNotFound { index: String, id: String },
	#[error("Search backend rejected the query with status {status}: {detail}")]
	ClientQuery { status: u16, detail: String },
	#[error("Search backend unavailable: {detail}")]
	BackendUnavailable { detail: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}

impl From<quiver_storage::Error> for Error {
	fn from(err: quiver_storage::Error) -> Self {
		Self::BackendUnavailable { detail: err.to_string() }
	}
}

impl From<quiver_domain::Error> for Error {
	fn from(err: quiver_domain::Error) -> Self {
		match err {
			quiver_domain::Error::InvalidDefinition { message } => Self::InvalidRequest { message },
			quiver_domain::Error::Compile { line, column, message, rendered } =>
				Self::Compile { line, column, message, rendered },
		}
	}
}
