pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query definition: {message}")]
	InvalidDefinition { message: String },
	#[error("Query body is not a JSON object (line {line}, column {column}): {message}")]
	Compile { line: usize, column: usize, message: String, rendered: String },
}
