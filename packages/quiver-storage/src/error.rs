#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Http(#[from] reqwest::Error),
	#[error("Search backend did not become ready: {message}")]
	StartupGate { message: String },
}
