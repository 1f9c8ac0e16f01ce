use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub backend: Backend,
	pub namespace: Namespace,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Backend {
	pub url: String,
	pub timeout_ms: u64,
	/// Wait intervals for the one-time startup readiness gate. Tried in
	/// order; once exhausted, startup fails.
	#[serde(default = "default_startup_backoff_ms")]
	pub startup_backoff_ms: Vec<u64>,
	#[serde(default = "default_query_shards")]
	pub query_shards: u32,
}

#[derive(Debug, Deserialize)]
pub struct Namespace {
	/// Account component substituted into the data path for system-flagged
	/// executions.
	pub system_prefix: String,
	/// Accounts whose identifier ends with this separator address the system
	/// namespace. Classified once at the transport boundary.
	#[serde(default = "default_system_separator")]
	pub system_separator: String,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}

fn default_startup_backoff_ms() -> Vec<u64> {
	vec![500, 1_000, 2_000, 5_000, 10_000]
}

fn default_query_shards() -> u32 {
	2
}

fn default_system_separator() -> String {
	"_".to_string()
}
