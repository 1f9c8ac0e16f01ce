use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result, schema};

/// A response from the search backend. The transport succeeded; status and
/// body are data for the caller to classify.
#[derive(Debug)]
pub struct BackendResponse {
	pub status: u16,
	pub body: Value,
}

impl BackendResponse {
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

pub struct SearchBackend {
	http: Client,
	base_url: String,
}

impl SearchBackend {
	pub fn new(cfg: &quiver_config::Backend) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;

		Ok(Self { http, base_url: cfg.url.clone() })
	}

	pub async fn get_doc(&self, index: &str, id: &str) -> Result<BackendResponse> {
		let url = format!("{}/{index}/_doc/{id}", self.base_url);
		let res = self.http.get(url).send().await?;

		read(res).await
	}

	pub async fn put_doc(&self, index: &str, id: &str, doc: &Value) -> Result<BackendResponse> {
		let url = format!("{}/{index}/_doc/{id}", self.base_url);
		let res = self.http.put(url).json(doc).send().await?;

		read(res).await
	}

	pub async fn search(&self, index: &str, body: &Value) -> Result<BackendResponse> {
		let url = format!("{}/{index}/_search", self.base_url);
		let res = self.http.post(url).json(body).send().await?;

		read(res).await
	}

	pub async fn put_index_template(&self, name: &str, body: &Value) -> Result<BackendResponse> {
		let url = format!("{}/_template/{name}", self.base_url);
		let res = self.http.put(url).json(body).send().await?;

		read(res).await
	}

	/// One-time startup readiness gate.
	///
	/// Applies the queries index template, retrying over the configured wait
	/// sequence. Creating-if-absent is idempotent; exhausting the sequence
	/// fails process startup. Per-request execution paths never retry.
	pub async fn ensure_queries_template(&self, shards: u32, backoff_ms: &[u64]) -> Result<()> {
		let template = schema::queries_index_template(shards);
		let attempts = backoff_ms.len() + 1;
		let mut last_error = String::new();

		for attempt in 1..=attempts {
			match self.put_index_template(schema::IDX_QUERY, &template).await {
				Ok(res) if res.is_success() => {
					tracing::info!(attempt, "Queries index template applied.");

					return Ok(());
				},
				Ok(res) => {
					last_error = format!("status {}: {}", res.status, res.body);
				},
				Err(err) => {
					last_error = err.to_string();
				},
			}

			if let Some(wait_ms) = backoff_ms.get(attempt - 1) {
				tracing::warn!(attempt, wait_ms, "Search backend not ready; backing off.");

				tokio::time::sleep(Duration::from_millis(*wait_ms)).await;
			}
		}

		Err(Error::StartupGate { message: last_error })
	}
}

async fn read(res: reqwest::Response) -> Result<BackendResponse> {
	let status = res.status().as_u16();
	let text = res.text().await?;
	let body = if text.is_empty() {
		Value::Null
	} else {
		serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text))
	};

	Ok(BackendResponse { status, body })
}
