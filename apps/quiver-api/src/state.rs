use std::sync::Arc;

use quiver_service::QueryService;
use quiver_storage::SearchBackend;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<QueryService>,
}
impl AppState {
	pub async fn new(config: quiver_config::Config) -> color_eyre::Result<Self> {
		let backend = SearchBackend::new(&config.backend)?;

		backend
			.ensure_queries_template(
				config.backend.query_shards,
				&config.backend.startup_backoff_ms,
			)
			.await?;

		let service = QueryService::new(config, backend);

		Ok(Self { service: Arc::new(service) })
	}
}
