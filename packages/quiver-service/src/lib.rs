pub mod execute;
pub mod get;
pub mod run;
pub mod search;
pub mod upsert;

mod error;
mod resolve;

pub use error::{Error, RenderStage, Result};
pub use search::{QueryHit, QuerySearchResults};
pub use upsert::UpsertResponse;

use std::{collections::BTreeMap, sync::Arc};

use time::OffsetDateTime;

use quiver_config::Config;
use quiver_storage::SearchBackend;

/// Rendering capability behind the engine, so the concrete templating
/// technology stays swappable. `at` is the render instant shared by both
/// renders of one execution.
pub trait Renderer
where
	Self: Send + Sync,
{
	fn render(
		&self,
		template: &str,
		params: &BTreeMap<String, String>,
		at: OffsetDateTime,
	) -> color_eyre::Result<String>;
}

struct DefaultRenderer;
impl Renderer for DefaultRenderer {
	fn render(
		&self,
		template: &str,
		params: &BTreeMap<String, String>,
		at: OffsetDateTime,
	) -> color_eyre::Result<String> {
		Ok(quiver_render::render(template, params, at)?)
	}
}

pub struct QueryService {
	pub cfg: Config,
	pub backend: SearchBackend,
	renderer: Arc<dyn Renderer>,
}

impl QueryService {
	pub fn new(cfg: Config, backend: SearchBackend) -> Self {
		Self { cfg, backend, renderer: Arc::new(DefaultRenderer) }
	}

	pub fn with_renderer(cfg: Config, backend: SearchBackend, renderer: Arc<dyn Renderer>) -> Self {
		Self { cfg, backend, renderer }
	}
}
