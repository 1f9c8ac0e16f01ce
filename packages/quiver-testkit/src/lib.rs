//! In-process stub search backend for hermetic service and API tests.
//!
//! Speaks just enough of the consumed backend surface: `_doc` get/put over
//! an in-memory store, `_search` with canned hits per index pattern, and
//! `_template` acknowledgement. Every `_search` dispatch is recorded so
//! tests can assert on the resolved path and the compiled body.

mod error;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	net::SocketAddr,
	sync::{Arc, Mutex},
};

use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	routing::{post, put},
};
use serde_json::{Value, json};
use tokio::{net::TcpListener, task::JoinHandle};

/// One recorded `_search` dispatch.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
	pub index: String,
	pub body: Value,
}

#[derive(Default)]
struct StubState {
	docs: Mutex<HashMap<(String, String), Value>>,
	searches: Mutex<Vec<RecordedSearch>>,
	canned_hits: Mutex<HashMap<String, Vec<Value>>>,
	templates: Mutex<HashMap<String, Value>>,
}

pub struct StubBackend {
	addr: SocketAddr,
	state: Arc<StubState>,
	handle: JoinHandle<()>,
}

impl StubBackend {
	pub async fn spawn() -> Result<Self> {
		let state = Arc::new(StubState::default());
		let app = router(state.clone());
		let listener = TcpListener::bind("127.0.0.1:0")
			.await
			.map_err(|err| Error::Message(format!("Failed to bind stub backend: {err}.")))?;
		let addr = listener
			.local_addr()
			.map_err(|err| Error::Message(format!("Failed to read stub backend address: {err}.")))?;
		let handle = tokio::spawn(async move {
			let _ = axum::serve(listener, app).await;
		});

		Ok(Self { addr, state, handle })
	}

	pub fn url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn insert_doc(&self, index: &str, id: &str, doc: Value) {
		let mut docs = self.state.docs.lock().unwrap_or_else(|err| err.into_inner());

		docs.insert((index.to_string(), id.to_string()), doc);
	}

	pub fn doc(&self, index: &str, id: &str) -> Option<Value> {
		let docs = self.state.docs.lock().unwrap_or_else(|err| err.into_inner());

		docs.get(&(index.to_string(), id.to_string())).cloned()
	}

	/// Register canned `_search` hits for an exact requested index string
	/// (wildcards included, e.g. `acme-data-ts-2020*`).
	pub fn set_search_hits(&self, index: &str, hits: Vec<Value>) {
		let mut canned = self.state.canned_hits.lock().unwrap_or_else(|err| err.into_inner());

		canned.insert(index.to_string(), hits);
	}

	pub fn searches(&self) -> Vec<RecordedSearch> {
		let searches = self.state.searches.lock().unwrap_or_else(|err| err.into_inner());

		searches.clone()
	}

	pub fn template_names(&self) -> Vec<String> {
		let templates = self.state.templates.lock().unwrap_or_else(|err| err.into_inner());

		templates.keys().cloned().collect()
	}
}
impl Drop for StubBackend {
	fn drop(&mut self) {
		self.handle.abort();
	}
}

fn router(state: Arc<StubState>) -> Router {
	Router::new()
		.route("/_template/{name}", put(put_template))
		.route("/{index}/_doc/{id}", put(put_doc).get(get_doc))
		.route("/{index}/_search", post(search))
		.with_state(state)
}

async fn put_template(
	State(state): State<Arc<StubState>>,
	Path(name): Path<String>,
	Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
	let mut templates = state.templates.lock().unwrap_or_else(|err| err.into_inner());

	templates.insert(name, body);

	(StatusCode::OK, Json(json!({ "acknowledged": true })))
}

async fn put_doc(
	State(state): State<Arc<StubState>>,
	Path((index, id)): Path<(String, String)>,
	Json(doc): Json<Value>,
) -> (StatusCode, Json<Value>) {
	let mut docs = state.docs.lock().unwrap_or_else(|err| err.into_inner());
	let created = docs.insert((index.clone(), id.clone()), doc).is_none();
	let (status, result) =
		if created { (StatusCode::CREATED, "created") } else { (StatusCode::OK, "updated") };

	(status, Json(json!({ "_index": index, "_id": id, "result": result })))
}

async fn get_doc(
	State(state): State<Arc<StubState>>,
	Path((index, id)): Path<(String, String)>,
) -> (StatusCode, Json<Value>) {
	let docs = state.docs.lock().unwrap_or_else(|err| err.into_inner());

	match docs.get(&(index.clone(), id.clone())) {
		Some(doc) => (
			StatusCode::OK,
			Json(json!({ "_index": index, "_id": id, "found": true, "_source": doc })),
		),
		None =>
			(StatusCode::NOT_FOUND, Json(json!({ "_index": index, "_id": id, "found": false }))),
	}
}

async fn search(
	State(state): State<Arc<StubState>>,
	Path(index): Path<String>,
	Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
	{
		let mut searches = state.searches.lock().unwrap_or_else(|err| err.into_inner());

		searches.push(RecordedSearch { index: index.clone(), body });
	}

	let canned = {
		let canned = state.canned_hits.lock().unwrap_or_else(|err| err.into_inner());

		canned.get(&index).cloned()
	};

	if let Some(hits) = canned {
		return (StatusCode::OK, Json(hits_payload(hits)));
	}

	let stored: Vec<Value> = {
		let docs = state.docs.lock().unwrap_or_else(|err| err.into_inner());

		docs.iter()
			.filter(|((doc_index, _), _)| *doc_index == index)
			.map(|((doc_index, id), doc)| {
				json!({ "_index": doc_index, "_id": id, "_score": 1.0, "_source": doc })
			})
			.collect()
	};

	if stored.is_empty() {
		return (
			StatusCode::NOT_FOUND,
			Json(json!({
				"error": {
					"type": "index_not_found_exception",
					"reason": format!("no such index [{index}]")
				},
				"status": 404
			})),
		);
	}

	(StatusCode::OK, Json(hits_payload(stored)))
}

fn hits_payload(hits: Vec<Value>) -> Value {
	json!({
		"took": 1,
		"timed_out": false,
		"hits": {
			"total": hits.len(),
			"max_score": 1.0,
			"hits": hits
		}
	})
}
