use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

use quiver_domain::{ExecutionScope, Namespace, QueryDef};
use quiver_service::{Error as ServiceError, QuerySearchResults, UpsertResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/healthz", get(health))
		.route("/v1/run/{account}", post(run))
		.route("/v1/exec/{account}/{id}", get(exec))
		.route("/v1/upsert/{account}", post(upsert))
		.route("/v1/get/{account}/{id}", get(get_query))
		.route("/v1/search/{account}", post(search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

/// The tenant/system namespace decision is made here, once, from the
/// configured separator. Everything below the transport boundary consumes
/// the typed value.
fn namespace(state: &AppState, account: &str) -> Namespace {
	let separator = state.service.cfg.namespace.system_separator.chars().next().unwrap_or('_');

	Namespace::classify(account, separator)
}

async fn run(
	State(state): State<AppState>,
	Path(account): Path<String>,
	Query(params): Query<HashMap<String, String>>,
	Json(def): Json<QueryDef>,
) -> Result<Json<Value>, ApiError> {
	let ns = namespace(&state, &account);
	let result = state.service.run_query(&ns, &def, &params).await?;

	Ok(Json(result))
}

async fn exec(
	State(state): State<AppState>,
	Path((account, id)): Path<(String, String)>,
	Query(mut params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
	let ns = namespace(&state, &account);
	// The system flag is transport input, not a template parameter.
	let exec_scope = match params.remove("system").as_deref() {
		Some("true") | Some("1") => ExecutionScope::System,
		_ => ExecutionScope::Tenant,
	};
	let result = state.service.execute_stored(&ns, &id, exec_scope, &params).await?;

	Ok(Json(result))
}

async fn upsert(
	State(state): State<AppState>,
	Path(account): Path<String>,
	Json(def): Json<QueryDef>,
) -> Result<Json<UpsertResponse>, ApiError> {
	let ns = namespace(&state, &account);
	let ack = state.service.upsert_query(&ns, def).await?;

	Ok(Json(ack))
}

async fn get_query(
	State(state): State<AppState>,
	Path((account, id)): Path<(String, String)>,
) -> Result<Json<QueryDef>, ApiError> {
	let ns = namespace(&state, &account);
	let def = state.service.get_query(&ns, &id).await?;

	Ok(Json(def))
}

async fn search(
	State(state): State<AppState>,
	Path(account): Path<String>,
	Json(criteria): Json<Value>,
) -> Result<Json<QuerySearchResults>, ApiError> {
	let ns = namespace(&state, &account);
	let results = state.service.search_queries(&ns, &criteria).await?;

	Ok(Json(results))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, error_code) = match &err {
			ServiceError::Template { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "template_error"),
			ServiceError::Compile { .. } =>
				(StatusCode::UNPROCESSABLE_ENTITY, "query_compile_error"),
			ServiceError::DefinitionNotFound { .. } => (StatusCode::NOT_FOUND, "query_not_found"),
			ServiceError::ClientQuery { .. } => (StatusCode::NOT_FOUND, "index_not_found"),
			ServiceError::BackendUnavailable { .. } =>
				(StatusCode::BAD_GATEWAY, "backend_unavailable"),
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
		};

		Self::new(status, error_code, err.to_string())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
