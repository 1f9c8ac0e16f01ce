use std::collections::HashMap;

use serde_json::{Value, json};

use quiver_domain::{ExecutionScope, Namespace, Parameter, QueryDef};
use quiver_service::{Error, QueryService};
use quiver_storage::SearchBackend;
use quiver_testkit::StubBackend;

fn test_config(url: String) -> quiver_config::Config {
	quiver_config::Config {
		service: quiver_config::Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		backend: quiver_config::Backend {
			url,
			timeout_ms: 2_000,
			startup_backoff_ms: vec![10],
			query_shards: 2,
		},
		namespace: quiver_config::Namespace {
			system_prefix: "system".to_string(),
			system_separator: "_".to_string(),
		},
		security: quiver_config::Security { bind_localhost_only: true },
	}
}

fn service(stub: &StubBackend) -> QueryService {
	let cfg = test_config(stub.url());
	let backend = SearchBackend::new(&cfg.backend).expect("Failed to build backend client.");

	QueryService::new(cfg, backend)
}

fn parameter(machine_name: &str, default_value: &str) -> Parameter {
	Parameter {
		machine_name: machine_name.to_string(),
		default_value: default_value.to_string(),
		..Parameter::default()
	}
}

fn templated_def(machine_name: &str) -> QueryDef {
	QueryDef {
		machine_name: machine_name.to_string(),
		model: "widgets".to_string(),
		idx_pattern: "-*".to_string(),
		query_template: Some(r#"{"match":{"field":"{{ status }}"}}"#.to_string()),
		parameters: vec![parameter("status", "active")],
		..QueryDef::default()
	}
}

#[tokio::test]
async fn upsert_populates_query_json_and_get_round_trips() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());
	let mut query = serde_json::Map::new();

	query.insert("match_all".to_string(), json!({}));

	let def = QueryDef {
		machine_name: "Daily_Totals".to_string(),
		model: "ts".to_string(),
		idx_pattern: "-*".to_string(),
		query: Some(query.clone()),
		..QueryDef::default()
	};
	let ack = service.upsert_query(&ns, def).await.expect("Upsert must succeed.");

	assert_eq!(ack.id, "daily_totals");

	let stored = stub.doc("acme-queries", "daily_totals").expect("Document must be stored.");

	assert!(stored.get("query").is_none(), "Structured query must be cleared before storage.");

	let cached: Value = serde_json::from_str(
		stored["query_json"].as_str().expect("query_json must be a string."),
	)
	.expect("query_json must parse.");

	assert_eq!(cached, Value::Object(query.clone()));

	let fetched =
		service.get_query(&ns, "daily_totals").await.expect("Get must succeed.");

	assert_eq!(fetched.query, Some(query));
}

#[tokio::test]
async fn executes_templated_query_with_default_parameter() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());

	service.upsert_query(&ns, templated_def("daily")).await.expect("Upsert must succeed.");
	stub.set_search_hits("acme-data-widgets-*", vec![json!({ "_id": "1", "_source": {} })]);

	service
		.execute_stored(&ns, "daily", ExecutionScope::Tenant, &HashMap::new())
		.await
		.expect("Execution must succeed.");

	let dispatch = stub
		.searches()
		.into_iter()
		.find(|search| search.index.contains("-data-"))
		.expect("A data search must be dispatched.");

	assert_eq!(dispatch.index, "acme-data-widgets-*");
	assert_eq!(dispatch.body, json!({ "match": { "field": "active" } }));
}

#[tokio::test]
async fn caller_override_beats_default_in_body_and_index_pattern() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());
	let def = QueryDef {
		machine_name: "yearly".to_string(),
		model: "ts".to_string(),
		idx_pattern: "-{{ year }}*".to_string(),
		query_template: Some(r#"{"range":{"year":"{{ year }}"}}"#.to_string()),
		parameters: vec![parameter("year", "2019")],
		..QueryDef::default()
	};

	service.upsert_query(&ns, def).await.expect("Upsert must succeed.");
	stub.set_search_hits("acme-data-ts-2020*", vec![json!({ "_id": "1", "_source": {} })]);

	let supplied = HashMap::from([("year".to_string(), "2020".to_string())]);

	service
		.execute_stored(&ns, "yearly", ExecutionScope::Tenant, &supplied)
		.await
		.expect("Execution must succeed.");

	let dispatch = stub
		.searches()
		.into_iter()
		.find(|search| search.index.contains("-data-"))
		.expect("A data search must be dispatched.");

	assert_eq!(dispatch.index, "acme-data-ts-2020*");
	assert_eq!(dispatch.body, json!({ "range": { "year": "2020" } }));
}

#[tokio::test]
async fn template_wins_over_stale_query_json() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());
	let mut def = templated_def("daily");

	def.query_json = Some(r#"{"stale":true}"#.to_string());

	service.upsert_query(&ns, def).await.expect("Upsert must succeed.");
	stub.set_search_hits("acme-data-widgets-*", vec![json!({ "_id": "1", "_source": {} })]);

	service
		.execute_stored(&ns, "daily", ExecutionScope::Tenant, &HashMap::new())
		.await
		.expect("Execution must succeed.");

	let dispatch = stub
		.searches()
		.into_iter()
		.find(|search| search.index.contains("-data-"))
		.expect("A data search must be dispatched.");

	assert_eq!(dispatch.body, json!({ "match": { "field": "active" } }));
}

#[tokio::test]
async fn system_execution_diverges_dispatch_path_from_document_path() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());

	// Stored under the caller's own document index.
	service.upsert_query(&ns, templated_def("daily")).await.expect("Upsert must succeed.");
	assert!(stub.doc("acme-queries", "daily").is_some());

	stub.set_search_hits("system-data-widgets-*", vec![json!({ "_id": "1", "_source": {} })]);

	service
		.execute_stored(&ns, "daily", ExecutionScope::System, &HashMap::new())
		.await
		.expect("System execution must succeed.");

	let dispatch = stub
		.searches()
		.into_iter()
		.find(|search| search.index.contains("-data-"))
		.expect("A data search must be dispatched.");

	assert_eq!(dispatch.index, "system-data-widgets-*");
}

#[tokio::test]
async fn missing_definition_is_not_found() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());

	let err = service
		.execute_stored(&ns, "absent", ExecutionScope::Tenant, &HashMap::new())
		.await
		.expect_err("Expected a not-found error.");

	assert!(matches!(err, Error::DefinitionNotFound { .. }));
}

#[tokio::test]
async fn missing_target_index_is_a_client_query_error() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());

	service.upsert_query(&ns, templated_def("daily")).await.expect("Upsert must succeed.");

	let err = service
		.execute_stored(&ns, "daily", ExecutionScope::Tenant, &HashMap::new())
		.await
		.expect_err("Expected a client query error.");

	match err {
		Error::ClientQuery { status, detail } => {
			assert_eq!(status, 404);
			assert!(detail.contains("no such index"));
		},
		other => panic!("Expected ClientQuery, got {other:?}."),
	}
}

#[tokio::test]
async fn malformed_template_is_a_template_error() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());
	let mut def = templated_def("broken");

	def.query_template = Some("{% if %}".to_string());

	service.upsert_query(&ns, def).await.expect("Upsert must succeed.");

	let err = service
		.execute_stored(&ns, "broken", ExecutionScope::Tenant, &HashMap::new())
		.await
		.expect_err("Expected a template error.");

	assert!(matches!(err, Error::Template { .. }));
}

#[tokio::test]
async fn rendered_non_json_body_is_a_compile_error() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());
	let mut def = templated_def("almost");

	// Renders fine, parses as nothing.
	def.query_template = Some(r#"{"match": {{ status }} }"#.to_string());
	def.parameters = vec![parameter("status", "")];

	service.upsert_query(&ns, def).await.expect("Upsert must succeed.");

	let err = service
		.execute_stored(&ns, "almost", ExecutionScope::Tenant, &HashMap::new())
		.await
		.expect_err("Expected a compile error.");

	match err {
		Error::Compile { line, rendered, .. } => {
			assert_eq!(line, 1);
			assert!(rendered.contains(r#"{"match":"#));
		},
		other => panic!("Expected Compile, got {other:?}."),
	}
}

#[tokio::test]
async fn run_query_executes_inline_definitions() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());

	stub.set_search_hits("acme-data-widgets-*", vec![json!({ "_id": "1", "_source": {} })]);

	let result = service
		.run_query(&ns, &templated_def("inline"), &HashMap::new())
		.await
		.expect("Run must succeed.");

	assert_eq!(result["hits"]["total"], 1);

	let dispatch = stub.searches().into_iter().next().expect("A search must be dispatched.");

	assert_eq!(dispatch.index, "acme-data-widgets-*");
}

#[tokio::test]
async fn search_queries_decodes_stored_definitions() {
	let stub = StubBackend::spawn().await.expect("Failed to spawn stub backend.");
	let service = service(&stub);
	let ns = Namespace::Tenant("acme".to_string());

	service.upsert_query(&ns, templated_def("first")).await.expect("Upsert must succeed.");
	service.upsert_query(&ns, templated_def("second")).await.expect("Upsert must succeed.");

	let results = service
		.search_queries(&ns, &json!({ "query": { "match_all": {} } }))
		.await
		.expect("Search must succeed.");

	assert_eq!(results.total, 2);
	assert_eq!(results.hits.len(), 2);
	assert!(results.hits.iter().all(|hit| hit.source.model == "widgets"));
}
