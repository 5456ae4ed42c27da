use std::sync::{Arc, Mutex};

use trellis_service::{Providers, RetrieveRequest};

use super::{ScriptedChat, SpyEmbedding, TEST_VECTOR_DIM, build_service, test_config, test_db};

const HYDE_DOC: &str = "Database connections are configured through the storage.postgres \
	section: set dsn to the connection string and pool_max_conns to the pool ceiling. The \
	service opens the pool at startup and fails fast when the DSN is unreachable.";

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TRELLIS_PG_DSN to run."]
async fn question_queries_embed_a_hypothetical_document() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping question_queries_embed_a_hypothetical_document; set TRELLIS_PG_DSN.");
		return;
	};
	let cfg = test_config(test_db.dsn().to_string(), TEST_VECTOR_DIM);
	let seen = Arc::new(Mutex::new(Vec::new()));
	let providers = Providers::new(
		Arc::new(ScriptedChat {
			classifier: Some(
				"{\"strategy\": \"hyde\", \"reason\": \"concept question\", \"confidence\": 0.8}"
					.to_string(),
			),
			summary: None,
			rewrite: Some(HYDE_DOC.to_string()),
			rerank: None,
		}),
		Arc::new(SpyEmbedding { vector_dim: TEST_VECTOR_DIM, seen: seen.clone() }),
	);
	let service = build_service(cfg, providers).await.expect("Failed to build service.");
	let query = "如何配置数据库连接?";

	let response = service
		.retrieve(RetrieveRequest {
			query: query.to_string(),
			project_name: None,
			top_k: None,
			similarity_threshold: None,
			use_smart_query: Some(true),
			use_query_expansion: None,
			use_hyde: None,
			use_rerank: Some(false),
		})
		.await
		.expect("Retrieve failed.");

	assert_eq!(response.query_strategy.as_deref(), Some("hyde"));
	assert_eq!(response.strategy_reason.as_deref(), Some("concept question"));
	assert_eq!(response.total_results, 0);

	let embedded = {
		let seen = seen.lock().unwrap_or_else(|err| err.into_inner());

		seen.last().cloned().expect("Expected the query embedding to be captured.")
	};
	let embedded_chars = embedded.chars().count();

	assert_ne!(embedded, query);
	assert!(
		(150..=400).contains(&embedded_chars),
		"Unexpected embedded text length: {embedded_chars}"
	);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TRELLIS_PG_DSN to run."]
async fn failed_rewrite_falls_back_to_the_original_query() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping failed_rewrite_falls_back_to_the_original_query; set TRELLIS_PG_DSN.");
		return;
	};
	let cfg = test_config(test_db.dsn().to_string(), TEST_VECTOR_DIM);
	let seen = Arc::new(Mutex::new(Vec::new()));
	let providers = Providers::new(
		Arc::new(ScriptedChat {
			classifier: Some(
				"{\"strategy\": \"hyde\", \"reason\": \"concept question\", \"confidence\": 0.8}"
					.to_string(),
			),
			summary: None,
			// The rewrite leg fails; the query path must stay available.
			rewrite: None,
			rerank: None,
		}),
		Arc::new(SpyEmbedding { vector_dim: TEST_VECTOR_DIM, seen: seen.clone() }),
	);
	let service = build_service(cfg, providers).await.expect("Failed to build service.");
	let query = "how do I configure database connections?";

	let response = service
		.retrieve(RetrieveRequest {
			query: query.to_string(),
			project_name: None,
			top_k: None,
			similarity_threshold: None,
			use_smart_query: Some(true),
			use_query_expansion: None,
			use_hyde: None,
			use_rerank: Some(false),
		})
		.await
		.expect("Retrieve must survive a failed rewrite.");

	assert_eq!(response.query_strategy.as_deref(), Some("hyde"));
	assert!(
		response.strategy_reason.as_deref().unwrap_or("").contains("rewrite unavailable"),
		"Expected the reason to note the fallback."
	);

	let embedded = {
		let seen = seen.lock().unwrap_or_else(|err| err.into_inner());

		seen.last().cloned().expect("Expected the query embedding to be captured.")
	};

	assert_eq!(embedded, query);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
