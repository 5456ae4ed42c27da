use std::sync::Arc;

use trellis_service::{IngestRequest, Providers, RetrieveRequest};

use super::{HashEmbedding, ScriptedChat, TEST_VECTOR_DIM, build_service, test_config, test_db};

const CONTENT: &str = "Connection pooling keeps a warm set of database sessions ready.";

fn providers() -> Providers {
	Providers::new(
		Arc::new(ScriptedChat {
			classifier: None,
			summary: Some("connection pooling overview".to_string()),
			rewrite: None,
			rerank: None,
		}),
		Arc::new(HashEmbedding { vector_dim: TEST_VECTOR_DIM }),
	)
}

fn plain_retrieve(query: &str, project_name: Option<&str>) -> RetrieveRequest {
	RetrieveRequest {
		query: query.to_string(),
		project_name: project_name.map(String::from),
		top_k: None,
		similarity_threshold: Some(0.1),
		use_smart_query: Some(false),
		use_query_expansion: None,
		use_hyde: None,
		use_rerank: Some(false),
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TRELLIS_PG_DSN to run."]
async fn project_scope_limits_results_and_global_search_sees_everything() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping project scope test; set TRELLIS_PG_DSN.");
		return;
	};
	let cfg = test_config(test_db.dsn().to_string(), TEST_VECTOR_DIM);
	let service = build_service(cfg, providers()).await.expect("Failed to build service.");

	for project in ["A", "B"] {
		service
			.ingest(IngestRequest {
				content: CONTENT.to_string(),
				r#type: "tech_doc".to_string(),
				project_name: project.to_string(),
				title: None,
				metadata: None,
			})
			.await
			.expect("Ingest failed.");
	}

	let scoped = service
		.retrieve(plain_retrieve("connection pooling sessions", Some("A")))
		.await
		.expect("Scoped retrieve failed.");

	assert!(scoped.total_results >= 1);
	assert!(scoped.results.iter().all(|result| result.project_name == "A"));
	assert_eq!(scoped.project_name.as_deref(), Some("A"));
	assert!(scoped.query_strategy.is_none(), "Smart query was disabled.");

	let global = service
		.retrieve(plain_retrieve("connection pooling sessions", None))
		.await
		.expect("Global retrieve failed.");

	assert_eq!(global.total_results, 2);

	let mut projects: Vec<&str> =
		global.results.iter().map(|result| result.project_name.as_str()).collect();

	projects.sort_unstable();

	assert_eq!(projects, vec!["A", "B"]);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
