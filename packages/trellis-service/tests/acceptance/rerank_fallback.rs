use std::sync::Arc;

use trellis_service::{IngestRequest, Providers, RetrieveRequest};

use super::{HashEmbedding, ScriptedChat, TEST_VECTOR_DIM, build_service, test_config, test_db};

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TRELLIS_PG_DSN to run."]
async fn rerank_failure_degrades_to_vector_order() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping rerank_failure_degrades_to_vector_order; set TRELLIS_PG_DSN.");
		return;
	};
	let cfg = test_config(test_db.dsn().to_string(), TEST_VECTOR_DIM);
	let providers = Providers::new(
		Arc::new(ScriptedChat {
			classifier: None,
			summary: Some("kernel scheduling notes".to_string()),
			rewrite: None,
			// The rerank endpoint is down for this scenario.
			rerank: None,
		}),
		Arc::new(HashEmbedding { vector_dim: TEST_VECTOR_DIM }),
	);
	let service = build_service(cfg, providers).await.expect("Failed to build service.");
	let bodies = [
		"kernel",
		"kernel scheduling with a few extra words",
		"kernel scheduling discussed among many other unrelated topics padding this body out",
	];

	for body in bodies {
		service
			.ingest(IngestRequest {
				content: body.to_string(),
				r#type: "tech_doc".to_string(),
				project_name: "K".to_string(),
				title: None,
				metadata: None,
			})
			.await
			.expect("Ingest failed.");
	}

	let response = service
		.retrieve(RetrieveRequest {
			query: "kernel".to_string(),
			project_name: Some("K".to_string()),
			top_k: Some(2),
			similarity_threshold: Some(0.05),
			use_smart_query: Some(false),
			use_query_expansion: None,
			use_hyde: None,
			use_rerank: Some(true),
		})
		.await
		.expect("Retrieve must survive a rerank failure.");

	// top_k results in raw vector order, most similar first.
	assert_eq!(response.total_results, 2);
	assert_eq!(response.results.len(), 2);
	assert!(response.results[0].similarity >= response.results[1].similarity);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
