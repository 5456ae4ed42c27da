use std::sync::Arc;

use trellis_service::{IngestRequest, Providers, RetrieveRequest};

use super::{HashEmbedding, ScriptedChat, TEST_VECTOR_DIM, build_service, test_config, test_db};

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TRELLIS_PG_DSN to run."]
async fn small_document_round_trips_to_an_exact_hit() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping small_document_round_trips_to_an_exact_hit; set TRELLIS_PG_DSN.");
		return;
	};
	let cfg = test_config(test_db.dsn().to_string(), TEST_VECTOR_DIM);
	let providers = Providers::new(
		Arc::new(ScriptedChat {
			classifier: Some(
				"{\"strategy\": \"direct\", \"reason\": \"exact identifier\", \"confidence\": 0.9}"
					.to_string(),
			),
			summary: Some(
				"getUserById getUserById getUserById getUserById getUserById getUserById \
				getUserById getUserById"
					.to_string(),
			),
			rewrite: None,
			rerank: Some("[{\"id\": 0, \"score\": 9}]".to_string()),
		}),
		Arc::new(HashEmbedding { vector_dim: TEST_VECTOR_DIM }),
	);
	let service = build_service(cfg, providers).await.expect("Failed to build service.");
	let content = "The getUserById API fetches a user by primary key.";

	let ingested = service
		.ingest(IngestRequest {
			content: content.to_string(),
			r#type: "api_doc".to_string(),
			project_name: "P".to_string(),
			title: None,
			metadata: None,
		})
		.await
		.expect("Ingest failed.");

	assert_eq!(ingested.r#type, "API_DOC");
	assert_eq!(ingested.project_name, "P");
	assert_eq!(ingested.parent_chunks_created, 1);
	assert_eq!(ingested.child_chunks_created, 1);
	assert_eq!(ingested.embeddings_created, 1);
	assert_eq!(ingested.strategies.len(), 1);
	assert_eq!(ingested.strategies[0].parent_chunk_size, 2_000);
	assert_eq!(ingested.content_hash.len(), 64);

	let response = service
		.retrieve(RetrieveRequest {
			query: "getUserById".to_string(),
			project_name: Some("P".to_string()),
			top_k: None,
			similarity_threshold: None,
			use_smart_query: Some(true),
			use_query_expansion: None,
			use_hyde: None,
			use_rerank: None,
		})
		.await
		.expect("Retrieve failed.");

	assert_eq!(response.query_strategy.as_deref(), Some("direct"));
	assert_eq!(response.total_results, 1);

	let hit = &response.results[0];

	assert_eq!(hit.document_id, ingested.document_id);
	assert_eq!(hit.child_chunk_content, content);
	assert_eq!(hit.parent_chunk_content, content);
	assert_eq!(hit.document_type, "API_DOC");
	assert!(hit.similarity >= 0.5, "Unexpected similarity: {}", hit.similarity);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
