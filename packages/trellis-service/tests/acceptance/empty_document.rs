use std::sync::Arc;

use trellis_service::{Error, IngestRequest, Providers};

use super::{HashEmbedding, ScriptedChat, TEST_VECTOR_DIM, build_service, test_config, test_db};

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TRELLIS_PG_DSN to run."]
async fn empty_content_ingests_successfully_with_zero_chunks() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping empty_content_ingests_successfully_with_zero_chunks; set TRELLIS_PG_DSN.");
		return;
	};
	let cfg = test_config(test_db.dsn().to_string(), TEST_VECTOR_DIM);
	let providers = Providers::new(
		// No chat call may happen for an empty document.
		Arc::new(ScriptedChat { classifier: None, summary: None, rewrite: None, rerank: None }),
		Arc::new(HashEmbedding { vector_dim: TEST_VECTOR_DIM }),
	);
	let service = build_service(cfg, providers).await.expect("Failed to build service.");

	let ingested = service
		.ingest(IngestRequest {
			content: String::new(),
			r#type: "general".to_string(),
			project_name: "empty".to_string(),
			title: Some("placeholder".to_string()),
			metadata: None,
		})
		.await
		.expect("Empty ingest must succeed.");

	assert_eq!(ingested.parent_chunks_created, 0);
	assert_eq!(ingested.child_chunks_created, 0);
	assert_eq!(ingested.embeddings_created, 0);
	assert!(ingested.strategies.is_empty());

	let fetched =
		service.get_document(ingested.document_id).await.expect("Fetch must succeed.");

	assert_eq!(fetched.content, "");
	assert_eq!(fetched.title.as_deref(), Some("placeholder"));

	let deleted =
		service.delete_document(ingested.document_id).await.expect("Delete must succeed.");

	assert!(deleted.deleted);
	assert!(matches!(
		service.get_document(ingested.document_id).await,
		Err(Error::NotFound { .. })
	));
	assert!(matches!(
		service.delete_document(ingested.document_id).await,
		Err(Error::NotFound { .. })
	));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TRELLIS_PG_DSN to run."]
async fn blank_project_name_is_rejected() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping blank_project_name_is_rejected; set TRELLIS_PG_DSN.");
		return;
	};
	let cfg = test_config(test_db.dsn().to_string(), TEST_VECTOR_DIM);
	let providers = Providers::new(
		Arc::new(ScriptedChat { classifier: None, summary: None, rewrite: None, rerank: None }),
		Arc::new(HashEmbedding { vector_dim: TEST_VECTOR_DIM }),
	);
	let service = build_service(cfg, providers).await.expect("Failed to build service.");

	let result = service
		.ingest(IngestRequest {
			content: "some text".to_string(),
			r#type: "general".to_string(),
			project_name: "  ".to_string(),
			title: None,
			metadata: None,
		})
		.await;

	assert!(matches!(result, Err(Error::InvalidRequest { .. })));

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
