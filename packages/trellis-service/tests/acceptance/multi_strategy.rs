use std::sync::Arc;

use trellis_chunking::ChunkStrategy;
use trellis_service::{IngestRequest, Providers};

use super::{
	HashEmbedding, ScriptedChat, TEST_VECTOR_DIM, build_service, test_config_with_strategies,
	test_db,
};

async fn table_count(pool: &sqlx::PgPool, table: &str) -> i64 {
	let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
		.fetch_one(pool)
		.await
		.expect("Count query must succeed.");

	count
}

#[tokio::test]
#[ignore = "Requires external Postgres with pgvector. Set TRELLIS_PG_DSN to run."]
async fn each_strategy_builds_its_own_tree_and_delete_cascades_all_of_them() {
	let Some(test_db) = test_db().await else {
		eprintln!("Skipping multi strategy test; set TRELLIS_PG_DSN.");
		return;
	};
	let strategies = vec![
		ChunkStrategy::default(),
		ChunkStrategy {
			parent_chunk_size: 200,
			child_chunk_size: 80,
			overlap_percent: 10,
			name: Some("fine".to_string()),
		},
	];
	let cfg = test_config_with_strategies(test_db.dsn().to_string(), TEST_VECTOR_DIM, strategies);
	let providers = Providers::new(
		Arc::new(ScriptedChat {
			classifier: None,
			summary: Some("ingestion pipeline summary".to_string()),
			rewrite: None,
			rerank: None,
		}),
		Arc::new(HashEmbedding { vector_dim: TEST_VECTOR_DIM }),
	);
	let service = build_service(cfg, providers).await.expect("Failed to build service.");
	let content = "The ingestion pipeline splits documents into parent spans and child spans. \
		Each parent span receives a model generated summary. Each child span is embedded with \
		its parent context attached. The retriever searches child vectors and returns parent \
		content for reading. Deleting a document removes every span and embedding it owns."
		.to_string();

	let ingested = service
		.ingest(IngestRequest {
			content,
			r#type: "tech".to_string(),
			project_name: "pipeline".to_string(),
			title: Some("Pipeline".to_string()),
			metadata: Some(serde_json::json!({ "source": "unit" })),
		})
		.await
		.expect("Ingest failed.");

	assert_eq!(ingested.strategies.len(), 2);
	assert_eq!(ingested.strategies[1].name.as_deref(), Some("fine"));
	// The default strategy fits the whole text in one parent; the fine one
	// must split it further.
	assert!(ingested.parent_chunks_created > 2);
	assert!(ingested.child_chunks_created >= ingested.parent_chunks_created);
	assert_eq!(ingested.embeddings_created, ingested.child_chunks_created);

	let pool = &service.db.pool;

	assert_eq!(
		table_count(pool, "parent_chunks").await,
		ingested.parent_chunks_created as i64
	);
	assert_eq!(table_count(pool, "child_chunks").await, ingested.child_chunks_created as i64);
	assert_eq!(table_count(pool, "chunk_embeddings").await, ingested.embeddings_created as i64);
	assert_eq!(table_count(pool, "chunk_strategies").await, 2);

	service.delete_document(ingested.document_id).await.expect("Delete must succeed.");

	assert_eq!(table_count(pool, "documents").await, 0);
	assert_eq!(table_count(pool, "parent_chunks").await, 0);
	assert_eq!(table_count(pool, "child_chunks").await, 0);
	assert_eq!(table_count(pool, "chunk_embeddings").await, 0);
	// Strategies are shared reference data and survive document deletion.
	assert_eq!(table_count(pool, "chunk_strategies").await, 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
