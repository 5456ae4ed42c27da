use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Document {
	pub document_id: Uuid,
	pub project_name: String,
	pub doc_type: String,
	pub title: Option<String>,
	pub content: String,
	pub content_hash: String,
	pub metadata: Value,
	pub created_at: OffsetDateTime,
}

/// Listing row; omits the document body.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct DocumentSummary {
	pub document_id: Uuid,
	pub project_name: String,
	pub doc_type: String,
	pub title: Option<String>,
	pub content_hash: String,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ChunkStrategyRow {
	pub strategy_id: Uuid,
	pub parent_chunk_size: i32,
	pub child_chunk_size: i32,
	pub overlap_percent: i32,
	pub name: Option<String>,
	pub created_at: OffsetDateTime,
}

/// One retrieval candidate: the matched child span joined back to its parent
/// and document, with `1 - cosine_distance` reported as similarity.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct SearchRow {
	pub document_id: Uuid,
	pub document_title: Option<String>,
	pub project_name: String,
	pub doc_type: String,
	pub child_chunk_id: Uuid,
	pub parent_content: String,
	pub parent_summary: String,
	pub child_content: String,
	pub similarity: f32,
}
