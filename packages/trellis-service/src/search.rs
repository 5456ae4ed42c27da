use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, TrellisService, vector_to_pg};
use trellis_domain::query::QueryStrategy;
use trellis_storage::{
	models::SearchRow,
	queries::{self, SearchArgs},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrieveRequest {
	pub query: String,
	#[serde(default)]
	pub project_name: Option<String>,
	#[serde(default)]
	pub top_k: Option<u32>,
	#[serde(default)]
	pub similarity_threshold: Option<f32>,
	#[serde(default)]
	pub use_smart_query: Option<bool>,
	#[serde(default)]
	pub use_query_expansion: Option<bool>,
	#[serde(default)]
	pub use_hyde: Option<bool>,
	#[serde(default)]
	pub use_rerank: Option<bool>,
}

/// A matched child span with its parent context attached: the child vector
/// found it, the parent content is what the reader gets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrievedChunk {
	pub document_id: Uuid,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub document_title: Option<String>,
	pub project_name: String,
	pub document_type: String,
	pub parent_chunk_content: String,
	pub parent_chunk_summary: String,
	pub child_chunk_content: String,
	pub similarity: f32,
}
impl From<SearchRow> for RetrievedChunk {
	fn from(row: SearchRow) -> Self {
		Self {
			document_id: row.document_id,
			document_title: row.document_title,
			project_name: row.project_name,
			document_type: row.doc_type,
			parent_chunk_content: row.parent_content,
			parent_chunk_summary: row.parent_summary,
			child_chunk_content: row.child_content,
			similarity: row.similarity,
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrieveResponse {
	pub query: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub project_name: Option<String>,
	pub total_results: usize,
	pub results: Vec<RetrievedChunk>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub query_strategy: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub strategy_reason: Option<String>,
}

impl TrellisService {
	/// Two-stage retrieval: transform, embed, vector nearest-neighbor with a
	/// widened candidate set, then the rerank pass scoped back to `top_k`.
	pub async fn retrieve(&self, req: RetrieveRequest) -> Result<RetrieveResponse> {
		let query = req.query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}

		let top_k = req.top_k.unwrap_or(self.cfg.search.top_k).max(1) as usize;
		let threshold = req.similarity_threshold.unwrap_or(self.cfg.search.similarity_threshold);
		let use_rerank = req.use_rerank.unwrap_or(true);
		let transformed = if req.use_hyde.unwrap_or(false) {
			Some(self.transform_forced(query, QueryStrategy::Hyde).await)
		} else if req.use_query_expansion.unwrap_or(false) {
			Some(self.transform_forced(query, QueryStrategy::Expansion).await)
		} else if req.use_smart_query.unwrap_or(true) {
			Some(self.transform_smart(query).await)
		} else {
			None
		};
		let effective = transformed.as_ref().map(|t| t.effective.as_str()).unwrap_or(query);

		if let Some(transformed) = transformed.as_ref() {
			tracing::debug!(
				strategy = transformed.strategy.as_str(),
				confidence = transformed.confidence,
				"Query transformed."
			);
		}

		let vector = self.embed_one(effective).await?;
		let vec_text = vector_to_pg(&vector);
		let limit = if use_rerank {
			top_k * self.cfg.search.rerank_candidate_multiplier.max(1) as usize
		} else {
			top_k
		};
		let rows = queries::search_children(&self.db.pool, SearchArgs {
			vec: &vec_text,
			model: &self.cfg.providers.embedding.model,
			project_name: req.project_name.as_deref(),
			similarity_threshold: threshold,
			limit: limit as i64,
		})
		.await?;
		let mut results: Vec<RetrievedChunk> = rows.into_iter().map(RetrievedChunk::from).collect();

		if use_rerank && !results.is_empty() {
			// The reranker sees the original question, not the rewrite.
			results = self.rerank_candidates(query, results, top_k).await;
		} else {
			results.truncate(top_k);
		}

		Ok(RetrieveResponse {
			query: req.query,
			project_name: req.project_name,
			total_results: results.len(),
			results,
			query_strategy: transformed.as_ref().map(|t| t.strategy.as_str().to_string()),
			strategy_reason: transformed.map(|t| t.reason),
		})
	}
}
