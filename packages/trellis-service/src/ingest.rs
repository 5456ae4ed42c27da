use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, TrellisService, vector_to_pg};
use trellis_chunking::{ChunkStrategy, ParentSpan};
use trellis_domain::doc_type::DocumentType;
use trellis_providers::embedding::contextual_input;
use trellis_storage::{models::Document, queries};

/// Progress callback: `(stage, current, total)` at phase boundaries. Must not
/// block on I/O.
pub type ProgressFn = dyn Fn(&str, usize, usize) + Send + Sync + 'static;

pub const EMBEDDING_TYPE_CONTENT: &str = "content";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestRequest {
	pub content: String,
	pub r#type: String,
	pub project_name: String,
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default)]
	pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrategySummary {
	pub parent_chunk_size: u32,
	pub child_chunk_size: u32,
	pub overlap_percent: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}
impl From<&ChunkStrategy> for StrategySummary {
	fn from(strategy: &ChunkStrategy) -> Self {
		Self {
			parent_chunk_size: strategy.parent_chunk_size,
			child_chunk_size: strategy.child_chunk_size,
			overlap_percent: strategy.overlap_percent,
			name: strategy.name.clone(),
		}
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestResponse {
	pub document_id: Uuid,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	pub r#type: String,
	pub project_name: String,
	pub parent_chunks_created: usize,
	pub child_chunks_created: usize,
	pub embeddings_created: usize,
	pub strategies: Vec<StrategySummary>,
	pub content_hash: String,
}

struct TreeCounts {
	parents: usize,
	children: usize,
	embeddings: usize,
}

impl TrellisService {
	pub async fn ingest(&self, req: IngestRequest) -> Result<IngestResponse> {
		self.ingest_with_progress(req, None::<&ProgressFn>).await
	}

	/// Full pipeline for one upload: persist the document, then build one
	/// parent/child tree per configured strategy. Remote enrichment happens
	/// before the per-strategy transaction opens; the first failure aborts
	/// the request.
	pub async fn ingest_with_progress<'a>(
		&'a self,
		req: IngestRequest,
		progress: Option<&'a ProgressFn>,
	) -> Result<IngestResponse> {
		let project_name = req.project_name.trim();

		if project_name.is_empty() {
			return Err(Error::InvalidRequest {
				message: "project_name is required.".to_string(),
			});
		}

		let doc_type = DocumentType::parse(&req.r#type);
		let title =
			req.title.as_deref().map(str::trim).filter(|title| !title.is_empty()).map(String::from);
		let content_hash = blake3::hash(req.content.as_bytes()).to_hex().to_string();
		let document = Document {
			document_id: Uuid::new_v4(),
			project_name: project_name.to_string(),
			doc_type: doc_type.as_str().to_string(),
			title,
			content: req.content,
			content_hash,
			metadata: req.metadata.unwrap_or_else(|| serde_json::json!({})),
			created_at: OffsetDateTime::now_utc(),
		};

		queries::insert_document(&self.db.pool, &document).await?;

		let strategies = &self.cfg.chunking.strategies;
		let mut parent_chunks_created = 0_usize;
		let mut child_chunks_created = 0_usize;
		let mut embeddings_created = 0_usize;
		let mut used_strategies = Vec::new();

		for (index, strategy) in strategies.iter().enumerate() {
			report(progress, "chunking", index + 1, strategies.len());

			let parents = trellis_chunking::split_document(&document.content, strategy)?;

			if parents.is_empty() {
				continue;
			}

			let counts =
				self.ingest_strategy_tree(&document, doc_type, strategy, parents, progress).await?;

			parent_chunks_created += counts.parents;
			child_chunks_created += counts.children;
			embeddings_created += counts.embeddings;

			used_strategies.push(StrategySummary::from(strategy));
		}

		tracing::info!(
			document_id = %document.document_id,
			project_name = %document.project_name,
			parent_chunks_created,
			child_chunks_created,
			embeddings_created,
			"Document ingested."
		);

		Ok(IngestResponse {
			document_id: document.document_id,
			title: document.title,
			r#type: document.doc_type,
			project_name: document.project_name,
			parent_chunks_created,
			child_chunks_created,
			embeddings_created,
			strategies: used_strategies,
			content_hash: document.content_hash,
		})
	}

	async fn ingest_strategy_tree<'a>(
		&'a self,
		document: &Document,
		doc_type: DocumentType,
		strategy: &ChunkStrategy,
		parents: Vec<ParentSpan>,
		progress: Option<&'a ProgressFn>,
	) -> Result<TreeCounts> {
		let strategy_row = queries::ensure_strategy(&self.db.pool, strategy).await?;

		report(progress, "summarizing", 0, parents.len());

		let contents: Vec<String> = parents.iter().map(|parent| parent.content.clone()).collect();
		let summaries = self.summarize_parents(&contents, doc_type).await?;

		report(progress, "summarizing", parents.len(), parents.len());

		// Children across all parents, flattened in document order so one
		// batched embedding pass covers the whole tree.
		let mut inputs = Vec::new();

		for (parent, summary) in parents.iter().zip(&summaries) {
			for child in &parent.children {
				inputs.push(contextual_input(
					&child.content,
					document.title.as_deref(),
					Some(doc_type.as_str()),
					Some(summary),
				));
			}
		}

		report(progress, "embedding", 0, inputs.len());

		let vectors =
			self.providers.embedding.embed_batch(&self.cfg.providers.embedding, &inputs).await?;

		for vector in &vectors {
			if !vector.is_empty() {
				self.check_dimensions(vector)?;
			}
		}

		report(progress, "embedding", inputs.len(), inputs.len());

		let mut tx = self.db.pool.begin().await?;
		let mut flat_index = 0_usize;
		let mut children = 0_usize;
		let mut embeddings = 0_usize;

		for (parent, summary) in parents.iter().zip(&summaries) {
			let parent_chunk_id = Uuid::new_v4();

			queries::insert_parent_chunk(
				&mut *tx,
				parent_chunk_id,
				document.document_id,
				strategy_row.strategy_id,
				parent.parent_index,
				parent.start_position as i32,
				parent.end_position as i32,
				&parent.content,
				summary,
			)
			.await?;

			for child in &parent.children {
				let child_chunk_id = Uuid::new_v4();

				queries::insert_child_chunk(
					&mut *tx,
					child_chunk_id,
					parent_chunk_id,
					child.chunk_index,
					child.start_position as i32,
					child.end_position as i32,
					&child.content,
				)
				.await?;

				children += 1;

				let vector = &vectors[flat_index];

				flat_index += 1;

				// Blank inputs come back as empty placeholders; skip the row.
				if vector.is_empty() {
					continue;
				}

				queries::insert_chunk_embedding(
					&mut *tx,
					Uuid::new_v4(),
					child_chunk_id,
					EMBEDDING_TYPE_CONTENT,
					&self.cfg.providers.embedding.model,
					&vector_to_pg(vector),
				)
				.await?;

				embeddings += 1;
			}
		}

		tx.commit().await?;

		report(progress, "persisting", parents.len(), parents.len());

		Ok(TreeCounts { parents: parents.len(), children, embeddings })
	}
}

fn report<'a>(progress: Option<&'a ProgressFn>, stage: &str, current: usize, total: usize) {
	if let Some(progress) = progress {
		progress(stage, current, total);
	}
}

impl TrellisService {
	pub async fn ingest_minimal<'a>(
		&'a self,
		progress: Option<&'a ProgressFn>,
	) -> Result<()> {
		if progress.is_some() {
		}
		Ok(())
	}
}
