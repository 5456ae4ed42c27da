use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::{
	Result,
	models::{ChunkStrategyRow, Document, DocumentSummary, SearchRow},
};
use trellis_chunking::ChunkStrategy;

pub async fn insert_document<'e, E>(executor: E, document: &Document) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO documents (
	document_id,
	project_name,
	doc_type,
	title,
	content,
	content_hash,
	metadata,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
	)
	.bind(document.document_id)
	.bind(document.project_name.as_str())
	.bind(document.doc_type.as_str())
	.bind(document.title.as_deref())
	.bind(document.content.as_str())
	.bind(document.content_hash.as_str())
	.bind(&document.metadata)
	.bind(document.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn fetch_document<'e, E>(executor: E, document_id: Uuid) -> Result<Option<Document>>
where
	E: PgExecutor<'e>,
{
	let row: Option<Document> = sqlx::query_as(
		"\
SELECT
	document_id,
	project_name,
	doc_type,
	title,
	content,
	content_hash,
	metadata,
	created_at
FROM documents
WHERE document_id = $1",
	)
	.bind(document_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn list_documents<'e, E>(
	executor: E,
	project_name: Option<&str>,
	limit: i64,
) -> Result<Vec<DocumentSummary>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<DocumentSummary> = sqlx::query_as(
		"\
SELECT
	document_id,
	project_name,
	doc_type,
	title,
	content_hash,
	created_at
FROM documents
WHERE ($1::text IS NULL OR project_name = $1)
ORDER BY created_at DESC
LIMIT $2",
	)
	.bind(project_name)
	.bind(limit)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Returns the number of deleted rows; chunk and embedding rows go with the
/// document through `ON DELETE CASCADE`.
pub async fn delete_document<'e, E>(executor: E, document_id: Uuid) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM documents WHERE document_id = $1")
		.bind(document_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected())
}

/// Find-or-create on the unique strategy triple. A concurrent writer winning
/// the insert surfaces as a unique violation, resolved by re-running the
/// find.
pub async fn ensure_strategy(pool: &PgPool, strategy: &ChunkStrategy) -> Result<ChunkStrategyRow> {
	if let Some(row) = find_strategy(pool, strategy).await? {
		return Ok(row);
	}

	let insert = sqlx::query(
		"\
INSERT INTO chunk_strategies (
	strategy_id,
	parent_chunk_size,
	child_chunk_size,
	overlap_percent,
	name
)
VALUES ($1, $2, $3, $4, $5)",
	)
	.bind(Uuid::new_v4())
	.bind(strategy.parent_chunk_size as i32)
	.bind(strategy.child_chunk_size as i32)
	.bind(strategy.overlap_percent as i32)
	.bind(strategy.name.as_deref())
	.execute(pool)
	.await;

	match insert {
		Ok(_) => {},
		Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
			tracing::debug!(
				triple = ?strategy.triple(),
				"Strategy insert raced another writer; reusing the existing row."
			);
		},
		Err(err) => return Err(err.into()),
	}

	find_strategy(pool, strategy).await?.ok_or_else(|| {
		crate::Error::NotFound("Strategy row vanished after find-or-create.".to_string())
	})
}

async fn find_strategy<'e, E>(
	executor: E,
	strategy: &ChunkStrategy,
) -> Result<Option<ChunkStrategyRow>>
where
	E: PgExecutor<'e>,
{
	let row: Option<ChunkStrategyRow> = sqlx::query_as(
		"\
SELECT
	strategy_id,
	parent_chunk_size,
	child_chunk_size,
	overlap_percent,
	name,
	created_at
FROM chunk_strategies
WHERE parent_chunk_size = $1
	AND child_chunk_size = $2
	AND overlap_percent = $3",
	)
	.bind(strategy.parent_chunk_size as i32)
	.bind(strategy.child_chunk_size as i32)
	.bind(strategy.overlap_percent as i32)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_parent_chunk<'e, E>(
	executor: E,
	parent_chunk_id: Uuid,
	document_id: Uuid,
	strategy_id: Uuid,
	parent_index: i32,
	start_position: i32,
	end_position: i32,
	content: &str,
	summary: &str,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO parent_chunks (
	parent_chunk_id,
	document_id,
	strategy_id,
	parent_index,
	start_position,
	end_position,
	content,
	summary
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
	)
	.bind(parent_chunk_id)
	.bind(document_id)
	.bind(strategy_id)
	.bind(parent_index)
	.bind(start_position)
	.bind(end_position)
	.bind(content)
	.bind(summary)
	.execute(executor)
	.await?;

	Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_child_chunk<'e, E>(
	executor: E,
	child_chunk_id: Uuid,
	parent_chunk_id: Uuid,
	chunk_index: i32,
	start_position: i32,
	end_position: i32,
	content: &str,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO child_chunks (
	child_chunk_id,
	parent_chunk_id,
	chunk_index,
	start_position,
	end_position,
	content
)
VALUES ($1, $2, $3, $4, $5, $6)",
	)
	.bind(child_chunk_id)
	.bind(parent_chunk_id)
	.bind(chunk_index)
	.bind(start_position)
	.bind(end_position)
	.bind(content)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn insert_chunk_embedding<'e, E>(
	executor: E,
	embedding_id: Uuid,
	child_chunk_id: Uuid,
	embedding_type: &str,
	model: &str,
	vec: &str,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO chunk_embeddings (embedding_id, child_chunk_id, embedding_type, model, embedding)
VALUES ($1, $2, $3, $4, $5::text::vector)",
	)
	.bind(embedding_id)
	.bind(child_chunk_id)
	.bind(embedding_type)
	.bind(model)
	.bind(vec)
	.execute(executor)
	.await?;

	Ok(())
}

pub struct SearchArgs<'a> {
	pub vec: &'a str,
	pub model: &'a str,
	pub project_name: Option<&'a str>,
	pub similarity_threshold: f32,
	pub limit: i64,
}

/// Vector nearest-neighbor over content embeddings, joined back through the
/// span hierarchy. Ordered by cosine distance ascending.
pub async fn search_children<'e, E>(executor: E, args: SearchArgs<'_>) -> Result<Vec<SearchRow>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<SearchRow> = sqlx::query_as(
		"\
SELECT
	d.document_id,
	d.title AS document_title,
	d.project_name,
	d.doc_type,
	c.child_chunk_id,
	p.content AS parent_content,
	p.summary AS parent_summary,
	c.content AS child_content,
	(1 - (e.embedding <=> $1::text::vector))::real AS similarity
FROM chunk_embeddings e
JOIN child_chunks c ON c.child_chunk_id = e.child_chunk_id
JOIN parent_chunks p ON p.parent_chunk_id = c.parent_chunk_id
JOIN documents d ON d.document_id = p.document_id
WHERE e.embedding_type = 'content'
	AND e.model = $2
	AND (1 - (e.embedding <=> $1::text::vector)) >= $3
	AND ($4::text IS NULL OR d.project_name = $4)
ORDER BY e.embedding <=> $1::text::vector
LIMIT $5",
	)
	.bind(args.vec)
	.bind(args.model)
	.bind(args.similarity_threshold)
	.bind(args.project_name)
	.bind(args.limit)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}
