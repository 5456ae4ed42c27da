use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, TrellisService};
use trellis_storage::queries;

const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 100;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
	pub document_id: Uuid,
	pub project_name: String,
	pub r#type: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	pub content: String,
	pub content_hash: String,
	pub metadata: Value,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentSummaryItem {
	pub document_id: Uuid,
	pub project_name: String,
	pub r#type: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	pub content_hash: String,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
	pub document_id: Uuid,
	pub deleted: bool,
}

impl TrellisService {
	pub async fn get_document(&self, document_id: Uuid) -> Result<DocumentResponse> {
		let row = queries::fetch_document(&self.db.pool, document_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Document not found.".to_string() })?;

		Ok(DocumentResponse {
			document_id: row.document_id,
			project_name: row.project_name,
			r#type: row.doc_type,
			title: row.title,
			content: row.content,
			content_hash: row.content_hash,
			metadata: row.metadata,
			created_at: row.created_at,
		})
	}

	pub async fn list_documents(
		&self,
		project_name: Option<&str>,
		limit: Option<u32>,
	) -> Result<Vec<DocumentSummaryItem>> {
		let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT);
		let rows = queries::list_documents(&self.db.pool, project_name, limit as i64).await?;

		Ok(rows
			.into_iter()
			.map(|row| DocumentSummaryItem {
				document_id: row.document_id,
				project_name: row.project_name,
				r#type: row.doc_type,
				title: row.title,
				content_hash: row.content_hash,
				created_at: row.created_at,
			})
			.collect())
	}

	/// Deletes a document; the span and embedding rows cascade with it.
	pub async fn delete_document(&self, document_id: Uuid) -> Result<DeleteResponse> {
		let deleted = queries::delete_document(&self.db.pool, document_id).await?;

		if deleted == 0 {
			return Err(Error::NotFound { message: "Document not found.".to_string() });
		}

		tracing::info!(%document_id, "Document deleted.");

		Ok(DeleteResponse { document_id, deleted: true })
	}
}
