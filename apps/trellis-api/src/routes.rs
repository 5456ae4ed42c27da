use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use trellis_service::{
	DeleteResponse, DocumentResponse, DocumentSummaryItem, Error as ServiceError, IngestRequest,
	IngestResponse, RetrieveRequest, RetrieveResponse,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/documents", post(ingest).get(list_documents))
		.route("/v1/documents/{document_id}", get(get_document).delete(delete_document))
		.route("/v1/retrieve", post(retrieve))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ingest(
	State(state): State<AppState>,
	Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
	let response = state.service.ingest(payload).await?;

	Ok(Json(response))
}

async fn retrieve(
	State(state): State<AppState>,
	Json(payload): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, ApiError> {
	let response = state.service.retrieve(payload).await?;

	Ok(Json(response))
}

async fn get_document(
	State(state): State<AppState>,
	Path(document_id): Path<Uuid>,
) -> Result<Json<DocumentResponse>, ApiError> {
	let response = state.service.get_document(document_id).await?;

	Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
	project_name: Option<String>,
	limit: Option<u32>,
}

async fn list_documents(
	State(state): State<AppState>,
	Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DocumentSummaryItem>>, ApiError> {
	let response =
		state.service.list_documents(query.project_name.as_deref(), query.limit).await?;

	Ok(Json(response))
}

async fn delete_document(
	State(state): State<AppState>,
	Path(document_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
	let response = state.service.delete_document(document_id).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	success: bool,
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let message = err.to_string();
		let (status, error_code) = match err {
			ServiceError::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
			ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
			ServiceError::Conflict { .. } => (StatusCode::BAD_REQUEST, "constraint_violation"),
			ServiceError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
			ServiceError::Provider { .. } => (StatusCode::BAD_GATEWAY, "remote_service_error"),
			ServiceError::DimensionMismatch { .. } =>
				(StatusCode::INTERNAL_SERVER_ERROR, "dimension_mismatch"),
		};

		Self { status, error_code, message }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			success: false,
			error_code: self.error_code.to_string(),
			message: self.message,
		};

		(self.status, Json(body)).into_response()
	}
}
