use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Upper bound on inputs per remote embeddings call.
pub const EMBED_BATCH_LIMIT: usize = 100;

pub async fn embed(cfg: &trellis_config::EmbeddingProviderConfig, text: &str) -> Result<Vec<f32>> {
	let mut vectors = embed_batch(cfg, &[text.to_string()]).await?;

	vectors.pop().ok_or_else(|| Error::InvalidResponse {
		message: "Embedding response contained no vectors.".to_string(),
	})
}

/// Embeds `texts` preserving input order. Blank inputs are never sent to the
/// remote endpoint; their slots come back as empty vectors so callers can
/// skip the row instead of persisting a meaningless one.
pub async fn embed_batch(
	cfg: &trellis_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let mut results: Vec<Vec<f32>> = vec![Vec::new(); texts.len()];
	let non_blank: Vec<(usize, &String)> =
		texts.iter().enumerate().filter(|(_, text)| !text.trim().is_empty()).collect();

	if non_blank.is_empty() {
		return Ok(results);
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);

	for batch in non_blank.chunks(EMBED_BATCH_LIMIT) {
		let inputs: Vec<&str> = batch.iter().map(|(_, text)| text.as_str()).collect();
		let body = serde_json::json!({ "model": cfg.model, "input": inputs });
		let res = client
			.post(&url)
			.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
			.json(&body)
			.send()
			.await?;
		let json: Value = res.error_for_status()?.json().await?;
		let vectors = parse_embedding_response(json, batch.len())?;

		for ((original_index, _), vector) in batch.iter().zip(vectors) {
			results[*original_index] = vector;
		}
	}

	Ok(results)
}

/// Composes the context-enriched input embedded for child spans at ingest.
/// Absent fields are dropped rather than rendered empty.
pub fn contextual_input(
	content: &str,
	title: Option<&str>,
	doc_type: Option<&str>,
	summary: Option<&str>,
) -> String {
	let mut lines = Vec::with_capacity(4);

	if let Some(title) = title.map(str::trim).filter(|value| !value.is_empty()) {
		lines.push(format!("[title] {title}"));
	}
	if let Some(doc_type) = doc_type.map(str::trim).filter(|value| !value.is_empty()) {
		lines.push(format!("[type] {doc_type}"));
	}
	if let Some(summary) = summary.map(str::trim).filter(|value| !value.is_empty()) {
		lines.push(format!("[summary] {summary}"));
	}

	lines.push(format!("[content] {content}"));

	lines.join("\n")
}

/// Re-sorts response items by their returned `index` so callers always see
/// input order, then checks the count.
fn parse_embedding_response(json: Value, expected: usize) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse { message: "Embedding item missing embedding array.".to_string() }
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	if indexed.len() != expected {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding response returned {} vectors for {expected} inputs.",
				indexed.len()
			),
		});
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}
