use serde::Deserialize;
use serde_json::Value;

use crate::{RetrievedChunk, TrellisService, extract_json_array, truncate_chars};

const RERANK_MAX_TOKENS: u32 = 1_000;
const DEFAULT_SCORE: f32 = 5.0;
const SUMMARY_SNIPPET_CHARS: usize = 500;
const CONTENT_SNIPPET_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct RerankScore {
	id: usize,
	score: f32,
}

pub(crate) fn rerank_messages(query: &str, candidates: &[RetrievedChunk]) -> Vec<Value> {
	let mut listing = String::new();

	for (index, candidate) in candidates.iter().enumerate() {
		let summary = truncate_chars(&candidate.parent_chunk_summary, SUMMARY_SNIPPET_CHARS);
		let content = truncate_chars(&candidate.child_chunk_content, CONTENT_SNIPPET_CHARS);

		listing.push_str(&format!("[doc {index}] {summary}\n{content}\n\n"));
	}

	let system = "You rate how relevant each listed document is to the query. Score every \
		document from 0 (irrelevant) to 10 (directly answers the query). Reply with a JSON \
		array only, one entry per document: [{\"id\": 0, \"score\": 7}, ...].";
	let user = format!("Query: {query}\n\nDocuments:\n{listing}");

	vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": user }),
	]
}

/// Parses `[{id, score}, ...]`; ids the model skipped keep the neutral
/// default score.
pub(crate) fn parse_rerank_scores(raw: &str, count: usize) -> Option<Vec<f32>> {
	let slice = extract_json_array(raw)?;
	let parsed: Vec<RerankScore> = serde_json::from_str(slice).ok()?;
	let mut scores = vec![DEFAULT_SCORE; count];

	for item in parsed {
		if item.id < count {
			scores[item.id] = item.score.clamp(0.0, 10.0);
		}
	}

	Some(scores)
}

/// Replaces each candidate's similarity with the fused score
/// `vector_weight * similarity + score_weight * (score / 10)`.
pub(crate) fn fuse_scores(
	candidates: &mut [RetrievedChunk],
	scores: &[f32],
	vector_weight: f32,
	score_weight: f32,
) {
	for (candidate, score) in candidates.iter_mut().zip(scores) {
		candidate.similarity = vector_weight * candidate.similarity + score_weight * (score / 10.0);
	}
}

impl TrellisService {
	/// LLM rescoring pass. Degrades to the incoming vector order on any
	/// transport or parse failure; the retrieval path never fails here.
	pub(crate) async fn rerank_candidates(
		&self,
		query: &str,
		mut candidates: Vec<RetrievedChunk>,
		top_k: usize,
	) -> Vec<RetrievedChunk> {
		let messages = rerank_messages(query, &candidates);
		let raw = match self
			.providers
			.chat
			.complete(&self.cfg.providers.chat, &messages, RERANK_MAX_TOKENS)
			.await
		{
			Ok(raw) => raw,
			Err(err) => {
				tracing::warn!(error = %err, "Rerank call failed; falling back to vector order.");

				candidates.truncate(top_k);

				return candidates;
			},
		};
		let Some(scores) = parse_rerank_scores(&raw, candidates.len()) else {
			tracing::warn!("Rerank response was not parseable; falling back to vector order.");

			candidates.truncate(top_k);

			return candidates;
		};

		fuse_scores(
			&mut candidates,
			&scores,
			self.cfg.ranking.vector_weight,
			self.cfg.ranking.score_weight,
		);

		candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
		candidates.truncate(top_k);

		candidates
	}
}
