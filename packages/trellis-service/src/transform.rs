use serde::Deserialize;
use serde_json::Value;

use crate::{TrellisService, extract_json_object};
use trellis_domain::query::{self, QueryAnalysis, QueryStrategy};

const CLASSIFIER_MAX_TOKENS: u32 = 200;
const REWRITE_MAX_TOKENS: u32 = 300;

/// Outcome of the query transformation pass: the text that actually gets
/// embedded plus the analysis behind it.
#[derive(Clone, Debug)]
pub struct TransformedQuery {
	pub effective: String,
	pub strategy: QueryStrategy,
	pub reason: String,
	pub confidence: f32,
}

#[derive(Debug, Deserialize)]
struct ClassifierOutput {
	strategy: String,
	#[serde(default)]
	reason: String,
	#[serde(default = "default_confidence")]
	confidence: f32,
}

fn default_confidence() -> f32 {
	0.5
}

pub(crate) fn classifier_messages(query: &str) -> Vec<Value> {
	let system = "You pick the retrieval strategy for a search query over technical \
		documentation. Reply with JSON only: {\"strategy\": \"direct\" | \"expansion\" | \
		\"hyde\", \"reason\": \"...\", \"confidence\": 0.0-1.0}. Use \"direct\" when the query \
		already contains precise identifiers such as CamelCase or snake_case names, dotted \
		calls, backticked tokens, or exact API names. Use \"expansion\" when the query is short \
		or vocabulary-sparse and would benefit from synonyms. Use \"hyde\" for how/why/what-is \
		questions, troubleshooting, and concept explanations.";

	vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": query }),
	]
}

pub(crate) fn expansion_messages(query: &str) -> Vec<Value> {
	let system = "Rewrite the search query into a single query of roughly 100-150 characters, \
		adding synonyms and related technical terms while preserving the original intent. \
		Return only the rewritten query.";

	vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": query }),
	]
}

pub(crate) fn hyde_messages(query: &str) -> Vec<Value> {
	let system = "Write a 150-250 character excerpt from a hypothetical technical document that \
		would answer the question. Use the voice of documentation, not of an assistant; a short \
		illustrative code fragment is fine. Return only the excerpt.";

	vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": query }),
	]
}

pub(crate) fn parse_classifier_output(raw: &str) -> Option<QueryAnalysis> {
	let slice = extract_json_object(raw)?;
	let parsed: ClassifierOutput = serde_json::from_str(slice).ok()?;
	let strategy = QueryStrategy::parse(&parsed.strategy)?;

	Some(QueryAnalysis {
		strategy,
		reason: parsed.reason,
		confidence: parsed.confidence.clamp(0.0, 1.0),
	})
}

impl TrellisService {
	/// Smart mode: model-backed classification with the rule-based classifier
	/// as the malformed-output fallback.
	pub(crate) async fn transform_smart(&self, query: &str) -> TransformedQuery {
		let messages = classifier_messages(query);
		let analysis = match self
			.providers
			.chat
			.complete(&self.cfg.providers.chat, &messages, CLASSIFIER_MAX_TOKENS)
			.await
		{
			Ok(raw) => match parse_classifier_output(&raw) {
				Some(analysis) => analysis,
				None => {
					tracing::warn!(
						"Query classifier returned malformed JSON; using rule-based classification."
					);

					query::classify_by_rules(query)
				},
			},
			Err(err) => {
				tracing::warn!(error = %err, "Query classifier call failed; using rule-based classification.");

				query::classify_by_rules(query)
			},
		};

		self.apply_strategy(query, analysis).await
	}

	/// Manual mode: the caller has forced a strategy.
	pub(crate) async fn transform_forced(
		&self,
		query: &str,
		strategy: QueryStrategy,
	) -> TransformedQuery {
		let analysis = QueryAnalysis {
			strategy,
			reason: "Strategy forced by request flags.".to_string(),
			confidence: 1.0,
		};

		self.apply_strategy(query, analysis).await
	}

	async fn apply_strategy(&self, query: &str, analysis: QueryAnalysis) -> TransformedQuery {
		let QueryAnalysis { strategy, reason, confidence } = analysis;
		let (effective, reason) = match strategy {
			QueryStrategy::Direct => (query.to_string(), reason),
			QueryStrategy::Expansion => match self.rewrite(expansion_messages(query)).await {
				Some(text) => (text, reason),
				None => (query.to_string(), rewrite_fallback_reason(&reason)),
			},
			QueryStrategy::Hyde => match self.rewrite(hyde_messages(query)).await {
				Some(text) => (text, reason),
				None => (query.to_string(), rewrite_fallback_reason(&reason)),
			},
		};

		TransformedQuery { effective, strategy, reason, confidence }
	}

	/// The rewrite leg never fails the query path; `None` means "keep the
	/// original query".
	async fn rewrite(&self, messages: Vec<Value>) -> Option<String> {
		match self
			.providers
			.chat
			.complete(&self.cfg.providers.chat, &messages, REWRITE_MAX_TOKENS)
			.await
		{
			Ok(text) => {
				let text = text.trim();

				if text.is_empty() {
					tracing::warn!("Query rewrite returned empty text; keeping the original query.");

					None
				} else {
					Some(text.to_string())
				}
			},
			Err(err) => {
				tracing::warn!(error = %err, "Query rewrite failed; keeping the original query.");

				None
			},
		}
	}
}

fn rewrite_fallback_reason(reason: &str) -> String {
	format!("{reason} (rewrite unavailable; original query used)")
}
