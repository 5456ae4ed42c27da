use futures::{StreamExt, TryStreamExt, stream};
use serde_json::Value;

use crate::{Result, TrellisService, truncate_chars};
use trellis_domain::doc_type::DocumentType;

const FALLBACK_CHARS: usize = 200;

fn type_instructions(doc_type: DocumentType) -> &'static str {
	match doc_type {
		DocumentType::ApiDoc =>
			"Name the API endpoints the passage covers, with their parameters and return shapes.",
		DocumentType::TechDoc =>
			"Name the architectural elements involved and how they relate to each other.",
		DocumentType::CodeLogicDoc =>
			"Name the functions involved and describe the control flow between them.",
		DocumentType::GeneralDoc => "Capture the key points a reader would search for.",
	}
}

pub(crate) fn summary_messages(content: &str, doc_type: DocumentType) -> Vec<Value> {
	let system = format!(
		"You summarize documentation passages for a retrieval index. Write one concise paragraph \
		in plain prose. {}",
		type_instructions(doc_type)
	);

	vec![
		serde_json::json!({ "role": "system", "content": system }),
		serde_json::json!({ "role": "user", "content": content }),
	]
}

pub(crate) fn fallback_summary(content: &str) -> String {
	format!("{}…", truncate_chars(content, FALLBACK_CHARS))
}

impl TrellisService {
	/// Summary for one parent span. Blank input short-circuits without a
	/// model call; an empty model reply degrades to a head truncation.
	pub(crate) async fn summarize_span(
		&self,
		content: &str,
		doc_type: DocumentType,
	) -> Result<String> {
		if content.trim().is_empty() {
			return Ok(String::new());
		}

		let messages = summary_messages(content, doc_type);
		let reply = self
			.providers
			.chat
			.complete(&self.cfg.providers.chat, &messages, self.cfg.summary.max_tokens)
			.await?;
		let reply = reply.trim();

		if reply.is_empty() {
			return Ok(fallback_summary(content));
		}

		Ok(reply.to_string())
	}

	/// Summaries for all parents of one strategy tree, with bounded fan-out.
	/// Order follows the input; the first failure aborts the batch.
	pub(crate) async fn summarize_parents(
		&self,
		contents: &[String],
		doc_type: DocumentType,
	) -> Result<Vec<String>> {
		stream::iter(contents.iter().map(|content| self.summarize_span(content, doc_type)))
			.buffered(self.cfg.summary.concurrency.max(1))
			.try_collect()
			.await
	}
}
