use serde::{Deserialize, Serialize};

/// Interrogative prefixes that mark a query as a concept/how-to question.
/// Checked against the lower-cased query, so only lower-case forms appear.
const QUESTION_PREFIXES: &[&str] =
	&["如何", "怎么", "为什么", "什么是", "how", "what", "why", "when", "where"];
const SHORT_QUERY_CHARS: usize = 10;
const SHORT_QUERY_TOKENS: usize = 3;

/// How a user query is reshaped before embedding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStrategy {
	/// The query already carries precise identifiers; embed it as-is.
	Direct,
	/// Rewrite the query with synonyms and related technical terms.
	Expansion,
	/// Embed a hypothetical document that would answer the query.
	Hyde,
}
impl QueryStrategy {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"direct" => Some(Self::Direct),
			"expansion" => Some(Self::Expansion),
			"hyde" => Some(Self::Hyde),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Direct => "direct",
			Self::Expansion => "expansion",
			Self::Hyde => "hyde",
		}
	}
}

#[derive(Clone, Debug)]
pub struct QueryAnalysis {
	pub strategy: QueryStrategy,
	pub reason: String,
	pub confidence: f32,
}

/// Deterministic classifier used when the model-backed one is unavailable or
/// returns garbage. Precedence: question prefix, then brevity, then code
/// tokens.
pub fn classify_by_rules(query: &str) -> QueryAnalysis {
	let trimmed = query.trim();
	let lowered = trimmed.to_lowercase();

	if QUESTION_PREFIXES.iter().any(|prefix| lowered.starts_with(prefix)) {
		return QueryAnalysis {
			strategy: QueryStrategy::Hyde,
			reason: "Query opens with a question word.".to_string(),
			confidence: 0.6,
		};
	}
	if trimmed.chars().count() < SHORT_QUERY_CHARS
		|| trimmed.split_whitespace().count() < SHORT_QUERY_TOKENS
	{
		return QueryAnalysis {
			strategy: QueryStrategy::Expansion,
			reason: "Query is short on vocabulary.".to_string(),
			confidence: 0.5,
		};
	}
	if contains_code_token(trimmed) {
		return QueryAnalysis {
			strategy: QueryStrategy::Direct,
			reason: "Query contains code-like identifiers.".to_string(),
			confidence: 0.7,
		};
	}

	QueryAnalysis {
		strategy: QueryStrategy::Expansion,
		reason: "No strong signal; expanding for recall.".to_string(),
		confidence: 0.4,
	}
}

/// Detects CamelCase, snake_case, dotted calls, and backtick spans.
pub fn contains_code_token(text: &str) -> bool {
	if text.contains('`') {
		return true;
	}

	text.split_whitespace()
		.any(|token| is_camel_case(token) || is_snake_case(token) || is_dotted_call(token))
}

fn is_camel_case(token: &str) -> bool {
	let mut prev_lower = false;

	for ch in token.chars() {
		if ch.is_ascii_uppercase() && prev_lower {
			return true;
		}

		prev_lower = ch.is_ascii_lowercase();
	}

	false
}

fn is_snake_case(token: &str) -> bool {
	let chars: Vec<char> = token.chars().collect();

	chars.windows(3).any(|window| {
		window[1] == '_' && window[0].is_ascii_alphanumeric() && window[2].is_ascii_alphanumeric()
	})
}

fn is_dotted_call(token: &str) -> bool {
	let chars: Vec<char> = token.chars().collect();

	chars.windows(3).any(|window| {
		window[1] == '.' && window[0].is_ascii_alphanumeric() && window[2].is_ascii_alphabetic()
	})
}
