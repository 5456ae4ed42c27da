pub mod documents;
pub mod ingest;
pub mod rerank;
pub mod search;
pub mod summarize;
pub mod transform;

mod error;

pub use self::{
	documents::{DeleteResponse, DocumentResponse, DocumentSummaryItem},
	error::{Error, Result},
	ingest::{IngestRequest, IngestResponse, ProgressFn, StrategySummary},
	search::{RetrieveRequest, RetrieveResponse, RetrievedChunk},
	transform::TransformedQuery,
};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use trellis_config::{ChatProviderConfig, Config, EmbeddingProviderConfig};
use trellis_providers::{chat, embedding};
use trellis_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [Value],
		max_tokens: u32,
	) -> BoxFuture<'a, Result<String>>;
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed_batch<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub chat: Arc<dyn ChatProvider>,
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(chat: Arc<dyn ChatProvider>, embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { chat, embedding }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { chat: provider.clone(), embedding: provider }
	}
}

pub struct TrellisService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl TrellisService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	/// Embeds one text and checks the configured dimensions.
	pub(crate) async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
		let vectors = self
			.providers
			.embedding
			.embed_batch(&self.cfg.providers.embedding, &[text.to_string()])
			.await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		self.check_dimensions(&vector)?;

		Ok(vector)
	}

	pub(crate) fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
		let expected = self.cfg.providers.embedding.dimensions as usize;

		if vector.len() != expected {
			return Err(Error::DimensionMismatch {
				message: format!(
					"Embedding has {} dimensions; the configured model produces {expected}.",
					vector.len()
				),
			});
		}

		Ok(())
	}
}

struct DefaultProviders;
impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [Value],
		max_tokens: u32,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move {
			chat::complete(cfg, messages, max_tokens)
				.await
				.map_err(|err| Error::Provider { message: err.to_string() })
		})
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed_batch<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			embedding::embed_batch(cfg, texts)
				.await
				.map_err(|err| Error::Provider { message: err.to_string() })
		})
	}
}

pub(crate) fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

/// Greedy slice from the first `{` to the last `}`. Chat models wrap JSON in
/// prose often enough that this beats parsing the raw reply.
pub(crate) fn extract_json_object(raw: &str) -> Option<&str> {
	extract_delimited(raw, '{', '}')
}

/// Greedy slice from the first `[` to the last `]`.
pub(crate) fn extract_json_array(raw: &str) -> Option<&str> {
	extract_delimited(raw, '[', ']')
}

fn extract_delimited(raw: &str, open: char, close: char) -> Option<&str> {
	let start = raw.find(open)?;
	let end = raw.rfind(close)?;

	if end < start {
		return None;
	}

	Some(&raw[start..=end])
}

/// First `max` characters of `text`, cut on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
	match text.char_indices().nth(max) {
		Some((cut, _)) => &text[..cut],
		None => text,
	}
}
