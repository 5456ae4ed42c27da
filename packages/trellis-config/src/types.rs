use serde::Deserialize;
use serde_json::{Map, Value};

use trellis_chunking::ChunkStrategy;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub chunking: Chunking,
	#[serde(default)]
	pub summary: Summary,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	#[serde(default = "default_http_bind")]
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	#[serde(default = "default_pool_max_conns")]
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub chat: ChatProviderConfig,
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct ChatProviderConfig {
	pub api_base: String,
	pub api_key: String,
	#[serde(default = "default_chat_path")]
	pub path: String,
	pub model: String,
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	#[serde(default = "default_embedding_path")]
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	#[serde(default = "default_timeout_ms")]
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Chunking {
	pub strategies: Vec<ChunkStrategy>,
}
impl Default for Chunking {
	fn default() -> Self {
		Self { strategies: vec![ChunkStrategy::default()] }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Summary {
	pub max_tokens: u32,
	pub concurrency: usize,
}
impl Default for Summary {
	fn default() -> Self {
		Self { max_tokens: 200, concurrency: 5 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub top_k: u32,
	pub similarity_threshold: f32,
	pub rerank_candidate_multiplier: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { top_k: 10, similarity_threshold: 0.3, rerank_candidate_multiplier: 3 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub vector_weight: f32,
	pub score_weight: f32,
}
impl Default for Ranking {
	fn default() -> Self {
		Self { vector_weight: 0.3, score_weight: 0.7 }
	}
}

fn default_http_bind() -> String {
	"127.0.0.1:8046".to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_pool_max_conns() -> u32 {
	8
}

fn default_chat_path() -> String {
	"/chat/completions".to_string()
}

fn default_embedding_path() -> String {
	"/embeddings".to_string()
}

fn default_temperature() -> f32 {
	0.1
}

fn default_timeout_ms() -> u64 {
	30_000
}
