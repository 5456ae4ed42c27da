mod types;

use std::{collections::HashSet, fs, path::Path};

use color_eyre::eyre;

pub use types::{
	ChatProviderConfig, Chunking, Config, EmbeddingProviderConfig, Postgres, Providers, Ranking,
	Search, Service, Storage, Summary,
};

pub fn load(path: &Path) -> color_eyre::Result<Config> {
	let raw = fs::read_to_string(path)?;
	let cfg: Config = toml::from_str(&raw)?;

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> color_eyre::Result<()> {
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(eyre::eyre!("storage.postgres.dsn must be non-empty."));
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(eyre::eyre!("storage.postgres.pool_max_conns must be greater than zero."));
	}

	for (label, key) in [
		("chat", &cfg.providers.chat.api_key),
		("embedding", &cfg.providers.embedding.api_key),
	] {
		if key.trim().is_empty() {
			return Err(eyre::eyre!("Provider {label} api_key must be non-empty."));
		}
	}

	if cfg.providers.embedding.dimensions == 0 {
		return Err(eyre::eyre!("providers.embedding.dimensions must be greater than zero."));
	}
	if cfg.chunking.strategies.is_empty() {
		return Err(eyre::eyre!("chunking.strategies must contain at least one strategy."));
	}

	let mut seen = HashSet::new();

	for strategy in &cfg.chunking.strategies {
		strategy
			.validate()
			.map_err(|err| eyre::eyre!("chunking.strategies entry is invalid: {err}"))?;

		if !seen.insert(strategy.triple()) {
			return Err(eyre::eyre!(
				"chunking.strategies contains duplicate triple {:?}.",
				strategy.triple()
			));
		}
	}

	if cfg.summary.max_tokens == 0 {
		return Err(eyre::eyre!("summary.max_tokens must be greater than zero."));
	}
	if cfg.summary.concurrency == 0 {
		return Err(eyre::eyre!("summary.concurrency must be greater than zero."));
	}
	if cfg.search.top_k == 0 {
		return Err(eyre::eyre!("search.top_k must be greater than zero."));
	}
	if !(0.0..=1.0).contains(&cfg.search.similarity_threshold) {
		return Err(eyre::eyre!("search.similarity_threshold must be in the range 0.0-1.0."));
	}
	if cfg.search.rerank_candidate_multiplier == 0 {
		return Err(eyre::eyre!("search.rerank_candidate_multiplier must be greater than zero."));
	}

	for (label, weight) in [
		("ranking.vector_weight", cfg.ranking.vector_weight),
		("ranking.score_weight", cfg.ranking.score_weight),
	] {
		if !weight.is_finite() {
			return Err(eyre::eyre!("{label} must be a finite number."));
		}
		if !(0.0..=1.0).contains(&weight) {
			return Err(eyre::eyre!("{label} must be in the range 0.0-1.0."));
		}
	}

	Ok(())
}
