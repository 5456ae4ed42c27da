pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures of the provider wire layer. Transport and header-assembly errors
/// convert from their reqwest sources; `InvalidConfig` covers bad
/// `default_headers` values and `InvalidResponse` covers replies that parse
/// as JSON but not as the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
}
