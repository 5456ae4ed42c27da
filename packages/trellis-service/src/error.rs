pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Dimension mismatch: {message}")]
	DimensionMismatch { message: String },
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		if let sqlx::Error::Database(db_err) = &err
			&& db_err.is_unique_violation()
		{
			return Self::Conflict { message: db_err.to_string() };
		}

		Self::Storage { message: err.to_string() }
	}
}

impl From<trellis_storage::Error> for Error {
	fn from(err: trellis_storage::Error) -> Self {
		match err {
			trellis_storage::Error::Sqlx(inner) => Self::from(inner),
			trellis_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			trellis_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<trellis_chunking::Error> for Error {
	fn from(err: trellis_chunking::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
