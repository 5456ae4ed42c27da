pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Vector dimensions differ: {left} vs {right}.")]
	DimensionMismatch { left: usize, right: usize },
}
