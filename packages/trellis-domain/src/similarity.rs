use crate::{Error, Result};

/// Cosine similarity in [-1, 1]. Zero-magnitude inputs score 0 rather than
/// dividing by zero.
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> Result<f32> {
	if left.len() != right.len() {
		return Err(Error::DimensionMismatch { left: left.len(), right: right.len() });
	}

	let mut dot = 0.0_f64;
	let mut norm_left = 0.0_f64;
	let mut norm_right = 0.0_f64;

	for (l, r) in left.iter().zip(right.iter()) {
		dot += *l as f64 * *r as f64;
		norm_left += *l as f64 * *l as f64;
		norm_right += *r as f64 * *r as f64;
	}

	if norm_left == 0.0 || norm_right == 0.0 {
		return Ok(0.0);
	}

	Ok((dot / (norm_left.sqrt() * norm_right.sqrt())) as f32)
}
