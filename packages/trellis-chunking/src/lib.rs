//! Hierarchical splitting: a document becomes parent spans, each parent
//! becomes child spans, both produced by the same recursive separator-ladder
//! algorithm. Positions are character offsets into the source document and
//! are advisory for display, not identity.

mod recursive;

use serde::{Deserialize, Serialize};

use crate::recursive::{char_len, char_tail, recursive_split, trim_tail_at_separator};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{message}")]
	InvalidStrategy { message: String },
}

/// A (parent size, child size, overlap percent) triple. The triple identifies
/// the strategy; `name` is a display label only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkStrategy {
	pub parent_chunk_size: u32,
	pub child_chunk_size: u32,
	pub overlap_percent: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}
impl ChunkStrategy {
	pub fn validate(&self) -> Result<()> {
		if self.parent_chunk_size == 0 || self.child_chunk_size == 0 {
			return Err(Error::InvalidStrategy {
				message: "Chunk sizes must be greater than zero.".to_string(),
			});
		}
		if self.child_chunk_size > self.parent_chunk_size {
			return Err(Error::InvalidStrategy {
				message: "child_chunk_size must not exceed parent_chunk_size.".to_string(),
			});
		}
		if self.overlap_percent >= 100 {
			return Err(Error::InvalidStrategy {
				message: "overlap_percent must be below 100.".to_string(),
			});
		}

		Ok(())
	}

	pub fn triple(&self) -> (u32, u32, u32) {
		(self.parent_chunk_size, self.child_chunk_size, self.overlap_percent)
	}

	pub fn parent_overlap(&self) -> usize {
		(self.parent_chunk_size * self.overlap_percent / 100) as usize
	}

	pub fn child_overlap(&self) -> usize {
		(self.child_chunk_size * self.overlap_percent / 100) as usize
	}
}

impl Default for ChunkStrategy {
	fn default() -> Self {
		Self { parent_chunk_size: 2_000, child_chunk_size: 800, overlap_percent: 25, name: None }
	}
}

/// One span of a single-level split. Offsets are character positions into the
/// text that was split; a span carrying an injected overlap prefix starts
/// inside its predecessor.
#[derive(Clone, Debug)]
pub struct Span {
	pub content: String,
	pub start: usize,
	pub end: usize,
}

#[derive(Clone, Debug)]
pub struct ChildSpan {
	pub chunk_index: i32,
	pub start_position: usize,
	pub end_position: usize,
	pub content: String,
}

#[derive(Clone, Debug)]
pub struct ParentSpan {
	pub parent_index: i32,
	pub start_position: usize,
	pub end_position: usize,
	pub content: String,
	pub children: Vec<ChildSpan>,
}

/// Single-level split into spans of at most `size` characters, with the last
/// `overlap` characters of each span's predecessor prepended (trimmed at the
/// first separator the tail contains).
pub fn split_text(text: &str, size: usize, overlap: usize) -> Vec<Span> {
	if text.is_empty() {
		return Vec::new();
	}
	if overlap >= size {
		// A step of size - overlap would never advance. Emit the remainder
		// whole instead of looping.
		tracing::warn!(size, overlap, "Overlap consumes the whole chunk size; not splitting.");

		return vec![Span { content: text.to_string(), start: 0, end: char_len(text) }];
	}

	let pieces = recursive_split(text, size, 0);
	let mut bounds = Vec::with_capacity(pieces.len());
	let mut offset = 0_usize;

	for piece in &pieces {
		let len = char_len(piece);

		bounds.push((offset, offset + len));

		offset += len;
	}

	let mut spans = Vec::with_capacity(pieces.len());

	for (index, piece) in pieces.iter().enumerate() {
		let (start, end) = bounds[index];

		if index == 0 || overlap == 0 {
			spans.push(Span { content: piece.clone(), start, end });

			continue;
		}

		let tail = char_tail(&pieces[index - 1], overlap);
		let trimmed = trim_tail_at_separator(tail);

		spans.push(Span {
			content: format!("{trimmed}{piece}"),
			start: start - char_len(trimmed),
			end,
		});
	}

	spans
}

/// Full hierarchical split for one strategy: parent pass over the document,
/// then a child pass over each parent's content with offsets lifted back into
/// document space.
pub fn split_document(text: &str, strategy: &ChunkStrategy) -> Result<Vec<ParentSpan>> {
	strategy.validate()?;

	if text.is_empty() {
		return Ok(Vec::new());
	}

	let parent_spans =
		split_text(text, strategy.parent_chunk_size as usize, strategy.parent_overlap());
	let mut parents = Vec::with_capacity(parent_spans.len());

	for (parent_index, parent) in parent_spans.into_iter().enumerate() {
		let children = split_text(
			&parent.content,
			strategy.child_chunk_size as usize,
			strategy.child_overlap(),
		)
		.into_iter()
		.enumerate()
		.map(|(chunk_index, child)| ChildSpan {
			chunk_index: chunk_index as i32,
			start_position: parent.start + child.start,
			end_position: parent.start + child.end,
			content: child.content,
		})
		.collect();

		parents.push(ParentSpan {
			parent_index: parent_index as i32,
			start_position: parent.start,
			end_position: parent.end,
			content: parent.content,
			children,
		});
	}

	Ok(parents)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_text_yields_no_spans() {
		let parents = split_document("", &ChunkStrategy::default()).unwrap();

		assert!(parents.is_empty());
	}

	#[test]
	fn text_below_child_size_yields_one_parent_one_child() {
		let text = "The getUserById API fetches a user by primary key.";
		let parents = split_document(text, &ChunkStrategy::default()).unwrap();

		assert_eq!(parents.len(), 1);
		assert_eq!(parents[0].children.len(), 1);
		assert_eq!(parents[0].content, text);
		assert_eq!(parents[0].children[0].content, text);
		assert_eq!(parents[0].start_position, 0);
		assert_eq!(parents[0].end_position, text.chars().count());
	}

	#[test]
	fn invalid_strategies_are_rejected() {
		let full_overlap = ChunkStrategy { overlap_percent: 100, ..Default::default() };

		assert!(matches!(
			split_document("text", &full_overlap),
			Err(Error::InvalidStrategy { .. })
		));

		let inverted =
			ChunkStrategy { parent_chunk_size: 100, child_chunk_size: 200, ..Default::default() };

		assert!(matches!(split_document("text", &inverted), Err(Error::InvalidStrategy { .. })));

		let zero = ChunkStrategy { parent_chunk_size: 0, ..Default::default() };

		assert!(zero.validate().is_err());
	}

	#[test]
	fn overlap_floor_matches_the_strategy_percentages() {
		let strategy = ChunkStrategy::default();

		assert_eq!(strategy.parent_overlap(), 500);
		assert_eq!(strategy.child_overlap(), 200);

		let odd = ChunkStrategy {
			parent_chunk_size: 333,
			child_chunk_size: 111,
			overlap_percent: 10,
			name: None,
		};

		assert_eq!(odd.parent_overlap(), 33);
		assert_eq!(odd.child_overlap(), 11);
	}

	#[test]
	fn overlap_at_or_above_size_emits_the_text_whole() {
		let spans = split_text(&"word ".repeat(40), 10, 10);

		assert_eq!(spans.len(), 1);
		assert_eq!(spans[0].start, 0);
		assert_eq!(spans[0].end, 200);
	}

	#[test]
	fn zero_overlap_spans_concatenate_to_the_source() {
		let text = "alpha beta gamma. delta epsilon zeta. eta theta iota.\n\nkappa lambda mu. \
			nu xi omicron. pi rho sigma.";
		let spans = split_text(text, 30, 0);

		assert!(spans.len() >= 2);

		let rebuilt: String = spans.iter().map(|span| span.content.as_str()).collect();

		assert_eq!(rebuilt, text);

		for span in &spans {
			let slice: String =
				text.chars().skip(span.start).take(span.end - span.start).collect();

			assert_eq!(slice, span.content);
		}
	}

	#[test]
	fn injected_overlap_is_a_suffix_of_the_predecessor() {
		let text = "one two three four five. six seven eight nine ten. \
			eleven twelve thirteen fourteen fifteen. sixteen seventeen eighteen nineteen twenty.";
		let spans = split_text(text, 40, 10);

		assert!(spans.len() >= 2);

		for pair in spans.windows(2) {
			let source_slice: String =
				text.chars().skip(pair[1].start).take(pair[1].end - pair[1].start).collect();

			// Positions still locate the overlap-carrying content exactly.
			assert_eq!(source_slice, pair[1].content);
			assert!(pair[1].start < pair[0].end, "Expected spans to overlap.");
		}
	}

	#[test]
	fn child_positions_stay_within_their_parent() {
		let strategy =
			ChunkStrategy { parent_chunk_size: 60, child_chunk_size: 25, overlap_percent: 20, name: None };
		let text = "Sentence one is here. Sentence two follows it. Sentence three lands next. \
			Sentence four continues. Sentence five goes on. Sentence six wraps the text up.";
		let parents = split_document(text, &strategy).unwrap();

		assert!(parents.len() >= 2);

		for parent in &parents {
			assert!(!parent.children.is_empty());

			for (expected_index, child) in parent.children.iter().enumerate() {
				assert_eq!(child.chunk_index, expected_index as i32);
				assert!(parent.start_position <= child.start_position);
				assert!(child.start_position < child.end_position);
				assert!(child.end_position <= parent.end_position);
			}
		}
	}
}
