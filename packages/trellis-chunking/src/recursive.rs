//! Separator-ladder splitting. Coarser separators are tried first; a fragment
//! that still exceeds the budget escalates to the next rung, ending at a
//! character-window fallback. Fragments keep their trailing separator so that
//! concatenating the output reproduces the input.

pub(crate) enum SeparatorLevel {
	Literal(&'static str),
	AnyOf(&'static [char]),
}

/// Most to least semantic: paragraph break, newline, CJK sentence
/// terminators, Latin sentence terminators, semicolons, commas, space.
pub(crate) const SEPARATOR_LEVELS: &[SeparatorLevel] = &[
	SeparatorLevel::Literal("\n\n"),
	SeparatorLevel::Literal("\n"),
	SeparatorLevel::AnyOf(&['。', '！', '？']),
	SeparatorLevel::AnyOf(&['.', '!', '?']),
	SeparatorLevel::AnyOf(&[';', '；']),
	SeparatorLevel::AnyOf(&[',', '，']),
	SeparatorLevel::Literal(" "),
];

pub(crate) fn char_len(text: &str) -> usize {
	text.chars().count()
}

/// Last `count` characters of `text`.
pub(crate) fn char_tail(text: &str, count: usize) -> &str {
	if count == 0 {
		return "";
	}

	let total = char_len(text);

	if total <= count {
		return text;
	}

	match text.char_indices().nth(total - count) {
		Some((cut, _)) => &text[cut..],
		None => text,
	}
}

/// Drops everything up to and including the first separator occurrence,
/// scanning rungs in priority order. Falls back to the untrimmed tail when no
/// separator leaves a non-empty remainder.
pub(crate) fn trim_tail_at_separator(tail: &str) -> &str {
	for level in SEPARATOR_LEVELS {
		let after = match level {
			SeparatorLevel::Literal(sep) => tail.find(sep).map(|pos| pos + sep.len()),
			SeparatorLevel::AnyOf(chars) => tail
				.char_indices()
				.find(|(_, ch)| chars.contains(ch))
				.map(|(pos, ch)| pos + ch.len_utf8()),
		};

		if let Some(after) = after
			&& after < tail.len()
		{
			return &tail[after..];
		}
	}

	tail
}

/// Splits `text` into pieces of at most `target` characters. Invariant:
/// concatenating the pieces reproduces `text` exactly.
pub(crate) fn recursive_split(text: &str, target: usize, level: usize) -> Vec<String> {
	if char_len(text) <= target {
		return vec![text.to_string()];
	}

	let Some(separator) = SEPARATOR_LEVELS.get(level) else {
		return char_windows(text, target);
	};
	let fragments = split_keeping_separator(text, separator);

	if fragments.len() <= 1 {
		return recursive_split(text, target, level + 1);
	}

	merge_fragments(&fragments, target, level)
}

fn split_keeping_separator<'a>(text: &'a str, separator: &SeparatorLevel) -> Vec<&'a str> {
	match separator {
		SeparatorLevel::Literal(sep) => text.split_inclusive(*sep).collect(),
		SeparatorLevel::AnyOf(chars) =>
			text.split_inclusive(|ch: char| chars.contains(&ch)).collect(),
	}
}

/// Greedy accumulation: adjacent fragments are packed while the accumulator
/// stays within `target`; an oversized fragment escalates to the next rung.
fn merge_fragments(fragments: &[&str], target: usize, level: usize) -> Vec<String> {
	let mut pieces = Vec::new();
	let mut current = String::new();
	let mut current_len = 0_usize;

	for fragment in fragments {
		let fragment_len = char_len(fragment);

		if fragment_len > target {
			if !current.is_empty() {
				pieces.push(std::mem::take(&mut current));

				current_len = 0;
			}

			pieces.extend(recursive_split(fragment, target, level + 1));

			continue;
		}
		if !current.is_empty() && current_len + fragment_len > target {
			pieces.push(std::mem::take(&mut current));

			current_len = 0;
		}

		current.push_str(fragment);

		current_len += fragment_len;
	}

	if !current.is_empty() {
		pieces.push(current);
	}

	pieces
}

/// Character-level fallback: fixed windows of `target` characters.
fn char_windows(text: &str, target: usize) -> Vec<String> {
	let mut pieces = Vec::new();
	let mut current = String::with_capacity(target.min(text.len()));
	let mut count = 0_usize;

	for ch in text.chars() {
		current.push(ch);

		count += 1;

		if count == target {
			pieces.push(std::mem::take(&mut current));

			count = 0;
		}
	}

	if !current.is_empty() {
		pieces.push(current);
	}

	pieces
}
