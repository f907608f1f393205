/// Shared tokenization rules. The tagger, the expander, and snippet
/// generation all normalize text through this module so dictionary keys and
/// candidate phrases can never diverge.
const STOP_WORDS: &[&str] = &[
	"a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "in", "into", "is",
	"it", "its", "of", "on", "or", "that", "the", "their", "these", "this", "those", "to", "was",
	"were", "with",
];

const SNIPPET_LEAD_CHARS: usize = 50;

pub fn is_stop_word(token: &str) -> bool {
	STOP_WORDS.contains(&token)
}

/// Lowercase alphanumeric tokens with stop words removed. Punctuation and
/// hyphens split words, so "RNA-Seq" and "rna seq" tokenize identically.
pub fn tokenize(text: &str) -> Vec<String> {
	let mut normalized = String::with_capacity(text.len());

	for ch in text.chars() {
		if ch.is_alphanumeric() {
			normalized.extend(ch.to_lowercase());
		} else {
			normalized.push(' ');
		}
	}

	normalized
		.split_whitespace()
		.filter(|token| !is_stop_word(token))
		.map(str::to_string)
		.collect()
}

/// Canonical lookup key for a dictionary surface form: tokens joined with a
/// single space.
pub fn normalize_phrase(text: &str) -> String {
	tokenize(text).join(" ")
}

/// Bounded window of text around the first occurrence of any needle,
/// defaulting to the start of the text when nothing matches. Needles are
/// matched case-insensitively.
pub fn make_snippet(text: &str, needles: &[String], max_chars: usize) -> String {
	let text = text.trim();

	if text.is_empty() {
		return String::new();
	}

	let lower = text.to_lowercase();
	let mut first_match: Option<usize> = None;

	for needle in needles {
		let needle = needle.trim().to_lowercase();
		if needle.is_empty() {
			continue;
		}
		if let Some(pos) = lower.find(&needle) {
			first_match = Some(first_match.map_or(pos, |prev| prev.min(pos)));
		}
	}

	let anchor = first_match.unwrap_or(0);
	let start = floor_char_boundary(text, anchor.saturating_sub(SNIPPET_LEAD_CHARS));
	let end = floor_char_boundary(text, (anchor + max_chars).min(text.len()));
	let mut snippet = text[start..end].to_string();

	if start > 0 {
		snippet = format!("...{snippet}");
	}
	if end < text.len() {
		snippet.push_str("...");
	}

	snippet
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
	index = index.min(text.len());

	while index > 0 && !text.is_char_boundary(index) {
		index -= 1;
	}

	index
}
