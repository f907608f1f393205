use std::collections::HashSet;

use geosearch_config::Expansion as ExpansionConfig;
use serde::{Deserialize, Serialize};

use crate::{dictionary::Dictionary, tagger::MAX_PHRASE_TOKENS, text};

/// Query tokens shorter than this are not looked up. ("RNA" still passes.)
const MIN_QUERY_PHRASE_CHARS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedTerm {
	pub mesh_id: String,
	pub preferred_name: String,
	pub entry_terms: Vec<String>,
	/// Token range `[start, end)` matched in the tokenized query.
	pub span: (usize, usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expansion {
	pub original_query: String,
	pub expanded_query: String,
	pub matched_terms: Vec<MatchedTerm>,
}

/// Rewrites a query with dictionary terminology. Strictly additive: the
/// original query text is always a verbatim prefix of the expanded query,
/// and an empty match list leaves the query untouched.
///
/// N-grams are tried longest first, left to right; tokens covered by a hit
/// are consumed so sub-tokens of a matched phrase are not re-matched.
pub fn expand(query: &str, dict: &Dictionary, cfg: &ExpansionConfig) -> Expansion {
	let tokens = text::tokenize(query);
	let mut matched = if cfg.max_terms == 0 {
		Vec::new()
	} else {
		match_terms(&tokens, dict)
	};

	// First occurrence in the query decides which terms survive max_terms.
	matched.sort_by_key(|term| term.span);
	matched.truncate(cfg.max_terms);

	let expanded_query = build_expanded_query(query, &matched, cfg.max_synonyms_per_term);

	Expansion { original_query: query.to_string(), expanded_query, matched_terms: matched }
}

fn match_terms(tokens: &[String], dict: &Dictionary) -> Vec<MatchedTerm> {
	let mut consumed = vec![false; tokens.len()];
	let mut seen_ids: HashSet<String> = HashSet::new();
	let mut matched = Vec::new();

	for len in (1..=MAX_PHRASE_TOKENS).rev() {
		if len > tokens.len() {
			continue;
		}

		for start in 0..=tokens.len() - len {
			let window = start..start + len;
			if consumed[window.clone()].iter().any(|used| *used) {
				continue;
			}

			let phrase = tokens[window.clone()].join(" ");
			if phrase.chars().count() < MIN_QUERY_PHRASE_CHARS {
				continue;
			}

			let Some(term) = dict.lookup(&phrase) else {
				continue;
			};

			consumed[window].fill(true);

			if seen_ids.insert(term.mesh_id.clone()) {
				matched.push(MatchedTerm {
					mesh_id: term.mesh_id.clone(),
					preferred_name: term.preferred_name.clone(),
					entry_terms: term.entry_terms.clone(),
					span: (start, start + len),
				});
			}
		}
	}

	matched
}

fn build_expanded_query(
	query: &str,
	matched: &[MatchedTerm],
	max_synonyms_per_term: usize,
) -> String {
	let query_lower = query.to_lowercase();
	let mut seen: HashSet<String> = HashSet::new();
	let mut additions: Vec<&str> = Vec::new();

	for term in matched {
		let candidates = std::iter::once(term.preferred_name.as_str())
			.chain(term.entry_terms.iter().take(max_synonyms_per_term).map(String::as_str));

		for candidate in candidates {
			let key = candidate.to_lowercase();
			if key.is_empty() || query_lower.contains(&key) {
				continue;
			}
			if seen.insert(key) {
				additions.push(candidate);
			}
		}
	}

	if additions.is_empty() {
		query.to_string()
	} else {
		format!("{query} {}", additions.join(" "))
	}
}
