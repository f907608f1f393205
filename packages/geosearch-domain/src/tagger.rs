use std::collections::HashMap;

use geosearch_config::Tagger as TaggerConfig;

use crate::{
	dictionary::{Dictionary, SurfaceKind},
	text,
};

/// Longest candidate phrase considered, in tokens.
pub const MAX_PHRASE_TOKENS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct TermScore {
	pub mesh_id: String,
	pub confidence: f32,
}

/// One searchable text field with its relative evidence weight.
#[derive(Debug, Clone, Copy)]
pub struct FieldText<'a> {
	pub name: &'a str,
	pub text: &'a str,
	pub weight: f32,
}

/// Scores every dictionary term against a record's text fields.
///
/// Per field the strongest match per term is kept; field contributions are
/// then summed, capped at `confidence_cap`, and filtered by
/// `confidence_threshold` (inclusive: a score exactly at the threshold
/// survives). Output order is descending confidence, mesh id ascending on
/// ties, so repeated runs over unchanged input produce identical output.
pub fn tag_fields(
	fields: &[FieldText<'_>],
	dict: &Dictionary,
	cfg: &TaggerConfig,
) -> Vec<TermScore> {
	let mut totals: HashMap<String, f32> = HashMap::new();

	for field in fields {
		if field.text.trim().is_empty() {
			continue;
		}

		for (mesh_id, base) in match_field(field.text, dict, cfg) {
			*totals.entry(mesh_id).or_insert(0.0) += base * field.weight;
		}
	}

	let mut scores: Vec<TermScore> = totals
		.into_iter()
		.map(|(mesh_id, confidence)| TermScore {
			mesh_id,
			confidence: confidence.min(cfg.confidence_cap),
		})
		.filter(|score| score.confidence >= cfg.confidence_threshold)
		.collect();

	scores.sort_by(|a, b| {
		b.confidence
			.partial_cmp(&a.confidence)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| a.mesh_id.cmp(&b.mesh_id))
	});

	scores
}

/// Best unweighted match per term within one text field.
fn match_field(field_text: &str, dict: &Dictionary, cfg: &TaggerConfig) -> HashMap<String, f32> {
	let tokens = text::tokenize(field_text);
	let mut best: HashMap<String, f32> = HashMap::new();

	for start in 0..tokens.len() {
		let max_len = MAX_PHRASE_TOKENS.min(tokens.len() - start);

		for len in 1..=max_len {
			let phrase = tokens[start..start + len].join(" ");

			// Very short phrases produce mostly false positives.
			if phrase.chars().count() < cfg.min_phrase_chars {
				continue;
			}

			for (term, kind) in dict.surfaces_for(&phrase) {
				record_best(&mut best, &term.mesh_id, phrase_confidence(kind, len, cfg));
			}

			if len == 1 {
				for partial in dict.partial_matches(&phrase) {
					record_best(
						&mut best,
						&partial.term.mesh_id,
						partial_confidence(partial.phrase_tokens, cfg),
					);
				}
			}
		}
	}

	best
}

fn record_best(best: &mut HashMap<String, f32>, mesh_id: &str, confidence: f32) {
	let entry = best.entry(mesh_id.to_string()).or_insert(0.0);

	if confidence > *entry {
		*entry = confidence;
	}
}

fn phrase_confidence(kind: SurfaceKind, token_len: usize, cfg: &TaggerConfig) -> f32 {
	let span = cfg.phrase_step * (token_len.saturating_sub(1)) as f32;

	match kind {
		SurfaceKind::Preferred => (cfg.phrase_base + span).min(cfg.phrase_cap),
		SurfaceKind::Synonym => (cfg.synonym_base + span).min(cfg.synonym_cap),
	}
}

/// A single token found inside a multi-word surface form scores by the
/// fraction of that form it covers, so a one-word hit on a five-word term
/// ranks below a one-word hit on a two-word term.
fn partial_confidence(phrase_tokens: usize, cfg: &TaggerConfig) -> f32 {
	cfg.partial_base + cfg.partial_span / phrase_tokens.max(1) as f32
}
