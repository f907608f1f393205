use std::collections::HashMap;

use geosearch_config::Search as SearchConfig;
use serde::{Deserialize, Serialize};

/// One backend's ranked result. Backends report their own scores but fusion
/// only consumes the ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedHit {
	pub accession: String,
	pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedHit {
	pub accession: String,
	pub score: f32,
	pub semantic_rank: Option<u32>,
	pub lexical_rank: Option<u32>,
	pub mesh_boost: f32,
}

/// Reciprocal rank fusion over the two backend lists. Ranks start at 1 and
/// each list contributes `1 / (k + rank)`; an accession repeated within a
/// single list keeps its first (best) rank.
pub fn reciprocal_rank_fusion(
	semantic: &[RankedHit],
	lexical: &[RankedHit],
	rrf_k: u32,
) -> Vec<FusedHit> {
	let mut fused: HashMap<&str, FusedHit> = HashMap::new();
	let mut order: Vec<&str> = Vec::new();

	for (rank, hit) in ranked(semantic) {
		let entry = fused.entry(hit.accession.as_str()).or_insert_with(|| {
			order.push(hit.accession.as_str());
			blank_hit(&hit.accession)
		});
		if entry.semantic_rank.is_none() {
			entry.semantic_rank = Some(rank);
			entry.score += rrf_contribution(rrf_k, rank);
		}
	}

	for (rank, hit) in ranked(lexical) {
		let entry = fused.entry(hit.accession.as_str()).or_insert_with(|| {
			order.push(hit.accession.as_str());
			blank_hit(&hit.accession)
		});
		if entry.lexical_rank.is_none() {
			entry.lexical_rank = Some(rank);
			entry.score += rrf_contribution(rrf_k, rank);
		}
	}

	order
		.into_iter()
		.filter_map(|accession| fused.remove(accession))
		.collect()
}

/// Promotes hits whose records share dictionary terms with the query.
/// `overlap_counts` maps accession to the number of overlapping terms; the
/// boost is `boost_per_term * count` saturating at `boost_cap`, and a missing
/// or zero count leaves the fused score untouched.
pub fn apply_mesh_boost(
	hits: &mut [FusedHit],
	overlap_counts: &HashMap<String, u32>,
	cfg: &SearchConfig,
) {
	for hit in hits {
		let count = overlap_counts.get(&hit.accession).copied().unwrap_or(0);
		if count == 0 {
			continue;
		}

		hit.mesh_boost = (cfg.boost_per_term * count as f32).min(cfg.boost_cap);
		hit.score += hit.mesh_boost;
	}
}

/// Final ordering: score descending, accession ascending on exact ties.
pub fn sort_hits(hits: &mut [FusedHit]) {
	hits.sort_by(|a, b| {
		b.score
			.partial_cmp(&a.score)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| a.accession.cmp(&b.accession))
	});
}

/// Full fusion pass: RRF, boost, deterministic sort.
pub fn fuse(
	semantic: &[RankedHit],
	lexical: &[RankedHit],
	overlap_counts: &HashMap<String, u32>,
	cfg: &SearchConfig,
) -> Vec<FusedHit> {
	let mut hits = reciprocal_rank_fusion(semantic, lexical, cfg.rrf_k);

	apply_mesh_boost(&mut hits, overlap_counts, cfg);
	sort_hits(&mut hits);

	hits
}

fn ranked(hits: &[RankedHit]) -> impl Iterator<Item = (u32, &RankedHit)> {
	hits.iter().enumerate().map(|(i, hit)| (i as u32 + 1, hit))
}

fn blank_hit(accession: &str) -> FusedHit {
	FusedHit {
		accession: accession.to_string(),
		score: 0.,
		semantic_rank: None,
		lexical_rank: None,
		mesh_boost: 0.,
	}
}

fn rrf_contribution(rrf_k: u32, rank: u32) -> f32 {
	1. / (rrf_k + rank) as f32
}
