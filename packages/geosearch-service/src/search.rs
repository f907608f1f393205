use std::{collections::HashMap, time::Duration};

use serde::{Deserialize, Serialize};
use time::Date;
use tracing::warn;
use uuid::Uuid;

use geosearch_domain::{
	expand::{self, Expansion, MatchedTerm},
	filter::SearchFilters,
	fusion::{self, FusedHit},
	text,
};

use crate::{SearchService, ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
	pub query: String,
	#[serde(default)]
	pub top_k: Option<usize>,
	#[serde(default = "default_true")]
	pub use_semantic: bool,
	#[serde(default = "default_true")]
	pub use_lexical: bool,
	#[serde(default = "default_true")]
	pub use_mesh: bool,
	#[serde(default)]
	pub filters: SearchFilters,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchItem {
	pub accession: String,
	pub title: String,
	pub snippet: String,
	pub organisms: Vec<String>,
	pub tech_type: Option<String>,
	#[serde(with = "geosearch_domain::date_serde::option")]
	pub submission_date: Option<Date>,
	pub n_samples: Option<i32>,
	pub pubmed_ids: Vec<String>,
	pub score: f32,
	pub semantic_rank: Option<u32>,
	pub lexical_rank: Option<u32>,
	pub mesh_boost: f32,
	pub mesh_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMetadata {
	pub trace_id: Uuid,
	pub original_query: String,
	pub expanded_query: String,
	pub matched_terms: Vec<MatchedTerm>,
	/// Search mode actually served: "hybrid", "semantic_only",
	/// "lexical_only" or "none".
	pub mode: String,
	/// True when the request disabled both backends; distinct from
	/// degradation, where an enabled backend failed.
	pub no_search_mode: bool,
	pub degraded_backends: Vec<String>,
	pub semantic_count: usize,
	pub lexical_count: usize,
	pub total_fused: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
	pub items: Vec<SearchItem>,
	pub metadata: SearchMetadata,
}

fn default_true() -> bool {
	true
}

impl SearchService {
	/// Hybrid retrieval: expand the query with dictionary terminology, fan
	/// out to the semantic backend and Postgres full-text search, fuse with
	/// reciprocal ranks, boost terminology overlap, filter and assemble.
	///
	/// A failed or timed-out backend degrades the response instead of
	/// failing it; only invalid input and storage faults surface as errors.
	pub async fn hybrid_search(&self, request: SearchRequest) -> ServiceResult<SearchResponse> {
		let trace_id = Uuid::new_v4();
		let query = request.query.trim().to_string();

		if query.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Query must not be empty.".to_string(),
			});
		}

		request.filters.validate()?;

		let search_cfg = &self.cfg.search;
		let top_k = request.top_k.unwrap_or(search_cfg.final_top_k).max(1);
		let dictionary = self.dictionary_snapshot();
		let expansion = if request.use_mesh {
			expand::expand(&query, &dictionary, &self.cfg.expansion)
		} else {
			Expansion {
				original_query: query.clone(),
				expanded_query: query.clone(),
				matched_terms: Vec::new(),
			}
		};

		let backend_timeout = Duration::from_millis(search_cfg.backend_timeout_ms);
		// The semantic side gets the expanded text; the lexical side keeps
		// the verbatim query so exact-term matching stays precise.
		let semantic_arm = async {
			if !request.use_semantic {
				return BackendArm::Skipped;
			}

			let result = tokio::time::timeout(
				backend_timeout,
				self.backends.semantic.search(
					&self.cfg.providers.semantic,
					&expansion.expanded_query,
					search_cfg.semantic_top_k,
				),
			)
			.await;

			settle_backend(trace_id, "semantic", result)
		};
		let lexical_arm = async {
			if !request.use_lexical {
				return BackendArm::Skipped;
			}

			let result = tokio::time::timeout(
				backend_timeout,
				self.backends.store.full_text_search(&query, search_cfg.lexical_top_k),
			)
			.await;

			settle_backend(trace_id, "lexical", result)
		};
		let (semantic_arm, lexical_arm) = tokio::join!(semantic_arm, lexical_arm);

		let no_search_mode = !request.use_semantic && !request.use_lexical;
		let mode = match (semantic_arm.is_available(), lexical_arm.is_available()) {
			(true, true) => "hybrid",
			(true, false) => "semantic_only",
			(false, true) => "lexical_only",
			(false, false) => "none",
		};
		let mut degraded_backends = Vec::new();

		if matches!(semantic_arm, BackendArm::Failed) {
			degraded_backends.push("semantic".to_string());
		}
		if matches!(lexical_arm, BackendArm::Failed) {
			degraded_backends.push("lexical".to_string());
		}

		let semantic_hits = semantic_arm.into_hits();
		let lexical_hits = lexical_arm.into_hits();
		let semantic_count = semantic_hits.len();
		let lexical_count = lexical_hits.len();

		let mut fused =
			fusion::reciprocal_rank_fusion(&semantic_hits, &lexical_hits, search_cfg.rrf_k);

		if !expansion.matched_terms.is_empty() && !fused.is_empty() {
			let accessions: Vec<String> =
				fused.iter().map(|hit| hit.accession.clone()).collect();
			let mesh_ids: Vec<String> =
				expansion.matched_terms.iter().map(|term| term.mesh_id.clone()).collect();
			let overlaps =
				self.backends.store.tagged_term_counts(&accessions, &mesh_ids).await?;

			fusion::apply_mesh_boost(&mut fused, &overlaps, search_cfg);
		}

		fusion::sort_hits(&mut fused);

		let total_fused = fused.len();
		let items = self.assemble(&query, &expansion, &request.filters, fused, top_k).await?;

		Ok(SearchResponse {
			items,
			metadata: SearchMetadata {
				trace_id,
				original_query: expansion.original_query,
				expanded_query: expansion.expanded_query,
				matched_terms: expansion.matched_terms,
				mode: mode.to_string(),
				no_search_mode,
				degraded_backends,
				semantic_count,
				lexical_count,
				total_fused,
			},
		})
	}

	async fn assemble(
		&self,
		query: &str,
		expansion: &Expansion,
		filters: &SearchFilters,
		fused: Vec<FusedHit>,
		top_k: usize,
	) -> ServiceResult<Vec<SearchItem>> {
		// Filtering discards an unknown share of candidates, so hydrate a
		// window of twice the requested size before cutting to top_k.
		let candidates: Vec<FusedHit> = fused.into_iter().take(top_k * 2).collect();
		let accessions: Vec<String> =
			candidates.iter().map(|hit| hit.accession.clone()).collect();
		let records = self.backends.store.fetch_records(&accessions).await?;
		let mut by_accession: HashMap<String, _> = records
			.into_iter()
			.map(|record| (record.accession.clone(), record))
			.collect();

		let mut kept = Vec::with_capacity(top_k);
		for hit in candidates {
			// A fused accession with no catalog row is stale backend data.
			let Some(record) = by_accession.remove(&hit.accession) else {
				warn!(accession = hit.accession.as_str(), "Fused hit missing from catalog.");

				continue;
			};

			if !filters.matches(&record.facets()) {
				continue;
			}

			kept.push((hit, record));

			if kept.len() == top_k {
				break;
			}
		}

		let kept_accessions: Vec<String> =
			kept.iter().map(|(hit, _)| hit.accession.clone()).collect();
		// Only associations overlapping the query-matched terms are shown.
		let matched_ids: Vec<String> =
			expansion.matched_terms.iter().map(|term| term.mesh_id.clone()).collect();
		let mut term_names =
			self.backends.store.record_mesh_terms(&kept_accessions, &matched_ids).await?;
		let needles = snippet_needles(query, &expansion.matched_terms);

		Ok(kept
			.into_iter()
			.map(|(hit, record)| SearchItem {
				snippet: text::make_snippet(
					&format!(
						"{} {} {}",
						record.title, record.summary, record.overall_design
					),
					&needles,
					self.cfg.search.snippet_max_chars,
				),
				mesh_terms: term_names.remove(&hit.accession).unwrap_or_default(),
				accession: record.accession,
				title: record.title,
				organisms: record.organisms,
				tech_type: record.tech_type,
				submission_date: record.submission_date,
				n_samples: record.n_samples,
				pubmed_ids: record.pubmed_ids,
				score: hit.score,
				semantic_rank: hit.semantic_rank,
				lexical_rank: hit.lexical_rank,
				mesh_boost: hit.mesh_boost,
			})
			.collect())
	}
}

enum BackendArm<T> {
	Skipped,
	Available(Vec<T>),
	Failed,
}

impl<T> BackendArm<T> {
	fn is_available(&self) -> bool {
		matches!(self, Self::Available(_))
	}

	fn into_hits(self) -> Vec<T> {
		match self {
			Self::Available(hits) => hits,
			Self::Skipped | Self::Failed => Vec::new(),
		}
	}
}

fn settle_backend<T, E>(
	trace_id: Uuid,
	backend: &str,
	result: Result<Result<Vec<T>, E>, tokio::time::error::Elapsed>,
) -> BackendArm<T>
where
	E: std::fmt::Display,
{
	match result {
		Ok(Ok(hits)) => BackendArm::Available(hits),
		Ok(Err(err)) => {
			warn!(%trace_id, backend, error = %err, "Backend failed; degrading.");

			BackendArm::Failed
		},
		Err(_) => {
			warn!(%trace_id, backend, "Backend timed out; degrading.");

			BackendArm::Failed
		},
	}
}

/// Query tokens plus every surface form of the matched terms, so a snippet
/// can anchor on a synonym the record uses instead of the query's wording.
fn snippet_needles(query: &str, matched_terms: &[MatchedTerm]) -> Vec<String> {
	let mut seen = std::collections::HashSet::new();
	let mut needles = Vec::new();

	for token in text::tokenize(query) {
		if seen.insert(token.clone()) {
			needles.push(token);
		}
	}
	for term in matched_terms {
		let surfaces =
			std::iter::once(&term.preferred_name).chain(term.entry_terms.iter());

		for surface in surfaces {
			for token in text::tokenize(surface) {
				if seen.insert(token.clone()) {
					needles.push(token);
				}
			}
		}
	}

	needles
}
