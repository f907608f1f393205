use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub tagger: Tagger,
	#[serde(default)]
	pub expansion: Expansion,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub semantic: SemanticBackendConfig,
}

/// HTTP endpoint of the vector-similarity backend. The backend owns
/// embedding generation and the vector index; this core only sends query
/// text and receives ranked accessions.
#[derive(Debug, Clone, Deserialize)]
pub struct SemanticBackendConfig {
	pub api_base: String,
	#[serde(default)]
	pub api_key: Option<String>,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	#[serde(default = "default_semantic_top_k")]
	pub semantic_top_k: usize,
	#[serde(default = "default_lexical_top_k")]
	pub lexical_top_k: usize,
	#[serde(default = "default_final_top_k")]
	pub final_top_k: usize,
	#[serde(default = "default_rrf_k")]
	pub rrf_k: u32,
	#[serde(default = "default_backend_timeout_ms")]
	pub backend_timeout_ms: u64,
	#[serde(default = "default_boost_per_term")]
	pub boost_per_term: f32,
	#[serde(default = "default_boost_cap")]
	pub boost_cap: f32,
	#[serde(default = "default_snippet_max_chars")]
	pub snippet_max_chars: usize,
}

/// Confidence constants for the record tagger. The source of these numbers
/// is empirical; they are configuration, not contract.
#[derive(Debug, Clone, Deserialize)]
pub struct Tagger {
	#[serde(default = "default_title_weight")]
	pub title_weight: f32,
	#[serde(default = "default_summary_weight")]
	pub summary_weight: f32,
	#[serde(default = "default_design_weight")]
	pub design_weight: f32,
	#[serde(default = "default_confidence_threshold")]
	pub confidence_threshold: f32,
	#[serde(default = "default_confidence_cap")]
	pub confidence_cap: f32,
	#[serde(default = "default_min_phrase_chars")]
	pub min_phrase_chars: usize,
	#[serde(default = "default_phrase_base")]
	pub phrase_base: f32,
	#[serde(default = "default_phrase_step")]
	pub phrase_step: f32,
	#[serde(default = "default_phrase_cap")]
	pub phrase_cap: f32,
	#[serde(default = "default_synonym_base")]
	pub synonym_base: f32,
	#[serde(default = "default_synonym_cap")]
	pub synonym_cap: f32,
	#[serde(default = "default_partial_base")]
	pub partial_base: f32,
	#[serde(default = "default_partial_span")]
	pub partial_span: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Expansion {
	#[serde(default = "default_max_terms")]
	pub max_terms: usize,
	#[serde(default = "default_max_synonyms_per_term")]
	pub max_synonyms_per_term: usize,
}

impl Default for Search {
	fn default() -> Self {
		Self {
			semantic_top_k: default_semantic_top_k(),
			lexical_top_k: default_lexical_top_k(),
			final_top_k: default_final_top_k(),
			rrf_k: default_rrf_k(),
			backend_timeout_ms: default_backend_timeout_ms(),
			boost_per_term: default_boost_per_term(),
			boost_cap: default_boost_cap(),
			snippet_max_chars: default_snippet_max_chars(),
		}
	}
}

impl Default for Tagger {
	fn default() -> Self {
		Self {
			title_weight: default_title_weight(),
			summary_weight: default_summary_weight(),
			design_weight: default_design_weight(),
			confidence_threshold: default_confidence_threshold(),
			confidence_cap: default_confidence_cap(),
			min_phrase_chars: default_min_phrase_chars(),
			phrase_base: default_phrase_base(),
			phrase_step: default_phrase_step(),
			phrase_cap: default_phrase_cap(),
			synonym_base: default_synonym_base(),
			synonym_cap: default_synonym_cap(),
			partial_base: default_partial_base(),
			partial_span: default_partial_span(),
		}
	}
}

impl Default for Expansion {
	fn default() -> Self {
		Self {
			max_terms: default_max_terms(),
			max_synonyms_per_term: default_max_synonyms_per_term(),
		}
	}
}

fn default_semantic_top_k() -> usize {
	100
}
fn default_lexical_top_k() -> usize {
	100
}
fn default_final_top_k() -> usize {
	50
}
fn default_rrf_k() -> u32 {
	60
}
fn default_backend_timeout_ms() -> u64 {
	10_000
}
fn default_boost_per_term() -> f32 {
	0.1
}
fn default_boost_cap() -> f32 {
	0.5
}
fn default_snippet_max_chars() -> usize {
	200
}
fn default_title_weight() -> f32 {
	2.0
}
fn default_summary_weight() -> f32 {
	1.5
}
fn default_design_weight() -> f32 {
	1.0
}
fn default_confidence_threshold() -> f32 {
	0.3
}
fn default_confidence_cap() -> f32 {
	2.0
}
fn default_min_phrase_chars() -> usize {
	4
}
fn default_phrase_base() -> f32 {
	1.0
}
fn default_phrase_step() -> f32 {
	0.1
}
fn default_phrase_cap() -> f32 {
	1.5
}
fn default_synonym_base() -> f32 {
	0.5
}
fn default_synonym_cap() -> f32 {
	1.0
}
fn default_partial_base() -> f32 {
	0.3
}
fn default_partial_span() -> f32 {
	0.4
}
fn default_max_terms() -> usize {
	5
}
fn default_max_synonyms_per_term() -> usize {
	2
}
