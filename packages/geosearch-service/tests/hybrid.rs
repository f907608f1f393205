use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
	time::Duration,
};

use color_eyre::eyre;
use time::macros::date;

use geosearch_config::{
	Config, Expansion, Postgres, Providers, Search, SemanticBackendConfig, Service, Storage, Tagger,
};
use geosearch_domain::{filter::SearchFilters, fusion::RankedHit};
use geosearch_service::{
	Backends, BoxFuture, CatalogStore, SearchRequest, SearchService, SemanticBackend, ServiceError,
};
use geosearch_storage::models::{GseRecord, MeshAssociation, MeshTermRow};

fn test_config() -> Config {
	Config {
		service: Service { log_level: "info".to_string() },
		storage: Storage {
			postgres: Postgres { dsn: "postgres://unused".to_string(), pool_max_conns: 1 },
		},
		providers: Providers {
			semantic: SemanticBackendConfig {
				api_base: "http://localhost:9".to_string(),
				api_key: None,
				path: "/search".to_string(),
				timeout_ms: 1_000,
				default_headers: serde_json::Map::new(),
			},
		},
		search: Search::default(),
		tagger: Tagger::default(),
		expansion: Expansion::default(),
	}
}

fn record(accession: &str, title: &str, summary: &str) -> GseRecord {
	GseRecord {
		accession: accession.to_string(),
		title: title.to_string(),
		summary: summary.to_string(),
		overall_design: String::new(),
		organisms: vec!["Homo sapiens".to_string()],
		tech_type: Some("Expression profiling by high throughput sequencing".to_string()),
		submission_date: Some(date!(2021 - 05 - 10)),
		n_samples: Some(12),
		pubmed_ids: Vec::new(),
	}
}

fn mesh_rows() -> Vec<MeshTermRow> {
	vec![
		MeshTermRow {
			mesh_id: "D001943".to_string(),
			preferred_name: "Breast Neoplasms".to_string(),
			entry_terms: vec!["Breast Cancer".to_string(), "Mammary Cancer".to_string()],
			tree_numbers: Vec::new(),
		},
		MeshTermRow {
			mesh_id: "D017423".to_string(),
			preferred_name: "Sequence Analysis, RNA".to_string(),
			entry_terms: vec!["RNA-Seq".to_string()],
			tree_numbers: Vec::new(),
		},
	]
}

#[derive(Clone)]
struct StubSemantic {
	hits: Vec<RankedHit>,
	fail: bool,
	delay: Option<Duration>,
}

impl StubSemantic {
	fn returning(hits: Vec<RankedHit>) -> Self {
		Self { hits, fail: false, delay: None }
	}

	fn failing() -> Self {
		Self { hits: Vec::new(), fail: true, delay: None }
	}

	fn hanging(delay: Duration) -> Self {
		Self { hits: Vec::new(), fail: false, delay: Some(delay) }
	}
}

impl SemanticBackend for StubSemantic {
	fn search<'a>(
		&'a self,
		_cfg: &'a SemanticBackendConfig,
		_query: &'a str,
		top_k: usize,
	) -> BoxFuture<'a, color_eyre::Result<Vec<RankedHit>>> {
		Box::pin(async move {
			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}
			if self.fail {
				return Err(eyre::eyre!("connection refused"));
			}

			Ok(self.hits.iter().take(top_k).cloned().collect())
		})
	}
}

struct StubStore {
	records: HashMap<String, GseRecord>,
	lexical: Vec<RankedHit>,
	terms: Mutex<Vec<MeshTermRow>>,
	associations: Mutex<HashMap<String, Vec<MeshAssociation>>>,
	lexical_queries: Mutex<Vec<String>>,
}

impl StubStore {
	fn new(records: Vec<GseRecord>, lexical: Vec<RankedHit>) -> Self {
		Self {
			records: records
				.into_iter()
				.map(|record| (record.accession.clone(), record))
				.collect(),
			lexical,
			terms: Mutex::new(mesh_rows()),
			associations: Mutex::new(HashMap::new()),
			lexical_queries: Mutex::new(Vec::new()),
		}
	}

	fn set_terms(&self, terms: Vec<MeshTermRow>) {
		*self.terms.lock().unwrap() = terms;
	}

	fn associate(self, accession: &str, mesh_id: &str) -> Self {
		self.associations.lock().unwrap().entry(accession.to_string()).or_default().push(
			MeshAssociation {
				accession: accession.to_string(),
				mesh_id: mesh_id.to_string(),
				confidence: 1.0,
				source: "auto".to_string(),
			},
		);

		self
	}

	fn preferred_name(&self, mesh_id: &str) -> Option<String> {
		self.terms
			.lock()
			.unwrap()
			.iter()
			.find(|term| term.mesh_id == mesh_id)
			.map(|term| term.preferred_name.clone())
	}
}

impl CatalogStore for StubStore {
	fn full_text_search<'a>(
		&'a self,
		query: &'a str,
		limit: usize,
	) -> BoxFuture<'a, geosearch_storage::Result<Vec<RankedHit>>> {
		Box::pin(async move {
			self.lexical_queries.lock().unwrap().push(query.to_string());

			Ok(self.lexical.iter().take(limit).cloned().collect())
		})
	}

	fn fetch_records<'a>(
		&'a self,
		accessions: &'a [String],
	) -> BoxFuture<'a, geosearch_storage::Result<Vec<GseRecord>>> {
		Box::pin(async move {
			Ok(accessions.iter().filter_map(|a| self.records.get(a).cloned()).collect())
		})
	}

	fn tagged_term_counts<'a>(
		&'a self,
		accessions: &'a [String],
		mesh_ids: &'a [String],
	) -> BoxFuture<'a, geosearch_storage::Result<HashMap<String, u32>>> {
		Box::pin(async move {
			let associations = self.associations.lock().unwrap();
			let mut counts = HashMap::new();

			for accession in accessions {
				let count = associations
					.get(accession)
					.map(|list| {
						list.iter().filter(|a| mesh_ids.contains(&a.mesh_id)).count() as u32
					})
					.unwrap_or(0);

				if count > 0 {
					counts.insert(accession.clone(), count);
				}
			}

			Ok(counts)
		})
	}

	fn record_mesh_terms<'a>(
		&'a self,
		accessions: &'a [String],
		mesh_ids: &'a [String],
	) -> BoxFuture<'a, geosearch_storage::Result<HashMap<String, Vec<String>>>> {
		Box::pin(async move {
			let associations = self.associations.lock().unwrap();
			let mut names = HashMap::new();

			for accession in accessions {
				if let Some(list) = associations.get(accession) {
					let list: Vec<String> = list
						.iter()
						.filter(|a| mesh_ids.contains(&a.mesh_id))
						.filter_map(|a| self.preferred_name(&a.mesh_id))
						.collect();

					if !list.is_empty() {
						names.insert(accession.clone(), list);
					}
				}
			}

			Ok(names)
		})
	}

	fn all_accessions<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<String>>> {
		Box::pin(async move {
			let mut accessions: Vec<String> = self.records.keys().cloned().collect();

			accessions.sort();

			Ok(accessions)
		})
	}

	fn untagged_accessions<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<String>>> {
		Box::pin(async move {
			let associations = self.associations.lock().unwrap();
			let mut accessions: Vec<String> = self
				.records
				.keys()
				.filter(|a| associations.get(*a).map(|list| list.is_empty()).unwrap_or(true))
				.cloned()
				.collect();

			accessions.sort();

			Ok(accessions)
		})
	}

	fn replace_associations<'a>(
		&'a self,
		accession: &'a str,
		associations: &'a [MeshAssociation],
	) -> BoxFuture<'a, geosearch_storage::Result<u64>> {
		Box::pin(async move {
			self.associations
				.lock()
				.unwrap()
				.insert(accession.to_string(), associations.to_vec());

			Ok(associations.len() as u64)
		})
	}

	fn load_mesh_terms<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<MeshTermRow>>> {
		Box::pin(async move { Ok(self.terms.lock().unwrap().clone()) })
	}

	fn upsert_mesh_terms<'a>(
		&'a self,
		terms: &'a [MeshTermRow],
	) -> BoxFuture<'a, geosearch_storage::Result<u64>> {
		Box::pin(async move { Ok(terms.len() as u64) })
	}

	fn upsert_records<'a>(
		&'a self,
		records: &'a [GseRecord],
	) -> BoxFuture<'a, geosearch_storage::Result<u64>> {
		Box::pin(async move { Ok(records.len() as u64) })
	}
}

fn hit(accession: &str, score: f32) -> RankedHit {
	RankedHit { accession: accession.to_string(), score }
}

async fn service_with(semantic: StubSemantic, store: StubStore) -> SearchService {
	let service = SearchService::with_backends(
		test_config(),
		Backends::new(Arc::new(semantic), Arc::new(store)),
	);

	service.refresh_dictionary().await.expect("dictionary refresh failed");

	service
}

fn request(query: &str) -> SearchRequest {
	SearchRequest {
		query: query.to_string(),
		top_k: None,
		use_semantic: true,
		use_lexical: true,
		use_mesh: true,
		filters: SearchFilters::default(),
	}
}

#[tokio::test]
async fn boost_promotes_tagged_record_on_equal_rrf_mass() {
	let records = vec![
		record("GSE100", "Breast cancer atlas", "Tumor biopsies."),
		record("GSE200", "Liver time course", "Breast cancer mentioned in passing."),
	];
	let store = StubStore::new(records, vec![hit("GSE200", 7.0), hit("GSE100", 6.0)])
		.associate("GSE100", "D001943");
	let semantic = StubSemantic::returning(vec![hit("GSE100", 0.9), hit("GSE200", 0.8)]);
	let service = service_with(semantic, store).await;

	let response = service.hybrid_search(request("breast cancer")).await.expect("search failed");

	assert_eq!(response.metadata.mode, "hybrid");
	assert!(!response.metadata.matched_terms.is_empty());
	assert_eq!(response.metadata.semantic_count, 2);
	assert_eq!(response.metadata.lexical_count, 2);
	assert_eq!(response.items[0].accession, "GSE100");
	assert!(response.items[0].mesh_boost > 0.);
	assert_eq!(response.items[0].mesh_terms, ["Breast Neoplasms"]);
	assert_eq!(response.items[1].mesh_boost, 0.);
}

#[tokio::test]
async fn repeated_searches_are_deterministic() {
	let records = vec![
		record("GSE100", "Breast cancer atlas", "Tumor biopsies."),
		record("GSE200", "Liver time course", "Controls."),
		record("GSE300", "Mammary organoids", "Breast cancer organoids."),
	];
	let lexical = vec![hit("GSE300", 8.0), hit("GSE100", 7.0), hit("GSE200", 2.0)];
	let semantic_hits = vec![hit("GSE100", 0.9), hit("GSE300", 0.85)];
	let mut orders = Vec::new();

	for _ in 0..2 {
		let store = StubStore::new(records.clone(), lexical.clone());
		let service = service_with(StubSemantic::returning(semantic_hits.clone()), store).await;
		let response =
			service.hybrid_search(request("breast cancer")).await.expect("search failed");

		orders.push(
			response.items.iter().map(|item| item.accession.clone()).collect::<Vec<_>>(),
		);
	}

	assert_eq!(orders[0], orders[1]);
}

#[tokio::test]
async fn semantic_failure_degrades_to_lexical_only() {
	let records = vec![record("GSE100", "Breast cancer atlas", "Tumor biopsies.")];
	let store = StubStore::new(records, vec![hit("GSE100", 7.0)]);
	let service = service_with(StubSemantic::failing(), store).await;

	let response = service.hybrid_search(request("breast cancer")).await.expect("search failed");

	assert_eq!(response.metadata.mode, "lexical_only");
	assert_eq!(response.metadata.degraded_backends, ["semantic"]);
	assert_eq!(response.metadata.semantic_count, 0);
	assert_eq!(response.metadata.lexical_count, 1);
	assert_eq!(response.items.len(), 1);
	assert_eq!(response.items[0].semantic_rank, None);
	assert_eq!(response.items[0].lexical_rank, Some(1));
}

#[tokio::test]
async fn slow_backend_times_out_and_degrades() {
	let records = vec![record("GSE100", "Breast cancer atlas", "Tumor biopsies.")];
	let store = StubStore::new(records, vec![hit("GSE100", 7.0)]);
	let mut cfg = test_config();

	cfg.search.backend_timeout_ms = 20;

	let service = SearchService::with_backends(
		cfg,
		Backends::new(
			Arc::new(StubSemantic::hanging(Duration::from_millis(500))),
			Arc::new(store),
		),
	);

	service.refresh_dictionary().await.expect("dictionary refresh failed");

	let response = service.hybrid_search(request("breast cancer")).await.expect("search failed");

	assert_eq!(response.metadata.degraded_backends, ["semantic"]);
	assert_eq!(response.items.len(), 1);
}

#[tokio::test]
async fn both_backends_down_yields_empty_response_not_error() {
	let store = StubStore::new(Vec::new(), Vec::new());
	let mut cfg = test_config();

	cfg.search.backend_timeout_ms = 20;

	struct FailingStore(StubStore);

	// Reuse the stub for everything except full-text search.
	impl CatalogStore for FailingStore {
		fn full_text_search<'a>(
			&'a self,
			_query: &'a str,
			_limit: usize,
		) -> BoxFuture<'a, geosearch_storage::Result<Vec<RankedHit>>> {
			Box::pin(async move {
				Err(geosearch_storage::Error::InvalidArgument("offline".to_string()))
			})
		}

		fn fetch_records<'a>(
			&'a self,
			accessions: &'a [String],
		) -> BoxFuture<'a, geosearch_storage::Result<Vec<GseRecord>>> {
			self.0.fetch_records(accessions)
		}

		fn tagged_term_counts<'a>(
			&'a self,
			accessions: &'a [String],
			mesh_ids: &'a [String],
		) -> BoxFuture<'a, geosearch_storage::Result<HashMap<String, u32>>> {
			self.0.tagged_term_counts(accessions, mesh_ids)
		}

		fn record_mesh_terms<'a>(
			&'a self,
			accessions: &'a [String],
			mesh_ids: &'a [String],
		) -> BoxFuture<'a, geosearch_storage::Result<HashMap<String, Vec<String>>>> {
			self.0.record_mesh_terms(accessions, mesh_ids)
		}

		fn all_accessions<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<String>>> {
			self.0.all_accessions()
		}

		fn untagged_accessions<'a>(
			&'a self,
		) -> BoxFuture<'a, geosearch_storage::Result<Vec<String>>> {
			self.0.untagged_accessions()
		}

		fn replace_associations<'a>(
			&'a self,
			accession: &'a str,
			associations: &'a [MeshAssociation],
		) -> BoxFuture<'a, geosearch_storage::Result<u64>> {
			self.0.replace_associations(accession, associations)
		}

		fn load_mesh_terms<'a>(
			&'a self,
		) -> BoxFuture<'a, geosearch_storage::Result<Vec<MeshTermRow>>> {
			self.0.load_mesh_terms()
		}

		fn upsert_mesh_terms<'a>(
			&'a self,
			terms: &'a [MeshTermRow],
		) -> BoxFuture<'a, geosearch_storage::Result<u64>> {
			self.0.upsert_mesh_terms(terms)
		}

		fn upsert_records<'a>(
			&'a self,
			records: &'a [GseRecord],
		) -> BoxFuture<'a, geosearch_storage::Result<u64>> {
			self.0.upsert_records(records)
		}
	}

	let service = SearchService::with_backends(
		cfg,
		Backends::new(Arc::new(StubSemantic::failing()), Arc::new(FailingStore(store))),
	);

	service.refresh_dictionary().await.expect("dictionary refresh failed");

	let response = service.hybrid_search(request("breast cancer")).await.expect("search failed");

	assert_eq!(response.metadata.mode, "none");
	assert_eq!(response.metadata.degraded_backends, ["semantic", "lexical"]);
	assert!(response.items.is_empty());
}

#[tokio::test]
async fn disabling_both_backends_reports_no_search_mode() {
	let records = vec![record("GSE100", "Breast cancer atlas", "Tumor biopsies.")];
	let store = StubStore::new(records, vec![hit("GSE100", 7.0)]);
	let service = service_with(StubSemantic::returning(vec![hit("GSE100", 0.9)]), store).await;
	let mut req = request("breast cancer");

	req.use_semantic = false;
	req.use_lexical = false;

	let response = service.hybrid_search(req).await.expect("search failed");

	// Disabled is not degraded: empty result, explicit indicator, no error.
	assert!(response.items.is_empty());
	assert!(response.metadata.no_search_mode);
	assert_eq!(response.metadata.mode, "none");
	assert!(response.metadata.degraded_backends.is_empty());
	assert_eq!(response.metadata.semantic_count, 0);
	assert_eq!(response.metadata.lexical_count, 0);
}

#[tokio::test]
async fn disabled_semantic_backend_is_never_called() {
	let records = vec![record("GSE100", "Breast cancer atlas", "Tumor biopsies.")];
	let store = StubStore::new(records, vec![hit("GSE100", 7.0)]);
	// A failing stub would mark the backend degraded if it were reached.
	let service = service_with(StubSemantic::failing(), store).await;
	let mut req = request("breast cancer");

	req.use_semantic = false;

	let response = service.hybrid_search(req).await.expect("search failed");

	assert_eq!(response.metadata.mode, "lexical_only");
	assert!(!response.metadata.no_search_mode);
	assert!(response.metadata.degraded_backends.is_empty());
	assert_eq!(response.items.len(), 1);
}

#[tokio::test]
async fn lexical_backend_receives_the_verbatim_query() {
	let records = vec![record("GSE100", "Breast cancer atlas", "Tumor biopsies.")];
	let store = Arc::new(StubStore::new(records, vec![hit("GSE100", 7.0)]));
	let service = SearchService::with_backends(
		test_config(),
		Backends::new(Arc::new(StubSemantic::returning(Vec::new())), store.clone()),
	);

	service.refresh_dictionary().await.expect("dictionary refresh failed");

	let response = service.hybrid_search(request("breast cancer")).await.expect("search failed");

	// Expansion feeds the semantic side only; exact-term matching must see
	// the query as typed.
	assert!(response.metadata.expanded_query.len() > "breast cancer".len());
	assert_eq!(*store.lexical_queries.lock().unwrap(), ["breast cancer"]);
}

#[tokio::test]
async fn attached_terms_exclude_unmatched_associations() {
	let records = vec![record("GSE100", "Breast cancer atlas", "Tumor biopsies.")];
	let store = StubStore::new(records, vec![hit("GSE100", 7.0)])
		.associate("GSE100", "D001943")
		.associate("GSE100", "D017423");
	let service = service_with(StubSemantic::returning(Vec::new()), store).await;

	// The query matches D001943 only; the record's RNA-seq association is
	// real but irrelevant to this search.
	let response = service.hybrid_search(request("breast cancer")).await.expect("search failed");

	assert_eq!(response.items[0].mesh_terms, ["Breast Neoplasms"]);
}

#[tokio::test]
async fn snippet_anchors_on_a_matched_synonym_past_the_lead() {
	let filler = "Background material on cohort assembly and quality control procedures \
	              occupies the opening of this abstract, well before any disease wording \
	              appears, so an unanchored window could never reach the relevant part. "
		.repeat(2);
	let summary = format!("{filler}We derived mammary cancer organoids from twelve donors.");
	let records = vec![record("GSE100", "Organoid profiling resource", &summary)];
	let store = StubStore::new(records, vec![hit("GSE100", 7.0)]);
	let service = service_with(StubSemantic::returning(Vec::new()), store).await;

	// "mammary" never occurs in the query; it reaches the needle list as an
	// entry term of the matched descriptor.
	let response = service.hybrid_search(request("breast cancer")).await.expect("search failed");

	assert!(response.items[0].snippet.contains("mammary cancer"));
	assert!(response.items[0].snippet.starts_with("..."));
}

#[tokio::test]
async fn top_k_truncates_in_fused_order() {
	let records: Vec<GseRecord> = (1..=20)
		.map(|i| record(&format!("GSE{i:02}"), &format!("Series {i}"), "Summary."))
		.collect();
	let lexical: Vec<RankedHit> =
		(1..=20).map(|i| hit(&format!("GSE{i:02}"), 21.0 - i as f32)).collect();
	let store = StubStore::new(records, lexical);
	let service = service_with(StubSemantic::returning(Vec::new()), store).await;
	let mut req = request("series profiling");

	req.top_k = Some(5);

	let response = service.hybrid_search(req).await.expect("search failed");
	let accessions: Vec<&str> =
		response.items.iter().map(|item| item.accession.as_str()).collect();

	assert_eq!(accessions, ["GSE01", "GSE02", "GSE03", "GSE04", "GSE05"]);
	assert_eq!(response.metadata.total_fused, 20);
}

#[tokio::test]
async fn filters_drop_records_before_truncation() {
	let mut mouse = record("GSE200", "Mouse mammary study", "Mouse tissue.");

	mouse.organisms = vec!["Mus musculus".to_string()];

	let records = vec![record("GSE100", "Breast cancer atlas", "Tumor biopsies."), mouse];
	let store = StubStore::new(records, vec![hit("GSE200", 8.0), hit("GSE100", 7.0)]);
	let service = service_with(StubSemantic::returning(Vec::new()), store).await;
	let mut req = request("mammary tissue");

	req.filters.organisms = vec!["Homo sapiens".to_string()];

	let response = service.hybrid_search(req).await.expect("search failed");

	assert_eq!(response.items.len(), 1);
	assert_eq!(response.items[0].accession, "GSE100");
}

#[tokio::test]
async fn use_mesh_false_skips_expansion() {
	let records = vec![record("GSE100", "Breast cancer atlas", "Tumor biopsies.")];
	let store = StubStore::new(records, vec![hit("GSE100", 7.0)]);
	let service = service_with(StubSemantic::returning(Vec::new()), store).await;
	let mut req = request("breast cancer");

	req.use_mesh = false;

	let response = service.hybrid_search(req).await.expect("search failed");

	assert!(response.metadata.matched_terms.is_empty());
	assert_eq!(response.metadata.expanded_query, "breast cancer");
}

#[tokio::test]
async fn empty_query_is_rejected() {
	let store = StubStore::new(Vec::new(), Vec::new());
	let service = service_with(StubSemantic::returning(Vec::new()), store).await;

	let result = service.hybrid_search(request("   ")).await;

	assert!(matches!(result, Err(ServiceError::InvalidRequest { .. })));
}

#[tokio::test]
async fn inverted_date_filter_is_rejected() {
	let store = StubStore::new(Vec::new(), Vec::new());
	let service = service_with(StubSemantic::returning(Vec::new()), store).await;
	let mut req = request("breast cancer");

	req.filters.date_start = Some(date!(2022 - 01 - 01));
	req.filters.date_end = Some(date!(2021 - 01 - 01));

	let result = service.hybrid_search(req).await;

	assert!(matches!(result, Err(ServiceError::InvalidFilter { .. })));
}

#[tokio::test]
async fn tagging_pass_is_idempotent() {
	let records = vec![
		record("GSE100", "Breast cancer atlas", "Tumor biopsies."),
		record("GSE200", "Liver RNA-seq time course", "Bulk sequencing of liver."),
	];
	let store = StubStore::new(records, Vec::new());
	let service = service_with(StubSemantic::returning(Vec::new()), store).await;

	let first = service.tag_all_records(true, None).await.expect("tagging failed");
	let second = service.tag_all_records(true, None).await.expect("tagging failed");

	assert_eq!(first.records_tagged, 2);
	assert_eq!(first.associations_written, second.associations_written);

	// Without force, everything is already tagged.
	let third = service.tag_all_records(false, None).await.expect("tagging failed");

	assert_eq!(third.records_tagged, 0);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_dictionary_snapshot() {
	let store = Arc::new(StubStore::new(Vec::new(), Vec::new()));
	let service = SearchService::with_backends(
		test_config(),
		Backends::new(Arc::new(StubSemantic::returning(Vec::new())), store.clone()),
	);

	service.refresh_dictionary().await.expect("dictionary refresh failed");
	assert_eq!(service.dictionary_len(), 2);

	let mut duplicated = mesh_rows();

	duplicated.push(duplicated[0].clone());
	store.set_terms(duplicated);

	let result = service.refresh_dictionary().await;

	assert!(matches!(result, Err(ServiceError::DictionaryLoad { .. })));
	assert_eq!(service.dictionary_len(), 2);
}

#[tokio::test]
async fn tagging_without_dictionary_is_an_error() {
	let records = vec![record("GSE100", "Breast cancer atlas", "Tumor biopsies.")];
	let store = StubStore::new(records, Vec::new());
	let service = SearchService::with_backends(
		test_config(),
		Backends::new(Arc::new(StubSemantic::returning(Vec::new())), Arc::new(store)),
	);

	let result = service.tag_all_records(false, None).await;

	assert!(matches!(result, Err(ServiceError::DictionaryLoad { .. })));
}
