pub mod expand;
pub mod search;
pub mod tagger;

use std::{
	collections::HashMap,
	future::Future,
	pin::Pin,
	sync::{Arc, RwLock},
};

pub use expand::{ExpandRequest, ExpandResponse};
use geosearch_config::{Config, SemanticBackendConfig};
use geosearch_domain::{
	dictionary::{Dictionary, Term},
	fusion::RankedHit,
};
use geosearch_providers::semantic;
use geosearch_storage::{
	db::Db,
	models::{GseRecord, MeshAssociation, MeshTermRow},
	queries,
};
pub use search::{SearchItem, SearchMetadata, SearchRequest, SearchResponse};
pub use tagger::TagReport;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The external embedding-search side of hybrid retrieval.
pub trait SemanticBackend
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a SemanticBackendConfig,
		query: &'a str,
		top_k: usize,
	) -> BoxFuture<'a, color_eyre::Result<Vec<RankedHit>>>;
}

/// Catalog persistence: records, terminology rows and associations.
pub trait CatalogStore
where
	Self: Send + Sync,
{
	fn full_text_search<'a>(
		&'a self,
		query: &'a str,
		limit: usize,
	) -> BoxFuture<'a, geosearch_storage::Result<Vec<RankedHit>>>;

	fn fetch_records<'a>(
		&'a self,
		accessions: &'a [String],
	) -> BoxFuture<'a, geosearch_storage::Result<Vec<GseRecord>>>;

	fn tagged_term_counts<'a>(
		&'a self,
		accessions: &'a [String],
		mesh_ids: &'a [String],
	) -> BoxFuture<'a, geosearch_storage::Result<HashMap<String, u32>>>;

	fn record_mesh_terms<'a>(
		&'a self,
		accessions: &'a [String],
		mesh_ids: &'a [String],
	) -> BoxFuture<'a, geosearch_storage::Result<HashMap<String, Vec<String>>>>;

	fn all_accessions<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<String>>>;

	fn untagged_accessions<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<String>>>;

	fn replace_associations<'a>(
		&'a self,
		accession: &'a str,
		associations: &'a [MeshAssociation],
	) -> BoxFuture<'a, geosearch_storage::Result<u64>>;

	fn load_mesh_terms<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<MeshTermRow>>>;

	fn upsert_mesh_terms<'a>(
		&'a self,
		terms: &'a [MeshTermRow],
	) -> BoxFuture<'a, geosearch_storage::Result<u64>>;

	fn upsert_records<'a>(
		&'a self,
		records: &'a [GseRecord],
	) -> BoxFuture<'a, geosearch_storage::Result<u64>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	InvalidFilter { message: String },
	DictionaryLoad { message: String },
	Storage { message: String },
	Backend { message: String },
}

#[derive(Clone)]
pub struct Backends {
	pub semantic: Arc<dyn SemanticBackend>,
	pub store: Arc<dyn CatalogStore>,
}

pub struct SearchService {
	pub cfg: Config,
	pub backends: Backends,
	dictionary: RwLock<Arc<Dictionary>>,
}

struct DefaultSemanticBackend;

struct DbCatalogStore {
	db: Db,
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::InvalidFilter { message } => write!(f, "Invalid filter: {message}"),
			Self::DictionaryLoad { message } => write!(f, "Dictionary load failed: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
			Self::Backend { message } => write!(f, "Backend error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<geosearch_storage::Error> for ServiceError {
	fn from(err: geosearch_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Backend { message: err.to_string() }
	}
}

impl From<geosearch_domain::filter::FilterError> for ServiceError {
	fn from(err: geosearch_domain::filter::FilterError) -> Self {
		Self::InvalidFilter { message: err.to_string() }
	}
}

impl From<geosearch_domain::dictionary::DictionaryError> for ServiceError {
	fn from(err: geosearch_domain::dictionary::DictionaryError) -> Self {
		Self::DictionaryLoad { message: err.to_string() }
	}
}

impl SemanticBackend for DefaultSemanticBackend {
	fn search<'a>(
		&'a self,
		cfg: &'a SemanticBackendConfig,
		query: &'a str,
		top_k: usize,
	) -> BoxFuture<'a, color_eyre::Result<Vec<RankedHit>>> {
		Box::pin(semantic::search(cfg, query, top_k))
	}
}

impl CatalogStore for DbCatalogStore {
	fn full_text_search<'a>(
		&'a self,
		query: &'a str,
		limit: usize,
	) -> BoxFuture<'a, geosearch_storage::Result<Vec<RankedHit>>> {
		Box::pin(queries::full_text_search(&self.db, query, limit))
	}

	fn fetch_records<'a>(
		&'a self,
		accessions: &'a [String],
	) -> BoxFuture<'a, geosearch_storage::Result<Vec<GseRecord>>> {
		Box::pin(queries::fetch_records(&self.db, accessions))
	}

	fn tagged_term_counts<'a>(
		&'a self,
		accessions: &'a [String],
		mesh_ids: &'a [String],
	) -> BoxFuture<'a, geosearch_storage::Result<HashMap<String, u32>>> {
		Box::pin(queries::tagged_term_counts(&self.db, accessions, mesh_ids))
	}

	fn record_mesh_terms<'a>(
		&'a self,
		accessions: &'a [String],
		mesh_ids: &'a [String],
	) -> BoxFuture<'a, geosearch_storage::Result<HashMap<String, Vec<String>>>> {
		Box::pin(queries::record_mesh_terms(&self.db, accessions, mesh_ids))
	}

	fn all_accessions<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<String>>> {
		Box::pin(queries::all_accessions(&self.db))
	}

	fn untagged_accessions<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<String>>> {
		Box::pin(queries::untagged_accessions(&self.db))
	}

	fn replace_associations<'a>(
		&'a self,
		accession: &'a str,
		associations: &'a [MeshAssociation],
	) -> BoxFuture<'a, geosearch_storage::Result<u64>> {
		Box::pin(queries::replace_associations(&self.db, accession, associations))
	}

	fn load_mesh_terms<'a>(&'a self) -> BoxFuture<'a, geosearch_storage::Result<Vec<MeshTermRow>>> {
		Box::pin(queries::load_mesh_terms(&self.db))
	}

	fn upsert_mesh_terms<'a>(
		&'a self,
		terms: &'a [MeshTermRow],
	) -> BoxFuture<'a, geosearch_storage::Result<u64>> {
		Box::pin(queries::upsert_mesh_terms(&self.db, terms))
	}

	fn upsert_records<'a>(
		&'a self,
		records: &'a [GseRecord],
	) -> BoxFuture<'a, geosearch_storage::Result<u64>> {
		Box::pin(queries::upsert_records(&self.db, records))
	}
}

impl Backends {
	pub fn new(semantic: Arc<dyn SemanticBackend>, store: Arc<dyn CatalogStore>) -> Self {
		Self { semantic, store }
	}
}

impl SearchService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let backends =
			Backends { semantic: Arc::new(DefaultSemanticBackend), store: Arc::new(DbCatalogStore { db }) };

		Self::with_backends(cfg, backends)
	}

	pub fn with_backends(cfg: Config, backends: Backends) -> Self {
		Self { cfg, backends, dictionary: RwLock::new(Arc::new(Dictionary::empty())) }
	}

	/// Rebuilds the in-memory dictionary snapshot from storage. Readers keep
	/// the old snapshot until the new one swaps in whole.
	pub async fn refresh_dictionary(&self) -> ServiceResult<usize> {
		let rows = self.backends.store.load_mesh_terms().await?;
		let terms = rows
			.into_iter()
			.map(|row| Term {
				mesh_id: row.mesh_id,
				preferred_name: row.preferred_name,
				entry_terms: row.entry_terms,
				tree_numbers: row.tree_numbers,
			})
			.collect();
		let dictionary = Dictionary::from_terms(terms)?;
		let len = dictionary.len();

		*self.dictionary.write().unwrap_or_else(|err| err.into_inner()) = Arc::new(dictionary);

		Ok(len)
	}

	pub fn dictionary_len(&self) -> usize {
		self.dictionary_snapshot().len()
	}

	pub(crate) fn dictionary_snapshot(&self) -> Arc<Dictionary> {
		self.dictionary.read().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
