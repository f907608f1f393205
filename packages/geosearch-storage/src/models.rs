use time::Date;

use geosearch_domain::filter::RecordFacets;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GseRecord {
	pub accession: String,
	pub title: String,
	pub summary: String,
	pub overall_design: String,
	pub organisms: Vec<String>,
	pub tech_type: Option<String>,
	pub submission_date: Option<Date>,
	pub n_samples: Option<i32>,
	pub pubmed_ids: Vec<String>,
}

impl GseRecord {
	pub fn facets(&self) -> RecordFacets {
		RecordFacets {
			organisms: self.organisms.clone(),
			tech_type: self.tech_type.clone(),
			submission_date: self.submission_date,
			n_samples: self.n_samples,
		}
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MeshTermRow {
	pub mesh_id: String,
	pub preferred_name: String,
	pub entry_terms: Vec<String>,
	pub tree_numbers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MeshAssociation {
	pub accession: String,
	pub mesh_id: String,
	pub confidence: f32,
	pub source: String,
}
