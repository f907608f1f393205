use std::{fs, path::Path};

use color_eyre::{Result, eyre::WrapErr};
use serde::Deserialize;
use time::Date;

use geosearch_domain::date_serde;
use geosearch_storage::models::{GseRecord, MeshTermRow};

#[derive(Debug, Deserialize)]
struct MeshFeedEntry {
	mesh_id: String,
	preferred_name: String,
	#[serde(default)]
	entry_terms: Vec<String>,
	#[serde(default)]
	tree_numbers: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecordFeedEntry {
	accession: String,
	title: String,
	#[serde(default)]
	summary: String,
	#[serde(default)]
	overall_design: String,
	#[serde(default)]
	organisms: Vec<String>,
	#[serde(default)]
	tech_type: Option<String>,
	#[serde(default, with = "date_serde::option")]
	submission_date: Option<Date>,
	#[serde(default)]
	n_samples: Option<i32>,
	#[serde(default)]
	pubmed_ids: Vec<String>,
}

pub fn read_mesh_feed(path: &Path) -> Result<Vec<MeshTermRow>> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read terminology feed {}.", path.display()))?;
	let entries: Vec<MeshFeedEntry> = serde_json::from_str(&raw)
		.wrap_err_with(|| format!("Failed to parse terminology feed {}.", path.display()))?;

	Ok(entries
		.into_iter()
		.map(|entry| MeshTermRow {
			mesh_id: entry.mesh_id,
			preferred_name: entry.preferred_name,
			entry_terms: entry.entry_terms,
			tree_numbers: entry.tree_numbers,
		})
		.collect())
}

pub fn read_record_feed(path: &Path) -> Result<Vec<GseRecord>> {
	let raw = fs::read_to_string(path)
		.wrap_err_with(|| format!("Failed to read record feed {}.", path.display()))?;
	let entries: Vec<RecordFeedEntry> = serde_json::from_str(&raw)
		.wrap_err_with(|| format!("Failed to parse record feed {}.", path.display()))?;

	Ok(entries
		.into_iter()
		.map(|entry| GseRecord {
			accession: entry.accession,
			title: entry.title,
			summary: entry.summary,
			overall_design: entry.overall_design,
			organisms: entry.organisms,
			tech_type: entry.tech_type,
			submission_date: entry.submission_date,
			n_samples: entry.n_samples,
			pubmed_ids: entry.pubmed_ids,
		})
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mesh_feed_defaults_optional_arrays() {
		let dir = std::env::temp_dir().join("geosearch_feed_test");

		fs::create_dir_all(&dir).expect("mkdir failed");

		let path = dir.join("mesh.json");

		fs::write(
			&path,
			r#"[{"mesh_id": "D001943", "preferred_name": "Breast Neoplasms"}]"#,
		)
		.expect("write failed");

		let terms = read_mesh_feed(&path).expect("read failed");

		assert_eq!(terms.len(), 1);
		assert_eq!(terms[0].mesh_id, "D001943");
		assert!(terms[0].entry_terms.is_empty());
	}

	#[test]
	fn record_feed_parses_plain_dates() {
		let dir = std::env::temp_dir().join("geosearch_feed_test");

		fs::create_dir_all(&dir).expect("mkdir failed");

		let path = dir.join("records.json");

		fs::write(
			&path,
			r#"[{"accession": "GSE100", "title": "Atlas", "submission_date": "2021-06-15"}]"#,
		)
		.expect("write failed");

		let records = read_record_feed(&path).expect("read failed");

		assert_eq!(records.len(), 1);
		assert!(records[0].submission_date.is_some());
	}
}
