use serde::Serialize;
use tracing::{info, warn};

use geosearch_domain::tagger::{self, FieldText};
use geosearch_storage::models::{GseRecord, MeshAssociation};

use crate::{SearchService, ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TagReport {
	pub records_tagged: usize,
	pub associations_written: u64,
	pub records_skipped: usize,
}

impl SearchService {
	/// Tags one record against the current dictionary snapshot, replacing
	/// its automatic associations. Returns the number written.
	pub async fn tag_record(&self, accession: &str) -> ServiceResult<usize> {
		let dictionary = self.dictionary_snapshot();

		if dictionary.is_empty() {
			return Err(ServiceError::DictionaryLoad {
				message: "Dictionary is empty; load terminology first.".to_string(),
			});
		}

		let records =
			self.backends.store.fetch_records(&[accession.to_string()]).await?;
		let Some(record) = records.into_iter().next() else {
			return Err(ServiceError::InvalidRequest {
				message: format!("Unknown accession {accession}."),
			});
		};

		let associations = self.score_record(&record, &dictionary);

		self.backends.store.replace_associations(accession, &associations).await?;

		Ok(associations.len())
	}

	/// Tags the whole catalog, or only untagged records unless `force` is
	/// set. A record that fails to tag is skipped, not fatal.
	pub async fn tag_all_records(
		&self,
		force: bool,
		threshold_override: Option<f32>,
	) -> ServiceResult<TagReport> {
		let dictionary = self.dictionary_snapshot();

		if dictionary.is_empty() {
			return Err(ServiceError::DictionaryLoad {
				message: "Dictionary is empty; load terminology first.".to_string(),
			});
		}

		let mut tagger_cfg = self.cfg.tagger.clone();

		if let Some(threshold) = threshold_override {
			if !threshold.is_finite() || threshold < 0. {
				return Err(ServiceError::InvalidRequest {
					message: "Threshold override must be a non-negative number.".to_string(),
				});
			}

			tagger_cfg.confidence_threshold = threshold;
		}

		let accessions = if force {
			self.backends.store.all_accessions().await?
		} else {
			self.backends.store.untagged_accessions().await?
		};
		let mut report = TagReport::default();

		for accession in &accessions {
			let records =
				match self.backends.store.fetch_records(std::slice::from_ref(accession)).await {
					Ok(records) => records,
					Err(err) => {
						warn!(accession = accession.as_str(), error = %err, "Record fetch failed; skipping.");
						report.records_skipped += 1;

						continue;
					},
				};
			let Some(record) = records.into_iter().next() else {
				report.records_skipped += 1;

				continue;
			};
			let associations = score_record_with(&record, &dictionary, &tagger_cfg);

			match self.backends.store.replace_associations(accession, &associations).await {
				Ok(written) => {
					report.records_tagged += 1;
					report.associations_written += written;
				},
				Err(err) => {
					warn!(accession = accession.as_str(), error = %err, "Association write failed; skipping.");
					report.records_skipped += 1;
				},
			}
		}

		info!(
			records_tagged = report.records_tagged,
			associations_written = report.associations_written,
			records_skipped = report.records_skipped,
			"Tagging pass finished."
		);

		Ok(report)
	}

	fn score_record(
		&self,
		record: &GseRecord,
		dictionary: &geosearch_domain::dictionary::Dictionary,
	) -> Vec<MeshAssociation> {
		score_record_with(record, dictionary, &self.cfg.tagger)
	}
}

fn score_record_with(
	record: &GseRecord,
	dictionary: &geosearch_domain::dictionary::Dictionary,
	cfg: &geosearch_config::Tagger,
) -> Vec<MeshAssociation> {
	let fields = [
		FieldText { name: "title", text: &record.title, weight: cfg.title_weight },
		FieldText { name: "summary", text: &record.summary, weight: cfg.summary_weight },
		FieldText { name: "design", text: &record.overall_design, weight: cfg.design_weight },
	];

	tagger::tag_fields(&fields, dictionary, cfg)
		.into_iter()
		.map(|score| MeshAssociation {
			accession: record.accession.clone(),
			mesh_id: score.mesh_id,
			confidence: score.confidence,
			source: "auto".to_string(),
		})
		.collect()
}
