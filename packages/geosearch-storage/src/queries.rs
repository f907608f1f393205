use std::collections::HashMap;

use geosearch_domain::fusion::RankedHit;

use crate::{
	Error, Result,
	db::Db,
	models::{GseRecord, MeshAssociation, MeshTermRow},
};

const RECORD_COLUMNS: &str = "\
accession,
title,
summary,
overall_design,
organisms,
tech_type,
submission_date,
n_samples,
pubmed_ids";

/// Postgres full-text search over title, summary and design, ranked by
/// `ts_rank` over the weighted document vector.
pub async fn full_text_search(db: &Db, query: &str, limit: usize) -> Result<Vec<RankedHit>> {
	if query.trim().is_empty() {
		return Ok(Vec::new());
	}

	let rows: Vec<(String, f32)> = sqlx::query_as(
		"\
SELECT
	accession,
	ts_rank(search_document, plainto_tsquery('english', $1)) AS score
FROM gse_series
WHERE search_document @@ plainto_tsquery('english', $1)
ORDER BY score DESC, accession
LIMIT $2",
	)
	.bind(query)
	.bind(limit as i64)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows.into_iter().map(|(accession, score)| RankedHit { accession, score }).collect())
}

pub async fn load_mesh_terms(db: &Db) -> Result<Vec<MeshTermRow>> {
	let rows: Vec<MeshTermRow> = sqlx::query_as(
		"\
SELECT mesh_id, preferred_name, entry_terms, tree_numbers
FROM mesh_term
ORDER BY mesh_id",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn upsert_mesh_terms(db: &Db, terms: &[MeshTermRow]) -> Result<u64> {
	let mut tx = db.pool.begin().await?;
	let mut written = 0;

	for term in terms {
		let result = sqlx::query(
			"\
INSERT INTO mesh_term (mesh_id, preferred_name, entry_terms, tree_numbers, updated_at)
VALUES ($1, $2, $3, $4, now())
ON CONFLICT (mesh_id) DO UPDATE
SET
	preferred_name = EXCLUDED.preferred_name,
	entry_terms = EXCLUDED.entry_terms,
	tree_numbers = EXCLUDED.tree_numbers,
	updated_at = now()",
		)
		.bind(term.mesh_id.as_str())
		.bind(term.preferred_name.as_str())
		.bind(&term.entry_terms)
		.bind(&term.tree_numbers)
		.execute(&mut *tx)
		.await?;

		written += result.rows_affected();
	}

	tx.commit().await?;

	Ok(written)
}

pub async fn upsert_records(db: &Db, records: &[GseRecord]) -> Result<u64> {
	let mut tx = db.pool.begin().await?;
	let mut written = 0;

	for record in records {
		let result = sqlx::query(
			"\
INSERT INTO gse_series (
	accession,
	title,
	summary,
	overall_design,
	organisms,
	tech_type,
	submission_date,
	n_samples,
	pubmed_ids
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
ON CONFLICT (accession) DO UPDATE
SET
	title = EXCLUDED.title,
	summary = EXCLUDED.summary,
	overall_design = EXCLUDED.overall_design,
	organisms = EXCLUDED.organisms,
	tech_type = EXCLUDED.tech_type,
	submission_date = EXCLUDED.submission_date,
	n_samples = EXCLUDED.n_samples,
	pubmed_ids = EXCLUDED.pubmed_ids",
		)
		.bind(record.accession.as_str())
		.bind(record.title.as_str())
		.bind(record.summary.as_str())
		.bind(record.overall_design.as_str())
		.bind(&record.organisms)
		.bind(record.tech_type.as_deref())
		.bind(record.submission_date)
		.bind(record.n_samples)
		.bind(&record.pubmed_ids)
		.execute(&mut *tx)
		.await?;

		written += result.rows_affected();
	}

	tx.commit().await?;

	Ok(written)
}

/// Per-accession count of stored associations overlapping the given terms.
pub async fn tagged_term_counts(
	db: &Db,
	accessions: &[String],
	mesh_ids: &[String],
) -> Result<HashMap<String, u32>> {
	if accessions.is_empty() || mesh_ids.is_empty() {
		return Ok(HashMap::new());
	}

	let rows: Vec<(String, i64)> = sqlx::query_as(
		"\
SELECT accession, COUNT(DISTINCT mesh_id)
FROM gse_mesh
WHERE accession = ANY($1)
	AND mesh_id = ANY($2)
GROUP BY accession",
	)
	.bind(accessions)
	.bind(mesh_ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows.into_iter().map(|(accession, count)| (accession, count as u32)).collect())
}

/// Preferred names of each record's associations, restricted to the given
/// term ids. The caller passes the query-matched ids, so only the overlap
/// is surfaced.
pub async fn record_mesh_terms(
	db: &Db,
	accessions: &[String],
	mesh_ids: &[String],
) -> Result<HashMap<String, Vec<String>>> {
	if accessions.is_empty() || mesh_ids.is_empty() {
		return Ok(HashMap::new());
	}

	let rows: Vec<(String, String)> = sqlx::query_as(
		"\
SELECT gm.accession, mt.preferred_name
FROM gse_mesh gm
JOIN mesh_term mt ON mt.mesh_id = gm.mesh_id
WHERE gm.accession = ANY($1)
	AND gm.mesh_id = ANY($2)
ORDER BY gm.accession, gm.confidence DESC, mt.preferred_name",
	)
	.bind(accessions)
	.bind(mesh_ids)
	.fetch_all(&db.pool)
	.await?;

	let mut by_accession: HashMap<String, Vec<String>> = HashMap::new();
	for (accession, preferred_name) in rows {
		by_accession.entry(accession).or_default().push(preferred_name);
	}

	Ok(by_accession)
}

pub async fn fetch_records(db: &Db, accessions: &[String]) -> Result<Vec<GseRecord>> {
	if accessions.is_empty() {
		return Ok(Vec::new());
	}

	let rows: Vec<GseRecord> = sqlx::query_as(&format!(
		"\
SELECT {RECORD_COLUMNS}
FROM gse_series
WHERE accession = ANY($1)"
	))
	.bind(accessions)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn fetch_record(db: &Db, accession: &str) -> Result<GseRecord> {
	let record: Option<GseRecord> = sqlx::query_as(&format!(
		"\
SELECT {RECORD_COLUMNS}
FROM gse_series
WHERE accession = $1"
	))
	.bind(accession)
	.fetch_optional(&db.pool)
	.await?;

	record.ok_or_else(|| Error::NotFound(format!("series {accession}")))
}

pub async fn all_accessions(db: &Db) -> Result<Vec<String>> {
	let rows: Vec<(String,)> =
		sqlx::query_as("SELECT accession FROM gse_series ORDER BY accession")
			.fetch_all(&db.pool)
			.await?;

	Ok(rows.into_iter().map(|(accession,)| accession).collect())
}

/// Records that have no automatic associations yet.
pub async fn untagged_accessions(db: &Db) -> Result<Vec<String>> {
	let rows: Vec<(String,)> = sqlx::query_as(
		"\
SELECT accession
FROM gse_series s
WHERE NOT EXISTS (
	SELECT 1
	FROM gse_mesh gm
	WHERE gm.accession = s.accession
		AND gm.source = 'auto'
)
ORDER BY accession",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows.into_iter().map(|(accession,)| accession).collect())
}

/// Replaces a record's automatic associations in one transaction. Manual
/// associations (any other source) are left alone.
pub async fn replace_associations(
	db: &Db,
	accession: &str,
	associations: &[MeshAssociation],
) -> Result<u64> {
	for association in associations {
		if association.accession != accession {
			return Err(Error::InvalidArgument(format!(
				"association for {} passed to replace of {accession}",
				association.accession
			)));
		}
	}

	let mut tx = db.pool.begin().await?;

	sqlx::query("DELETE FROM gse_mesh WHERE accession = $1 AND source = 'auto'")
		.bind(accession)
		.execute(&mut *tx)
		.await?;

	let mut written = 0;
	for association in associations {
		let result = sqlx::query(
			"\
INSERT INTO gse_mesh (accession, mesh_id, confidence, source)
VALUES ($1, $2, $3, 'auto')
ON CONFLICT (accession, mesh_id, source) DO UPDATE
SET confidence = EXCLUDED.confidence",
		)
		.bind(association.accession.as_str())
		.bind(association.mesh_id.as_str())
		.bind(association.confidence)
		.execute(&mut *tx)
		.await?;

		written += result.rows_affected();
	}

	tx.commit().await?;

	Ok(written)
}
