use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde_json::Value;

use geosearch_domain::fusion::RankedHit;

/// Queries the external embedding-search backend. The backend owns the
/// vector index; this side only sends text and reads back ranked accessions.
pub async fn search(
	cfg: &geosearch_config::SemanticBackendConfig,
	query: &str,
	top_k: usize,
) -> Result<Vec<RankedHit>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"query": query,
		"top_k": top_k,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(cfg.api_key.as_deref(), &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_search_response(json)
}

fn parse_search_response(json: Value) -> Result<Vec<RankedHit>> {
	let data = json
		.get("data")
		.and_then(|v| v.as_array())
		.ok_or_else(|| eyre::eyre!("Semantic response is missing data array."))?;

	let mut hits = Vec::with_capacity(data.len());
	for item in data {
		let accession = item
			.get("accession")
			.and_then(|v| v.as_str())
			.ok_or_else(|| eyre::eyre!("Semantic hit missing accession."))?;
		let score = item
			.get("score")
			.and_then(|v| v.as_f64())
			.ok_or_else(|| eyre::eyre!("Semantic hit score must be numeric."))?;

		hits.push(RankedHit { accession: accession.to_string(), score: score as f32 });
	}

	Ok(hits)
}
