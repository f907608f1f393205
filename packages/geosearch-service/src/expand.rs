use serde::{Deserialize, Serialize};

use geosearch_domain::expand::{self, Expansion};

use crate::{SearchService, ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct ExpandRequest {
	pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpandResponse {
	pub expansion: Expansion,
	pub dictionary_terms: usize,
}

impl SearchService {
	/// Standalone expansion, for previewing what hybrid search would send to
	/// the backends.
	pub fn expand_query(&self, request: ExpandRequest) -> ServiceResult<ExpandResponse> {
		let query = request.query.trim();

		if query.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "Query must not be empty.".to_string(),
			});
		}

		let dictionary = self.dictionary_snapshot();
		let expansion = expand::expand(query, &dictionary, &self.cfg.expansion);

		Ok(ExpandResponse { expansion, dictionary_terms: dictionary.len() })
	}
}
