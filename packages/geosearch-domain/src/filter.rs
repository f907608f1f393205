use serde::{Deserialize, Serialize};
use time::Date;

use crate::date_serde;

/// Structured filters applied after fusion, before assembly. All populated
/// clauses must hold for a record to survive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
	#[serde(default)]
	pub organisms: Vec<String>,
	#[serde(default)]
	pub tech_type: Option<String>,
	#[serde(default, with = "date_serde::option")]
	pub date_start: Option<Date>,
	#[serde(default, with = "date_serde::option")]
	pub date_end: Option<Date>,
	#[serde(default)]
	pub min_samples: Option<i32>,
}

#[derive(Debug)]
pub enum FilterError {
	InvertedDateRange { start: Date, end: Date },
	NegativeMinSamples { value: i32 },
}

impl std::fmt::Display for FilterError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvertedDateRange { start, end } => {
				write!(f, "date_end {end} precedes date_start {start}")
			},
			Self::NegativeMinSamples { value } => {
				write!(f, "min_samples must be non-negative, got {value}")
			},
		}
	}
}

impl std::error::Error for FilterError {}

/// The record fields the filter stage inspects. A record missing a field a
/// clause needs fails that clause.
#[derive(Debug, Clone, Default)]
pub struct RecordFacets {
	pub organisms: Vec<String>,
	pub tech_type: Option<String>,
	pub submission_date: Option<Date>,
	pub n_samples: Option<i32>,
}

impl SearchFilters {
	pub fn is_empty(&self) -> bool {
		self.organisms.is_empty()
			&& self.tech_type.is_none()
			&& self.date_start.is_none()
			&& self.date_end.is_none()
			&& self.min_samples.is_none()
	}

	pub fn validate(&self) -> Result<(), FilterError> {
		if let (Some(start), Some(end)) = (self.date_start, self.date_end)
			&& end < start
		{
			return Err(FilterError::InvertedDateRange { start, end });
		}
		if let Some(value) = self.min_samples
			&& value < 0
		{
			return Err(FilterError::NegativeMinSamples { value });
		}

		Ok(())
	}

	pub fn matches(&self, facets: &RecordFacets) -> bool {
		if !self.organisms.is_empty() {
			let wanted: Vec<String> =
				self.organisms.iter().map(|organism| organism.to_lowercase()).collect();
			let found = facets
				.organisms
				.iter()
				.any(|organism| wanted.contains(&organism.to_lowercase()));

			if !found {
				return false;
			}
		}

		if let Some(tech_type) = &self.tech_type {
			match &facets.tech_type {
				Some(record_tech) if record_tech.eq_ignore_ascii_case(tech_type) => {},
				_ => return false,
			}
		}

		if self.date_start.is_some() || self.date_end.is_some() {
			let Some(date) = facets.submission_date else {
				return false;
			};

			if self.date_start.is_some_and(|start| date < start) {
				return false;
			}
			if self.date_end.is_some_and(|end| date > end) {
				return false;
			}
		}

		if let Some(min_samples) = self.min_samples {
			match facets.n_samples {
				Some(n) if n >= min_samples => {},
				_ => return false,
			}
		}

		true
	}
}
