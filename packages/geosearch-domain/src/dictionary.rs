use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::text::normalize_phrase;

/// A controlled-vocabulary descriptor. Immutable within a dictionary
/// snapshot; a reload replaces the whole snapshot, never a single term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
	pub mesh_id: String,
	pub preferred_name: String,
	#[serde(default)]
	pub entry_terms: Vec<String>,
	#[serde(default)]
	pub tree_numbers: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
	Preferred,
	Synonym,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryError {
	EmptyMeshId { index: usize },
	EmptyPreferredName { mesh_id: String },
	DuplicateMeshId { mesh_id: String },
}

impl std::fmt::Display for DictionaryError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::EmptyMeshId { index } => {
				write!(f, "Descriptor at position {index} has an empty mesh id.")
			},
			Self::EmptyPreferredName { mesh_id } => {
				write!(f, "Descriptor {mesh_id} has an empty preferred name.")
			},
			Self::DuplicateMeshId { mesh_id } => {
				write!(f, "Descriptor {mesh_id} appears more than once in the feed.")
			},
		}
	}
}

impl std::error::Error for DictionaryError {}

#[derive(Debug, Clone, Copy)]
struct Surface {
	term: usize,
	kind: SurfaceKind,
}

#[derive(Debug, Clone, Copy)]
struct Partial {
	term: usize,
	phrase_tokens: usize,
}

/// A single-token hit inside a multi-word surface form.
#[derive(Debug, Clone, Copy)]
pub struct PartialMatch<'a> {
	pub term: &'a Term,
	/// Token count of the surface form the token was found in.
	pub phrase_tokens: usize,
}

/// Read-only index over one dictionary version. Lookup keys are normalized
/// phrases (see [`crate::text::normalize_phrase`]); the preferred name is
/// always registered as a key of its own term.
#[derive(Debug, Default)]
pub struct Dictionary {
	terms: Vec<Term>,
	by_id: HashMap<String, usize>,
	by_phrase: HashMap<String, Vec<Surface>>,
	by_token: HashMap<String, Vec<Partial>>,
}

impl Dictionary {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Builds the index from a descriptor feed. Any malformed descriptor
	/// fails the whole build so a broken feed can never produce a partially
	/// usable snapshot.
	pub fn from_terms(terms: Vec<Term>) -> Result<Self, DictionaryError> {
		let mut by_id = HashMap::with_capacity(terms.len());

		for (index, term) in terms.iter().enumerate() {
			if term.mesh_id.trim().is_empty() {
				return Err(DictionaryError::EmptyMeshId { index });
			}
			if normalize_phrase(&term.preferred_name).is_empty() {
				return Err(DictionaryError::EmptyPreferredName { mesh_id: term.mesh_id.clone() });
			}
			if by_id.insert(term.mesh_id.clone(), index).is_some() {
				return Err(DictionaryError::DuplicateMeshId { mesh_id: term.mesh_id.clone() });
			}
		}

		let mut by_phrase: HashMap<String, Vec<Surface>> = HashMap::new();

		for (index, term) in terms.iter().enumerate() {
			let preferred_key = normalize_phrase(&term.preferred_name);
			let mut keys_seen: HashSet<String> = HashSet::new();

			keys_seen.insert(preferred_key.clone());
			by_phrase
				.entry(preferred_key)
				.or_default()
				.push(Surface { term: index, kind: SurfaceKind::Preferred });

			for entry in &term.entry_terms {
				let key = normalize_phrase(entry);
				if key.is_empty() || !keys_seen.insert(key.clone()) {
					continue;
				}
				by_phrase
					.entry(key)
					.or_default()
					.push(Surface { term: index, kind: SurfaceKind::Synonym });
			}
		}

		let mut by_token: HashMap<String, Vec<Partial>> = HashMap::new();

		for (phrase, surfaces) in &by_phrase {
			let tokens: Vec<&str> = phrase.split(' ').collect();
			if tokens.len() < 2 {
				continue;
			}

			let distinct: HashSet<&str> = tokens.iter().copied().collect();
			for token in distinct {
				let partials = by_token.entry(token.to_string()).or_default();
				for surface in surfaces {
					partials.push(Partial { term: surface.term, phrase_tokens: tokens.len() });
				}
			}
		}

		Ok(Self { terms, by_id, by_phrase, by_token })
	}

	pub fn len(&self) -> usize {
		self.terms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.terms.is_empty()
	}

	/// Exact case-insensitive lookup. When several terms share a surface
	/// form the first one registered wins; [`Self::surfaces_for`] exposes
	/// all of them.
	pub fn lookup(&self, phrase: &str) -> Option<&Term> {
		self.by_phrase
			.get(&normalize_phrase(phrase))
			.and_then(|surfaces| surfaces.first())
			.map(|surface| &self.terms[surface.term])
	}

	pub fn surfaces_for(&self, phrase: &str) -> impl Iterator<Item = (&Term, SurfaceKind)> {
		self.by_phrase
			.get(&normalize_phrase(phrase))
			.into_iter()
			.flatten()
			.map(|surface| (&self.terms[surface.term], surface.kind))
	}

	/// All multi-word surface forms containing the given single token.
	pub fn partial_matches(&self, token: &str) -> impl Iterator<Item = PartialMatch<'_>> {
		self.by_token.get(token).into_iter().flatten().map(|partial| PartialMatch {
			term: &self.terms[partial.term],
			phrase_tokens: partial.phrase_tokens,
		})
	}

	pub fn get(&self, mesh_id: &str) -> Option<&Term> {
		self.by_id.get(mesh_id).map(|index| &self.terms[*index])
	}

	pub fn all_terms(&self) -> impl Iterator<Item = &Term> {
		self.terms.iter()
	}
}
