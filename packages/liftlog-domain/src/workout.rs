use std::{collections::HashSet, hash::Hash, ops::RangeInclusive};

use serde::{Deserialize, Serialize};

pub const RATING_RANGE: RangeInclusive<i16> = 1..=5;
pub const MAX_EXERCISES_PER_WORKOUT: usize = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
	Compound,
	Isolation,
}
impl MovementType {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Compound => "compound",
			Self::Isolation => "isolation",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"compound" => Some(Self::Compound),
			"isolation" => Some(Self::Isolation),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutSource {
	Manual,
	Generated,
}
impl WorkoutSource {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Manual => "manual",
			Self::Generated => "generated",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"manual" => Some(Self::Manual),
			"generated" => Some(Self::Generated),
			_ => None,
		}
	}
}

pub fn is_valid_rating(rating: i16) -> bool {
	RATING_RANGE.contains(&rating)
}

/// True when `proposed` names every id in `current` exactly once and nothing else.
pub fn is_exact_permutation<T>(current: &[T], proposed: &[T]) -> bool
where
	T: Eq + Hash,
{
	if current.len() != proposed.len() {
		return false;
	}

	let expected: HashSet<&T> = current.iter().collect();
	let mut seen = HashSet::with_capacity(proposed.len());

	proposed.iter().all(|id| expected.contains(id) && seen.insert(id))
}
