//! Derives the muscle groups a workout targets from its exercises.
//!
//! Exercise records arrive in several historical shapes: proper lists, comma-joined strings
//! with stray quotes (`"\"chest\", \"triceps\""`), a singular `primary_muscle` field, or
//! nothing at all. [`MuscleField`] captures those shapes and [`MuscleField::normalize`] is the
//! only place they are interpreted.

use std::{cmp::Ordering, collections::HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MuscleField {
	List(Vec<Value>),
	Delimited(String),
	/// Any other JSON shape. Normalizes to nothing.
	Other(Value),
}
impl MuscleField {
	pub fn normalize(&self) -> Vec<String> {
		match self {
			Self::List(values) => values
				.iter()
				.filter_map(Value::as_str)
				.map(str::trim)
				.filter(|value| !value.is_empty())
				.map(str::to_string)
				.collect(),
			Self::Delimited(raw) => raw
				.split(',')
				.map(|segment| segment.replace(['"', '\''], ""))
				.map(|segment| segment.trim().to_string())
				.filter(|segment| !segment.is_empty())
				.collect(),
			Self::Other(_) => Vec::new(),
		}
	}
}
impl From<Vec<String>> for MuscleField {
	fn from(values: Vec<String>) -> Self {
		Self::List(values.into_iter().map(Value::String).collect())
	}
}
impl From<&str> for MuscleField {
	fn from(raw: &str) -> Self {
		Self::Delimited(raw.to_string())
	}
}

/// The muscle-bearing fields of an exercise, catalog entry, or generated plan item.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MuscleSource {
	pub primary_muscles: Option<MuscleField>,
	pub secondary_muscles: Option<MuscleField>,
	/// Legacy singular field.
	pub primary_muscle: Option<MuscleField>,
}
impl MuscleSource {
	pub fn from_lists(primary: Vec<String>, secondary: Vec<String>) -> Self {
		Self {
			primary_muscles: Some(primary.into()),
			secondary_muscles: Some(secondary.into()),
			primary_muscle: None,
		}
	}

	pub fn primary(&self) -> Vec<String> {
		let mut muscles = normalize_muscles(self.primary_muscles.as_ref());

		muscles.extend(normalize_muscles(self.primary_muscle.as_ref()));

		muscles
	}

	pub fn secondary(&self) -> Vec<String> {
		normalize_muscles(self.secondary_muscles.as_ref())
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuscleFocus {
	pub muscle_focus: Vec<String>,
	pub muscle_groups_targeted: String,
}

pub fn normalize_muscles(field: Option<&MuscleField>) -> Vec<String> {
	field.map(MuscleField::normalize).unwrap_or_default()
}

/// Sorted, case-sensitive union of every primary, secondary, and legacy muscle entry.
pub fn derive_muscle_focus<'a, I>(exercises: I) -> MuscleFocus
where
	I: IntoIterator<Item = &'a MuscleSource>,
{
	let mut seen = HashSet::new();

	for exercise in exercises {
		seen.extend(exercise.primary());
		seen.extend(exercise.secondary());
	}

	let mut muscle_focus: Vec<String> = seen.into_iter().collect();

	muscle_focus.sort_by(|a, b| compare_locale(a, b));

	let muscle_groups_targeted = muscle_focus.join(", ");

	MuscleFocus { muscle_focus, muscle_groups_targeted }
}

/// Case-insensitive ordering with lowercase ahead of uppercase on ties, as root-locale
/// collation orders ASCII words.
pub fn compare_locale(a: &str, b: &str) -> Ordering {
	a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| b.cmp(a))
}
