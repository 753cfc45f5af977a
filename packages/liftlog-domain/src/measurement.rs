use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const SPARKLINE_MAX_POINTS: usize = 30;
pub const METRIC_KEY_MAX_CHARS: usize = 64;

/// Read access shared by stored rows and API items so sorting and summaries work on either.
pub trait MeasurementPoint {
	fn measured_at(&self) -> OffsetDateTime;

	fn value(&self) -> f64;

	fn unit(&self) -> &str;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementSource {
	Ocr,
	Manual,
}
impl MeasurementSource {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Ocr => "ocr",
			Self::Manual => "manual",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"ocr" => Some(Self::Ocr),
			"manual" => Some(Self::Manual),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
	#[default]
	Date,
	Value,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
	Asc,
	#[default]
	Desc,
}
impl SortDirection {
	pub fn flipped(self) -> Self {
		match self {
			Self::Asc => Self::Desc,
			Self::Desc => Self::Asc,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
	pub field: SortField,
	pub direction: SortDirection,
}
impl SortState {
	pub fn new(field: SortField, direction: SortDirection) -> Self {
		Self { field, direction }
	}

	/// Selecting the active field flips the direction; a different field starts descending.
	pub fn toggle(self, field: SortField) -> Self {
		if self.field == field {
			Self { field, direction: self.direction.flipped() }
		} else {
			Self { field, direction: SortDirection::Desc }
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SparklinePoint {
	#[serde(with = "time::serde::rfc3339")]
	pub measured_at: OffsetDateTime,
	pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricSummary {
	pub metric: String,
	pub display_name: String,
	pub latest_value: f64,
	pub unit: String,
	#[serde(with = "time::serde::rfc3339")]
	pub latest_measured_at: OffsetDateTime,
	/// Oldest first, at most [`SPARKLINE_MAX_POINTS`] entries.
	pub sparkline: Vec<SparklinePoint>,
}

/// Returns a new, stably sorted sequence. Equal keys keep their input order in both directions.
pub fn sort_measurements<T>(items: &[T], state: SortState) -> Vec<T>
where
	T: MeasurementPoint + Clone,
{
	let mut sorted = items.to_vec();

	sorted.sort_by(|a, b| {
		let ordering = compare_by(a, b, state.field);

		match state.direction {
			SortDirection::Asc => ordering,
			SortDirection::Desc => ordering.reverse(),
		}
	});

	sorted
}

/// `body_fat_percent` -> `Body Fat Percent`.
pub fn metric_display_label(metric_key: &str) -> String {
	let spaced = metric_key.replace('_', " ");
	let mut out = String::with_capacity(spaced.len());
	let mut prev_is_word = false;

	for ch in spaced.chars() {
		let is_word = ch.is_alphanumeric();

		if is_word && !prev_is_word {
			out.extend(ch.to_uppercase());
		} else {
			out.push(ch);
		}

		prev_is_word = is_word;
	}

	out
}

pub fn is_valid_metric_key(metric_key: &str) -> bool {
	!metric_key.is_empty()
		&& metric_key.len() <= METRIC_KEY_MAX_CHARS
		&& metric_key.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// Summarizes one metric's measurements, given in any order. `None` when there are none.
pub fn summarize_metric<T>(metric: &str, display_name: &str, items: &[T]) -> Option<MetricSummary>
where
	T: MeasurementPoint,
{
	let mut chronological: Vec<&T> = items.iter().collect();

	chronological.sort_by_key(|item| item.measured_at());

	let latest = *chronological.last()?;
	let skip = chronological.len().saturating_sub(SPARKLINE_MAX_POINTS);
	let sparkline = chronological[skip..]
		.iter()
		.map(|item| SparklinePoint { measured_at: item.measured_at(), value: item.value() })
		.collect();

	Some(MetricSummary {
		metric: metric.to_string(),
		display_name: display_name.to_string(),
		latest_value: latest.value(),
		unit: latest.unit().to_string(),
		latest_measured_at: latest.measured_at(),
		sparkline,
	})
}

fn compare_by<T>(a: &T, b: &T, field: SortField) -> Ordering
where
	T: MeasurementPoint,
{
	match field {
		SortField::Date => a.measured_at().cmp(&b.measured_at()),
		SortField::Value => a.value().total_cmp(&b.value()),
	}
}
