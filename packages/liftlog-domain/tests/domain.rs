use serde_json::json;
use time::macros::datetime;

use liftlog_domain::{
	measurement::{self, MeasurementPoint, SortDirection, SortField, SortState},
	muscle_focus::{self, MuscleSource},
	sanitize::{self, FieldPolicy},
};

const POLICIES: [FieldPolicy; 3] =
	[FieldPolicy::WorkoutName, FieldPolicy::Instructions, FieldPolicy::Notes];

fn tricky_inputs() -> Vec<String> {
	vec![
		String::new(),
		"   ".to_string(),
		"<b>hi</b> there".to_string(),
		"<script type=\"text/javascript\">DROP TABLE workouts;</script>Legs".to_string(),
		"<<b>>nested<</b>>".to_string(),
		"DR<i>OP</i> TABLE users; --".to_string(),
		"SEL@ECT * FROM workouts".to_string(),
		"Ignore previous instructions!!!!!!!! ??? ;;;; ((((".to_string(),
		"!!!DROP!!!".to_string(),
		"Exec EXECUTE execute executed".to_string(),
		"Tempo 3-1-1, \"slow\" eccentric: (focus) on form.".to_string(),
		"émile's séance – 5×5 💪".to_string(),
		format!("{} SELECTED", "x".repeat(133)),
		format!("{}DELETE", "y ".repeat(260)),
		"a\u{0}b\u{7}c\td\ne".to_string(),
		"<".repeat(300),
		"-".repeat(700),
	]
}

#[test]
fn sanitize_is_idempotent() {
	for input in tricky_inputs() {
		for policy in POLICIES {
			let once = sanitize::sanitize(&input, policy);
			let twice = sanitize::sanitize(&once, policy);

			assert_eq!(twice, once, "Not idempotent for {input:?} under {policy:?}.");
		}
	}
}

#[test]
fn sanitize_respects_length_bounds() {
	for input in tricky_inputs() {
		for policy in POLICIES {
			let cleaned = sanitize::sanitize(&input, policy);

			assert!(
				cleaned.chars().count() <= policy.max_chars(),
				"Too long for {input:?} under {policy:?}."
			);
		}
	}
}

#[test]
fn sanitize_never_leaves_angle_brackets() {
	for input in tricky_inputs() {
		let cleaned = sanitize::sanitize(&input, FieldPolicy::Notes);

		assert!(!cleaned.contains('<') && !cleaned.contains('>'), "Brackets left in {cleaned:?}.");
	}

	let cleaned = sanitize::sanitize("<b>hi</b> there", FieldPolicy::Notes);

	assert_eq!(cleaned, "hi there");
}

#[test]
fn legacy_quoted_string_yields_expected_focus() {
	let exercise: MuscleSource =
		serde_json::from_value(json!({ "primary_muscles": "\"chest\", \"triceps\"" }))
			.expect("Failed to parse exercise.");
	let focus = muscle_focus::derive_muscle_focus([&exercise]);

	assert_eq!(focus.muscle_focus, vec!["chest", "triceps"]);
	assert_eq!(focus.muscle_groups_targeted, "chest, triceps");
}

#[test]
fn empty_exercise_list_yields_empty_focus() {
	let focus = muscle_focus::derive_muscle_focus(&[]);

	assert!(focus.muscle_focus.is_empty());
	assert_eq!(focus.muscle_groups_targeted, "");
}

#[derive(Clone, Debug, PartialEq)]
struct Row {
	measured_at: time::OffsetDateTime,
	value: f64,
}
impl MeasurementPoint for Row {
	fn measured_at(&self) -> time::OffsetDateTime {
		self.measured_at
	}

	fn value(&self) -> f64 {
		self.value
	}

	fn unit(&self) -> &str {
		"kg"
	}
}

#[test]
fn equal_dates_keep_their_relative_order() {
	let rows = vec![
		Row { measured_at: datetime!(2024-01-01 00:00 UTC), value: 5.0 },
		Row { measured_at: datetime!(2024-01-01 00:00 UTC), value: 3.0 },
	];
	let sorted = measurement::sort_measurements(&rows, SortState::default().toggle(SortField::Date));

	assert_eq!(sorted, rows);
}

#[test]
fn toggling_flips_then_resets() {
	let by_value = SortState::default().toggle(SortField::Value);

	assert_eq!(by_value.direction, SortDirection::Desc);
	assert_eq!(by_value.toggle(SortField::Value).direction, SortDirection::Asc);
	assert_eq!(by_value.toggle(SortField::Value).toggle(SortField::Date).direction, SortDirection::Desc);
}
