//! Model-generated workout plans, persisted as ordinary workouts with `source = generated`.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::{
	Error, LiftlogService, Principal, Result, WorkoutDetail,
	workouts::{self, NewSlot, NewWorkout},
};
use liftlog_domain::{
	muscle_focus::MuscleSource,
	sanitize::{self, FieldPolicy},
	workout::{MAX_EXERCISES_PER_WORKOUT, WorkoutSource},
};
use liftlog_providers::plan::PlanRequest;
use liftlog_storage::{catalog, models::Exercise};

const DEFAULT_SETS: i32 = 3;
const DEFAULT_REPS: &str = "10";
const DEFAULT_REST_SECONDS: i32 = 60;

#[derive(Clone, Debug, Deserialize)]
pub struct GeneratePlanRequest {
	pub goal: String,
	#[serde(default)]
	pub special_instructions: Option<String>,
	/// Client's offset from UTC, used only to date the fallback name. Absent means UTC.
	#[serde(default)]
	pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GeneratedPlan {
	#[serde(default)]
	name: Option<Value>,
	#[serde(default)]
	exercises: Vec<GeneratedExercise>,
}

#[derive(Debug, Deserialize)]
struct GeneratedExercise {
	#[serde(default)]
	name: Option<Value>,
	#[serde(default)]
	sets: Option<Value>,
	#[serde(default)]
	reps: Option<Value>,
	#[serde(default)]
	rest_seconds: Option<Value>,
	#[serde(default)]
	weight_recommendation: Option<Value>,
	#[serde(default)]
	notes: Option<Value>,
	#[serde(flatten)]
	muscles: MuscleSource,
}

impl LiftlogService {
	pub async fn generate_plan(
		&self,
		principal: &Principal,
		req: GeneratePlanRequest,
	) -> Result<WorkoutDetail> {
		let goal = sanitize::sanitize(&req.goal, FieldPolicy::Instructions);
		let now = OffsetDateTime::now_utc();
		let today = workouts::fallback_date(now, req.utc_offset_minutes)?;

		if goal.is_empty() {
			return Err(Error::invalid("goal must contain text."));
		}

		let request = PlanRequest {
			goal,
			special_instructions: sanitize::sanitize_instructions(
				req.special_instructions.as_deref(),
			),
		};
		let raw = self
			.providers
			.plan
			.generate(&self.cfg.providers.plan_generator, &request)
			.await?;
		let plan: GeneratedPlan = serde_json::from_value(raw).map_err(|err| Error::Provider {
			message: format!("Generated plan has an unexpected shape: {err}."),
		})?;
		let names: Vec<String> = plan
			.exercises
			.iter()
			.filter_map(|item| text_field(item.name.as_ref()))
			.map(|name| name.trim().to_string())
			.collect();
		let catalog: HashMap<String, Exercise> = catalog::get_exercises_by_names(&self.db.pool, &names)
			.await?
			.into_iter()
			.map(|row| (row.name.to_lowercase(), row))
			.collect();
		let slots = plan_slots(&plan, &catalog);

		if slots.is_empty() {
			return Err(Error::Provider {
				message: "Generated plan contains no usable exercises.".to_string(),
			});
		}

		let new_workout = NewWorkout {
			name: sanitize::sanitize_workout_name(
				text_field(plan.name.as_ref()).as_deref(),
				today,
			),
			special_instructions: request.special_instructions,
			source: WorkoutSource::Generated,
			slots,
		};

		self.persist_workout(principal, new_workout, now).await
	}
}

/// Items that do not survive cleanup are dropped rather than failing the whole plan.
fn plan_slots(plan: &GeneratedPlan, catalog: &HashMap<String, Exercise>) -> Vec<NewSlot> {
	let mut slots = Vec::new();

	for (idx, item) in plan.exercises.iter().take(MAX_EXERCISES_PER_WORKOUT).enumerate() {
		let Some(raw_name) = text_field(item.name.as_ref()) else {
			tracing::warn!(index = idx, "Dropping generated exercise without a name.");

			continue;
		};
		let name = sanitize::sanitize(&raw_name, FieldPolicy::WorkoutName);

		if name.is_empty() {
			continue;
		}

		let sets = int_field(item.sets.as_ref()).unwrap_or(DEFAULT_SETS);
		let reps = reps_field(item.reps.as_ref());
		let rest_seconds = int_field(item.rest_seconds.as_ref()).unwrap_or(DEFAULT_REST_SECONDS);
		let Ok((sets, reps, rest_seconds)) =
			workouts::validate_prescription(idx, sets, &reps, rest_seconds)
		else {
			tracing::warn!(exercise = %name, "Dropping generated exercise with an invalid prescription.");

			continue;
		};
		let entry = catalog.get(&raw_name.trim().to_lowercase());
		let mut primary_muscles = item.muscles.primary();
		let mut secondary_muscles = item.muscles.secondary();

		if primary_muscles.is_empty()
			&& secondary_muscles.is_empty()
			&& let Some(entry) = entry
		{
			primary_muscles = entry.primary_muscles.clone();
			secondary_muscles = entry.secondary_muscles.clone();
		}

		slots.push(NewSlot {
			exercise_id: entry.map(|entry| entry.exercise_id),
			exercise_name: entry.map(|entry| entry.name.clone()).unwrap_or(name),
			sets,
			reps,
			rest_seconds,
			weight_recommendation: sanitize::sanitize_instructions(
				text_field(item.weight_recommendation.as_ref()).as_deref(),
			),
			notes: sanitize::sanitize_notes(text_field(item.notes.as_ref()).as_deref()),
			primary_muscles,
			secondary_muscles,
		});
	}

	slots
}

fn int_field(value: Option<&Value>) -> Option<i32> {
	match value? {
		Value::Number(number) => number.as_i64().and_then(|n| i32::try_from(n).ok()),
		Value::String(raw) => raw.trim().parse().ok(),
		_ => None,
	}
}

fn reps_field(value: Option<&Value>) -> String {
	text_field(value).unwrap_or_else(|| DEFAULT_REPS.to_string())
}

/// Strings pass through and numbers are rendered; any other shape reads as absent.
fn text_field(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(raw) => Some(raw.clone()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}
