use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};
use time::{Date, Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{Error, LiftlogService, Principal, Result};
use liftlog_domain::{
	muscle_focus::{self, MuscleSource},
	sanitize::{self, FieldPolicy},
	workout::{self, MAX_EXERCISES_PER_WORKOUT, WorkoutSource},
};
use liftlog_storage::{
	catalog,
	models::{Workout, WorkoutExercise},
	workouts as store,
};

const MAX_SETS: i32 = 20;
const MAX_REST_SECONDS: i32 = 900;
// UTC+14:00 (Line Islands) and UTC-12:00 are the widest offsets in use.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Clone, Debug, Deserialize)]
pub struct CreateWorkoutRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub special_instructions: Option<String>,
	/// Client's offset from UTC, used only to date the fallback name. Absent means UTC.
	#[serde(default)]
	pub utc_offset_minutes: Option<i32>,
	pub exercises: Vec<WorkoutExerciseInput>,
}

/// An exercise slot referencing a catalog entry. The muscle focus is never accepted from
/// clients; it is derived from the referenced entries.
#[derive(Clone, Debug, Deserialize)]
pub struct WorkoutExerciseInput {
	pub exercise_id: Uuid,
	pub sets: i32,
	pub reps: String,
	pub rest_seconds: i32,
	#[serde(default)]
	pub weight_recommendation: Option<String>,
	#[serde(default)]
	pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ReorderExercisesRequest {
	pub workout_exercise_ids: Vec<Uuid>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RateWorkoutRequest {
	pub rating: i16,
}

#[derive(Clone, Debug, Serialize)]
pub struct WorkoutSummary {
	pub workout_id: Uuid,
	pub name: String,
	pub special_instructions: Option<String>,
	pub muscle_focus: Vec<String>,
	pub muscle_groups_targeted: String,
	pub source: String,
	pub rating: Option<i16>,
	#[serde(with = "time::serde::rfc3339::option")]
	pub rated_at: Option<OffsetDateTime>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl From<Workout> for WorkoutSummary {
	fn from(row: Workout) -> Self {
		Self {
			workout_id: row.workout_id,
			name: row.name,
			special_instructions: row.special_instructions,
			muscle_focus: row.muscle_focus,
			muscle_groups_targeted: row.muscle_groups_targeted,
			source: row.source,
			rating: row.rating,
			rated_at: row.rated_at,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct WorkoutExerciseItem {
	pub workout_exercise_id: Uuid,
	pub exercise_id: Option<Uuid>,
	pub exercise_name: String,
	pub position: i32,
	pub sets: i32,
	pub reps: String,
	pub rest_seconds: i32,
	pub weight_recommendation: Option<String>,
	pub notes: Option<String>,
	pub primary_muscles: Vec<String>,
	pub secondary_muscles: Vec<String>,
}
impl From<WorkoutExercise> for WorkoutExerciseItem {
	fn from(row: WorkoutExercise) -> Self {
		Self {
			workout_exercise_id: row.workout_exercise_id,
			exercise_id: row.exercise_id,
			exercise_name: row.exercise_name,
			position: row.position,
			sets: row.sets,
			reps: row.reps,
			rest_seconds: row.rest_seconds,
			weight_recommendation: row.weight_recommendation,
			notes: row.notes,
			primary_muscles: row.primary_muscles,
			secondary_muscles: row.secondary_muscles,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct WorkoutDetail {
	#[serde(flatten)]
	pub workout: WorkoutSummary,
	pub exercises: Vec<WorkoutExerciseItem>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeleteWorkoutResponse {
	pub workout_id: Uuid,
	pub deleted: bool,
}

/// A validated, sanitized slot ready to be persisted.
#[derive(Clone, Debug)]
pub(crate) struct NewSlot {
	pub(crate) exercise_id: Option<Uuid>,
	pub(crate) exercise_name: String,
	pub(crate) sets: i32,
	pub(crate) reps: String,
	pub(crate) rest_seconds: i32,
	pub(crate) weight_recommendation: Option<String>,
	pub(crate) notes: Option<String>,
	pub(crate) primary_muscles: Vec<String>,
	pub(crate) secondary_muscles: Vec<String>,
}

pub(crate) struct NewWorkout {
	pub(crate) name: String,
	pub(crate) special_instructions: Option<String>,
	pub(crate) source: WorkoutSource,
	pub(crate) slots: Vec<NewSlot>,
}

impl LiftlogService {
	pub async fn create_workout(
		&self,
		principal: &Principal,
		req: CreateWorkoutRequest,
	) -> Result<WorkoutDetail> {
		if req.exercises.is_empty() || req.exercises.len() > MAX_EXERCISES_PER_WORKOUT {
			return Err(Error::invalid(format!(
				"A workout needs between 1 and {MAX_EXERCISES_PER_WORKOUT} exercises."
			)));
		}

		let now = OffsetDateTime::now_utc();
		let today = fallback_date(now, req.utc_offset_minutes)?;
		let ids: Vec<Uuid> = req.exercises.iter().map(|input| input.exercise_id).collect();
		let catalog: HashMap<Uuid, _> = catalog::get_exercises_by_ids(&self.db.pool, &ids)
			.await?
			.into_iter()
			.map(|row| (row.exercise_id, row))
			.collect();
		let mut slots = Vec::with_capacity(req.exercises.len());

		for (idx, input) in req.exercises.iter().enumerate() {
			let Some(entry) = catalog.get(&input.exercise_id) else {
				return Err(Error::invalid(format!(
					"exercises[{idx}].exercise_id does not name a catalog exercise."
				)));
			};
			let (sets, reps, rest_seconds) = validate_prescription(
				idx,
				input.sets,
				input.reps.as_str(),
				input.rest_seconds,
			)?;

			slots.push(NewSlot {
				exercise_id: Some(entry.exercise_id),
				exercise_name: entry.name.clone(),
				sets,
				reps,
				rest_seconds,
				weight_recommendation: sanitize::sanitize_instructions(
					input.weight_recommendation.as_deref(),
				),
				notes: sanitize::sanitize_notes(input.notes.as_deref()),
				primary_muscles: entry.primary_muscles.clone(),
				secondary_muscles: entry.secondary_muscles.clone(),
			});
		}

		let new_workout = NewWorkout {
			name: sanitize::sanitize_workout_name(req.name.as_deref(), today),
			special_instructions: sanitize::sanitize_instructions(
				req.special_instructions.as_deref(),
			),
			source: WorkoutSource::Manual,
			slots,
		};

		self.persist_workout(principal, new_workout, now).await
	}

	pub async fn list_workouts(&self, principal: &Principal) -> Result<Vec<WorkoutSummary>> {
		let rows = store::list_workouts(&self.db.pool, principal.user_id).await?;

		Ok(rows.into_iter().map(WorkoutSummary::from).collect())
	}

	pub async fn get_workout(&self, principal: &Principal, workout_id: Uuid) -> Result<WorkoutDetail> {
		let workout = store::get_workout(&self.db.pool, principal.user_id, workout_id)
			.await?
			.ok_or_else(|| Error::not_found("Workout not found."))?;
		let exercises = store::list_workout_exercises(&self.db.pool, workout_id).await?;

		Ok(detail(workout, exercises))
	}

	/// Rewrites slot positions to follow `workout_exercise_ids`, which must name every slot of
	/// the workout exactly once.
	pub async fn reorder_exercises(
		&self,
		principal: &Principal,
		workout_id: Uuid,
		req: ReorderExercisesRequest,
	) -> Result<WorkoutDetail> {
		let now = OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;
		let workout = store::lock_workout(&mut *tx, principal.user_id, workout_id)
			.await?
			.ok_or_else(|| Error::not_found("Workout not found."))?;
		let current: Vec<Uuid> = store::list_workout_exercises(&mut *tx, workout_id)
			.await?
			.into_iter()
			.map(|slot| slot.workout_exercise_id)
			.collect();

		if !workout::is_exact_permutation(&current, &req.workout_exercise_ids) {
			return Err(Error::invalid(
				"workout_exercise_ids must list every exercise of the workout exactly once.",
			));
		}

		for (position, slot_id) in req.workout_exercise_ids.iter().enumerate() {
			let position = i32::try_from(position)
				.map_err(|_| Error::invalid("Too many exercises to reorder."))?;

			store::set_workout_exercise_position(&mut *tx, workout_id, *slot_id, position).await?;
		}

		store::touch_workout(&mut *tx, workout_id, now).await?;

		let exercises = store::list_workout_exercises(&mut *tx, workout_id).await?;

		tx.commit().await?;

		let mut workout = workout;

		workout.updated_at = now;

		Ok(detail(workout, exercises))
	}

	pub async fn rate_workout(
		&self,
		principal: &Principal,
		workout_id: Uuid,
		req: RateWorkoutRequest,
	) -> Result<WorkoutSummary> {
		if !workout::is_valid_rating(req.rating) {
			return Err(Error::invalid(format!(
				"rating must be between {} and {}.",
				workout::RATING_RANGE.start(),
				workout::RATING_RANGE.end()
			)));
		}

		let row = store::rate_workout(
			&self.db.pool,
			principal.user_id,
			workout_id,
			req.rating,
			OffsetDateTime::now_utc(),
		)
		.await?
		.ok_or_else(|| Error::not_found("Workout not found."))?;

		Ok(row.into())
	}

	pub async fn delete_workout(
		&self,
		principal: &Principal,
		workout_id: Uuid,
	) -> Result<DeleteWorkoutResponse> {
		let deleted = store::delete_workout(&self.db.pool, principal.user_id, workout_id).await?;

		if !deleted {
			return Err(Error::not_found("Workout not found."));
		}

		tracing::info!(%workout_id, "Deleted workout.");

		Ok(DeleteWorkoutResponse { workout_id, deleted })
	}

	/// Inserts a workout and its slots in one transaction. The muscle focus is derived here and
	/// nowhere else.
	pub(crate) async fn persist_workout(
		&self,
		principal: &Principal,
		new_workout: NewWorkout,
		now: OffsetDateTime,
	) -> Result<WorkoutDetail> {
		let NewWorkout { name, special_instructions, source, slots } = new_workout;
		let focus = focus_for_slots(&slots);
		let workout = Workout {
			workout_id: Uuid::new_v4(),
			user_id: principal.user_id,
			name,
			special_instructions,
			muscle_focus: focus.muscle_focus,
			muscle_groups_targeted: focus.muscle_groups_targeted,
			source: source.as_str().to_string(),
			rating: None,
			rated_at: None,
			created_at: now,
			updated_at: now,
		};
		let mut rows = Vec::with_capacity(slots.len());

		for (position, slot) in slots.into_iter().enumerate() {
			rows.push(WorkoutExercise {
				workout_exercise_id: Uuid::new_v4(),
				workout_id: workout.workout_id,
				exercise_id: slot.exercise_id,
				exercise_name: slot.exercise_name,
				position: i32::try_from(position)
					.map_err(|_| Error::invalid("Too many exercises in one workout."))?,
				sets: slot.sets,
				reps: slot.reps,
				rest_seconds: slot.rest_seconds,
				weight_recommendation: slot.weight_recommendation,
				notes: slot.notes,
				primary_muscles: slot.primary_muscles,
				secondary_muscles: slot.secondary_muscles,
			});
		}

		let mut tx: Transaction<'_, Postgres> = self.db.pool.begin().await?;

		store::insert_workout(&mut *tx, &workout).await?;

		for row in &rows {
			store::insert_workout_exercise(&mut *tx, row).await?;
		}

		tx.commit().await?;

		tracing::info!(
			workout_id = %workout.workout_id,
			source = %workout.source,
			exercises = rows.len(),
			"Created workout."
		);

		Ok(detail(workout, rows))
	}
}

pub(crate) fn validate_prescription(
	idx: usize,
	sets: i32,
	reps: &str,
	rest_seconds: i32,
) -> Result<(i32, String, i32)> {
	if !(1..=MAX_SETS).contains(&sets) {
		return Err(Error::invalid(format!("exercises[{idx}].sets must be between 1 and {MAX_SETS}.")));
	}
	if !(0..=MAX_REST_SECONDS).contains(&rest_seconds) {
		return Err(Error::invalid(format!(
			"exercises[{idx}].rest_seconds must be between 0 and {MAX_REST_SECONDS}."
		)));
	}

	let reps = sanitize::sanitize(reps, FieldPolicy::Instructions);

	if reps.is_empty() {
		return Err(Error::invalid(format!("exercises[{idx}].reps must be non-empty.")));
	}

	Ok((sets, reps, rest_seconds))
}

/// The calendar date at `now` for a client `utc_offset_minutes` away from UTC.
pub(crate) fn fallback_date(now: OffsetDateTime, utc_offset_minutes: Option<i32>) -> Result<Date> {
	let Some(minutes) = utc_offset_minutes else {
		return Ok(now.date());
	};

	if !(-MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&minutes) {
		return Err(Error::invalid(format!(
			"utc_offset_minutes must be between -{MAX_UTC_OFFSET_MINUTES} and {MAX_UTC_OFFSET_MINUTES}."
		)));
	}

	now.checked_add(Duration::minutes(i64::from(minutes)))
		.map(|local| local.date())
		.ok_or_else(|| Error::invalid("utc_offset_minutes moves the date out of range."))
}

pub(crate) fn focus_for_slots(slots: &[NewSlot]) -> muscle_focus::MuscleFocus {
	let sources: Vec<MuscleSource> = slots
		.iter()
		.map(|slot| {
			MuscleSource::from_lists(slot.primary_muscles.clone(), slot.secondary_muscles.clone())
		})
		.collect();

	muscle_focus::derive_muscle_focus(&sources)
}

fn detail(workout: Workout, exercises: Vec<WorkoutExercise>) -> WorkoutDetail {
	WorkoutDetail {
		workout: workout.into(),
		exercises: exercises.into_iter().map(WorkoutExerciseItem::from).collect(),
	}
}
