use sqlx::{PgConnection, PgExecutor};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{Workout, WorkoutExercise},
};

const WORKOUT_COLUMNS: &str = "\
workout_id, user_id, name, special_instructions, muscle_focus, muscle_groups_targeted, source, \
rating, rated_at, created_at, updated_at";
const WORKOUT_EXERCISE_COLUMNS: &str = "\
workout_exercise_id, workout_id, exercise_id, exercise_name, position, sets, reps, rest_seconds, \
weight_recommendation, notes, primary_muscles, secondary_muscles";

pub async fn insert_workout<'e, E>(executor: E, workout: &Workout) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO workouts (
	workout_id,
	user_id,
	name,
	special_instructions,
	muscle_focus,
	muscle_groups_targeted,
	source,
	rating,
	rated_at,
	created_at,
	updated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)",
	)
	.bind(workout.workout_id)
	.bind(workout.user_id)
	.bind(workout.name.as_str())
	.bind(workout.special_instructions.as_deref())
	.bind(&workout.muscle_focus)
	.bind(workout.muscle_groups_targeted.as_str())
	.bind(workout.source.as_str())
	.bind(workout.rating)
	.bind(workout.rated_at)
	.bind(workout.created_at)
	.bind(workout.updated_at)
	.execute(executor)
	.await
	.map_err(|err| Error::from_write(err, "Workout"))?;

	Ok(())
}

pub async fn insert_workout_exercise<'e, E>(executor: E, slot: &WorkoutExercise) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO workout_exercises (
	workout_exercise_id,
	workout_id,
	exercise_id,
	exercise_name,
	position,
	sets,
	reps,
	rest_seconds,
	weight_recommendation,
	notes,
	primary_muscles,
	secondary_muscles
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)",
	)
	.bind(slot.workout_exercise_id)
	.bind(slot.workout_id)
	.bind(slot.exercise_id)
	.bind(slot.exercise_name.as_str())
	.bind(slot.position)
	.bind(slot.sets)
	.bind(slot.reps.as_str())
	.bind(slot.rest_seconds)
	.bind(slot.weight_recommendation.as_deref())
	.bind(slot.notes.as_deref())
	.bind(&slot.primary_muscles)
	.bind(&slot.secondary_muscles)
	.execute(executor)
	.await
	.map_err(|err| Error::from_write(err, "Workout exercise"))?;

	Ok(())
}

pub async fn get_workout<'e, E>(executor: E, user_id: Uuid, workout_id: Uuid) -> Result<Option<Workout>>
where
	E: PgExecutor<'e>,
{
	let sql =
		format!("SELECT {WORKOUT_COLUMNS} FROM workouts WHERE user_id = $1 AND workout_id = $2");
	let row = sqlx::query_as::<_, Workout>(&sql)
		.bind(user_id)
		.bind(workout_id)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

/// Same as [`get_workout`] but takes a row lock for the rest of the transaction.
pub async fn lock_workout(
	conn: &mut PgConnection,
	user_id: Uuid,
	workout_id: Uuid,
) -> Result<Option<Workout>> {
	let sql = format!(
		"SELECT {WORKOUT_COLUMNS} FROM workouts WHERE user_id = $1 AND workout_id = $2 FOR UPDATE"
	);
	let row = sqlx::query_as::<_, Workout>(&sql)
		.bind(user_id)
		.bind(workout_id)
		.fetch_optional(conn)
		.await?;

	Ok(row)
}

pub async fn list_workouts<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Workout>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"SELECT {WORKOUT_COLUMNS} FROM workouts WHERE user_id = $1 ORDER BY created_at DESC"
	);
	let rows = sqlx::query_as::<_, Workout>(&sql).bind(user_id).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn list_workout_exercises<'e, E>(executor: E, workout_id: Uuid) -> Result<Vec<WorkoutExercise>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"SELECT {WORKOUT_EXERCISE_COLUMNS} FROM workout_exercises WHERE workout_id = $1 \
		 ORDER BY position, workout_exercise_id"
	);
	let rows =
		sqlx::query_as::<_, WorkoutExercise>(&sql).bind(workout_id).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn set_workout_exercise_position<'e, E>(
	executor: E,
	workout_id: Uuid,
	workout_exercise_id: Uuid,
	position: i32,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"UPDATE workout_exercises SET position = $3 WHERE workout_id = $1 AND workout_exercise_id = $2",
	)
	.bind(workout_id)
	.bind(workout_exercise_id)
	.bind(position)
	.execute(executor)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("Workout exercise {workout_exercise_id}.")));
	}

	Ok(())
}

pub async fn touch_workout<'e, E>(executor: E, workout_id: Uuid, updated_at: OffsetDateTime) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query("UPDATE workouts SET updated_at = $2 WHERE workout_id = $1")
		.bind(workout_id)
		.bind(updated_at)
		.execute(executor)
		.await?;

	Ok(())
}

pub async fn rate_workout<'e, E>(
	executor: E,
	user_id: Uuid,
	workout_id: Uuid,
	rating: i16,
	rated_at: OffsetDateTime,
) -> Result<Option<Workout>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
UPDATE workouts
SET rating = $3, rated_at = $4, updated_at = $4
WHERE user_id = $1 AND workout_id = $2
RETURNING {WORKOUT_COLUMNS}"
	);
	let row = sqlx::query_as::<_, Workout>(&sql)
		.bind(user_id)
		.bind(workout_id)
		.bind(rating)
		.bind(rated_at)
		.fetch_optional(executor)
		.await
		.map_err(|err| Error::from_write(err, "Workout rating"))?;

	Ok(row)
}

pub async fn delete_workout<'e, E>(executor: E, user_id: Uuid, workout_id: Uuid) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM workouts WHERE user_id = $1 AND workout_id = $2")
		.bind(user_id)
		.bind(workout_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}
