use sqlx::{PgExecutor, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{Exercise, ExerciseFilter, MetricDefinition},
};

const EXERCISE_COLUMNS: &str = "\
exercise_id, name, primary_muscles, secondary_muscles, equipment, movement_type, created_at, \
updated_at";

pub async fn get_metric_definition<'e, E>(
	executor: E,
	metric_key: &str,
) -> Result<Option<MetricDefinition>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, MetricDefinition>(
		"\
SELECT metric_key, display_name, default_unit, created_at, updated_at
FROM metric_definitions
WHERE metric_key = $1",
	)
	.bind(metric_key)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn list_metric_definitions<'e, E>(
	executor: E,
	metric_keys: &[String],
) -> Result<Vec<MetricDefinition>>
where
	E: PgExecutor<'e>,
{
	if metric_keys.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, MetricDefinition>(
		"\
SELECT metric_key, display_name, default_unit, created_at, updated_at
FROM metric_definitions
WHERE metric_key = ANY($1)",
	)
	.bind(metric_keys)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn upsert_metric_definition<'e, E>(
	executor: E,
	definition: &MetricDefinition,
) -> Result<MetricDefinition>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, MetricDefinition>(
		"\
INSERT INTO metric_definitions (metric_key, display_name, default_unit, created_at, updated_at)
VALUES ($1,$2,$3,$4,$5)
ON CONFLICT (metric_key) DO UPDATE
SET
	display_name = EXCLUDED.display_name,
	default_unit = EXCLUDED.default_unit,
	updated_at = EXCLUDED.updated_at
RETURNING metric_key, display_name, default_unit, created_at, updated_at",
	)
	.bind(definition.metric_key.as_str())
	.bind(definition.display_name.as_str())
	.bind(definition.default_unit.as_deref())
	.bind(definition.created_at)
	.bind(definition.updated_at)
	.fetch_one(executor)
	.await
	.map_err(|err| Error::from_write(err, "Metric definition"))?;

	Ok(row)
}

/// Inserts a catalog entry or updates the existing entry with the same name. The stored
/// `exercise_id` of an existing entry is kept.
pub async fn upsert_exercise<'e, E>(executor: E, exercise: &Exercise) -> Result<Exercise>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"\
INSERT INTO exercises (
	exercise_id,
	name,
	primary_muscles,
	secondary_muscles,
	equipment,
	movement_type,
	created_at,
	updated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
ON CONFLICT (name) DO UPDATE
SET
	primary_muscles = EXCLUDED.primary_muscles,
	secondary_muscles = EXCLUDED.secondary_muscles,
	equipment = EXCLUDED.equipment,
	movement_type = EXCLUDED.movement_type,
	updated_at = EXCLUDED.updated_at
RETURNING {EXERCISE_COLUMNS}"
	);
	let row = sqlx::query_as::<_, Exercise>(&sql)
		.bind(exercise.exercise_id)
		.bind(exercise.name.as_str())
		.bind(&exercise.primary_muscles)
		.bind(&exercise.secondary_muscles)
		.bind(exercise.equipment.as_deref())
		.bind(exercise.movement_type.as_str())
		.bind(exercise.created_at)
		.bind(exercise.updated_at)
		.fetch_one(executor)
		.await
		.map_err(|err| Error::from_write(err, "Exercise"))?;

	Ok(row)
}

pub async fn list_exercises<'e, E>(executor: E, filter: &ExerciseFilter) -> Result<Vec<Exercise>>
where
	E: PgExecutor<'e>,
{
	let mut builder: QueryBuilder<'_, Postgres> =
		QueryBuilder::new(format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE TRUE"));

	if let Some(muscle) = filter.muscle.as_deref() {
		builder.push(" AND (");
		builder.push_bind(muscle.to_string());
		builder.push(" = ANY(primary_muscles) OR ");
		builder.push_bind(muscle.to_string());
		builder.push(" = ANY(secondary_muscles))");
	}
	if let Some(equipment) = filter.equipment.as_deref() {
		builder.push(" AND equipment = ");
		builder.push_bind(equipment.to_string());
	}
	if let Some(movement_type) = filter.movement_type.as_deref() {
		builder.push(" AND movement_type = ");
		builder.push_bind(movement_type.to_string());
	}

	builder.push(" ORDER BY name");

	let rows = builder.build_query_as::<Exercise>().fetch_all(executor).await?;

	Ok(rows)
}

pub async fn get_exercises_by_ids<'e, E>(executor: E, exercise_ids: &[Uuid]) -> Result<Vec<Exercise>>
where
	E: PgExecutor<'e>,
{
	if exercise_ids.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE exercise_id = ANY($1)");
	let rows = sqlx::query_as::<_, Exercise>(&sql).bind(exercise_ids).fetch_all(executor).await?;

	Ok(rows)
}

pub async fn get_exercises_by_names<'e, E>(executor: E, names: &[String]) -> Result<Vec<Exercise>>
where
	E: PgExecutor<'e>,
{
	if names.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE lower(name) = ANY($1)");
	let lowered: Vec<String> = names.iter().map(|name| name.to_lowercase()).collect();
	let rows = sqlx::query_as::<_, Exercise>(&sql).bind(lowered).fetch_all(executor).await?;

	Ok(rows)
}
