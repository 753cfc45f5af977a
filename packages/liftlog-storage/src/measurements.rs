use sqlx::PgExecutor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, models::Measurement};

const MEASUREMENT_COLUMNS: &str = "\
measurement_id, user_id, metric, value, unit, measured_at, source, confidence, notes, image_url, \
created_at, updated_at";

pub async fn insert_measurement<'e, E>(executor: E, measurement: &Measurement) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO measurements (
	measurement_id,
	user_id,
	metric,
	value,
	unit,
	measured_at,
	source,
	confidence,
	notes,
	image_url,
	created_at,
	updated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)",
	)
	.bind(measurement.measurement_id)
	.bind(measurement.user_id)
	.bind(measurement.metric.as_str())
	.bind(measurement.value)
	.bind(measurement.unit.as_str())
	.bind(measurement.measured_at)
	.bind(measurement.source.as_str())
	.bind(measurement.confidence)
	.bind(measurement.notes.as_deref())
	.bind(measurement.image_url.as_deref())
	.bind(measurement.created_at)
	.bind(measurement.updated_at)
	.execute(executor)
	.await
	.map_err(|err| Error::from_write(err, "Measurement"))?;

	Ok(())
}

/// Newest first. Rows recorded at the same instant fall back to insertion order, newest first.
pub async fn list_for_metric<'e, E>(
	executor: E,
	user_id: Uuid,
	metric: &str,
) -> Result<Vec<Measurement>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"SELECT {MEASUREMENT_COLUMNS} FROM measurements WHERE user_id = $1 AND metric = $2 \
		 ORDER BY measured_at DESC, created_at DESC"
	);
	let rows = sqlx::query_as::<_, Measurement>(&sql)
		.bind(user_id)
		.bind(metric)
		.fetch_all(executor)
		.await?;

	Ok(rows)
}

pub async fn list_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Measurement>>
where
	E: PgExecutor<'e>,
{
	let sql = format!(
		"SELECT {MEASUREMENT_COLUMNS} FROM measurements WHERE user_id = $1 \
		 ORDER BY metric, measured_at"
	);
	let rows = sqlx::query_as::<_, Measurement>(&sql).bind(user_id).fetch_all(executor).await?;

	Ok(rows)
}

/// Applies an edit to `value` and/or `notes`. `None` leaves a column untouched; `clear_notes`
/// sets notes to NULL.
pub async fn update_measurement<'e, E>(
	executor: E,
	user_id: Uuid,
	measurement_id: Uuid,
	edit: MeasurementEdit<'_>,
) -> Result<Option<Measurement>>
where
	E: PgExecutor<'e>,
{
	let MeasurementEdit { value, notes, clear_notes, updated_at } = edit;
	let sql = format!(
		"\
UPDATE measurements
SET
	value = COALESCE($3, value),
	notes = CASE WHEN $5 THEN NULL ELSE COALESCE($4, notes) END,
	updated_at = $6
WHERE user_id = $1 AND measurement_id = $2
RETURNING {MEASUREMENT_COLUMNS}"
	);
	let row = sqlx::query_as::<_, Measurement>(&sql)
		.bind(user_id)
		.bind(measurement_id)
		.bind(value)
		.bind(notes)
		.bind(clear_notes)
		.bind(updated_at)
		.fetch_optional(executor)
		.await?;

	Ok(row)
}

pub async fn delete_measurement<'e, E>(executor: E, user_id: Uuid, measurement_id: Uuid) -> Result<bool>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM measurements WHERE user_id = $1 AND measurement_id = $2")
		.bind(user_id)
		.bind(measurement_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub struct MeasurementEdit<'a> {
	pub value: Option<f64>,
	pub notes: Option<&'a str>,
	pub clear_notes: bool,
	pub updated_at: OffsetDateTime,
}
