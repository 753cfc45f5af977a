//! Catalog maintenance. Exposed only on the loopback admin listener.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, ExerciseItem, LiftlogService, Result};
use liftlog_domain::{measurement, muscle_focus::MuscleSource, workout::MovementType};
use liftlog_storage::{
	catalog,
	models::{Exercise, MetricDefinition},
};

const MAX_EXERCISE_NAME_CHARS: usize = 100;

/// A catalog entry. Muscle fields accept the same legacy shapes as stored exercise records.
#[derive(Clone, Debug, Deserialize)]
pub struct ExerciseInput {
	pub name: String,
	#[serde(flatten)]
	pub muscles: MuscleSource,
	#[serde(default)]
	pub equipment: Option<String>,
	pub movement_type: MovementType,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MetricDefinitionInput {
	pub metric_key: String,
	pub display_name: String,
	#[serde(default)]
	pub default_unit: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MetricDefinitionItem {
	pub metric_key: String,
	pub display_name: String,
	pub default_unit: Option<String>,
}

impl LiftlogService {
	/// Inserts or updates catalog entries by name in one transaction.
	pub async fn upsert_exercises(&self, entries: Vec<ExerciseInput>) -> Result<Vec<ExerciseItem>> {
		if entries.is_empty() {
			return Err(Error::invalid("At least one exercise is required."));
		}

		let now = OffsetDateTime::now_utc();
		let rows = entries
			.into_iter()
			.enumerate()
			.map(|(idx, entry)| exercise_row(idx, entry, now))
			.collect::<Result<Vec<_>>>()?;
		let mut tx = self.db.pool.begin().await?;
		let mut out = Vec::with_capacity(rows.len());

		for row in &rows {
			out.push(catalog::upsert_exercise(&mut *tx, row).await?.into());
		}

		tx.commit().await?;

		tracing::info!(count = out.len(), "Upserted catalog exercises.");

		Ok(out)
	}

	pub async fn upsert_metrics(
		&self,
		definitions: Vec<MetricDefinitionInput>,
	) -> Result<Vec<MetricDefinitionItem>> {
		if definitions.is_empty() {
			return Err(Error::invalid("At least one metric definition is required."));
		}

		let now = OffsetDateTime::now_utc();
		let mut rows = Vec::with_capacity(definitions.len());

		for (idx, input) in definitions.into_iter().enumerate() {
			let metric_key = input.metric_key.trim();
			let display_name = input.display_name.trim();

			if !measurement::is_valid_metric_key(metric_key) {
				return Err(Error::invalid(format!("metrics[{idx}].metric_key is not a valid key.")));
			}
			if display_name.is_empty() {
				return Err(Error::invalid(format!("metrics[{idx}].display_name must be non-empty.")));
			}

			rows.push(MetricDefinition {
				metric_key: metric_key.to_string(),
				display_name: display_name.to_string(),
				default_unit: input
					.default_unit
					.map(|unit| unit.trim().to_string())
					.filter(|unit| !unit.is_empty()),
				created_at: now,
				updated_at: now,
			});
		}

		let mut tx = self.db.pool.begin().await?;
		let mut out = Vec::with_capacity(rows.len());

		for row in &rows {
			let stored = catalog::upsert_metric_definition(&mut *tx, row).await?;

			out.push(MetricDefinitionItem {
				metric_key: stored.metric_key,
				display_name: stored.display_name,
				default_unit: stored.default_unit,
			});
		}

		tx.commit().await?;

		tracing::info!(count = out.len(), "Upserted metric definitions.");

		Ok(out)
	}
}

fn exercise_row(idx: usize, entry: ExerciseInput, now: OffsetDateTime) -> Result<Exercise> {
	let name = entry.name.trim();

	if name.is_empty() || name.chars().count() > MAX_EXERCISE_NAME_CHARS {
		return Err(Error::invalid(format!(
			"exercises[{idx}].name must be between 1 and {MAX_EXERCISE_NAME_CHARS} characters."
		)));
	}

	Ok(Exercise {
		exercise_id: Uuid::new_v4(),
		name: name.to_string(),
		primary_muscles: dedup(entry.muscles.primary()),
		secondary_muscles: dedup(entry.muscles.secondary()),
		equipment: entry.equipment.map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty()),
		movement_type: entry.movement_type.as_str().to_string(),
		created_at: now,
		updated_at: now,
	})
}

fn dedup(mut muscles: Vec<String>) -> Vec<String> {
	let mut seen = std::collections::HashSet::new();

	muscles.retain(|muscle| seen.insert(muscle.clone()));

	muscles
}
