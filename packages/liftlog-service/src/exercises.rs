use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, LiftlogService, Result};
use liftlog_domain::workout::MovementType;
use liftlog_storage::{
	catalog,
	models::{Exercise, ExerciseFilter},
};

/// Catalog filters. Blank values are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExercisesRequest {
	#[serde(default)]
	pub muscle: Option<String>,
	#[serde(default)]
	pub equipment: Option<String>,
	#[serde(default)]
	pub movement_type: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ExerciseItem {
	pub exercise_id: Uuid,
	pub name: String,
	pub primary_muscles: Vec<String>,
	pub secondary_muscles: Vec<String>,
	pub equipment: Option<String>,
	pub movement_type: String,
}
impl From<Exercise> for ExerciseItem {
	fn from(row: Exercise) -> Self {
		Self {
			exercise_id: row.exercise_id,
			name: row.name,
			primary_muscles: row.primary_muscles,
			secondary_muscles: row.secondary_muscles,
			equipment: row.equipment,
			movement_type: row.movement_type,
		}
	}
}

impl LiftlogService {
	pub async fn list_exercises(&self, req: ExercisesRequest) -> Result<Vec<ExerciseItem>> {
		let filter = exercise_filter(req)?;
		let rows = catalog::list_exercises(&self.db.pool, &filter).await?;

		Ok(rows.into_iter().map(ExerciseItem::from).collect())
	}
}

fn exercise_filter(req: ExercisesRequest) -> Result<ExerciseFilter> {
	let movement_type = non_blank(req.movement_type);

	if let Some(raw) = movement_type.as_deref()
		&& MovementType::parse(raw).is_none()
	{
		return Err(Error::invalid("movement_type must be one of compound or isolation."));
	}

	Ok(ExerciseFilter {
		muscle: non_blank(req.muscle),
		equipment: non_blank(req.equipment),
		movement_type,
	})
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.map(|raw| raw.trim().to_string()).filter(|raw| !raw.is_empty())
}
