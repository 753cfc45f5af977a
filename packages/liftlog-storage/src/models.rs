use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Measurement {
	pub measurement_id: Uuid,
	pub user_id: Uuid,
	pub metric: String,
	pub value: f64,
	pub unit: String,
	pub measured_at: OffsetDateTime,
	pub source: String,
	pub confidence: Option<f64>,
	pub notes: Option<String>,
	pub image_url: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MetricDefinition {
	pub metric_key: String,
	pub display_name: String,
	pub default_unit: Option<String>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Exercise {
	pub exercise_id: Uuid,
	pub name: String,
	pub primary_muscles: Vec<String>,
	pub secondary_muscles: Vec<String>,
	pub equipment: Option<String>,
	pub movement_type: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Workout {
	pub workout_id: Uuid,
	pub user_id: Uuid,
	pub name: String,
	pub special_instructions: Option<String>,
	pub muscle_focus: Vec<String>,
	pub muscle_groups_targeted: String,
	pub source: String,
	pub rating: Option<i16>,
	pub rated_at: Option<OffsetDateTime>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

/// One exercise slot inside a workout. Muscles are copied from the catalog entry when the slot
/// is created so the workout's focus can be recomputed without the catalog.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkoutExercise {
	pub workout_exercise_id: Uuid,
	pub workout_id: Uuid,
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

/// Optional filters for catalog listing. Empty strings are treated as absent by callers.
#[derive(Debug, Clone, Default)]
pub struct ExerciseFilter {
	pub muscle: Option<String>,
	pub equipment: Option<String>,
	pub movement_type: Option<String>,
}
