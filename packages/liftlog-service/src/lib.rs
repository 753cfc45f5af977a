pub mod admin;
pub mod auth;
pub mod exercises;
pub mod measurements;
pub mod plans;
pub mod workouts;

mod error;

pub use admin::{ExerciseInput, MetricDefinitionInput, MetricDefinitionItem};
pub use auth::Principal;
pub use error::{Error, Result};
pub use exercises::{ExerciseItem, ExercisesRequest};
pub use measurements::{
	CreateMeasurementRequest, DeleteMeasurementResponse, MeasurementItem, MeasurementsRequest,
	MeasurementsResponse, MetricSummariesResponse, UpdateMeasurementRequest,
};
pub use plans::GeneratePlanRequest;
pub use workouts::{
	CreateWorkoutRequest, DeleteWorkoutResponse, RateWorkoutRequest, ReorderExercisesRequest,
	WorkoutDetail, WorkoutExerciseInput, WorkoutExerciseItem, WorkoutSummary,
};

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use liftlog_config::{Config, LlmProviderConfig};
use liftlog_providers::plan::{self, PlanRequest};
use liftlog_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait PlanProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a PlanRequest,
	) -> BoxFuture<'a, liftlog_providers::Result<Value>>;
}

#[derive(Clone)]
pub struct Providers {
	pub plan: Arc<dyn PlanProvider>,
}
impl Providers {
	pub fn new(plan: Arc<dyn PlanProvider>) -> Self {
		Self { plan }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { plan: Arc::new(HttpProviders) }
	}
}

pub struct LiftlogService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl LiftlogService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}
}

struct HttpProviders;
impl PlanProvider for HttpProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a PlanRequest,
	) -> BoxFuture<'a, liftlog_providers::Result<Value>> {
		Box::pin(plan::generate(cfg, request))
	}
}
