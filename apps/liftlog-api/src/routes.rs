use axum::{
	Json, Router,
	extract::{
		Path, Query, State,
		rejection::{JsonRejection, QueryRejection},
	},
	http::{HeaderMap, HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, patch, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::state::AppState;
use liftlog_config::QueryPolicy;
use liftlog_domain::measurement::{SortDirection, SortField, SortState};
use liftlog_service::{
	CreateMeasurementRequest, CreateWorkoutRequest, DeleteMeasurementResponse,
	DeleteWorkoutResponse, Error as ServiceError, ExerciseInput, ExerciseItem, ExercisesRequest,
	GeneratePlanRequest, MeasurementItem, MeasurementsRequest, MeasurementsResponse,
	MetricDefinitionInput, MetricDefinitionItem, MetricSummariesResponse, Principal,
	RateWorkoutRequest, ReorderExercisesRequest, UpdateMeasurementRequest, WorkoutDetail,
	WorkoutSummary,
};

const BEARER_PREFIX: &str = "Bearer ";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/measurements", post(create_measurement))
		.route("/v1/measurements/{metric}", get(list_measurements))
		.route(
			"/v1/measurements/by-id/{measurement_id}",
			patch(update_measurement).delete(delete_measurement),
		)
		.route("/v1/metrics/summaries", get(metric_summaries))
		.route("/v1/exercises", get(list_exercises))
		.route("/v1/workouts", get(list_workouts).post(create_workout))
		.route("/v1/workouts/{workout_id}", get(get_workout).delete(delete_workout))
		.route("/v1/workouts/{workout_id}/reorder", post(reorder_exercises))
		.route("/v1/workouts/{workout_id}/rating", post(rate_workout))
		.route("/v1/plans", post(generate_plan))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new()
		.route("/v1/admin/exercises", post(upsert_exercises))
		.route("/v1/admin/metrics", post(upsert_metrics))
		.with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct MeasurementsQuery {
	#[serde(default)]
	pub user_id: Option<Uuid>,
	#[serde(default)]
	pub sort: Option<SortField>,
	#[serde(default)]
	pub direction: Option<SortDirection>,
}
impl MeasurementsQuery {
	fn sort_state(&self) -> Option<SortState> {
		if self.sort.is_none() && self.direction.is_none() {
			return None;
		}

		Some(SortState::new(self.sort.unwrap_or_default(), self.direction.unwrap_or_default()))
	}
}

#[derive(Debug, Deserialize)]
pub struct UpsertExercisesBody {
	pub exercises: Vec<ExerciseInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertMetricsBody {
	pub metrics: Vec<MetricDefinitionInput>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn list_measurements(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(metric): Path<String>,
	query: Result<Query<MeasurementsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
	let principal = authenticate(&state, &headers)?;
	let Query(query) = query.map_err(|err| invalid_input(err.body_text()))?;
	let freshness = state.service.cfg.query;
	let req = MeasurementsRequest { metric, user_id: query.user_id, sort: query.sort_state() };
	let response: MeasurementsResponse =
		state.service.list_measurements(&principal, req, freshness).await?;

	Ok(cached(response.freshness, Json(response)))
}

async fn create_measurement(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<CreateMeasurementRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MeasurementItem>), ApiError> {
	let principal = authenticate(&state, &headers)?;
	let payload = json_body(payload)?;
	let response = state.service.create_measurement(&principal, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn update_measurement(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(measurement_id): Path<Uuid>,
	payload: Result<Json<UpdateMeasurementRequest>, JsonRejection>,
) -> Result<Json<MeasurementItem>, ApiError> {
	let principal = authenticate(&state, &headers)?;
	let payload = json_body(payload)?;
	let response = state.service.update_measurement(&principal, measurement_id, payload).await?;

	Ok(Json(response))
}

async fn delete_measurement(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(measurement_id): Path<Uuid>,
) -> Result<Json<DeleteMeasurementResponse>, ApiError> {
	let principal = authenticate(&state, &headers)?;
	let response = state.service.delete_measurement(&principal, measurement_id).await?;

	Ok(Json(response))
}

async fn metric_summaries(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Response, ApiError> {
	let principal = authenticate(&state, &headers)?;
	let freshness = state.service.cfg.query;
	let response: MetricSummariesResponse =
		state.service.metric_summaries(&principal, freshness).await?;

	Ok(cached(response.freshness, Json(response)))
}

async fn list_exercises(
	State(state): State<AppState>,
	headers: HeaderMap,
	query: Result<Query<ExercisesRequest>, QueryRejection>,
) -> Result<Json<Vec<ExerciseItem>>, ApiError> {
	authenticate(&state, &headers)?;

	let Query(query) = query.map_err(|err| invalid_input(err.body_text()))?;
	let response = state.service.list_exercises(query).await?;

	Ok(Json(response))
}

async fn list_workouts(
	State(state): State<AppState>,
	headers: HeaderMap,
) -> Result<Json<Vec<WorkoutSummary>>, ApiError> {
	let principal = authenticate(&state, &headers)?;
	let response = state.service.list_workouts(&principal).await?;

	Ok(Json(response))
}

async fn create_workout(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<CreateWorkoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkoutDetail>), ApiError> {
	let principal = authenticate(&state, &headers)?;
	let payload = json_body(payload)?;
	let response = state.service.create_workout(&principal, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn get_workout(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(workout_id): Path<Uuid>,
) -> Result<Json<WorkoutDetail>, ApiError> {
	let principal = authenticate(&state, &headers)?;
	let response = state.service.get_workout(&principal, workout_id).await?;

	Ok(Json(response))
}

async fn delete_workout(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(workout_id): Path<Uuid>,
) -> Result<Json<DeleteWorkoutResponse>, ApiError> {
	let principal = authenticate(&state, &headers)?;
	let response = state.service.delete_workout(&principal, workout_id).await?;

	Ok(Json(response))
}

async fn reorder_exercises(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(workout_id): Path<Uuid>,
	payload: Result<Json<ReorderExercisesRequest>, JsonRejection>,
) -> Result<Json<WorkoutDetail>, ApiError> {
	let principal = authenticate(&state, &headers)?;
	let payload = json_body(payload)?;
	let response = state.service.reorder_exercises(&principal, workout_id, payload).await?;

	Ok(Json(response))
}

async fn rate_workout(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(workout_id): Path<Uuid>,
	payload: Result<Json<RateWorkoutRequest>, JsonRejection>,
) -> Result<Json<WorkoutSummary>, ApiError> {
	let principal = authenticate(&state, &headers)?;
	let payload = json_body(payload)?;
	let response = state.service.rate_workout(&principal, workout_id, payload).await?;

	Ok(Json(response))
}

async fn generate_plan(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<GeneratePlanRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<WorkoutDetail>), ApiError> {
	let principal = authenticate(&state, &headers)?;
	let payload = json_body(payload)?;
	let response = state.service.generate_plan(&principal, payload).await?;

	Ok((StatusCode::CREATED, Json(response)))
}

async fn upsert_exercises(
	State(state): State<AppState>,
	payload: Result<Json<UpsertExercisesBody>, JsonRejection>,
) -> Result<Json<Vec<ExerciseItem>>, ApiError> {
	let payload = json_body(payload)?;
	let response = state.service.upsert_exercises(payload.exercises).await?;

	Ok(Json(response))
}

async fn upsert_metrics(
	State(state): State<AppState>,
	payload: Result<Json<UpsertMetricsBody>, JsonRejection>,
) -> Result<Json<Vec<MetricDefinitionItem>>, ApiError> {
	let payload = json_body(payload)?;
	let response = state.service.upsert_metrics(payload.metrics).await?;

	Ok(Json(response))
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
	Ok(state.service.authenticate(read_bearer_token(headers))?)
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(header::AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix(BEARER_PREFIX)?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError>
where
	T: DeserializeOwned,
{
	payload.map(|Json(body)| body).map_err(|err| invalid_input(err.body_text()))
}

fn invalid_input(message: String) -> ApiError {
	json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", message, None)
}

/// `private` because every cached body belongs to one user.
fn cache_control(policy: QueryPolicy) -> String {
	let revalidate = policy.gc_time_secs.saturating_sub(policy.stale_time_secs);

	format!(
		"private, max-age={}, stale-while-revalidate={revalidate}",
		policy.stale_time_secs
	)
}

fn cached(policy: QueryPolicy, body: impl IntoResponse) -> Response {
	let mut response = body.into_response();

	if let Ok(value) = HeaderValue::from_str(&cache_control(policy)) {
		response.headers_mut().insert(header::CACHE_CONTROL, value);
	}

	response
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::Unauthorized { message } =>
				json_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message, None),
			ServiceError::Forbidden { message } =>
				json_error(StatusCode::FORBIDDEN, "FORBIDDEN", message, None),
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", message, None),
			ServiceError::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "NOT_FOUND", message, None),
			ServiceError::Provider { message } => {
				tracing::error!(error = %message, "Plan provider request failed.");

				json_error(
					StatusCode::BAD_GATEWAY,
					"PROVIDER_ERROR",
					"The plan generator is unavailable.",
					None,
				)
			},
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Storage request failed.");

				json_error(
					StatusCode::INTERNAL_SERVER_ERROR,
					"INTERNAL_ERROR",
					"Internal error.",
					None,
				)
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
