use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, LiftlogService, Principal, Result, auth};
use liftlog_config::QueryPolicy;
use liftlog_domain::{
	measurement::{self, MeasurementPoint, MeasurementSource, MetricSummary, SortState},
	muscle_focus, sanitize,
};
use liftlog_storage::{
	catalog,
	measurements::{self as store, MeasurementEdit},
	models::Measurement,
};

const MAX_UNIT_CHARS: usize = 16;

#[derive(Clone, Debug, Deserialize)]
pub struct MeasurementsRequest {
	pub metric: String,
	/// Optional explicit owner. Must match the caller when present.
	#[serde(default)]
	pub user_id: Option<Uuid>,
	#[serde(default)]
	pub sort: Option<SortState>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MeasurementItem {
	pub measurement_id: Uuid,
	pub metric: String,
	pub value: f64,
	pub unit: String,
	#[serde(with = "time::serde::rfc3339")]
	pub measured_at: OffsetDateTime,
	pub source: String,
	pub confidence: Option<f64>,
	pub notes: Option<String>,
	pub image_url: Option<String>,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl MeasurementPoint for MeasurementItem {
	fn measured_at(&self) -> OffsetDateTime {
		self.measured_at
	}

	fn value(&self) -> f64 {
		self.value
	}

	fn unit(&self) -> &str {
		&self.unit
	}
}
impl From<Measurement> for MeasurementItem {
	fn from(row: Measurement) -> Self {
		Self {
			measurement_id: row.measurement_id,
			metric: row.metric,
			value: row.value,
			unit: row.unit,
			measured_at: row.measured_at,
			source: row.source,
			confidence: row.confidence,
			notes: row.notes,
			image_url: row.image_url,
			created_at: row.created_at,
			updated_at: row.updated_at,
		}
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct MeasurementsResponse {
	pub metric: String,
	pub display_name: String,
	pub sort: SortState,
	pub items: Vec<MeasurementItem>,
	/// Freshness window the caller should advertise for this response.
	#[serde(skip)]
	pub freshness: QueryPolicy,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateMeasurementRequest {
	pub metric: String,
	pub value: f64,
	pub unit: String,
	#[serde(default, with = "time::serde::rfc3339::option")]
	pub measured_at: Option<OffsetDateTime>,
	#[serde(default)]
	pub source: Option<MeasurementSource>,
	#[serde(default)]
	pub confidence: Option<f64>,
	#[serde(default)]
	pub notes: Option<String>,
	#[serde(default)]
	pub image_url: Option<String>,
}

/// Only `value` and `notes` are editable. Notes that clean up to nothing clear the column.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateMeasurementRequest {
	#[serde(default)]
	pub value: Option<f64>,
	#[serde(default)]
	pub notes: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct DeleteMeasurementResponse {
	pub measurement_id: Uuid,
	pub deleted: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct MetricSummariesResponse {
	pub summaries: Vec<MetricSummary>,
	#[serde(skip)]
	pub freshness: QueryPolicy,
}

impl LiftlogService {
	/// Every measurement the caller owns for one metric, newest first unless `sort` says
	/// otherwise.
	///
	/// A metric with no records, known to the catalog or not, yields an empty list rather than
	/// `NotFound`.
	pub async fn list_measurements(
		&self,
		principal: &Principal,
		req: MeasurementsRequest,
		freshness: QueryPolicy,
	) -> Result<MeasurementsResponse> {
		auth::ensure_owner(principal, req.user_id)?;

		let metric = req.metric.trim();

		validate_metric_key(metric)?;

		let rows = store::list_for_metric(&self.db.pool, principal.user_id, metric).await?;
		let display_name = catalog::get_metric_definition(&self.db.pool, metric)
			.await?
			.map(|definition| definition.display_name)
			.unwrap_or_else(|| measurement::metric_display_label(metric));
		let items: Vec<MeasurementItem> = rows.into_iter().map(MeasurementItem::from).collect();
		let sort = req.sort.unwrap_or_default();
		let items = measurement::sort_measurements(&items, sort);

		Ok(MeasurementsResponse {
			metric: metric.to_string(),
			display_name,
			sort,
			items,
			freshness,
		})
	}

	pub async fn create_measurement(
		&self,
		principal: &Principal,
		req: CreateMeasurementRequest,
	) -> Result<MeasurementItem> {
		let metric = req.metric.trim();

		validate_metric_key(metric)?;

		if !req.value.is_finite() {
			return Err(Error::invalid("value must be a finite number."));
		}

		let unit = req.unit.trim();

		if unit.is_empty() || unit.chars().count() > MAX_UNIT_CHARS {
			return Err(Error::invalid(format!(
				"unit must be between 1 and {MAX_UNIT_CHARS} characters."
			)));
		}
		if let Some(confidence) = req.confidence
			&& !(0.0..=1.0).contains(&confidence)
		{
			return Err(Error::invalid("confidence must be between 0.0 and 1.0."));
		}

		let now = OffsetDateTime::now_utc();
		let image_url =
			req.image_url.as_deref().map(str::trim).filter(|url| !url.is_empty()).map(str::to_string);
		let row = Measurement {
			measurement_id: Uuid::new_v4(),
			user_id: principal.user_id,
			metric: metric.to_string(),
			value: req.value,
			unit: unit.to_string(),
			measured_at: req.measured_at.unwrap_or(now),
			source: req.source.unwrap_or(MeasurementSource::Manual).as_str().to_string(),
			confidence: req.confidence,
			notes: sanitize::sanitize_notes(req.notes.as_deref()),
			image_url,
			created_at: now,
			updated_at: now,
		};

		store::insert_measurement(&self.db.pool, &row).await?;

		tracing::info!(measurement_id = %row.measurement_id, metric = %row.metric, "Recorded measurement.");

		Ok(row.into())
	}

	pub async fn update_measurement(
		&self,
		principal: &Principal,
		measurement_id: Uuid,
		req: UpdateMeasurementRequest,
	) -> Result<MeasurementItem> {
		if req.value.is_none() && req.notes.is_none() {
			return Err(Error::invalid("Provide value or notes to update."));
		}
		if let Some(value) = req.value
			&& !value.is_finite()
		{
			return Err(Error::invalid("value must be a finite number."));
		}

		let notes = req.notes.as_deref().map(|raw| sanitize::sanitize_notes(Some(raw)));
		let edit = MeasurementEdit {
			value: req.value,
			notes: notes.as_ref().and_then(|cleaned| cleaned.as_deref()),
			clear_notes: matches!(notes, Some(None)),
			updated_at: OffsetDateTime::now_utc(),
		};
		let row = store::update_measurement(&self.db.pool, principal.user_id, measurement_id, edit)
			.await?
			.ok_or_else(|| Error::not_found("Measurement not found."))?;

		Ok(row.into())
	}

	pub async fn delete_measurement(
		&self,
		principal: &Principal,
		measurement_id: Uuid,
	) -> Result<DeleteMeasurementResponse> {
		let deleted =
			store::delete_measurement(&self.db.pool, principal.user_id, measurement_id).await?;

		if !deleted {
			return Err(Error::not_found("Measurement not found."));
		}

		Ok(DeleteMeasurementResponse { measurement_id, deleted })
	}

	/// One summary per recorded metric, ordered by display name.
	pub async fn metric_summaries(
		&self,
		principal: &Principal,
		freshness: QueryPolicy,
	) -> Result<MetricSummariesResponse> {
		let rows = store::list_for_user(&self.db.pool, principal.user_id).await?;
		let mut by_metric: BTreeMap<String, Vec<MeasurementItem>> = BTreeMap::new();

		for row in rows {
			by_metric.entry(row.metric.clone()).or_default().push(row.into());
		}

		let keys: Vec<String> = by_metric.keys().cloned().collect();
		let names: BTreeMap<String, String> = catalog::list_metric_definitions(&self.db.pool, &keys)
			.await?
			.into_iter()
			.map(|definition| (definition.metric_key, definition.display_name))
			.collect();
		let mut summaries: Vec<MetricSummary> = by_metric
			.iter()
			.filter_map(|(metric, items)| {
				let display_name = names
					.get(metric)
					.cloned()
					.unwrap_or_else(|| measurement::metric_display_label(metric));

				measurement::summarize_metric(metric, &display_name, items)
			})
			.collect();

		summaries.sort_by(|a, b| {
			muscle_focus::compare_locale(&a.display_name, &b.display_name)
				.then_with(|| a.metric.cmp(&b.metric))
		});

		Ok(MetricSummariesResponse { summaries, freshness })
	}
}

fn validate_metric_key(metric: &str) -> Result<()> {
	if measurement::is_valid_metric_key(metric) {
		return Ok(());
	}

	Err(Error::invalid(format!(
		"metric must match [a-z0-9_]+ and be at most {} characters.",
		measurement::METRIC_KEY_MAX_CHARS
	)))
}
