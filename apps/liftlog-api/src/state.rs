use std::sync::Arc;

use liftlog_service::LiftlogService;
use liftlog_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<LiftlogService>,
}
impl AppState {
	/// Connects to Postgres and brings the schema up to date before serving.
	pub async fn new(config: liftlog_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		Ok(Self::from_service(LiftlogService::new(config, db)))
	}

	pub fn from_service(service: LiftlogService) -> Self {
		Self { service: Arc::new(service) }
	}
}
