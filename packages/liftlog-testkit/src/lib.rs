//! Throwaway Postgres databases for integration tests.

mod error;

pub use error::{Error, Result};

use std::{env, str::FromStr};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

pub const DSN_ENV: &str = "LIFTLOG_PG_DSN";

const MAINTENANCE_DATABASE: &str = "postgres";

/// A `liftlog_test_*` database on the server behind `LIFTLOG_PG_DSN`.
///
/// Call [`TestDatabase::cleanup`] at the end of the test. A value dropped without cleanup
/// leaves the database behind and names it on stderr.
pub struct TestDatabase {
	name: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Failed to parse {DSN_ENV}: {err}.")))?;
		let maintenance = base.clone().database(MAINTENANCE_DATABASE);
		let name = format!("liftlog_test_{}", Uuid::new_v4().simple());
		let mut conn = PgConnection::connect_with(&maintenance).await?;

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;
		conn.close().await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	/// Drops the database, disconnecting any pool the test left open.
	pub async fn cleanup(mut self) -> Result<()> {
		let mut conn = PgConnection::connect_with(&self.maintenance).await?;

		conn.execute(format!(r#"DROP DATABASE IF EXISTS "{}" WITH (FORCE)"#, self.name).as_str())
			.await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if !self.dropped {
			eprintln!("Test database {} was not cleaned up.", self.name);
		}
	}
}

/// `LIFTLOG_PG_DSN`, or `None` when unset or blank so Postgres tests can skip.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok().filter(|dsn| !dsn.trim().is_empty())
}
