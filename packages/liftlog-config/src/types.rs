use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub security: Security,
	#[serde(default)]
	pub query: QueryPolicy,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub plan_generator: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	#[serde(default)]
	pub auth_keys: Vec<SecurityAuthKey>,
}

/// Static bearer token bound to one user account.
#[derive(Debug, Deserialize, Clone)]
pub struct SecurityAuthKey {
	pub token_id: String,
	pub token: String,
	pub user_id: Uuid,
}

/// Freshness window advertised for read endpoints.
///
/// Passed by value into every retrieval call site instead of living in shared mutable state.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct QueryPolicy {
	/// Seconds a response may be served from a client cache without revalidation.
	pub stale_time_secs: u64,
	/// Seconds a stale response may still be kept around while it is revalidated.
	pub gc_time_secs: u64,
}
impl Default for QueryPolicy {
	fn default() -> Self {
		Self { stale_time_secs: 300, gc_time_secs: 600 }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}
