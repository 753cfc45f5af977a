mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, LlmProviderConfig, Postgres, Providers, QueryPolicy, SecurityAuthKey, Security,
	Service, Storage,
};

use std::{collections::HashSet, fs, net::SocketAddr, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	let http_addr = parse_bind("service.http_bind", &cfg.service.http_bind)?;
	let admin_addr = parse_bind("service.admin_bind", &cfg.service.admin_bind)?;

	if cfg.security.bind_localhost_only && !http_addr.ip().is_loopback() {
		return Err(Error::Validation {
			message: "service.http_bind must be a loopback address when security.bind_localhost_only is true."
				.to_string(),
		});
	}
	if !admin_addr.ip().is_loopback() {
		return Err(Error::Validation {
			message: "service.admin_bind must be a loopback address.".to_string(),
		});
	}
	if cfg.storage.postgres.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.postgres.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}

	let plan = &cfg.providers.plan_generator;

	for (label, value) in [
		("providers.plan_generator.provider_id", &plan.provider_id),
		("providers.plan_generator.api_base", &plan.api_base),
		("providers.plan_generator.api_key", &plan.api_key),
		("providers.plan_generator.model", &plan.model),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !plan.temperature.is_finite() || !(0.0..=2.0).contains(&plan.temperature) {
		return Err(Error::Validation {
			message: "providers.plan_generator.temperature must be in the range 0.0-2.0."
				.to_string(),
		});
	}
	if plan.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.plan_generator.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if plan.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "providers.plan_generator.default_headers values must be strings."
				.to_string(),
		});
	}
	if cfg.security.auth_keys.is_empty() {
		return Err(Error::Validation {
			message: "security.auth_keys must contain at least one key.".to_string(),
		});
	}

	let mut token_ids = HashSet::new();
	let mut tokens = HashSet::new();

	for (idx, key) in cfg.security.auth_keys.iter().enumerate() {
		if key.token_id.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("security.auth_keys[{idx}].token_id must be non-empty."),
			});
		}
		if key.token.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("security.auth_keys[{idx}].token must be non-empty."),
			});
		}
		if !token_ids.insert(key.token_id.as_str()) {
			return Err(Error::Validation {
				message: format!("security.auth_keys[{idx}].token_id is duplicated."),
			});
		}
		if !tokens.insert(key.token.as_str()) {
			return Err(Error::Validation {
				message: format!("security.auth_keys[{idx}].token is duplicated."),
			});
		}
	}

	if cfg.query.gc_time_secs == 0 {
		return Err(Error::Validation {
			message: "query.gc_time_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.query.stale_time_secs > cfg.query.gc_time_secs {
		return Err(Error::Validation {
			message: "query.stale_time_secs must not exceed query.gc_time_secs.".to_string(),
		});
	}

	Ok(())
}

fn parse_bind(field: &'static str, raw: &str) -> Result<SocketAddr> {
	raw.trim().parse().map_err(|err| Error::InvalidBind { field, source: err })
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	let api_base = cfg.providers.plan_generator.api_base.trim().trim_end_matches('/');

	cfg.providers.plan_generator.api_base = api_base.to_string();

	for key in &mut cfg.security.auth_keys {
		key.token_id = key.token_id.trim().to_string();
		key.token = key.token.trim().to_string();
	}
}
