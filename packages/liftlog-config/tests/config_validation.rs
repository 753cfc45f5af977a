use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use liftlog_config::{Config, Error, QueryPolicy};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with<F>(edit: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");

	edit(root);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn section<'a>(root: &'a mut toml::Table, name: &str) -> &'a mut toml::Table {
	root.get_mut(name)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Template config must include [{name}]."))
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("liftlog_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> liftlog_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = liftlog_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

#[test]
fn liftlog_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../liftlog.example.toml");

	liftlog_config::load(&path).expect("Expected liftlog.example.toml to be a valid config.");
}

#[test]
fn http_bind_must_be_loopback_when_localhost_only() {
	let payload = sample_toml_with(|root| {
		section(root, "service")
			.insert("http_bind".to_string(), Value::String("0.0.0.0:8080".to_string()));
	});
	let err = load_payload(payload).expect_err("Expected loopback validation error.");

	assert!(
		err.to_string().contains("service.http_bind must be a loopback address"),
		"Unexpected error: {err}"
	);
}

#[test]
fn admin_bind_must_parse_as_socket_address() {
	let payload = sample_toml_with(|root| {
		section(root, "service")
			.insert("admin_bind".to_string(), Value::String("localhost".to_string()));
	});
	let err = load_payload(payload).expect_err("Expected bind parse error.");

	assert!(
		matches!(err, Error::InvalidBind { field: "service.admin_bind", .. }),
		"Unexpected error: {err}"
	);
}

#[test]
fn missing_query_section_uses_default_policy() {
	let payload = sample_toml_with(|root| {
		root.remove("query");
	});
	let cfg = load_payload(payload).expect("Expected config without [query] to load.");

	assert_eq!(cfg.query, QueryPolicy { stale_time_secs: 300, gc_time_secs: 600 });
}

#[test]
fn stale_time_cannot_exceed_gc_time() {
	let mut cfg = base_config();

	cfg.query.stale_time_secs = 900;
	cfg.query.gc_time_secs = 600;

	let err = liftlog_config::validate(&cfg).expect_err("Expected query policy error.");

	assert!(
		err.to_string().contains("query.stale_time_secs must not exceed query.gc_time_secs."),
		"Unexpected error: {err}"
	);
}

#[test]
fn auth_keys_are_required() {
	let mut cfg = base_config();

	cfg.security.auth_keys.clear();

	let err = liftlog_config::validate(&cfg).expect_err("Expected auth key error.");

	assert!(
		err.to_string().contains("security.auth_keys must contain at least one key."),
		"Unexpected error: {err}"
	);
}

#[test]
fn auth_key_tokens_must_be_unique() {
	let mut cfg = base_config();
	let mut duplicate = cfg.security.auth_keys[0].clone();

	duplicate.token_id = "second".to_string();

	cfg.security.auth_keys.push(duplicate);

	let err = liftlog_config::validate(&cfg).expect_err("Expected duplicate token error.");

	assert!(
		err.to_string().contains("security.auth_keys[1].token is duplicated."),
		"Unexpected error: {err}"
	);
}

#[test]
fn blank_auth_token_is_rejected_after_normalization() {
	let payload = sample_toml_with(|root| {
		let security = section(root, "security");
		let keys = security
			.get_mut("auth_keys")
			.and_then(Value::as_array_mut)
			.expect("Template config must include [[security.auth_keys]].");
		let first = keys[0].as_table_mut().expect("Auth key must be a table.");

		first.insert("token".to_string(), Value::String("   ".to_string()));
	});
	let err = load_payload(payload).expect_err("Expected blank token error.");

	assert!(
		err.to_string().contains("security.auth_keys[0].token must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn plan_generator_temperature_must_be_in_range() {
	let mut cfg = base_config();

	cfg.providers.plan_generator.temperature = 3.5;

	let err = liftlog_config::validate(&cfg).expect_err("Expected temperature error.");

	assert!(
		err.to_string()
			.contains("providers.plan_generator.temperature must be in the range 0.0-2.0."),
		"Unexpected error: {err}"
	);
}

#[test]
fn plan_generator_api_base_trailing_slash_is_trimmed() {
	let payload = sample_toml_with(|root| {
		let providers = section(root, "providers");
		let plan = providers
			.get_mut("plan_generator")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [providers.plan_generator].");

		plan.insert("api_base".to_string(), Value::String("https://llm.local/v1/".to_string()));
	});
	let cfg = load_payload(payload).expect("Expected config to load.");

	assert_eq!(cfg.providers.plan_generator.api_base, "https://llm.local/v1");
}
