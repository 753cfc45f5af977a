//! Chat-completion client for workout plan generation.

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value, json};

use crate::{Error, Result};

const SYSTEM_PROMPT: &str = "\
You are a strength coach. Reply with a single JSON object and nothing else. Shape: \
{\"name\": string, \"exercises\": [{\"name\": string, \"sets\": integer, \"reps\": string, \
\"rest_seconds\": integer, \"weight_recommendation\": string, \"notes\": string, \
\"primary_muscles\": [string], \"secondary_muscles\": [string]}]}. Use common exercise names.";

/// What the user asked for. Both fields are already sanitized by the caller.
#[derive(Clone, Debug)]
pub struct PlanRequest {
	pub goal: String,
	pub special_instructions: Option<String>,
}

pub fn build_messages(request: &PlanRequest) -> Vec<Value> {
	let mut user = format!("Goal: {}", request.goal);

	if let Some(instructions) = request.special_instructions.as_deref() {
		user.push_str("\nSpecial instructions: ");
		user.push_str(instructions);
	}

	vec![json!({ "role": "system", "content": SYSTEM_PROMPT }), json!({ "role": "user", "content": user })]
}

/// Sends one request and returns the plan object from the first choice.
pub async fn generate(cfg: &liftlog_config::LlmProviderConfig, request: &PlanRequest) -> Result<Value> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"response_format": { "type": "json_object" },
		"messages": build_messages(request),
	});
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_plan_json(json)
}

fn parse_plan_json(json: Value) -> Result<Value> {
	if let Some(content) = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
	{
		let parsed: Value = serde_json::from_str(strip_code_fence(content)).map_err(|_| {
			Error::InvalidResponse { message: "Plan content is not valid JSON.".to_string() }
		})?;

		if !parsed.is_object() {
			return Err(Error::InvalidResponse {
				message: "Plan content is not a JSON object.".to_string(),
			});
		}

		return Ok(parsed);
	}

	// Some gateways return the object directly instead of a chat envelope.
	if json.get("exercises").is_some() {
		return Ok(json);
	}

	Err(Error::InvalidResponse { message: "Plan response is missing JSON content.".to_string() })
}

fn strip_code_fence(content: &str) -> &str {
	let trimmed = content.trim();
	let Some(rest) = trimmed.strip_prefix("```") else {
		return trimmed;
	};
	let rest = rest.strip_prefix("json").unwrap_or(rest);

	rest.strip_suffix("```").unwrap_or(rest).trim()
}
