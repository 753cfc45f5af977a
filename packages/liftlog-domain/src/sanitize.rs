//! Free-text cleanup applied to user input before it is persisted or forwarded to a model.
//!
//! Every query in the service binds its parameters; stripping SQL keywords here only keeps
//! stored text and generated prompts free of injection-looking noise.

use std::sync::LazyLock;

use regex::Regex;
use time::Date;

pub const MAX_INSTRUCTIONS_CHARS: usize = 140;
pub const MAX_WORKOUT_NAME_CHARS: usize = 100;
pub const MAX_NOTES_CHARS: usize = 500;

const ALLOWED_PUNCTUATION: [char; 11] = ['.', ',', '!', '?', '\'', '-', '"', ':', ';', '(', ')'];
const MAX_PUNCTUATION_RUN: usize = 2;

static PATTERNS: LazyLock<Option<Patterns>> = LazyLock::new(Patterns::compile);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldPolicy {
	WorkoutName,
	Instructions,
	Notes,
}
impl FieldPolicy {
	pub fn max_chars(self) -> usize {
		match self {
			Self::WorkoutName => MAX_WORKOUT_NAME_CHARS,
			Self::Instructions => MAX_INSTRUCTIONS_CHARS,
			Self::Notes => MAX_NOTES_CHARS,
		}
	}
}

struct Patterns {
	script_block: Regex,
	html_tag: Regex,
	disallowed_char: Regex,
	sql_keyword: Regex,
}
impl Patterns {
	fn compile() -> Option<Self> {
		Some(Self {
			script_block: Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").ok()?,
			html_tag: Regex::new(r"<[^>]*>").ok()?,
			// Unicode word characters, which keeps combining marks with their base letter.
			disallowed_char: Regex::new(r#"[^\w\s.,!?'\-":;()]"#).ok()?,
			sql_keyword: Regex::new(
				r"(?i)\b(?:SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|EXECUTE|EXEC)\b",
			)
			.ok()?,
		})
	}
}

/// Cleans `input` for the given field. The result may be empty.
///
/// Passes repeat until the text stops changing, so sanitizing an already sanitized string
/// returns it unchanged. Each pass only removes characters, which bounds the loop.
pub fn sanitize(input: &str, policy: FieldPolicy) -> String {
	let max_chars = policy.max_chars();
	let mut current = clean_once(input, max_chars);

	loop {
		let next = clean_once(&current, max_chars);

		if next == current {
			return current;
		}

		current = next;
	}
}

/// Returns `None` when the input is missing or nothing survives cleanup.
pub fn sanitize_optional(input: Option<&str>, policy: FieldPolicy) -> Option<String> {
	let cleaned = sanitize(input?, policy);

	if cleaned.is_empty() { None } else { Some(cleaned) }
}

pub fn sanitize_instructions(input: Option<&str>) -> Option<String> {
	sanitize_optional(input, FieldPolicy::Instructions)
}

pub fn sanitize_notes(input: Option<&str>) -> Option<String> {
	sanitize_optional(input, FieldPolicy::Notes)
}

/// Workout names never come back empty; they fall back to a dated default.
pub fn sanitize_workout_name(input: Option<&str>, today: Date) -> String {
	sanitize_optional(input, FieldPolicy::WorkoutName)
		.unwrap_or_else(|| default_workout_name(today))
}

/// `Workout Oct 16, 2026`. Only whitelisted characters, so the name survives re-sanitizing.
pub fn default_workout_name(date: Date) -> String {
	let month: String = date.month().to_string().chars().take(3).collect();

	format!("Workout {month} {}, {}", date.day(), date.year())
}

fn clean_once(input: &str, max_chars: usize) -> String {
	let mut text = input.to_string();

	if let Some(patterns) = PATTERNS.as_ref() {
		text = patterns.script_block.replace_all(&text, "").into_owned();
		text = patterns.html_tag.replace_all(&text, "").into_owned();
		text = patterns.disallowed_char.replace_all(&text, "").into_owned();
		text = patterns.sql_keyword.replace_all(&text, "").into_owned();
	} else {
		text.retain(is_allowed_char);
	}

	let collapsed = collapse_punctuation_runs(&text);

	truncate_chars(collapsed.trim(), max_chars).trim_end().to_string()
}

fn is_allowed_char(ch: char) -> bool {
	ch.is_alphanumeric() || ch == '_' || ch.is_whitespace() || ALLOWED_PUNCTUATION.contains(&ch)
}

fn collapse_punctuation_runs(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	let mut run_char = None;
	let mut run_len = 0;

	for ch in input.chars() {
		if run_char == Some(ch) {
			run_len += 1;
		} else {
			run_char = Some(ch);
			run_len = 1;
		}

		if ALLOWED_PUNCTUATION.contains(&ch) && run_len > MAX_PUNCTUATION_RUN {
			continue;
		}

		out.push(ch);
	}

	out
}

fn truncate_chars(input: &str, max_chars: usize) -> &str {
	match input.char_indices().nth(max_chars) {
		Some((idx, _)) => &input[..idx],
		None => input,
	}
}

#[cfg(test)]
mod tests {
	use time::macros::date;

	use super::*;

	#[test]
	fn strips_tags_and_script_blocks() {
		let cleaned =
			sanitize("<b>Leg</b> day<script>alert('x')</script> finisher", FieldPolicy::Notes);

		assert_eq!(cleaned, "Leg day finisher");
	}

	#[test]
	fn strips_sql_keywords_case_insensitively() {
		let cleaned = sanitize("Drop sets; then select heavier weight", FieldPolicy::Notes);

		assert_eq!(cleaned, "sets; then  heavier weight");
	}

	#[test]
	fn keeps_words_that_merely_contain_keywords() {
		let cleaned = sanitize("Selected updates dropped", FieldPolicy::Notes);

		assert_eq!(cleaned, "Selected updates dropped");
	}

	#[test]
	fn removes_characters_outside_the_whitelist() {
		let cleaned = sanitize("Bench @ 80kg #PR {fast} ~ 5x5", FieldPolicy::Notes);

		assert_eq!(cleaned, "Bench  80kg PR fast  5x5");
	}

	#[test]
	fn keeps_combining_marks_and_non_latin_words() {
		let decomposed = "Cafe\u{301} squat";

		assert_eq!(sanitize(decomposed, FieldPolicy::WorkoutName), decomposed);
		assert_eq!(sanitize("Жим лёжа 💪", FieldPolicy::WorkoutName), "Жим лёжа");
		assert_eq!(sanitize("snake_case_name", FieldPolicy::WorkoutName), "snake_case_name");
	}

	#[test]
	fn collapses_repeated_punctuation() {
		let cleaned = sanitize("Go!!!!! Really??? ok...", FieldPolicy::Notes);

		assert_eq!(cleaned, "Go!! Really?? ok..");
	}

	#[test]
	fn alternating_punctuation_is_not_a_run() {
		assert_eq!(sanitize("!?!?!?", FieldPolicy::Notes), "!?!?!?");
	}

	#[test]
	fn truncates_to_field_limits() {
		let long = "a".repeat(1_000);

		assert_eq!(sanitize(&long, FieldPolicy::Instructions).chars().count(), 140);
		assert_eq!(sanitize(&long, FieldPolicy::WorkoutName).chars().count(), 100);
		assert_eq!(sanitize(&long, FieldPolicy::Notes).chars().count(), 500);
	}

	#[test]
	fn truncation_that_exposes_a_keyword_is_cleaned_again() {
		let input = format!("{} SELECTED", "a".repeat(133));
		let once = sanitize(&input, FieldPolicy::Instructions);

		assert_eq!(sanitize(&once, FieldPolicy::Instructions), once);
		assert!(!once.ends_with("SELECT"));
	}

	#[test]
	fn empty_optional_fields_become_none() {
		assert_eq!(sanitize_instructions(None), None);
		assert_eq!(sanitize_instructions(Some("   ")), None);
		assert_eq!(sanitize_notes(Some("<p></p>")), None);
		assert_eq!(sanitize_notes(Some(" keep elbows tucked ")), Some("keep elbows tucked".into()));
	}

	#[test]
	fn workout_name_falls_back_to_dated_default() {
		let today = date!(2026 - 10 - 16);

		assert_eq!(sanitize_workout_name(Some("<i></i>"), today), "Workout Oct 16, 2026");
		assert_eq!(sanitize_workout_name(None, today), "Workout Oct 16, 2026");
		assert_eq!(sanitize_workout_name(Some("Push Day"), today), "Push Day");
	}

	#[test]
	fn default_workout_name_is_stable_under_sanitize() {
		let name = default_workout_name(date!(2024 - 03 - 05));

		assert_eq!(sanitize(&name, FieldPolicy::WorkoutName), name);
	}
}
