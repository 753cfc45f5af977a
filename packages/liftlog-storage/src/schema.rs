pub fn render_schema() -> String {
	let init = include_str!("../../../sql/init.sql");

	expand_includes(init)
}

fn expand_includes(sql: &str) -> String {
	let mut out = String::new();

	for line in sql.lines() {
		let trimmed = line.trim();

		if let Some(path) = trimmed.strip_prefix("\\ir ") {
			match path.trim() {
				"tables/001_metric_definitions.sql" =>
					out.push_str(include_str!("../../../sql/tables/001_metric_definitions.sql")),
				"tables/002_measurements.sql" =>
					out.push_str(include_str!("../../../sql/tables/002_measurements.sql")),
				"tables/003_exercises.sql" =>
					out.push_str(include_str!("../../../sql/tables/003_exercises.sql")),
				"tables/004_workouts.sql" =>
					out.push_str(include_str!("../../../sql/tables/004_workouts.sql")),
				"tables/005_workout_exercises.sql" =>
					out.push_str(include_str!("../../../sql/tables/005_workout_exercises.sql")),
				other => tracing::warn!(include = other, "Unknown schema include skipped."),
			}
		} else {
			out.push_str(line);
		}

		out.push('\n');
	}

	out
}

#[cfg(test)]
mod tests {
	use super::render_schema;

	#[test]
	fn includes_are_expanded() {
		let sql = render_schema();

		assert!(!sql.contains("\\ir "));

		for table in
			["metric_definitions", "measurements", "exercises", "workouts", "workout_exercises"]
		{
			assert!(
				sql.contains(&format!("CREATE TABLE IF NOT EXISTS {table} (")),
				"Missing table {table}."
			);
		}
	}
}
