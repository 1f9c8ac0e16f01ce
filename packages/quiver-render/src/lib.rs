//! Text-template rendering for query bodies and index-pattern fragments.
//!
//! Every render builds a fresh environment and re-parses the template text;
//! nothing is cached between executions, so there is no stale-template state
//! to invalidate.

use std::collections::BTreeMap;

use minijinja::{Environment, ErrorKind};
use time::{OffsetDateTime, format_description};

pub type Result<T, E = Error> = std::result::Result<T, E>;

const DEFAULT_DATE_FORMAT: &str = "[year]-[month]-[day]";

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Template failed to render: {detail}")]
	Render { detail: String },
}

/// Render a template against a bound parameter mapping.
///
/// `at` is the render instant used by the `now` template function. Both
/// renders of one execution (query body and index pattern) share a single
/// instant, so output is a pure function of (template, mapping, instant).
pub fn render(
	template: &str,
	params: &BTreeMap<String, String>,
	at: OffsetDateTime,
) -> Result<String> {
	let mut env = Environment::new();

	env.add_function("now", move |format: Option<String>| format_instant(at, format.as_deref()));

	env.render_str(template, params).map_err(|err| Error::Render { detail: describe(&err) })
}

fn format_instant(at: OffsetDateTime, format: Option<&str>) -> Result<String, minijinja::Error> {
	let description =
		format_description::parse(format.unwrap_or(DEFAULT_DATE_FORMAT)).map_err(|err| {
			minijinja::Error::new(
				ErrorKind::InvalidOperation,
				format!("invalid date format description: {err}"),
			)
		})?;

	at.format(&description).map_err(|err| {
		minijinja::Error::new(
			ErrorKind::InvalidOperation,
			format!("failed to format render instant: {err}"),
		)
	})
}

fn describe(err: &minijinja::Error) -> String {
	let mut detail = err.to_string();
	let mut source = std::error::Error::source(err);

	while let Some(cause) = source {
		detail.push_str(&format!("; {cause}"));

		source = std::error::Error::source(cause);
	}

	detail
}

#[cfg(test)]
mod tests {
	use super::*;

	use time::macros::datetime;

	fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
		pairs.iter().map(|(key, value)| (key.to_string(), value.to_string())).collect()
	}

	const AT: OffsetDateTime = datetime!(2020-06-15 12:30:00 UTC);

	#[test]
	fn substitutes_bound_parameters() {
		let rendered = render(r#"{"match":{"field":"{{ status }}"}}"#, &params(&[("status", "active")]), AT)
			.expect("render failed");

		assert_eq!(rendered, r#"{"match":{"field":"active"}}"#);
	}

	#[test]
	fn renders_index_pattern_fragments() {
		let rendered =
			render("-{{ year }}*", &params(&[("year", "2020")]), AT).expect("render failed");

		assert_eq!(rendered, "-2020*");
	}

	#[test]
	fn rendering_is_deterministic() {
		let template = r#"{{ name | upper }}-{{ now("[year]") }}"#;
		let mapping = params(&[("name", "daily")]);
		let first = render(template, &mapping, AT).expect("render failed");
		let second = render(template, &mapping, AT).expect("render failed");

		assert_eq!(first, second);
		assert_eq!(first, "DAILY-2020");
	}

	#[test]
	fn literal_text_renders_to_itself() {
		let rendered = render("-*", &params(&[]), AT).expect("render failed");

		assert_eq!(rendered, "-*");
	}

	#[test]
	fn supports_case_trim_and_default_filters() {
		let rendered = render(
			"{{ label | trim | lower }}/{{ missing | default('fallback') }}",
			&params(&[("label", "  MiXeD  ")]),
			AT,
		)
		.expect("render failed");

		assert_eq!(rendered, "mixed/fallback");
	}

	#[test]
	fn supports_loops_and_conditionals() {
		let template = "{% if flag == 'on' %}{% for part in items | split(',') %}[{{ part }}]{% endfor %}{% endif %}";
		let rendered =
			render(template, &params(&[("flag", "on"), ("items", "a,b,c")]), AT).expect("render failed");

		assert_eq!(rendered, "[a][b][c]");
	}

	#[test]
	fn now_formats_the_supplied_instant() {
		let rendered =
			render(r#"{{ now("[year]-[month]") }}"#, &params(&[]), AT).expect("render failed");

		assert_eq!(rendered, "2020-06");
	}

	#[test]
	fn now_defaults_to_date_format() {
		let rendered = render("{{ now() }}", &params(&[]), AT).expect("render failed");

		assert_eq!(rendered, "2020-06-15");
	}

	#[test]
	fn malformed_syntax_is_an_error() {
		let err = render("{% if %}", &params(&[]), AT).expect_err("Expected a render error.");

		assert!(err.to_string().contains("Template failed to render"));
	}

	#[test]
	fn unknown_function_is_an_error() {
		let err =
			render("{{ explode() }}", &params(&[]), AT).expect_err("Expected a render error.");

		assert!(err.to_string().contains("Template failed to render"));
	}

	#[test]
	fn invalid_date_format_is_an_error() {
		let err = render(r#"{{ now("[bogus]") }}"#, &params(&[]), AT)
			.expect_err("Expected a render error.");

		assert!(err.to_string().contains("Template failed to render"));
	}
}
