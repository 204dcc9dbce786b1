mod common;

use common::FIXTURE;
use common::write_template;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;
use tmplgen_core::AnyEmptyResult;

#[test]
fn list_prints_segments() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("list")
		.arg(&input)
		.assert()
		.success()
		.stdout(
			predicates::str::contains("keys (X;Y)")
				.and(predicates::str::contains("lines 6-8  template"))
				.and(predicates::str::contains("2 tagged block(s)")),
		);

	Ok(())
}

#[test]
fn list_prints_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;

	let assert = common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("list")
		.arg("--format")
		.arg("json")
		.arg(&input)
		.assert()
		.success();

	let segments: Value = serde_json::from_slice(&assert.get_output().stdout)?;
	let segments = segments.as_array().ok_or("expected a JSON array")?;
	assert_eq!(segments.len(), 5);
	assert_eq!(segments[0]["kind"], "passthrough");
	assert_eq!(segments[1]["kind"], "tagged");
	assert_eq!(segments[1]["directive"], "keys");
	assert_eq!(segments[1]["attributes"]["Keys"], "X;Y");
	assert_eq!(segments[1]["opening_line"], 2);
	assert_eq!(segments[3]["directive"], "template");
	assert_eq!(segments[3]["style"], "line");

	Ok(())
}

#[test]
fn list_reports_malformed_templates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "bad.tmpl.cs", "/* <tmpl> */\nbody\n// </tmpl>\n")?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("list")
		.arg(&input)
		.assert()
		.code(2)
		.stderr(predicates::str::contains("missing closing tag"));

	Ok(())
}
