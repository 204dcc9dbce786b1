mod common;

use common::FIXTURE;
use common::FIXTURE_OUTPUT;
use common::write_template;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;
use tmplgen_core::AnyEmptyResult;

#[test]
fn check_passes_when_up_to_date() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;
	write_template(tmp.path(), "fixture.cs", FIXTURE_OUTPUT)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg(&input)
		.assert()
		.success()
		.stdout(predicates::str::contains("up to date"));

	Ok(())
}

#[test]
fn check_fails_when_output_is_missing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg(&input)
		.assert()
		.code(1)
		.stderr(predicates::str::contains("missing:").and(predicates::str::contains("fixture.cs")));

	Ok(())
}

#[test]
fn check_fails_when_output_is_stale() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;
	write_template(tmp.path(), "fixture.cs", "edited\n")?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg(&input)
		.assert()
		.code(1)
		.stderr(
			predicates::str::contains("stale:")
				.and(predicates::str::contains("1 generated file(s) out of date")),
		);

	Ok(())
}

#[test]
fn check_diff_shows_changed_lines() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;
	write_template(tmp.path(), "fixture.cs", "before\nedited\nafter")?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg("--diff")
		.arg(&input)
		.assert()
		.code(1)
		.stderr(
			predicates::str::contains("-edited")
				.and(predicates::str::contains("+val 1 2 0"))
				.and(predicates::str::contains("+val 3 4 1")),
		);

	Ok(())
}

#[test]
fn check_reports_json() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let fresh = write_template(tmp.path(), "fresh.tmpl.cs", FIXTURE)?;
	write_template(tmp.path(), "fresh.cs", FIXTURE_OUTPUT)?;
	let stale = write_template(tmp.path(), "stale.tmpl.cs", FIXTURE)?;
	write_template(tmp.path(), "stale.cs", "old")?;

	let assert = common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg(&fresh)
		.arg(&stale)
		.assert()
		.code(1);

	let output: Value = serde_json::from_slice(&assert.get_output().stdout)?;
	assert_eq!(output["ok"], false);
	assert_eq!(output["files"][0]["status"], "up_to_date");
	assert_eq!(output["files"][1]["status"], "stale");

	Ok(())
}

#[test]
fn check_fails_on_template_errors() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(
		tmp.path(),
		"bad.tmpl.cs",
		"// <tmpl Keys=\"A;B\">\n1;2\n3\n// </tmpl>\n",
	)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("check")
		.arg(&input)
		.assert()
		.code(2)
		.stderr(predicates::str::contains("has 1 field(s), the header declares 2"));

	Ok(())
}
