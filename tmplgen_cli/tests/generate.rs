mod common;

use common::FIXTURE;
use common::FIXTURE_OUTPUT;
use common::write_template;
use predicates::prelude::PredicateBooleanExt;
use tmplgen_core::AnyEmptyResult;

#[test]
fn generate_writes_output_next_to_template() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&input)
		.assert()
		.success()
		.stdout(predicates::str::contains("Wrote"));

	let output = std::fs::read_to_string(tmp.path().join("fixture.cs"))?;
	assert_eq!(output, FIXTURE_OUTPUT);

	Ok(())
}

#[test]
fn generate_leaves_unchanged_output_alone() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&input)
		.assert()
		.success();

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&input)
		.assert()
		.success()
		.stdout(predicates::str::contains("Unchanged").and(predicates::str::contains("Wrote").not()));

	Ok(())
}

#[test]
fn generate_inserts_generated_marker() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "Settings.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&input)
		.assert()
		.success();

	assert!(tmp.path().join("Settings.g.cs").is_file());
	assert_eq!(std::fs::read_to_string(&input)?, FIXTURE);

	Ok(())
}

#[test]
fn generate_reports_unmatched_quote_without_writing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(
		tmp.path(),
		"bad.tmpl.cs",
		"// <tmpl Keys=\"A\">\n\"open\n// </tmpl>\n",
	)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&input)
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unmatched quote"));

	assert!(!tmp.path().join("bad.cs").exists());

	Ok(())
}

#[test]
fn generate_continues_after_a_failing_template() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let bad = write_template(tmp.path(), "bad.tmpl.cs", "// <tmpl>\nnever closed\n")?;
	let good = write_template(tmp.path(), "good.tmpl.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&bad)
		.arg(&good)
		.assert()
		.code(2)
		.stderr(
			predicates::str::contains("missing closing tag")
				.and(predicates::str::contains("1 of 2 template(s) failed")),
		);

	assert!(!tmp.path().join("bad.cs").exists());
	assert_eq!(
		std::fs::read_to_string(tmp.path().join("good.cs"))?,
		FIXTURE_OUTPUT
	);

	Ok(())
}

#[test]
fn generate_dry_run_writes_nothing() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg("--dry-run")
		.arg(&input)
		.assert()
		.success()
		.stdout(predicates::str::contains("Would write"));

	assert!(!tmp.path().join("fixture.cs").exists());

	Ok(())
}

#[test]
fn generate_honors_out() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;
	let out = tmp.path().join("custom.txt");

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&input)
		.arg("--out")
		.arg(&out)
		.assert()
		.success();

	assert_eq!(std::fs::read_to_string(&out)?, FIXTURE_OUTPUT);
	assert!(!tmp.path().join("fixture.cs").exists());

	Ok(())
}

#[test]
fn generate_rejects_out_with_several_templates() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let first = write_template(tmp.path(), "a.tmpl.cs", FIXTURE)?;
	let second = write_template(tmp.path(), "b.tmpl.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&first)
		.arg(&second)
		.arg("--out")
		.arg(tmp.path().join("out.cs"))
		.assert()
		.code(2)
		.stderr(predicates::str::contains("--out"));

	Ok(())
}

#[test]
fn generate_refuses_to_overwrite_the_template() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&input)
		.arg("--out")
		.arg(&input)
		.assert()
		.code(2)
		.stderr(predicates::str::contains("refusing to overwrite the template"));

	assert_eq!(std::fs::read_to_string(&input)?, FIXTURE);

	Ok(())
}

#[test]
fn generate_preserves_byte_order_mark() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", &format!("\u{feff}{FIXTURE}"))?;

	common::tmplgen_cmd()
		.current_dir(tmp.path())
		.arg("generate")
		.arg(&input)
		.assert()
		.success();

	let bytes = std::fs::read(tmp.path().join("fixture.cs"))?;
	assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
	assert_eq!(&bytes[3..], FIXTURE_OUTPUT.as_bytes());

	Ok(())
}

#[test]
fn generate_uses_discovered_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("tmplgen.toml"),
		"tag = \"gen\"\n\n[output]\nbom = \"always\"\n",
	)?;
	let input = write_template(
		tmp.path(),
		"list.tmpl.txt",
		"// <gen Keys=\"Name\">\nalpha\nbeta\n// </gen>\n// <gen>\n- Name\n// </gen>\n",
	)?;

	common::tmplgen_cmd()
		.arg("--path")
		.arg(tmp.path())
		.arg("generate")
		.arg(&input)
		.assert()
		.success();

	assert_eq!(
		std::fs::read_to_string(tmp.path().join("list.txt"))?,
		"\u{feff}- alpha\n- beta\n"
	);

	Ok(())
}

#[test]
fn generate_reports_invalid_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let config = write_template(tmp.path(), "custom.toml", "tag = \"\"\n")?;
	let input = write_template(tmp.path(), "fixture.tmpl.cs", FIXTURE)?;

	common::tmplgen_cmd()
		.arg("--config")
		.arg(&config)
		.arg("generate")
		.arg(&input)
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}
