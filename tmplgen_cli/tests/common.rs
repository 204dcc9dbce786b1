#![allow(dead_code)]

use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;

pub const FIXTURE: &str = "before\n// <tmpl Keys=\"X;Y\">\n1;2\n3;4\n// </tmpl>\n// <tmpl>\nval X Y i_\n// </tmpl>\nafter";

pub const FIXTURE_OUTPUT: &str = "before\nval 1 2 0\nval 3 4 1\nafter";

pub fn tmplgen_cmd() -> Command {
	let mut cmd = Command::new(env!("CARGO_BIN_EXE_tmplgen"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Write `content` to `name` inside `dir` and return the full path.
pub fn write_template(dir: &Path, name: &str, content: &str) -> std::io::Result<PathBuf> {
	let path = dir.join(name);
	std::fs::write(&path, content)?;
	Ok(path)
}
