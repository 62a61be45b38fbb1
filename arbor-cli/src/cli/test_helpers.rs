//! Small helpers shared across CLI tests.
//!
//! The CLI unit tests write temporary tree documents and assert error
//! handling behaviour. These helpers keep the test cases concise.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::TempDir;

use super::{Cli, CliError, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

/// `20(10, 30)` with a named root.
pub(super) const SWAPPED_LEFT: &str = r#"{
    "name": "root-a",
    "attribute": 20,
    "children": [{"attribute": 10}, {"attribute": 30}]
}"#;

/// `30(10, 20)` with a named root.
pub(super) const SWAPPED_RIGHT: &str = r#"{
    "name": "root-b",
    "attribute": 30,
    "children": [{"attribute": 10}, {"attribute": 20}]
}"#;

/// Two tight pairs of trees, interleaved.
pub(super) const COLLECTION: &str = r#"[
    {"name": "small-a", "attribute": 3, "children": [{"attribute": 5}, {"attribute": 4}]},
    {"name": "large-a", "attribute": 13, "children": [{"attribute": 203}, {"attribute": 203}]},
    {"name": "small-b", "attribute": 3, "children": [{"attribute": 4}, {"attribute": 4}]},
    {"attribute": 12, "children": [{"attribute": 227}, {"attribute": 227}]}
]"#;

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
