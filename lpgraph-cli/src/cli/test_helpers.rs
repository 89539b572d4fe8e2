//! Small helpers shared across CLI tests.

use std::{fs, io, path::PathBuf};

use tempfile::TempDir;

use super::{Cli, CliError, Command, DuplicateMode, RunCommand, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_text_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

/// A `run` command with default options writing into `dir/out`.
pub(super) fn run_command_for(dir: &TempDir, input: PathBuf) -> RunCommand {
    RunCommand {
        input,
        output: dir.path().join("out"),
        groups: None,
        methods: Vec::new(),
        duplicates: DuplicateMode::Keep,
        max_hops: 2,
        extension: "lpg".to_owned(),
        name: None,
    }
}

pub(super) fn run_cli_expecting_error(command: RunCommand, panic_msg: &str) -> CliError {
    match run_cli(Cli {
        command: Command::Run(command),
    }) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
