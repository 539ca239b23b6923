//! Small helpers shared across CLI tests.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::TempDir;

use super::{Cli, CliError, Command, SimulateCommand, TopologyArgs, TopologyKind, run_cli};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

pub(super) fn create_text_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

/// A seeded ring of `nodes` nodes with one neighbour on each side.
pub(super) fn seeded_ring(nodes: usize) -> TopologyArgs {
    TopologyArgs {
        topology: TopologyKind::Ring,
        nodes,
        k: 1,
        seed: Some(11),
        ..TopologyArgs::default()
    }
}

pub(super) fn simulate(command: SimulateCommand) -> Cli {
    Cli {
        command: Command::Simulate(command),
    }
}
