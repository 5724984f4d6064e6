use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::solver::solution::Solution;

/// Writes a solution to `path` in the text or JSON format selected by the
/// path's extension (`.json` selects JSON; anything else selects text).
pub fn write_solution_file(path: &Path, solution: &Solution) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to open solution output file {}", path.display()))?;

    if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        writeln!(file, "{}", solution.to_json()).context("failed to write JSON solution")?;
    } else {
        write!(file, "{solution}").context("failed to write text solution")?;
    }
    Ok(())
}
