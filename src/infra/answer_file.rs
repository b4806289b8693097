// ============================================================
// Layer 6 — Answer Files
// ============================================================
// JSON I/O for answer records, plus the guard that owns the
// temporary answer file written during in-loop evaluation.
//
// The temp file must never outlive an evaluation, whether the
// evaluator succeeds, returns an error, or panics. TempAnswerFile
// removes it on Drop, so every exit path is covered.

use anyhow::{Context, Result};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::domain::answer::AnswerRecord;

/// Write `records` as one JSON array.
pub fn write_answers(path: &Path, records: &[AnswerRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create answer directory '{}'", parent.display()))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Cannot create answer file '{}'", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, records)
        .with_context(|| format!("Cannot serialise answers to '{}'", path.display()))?;
    writer.flush()?;
    Ok(())
}

pub fn read_answers(path: &Path) -> Result<Vec<AnswerRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open answer file '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Malformed answer file '{}'", path.display()))
}

/// Remove a leftover file from a previous run, if any.
pub fn remove_stale(path: &Path) -> Result<()> {
    if path.exists() {
        tracing::info!("Removing stale answer file '{}'", path.display());
        fs::remove_file(path)
            .with_context(|| format!("Cannot remove stale answer file '{}'", path.display()))?;
    }
    Ok(())
}

// ─── TempAnswerFile ───────────────────────────────────────────────────────────
/// A written answer file that is deleted when the guard drops.
pub struct TempAnswerFile {
    path: PathBuf,
}

impl TempAnswerFile {
    pub fn write(path: impl Into<PathBuf>, records: &[AnswerRecord]) -> Result<Self> {
        let guard = Self { path: path.into() };
        // Guard exists before the write, so a partial file is removed too
        write_answers(&guard.path, records)?;
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempAnswerFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Cannot remove temp answer file '{}': {e}", self.path.display());
            }
        }
    }
}
