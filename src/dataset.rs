//! Record set files: discovery, loading and writing

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Annotations, EventRecord, InputRow};
use crate::pipeline::Dataset;

const INPUT_SUFFIX: &str = "_data.json";
const OUTPUT_SUFFIX: &str = "_enriched.json";

fn non_alnum_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("Invalid slug regex"))
}

/// Lowercase, collapse non-alphanumeric runs to `_`, trim `_`
pub fn slugify(s: &str) -> String {
    non_alnum_regex()
        .replace_all(&s.to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

/// Most recently modified `*_data.json` under `raw_dir`, preferring files
/// that start with the artist's slug when any do
pub fn detect_latest_input(raw_dir: &Path, artist: Option<&str>) -> Result<PathBuf> {
    if !raw_dir.is_dir() {
        return Err(Error::InputNotFound(format!(
            "no {} directory; run the catalog export first",
            raw_dir.display()
        )));
    }

    let mut candidates: Vec<(PathBuf, SystemTime)> = Vec::new();
    for entry in std::fs::read_dir(raw_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(INPUT_SUFFIX) {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        candidates.push((entry.path(), modified));
    }

    if candidates.is_empty() {
        return Err(Error::InputNotFound(format!(
            "no *{} files in {}",
            INPUT_SUFFIX,
            raw_dir.display()
        )));
    }

    if let Some(artist) = artist {
        let prefix = slugify(artist);
        let preferred: Vec<_> = candidates
            .iter()
            .filter(|(path, _)| file_name(path).starts_with(&prefix))
            .cloned()
            .collect();
        if preferred.is_empty() {
            debug!("No input named for {}, falling back to newest", prefix);
        } else {
            candidates = preferred;
        }
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    let (latest, _) = candidates.swap_remove(0);
    info!("Using input {}", latest.display());
    Ok(latest)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Parse a JSON array of typed rows
pub fn load_rows(path: &Path) -> Result<Vec<InputRow>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::InputNotFound(format!("{}: {}", path.display(), e)))?;
    let rows: Vec<InputRow> = serde_json::from_str(&content)
        .map_err(|e| Error::Deserialization(format!("{}: {}", path.display(), e)))?;
    Ok(rows)
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let dataset = Dataset::from_rows(load_rows(path)?);
    info!(
        "Loaded {} tracks and {} events from {}",
        dataset.tracks.len(),
        dataset.events.len(),
        path.display()
    );
    Ok(dataset)
}

/// Annotations array, one entry per event in input order
pub fn load_annotations(path: &Path) -> Result<Vec<Annotations>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::InputNotFound(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Deserialization(format!("{}: {}", path.display(), e)))
}

/// `<enriched_dir>/<base>_enriched.json`; the directory must already exist
pub fn output_path(input: &Path, enriched_dir: &Path) -> Result<PathBuf> {
    if !enriched_dir.is_dir() {
        return Err(Error::OutputDirMissing(format!(
            "{} (create it first, e.g. mkdir -p {})",
            enriched_dir.display(),
            enriched_dir.display()
        )));
    }

    let name = file_name(input);
    let base = name
        .strip_suffix(INPUT_SUFFIX)
        .or_else(|| name.strip_suffix(".json"))
        .unwrap_or(&name);

    Ok(enriched_dir.join(format!("{}{}", base, OUTPUT_SUFFIX)))
}

/// Write ranked events as pretty JSON
pub fn write_events(path: &Path, events: &[EventRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(events)
        .map_err(|e| Error::Serialization(e.to_string()))?;
    std::fs::write(path, json)?;
    info!("Wrote {} events to {}", events.len(), path.display());
    Ok(())
}
