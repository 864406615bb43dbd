use pulse_core::{Result, SummaryDocument};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically replace the summary document at `path`.
///
/// The JSON is written to a temporary file in the same directory and
/// renamed over the target, so readers either see the previous complete
/// document or the new one — never a partial write. On any failure the
/// previous document is left untouched.
pub fn persist_summary(doc: &SummaryDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_vec_pretty(doc)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&json)?;
    tmp.write_all(b"\n")?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
