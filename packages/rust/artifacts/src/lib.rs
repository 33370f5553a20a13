//! Document artifacts: PDF encoding and atomic output.
//!
//! The finished file only appears at its destination once it is complete:
//! bytes go to a hidden sibling temp file (`tempfile`) which is then
//! renamed over the target. A failed write leaves no partial artifact behind.

mod pdf;

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use eksreview_layout::Document;
use eksreview_shared::{EksReviewError, Result};

pub use pdf::render_pdf;

/// Metadata for a written artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactMeta {
    pub path: PathBuf,
    pub sha256: String,
    pub size_bytes: usize,
    pub page_count: usize,
}

/// Encode `doc` and write it to `dest`.
#[instrument(skip_all, fields(dest = %dest.display(), pages = doc.page_count()))]
pub fn write_pdf(doc: &Document, dest: &Path) -> Result<ArtifactMeta> {
    let bytes = render_pdf(doc)?;
    write_atomic(dest, &bytes)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let sha256 = format!("{:x}", hasher.finalize());

    info!(size = bytes.len(), sha256 = %sha256, "artifact written");
    Ok(ArtifactMeta {
        path: dest.to_path_buf(),
        sha256,
        size_bytes: bytes.len(),
        page_count: doc.page_count(),
    })
}

/// Write `bytes` to `target` via temp file + rename.
///
/// The temp file lives next to `target` and is deleted on every failure
/// path, including a short write.
pub fn write_atomic(target: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |path: &Path, e: std::io::Error| {
        EksReviewError::assembly(format!("cannot write {}: {e}", path.display()))
    };

    let file_name = target
        .file_name()
        .ok_or_else(|| {
            EksReviewError::assembly(format!("{} is not a file path", target.display()))
        })?
        .to_string_lossy();
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| write_err(&dir, e))?;

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(|e| write_err(&dir, e))?;
    let temp_path = temp.path().to_path_buf();
    temp.write_all(bytes)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| write_err(&temp_path, e))?;

    temp.persist(target).map_err(|e| write_err(target, e.error))?;

    debug!(path = %target.display(), size = bytes.len(), "renamed into place");
    Ok(())
}
