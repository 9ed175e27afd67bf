//! Atomic file writer used by the `create` tag.
//!
//! ## Write protocol
//!
//! 1. Render content (already done by caller).
//! 2. Compare with the file on disk → skip if identical.
//! 3. Create missing parent directories.
//! 4. Write to `<path>.stencil.tmp`.
//! 5. Rename to final path (atomic on POSIX); remove the tmp file on failure.
//!
//! Failures never propagate: they come back as [`WriteResult::Failed`] so the
//! enclosing render can continue.

use std::path::{Path, PathBuf};

use crate::error::{io_err, RenderError};

/// Outcome of one `create` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File already held exactly the rendered content.
    Unchanged { path: PathBuf },
    /// The file could not be written.
    Failed { path: PathBuf, reason: String },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::Failed { path, .. } => path,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, WriteResult::Failed { .. })
    }
}

/// Write `content` to `path`, reporting rather than returning errors.
pub(crate) fn write_file(path: &Path, content: &str) -> WriteResult {
    let tmp = PathBuf::from(format!("{}.stencil.tmp", path.display()));
    match write_with_tmp(path, content, &tmp) {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "create: write failed");
            WriteResult::Failed {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        }
    }
}

fn write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<WriteResult, RenderError> {
    if let Ok(existing) = std::fs::read_to_string(path) {
        if existing == content {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn first_write_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.html");
        let result = write_file(&path, "hello");
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn same_content_returns_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.md");
        write_file(&path, "same content");
        let result = write_file(&path, "same content");
        assert!(matches!(result, WriteResult::Unchanged { .. }));
    }

    #[test]
    fn changed_content_returns_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("file.md");
        write_file(&path, "v1");
        let result = write_file(&path, "v2");
        assert!(matches!(result, WriteResult::Written { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }

    #[test]
    fn tmp_file_removed_after_write() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("clean.md");
        write_file(&path, "data");
        let tmp_path = PathBuf::from(format!("{}.stencil.tmp", path.display()));
        assert!(!tmp_path.exists(), ".stencil.tmp must be cleaned up");
    }

    #[test]
    fn creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("docs").join("classes").join("a.html");
        write_file(&path, "content");
        assert!(path.exists());
    }

    #[test]
    fn blocked_parent_reports_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "i am a file").unwrap();
        let path = blocker.join("child.html");

        let result = write_file(&path, "content");
        assert!(result.is_failed(), "got: {result:?}");
        assert_eq!(result.path(), path.as_path());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "i am a file");
    }
}
