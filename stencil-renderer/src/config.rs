//! Engine configuration.
//!
//! Every field has a default, so a YAML file only needs the keys it changes:
//!
//! ```yaml
//! template_dir: templates
//! output_dir: build/html
//! escape: html
//! loop_metadata: true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use stencil_core::EscapeMode;

use crate::error::{io_err, RenderError};

/// Default bound on nested `extends`/`include`/`create` renders.
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory `load_by_name` resolves template files against. `None` means
    /// names are used as paths relative to the working directory.
    pub template_dir: Option<PathBuf>,
    /// Initial output directory of contexts vended by `create_context`.
    pub output_dir: Option<PathBuf>,
    /// Escaper installed on vended contexts.
    pub escape: EscapeMode,
    /// Bind a `forloop` struct inside `for` bodies.
    pub loop_metadata: bool,
    /// Secondary recursion guard; cycles are caught independently of it.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            output_dir: None,
            escape: EscapeMode::None,
            loop_metadata: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    /// Read a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        serde_yaml::from_str(&contents).map_err(|source| RenderError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg: EngineConfig = serde_yaml::from_str("escape: html\nloop_metadata: true\n").unwrap();
        assert_eq!(cfg.escape, EscapeMode::Html);
        assert!(cfg.loop_metadata);
        assert_eq!(cfg.max_depth, DEFAULT_MAX_DEPTH);
        assert!(cfg.template_dir.is_none());
    }

    #[test]
    fn load_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stencil.yaml");
        std::fs::write(&path, "template_dir: tpl\nmax_depth: 8\n").unwrap();
        let cfg = EngineConfig::load(&path).unwrap();
        assert_eq!(cfg.template_dir, Some(PathBuf::from("tpl")));
        assert_eq!(cfg.max_depth, 8);
    }

    #[test]
    fn load_reports_bad_yaml_with_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.yaml");
        std::fs::write(&path, "max_depth: [unclosed").unwrap();
        let err = EngineConfig::load(&path).unwrap_err();
        assert!(matches!(err, RenderError::Config { .. }), "got: {err}");
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = EngineConfig::load(&tmp.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }), "got: {err}");
    }
}
