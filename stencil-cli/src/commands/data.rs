//! Loading `--data` files and `--set` pairs into a context.

use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context as _, Result};
use stencil_core::{Context, Value};

/// A `KEY=VALUE` pair from `--set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl FromStr for KeyValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(KeyValue {
                key: key.trim().to_string(),
                value: value.to_string(),
            }),
            _ => Err(format!("expected KEY=VALUE, got '{s}'")),
        }
    }
}

/// Parse a JSON or YAML data file, picked by extension.
pub fn read_data_file(path: &Path) -> Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read data file '{}'", path.display()))?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "json" => serde_json::from_str(&text)
            .with_context(|| format!("invalid JSON in '{}'", path.display())),
        "yaml" | "yml" => serde_yaml::from_str(&text)
            .with_context(|| format!("invalid YAML in '{}'", path.display())),
        other => bail!(
            "unsupported data file extension '{other}' for '{}' (expected .json, .yaml or .yml)",
            path.display()
        ),
    }
}

/// Bind every top-level key of a mapping document in the current scope.
pub fn bind_document(ctx: &mut Context, path: &Path, doc: &serde_json::Value) -> Result<usize> {
    let Some(map) = doc.as_object() else {
        bail!("data file '{}' must contain a mapping at the top level", path.display());
    };
    for (key, value) in map {
        ctx.set(key.as_str(), Value::from_json(value));
    }
    tracing::debug!(file = %path.display(), keys = map.len(), "bound data file");
    Ok(map.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::ListIntf;
    use tempfile::TempDir;

    #[test]
    fn key_value_splits_on_first_equals() {
        let kv: KeyValue = "title=a=b".parse().unwrap();
        assert_eq!(kv.key, "title");
        assert_eq!(kv.value, "a=b");
        let empty: KeyValue = "x=".parse().unwrap();
        assert_eq!(empty.value, "");
    }

    #[test]
    fn key_value_rejects_missing_key() {
        assert!("novalue".parse::<KeyValue>().is_err());
        assert!("=v".parse::<KeyValue>().is_err());
    }

    #[test]
    fn yaml_and_json_files_bind_top_level_keys() {
        let tmp = TempDir::new().unwrap();
        let yaml = tmp.path().join("site.yaml");
        std::fs::write(&yaml, "title: Docs\npages:\n  - a\n  - b\n").unwrap();
        let json = tmp.path().join("extra.json");
        std::fs::write(&json, r#"{"count": 3}"#).unwrap();

        let mut ctx = Context::new();
        for path in [&yaml, &json] {
            let doc = read_data_file(path).unwrap();
            bind_document(&mut ctx, path, &doc).unwrap();
        }
        assert_eq!(ctx.get("title").to_string(), "Docs");
        assert_eq!(ctx.get("pages").to_list().unwrap().count(), 2);
        assert_eq!(ctx.get("count").to_int(), 3);
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("list.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let doc = read_data_file(&path).unwrap();
        let err = bind_document(&mut Context::new(), &path, &doc).unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("data.toml");
        std::fs::write(&path, "x = 1").unwrap();
        assert!(read_data_file(&path).is_err());
    }
}
