//! Ordered, integer-indexed collection of amp models.
//!
//! Built once at startup, then only read. Sources:
//!
//! - a model pack: one JSON or TOML document with a `models` list of
//!   `{ name, weights }` entries;
//! - a directory of single-model `.json` / `.toml` files, loaded in
//!   file-name order with the file stem as the model name;
//! - weight sets pushed programmatically.

use crate::weights::ModelWeights;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub weights: ModelWeights,
}

#[derive(Debug, Deserialize)]
struct ModelPack {
    models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelTable {
    entries: Vec<ModelEntry>,
}

impl ModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validated weight set; returns its index.
    pub fn push(&mut self, name: impl Into<String>, weights: ModelWeights) -> Result<usize> {
        let name = name.into();
        weights
            .validate()
            .map_err(|e| Error::ModelLoad(format!("{name}: {e}")))?;

        self.entries.push(ModelEntry { name, weights });
        Ok(self.entries.len() - 1)
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        let pack: ModelPack = serde_json::from_str(source)?;
        Self::from_entries(pack.models)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let pack: ModelPack = toml::from_str(source)?;
        Self::from_entries(pack.models)
    }

    fn from_entries(entries: Vec<ModelEntry>) -> Result<Self> {
        let mut table = Self::new();
        for entry in entries {
            table.push(entry.name, entry.weights)?;
        }
        Ok(table)
    }

    /// Load a model pack file (`.json` or `.toml`).
    pub fn from_pack_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path).ok_or_else(|| {
            Error::InvalidPath(format!("Unsupported model pack: {}", path.display()))
        })?;
        let source = std::fs::read_to_string(path)?;

        let table = match format {
            Format::Json => Self::from_json_str(&source)?,
            Format::Toml => Self::from_toml_str(&source)?,
        };
        tracing::info!("Loaded {} models from {}", table.len(), path.display());
        Ok(table)
    }

    /// Load one model per `.json` / `.toml` file in `dir`, sorted by file
    /// name. Other files are ignored; files that fail to parse are logged
    /// and skipped.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::InvalidPath(format!(
                "Not a directory: {}",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && Format::from_path(&path).is_some() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut table = Self::new();
        for path in paths {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match load_weights_file(&path) {
                Ok(weights) => {
                    let index = table.push(name, weights)?;
                    tracing::info!("Loaded model {}: {} from {}", index, name, path.display());
                }
                Err(e) => {
                    tracing::warn!("Failed to load model {}: {}", path.display(), e);
                }
            }
        }
        Ok(table)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ModelWeights> {
        self.entries.get(index).map(|e| &e.weights)
    }

    /// Like [`get`](Self::get), but out-of-range is an error.
    pub fn weights(&self, index: usize) -> Result<&ModelWeights> {
        self.get(index).ok_or_else(|| {
            altair_core::Error::IndexOutOfRange {
                index,
                len: self.len(),
            }
            .into()
        })
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.iter()
    }
}

/// Parse a single-model weight file by extension.
pub(crate) fn load_weights_file(path: &Path) -> Result<ModelWeights> {
    let format = Format::from_path(path)
        .ok_or_else(|| Error::InvalidPath(format!("Unsupported model file: {}", path.display())))?;
    let source = std::fs::read_to_string(path)?;

    match format {
        Format::Json => ModelWeights::from_json_str(&source),
        Format::Toml => ModelWeights::from_toml_str(&source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn biased(bias: f32) -> ModelWeights {
        ModelWeights {
            dense_bias: bias,
            ..Default::default()
        }
    }

    #[test]
    fn test_push_and_get() {
        let mut table = ModelTable::new();
        assert!(table.is_empty());

        assert_eq!(table.push("clean", biased(0.1)).unwrap(), 0);
        assert_eq!(table.push("crunch", biased(0.2)).unwrap(), 1);

        assert_eq!(table.len(), 2);
        assert_eq!(table.name(1), Some("crunch"));
        assert_eq!(table.get(0).map(|w| w.dense_bias), Some(0.1));
        assert!(table.get(2).is_none());
    }

    #[test]
    fn test_out_of_range_is_error() {
        let mut table = ModelTable::new();
        table.push("only", biased(0.0)).unwrap();

        assert!(matches!(
            table.weights(3),
            Err(Error::Core(altair_core::Error::IndexOutOfRange { index: 3, len: 1 }))
        ));
    }

    #[test]
    fn test_push_rejects_invalid_weights() {
        let mut table = ModelTable::new();
        assert!(matches!(
            table.push("broken", biased(f32::NAN)),
            Err(Error::ModelLoad(_))
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn test_json_pack() {
        let entries = vec![
            ModelEntry {
                name: "a".into(),
                weights: biased(0.5),
            },
            ModelEntry {
                name: "b".into(),
                weights: biased(-0.5),
            },
        ];
        let json = serde_json::json!({ "models": entries }).to_string();

        let table = ModelTable::from_json_str(&json).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(0), Some("a"));
        assert_eq!(table.get(1).map(|w| w.dense_bias), Some(-0.5));
    }

    #[test]
    fn test_pack_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();

        fs::write(
            dir.path().join("b_lead.json"),
            serde_json::to_string(&biased(0.2)).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.path().join("a_clean.toml"),
            toml::to_string(&biased(0.1)).unwrap(),
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a model").unwrap();
        fs::write(dir.path().join("c_broken.json"), "{ \"lin_bias\": 1 }").unwrap();

        let table = ModelTable::from_dir(dir.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.name(0), Some("a_clean"));
        assert_eq!(table.name(1), Some("b_lead"));

        let missing = ModelTable::from_pack_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(Error::Io(_))));

        let unsupported = ModelTable::from_pack_file(dir.path().join("notes.txt"));
        assert!(matches!(unsupported, Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_from_dir_requires_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            ModelTable::from_dir(file.path()),
            Err(Error::InvalidPath(_))
        ));
    }
}
