//! Manifest operations - seeding, mutation, and persistence
//!
//! Every mutating operation first guarantees the `build`, `include` and
//! `modules` sections exist, so a touched document always carries them.

use crate::errors::{ManifestError, Result};
use crate::types::{Manifest, ModuleEntry, GLOB_ALIAS};
use indexmap::IndexMap;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Source a manifest can be seeded from.
#[derive(Debug, Clone, Copy)]
pub enum ManifestSource<'a> {
    /// Serialized JSON text, parsed on initialization
    Text(&'a str),
    /// Existing document, deep-copied on initialization
    Document(&'a Manifest),
}

impl<'a> From<&'a str> for ManifestSource<'a> {
    fn from(text: &'a str) -> Self {
        ManifestSource::Text(text)
    }
}

impl<'a> From<&'a Manifest> for ManifestSource<'a> {
    fn from(document: &'a Manifest) -> Self {
        ManifestSource::Document(document)
    }
}

impl FromStr for Manifest {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

impl Manifest {
    /// Empty document carrying only a provenance block
    pub fn with_provenance(provenance: Value) -> Self {
        Manifest {
            provenance: Some(provenance),
            ..Default::default()
        }
    }

    /// Replace the document with the given source.
    ///
    /// `None` leaves the current document in place.
    pub fn initialize(&mut self, source: Option<ManifestSource<'_>>) -> Result<()> {
        match source {
            Some(ManifestSource::Text(text)) => *self = text.parse()?,
            Some(ManifestSource::Document(document)) => *self = document.clone(),
            None => {}
        }
        Ok(())
    }

    /// Create the `build`, `include` and `modules` sections if absent.
    pub fn ensure_sections(&mut self) {
        self.build.get_or_insert_with(IndexMap::new);
        self.include.get_or_insert_with(Vec::new);
        self.modules.get_or_insert_with(|| {
            let mut modules = IndexMap::new();
            modules.insert(GLOB_ALIAS.to_string(), ModuleEntry::Multiple(Vec::new()));
            modules
        });
    }

    /// Set a build variable, e.g. `MCUMODULES`.
    pub fn set_build_variable(&mut self, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(ManifestError::InvalidArgument(
                "build variable name must not be empty".to_string(),
            ));
        }
        self.ensure_sections();
        if let Some(build) = self.build.as_mut() {
            build.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    /// Register `path` under `alias`. Returns whether the document changed.
    pub fn add_module(&mut self, path: &str, alias: &str) -> Result<bool> {
        if alias.is_empty() {
            return Err(ManifestError::InvalidArgument(
                "module alias must not be empty".to_string(),
            ));
        }
        self.ensure_sections();
        let Some(modules) = self.modules.as_mut() else {
            return Ok(false);
        };

        match modules.get_mut(alias) {
            Some(entry) => Ok(entry.push(path)),
            None => {
                modules.insert(alias.to_string(), ModuleEntry::Single(path.to_string()));
                Ok(true)
            }
        }
    }

    /// Register `path` under the glob alias `*`.
    pub fn add_glob_module(&mut self, path: &str) -> Result<bool> {
        self.add_module(path, GLOB_ALIAS)
    }

    /// Append a manifest to `include` unless already listed. Returns whether the document changed.
    pub fn include_manifest(&mut self, path: &str) -> bool {
        self.ensure_sections();
        let Some(include) = self.include.as_mut() else {
            return false;
        };
        if include.iter().any(|p| p == path) {
            return false;
        }
        include.push(path.to_string());
        true
    }

    pub fn add_preload(&mut self, module: &str) -> bool {
        self.ensure_sections();
        let preload = self.preload.get_or_insert_with(Vec::new);
        if preload.iter().any(|m| m == module) {
            return false;
        }
        preload.push(module.to_string());
        true
    }

    /// Attach an arbitrary top-level block.
    ///
    /// Keys naming a typed section must carry a value of that section's shape.
    pub fn set_property(&mut self, key: &str, value: &Value) -> Result<()> {
        self.ensure_sections();
        let invalid = |e: serde_json::Error| {
            ManifestError::InvalidArgument(format!("invalid value for '{}': {}", key, e))
        };
        match key {
            "//" => self.provenance = Some(value.clone()),
            "build" => self.build = Some(serde_json::from_value(value.clone()).map_err(invalid)?),
            "include" => {
                self.include = Some(serde_json::from_value(value.clone()).map_err(invalid)?);
            }
            "modules" => {
                self.modules = Some(serde_json::from_value(value.clone()).map_err(invalid)?);
            }
            "preload" => {
                self.preload = Some(serde_json::from_value(value.clone()).map_err(invalid)?);
            }
            _ => {
                self.extra.insert(key.to_string(), value.clone());
            }
        }
        Ok(())
    }

    /// Pretty-printed JSON with two-space indentation
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a manifest from disk
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Read `path` as untyped JSON; malformed text is `InvalidManifest`.
    pub fn load_document(path: &Path) -> Result<Value> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ManifestError::InvalidManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Type a document read by [`Manifest::load_document`].
    pub fn from_document(path: &Path, document: Value) -> Result<Self> {
        serde_json::from_value(document).map_err(|e| ManifestError::InvalidManifest {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save the manifest with an atomic write
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = self.serialize()?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("json.tmp");
        {
            let file = std::fs::File::create(&temp_path)?;
            let mut writer = std::io::BufWriter::new(file);
            writer.write_all(content.as_bytes())?;
            writer.flush()?;
        }

        std::fs::rename(&temp_path, path)?;
        debug!("Manifest saved to {}", path.display());
        Ok(())
    }
}
