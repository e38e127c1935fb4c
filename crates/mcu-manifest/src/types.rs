//! Document types for Moddable XS manifests
//!
//! A manifest is a JSON document consumed by `mcconfig`. Only the sections this
//! crate manipulates are typed; every other top-level key (`config`, `data`,
//! `resources`, `platforms`, ...) is carried through untouched.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// File name of every manifest written or discovered.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Alias under which modules are resolved by glob convention.
pub const GLOB_ALIAS: &str = "*";

/// Key inside the provenance block that marks a document as a template.
pub const TEMPLATE_MARKER: &str = "template";

// =============================================================================
// MANIFEST
// =============================================================================

/// In-memory manifest document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Provenance block (`"//"`). Informational, except for the template marker.
    #[serde(rename = "//", default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules: Option<IndexMap<String, ModuleEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preload: Option<Vec<String>>,

    /// Any other top-level block, preserved verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Whether this document is a template rather than a literal manifest.
    ///
    /// Any provenance block carrying a `template` key qualifies, whatever its value.
    pub fn is_template(&self) -> bool {
        self.template_block().is_some()
    }

    /// Raw template rules block, if present.
    pub fn template_block(&self) -> Option<&Value> {
        marker_of(self.provenance.as_ref())
    }

    /// Template check on an untyped document.
    ///
    /// Only `"//".template` is inspected, so documents whose other sections
    /// do not fit [`Manifest`] are still classified.
    pub fn is_template_document(document: &Value) -> bool {
        marker_of(document.get("//")).is_some()
    }
}

fn marker_of(provenance: Option<&Value>) -> Option<&Value> {
    provenance
        .and_then(Value::as_object)
        .and_then(|block| block.get(TEMPLATE_MARKER))
}

// =============================================================================
// MODULE ENTRY
// =============================================================================

/// Value stored under a `modules` alias.
///
/// On the wire this is either a bare path string or an array of paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleEntry {
    Single(String),
    Multiple(Vec<String>),
}

impl ModuleEntry {
    pub fn contains(&self, path: &str) -> bool {
        match self {
            ModuleEntry::Single(existing) => existing == path,
            ModuleEntry::Multiple(paths) => paths.iter().any(|p| p == path),
        }
    }

    /// Add `path`, promoting a single entry to a list. Returns whether anything changed.
    pub fn push(&mut self, path: &str) -> bool {
        if self.contains(path) {
            return false;
        }
        match self {
            ModuleEntry::Single(existing) => {
                *self = ModuleEntry::Multiple(vec![existing.clone(), path.to_string()]);
            }
            ModuleEntry::Multiple(paths) => paths.push(path.to_string()),
        }
        true
    }

    pub fn paths(&self) -> Vec<&str> {
        match self {
            ModuleEntry::Single(path) => vec![path.as_str()],
            ModuleEntry::Multiple(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}
