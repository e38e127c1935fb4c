//! Manifest templates
//!
//! A template lives at `<templates root>/<scoped package>/manifest.json` and is
//! marked by a `"//": { "template": {...} }` block. The block lists, per section,
//! which keys synthesis is allowed to emit:
//!
//! ```json
//! { "//": { "template": { "modules": ["*"], "build": ["MCUMODULES"], "include": ["require"] } } }
//! ```

use crate::errors::Result;
use crate::package::scoped_path;
use crate::types::{Manifest, MANIFEST_FILE};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wildcard permitting every key of a section.
pub const WILDCARD: &str = "*";

/// Template section a permission applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Modules,
    Build,
    Include,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Modules => "modules",
            Section::Build => "build",
            Section::Include => "include",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permitted keys per section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRules {
    pub modules: Vec<String>,
    pub build: Vec<String>,
    pub include: Vec<String>,
}

impl TemplateRules {
    /// Read the rules block leniently: non-list sections and non-string keys are ignored.
    pub fn from_value(block: &Value) -> Self {
        let keys = |section: Section| -> Vec<String> {
            block
                .get(section.as_str())
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default()
        };
        TemplateRules {
            modules: keys(Section::Modules),
            build: keys(Section::Build),
            include: keys(Section::Include),
        }
    }

    pub fn keys(&self, section: Section) -> &[String] {
        match section {
            Section::Modules => &self.modules,
            Section::Build => &self.build,
            Section::Include => &self.include,
        }
    }

    pub fn permits(&self, section: Section, key: &str) -> bool {
        self.keys(section)
            .iter()
            .any(|k| k == key || k == WILDCARD)
    }
}

/// A template-marked manifest together with its parsed rules
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    path: PathBuf,
    rules: TemplateRules,
    document: Manifest,
}

impl Template {
    /// Path a template for `package` would live at.
    pub fn path_for(package: &str, templates_root: &Path) -> PathBuf {
        templates_root.join(scoped_path(package)).join(MANIFEST_FILE)
    }

    /// Locate the template for `package`.
    ///
    /// A document that exists but lacks the template marker is rejected, so
    /// ordinary manifests are never picked up as templates.
    pub fn locate(package: &str, templates_root: &Path) -> Result<Option<Self>> {
        let path = Self::path_for(package, templates_root);
        if !path.is_file() {
            return Ok(None);
        }

        let document = Manifest::load_document(&path)?;
        if !Manifest::is_template_document(&document) {
            debug!("{} is not a template, ignoring", path.display());
            return Ok(None);
        }
        let document = Manifest::from_document(&path, document)?;
        Ok(Self::from_manifest(path, document))
    }

    /// Wrap `document` if it is template-marked.
    pub fn from_manifest(path: PathBuf, document: Manifest) -> Option<Self> {
        let rules = TemplateRules::from_value(document.template_block()?);
        Some(Template {
            path,
            rules,
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rules(&self) -> &TemplateRules {
        &self.rules
    }

    pub fn permits(&self, section: Section, key: &str) -> bool {
        self.rules.permits(section, key)
    }

    /// Fresh manifest seeded from this template.
    ///
    /// The template's sections are kept (defaulted if absent) and its marker
    /// block is replaced by `provenance`. The template itself is not modified.
    pub fn seed(&self, provenance: Value) -> Manifest {
        let mut manifest = self.document.clone();
        manifest.provenance = Some(provenance);
        manifest.ensure_sections();
        manifest
    }
}

/// Whether `key` may be emitted in `section`. Without a template everything is permitted.
pub fn permits(template: Option<&Template>, section: Section, key: &str) -> bool {
    template.map_or(true, |t| t.permits(section, key))
}
