//! Manifest builder state shared by discovery and synthesis

use crate::errors::{ManifestError, Result};
use crate::naming::{RandomNames, UniqueNameProvider};
use crate::package::{NodeModulesResolver, PackageResolver};
use std::fmt;
use std::path::{Path, PathBuf};

/// Build variable pointing at the templates root.
pub const MCU_MODULES_VAR: &str = "MCUMODULES";

/// Include key that pulls in the `require` support manifest.
pub const REQUIRE_KEY: &str = "require";

/// Walks npm dependency graphs and writes one manifest per package.
pub struct ManifestBuilder {
    pub(crate) templates_root: PathBuf,
    pub(crate) search_roots: Vec<PathBuf>,
    pub(crate) resolver: Box<dyn PackageResolver>,
    pub(crate) names: Box<dyn UniqueNameProvider>,
}

impl ManifestBuilder {
    /// Builder rooted at `templates_root` (the `mcu_nodes` directory).
    ///
    /// Defaults: node_modules resolution from the templates root, random alias names.
    pub fn new(templates_root: impl Into<PathBuf>) -> Result<Self> {
        let templates_root = templates_root.into();
        if templates_root.as_os_str().is_empty() {
            return Err(ManifestError::InvalidArgument(
                "templates root must not be empty".to_string(),
            ));
        }
        Ok(ManifestBuilder {
            search_roots: vec![templates_root.clone()],
            templates_root,
            resolver: Box::new(NodeModulesResolver),
            names: Box::new(RandomNames::default()),
        })
    }

    /// Replace the ordered list of directories packages are resolved from.
    pub fn with_search_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.search_roots = roots;
        self
    }

    pub fn with_resolver(mut self, resolver: impl PackageResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_name_provider(mut self, names: impl UniqueNameProvider + 'static) -> Self {
        self.names = Box::new(names);
        self
    }

    pub fn templates_root(&self) -> &Path {
        &self.templates_root
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    /// Path of `package`'s `package.json`.
    pub fn resolve_descriptor_path(&self, package: &str) -> Result<PathBuf> {
        self.resolver
            .resolve(package, &self.search_roots)
            .ok_or_else(|| ManifestError::UnresolvedPackage(package.to_string()))
    }

    /// `require` support manifest, addressed through `$(MCUMODULES)` when that variable is set.
    pub(crate) fn require_manifest(&self, via_variable: bool) -> String {
        let base = if via_variable {
            format!("$({})", MCU_MODULES_VAR)
        } else {
            self.templates_root.to_string_lossy().into_owned()
        };
        format!("{}/{}/manifest.json", base, REQUIRE_KEY)
    }
}

impl fmt::Debug for ManifestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestBuilder")
            .field("templates_root", &self.templates_root)
            .field("search_roots", &self.search_roots)
            .finish_non_exhaustive()
    }
}
