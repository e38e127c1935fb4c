//! npm package resolution
//!
//! Locates `package.json` descriptors in `node_modules` trees and reads the
//! fields manifest synthesis needs.

use crate::errors::{ManifestError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of an npm package descriptor file.
pub const DESCRIPTOR_FILE: &str = "package.json";

/// Map a slash-separated package name (`@scope/pkg`) to nested path segments.
pub fn scoped_path(package: &str) -> PathBuf {
    package
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Maps a package name to the path of its `package.json`.
pub trait PackageResolver {
    /// Try each search root in order; the first hit wins.
    fn resolve(&self, package: &str, search_roots: &[PathBuf]) -> Option<PathBuf>;
}

/// Node-style lookup: `node_modules/<name>/package.json` in each search root
/// and then in every ancestor of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModulesResolver;

impl NodeModulesResolver {
    fn resolve_from(package: &str, base: &Path) -> Option<PathBuf> {
        let relative = Path::new("node_modules")
            .join(scoped_path(package))
            .join(DESCRIPTOR_FILE);
        base.ancestors()
            .map(|dir| dir.join(&relative))
            .find(|candidate| candidate.is_file())
    }
}

impl PackageResolver for NodeModulesResolver {
    fn resolve(&self, package: &str, search_roots: &[PathBuf]) -> Option<PathBuf> {
        let found = search_roots
            .iter()
            .find_map(|root| Self::resolve_from(package, root));
        match &found {
            Some(path) => debug!("Resolved '{}' to {}", package, path.display()),
            None => debug!(
                "'{}' not found below {} search root(s)",
                package,
                search_roots.len()
            ),
        }
        found
    }
}

/// The parts of `package.json` synthesis reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub exports: Option<Value>,
    /// Declared dependencies, in declaration order
    #[serde(default)]
    pub dependencies: Map<String, Value>,

    #[serde(skip)]
    pub(crate) path: PathBuf,
}

impl PackageDescriptor {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut descriptor: PackageDescriptor =
            serde_json::from_str(&content).map_err(|e| ManifestError::InvalidDescriptor {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        descriptor.path = path.to_path_buf();
        Ok(descriptor)
    }

    /// Path of the descriptor file itself
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Package root directory
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Declared name, falling back to the name it was requested under.
    pub fn public_name<'a>(&'a self, requested: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(requested)
    }

    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_package(root: &Path, name: &str, descriptor: &Value) -> Option<PathBuf> {
        let dir = root.join("node_modules").join(scoped_path(name));
        fs::create_dir_all(&dir).ok()?;
        let path = dir.join(DESCRIPTOR_FILE);
        fs::write(&path, serde_json::to_string(descriptor).ok()?).ok()?;
        Some(path)
    }

    #[test]
    fn test_scoped_path() {
        assert_eq!(scoped_path("leaf"), PathBuf::from("leaf"));
        assert_eq!(
            scoped_path("@scope/pkg"),
            Path::new("@scope").join("pkg")
        );
    }

    #[test]
    fn test_resolve_walks_ancestors() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let Some(expected) = write_package(temp_dir.path(), "leaf", &json!({ "name": "leaf" }))
        else {
            return;
        };
        let nested = temp_dir.path().join("app").join("src");
        if fs::create_dir_all(&nested).is_err() {
            return;
        }

        let resolved = NodeModulesResolver.resolve("leaf", &[nested]);
        assert_eq!(resolved, Some(expected));
    }

    #[test]
    fn test_resolve_respects_root_order() {
        let Ok(first) = TempDir::new() else {
            return;
        };
        let Ok(second) = TempDir::new() else {
            return;
        };
        let Some(in_second) = write_package(second.path(), "dep", &json!({})) else {
            return;
        };
        let Some(in_first) = write_package(first.path(), "dep", &json!({})) else {
            return;
        };

        let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(NodeModulesResolver.resolve("dep", &roots), Some(in_first));
        assert_eq!(
            NodeModulesResolver.resolve("dep", &roots[1..]),
            Some(in_second)
        );
        assert_eq!(NodeModulesResolver.resolve("missing", &roots), None);
    }

    #[test]
    fn test_descriptor_preserves_dependency_order() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let Some(path) = write_package(
            temp_dir.path(),
            "@scope/app",
            &json!({
                "name": "@scope/app",
                "dependencies": { "zeta": "^1.0.0", "alpha": "^2.0.0", "mid": "*" }
            }),
        ) else {
            return;
        };

        let Ok(descriptor) = PackageDescriptor::load(&path) else {
            panic!("descriptor should load");
        };
        let names: Vec<&str> = descriptor.dependency_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(descriptor.public_name("ignored"), "@scope/app");
        assert_eq!(descriptor.dir(), path.parent().unwrap_or(Path::new("")));
    }

    #[test]
    fn test_malformed_descriptor() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let path = temp_dir.path().join(DESCRIPTOR_FILE);
        if fs::write(&path, "{ not json").is_err() {
            return;
        }
        assert!(matches!(
            PackageDescriptor::load(&path),
            Err(ManifestError::InvalidDescriptor { .. })
        ));
    }
}
