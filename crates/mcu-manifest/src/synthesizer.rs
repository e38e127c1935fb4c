//! Recursive manifest synthesis
//!
//! Each package gets `<destination>/<scoped name>/manifest.json`. The first
//! version of a manifest is written before its dependencies are visited, which
//! makes it discoverable to them and is what terminates dependency cycles.

use crate::builder::{ManifestBuilder, MCU_MODULES_VAR, REQUIRE_KEY};
use crate::entry_point;
use crate::errors::Result;
use crate::package::{scoped_path, PackageDescriptor};
use crate::template::{permits, Section, Template};
use crate::types::{Manifest, MANIFEST_FILE};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Toolchain the generated manifests are written for.
pub const TOOLCHAIN_REFERENCE: &str = "https://github.com/Moddable-OpenSource/moddable";

/// Provenance block stamped on every generated manifest.
pub fn provenance_for(package: &str) -> Value {
    json!({
        "***": env!("CARGO_PKG_REPOSITORY"),
        "npm": package,
        "xs": MANIFEST_FILE,
        "@": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "ref": TOOLCHAIN_REFERENCE,
    })
}

impl ManifestBuilder {
    /// Destination manifest path for `package`.
    pub fn destination_for(package: &str, destination: &Path) -> PathBuf {
        destination.join(scoped_path(package)).join(MANIFEST_FILE)
    }

    /// Reuse an existing manifest for `package` if one is discoverable, otherwise synthesize it.
    pub fn generate(&mut self, package: &str, destination: &Path) -> Result<Option<PathBuf>> {
        if let Some(existing) = self.find_existing_manifest(package, Some(destination))? {
            info!("Using existing manifest for '{}': {}", package, existing.display());
            return Ok(Some(existing));
        }
        self.synthesize(package, destination)
    }

    /// Write the manifest for `package` and, recursively, for its dependencies.
    ///
    /// Returns `Ok(None)` when the package has no loadable entry point. Failing
    /// to resolve `package` itself is an error.
    pub fn synthesize(&mut self, package: &str, destination: &Path) -> Result<Option<PathBuf>> {
        let descriptor_path = self.resolve_descriptor_path(package)?;
        let descriptor = PackageDescriptor::load(&descriptor_path)?;
        let template = Template::locate(package, &self.templates_root)?;
        if let Some(t) = &template {
            debug!("'{}' uses template {}", package, t.path().display());
        }
        let template = template.as_ref();

        let module_name = descriptor.public_name(package).to_string();

        let mut entry = match entry_point::resolve_entry(&descriptor, &module_name) {
            Ok(entry) => entry,
            Err(e) if e.is_soft() => {
                warn!("{}", e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let manifest_path = Self::destination_for(package, destination);
        let manifest_dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| destination.to_path_buf());
        fs::create_dir_all(&manifest_dir)?;

        let module_permitted = permits(template, Section::Modules, &module_name);
        if module_permitted {
            entry = entry_point::ensure_loadable(&entry, &manifest_dir, self.names.as_mut())?;
        }

        let provenance = provenance_for(package);
        let mut manifest = match template {
            Some(t) => t.seed(provenance),
            None => {
                let mut fresh = Manifest::with_provenance(provenance);
                fresh.ensure_sections();
                fresh
            }
        };

        let mut mcu_modules = false;
        if permits(template, Section::Build, MCU_MODULES_VAR) {
            manifest.set_build_variable(MCU_MODULES_VAR, &self.templates_root.to_string_lossy())?;
            mcu_modules = true;
        }

        if permits(template, Section::Include, REQUIRE_KEY) {
            manifest.include_manifest(&self.require_manifest(mcu_modules));
        }

        if module_permitted {
            manifest.add_module(&entry_point::strip_extension(&entry), &module_name)?;
        }

        // Written before recursing so cyclic references find it.
        manifest.save_to_path(&manifest_path)?;
        info!("Wrote {}", manifest_path.display());

        let mut changed = false;
        for dependency in descriptor.dependency_names() {
            if !permits(template, Section::Include, dependency) {
                debug!("'{}': dependency '{}' not permitted by template", package, dependency);
                continue;
            }
            match self.include_dependency(dependency, destination) {
                Ok(Some(path)) => {
                    changed |= manifest.include_manifest(&path.to_string_lossy());
                }
                Ok(None) => {}
                Err(e) if e.skips_dependency() => {
                    warn!("'{}': skipping dependency '{}': {}", package, dependency, e);
                }
                Err(e) => return Err(e),
            }
        }

        if changed {
            manifest.save_to_path(&manifest_path)?;
            debug!("Updated includes of {}", manifest_path.display());
        }

        Ok(Some(manifest_path))
    }

    fn include_dependency(
        &mut self,
        dependency: &str,
        destination: &Path,
    ) -> Result<Option<PathBuf>> {
        if let Some(existing) = self.find_existing_manifest(dependency, Some(destination))? {
            return Ok(Some(existing));
        }
        self.synthesize(dependency, destination)
    }
}
