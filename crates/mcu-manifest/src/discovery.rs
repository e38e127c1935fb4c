//! Discovery of manifests that already exist on disk

use crate::builder::ManifestBuilder;
use crate::errors::Result;
use crate::package::scoped_path;
use crate::template::Template;
use crate::types::{Manifest, MANIFEST_FILE};
use std::path::{Path, PathBuf};
use tracing::debug;

impl ManifestBuilder {
    /// Candidate manifest locations for `package`, most preferred first:
    ///
    /// 1. `<package>/mcu/manifest.json`
    /// 2. `<package>/manifest.json` (deprecated)
    /// 3. `<templates root>/<package>/manifest.json`
    /// 4. `<extra>/<package>/manifest.json`
    pub fn manifest_candidates(
        &self,
        package: &str,
        package_dir: &Path,
        extra: Option<&Path>,
    ) -> Vec<PathBuf> {
        let mut candidates = vec![
            package_dir.join("mcu").join(MANIFEST_FILE),
            package_dir.join(MANIFEST_FILE),
            Template::path_for(package, &self.templates_root),
        ];
        if let Some(extra) = extra {
            candidates.push(extra.join(scoped_path(package)).join(MANIFEST_FILE));
        }
        candidates
    }

    /// First existing manifest for `package` that is not a template.
    ///
    /// Fails only if the package itself cannot be resolved; finding nothing is `Ok(None)`.
    pub fn find_existing_manifest(
        &self,
        package: &str,
        extra: Option<&Path>,
    ) -> Result<Option<PathBuf>> {
        let descriptor_path = self.resolve_descriptor_path(package)?;
        let package_dir = descriptor_path.parent().unwrap_or_else(|| Path::new("."));

        for candidate in self.manifest_candidates(package, package_dir, extra) {
            if !candidate.is_file() {
                continue;
            }
            if Manifest::is_template_document(&Manifest::load_document(&candidate)?) {
                debug!("Skipping template {}", candidate.display());
                continue;
            }
            debug!("Manifest for '{}' found at {}", package, candidate.display());
            return Ok(Some(candidate));
        }
        Ok(None)
    }
}
