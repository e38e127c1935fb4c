pub mod config;
pub mod discover;
pub mod generate;

use crate::common::LocationArgs;
use crate::errors::CliError;
use crate::logger;
use mcu_config::Config;
use mcu_manifest::ManifestBuilder;

/// Build a [`ManifestBuilder`] from command-line locations, falling back to the config file.
///
/// Search roots default to the current directory when neither source names any.
pub fn builder_for(locations: &LocationArgs, config: &Config) -> Result<ManifestBuilder, CliError> {
    let templates = locations
        .templates
        .clone()
        .or_else(|| config.templates_root_path())
        .ok_or(CliError::MissingSetting("templates-root", "templates"))?;

    let mut search_roots = locations.search_roots.clone();
    if search_roots.is_empty() {
        search_roots = config.search_root_paths();
    }
    if search_roots.is_empty() {
        search_roots.push(std::env::current_dir()?);
    }

    logger::debug(&format!(
        "Templates root: {}, search roots: {:?}",
        templates.display(),
        search_roots
    ));

    Ok(ManifestBuilder::new(templates)?.with_search_roots(search_roots))
}
