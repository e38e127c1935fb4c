use super::builder_for;
use crate::common::{GlobalOpts, LocationArgs};
use crate::config_manager::Config;
use crate::logger;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct DiscoverCommand {
    /// npm package name, e.g. `@scope/pkg`
    pub package: String,

    /// Additional manifest tree to search, checked last
    #[arg(long, value_name = "DIR")]
    pub extra: Option<PathBuf>,

    #[command(flatten)]
    pub locations: LocationArgs,
}

/// Print the manifest that would be reused for a package, if any.
pub fn handle_discover(cmd: DiscoverCommand, _opts: &GlobalOpts) -> Result<Option<PathBuf>> {
    let config = Config::load().context("Failed to load config")?;
    let builder = builder_for(&cmd.locations, &config)?;

    let found = builder
        .find_existing_manifest(&cmd.package, cmd.extra.as_deref())
        .with_context(|| format!("Could not look up '{}'", cmd.package))?;

    match &found {
        Some(path) => println!("{}", path.display()),
        None => {
            logger::debug(&format!("No manifest found for '{}'", cmd.package));
            println!("{}", "no manifest".yellow());
        }
    }
    Ok(found)
}
