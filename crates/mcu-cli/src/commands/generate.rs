use super::builder_for;
use crate::common::{GlobalOpts, LocationArgs};
use crate::config_manager::Config;
use crate::logger;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct GenerateCommand {
    /// npm package name, e.g. `@scope/pkg`
    pub package: String,

    /// Root of the generated manifest tree (config: destination)
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    #[command(flatten)]
    pub locations: LocationArgs,

    /// Re-synthesize the root manifest even if one already exists
    #[arg(long)]
    pub force: bool,
}

/// Generate the manifest tree for a package and print the root manifest path.
///
/// Returns `Ok(None)` when the package has no loadable entry point.
pub fn handle_generate(cmd: GenerateCommand, opts: &GlobalOpts) -> Result<Option<PathBuf>> {
    let config = Config::load().context("Failed to load config")?;
    let destination = cmd.dest.unwrap_or_else(|| config.destination_path());
    let mut builder = builder_for(&cmd.locations, &config)?;

    logger::step(&format!(
        "Generating manifests for '{}' into {}",
        cmd.package,
        destination.display()
    ));
    logger::spinner_start(&format!("Generating manifest for {}", cmd.package));

    let result = if cmd.force {
        info!("Re-synthesizing '{}' regardless of existing manifests", cmd.package);
        builder.synthesize(&cmd.package, &destination)
    } else {
        builder.generate(&cmd.package, &destination)
    };

    let written = match result {
        Ok(written) => written,
        Err(e) => {
            logger::spinner_error(&format!("Failed to generate {}", cmd.package));
            return Err(e)
                .with_context(|| format!("Could not generate manifest for '{}'", cmd.package));
        }
    };

    match &written {
        Some(path) => {
            logger::spinner_success(&format!("Manifest ready for {}", cmd.package));
            println!("{}", path.display());
        }
        None => {
            logger::spinner_stop();
            logger::warn(&format!(
                "'{}' has no loadable entry point; nothing was written",
                cmd.package
            ));
        }
    }

    if opts.verbosity_level() > 0 {
        logger::show_log_path();
    }

    Ok(written)
}
