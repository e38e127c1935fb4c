//! Error types for the mcu CLI

use mcu_config::ConfigError;
use mcu_manifest::ManifestError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No {0} configured. Pass --{1} or run `mcu config set {0} <value>`")]
    MissingSetting(&'static str, &'static str),
}
