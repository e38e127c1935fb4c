//! Configuration for the mcu manifest generator
//!
//! Settings live in a TOML file (`~/.config/mcu-manifest/mcu.toml` by default)
//! and name the templates root, the package search roots and the destination
//! tree manifests are written to.

pub mod config;
pub mod paths;

pub use config::{Config, ConfigError};
