//! Platform-specific default locations
//!
//! - Unix/macOS: `~/.config/mcu-manifest` and `~/.cache/mcu-manifest`
//! - Windows: the platform config and cache directories

use std::path::PathBuf;

/// Directory name used under the config and cache roots.
pub const APP_DIR: &str = "mcu-manifest";

/// Default config file name.
pub const CONFIG_FILE: &str = "mcu.toml";

/// Pointer file next to the default config that redirects to another config file.
pub const CONFIG_POINTER_FILE: &str = ".mcu_config_path";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "MCU_MANIFEST_CONFIG";

/// Directory holding the config file and the log.
pub fn config_dir() -> PathBuf {
    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir().map_or_else(
            || PathBuf::from(".config").join(APP_DIR),
            |h| h.join(".config").join(APP_DIR),
        )
    }

    #[cfg(target_os = "windows")]
    {
        dirs::config_dir().map_or_else(|| PathBuf::from(APP_DIR), |c| c.join(APP_DIR))
    }
}

/// Default destination tree for generated manifests.
pub fn default_destination() -> PathBuf {
    #[cfg(not(target_os = "windows"))]
    {
        dirs::home_dir().map_or_else(
            || PathBuf::from(".cache").join(APP_DIR).join("manifests"),
            |h| h.join(".cache").join(APP_DIR).join("manifests"),
        )
    }

    #[cfg(target_os = "windows")]
    {
        dirs::cache_dir().map_or_else(
            || PathBuf::from(APP_DIR).join("manifests"),
            |c| c.join(APP_DIR).join("manifests"),
        )
    }
}
