//! mcu library - exposes command handlers for testing

pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
pub use mcu_config as config_manager;
pub use mcu_logger as logger;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Route library `tracing` events to stderr.
///
/// `RUST_LOG` wins when set; otherwise the level follows `-q`/`-v`.
pub fn init_tracing(opts: &GlobalOpts) {
    let level = opts.tracing_level();
    let installed = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mcu={level},mcu_manifest={level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
    if let Err(e) = installed {
        logger::warn(&format!("Failed to install tracing subscriber: {}", e));
    }
}
