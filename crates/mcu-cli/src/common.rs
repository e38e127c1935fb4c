//! Common types shared across commands

use clap::{Args, Parser};
use std::path::PathBuf;

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Only report errors")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Get the effective verbosity level
    /// - 0: quiet/warn only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Default `tracing` level when `RUST_LOG` is unset
    pub fn tracing_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Where packages and templates are looked up; overrides the config file
#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// Directory holding manifest templates (config: templates-root)
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// Directory packages are resolved from; repeat for more (config: search-roots)
    #[arg(long = "search-root", value_name = "DIR")]
    pub search_roots: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_overrides_verbose() {
        let opts = GlobalOpts {
            quiet: true,
            verbose: 2,
        };
        assert_eq!(opts.verbosity_level(), 0);
        assert_eq!(opts.tracing_level(), "error");
    }

    #[test]
    fn test_verbose_levels() {
        let mut opts = GlobalOpts::default();
        assert_eq!(opts.tracing_level(), "warn");
        opts.verbose = 1;
        assert_eq!(opts.tracing_level(), "debug");
        opts.verbose = 3;
        assert_eq!(opts.tracing_level(), "trace");
    }
}
