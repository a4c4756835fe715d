//! CLI module for healthmon
//!
//! Provides the command-line interface for the endpoint health monitor.

use crate::monitor::{DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_MAX_CONCURRENT_PROBES};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP endpoint health monitor - periodic probes with per-domain availability
#[derive(Parser, Debug)]
#[command(name = "healthmon")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    HEALTHMON_INTERVAL_SECS   Seconds between check cycles (default: 15)
    HEALTHMON_CONCURRENCY     Probes in flight per cycle (default: 1)
    HEALTHMON_LOG_LEVEL       Log level (default: info, overridden by RUST_LOG)
"#)]
pub struct Cli {
    /// Path to the YAML configuration file
    pub config_file: PathBuf,

    /// Seconds between check cycles
    #[arg(
        long,
        default_value_t = DEFAULT_CHECK_INTERVAL_SECS,
        env = "HEALTHMON_INTERVAL_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_secs: u64,

    /// Maximum number of probes in flight within one cycle
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_CONCURRENT_PROBES,
        env = "HEALTHMON_CONCURRENCY"
    )]
    pub concurrency: usize,
}

impl Cli {
    /// Interval between check cycles.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
