//! Command implementations.

pub mod collect;
pub mod config;
pub mod platforms;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration file
    pub config: Config,

    /// Output format
    pub output_format: OutputFormat,
}
