//! Configuration loaded from environment variables.
//!
//! # Example
//!
//! ```rust,no_run
//! use kvquery::config::Config;
//!
//! let config = Config::from_env()?;
//! let mut table = config.parser.build_table()?;
//! table.parse("a=1&b=2")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod logging;
mod parse;
mod parser;

pub use error::ConfigError;
pub use logging::LoggingConfig;
pub use parser::{OutputFormat, ParserConfig};

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Table and output settings.
    pub parser: ParserConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            parser: ParserConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Max pairs: {}", self.parser.effective_max_pairs());
        info!("  Flags: {}", self.parser.flags);
        info!("  Pool slack: {} bytes", self.parser.pool_slack);
        info!("  Output: {}", self.parser.output);

        if self.parser.encode_output {
            info!("  Output encoding: enabled");
        }

        if self.parser.metrics {
            info!("  Metrics: enabled");
        }
    }
}
