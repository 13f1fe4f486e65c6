//! Parser configuration.

use std::fmt;

use super::parse::{env_bool, env_or, env_parse};
use super::ConfigError;
use crate::alloc::SharedAllocator;
use crate::flags::ParseFlags;
use crate::pool::DEFAULT_POOL_SLACK;
use crate::query::{QueryTable, DEFAULT_MAX_PAIRS};

/// How the command line tool prints each parsed query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// One JSON record per query.
    Json,
    /// The pairs serialized back to `k=v&k=v`.
    Query,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Query => "query",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table settings loaded from environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Pair capacity; 0 selects the default (KVQUERY_MAX_PAIRS).
    pub max_pairs: u16,
    /// Parse flags (KVQUERY_FLAGS, comma-separated names).
    pub flags: ParseFlags,
    /// Arena slack in bytes (KVQUERY_POOL_SLACK).
    pub pool_slack: usize,
    /// Percent-encode serialized output (KVQUERY_ENCODE_OUTPUT).
    pub encode_output: bool,
    /// Output format (KVQUERY_OUTPUT).
    pub output: OutputFormat,
    /// Print metrics after processing (KVQUERY_METRICS).
    pub metrics: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_pairs: 0,
            flags: ParseFlags::DEFAULT,
            pool_slack: DEFAULT_POOL_SLACK,
            encode_output: false,
            output: OutputFormat::Json,
            metrics: false,
        }
    }
}

impl ParserConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let output = match env_or("KVQUERY_OUTPUT", "json").trim().to_lowercase().as_str() {
            "json" | "" => OutputFormat::Json,
            "query" => OutputFormat::Query,
            other => {
                return Err(ConfigError::Invalid {
                    key: "KVQUERY_OUTPUT".into(),
                    message: format!("'{}', expected: json, query", other),
                })
            }
        };

        Ok(Self {
            max_pairs: env_parse("KVQUERY_MAX_PAIRS", 0u16)?,
            flags: env_parse("KVQUERY_FLAGS", ParseFlags::DEFAULT)?,
            pool_slack: env_parse("KVQUERY_POOL_SLACK", DEFAULT_POOL_SLACK)?,
            encode_output: env_bool("KVQUERY_ENCODE_OUTPUT", false),
            output,
            metrics: env_bool("KVQUERY_METRICS", false),
        })
    }

    /// Capacity a table built from this configuration gets.
    pub fn effective_max_pairs(&self) -> u16 {
        if self.max_pairs == 0 {
            DEFAULT_MAX_PAIRS
        } else {
            self.max_pairs
        }
    }

    /// Create a table with these settings.
    pub fn build_table(&self) -> crate::Result<QueryTable> {
        Ok(QueryTable::new(self.max_pairs, self.flags)?.with_pool_slack(self.pool_slack))
    }

    /// Create a table with these settings on a specific allocator.
    pub fn build_table_with(&self, allocator: SharedAllocator) -> crate::Result<QueryTable> {
        Ok(QueryTable::with_allocator(self.max_pairs, self.flags, allocator)?
            .with_pool_slack(self.pool_slack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const KEYS: [&str; 6] = [
        "KVQUERY_MAX_PAIRS",
        "KVQUERY_FLAGS",
        "KVQUERY_POOL_SLACK",
        "KVQUERY_ENCODE_OUTPUT",
        "KVQUERY_OUTPUT",
        "KVQUERY_METRICS",
    ];

    fn clear() {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    // Single test so the KVQUERY_* variables are never mutated concurrently
    #[test]
    fn test_parser_config_from_env() {
        clear();
        let config = ParserConfig::from_env().unwrap();
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.effective_max_pairs(), 128);

        env::set_var("KVQUERY_MAX_PAIRS", "4");
        env::set_var("KVQUERY_FLAGS", "auto_decode,strict,trim-values");
        env::set_var("KVQUERY_POOL_SLACK", "0");
        env::set_var("KVQUERY_ENCODE_OUTPUT", "true");
        env::set_var("KVQUERY_OUTPUT", "Query");
        env::set_var("KVQUERY_METRICS", "1");
        let config = ParserConfig::from_env().unwrap();
        assert_eq!(config.max_pairs, 4);
        assert_eq!(
            config.flags,
            ParseFlags::AUTO_DECODE | ParseFlags::STRICT | ParseFlags::TRIM_VALUES
        );
        assert_eq!(config.pool_slack, 0);
        assert!(config.encode_output);
        assert_eq!(config.output, OutputFormat::Query);
        assert!(config.metrics);

        let table = config.build_table().unwrap();
        assert_eq!(table.max_pairs(), 4);
        assert!(table.flags().contains(ParseFlags::STRICT));

        env::set_var("KVQUERY_OUTPUT", "xml");
        let err = ParserConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        env::set_var("KVQUERY_OUTPUT", "json");
        env::set_var("KVQUERY_FLAGS", "auto_decode,bogus");
        let err = ParserConfig::from_env().unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to parse KVQUERY_FLAGS='auto_decode,bogus': unknown flag: bogus"
        );

        clear();
    }
}
