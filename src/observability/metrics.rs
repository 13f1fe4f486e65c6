//! Prometheus metrics for query parsing.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

use crate::error::QueryError;
use crate::query::QueryTable;

/// Parse counters and input size distribution.
///
/// Each instance owns its own registry, so several can coexist (one per
/// worker, one per test).
pub struct QueryMetrics {
    registry: Registry,

    /// Parses by outcome (`ok` or an error label)
    pub parses_total: IntCounterVec,

    /// Pairs stored across all successful parses
    pub pairs_total: IntCounter,

    /// Strings that overflowed the arena
    pub pool_spills_total: IntCounter,

    /// Raw query length in bytes
    pub input_bytes: Histogram,
}

impl QueryMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let parses_total = IntCounterVec::new(
            Opts::new("kvquery_parses_total", "Total query parses by result"),
            &["result"],
        )?;
        registry.register(Box::new(parses_total.clone()))?;

        let pairs_total = IntCounter::new("kvquery_pairs_total", "Total pairs stored")?;
        registry.register(Box::new(pairs_total.clone()))?;

        let pool_spills_total = IntCounter::new(
            "kvquery_pool_spills_total",
            "Strings allocated directly after the pool arena was exhausted",
        )?;
        registry.register(Box::new(pool_spills_total.clone()))?;

        let input_bytes = Histogram::with_opts(
            HistogramOpts::new("kvquery_input_bytes", "Query string length in bytes")
                .buckets(vec![16.0, 64.0, 256.0, 1024.0, 4096.0, 16384.0, 65536.0]),
        )?;
        registry.register(Box::new(input_bytes.clone()))?;

        Ok(Self {
            registry,
            parses_total,
            pairs_total,
            pool_spills_total,
            input_bytes,
        })
    }

    /// Record one parse of `input_len` bytes into `table`.
    ///
    /// Pairs are counted on failure too: a failed parse may keep the pairs
    /// stored before the error.
    pub fn record_parse(
        &self,
        input_len: usize,
        result: &Result<(), QueryError>,
        table: &QueryTable,
    ) {
        let label = match result {
            Ok(()) => "ok",
            Err(e) => e.kind().label(),
        };
        self.parses_total.with_label_values(&[label]).inc();
        self.pairs_total.inc_by(u64::from(table.count()));
        self.pool_spills_total
            .inc_by(table.pool_stats().spilled as u64);
        self.input_bytes.observe(input_len as f64);
    }

    /// Parses recorded with outcome `label`.
    pub fn parses(&self, label: &str) -> u64 {
        self.parses_total.with_label_values(&[label]).get()
    }

    /// Render in Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Get the Prometheus registry (for custom metrics).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
