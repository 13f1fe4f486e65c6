//! Line-oriented front end: one query in, one record out.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{OutputFormat, ParserConfig};
use crate::error::QueryError;
use crate::observability::QueryMetrics;
use crate::query::QueryTable;
use crate::scan;

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Queries processed (blank lines are skipped).
    pub queries: usize,
    /// Queries whose parse returned an error.
    pub failed: usize,
    /// Pairs stored across all queries.
    pub pairs: usize,
}

#[derive(Serialize)]
struct PairRecord<'a> {
    key: Cow<'a, str>,
    value: Cow<'a, str>,
    encoded: bool,
}

#[derive(Serialize)]
struct ErrorRecord {
    kind: &'static str,
    message: String,
}

#[derive(Serialize)]
struct QueryRecord<'a> {
    input: Cow<'a, str>,
    valid: bool,
    count: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorRecord>,
    pairs: Vec<PairRecord<'a>>,
}

/// Parses queries with one reused table and writes one line per query.
pub struct Runner<'m> {
    table: QueryTable,
    output: OutputFormat,
    encode_output: bool,
    metrics: Option<&'m QueryMetrics>,
    summary: RunSummary,
}

impl<'m> Runner<'m> {
    pub fn new(config: &ParserConfig, metrics: Option<&'m QueryMetrics>) -> crate::Result<Self> {
        Ok(Self {
            table: config.build_table()?,
            output: config.output,
            encode_output: config.encode_output,
            metrics,
            summary: RunSummary::default(),
        })
    }

    /// Parse `query` and write its record to `out`.
    pub fn process<W: Write>(&mut self, query: &[u8], out: &mut W) -> io::Result<()> {
        let result = self.table.parse(query);
        if let Some(metrics) = self.metrics {
            metrics.record_parse(query.len(), &result, &self.table);
        }

        self.summary.queries += 1;
        self.summary.pairs += usize::from(self.table.count());
        if let Err(ref e) = result {
            self.summary.failed += 1;
            warn!(
                kind = e.kind().label(),
                stored = self.table.count(),
                "query rejected: {}",
                e
            );
        }

        match self.output {
            OutputFormat::Json => self.write_json(query, result.err(), out),
            OutputFormat::Query => {
                writeln!(out, "{}", self.table.to_query_string(self.encode_output))
            }
        }
    }

    fn write_json<W: Write>(
        &self,
        query: &[u8],
        error: Option<QueryError>,
        out: &mut W,
    ) -> io::Result<()> {
        let record = QueryRecord {
            input: String::from_utf8_lossy(query),
            valid: scan::is_valid(query),
            count: self.table.count(),
            error: error.map(|e| ErrorRecord {
                kind: e.kind().label(),
                message: e.to_string(),
            }),
            pairs: self
                .table
                .iter()
                .map(|p| PairRecord {
                    key: p.key_str(),
                    value: p.value_str(),
                    encoded: p.is_encoded,
                })
                .collect(),
        };
        serde_json::to_writer(&mut *out, &record)?;
        out.write_all(b"\n")
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }
}

/// Process every line of `reader` as a query and write records to `writer`.
///
/// Trailing `\r\n` or `\n` is stripped; blank lines are skipped.
pub fn run<R: BufRead, W: Write>(
    config: &ParserConfig,
    mut reader: R,
    mut writer: W,
    metrics: Option<&QueryMetrics>,
) -> io::Result<RunSummary> {
    let mut runner = Runner::new(config, metrics)
        .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;

    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let query = trim_line_end(&line);
        if query.is_empty() {
            continue;
        }
        runner.process(query, &mut writer)?;
    }
    writer.flush()?;

    let summary = runner.summary();
    debug!(
        queries = summary.queries,
        failed = summary.failed,
        pairs = summary.pairs,
        "input processed"
    );
    Ok(summary)
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
