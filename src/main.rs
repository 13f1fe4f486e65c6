//! kvquery - parse query strings from arguments or stdin.
//!
//! Each argument (or, without arguments, each stdin line) is parsed as one
//! query and printed as a JSON record or re-serialized query string.
//! Settings come from `KVQUERY_*` environment variables.

use std::io;

use tracing::{error, info};

use kvquery::cli::{self, Runner};
use kvquery::config::Config;
use kvquery::observability::QueryMetrics;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("kvquery {}", kvquery::VERSION);
        return Ok(());
    }

    let config = Config::from_env()?;

    if let Err(e) = kvquery::logging::init(&config.logging) {
        eprintln!("Warning: logging already initialized: {}", e);
    }

    info!(version = kvquery::VERSION, "kvquery starting");
    config.log_summary();

    let metrics = if config.parser.metrics {
        Some(QueryMetrics::new()?)
    } else {
        None
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = if args.is_empty() {
        cli::run(&config.parser, io::stdin().lock(), &mut out, metrics.as_ref())?
    } else {
        let mut runner = Runner::new(&config.parser, metrics.as_ref())?;
        for arg in &args {
            runner.process(arg.as_bytes(), &mut out)?;
        }
        runner.summary()
    };

    info!(
        queries = summary.queries,
        failed = summary.failed,
        pairs = summary.pairs,
        "done"
    );

    if let Some(metrics) = &metrics {
        print!("{}", metrics.encode()?);
    }

    if summary.failed > 0 {
        error!(failed = summary.failed, "some queries were rejected");
        std::process::exit(1);
    }

    Ok(())
}
