//! esq
//!
//! Compiles clause flags into an Elasticsearch bool query, scrolls through
//! every hit and prints them to stdout. Logs go to stderr.

mod config;
mod output;

use std::io;
use std::sync::Arc;

use clap::Parser;
use esq::{
    CleanupReport, ElasticsearchTransport, EsqError, QueryCompiler, ScrollExecutor, clear_scrolls,
};
use tracing::{info, warn};

use crate::config::CliConfig;
use crate::output::write_hits;

/// Initializes the tracing subscriber. `RUST_LOG` overrides `level`.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("esq={level},esq_cli={level}")));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let options = config.scroll_options();
    let request =
        QueryCompiler::new(options.default_leaf).compile_request(&config.clauses(), options.page_size);

    if config.dry_run {
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    let transport = Arc::new(ElasticsearchTransport::new(&config.client_config())?);

    if !config.clear_scrolls.is_empty() {
        let report = clear_scrolls(transport.as_ref(), config.clear_scrolls.clone()).await;
        if let CleanupReport::Failed { message, .. } = report {
            anyhow::bail!("Failed to clear scroll ids: {}", message);
        }
        return Ok(());
    }

    info!(
        url = %config.url,
        indices = %options.index_expression(),
        statements = request.bool_query().len(),
        "Starting scroll search"
    );

    let executor = ScrollExecutor::new(transport, options);
    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let mut stdout = io::stdout().lock();
    match executor.execute_until(&request, cancel).await {
        Ok(results) => {
            write_hits(&mut stdout, &results.hits, config.format, config.source_only)?;
            if config.keep_scrolls {
                info!(scroll_ids = ?results.scroll_ids, "Scroll cursors kept");
            }
            // Let the DELETE finish before the runtime shuts down
            results.cleanup.wait().await;
            Ok(())
        }
        Err(EsqError::Incomplete { source, partial }) => {
            write_hits(&mut stdout, &partial, config.format, config.source_only)?;
            warn!(hits = partial.len(), "Printed partial results");
            anyhow::bail!("scroll aborted after {} hits: {}", partial.len(), source)
        }
        Err(e) => Err(e.into()),
    }
}
