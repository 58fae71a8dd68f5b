mod cli;
mod config;
mod export;
mod lookup;
mod probe;
mod scan;
mod state;
mod tui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::cli::Args;
use crate::config::Config;
use crate::export::export_to_path;
use crate::lookup::DnsLookup;
use crate::lookup::select::{choose_address, prompt_stdin};
use crate::probe::TcpConnector;
use crate::probe::socket::{concurrency_within_limit, nofile_wanted, raise_nofile_limit};
use crate::scan::scheduler::ProbeScheduler;
use crate::state::{ScanSession, Target};

/// Upper bound on the reverse lookup of the target
const REVERSE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        clap_complete::generate(shell, &mut cmd, "portlive", &mut std::io::stdout());
        return Ok(());
    }

    init_logging(&args)?;

    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let host = args.target.clone().context("missing target host")?;
    let range = args.range();

    let dns = DnsLookup::new();
    let candidates = dns.resolve(&host, args.family()).await?;
    let address = choose_address(&candidates, args.pick, prompt_stdin)?;

    let mut target = Target::new(host, address);
    target.hostname = tokio::time::timeout(REVERSE_LOOKUP_TIMEOUT, dns.reverse_lookup(address))
        .await
        .ok()
        .flatten();

    fit_nofile_limit(&mut config);
    info!(%address, %range, concurrency = config.concurrency, "starting scan");

    let connector = Arc::new(TcpConnector::new(config.connect_timeout()));
    let state = Arc::new(RwLock::new(ScanSession::new(target, range, config)));
    let cancel = CancellationToken::new();

    let initial = state.write().snapshot();
    let (snapshot_tx, snapshot_rx) = watch::channel(initial);

    let scheduler = ProbeScheduler::new(state.clone(), connector, cancel.clone());
    let scan_handle = tokio::spawn(scheduler.run(snapshot_tx));

    // Ctrl-C outside raw mode
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let ui_result = if args.plain {
        tui::plain::run_plain(snapshot_rx, cancel.clone()).await
    } else {
        tui::app::run_tui(snapshot_rx, cancel.clone()).await
    };

    cancel.cancel();
    scan_handle.await.context("scan task failed")??;

    if let Some(ref path) = args.export {
        let snapshot = state.write().snapshot();
        export_to_path(&snapshot, path)?;
        eprintln!("Exported to {}", path.display());
    }

    ui_result
}

/// Logs go to `--log-file`, to stderr in plain mode, and nowhere under the TUI
fn init_logging(args: &Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_env("PORTLIVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    let writer = match (&args.log_file, args.plain) {
        (Some(path), _) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            BoxMakeWriter::new(Arc::new(file))
        }
        (None, true) => BoxMakeWriter::new(std::io::stderr),
        (None, false) => BoxMakeWriter::new(std::io::sink),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(())
}

/// Make room for one socket per concurrent probe, shrinking the budget if the
/// open-file limit cannot be raised far enough
fn fit_nofile_limit(config: &mut Config) {
    match raise_nofile_limit(nofile_wanted(config.concurrency)) {
        Ok(limit) => {
            let fitted = concurrency_within_limit(config.concurrency, limit);
            if fitted < config.concurrency {
                warn!(
                    requested = config.concurrency,
                    fitted, limit, "open file limit too low, reducing concurrency"
                );
                config.concurrency = fitted;
            }
        }
        Err(e) => warn!(error = %e, "could not raise open file limit"),
    }
}
