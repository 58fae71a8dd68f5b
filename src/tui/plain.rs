//! Clear-and-print renderer for terminals where the full TUI is unwanted.

use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};
use std::fmt::Write as _;
use std::io::{Write, stdout};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::state::Snapshot;

/// Text report for one snapshot
pub fn format_report(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let range = snapshot.range;
    let counters = snapshot.counters;

    let _ = writeln!(out, "ip: {}", snapshot.target.resolved);
    let _ = writeln!(
        out,
        "range: {}-{}({})",
        range.start(),
        range.end(),
        range.len()
    );
    let _ = writeln!(out, "total: {}", counters.total);
    let _ = writeln!(out, "dead: {}", counters.dead);
    let _ = writeln!(out, "live: {}", counters.active);

    for entry in &snapshot.reachable {
        let _ = writeln!(out, "{}: {}ms", entry.port, entry.latency_ms);
    }
    out
}

/// Redraw the report every time the scheduler publishes a snapshot
pub async fn run_plain(
    mut snapshots: watch::Receiver<Snapshot>,
    cancel: CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    // Scheduler is gone
                    break;
                }
                let report = format_report(&snapshots.borrow_and_update());

                let mut out = stdout().lock();
                execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
                out.write_all(report.as_bytes())?;
                out.flush()?;
            }
        }
    }
    Ok(())
}
