use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::state::Snapshot;

#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    port: u16,
    latency_ms: u64,
    target: &'a str,
    taken_at: String,
}

/// Export the reachable ports of a snapshot as CSV, one row per port
pub fn export_csv<W: Write>(snapshot: &Snapshot, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    let target = snapshot.target.resolved.to_string();
    let taken_at = snapshot.taken_at.to_rfc3339();

    for (i, entry) in snapshot.reachable.iter().enumerate() {
        csv.serialize(CsvRow {
            rank: i + 1,
            port: entry.port,
            latency_ms: entry.latency_ms,
            target: &target,
            taken_at: taken_at.clone(),
        })?;
    }

    csv.flush()?;
    Ok(())
}
