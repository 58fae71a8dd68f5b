use anyhow::Result;
use std::io::Write;

use crate::state::Snapshot;

/// Export snapshot to JSON
pub fn export_json<W: Write>(snapshot: &Snapshot, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, snapshot)?;
    Ok(())
}

/// Export snapshot to JSON string
#[allow(dead_code)]
pub fn export_json_string(snapshot: &Snapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Export snapshot to file with auto-generated name
pub fn export_json_file(snapshot: &Snapshot) -> Result<String> {
    let timestamp = snapshot.taken_at.format("%Y%m%d-%H%M%S");
    let target = snapshot.target.original.replace([':', '/', '\\'], "_");
    let filename = format!("portlive-{}-{}.json", target, timestamp);

    let file = std::fs::File::create(&filename)?;
    export_json(snapshot, file)?;

    Ok(filename)
}
