pub mod csv;
pub mod json;

pub use self::csv::*;
pub use self::json::*;

use anyhow::{Context, Result};
use std::path::Path;

use crate::state::Snapshot;

/// Write a snapshot to `path`, CSV for a `.csv` extension and JSON otherwise
pub fn export_to_path(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        export_csv(snapshot, file)
    } else {
        export_json(snapshot, file)
    }
}
