//! # portlive
//!
//! Live TCP port availability scanner. Every port in a range is connected
//! to over and over; reachable ports are shown ranked by connect latency and
//! the view refreshes once per tick.
//!
//! ## Library Usage
//!
//! The public API exposes scan state, configuration and export:
//!
//! ```no_run
//! use portlive::config::Config;
//! use portlive::export::export_json_string;
//! use portlive::state::{PortRange, Sample, ScanSession, Target};
//!
//! let target = Target::new("localhost".into(), "127.0.0.1".parse().unwrap());
//! let mut session = ScanSession::new(target, PortRange::new(1, 1024), Config::default());
//! session.record(22, Sample::Reachable(3));
//!
//! let json = export_json_string(&session.snapshot()).unwrap();
//! println!("{json}");
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! portlive example.com              # Scan 1-65535
//! portlive example.com 1:1024       # Scan a range
//! portlive -c 500 --plain host 443  # Plain output, lower concurrency
//! ```

// Public API - data types and export functions
pub mod config;
pub mod export;
pub mod state;

// Internal implementation - not part of public API
// These modules are used by the binary but not exported from the lib
#[allow(dead_code)]
pub(crate) mod cli;
#[allow(dead_code)]
pub(crate) mod lookup;
#[allow(dead_code)]
pub(crate) mod probe;
#[allow(dead_code)]
pub(crate) mod scan;
#[allow(dead_code)]
pub(crate) mod tui;
