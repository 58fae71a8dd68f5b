use clap::Parser;
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::lookup::AddressFamily;
use crate::state::PortRange;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortSpecError {
    #[error("invalid port number '{0}'")]
    InvalidNumber(String),
    #[error("empty port specification")]
    Empty,
}

/// Parse `PORT` or `START:END`; bounds are clamped, an inverted range collapses to START
pub fn parse_port_spec(spec: &str) -> Result<PortRange, PortSpecError> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Err(PortSpecError::Empty);
    }

    let number = |s: &str| {
        s.trim()
            .parse::<i64>()
            .map_err(|_| PortSpecError::InvalidNumber(s.to_string()))
    };

    match spec.split_once(':') {
        Some((start, end)) => Ok(PortRange::new(number(start)?, number(end)?)),
        None => {
            let port = number(spec)?;
            Ok(PortRange::new(port, port))
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "portlive",
    version,
    about = "Live TCP port availability scanner",
    long_about = "Repeatedly connects to every port in a range and shows reachable ports ranked by connect latency.\n\
                  Ports that refuse or time out are dropped after their retry budget runs out; reachable ports are re-probed for as long as the scan runs."
)]
pub struct Args {
    /// Host name or IP address to scan
    #[arg(required_unless_present = "completions")]
    pub target: Option<String>,

    /// Port or START:END range [default: 1:65535]
    #[arg(value_name = "PORTS", value_parser = parse_port_spec, allow_hyphen_values = true)]
    pub ports: Option<PortRange>,

    /// Maximum number of ports probed at once
    #[arg(short = 'c', long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Consecutive failures before a port is given up
    #[arg(short = 'r', long = "retries", value_name = "N")]
    pub retry_budget: Option<u32>,

    /// Delay between attempts on the same port, in milliseconds
    #[arg(short = 'i', long, value_name = "MS")]
    pub interval: Option<u64>,

    /// Screen refresh period, in milliseconds
    #[arg(long, value_name = "MS")]
    pub refresh: Option<u64>,

    /// Connect timeout per attempt in milliseconds (0 = operating system default)
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Only use IPv4 addresses
    #[arg(short = '4', conflicts_with = "ipv6")]
    pub ipv4: bool,

    /// Only use IPv6 addresses
    #[arg(short = '6')]
    pub ipv6: bool,

    /// Use the Nth resolved address instead of asking
    #[arg(long, value_name = "N")]
    pub pick: Option<usize>,

    /// Print a plain text report instead of the interactive view
    #[arg(long)]
    pub plain: bool,

    /// Write the final snapshot on exit (.csv for CSV, JSON otherwise)
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Config file [default: <config dir>/portlive/config.toml]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write logs to this file (level from PORTLIVE_LOG, default warn)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}

impl Args {
    pub fn family(&self) -> AddressFamily {
        if self.ipv4 {
            AddressFamily::V4
        } else if self.ipv6 {
            AddressFamily::V6
        } else {
            AddressFamily::Any
        }
    }

    pub fn range(&self) -> PortRange {
        self.ports.unwrap_or_default()
    }

    /// Override file/default settings with the flags that were given
    pub fn apply(&self, config: &mut Config) {
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(retry_budget) = self.retry_budget {
            config.retry_budget = retry_budget;
        }
        if let Some(ms) = self.interval {
            config.probe_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.refresh {
            config.refresh_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.timeout {
            config.connect_timeout = Duration::from_millis(ms);
        }
    }
}
