//! Disk usage reporter
//!
//! The production implementation shells out to `df` and parses its
//! POSIX output. Any failure is an error the caller treats as "unavailable".

use async_trait::async_trait;
use log::debug;
use serde::Serialize;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::UsageError;
use crate::storage::filetype::human_size;

/// Space figures for the filesystem holding a volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeUsage {
    pub total: String,
    pub used: String,
    pub available: String,
    pub percent: u8,
    pub raw_total: u64,
    pub raw_used: u64,
    pub raw_available: u64,
}

impl VolumeUsage {
    pub fn from_bytes(total: u64, used: u64, available: u64, percent: u8) -> Self {
        Self {
            total: human_size(total),
            used: human_size(used),
            available: human_size(available),
            percent,
            raw_total: total,
            raw_used: used,
            raw_available: available,
        }
    }
}

/// Source of disk usage figures for a volume root
#[async_trait]
pub trait UsageReporter: Send + Sync {
    async fn usage(&self, root: &Path) -> Result<VolumeUsage, UsageError>;
}

/// Runs `df -P -k` with a deadline
#[derive(Debug, Clone)]
pub struct DfReporter {
    timeout: Duration,
}

impl DfReporter {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl UsageReporter for DfReporter {
    async fn usage(&self, root: &Path) -> Result<VolumeUsage, UsageError> {
        let mut command = Command::new("df");
        // -P keeps each filesystem on one line even with long device names
        command
            .arg("-P")
            .arg("-k")
            .arg(root)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| UsageError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(UsageError::Failed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let usage = parse_df_output(&stdout)?;
        debug!("Usage for {}: {}% used", root.display(), usage.percent);
        Ok(usage)
    }
}

/// Parses `df -P -k` output: a header line, then
/// `Filesystem 1024-blocks Used Available Capacity Mounted-on`.
///
/// The numeric run is located by shape rather than column index, so device
/// names containing spaces still parse.
pub fn parse_df_output(stdout: &str) -> Result<VolumeUsage, UsageError> {
    let line = stdout
        .lines()
        .nth(1)
        .ok_or_else(|| UsageError::Parse("missing data line".into()))?;
    let fields: Vec<&str> = line.split_whitespace().collect();

    for window in fields.windows(4).skip(1) {
        let (Ok(total), Ok(used), Ok(available)) = (
            window[0].parse::<u64>(),
            window[1].parse::<u64>(),
            window[2].parse::<u64>(),
        ) else {
            continue;
        };
        let Some(Ok(percent)) = window[3].strip_suffix('%').map(str::parse::<u8>) else {
            continue;
        };

        return Ok(VolumeUsage::from_bytes(
            total.saturating_mul(1024),
            used.saturating_mul(1024),
            available.saturating_mul(1024),
            percent,
        ));
    }

    Err(UsageError::Parse(line.to_string()))
}
