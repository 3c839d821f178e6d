use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Mapbox free tier: 50,000 static image requests per month.
pub const MONTHLY_LIMIT: u64 = 50_000;

/// Requests kept in reserve for manual use outside of this tool.
pub const SAFETY_BUFFER: u64 = 2_000;

#[derive(Debug, Default, Deserialize, Serialize)]
struct UsageRecord {
    #[serde(default)]
    count: u64,
}

/// A cumulative request counter persisted as `{"count": n}`.
#[derive(Clone, Debug, PartialEq)]
pub struct UsageLog {
    path: PathBuf,
}

impl UsageLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored count, or 0 if the log doesn't exist yet or has no
    /// `count` field.
    pub fn read(&self) -> Result<u64> {
        if !self.path.exists() {
            return Ok(0);
        }

        let raw = fs::read_to_string(&self.path).with_context(|| {
            format!("failed reading usage log {}", self.path.display())
        })?;
        let record: UsageRecord = serde_json::from_str(&raw).with_context(|| {
            format!("malformed usage log {}", self.path.display())
        })?;

        Ok(record.count)
    }

    /// Replaces the stored count with `count`.
    pub fn write(&self, count: u64) -> Result<()> {
        let raw = serde_json::to_string(&UsageRecord { count })?;

        fs::write(&self.path, raw).with_context(|| {
            format!("failed writing usage log {}", self.path.display())
        })
    }
}

/// Request ceiling derived from the provider's monthly limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuotaPolicy {
    pub monthly_limit: u64,
    pub safety_buffer: u64,
}

impl QuotaPolicy {
    pub fn max_allowed(&self) -> u64 {
        self.monthly_limit.saturating_sub(self.safety_buffer)
    }

    pub fn is_exhausted(&self, count: u64) -> bool {
        count >= self.max_allowed()
    }
}

impl Default for QuotaPolicy {
    fn default() -> Self {
        Self {
            monthly_limit: MONTHLY_LIMIT,
            safety_buffer: SAFETY_BUFFER,
        }
    }
}

/// Usage tracking settings for a run.
#[derive(Clone, Debug, PartialEq)]
pub struct UsageQuota {
    pub log: UsageLog,
    pub policy: QuotaPolicy,
}
