//! Common types shared by the cache, the upstream client and the filter

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a single published module version, as served by `.info` and `@latest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionInfo {
    pub version: String,
    /// When the version became available upstream
    pub time: DateTime<Utc>,
}

impl VersionInfo {
    pub fn new(version: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            time,
        }
    }

    /// A version is eligible once it was published at or before the cutoff
    pub fn is_eligible(&self, cutoff: DateTime<Utc>) -> bool {
        self.time <= cutoff
    }
}

/// Latest publish time a version may have to be visible under `cooldown`, measured from `now`
pub fn cutoff(now: DateTime<Utc>, cooldown: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(cooldown).unwrap_or(if cooldown > TimeDelta::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
