//! Cooldown filtering over upstream module metadata
//!
//! Answers the three metadata queries of the proxy protocol with every version
//! younger than the cutoff hidden:
//!
//! - [`CooldownFilter::filtered_list`]: `@v/list` minus ineligible versions
//! - [`CooldownFilter::version_info`]: `@v/<version>.info`, hidden when too new
//! - [`CooldownFilter::latest`]: `@latest`, scanning back through the list when
//!   the upstream latest is too new

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::FETCH_CONCURRENCY;
use crate::cooldown::cache::{CacheKey, MetadataCache};
use crate::cooldown::error::{CooldownError, UpstreamError};
use crate::cooldown::types::VersionInfo;
use crate::cooldown::upstream::Upstream;

pub struct CooldownFilter {
    upstream: Arc<dyn Upstream>,
    cache: MetadataCache,
}

impl CooldownFilter {
    pub fn new(upstream: Arc<dyn Upstream>, cache: MetadataCache) -> Self {
        Self { upstream, cache }
    }

    pub fn upstream(&self) -> &Arc<dyn Upstream> {
        &self.upstream
    }

    pub fn cache(&self) -> &MetadataCache {
        &self.cache
    }

    /// Returns a version's metadata from the cache, fetching and caching it on a miss
    pub async fn lookup(
        &self,
        module: &str,
        version: &str,
    ) -> Result<Arc<VersionInfo>, UpstreamError> {
        let key = CacheKey::new(module, version);

        if let Some(cached) = self.cache.get(&key) {
            debug!(module, version, "cache hit");
            return Ok(cached);
        }

        debug!(module, version, "cache miss");

        let info = Arc::new(self.upstream.fetch_info(module, version).await?);
        self.cache.put(key, Arc::clone(&info));

        Ok(info)
    }

    /// Returns the upstream version list with every version published after
    /// `cutoff` removed, keeping upstream order.
    ///
    /// Versions whose metadata cannot be fetched are skipped.
    pub async fn filtered_list(
        &self,
        module: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<String>, UpstreamError> {
        let versions = self.upstream.fetch_list(module).await?;

        let lookups = stream::iter(versions)
            .map(|version| async move {
                let result = self.lookup(module, &version).await;
                (version, result)
            })
            .buffered(FETCH_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        let mut eligible = Vec::with_capacity(lookups.len());
        for (version, result) in lookups {
            match result {
                Ok(info) if info.is_eligible(cutoff) => {
                    debug!(module, %version, time = %info.time, "version included");
                    eligible.push(version);
                }
                Ok(info) => {
                    info!(module, %version, time = %info.time, %cutoff, "version filtered out");
                }
                Err(e) => {
                    warn!(module, %version, error = %e, "failed to fetch version info, skipping");
                }
            }
        }

        Ok(eligible)
    }

    /// Returns a single version's metadata, or [`CooldownError::Hidden`] when it
    /// was published after `cutoff`.
    pub async fn version_info(
        &self,
        module: &str,
        version: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Arc<VersionInfo>, CooldownError> {
        let info = self.lookup(module, version).await?;

        if !info.is_eligible(cutoff) {
            info!(module, version, time = %info.time, %cutoff, "version too new");
            return Err(CooldownError::Hidden);
        }

        Ok(info)
    }

    /// Returns the newest version published at or before `cutoff`.
    ///
    /// Uses the upstream `@latest` when it is old enough; otherwise walks the
    /// version list from its end (newest last) back to the first eligible entry.
    pub async fn latest(
        &self,
        module: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Arc<VersionInfo>, CooldownError> {
        let latest = Arc::new(self.upstream.fetch_latest(module).await?);
        self.cache
            .put(CacheKey::new(module, &latest.version), Arc::clone(&latest));

        if latest.is_eligible(cutoff) {
            return Ok(latest);
        }

        info!(
            module,
            latest_time = %latest.time,
            %cutoff,
            "latest version too new, searching for older version"
        );

        let versions = self.upstream.fetch_list(module).await?;

        for version in versions.iter().rev() {
            match self.lookup(module, version).await {
                Ok(info) if info.is_eligible(cutoff) => return Ok(info),
                Ok(_) => {}
                Err(e) => {
                    warn!(module, %version, error = %e, "failed to fetch version info");
                }
            }
        }

        info!(module, "no versions found within cooldown period");
        Err(CooldownError::NoEligibleVersion)
    }
}
