//! Quota Management
//!
//! Manages user quotas and usage tracking for SaaS mode.
//! Quotas are fetched from HiveHub and enforced before operations.

use super::client::HubClient;
use super::restrictions::Plan;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserQuota {
    pub user_id: Uuid,
    pub plan: Plan,
    pub storage_used: u64,
    pub storage_limit: u64,
    pub monthly_operations: u64,
    pub monthly_operations_limit: u64,
    pub updated_at: Instant,
}

impl UserQuota {
    /// Check if storage quota is available
    pub fn has_storage_available(&self, required_bytes: u64) -> bool {
        self.storage_used + required_bytes <= self.storage_limit
    }

    /// Check if operations quota is available
    pub fn has_operations_available(&self) -> bool {
        self.monthly_operations < self.monthly_operations_limit
    }

    /// Get remaining storage bytes
    pub fn remaining_storage(&self) -> u64 {
        self.storage_limit.saturating_sub(self.storage_used)
    }

    /// Get remaining operations
    pub fn remaining_operations(&self) -> u64 {
        self.monthly_operations_limit
            .saturating_sub(self.monthly_operations)
    }

    /// Check if quota data is stale (older than cache TTL)
    pub fn is_stale(&self, cache_ttl: Duration) -> bool {
        self.updated_at.elapsed() > cache_ttl
    }
}

/// Quota manager with local cache
pub struct QuotaManager {
    /// Cached quotas per user (user_id -> UserQuota)
    cache: Arc<RwLock<HashMap<Uuid, UserQuota>>>,
    /// Cache TTL
    cache_ttl: Duration,
}

impl QuotaManager {
    /// Create a new quota manager
    pub fn new(cache_ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            cache_ttl,
        }
    }

    /// Get quota for a user (from cache if available)
    pub fn get_quota(&self, user_id: &Uuid) -> Option<UserQuota> {
        let cache = self.cache.read();
        cache
            .get(user_id)
            .filter(|q| !q.is_stale(self.cache_ttl))
            .cloned()
    }

    /// Update quota in cache
    pub fn update_quota(&self, quota: UserQuota) {
        let mut cache = self.cache.write();
        cache.insert(quota.user_id, quota);
    }

    /// Remove quota from cache (force refresh on next access)
    pub fn invalidate_quota(&self, user_id: &Uuid) {
        let mut cache = self.cache.write();
        cache.remove(user_id);
    }

    /// Clear all cached quotas
    pub fn clear_cache(&self) {
        let mut cache = self.cache.write();
        cache.clear();
    }

    /// Check if user can perform a storage operation
    pub fn check_storage_quota(&self, user_id: &Uuid, required_bytes: u64) -> Result<(), String> {
        let quota = self
            .get_quota(user_id)
            .ok_or_else(|| "Quota not found. Please authenticate.".to_string())?;

        if !quota.has_storage_available(required_bytes) {
            return Err(format!(
                "Storage quota exceeded. Used: {} bytes, Limit: {} bytes, Required: {} bytes",
                quota.storage_used, quota.storage_limit, required_bytes
            ));
        }

        Ok(())
    }

    /// Check if user can perform an operation
    pub fn check_operations_quota(&self, user_id: &Uuid) -> Result<(), String> {
        let quota = self
            .get_quota(user_id)
            .ok_or_else(|| "Quota not found. Please authenticate.".to_string())?;

        if !quota.has_operations_available() {
            return Err(format!(
                "Monthly operations quota exceeded. Used: {}, Limit: {}",
                quota.monthly_operations, quota.monthly_operations_limit
            ));
        }

        Ok(())
    }

    /// Increment storage usage locally (will be synced to Hub periodically)
    pub fn increment_storage(&self, user_id: &Uuid, bytes: u64) {
        let mut cache = self.cache.write();
        if let Some(quota) = cache.get_mut(user_id) {
            quota.storage_used = quota.storage_used.saturating_add(bytes);
            quota.updated_at = Instant::now();
        }
    }

    /// Decrement storage usage locally
    pub fn decrement_storage(&self, user_id: &Uuid, bytes: u64) {
        let mut cache = self.cache.write();
        if let Some(quota) = cache.get_mut(user_id) {
            quota.storage_used = quota.storage_used.saturating_sub(bytes);
            quota.updated_at = Instant::now();
        }
    }

    /// Increment operations count locally
    pub fn increment_operations(&self, user_id: &Uuid) {
        let mut cache = self.cache.write();
        if let Some(quota) = cache.get_mut(user_id) {
            quota.monthly_operations = quota.monthly_operations.saturating_add(1);
            quota.updated_at = Instant::now();
        }
    }

    /// Get cache statistics
    pub fn get_stats(&self) -> QuotaManagerStats {
        let cache = self.cache.read();
        QuotaManagerStats {
            cached_users: cache.len(),
            cache_ttl_seconds: self.cache_ttl.as_secs(),
        }
    }

    /// Start periodic quota sync background task
    ///
    /// Periodically refreshes stale quotas from HiveHub API to ensure
    /// local cache stays in sync with the source of truth.
    ///
    /// # Phase 4.6 - Periodic quota sync
    ///
    /// # Arguments
    /// * `hub_client` - HubClient for fetching quotas from Hub API
    /// * `sync_interval` - How often to check and refresh stale quotas
    pub async fn start_quota_sync_task(&self, hub_client: Arc<HubClient>, sync_interval: Duration) {
        let mut ticker = interval(sync_interval);
        let cache_ref = self.cache.clone();
        let cache_ttl = self.cache_ttl;

        info!(
            "Quota sync task started - sync interval: {} seconds, cache TTL: {} seconds",
            sync_interval.as_secs(),
            cache_ttl.as_secs()
        );

        loop {
            ticker.tick().await;

            // Get list of users with stale quotas
            let stale_users: Vec<Uuid> = {
                let cache = cache_ref.read();
                cache
                    .iter()
                    .filter(|(_, quota)| quota.is_stale(cache_ttl))
                    .map(|(user_id, _)| *user_id)
                    .collect()
            };

            if stale_users.is_empty() {
                debug!("No stale quotas to refresh");
                continue;
            }

            info!(
                "Refreshing quotas for {} users with stale cache",
                stale_users.len()
            );

            // Refresh each stale quota from Hub API
            for user_id in stale_users {
                debug!("Refreshing quota for user {}", user_id);

                match hub_client.get_user_quota(&user_id).await {
                    Ok(quota) => {
                        debug!(
                            "Successfully refreshed quota for user {}: storage={}/{}, ops={}/{}",
                            user_id,
                            quota.storage_used,
                            quota.storage_limit,
                            quota.monthly_operations,
                            quota.monthly_operations_limit
                        );
                        self.update_quota(quota);
                    }
                    Err(e) => {
                        // Don't fail the sync task - just log and continue
                        // If Hub API is temporarily unavailable, we keep using cached data
                        error!(
                            "Failed to refresh quota for user {}: {}. Will retry in {} seconds",
                            user_id,
                            e,
                            sync_interval.as_secs()
                        );
                    }
                }
            }

            debug!("Quota sync cycle completed");
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuotaManagerStats {
    pub cached_users: usize,
    pub cache_ttl_seconds: u64,
}
