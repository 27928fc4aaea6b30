//! Multi-Tenant Resource Helpers
//!
//! Provides helper functions for scoping resources by user in Hub mode.
//! In standalone mode, these functions pass through resource names unchanged.

use super::naming::ResourceNaming;
use uuid::Uuid;

/// Multi-tenant resource scoping helper
pub struct MultiTenant;

impl MultiTenant {
    /// Scope a queue name by user ID (in Hub mode)
    ///
    /// Format: `user_{user_id}:{queue_name}`
    ///
    /// # Arguments
    /// * `user_id` - Optional user ID (None for standalone mode)
    /// * `queue_name` - The queue name provided by user
    ///
    /// # Returns
    /// Scoped queue name if user_id is provided, otherwise original name
    pub fn scope_queue_name(user_id: Option<&Uuid>, queue_name: &str) -> String {
        match user_id {
            Some(uid) => ResourceNaming::format(uid, queue_name),
            None => queue_name.to_string(),
        }
    }

    /// Scope a stream name by user ID (in Hub mode)
    ///
    /// Format: `user_{user_id}:{stream_name}`
    pub fn scope_stream_name(user_id: Option<&Uuid>, stream_name: &str) -> String {
        match user_id {
            Some(uid) => ResourceNaming::format(uid, stream_name),
            None => stream_name.to_string(),
        }
    }

    /// Scope a KV key by user ID (in Hub mode)
    ///
    /// Format: `user_{user_id}:{key}`
    pub fn scope_kv_key(user_id: Option<&Uuid>, key: &str) -> String {
        match user_id {
            Some(uid) => ResourceNaming::format(uid, key),
            None => key.to_string(),
        }
    }

    /// Scope a pub/sub topic by user ID (in Hub mode)
    ///
    /// Format: `user_{user_id}:{topic}`
    pub fn scope_topic(user_id: Option<&Uuid>, topic: &str) -> String {
        match user_id {
            Some(uid) => ResourceNaming::format(uid, topic),
            None => topic.to_string(),
        }
    }

    /// Get user ID prefix for filtering resources
    ///
    /// Returns a prefix pattern for listing/scanning user resources
    /// Format: `user_{user_id}:*`
    pub fn get_user_prefix(user_id: &Uuid) -> String {
        format!("user_{}:", user_id.as_simple())
    }

    /// Check if a resource name belongs to a specific user
    ///
    /// # Arguments
    /// * `resource_name` - The full resource name
    /// * `user_id` - The user ID to check ownership for
    ///
    /// # Returns
    /// true if the resource belongs to the user, false otherwise
    pub fn check_ownership(resource_name: &str, user_id: &Uuid) -> bool {
        ResourceNaming::validate_ownership(resource_name, user_id)
    }

    /// Extract the original resource name from a scoped name
    ///
    /// # Arguments
    /// * `scoped_name` - The scoped resource name
    ///
    /// # Returns
    /// (user_id, resource_name) if scoped, or None if not scoped
    pub fn parse_scoped_name(scoped_name: &str) -> Option<(Uuid, String)> {
        ResourceNaming::parse(scoped_name).ok()
    }

    /// Filter resource list to only show resources owned by user
    ///
    /// # Arguments
    /// * `resources` - List of resource names
    /// * `user_id` - Optional user ID (None = return all in standalone mode)
    ///
    /// # Returns
    /// Filtered list containing only user's resources
    pub fn filter_user_resources(resources: Vec<String>, user_id: Option<&Uuid>) -> Vec<String> {
        match user_id {
            Some(uid) => resources
                .into_iter()
                .filter(|name| Self::check_ownership(name, uid))
                .collect(),
            None => resources, // Standalone mode - return all
        }
    }

    /// Unscope resource names (remove user prefix)
    ///
    /// Removes the `user_{user_id}:` prefix from resource names
    /// Useful for returning clean names to users in API responses
    ///
    /// # Arguments
    /// * `scoped_names` - List of scoped resource names
    ///
    /// # Returns
    /// List of unscoped resource names
    pub fn unscope_names(scoped_names: Vec<String>) -> Vec<String> {
        scoped_names
            .into_iter()
            .map(|name| {
                Self::parse_scoped_name(&name)
                    .map(|(_, resource_name)| resource_name)
                    .unwrap_or(name) // Return original if not scoped
            })
            .collect()
    }
}
