//! Site directory: the persistence contract the gate depends on.
//!
//! The directory exposes exactly the round-trips the resolution path needs:
//! membership lookup, site listing in creation order, idempotent membership
//! insert, and host→site lookup. Everything else the CMS persists (posts,
//! leads, settings) is an external collaborator with its own storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quill_auth::Role;
use quill_core::{MembershipId, SiteId, UserId};

mod in_memory;
mod postgres;

pub use in_memory::InMemoryDirectory;
pub use postgres::PostgresDirectory;

/// A site (tenant) record.
///
/// Sites are created by an external provisioning flow; the gate only reads
/// them. `created_at` drives the "earliest-created site wins" operator
/// bootstrap policy, so it must be stable across reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    /// Primary domain, stored normalized (lowercase, no port).
    pub domain: String,
    /// Optional platform subdomain, stored normalized.
    pub subdomain: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Site {
    /// Whether this site serves the given normalized host.
    pub fn matches_host(&self, host: &str) -> bool {
        self.domain == host || self.subdomain.as_deref() == Some(host)
    }
}

/// A membership row binding a user to a site with a role.
///
/// Unique per (site_id, user_id) pair; the directory enforces that
/// uniqueness and collapses duplicate inserts into the surviving row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub site_id: SiteId,
    pub user_id: UserId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Directory operation error.
///
/// These are infrastructure faults (connectivity, constraint machinery),
/// never expected outcomes: "no membership" and "no site" are `Ok(None)`
/// at the trait level, and duplicate-insert races are success.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("store internal error: {0}")]
    Internal(String),
}

/// Persistence contract for site resolution.
///
/// Implementations must be safe to share across request tasks.
#[async_trait]
pub trait SiteDirectory: Send + Sync {
    /// Look up a membership for a user.
    ///
    /// When a user holds several memberships the earliest-created one is
    /// returned, so resolution stays deterministic.
    async fn find_membership(&self, user_id: UserId) -> Result<Option<Membership>, StoreError>;

    /// All sites, ordered by creation (earliest first).
    async fn list_sites(&self) -> Result<Vec<Site>, StoreError>;

    /// Idempotent membership insert keyed by the (site_id, user_id) pair.
    ///
    /// Returns the surviving row: either the freshly inserted one or the
    /// pre-existing row when the pair is already bound. Concurrent
    /// duplicate calls must all succeed with exactly one row persisted.
    async fn ensure_membership(
        &self,
        site_id: SiteId,
        user_id: UserId,
        role: Role,
    ) -> Result<Membership, StoreError>;

    /// First site (in creation order) serving the given normalized host.
    async fn find_site_by_host(&self, host: &str) -> Result<Option<Site>, StoreError>;
}

/// Normalize a request host for site lookup: trim, drop the port, drop a
/// trailing dot, lowercase.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host.split(':').next().unwrap_or_default();
    host.trim_end_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_normalization() {
        assert_eq!(normalize_host("Example.COM"), "example.com");
        assert_eq!(normalize_host("example.com:8080"), "example.com");
        assert_eq!(normalize_host("example.com."), "example.com");
        assert_eq!(normalize_host("  blog.example.com  "), "blog.example.com");
    }

    #[test]
    fn site_host_matching() {
        let site = Site {
            id: SiteId::new(),
            name: "Acme".to_string(),
            domain: "acme.com".to_string(),
            subdomain: Some("acme.quill.site".to_string()),
            created_at: Utc::now(),
        };

        assert!(site.matches_host("acme.com"));
        assert!(site.matches_host("acme.quill.site"));
        assert!(!site.matches_host("other.com"));
    }
}
