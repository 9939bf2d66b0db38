//! Tenant binder: identity→site and host→site resolution.
//!
//! The binder owns the operator bootstrap path. Lazy provisioning is an
//! explicit `ensure_membership` upsert on the directory rather than a read
//! with a hidden side effect, so the write shows up in traces and tests.

use std::sync::Arc;

use quill_auth::{Identity, OperatorAllowlist, Role};
use quill_core::SiteId;

use crate::directory::{normalize_host, Site, SiteDirectory, StoreError};

/// Resolves identities and public hosts to exactly one site.
pub struct TenantBinder {
    directory: Arc<dyn SiteDirectory>,
    operators: OperatorAllowlist,
}

impl TenantBinder {
    pub fn new(directory: Arc<dyn SiteDirectory>, operators: OperatorAllowlist) -> Self {
        Self {
            directory,
            operators,
        }
    }

    /// The operator allow-list this binder bootstraps against.
    ///
    /// Shared with the route gate so both layers consult one list.
    pub fn operators(&self) -> &OperatorAllowlist {
        &self.operators
    }

    /// Resolve the site an identity is scoped to.
    ///
    /// `Ok(None)` is a normal outcome (no binding, 404-equivalent), never an
    /// error. The membership lookup runs first on every call; the operator
    /// check and the bootstrap write only happen when no binding exists.
    pub async fn resolve_site(&self, identity: &Identity) -> Result<Option<SiteId>, StoreError> {
        if let Some(membership) = self.directory.find_membership(identity.user_id).await? {
            return Ok(Some(membership.site_id));
        }

        if !self.operators.contains(&identity.email) {
            return Ok(None);
        }

        // Operator bootstrap: earliest-created site wins. Explicit policy
        // for single-/primary-tenant deployments with no explicit binding.
        let sites = self.directory.list_sites().await?;
        let Some(site) = sites.into_iter().next() else {
            return Ok(None);
        };

        let membership = self
            .directory
            .ensure_membership(site.id, identity.user_id, Role::admin())
            .await?;

        tracing::info!(
            user_id = %identity.user_id,
            site_id = %membership.site_id,
            "bootstrapped operator membership"
        );

        Ok(Some(membership.site_id))
    }

    /// Resolve the site serving a public request host.
    pub async fn resolve_site_by_host(&self, host: &str) -> Result<Option<Site>, StoreError> {
        self.directory.find_site_by_host(&normalize_host(host)).await
    }

    /// Load a site record by id.
    ///
    /// Reuses the ordered listing so the directory contract stays at the
    /// four round-trips resolution needs.
    pub async fn site(&self, site_id: SiteId) -> Result<Option<Site>, StoreError> {
        let sites = self.directory.list_sites().await?;
        Ok(sites.into_iter().find(|s| s.id == site_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryDirectory, Membership, Site};
    use chrono::{Duration, Utc};
    use quill_core::UserId;

    fn site(name: &str, domain: &str, age_minutes: i64) -> Site {
        Site {
            id: SiteId::new(),
            name: name.to_string(),
            domain: domain.to_string(),
            subdomain: None,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    fn operator() -> Identity {
        Identity::new(UserId::new(), "ops@example.com", Role::new("member"))
    }

    fn member(email: &str) -> Identity {
        Identity::new(UserId::new(), email, Role::new("member"))
    }

    fn binder(directory: Arc<InMemoryDirectory>) -> TenantBinder {
        TenantBinder::new(directory, OperatorAllowlist::new(["ops@example.com"]))
    }

    #[tokio::test]
    async fn existing_membership_wins_without_write() {
        let dir = Arc::new(InMemoryDirectory::new());
        let older = site("Older", "old.com", 60);
        let newer = site("Newer", "new.com", 1);
        let bound_site = newer.id;
        dir.insert_site(older).unwrap();
        dir.insert_site(newer).unwrap();

        // Even an operator with an explicit binding keeps it: the membership
        // lookup runs before any privilege check.
        let identity = operator();
        dir.ensure_membership(bound_site, identity.user_id, Role::admin())
            .await
            .unwrap();

        let binder = binder(dir.clone());
        let resolved = binder.resolve_site(&identity).await.unwrap();

        assert_eq!(resolved, Some(bound_site));
        assert_eq!(dir.memberships().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_operator_without_membership_is_unbound() {
        let dir = Arc::new(InMemoryDirectory::new());
        dir.insert_site(site("Only", "only.com", 5)).unwrap();

        let binder = binder(dir.clone());
        let resolved = binder.resolve_site(&member("user@example.com")).await.unwrap();

        assert_eq!(resolved, None);
        assert!(dir.memberships().unwrap().is_empty());
    }

    #[tokio::test]
    async fn operator_bootstraps_against_earliest_site() {
        let dir = Arc::new(InMemoryDirectory::new());
        let earliest = site("Earliest", "first.com", 120);
        let earliest_id = earliest.id;
        dir.insert_site(site("Later", "second.com", 10)).unwrap();
        dir.insert_site(earliest).unwrap();

        let identity = operator();
        let binder = binder(dir.clone());
        let resolved = binder.resolve_site(&identity).await.unwrap();

        assert_eq!(resolved, Some(earliest_id));

        let memberships = dir.memberships().unwrap();
        assert_eq!(memberships.len(), 1);
        let Membership {
            site_id,
            user_id,
            role,
            ..
        } = &memberships[0];
        assert_eq!(*site_id, earliest_id);
        assert_eq!(*user_id, identity.user_id);
        assert!(role.is_admin());
    }

    #[tokio::test]
    async fn concurrent_bootstrap_persists_one_row() {
        let dir = Arc::new(InMemoryDirectory::new());
        let only = site("Only", "only.com", 5);
        let only_id = only.id;
        dir.insert_site(only).unwrap();

        let identity = operator();
        let binder = Arc::new(binder(dir.clone()));

        let (a, b) = tokio::join!(
            binder.resolve_site(&identity),
            binder.resolve_site(&identity)
        );

        assert_eq!(a.unwrap(), Some(only_id));
        assert_eq!(b.unwrap(), Some(only_id));
        assert_eq!(dir.memberships().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn operator_with_no_sites_is_unbound() {
        let dir = Arc::new(InMemoryDirectory::new());
        let binder = binder(dir.clone());

        let resolved = binder.resolve_site(&operator()).await.unwrap();

        assert_eq!(resolved, None);
        assert!(dir.memberships().unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_twice_stays_idempotent() {
        let dir = Arc::new(InMemoryDirectory::new());
        let only = site("Only", "only.com", 5);
        let only_id = only.id;
        dir.insert_site(only).unwrap();

        let identity = operator();
        let binder = binder(dir.clone());

        assert_eq!(binder.resolve_site(&identity).await.unwrap(), Some(only_id));
        assert_eq!(binder.resolve_site(&identity).await.unwrap(), Some(only_id));
        assert_eq!(dir.memberships().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn host_resolution_normalizes_the_host() {
        let dir = Arc::new(InMemoryDirectory::new());
        let acme = site("Acme", "acme.com", 5);
        let acme_id = acme.id;
        dir.insert_site(acme).unwrap();

        let binder = binder(dir);
        let found = binder
            .resolve_site_by_host("ACME.com:8080")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, acme_id);
        assert!(binder.resolve_site_by_host("unknown.com").await.unwrap().is_none());
    }
}
