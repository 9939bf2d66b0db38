use std::sync::RwLock;

use chrono::Utc;

use quill_auth::Role;
use quill_core::{MembershipId, SiteId, UserId};

use super::{Membership, Site, SiteDirectory, StoreError};

/// In-memory site directory.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    sites: Vec<Site>,
    memberships: Vec<Membership>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a site (stands in for the external provisioning flow).
    pub fn insert_site(&self, site: Site) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.sites.push(site);
        inner
            .sites
            .sort_by(|a, b| (a.created_at, a.id.as_uuid()).cmp(&(b.created_at, b.id.as_uuid())));
        Ok(())
    }

    /// Snapshot of all membership rows (test introspection).
    pub fn memberships(&self) -> Result<Vec<Membership>, StoreError> {
        Ok(self.read()?.memberships.clone())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Inner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Internal("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Internal("lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl SiteDirectory for InMemoryDirectory {
    async fn find_membership(&self, user_id: UserId) -> Result<Option<Membership>, StoreError> {
        let inner = self.read()?;
        let found = inner
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .min_by_key(|m| (m.created_at, *m.id.as_uuid()))
            .cloned();
        Ok(found)
    }

    async fn list_sites(&self) -> Result<Vec<Site>, StoreError> {
        Ok(self.read()?.sites.clone())
    }

    async fn ensure_membership(
        &self,
        site_id: SiteId,
        user_id: UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        let mut inner = self.write()?;

        // The write lock makes the check-then-insert atomic, which is what
        // the unique (site_id, user_id) constraint gives the Postgres twin.
        if let Some(existing) = inner
            .memberships
            .iter()
            .find(|m| m.site_id == site_id && m.user_id == user_id)
        {
            return Ok(existing.clone());
        }

        let membership = Membership {
            id: MembershipId::new(),
            site_id,
            user_id,
            role,
            created_at: Utc::now(),
        };
        inner.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn find_site_by_host(&self, host: &str) -> Result<Option<Site>, StoreError> {
        let inner = self.read()?;
        // First match in creation order; `sites` is kept sorted on insert.
        Ok(inner.sites.iter().find(|s| s.matches_host(host)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn site(name: &str, domain: &str, age_minutes: i64) -> Site {
        Site {
            id: SiteId::new(),
            name: name.to_string(),
            domain: domain.to_string(),
            subdomain: None,
            created_at: Utc::now() - Duration::minutes(age_minutes),
        }
    }

    #[tokio::test]
    async fn sites_are_listed_in_creation_order() {
        let dir = InMemoryDirectory::new();
        dir.insert_site(site("Newer", "new.com", 1)).unwrap();
        dir.insert_site(site("Older", "old.com", 60)).unwrap();

        let sites = dir.list_sites().await.unwrap();
        assert_eq!(sites[0].name, "Older");
        assert_eq!(sites[1].name, "Newer");
    }

    #[tokio::test]
    async fn ensure_membership_is_idempotent() {
        let dir = InMemoryDirectory::new();
        let site_id = SiteId::new();
        let user_id = UserId::new();

        let first = dir
            .ensure_membership(site_id, user_id, Role::admin())
            .await
            .unwrap();
        let second = dir
            .ensure_membership(site_id, user_id, Role::admin())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(dir.memberships().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn host_lookup_prefers_earliest_site() {
        let dir = InMemoryDirectory::new();
        let older = site("Older", "shared.com", 60);
        let newer = site("Newer", "shared.com", 1);
        let older_id = older.id;
        dir.insert_site(newer).unwrap();
        dir.insert_site(older).unwrap();

        let found = dir.find_site_by_host("shared.com").await.unwrap().unwrap();
        assert_eq!(found.id, older_id);
    }

    #[tokio::test]
    async fn missing_membership_is_none() {
        let dir = InMemoryDirectory::new();
        assert!(dir.find_membership(UserId::new()).await.unwrap().is_none());
    }
}
