//! Postgres-backed site directory.
//!
//! Uniqueness of the (site_id, user_id) membership pair is enforced by the
//! database; `ensure_membership` uses `ON CONFLICT DO NOTHING` plus a
//! re-read, so a duplicate-key race collapses into the surviving row and
//! every concurrent caller observes success.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use quill_auth::Role;
use quill_core::{MembershipId, SiteId, UserId};

use super::{Membership, Site, SiteDirectory, StoreError};

/// Schema for the site directory tables.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sites (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    domain TEXT NOT NULL,
    subdomain TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS site_memberships (
    id UUID PRIMARY KEY,
    site_id UUID NOT NULL REFERENCES sites(id),
    user_id UUID NOT NULL,
    role TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (site_id, user_id)
);

CREATE INDEX IF NOT EXISTS site_memberships_user_idx ON site_memberships (user_id);
CREATE INDEX IF NOT EXISTS sites_domain_idx ON sites (domain);
"#;

/// Postgres-backed site directory.
///
/// Thread-safe: all operations go through the sqlx connection pool.
#[derive(Debug, Clone)]
pub struct PostgresDirectory {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct SiteRow {
    id: Uuid,
    name: String,
    domain: String,
    subdomain: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SiteRow> for Site {
    fn from(row: SiteRow) -> Self {
        Site {
            id: SiteId::from_uuid(row.id),
            name: row.name,
            domain: row.domain,
            subdomain: row.subdomain,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    id: Uuid,
    site_id: Uuid,
    user_id: Uuid,
    role: String,
    created_at: DateTime<Utc>,
}

impl From<MembershipRow> for Membership {
    fn from(row: MembershipRow) -> Self {
        Membership {
            id: MembershipId::from_uuid(row.id),
            site_id: SiteId::from_uuid(row.site_id),
            user_id: UserId::from_uuid(row.user_id),
            role: Role::new(row.role),
            created_at: row.created_at,
        }
    }
}

impl PostgresDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the given database URL.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(url).await.map_err(db_error)?;
        Ok(Self::new(pool))
    }

    /// Create the directory tables when they do not exist yet.
    #[instrument(skip(self))]
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SiteDirectory for PostgresDirectory {
    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn find_membership(&self, user_id: UserId) -> Result<Option<Membership>, StoreError> {
        let row = sqlx::query_as::<_, MembershipRow>(
            "SELECT id, site_id, user_id, role, created_at
             FROM site_memberships
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC
             LIMIT 1",
        )
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Membership::from))
    }

    #[instrument(skip(self))]
    async fn list_sites(&self) -> Result<Vec<Site>, StoreError> {
        let rows = sqlx::query_as::<_, SiteRow>(
            "SELECT id, name, domain, subdomain, created_at
             FROM sites
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Site::from).collect())
    }

    #[instrument(skip(self), fields(site_id = %site_id, user_id = %user_id))]
    async fn ensure_membership(
        &self,
        site_id: SiteId,
        user_id: UserId,
        role: Role,
    ) -> Result<Membership, StoreError> {
        // The losing side of a concurrent duplicate insert hits the unique
        // (site_id, user_id) constraint; DO NOTHING turns that into a no-op
        // and the re-read below returns the winner's row.
        sqlx::query(
            "INSERT INTO site_memberships (id, site_id, user_id, role, created_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (site_id, user_id) DO NOTHING",
        )
        .bind(Uuid::from(MembershipId::new()))
        .bind(Uuid::from(site_id))
        .bind(Uuid::from(user_id))
        .bind(role.as_str().to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        let row = sqlx::query_as::<_, MembershipRow>(
            "SELECT id, site_id, user_id, role, created_at
             FROM site_memberships
             WHERE site_id = $1 AND user_id = $2",
        )
        .bind(Uuid::from(site_id))
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Membership::from)
            .ok_or_else(|| StoreError::Database("membership row missing after insert".to_string()))
    }

    #[instrument(skip(self))]
    async fn find_site_by_host(&self, host: &str) -> Result<Option<Site>, StoreError> {
        let row = sqlx::query_as::<_, SiteRow>(
            "SELECT id, name, domain, subdomain, created_at
             FROM sites
             WHERE domain = $1 OR subdomain = $1
             ORDER BY created_at ASC, id ASC
             LIMIT 1",
        )
        .bind(host)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(Site::from))
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}
