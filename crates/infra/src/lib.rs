//! `quill-infra` — persistence boundary and site resolution.
//!
//! The site directory (sites + memberships) lives behind the
//! [`SiteDirectory`] trait with an in-memory twin for tests/dev and a
//! Postgres implementation for production. The [`TenantBinder`] builds the
//! identity→site resolution on top of it.

pub mod binder;
pub mod directory;

pub use binder::TenantBinder;
pub use directory::{
    normalize_host, InMemoryDirectory, Membership, PostgresDirectory, Site, SiteDirectory,
    StoreError,
};
