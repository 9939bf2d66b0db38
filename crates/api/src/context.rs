use quill_auth::{Identity, Role};
use quill_core::{SiteId, UserId};

/// Site context for a request.
///
/// Injected by the site-binding middleware; immutable and present for all
/// site-scoped routes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SiteContext {
    site_id: SiteId,
}

impl SiteContext {
    pub fn new(site_id: SiteId) -> Self {
        Self { site_id }
    }

    pub fn site_id(&self) -> SiteId {
        self.site_id
    }
}

/// Identity context for a request (authenticated identity from the session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    identity: Identity,
}

impl IdentityContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    pub fn email(&self) -> &str {
        &self.identity.email
    }

    pub fn role(&self) -> &Role {
        &self.identity.role
    }
}
