//! `quill-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP routing and storage: the
//! session codec, the operator allow-list, and the route gate are all pure
//! policy that the API layer wires into middleware.

pub mod gate;
pub mod identity;
pub mod operators;
pub mod roles;
pub mod session;

pub use gate::{api_decision, page_decision, ApiDecision, PageDecision, ADMIN_HOME, ADMIN_PREFIX, LOGIN_PATH};
pub use identity::Identity;
pub use operators::OperatorAllowlist;
pub use roles::Role;
pub use session::{validate_claims, SessionClaims, SessionError, SessionKeys, TokenValidationError, SESSION_COOKIE};
