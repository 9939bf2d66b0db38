//! Public site routes (host-resolved).

use std::sync::Arc;

use axum::{
    extract::{Extension, Host},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use quill_infra::TenantBinder;

use crate::app::errors;

/// GET / - resolve the serving site from the request host.
///
/// Page composition is out of scope here; the handler exposes the resolved
/// site record the renderer would build the page from.
pub async fn home(
    Extension(binder): Extension<Arc<TenantBinder>>,
    Host(host): Host,
) -> axum::response::Response {
    match binder.resolve_site_by_host(&host).await {
        Ok(Some(site)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "site": {
                    "id": site.id.to_string(),
                    "name": site.name,
                    "domain": site.domain,
                    "subdomain": site.subdomain,
                }
            })),
        )
            .into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "unknown_host",
            "no site serves this host",
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}
