use axum::response::Html;

/// GET /login - sign-in page shell.
///
/// The form itself posts to the external authentication flow; the gate only
/// cares that signed-in visitors bounce from here to the admin home.
pub async fn login() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title><h1>Sign in</h1>")
}
