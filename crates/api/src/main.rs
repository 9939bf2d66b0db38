use std::sync::Arc;

use quill_auth::{OperatorAllowlist, SessionKeys};
use quill_infra::{InMemoryDirectory, PostgresDirectory, SiteDirectory};

#[tokio::main]
async fn main() {
    quill_observability::init();

    let session_secret = std::env::var("QUILL_SESSION_SECRET").unwrap_or_else(|_| {
        tracing::warn!("QUILL_SESSION_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let operators = OperatorAllowlist::from_csv(
        &std::env::var("QUILL_OPERATOR_EMAILS").unwrap_or_default(),
    );
    if operators.is_empty() {
        tracing::warn!("QUILL_OPERATOR_EMAILS not set; operator bootstrap is disabled");
    }

    let directory: Arc<dyn SiteDirectory> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let directory = PostgresDirectory::connect(&url)
                .await
                .expect("failed to connect to DATABASE_URL");
            directory
                .ensure_schema()
                .await
                .expect("failed to prepare site directory schema");
            Arc::new(directory)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory site directory");
            Arc::new(InMemoryDirectory::new())
        }
    };

    let app = quill_api::app::build_app(
        directory,
        SessionKeys::new(session_secret.as_bytes()),
        operators,
    );

    let addr =
        std::env::var("QUILL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {addr}: {e}"));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
