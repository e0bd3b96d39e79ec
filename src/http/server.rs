//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a single dispatching fallback
//! - Wire up middleware (timeout, tracing, request ID)
//! - Bind server to listener
//! - Stop gracefully when shutdown is triggered

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, extract::State, http::HeaderName, http::Request, response::Response, Router};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::http::dispatch::Dispatcher;
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::routing::registry::RouteRegistry;
use crate::security::identity::HeaderIdentity;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid identity header: {0}")]
    InvalidHeader(#[from] axum::http::header::InvalidHeaderName),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP server for the convention router.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Create a new HTTP server serving `registry` with the given configuration.
    pub fn new(config: RouterConfig, registry: RouteRegistry) -> Result<Self, ServerError> {
        let identity = HeaderIdentity::from_config(&config.identity)?;
        let dispatcher = Arc::new(
            Dispatcher::new(Arc::new(registry))
                .with_identity(Arc::new(identity))
                .with_max_body_size(config.limits.max_body_size)
                .with_strict_paths(config.dispatch.strict_paths),
        );

        tracing::info!(
            routes = dispatcher.registry().len(),
            strict_paths = config.dispatch.strict_paths,
            "Route registry loaded"
        );

        let router = Self::build_router(&config, dispatcher.clone());
        Ok(Self {
            router,
            config,
            dispatcher,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, dispatcher: Arc<Dispatcher>) -> Router {
        let x_request_id = HeaderName::from_static(X_REQUEST_ID);
        Router::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, UuidRequestId))
    }

    /// The fully layered router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.dispatcher.registry().len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Every path goes through the dispatcher.
async fn dispatch_handler(State(dispatcher): State<Arc<Dispatcher>>, request: Request<Body>) -> Response {
    dispatcher.dispatch(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::method::ControllerMethod;
    use crate::routing::registry::RegistryBuilder;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let mut builder = RegistryBuilder::new();
        builder
            .register_methods(
                "Pings",
                vec![ControllerMethod::context("Index", |_cr| async {
                    Ok::<_, String>("pong".to_string())
                })],
            )
            .unwrap();
        HttpServer::new(RouterConfig::default(), builder.build()).unwrap()
    }

    #[tokio::test]
    async fn test_request_id_generated() {
        let response = server()
            .router()
            .oneshot(Request::builder().uri("/pings").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_request_id_propagated() {
        let response = server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/pings")
                    .header(X_REQUEST_ID, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }

    #[test]
    fn test_invalid_identity_header_rejected() {
        let mut config = RouterConfig::default();
        config.identity.user_id_header = "not valid".into();
        let err = HttpServer::new(config, RegistryBuilder::new().build()).err().unwrap();
        assert!(matches!(err, ServerError::InvalidHeader(_)));
    }
}
