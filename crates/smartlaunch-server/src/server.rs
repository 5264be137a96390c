use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use smartlaunch_auth::ConfigError;
use smartlaunch_auth::http::{
    DiscoveryState, IntrospectionState, JwksState, SmartAuthState, smart_auth_routes,
};
use smartlaunch_auth::token::IntrospectionService;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, handlers, middleware as app_middleware};

pub struct SmartLaunchServer {
    addr: SocketAddr,
    app: Router,
}

/// Builds the application router.
///
/// Keys are loaded and parsed here, once; the resulting state is immutable
/// for the lifetime of the router.
pub fn build_app(cfg: &AppConfig) -> Result<Router, ConfigError> {
    let (service, issuer_key) = IntrospectionService::from_config(&cfg.auth)?;
    tracing::info!(
        kid = %issuer_key.kid(),
        rsa = issuer_key.is_rsa(),
        "Issuer key loaded"
    );

    let auth_state = SmartAuthState {
        introspection: IntrospectionState::new(Arc::new(service)),
        discovery: DiscoveryState::new(cfg.base_url().map(str::to_string)),
        jwks: JwksState::new(issuer_key),
    };

    let app = Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .merge(smart_auth_routes(auth_state))
        // Middleware stack (outermost last: body limit -> request id -> trace -> cors)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(
            cfg.server.body_limit_bytes,
        ));

    Ok(app)
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub fn build(self) -> Result<SmartLaunchServer, ConfigError> {
        let app = build_app(&self.config)?;

        Ok(SmartLaunchServer {
            addr: self.addr,
            app,
        })
    }
}

impl SmartLaunchServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
