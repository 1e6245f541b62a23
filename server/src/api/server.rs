//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;

use tower_http::compression::CompressionLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{
    dashboard, health, organizations, price_history, products, recommendations, scoring, users,
};
use crate::core::CoreApp;
use crate::core::constants::{DEFAULT_BODY_LIMIT, INGEST_BODY_LIMIT};

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);

        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        // Clone shutdown before moving app
        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let catalog = app.database.catalog();
        let directory = app.database.directory();

        // Scraper feeds can be large; ingest routes get a bigger body cap
        let products_routes = products::routes(catalog.clone())
            .layer(DefaultBodyLimit::max(INGEST_BODY_LIMIT));
        let dashboard_routes = dashboard::routes(catalog.clone())
            .layer(DefaultBodyLimit::max(INGEST_BODY_LIMIT));

        let router = Router::new()
            .route("/api/v1/health", get(health::health))
            .route("/api/openapi.json", get(openapi_json))
            .route("/api/docs", get(swagger_ui_html))
            .route("/api/docs/", get(swagger_ui_html))
            .nest("/api/v1/products", products_routes)
            .nest("/api/v1/price-history", price_history::routes(catalog.clone()))
            .nest("/api/v1/dashboard", dashboard_routes)
            .nest(
                "/api/v1/recommendations",
                recommendations::routes(catalog, app.scoring.clone()),
            )
            .nest("/api/v1/scoring", scoring::routes(app.scoring.clone()))
            .nest("/api/v1/admin/users", users::routes(directory.clone()))
            .nest("/api/v1/admin/organizations", organizations::routes(directory));

        let router = router
            .fallback(middleware::handle_404)
            .layer(CompressionLayer::new())
            .layer(middleware::cors(&allowed_origins))
            .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT));

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on http://{}:{}", host, port);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}
