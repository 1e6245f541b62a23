//! OpenAPI specification and Swagger UI

use axum::http::header;
use axum::response::{Html, IntoResponse, Json};
use utoipa::OpenApi;

use crate::api::routes::{
    dashboard, health, organizations, price_history, products, recommendations, scoring, users,
};
use crate::domain::series::{AggregatedPricePoint, Granularity};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PricePulse API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Pricing intelligence dashboard server"
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "products", description = "Product catalog"),
        (name = "price-history", description = "Aggregated price series"),
        (name = "dashboard", description = "Dashboard feed and KPIs"),
        (name = "recommendations", description = "Pricing recommendations"),
        (name = "scoring", description = "ML scoring passthrough"),
        (name = "admin", description = "User and organization administration")
    ),
    paths(
        // Health
        health::health,
        // Products
        products::list_products,
        products::get_product,
        products::create_products,
        products::update_product,
        products::delete_product,
        // Price history
        price_history::get_price_series,
        // Dashboard
        dashboard::get_dashboard,
        dashboard::insert_price_event,
        // Recommendations
        recommendations::list_recommendations,
        recommendations::decide_recommendation,
        // Scoring
        scoring::run_model,
        // Admin
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
        organizations::list_organizations,
        organizations::upsert_organization,
    ),
    components(schemas(
        // Health
        health::HealthResponse,
        // Products
        products::types::ProductDto,
        products::types::ProductListResponse,
        products::types::ListProductsQuery,
        products::types::PriceInput,
        products::types::CreateProductRequest,
        products::types::CreateProductsBody,
        products::types::UpdateProductRequest,
        // Price history
        Granularity,
        AggregatedPricePoint,
        price_history::PriceSeriesQuery,
        price_history::PriceSeriesResponse,
        // Dashboard
        dashboard::types::PriceEventDto,
        dashboard::types::RecommendationDto,
        dashboard::types::KpiDto,
        dashboard::types::EventListResponse,
        dashboard::types::DashboardResponse,
        dashboard::types::DashboardQuery,
        dashboard::types::CreatePriceEventRequest,
        // Recommendations
        recommendations::ListRecommendationsQuery,
        recommendations::RecommendationListResponse,
        recommendations::RecommendationDecisionRequest,
        recommendations::RecommendationDecisionResponse,
        // Scoring
        scoring::RunModelRequest,
        // Admin
        users::types::UserDto,
        users::types::UserListResponse,
        users::types::ListUsersQuery,
        users::types::UpsertUserRequest,
        users::types::UpdateUserRequest,
        users::types::DeleteUserQuery,
        organizations::types::OrganizationDto,
        organizations::types::OrganizationListResponse,
        organizations::types::UpsertOrganizationRequest,
    ))
)]
pub struct ApiDoc;

/// Serve OpenAPI JSON specification
pub async fn openapi_json() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json")],
        Json(ApiDoc::openapi()),
    )
}

/// Serve Swagger UI from CDN
pub async fn swagger_ui_html() -> Html<&'static str> {
    Html(SWAGGER_UI_HTML)
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>PricePulse API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: "/api/openapi.json",
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout",
                deepLinking: true,
                showExtensions: true,
                showCommonExtensions: true
            });
        };
    </script>
</body>
</html>"#;
