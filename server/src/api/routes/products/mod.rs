//! Product API endpoints

pub mod types;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::RequesterContext;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::{ApiError, clamp_page};
use crate::core::constants::MAX_BULK_PRODUCTS;
use crate::data::CatalogRepository;
use crate::data::types::{ListProductsParams, NewProduct, ProductKey};

use types::{
    CreateProductsBody, ListProductsQuery, ProductDto, ProductListResponse, UpdateProductRequest,
};

/// Shared state for Products API endpoints
#[derive(Clone)]
pub struct ProductsApiState {
    pub catalog: Arc<dyn CatalogRepository>,
}

/// Build Products API routes
pub fn routes(catalog: Arc<dyn CatalogRepository>) -> Router<()> {
    let state = ProductsApiState { catalog };

    Router::new()
        .route("/", get(list_products).post(create_products))
        .route(
            "/{key}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(state)
}

/// List products with filtering, sorting, and pagination
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "products",
    params(
        ("domain" = Option<String>, Query, description = "Filter by domain"),
        ("q" = Option<String>, Query, description = "Case-insensitive name substring"),
        ("page" = Option<u32>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u32>, Query, description = "Page size, capped at 1000"),
        ("sort" = Option<String>, Query, description = "Sort key: name or price")
    ),
    responses(
        (status = 200, description = "Paginated product list", body = ProductListResponse)
    )
)]
pub async fn list_products(
    State(state): State<ProductsApiState>,
    _ctx: RequesterContext,
    ValidatedQuery(query): ValidatedQuery<ListProductsQuery>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let (page, per_page) = clamp_page(query.page, query.per_page);
    let params = ListProductsParams {
        domain: query.domain.clone(),
        q: query.q.clone(),
        page,
        per_page,
        sort: query.sort_key(),
    };

    let (rows, total) = state
        .catalog
        .list_products(&params)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(ProductListResponse {
        items: rows.into_iter().map(ProductDto::from).collect(),
        total,
    }))
}

/// Get a product by internal UUID or business key
#[utoipa::path(
    get,
    path = "/api/v1/products/{key}",
    tag = "products",
    params(("key" = String, Path, description = "Internal UUID or business key")),
    responses(
        (status = 200, description = "Product found", body = ProductDto),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<ProductsApiState>,
    _ctx: RequesterContext,
    Path(key): Path<String>,
) -> Result<Json<ProductDto>, ApiError> {
    let key = ProductKey::parse(&key);
    let product = state
        .catalog
        .get_product(&key)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::not_found("PRODUCT_NOT_FOUND", "Product not found"))?;

    Ok(Json(ProductDto::from(product)))
}

/// Create products from a single record or a batch.
///
/// Batches are all-or-nothing: the whole body is validated up front and
/// any invalid row rejects the call with the offending indexes, leaving
/// the store untouched.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "products",
    request_body = CreateProductsBody,
    responses(
        (status = 201, description = "Product(s) created", body = ProductListResponse),
        (status = 400, description = "Invalid record(s); nothing written")
    )
)]
pub async fn create_products(
    State(state): State<ProductsApiState>,
    _ctx: RequesterContext,
    Json(body): Json<CreateProductsBody>,
) -> Result<(StatusCode, Json<ProductListResponse>), ApiError> {
    let requests = match body {
        CreateProductsBody::One(request) => vec![request],
        CreateProductsBody::Many(requests) => requests,
    };

    if requests.is_empty() {
        return Err(ApiError::bad_request("EMPTY_BATCH", "No records provided"));
    }
    if requests.len() > MAX_BULK_PRODUCTS {
        return Err(ApiError::bad_request(
            "BATCH_TOO_LARGE",
            format!("At most {MAX_BULK_PRODUCTS} records per request"),
        ));
    }

    // Validate the whole batch before writing anything
    let mut items: Vec<NewProduct> = Vec::with_capacity(requests.len());
    let mut invalid: Vec<String> = Vec::new();
    for (index, request) in requests.iter().enumerate() {
        match request.normalize() {
            Ok(item) => items.push(item),
            Err(reason) => invalid.push(format!("[{index}] {reason}")),
        }
    }
    if !invalid.is_empty() {
        return Err(ApiError::bad_request(
            "INVALID_RECORDS",
            format!("Rejected batch, no rows written: {}", invalid.join("; ")),
        ));
    }

    let rows = state
        .catalog
        .create_products_bulk(&items)
        .await
        .map_err(ApiError::from_data)?;

    let total = rows.len() as u64;
    Ok((
        StatusCode::CREATED,
        Json(ProductListResponse {
            items: rows.into_iter().map(ProductDto::from).collect(),
            total,
        }),
    ))
}

/// Partially update a product
#[utoipa::path(
    put,
    path = "/api/v1/products/{key}",
    tag = "products",
    params(("key" = String, Path, description = "Internal UUID or business key")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductDto),
        (status = 400, description = "Invalid or empty field set"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn update_product(
    State(state): State<ProductsApiState>,
    _ctx: RequesterContext,
    Path(key): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<ProductDto>, ApiError> {
    let patch = body
        .normalize()
        .map_err(|reason| ApiError::bad_request("INVALID_RECORDS", reason))?;
    if patch.is_empty() {
        return Err(ApiError::bad_request(
            "EMPTY_UPDATE",
            "At least one field must be provided",
        ));
    }

    let key = ProductKey::parse(&key);
    let product = state
        .catalog
        .update_product(&key, &patch)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::not_found("PRODUCT_NOT_FOUND", "Product not found"))?;

    Ok(Json(ProductDto::from(product)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{key}",
    tag = "products",
    params(("key" = String, Path, description = "Internal UUID or business key")),
    responses(
        (status = 200, description = "Deleted product", body = ProductDto),
        (status = 404, description = "Product not found")
    )
)]
pub async fn delete_product(
    State(state): State<ProductsApiState>,
    _ctx: RequesterContext,
    Path(key): Path<String>,
) -> Result<Json<ProductDto>, ApiError> {
    let key = ProductKey::parse(&key);
    let product = state
        .catalog
        .get_product(&key)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::not_found("PRODUCT_NOT_FOUND", "Product not found"))?;

    state
        .catalog
        .delete_product(&key)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(ProductDto::from(product)))
}
