use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, UuidPath, ValidatedJson,
    errors::handlers::method_not_allowed,
    errors::responses::{
        BadRequestParameterResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::forms::ProductForm;
use crate::imaging::{self, ImageData};
use crate::listing::{ListingParams, ListingResponse, ProductFilter, ProductPage};
use crate::models::{
    AddFormContext, Category, CategoryChoice, CreateCategory, DeleteResponse, EditFormContext,
    Notice, NoticeLevel, Product, ProductResponse, StoredImage,
};
use crate::service::CatalogService;
use crate::store::CatalogStore;

pub const PRODUCT_TAG: &str = "produtos";
pub const CATEGORY_TAG: &str = "categorias";

/// Room for the text fields and multipart framing on top of the image limit
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// OpenAPI documentation for the catalog API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        list_products_form,
        add_form,
        create_product,
        edit_form,
        update_product,
        delete_product,
        product_image,
        product_thumbnail,
        product_thumbnail_sized,
        list_categories,
        create_category,
    ),
    components(
        schemas(
            Product,
            StoredImage,
            Category,
            CategoryChoice,
            CreateCategory,
            Notice,
            NoticeLevel,
            ProductFilter,
            ProductPage,
            ListingParams,
            ListingResponse,
            AddFormContext,
            EditFormContext,
            ProductResponse,
            DeleteResponse,
            ProductFormBody,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            BadRequestParameterResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = PRODUCT_TAG, description = "Product management, listing and images"),
        (name = CATEGORY_TAG, description = "Product categories")
    )
)]
pub struct ApiDoc;

/// Multipart body of the add and edit endpoints (documentation only)
#[derive(ToSchema)]
#[allow(dead_code)]
struct ProductFormBody {
    nome: String,
    preco: f64,
    /// Checkbox: `y`, `on`, `true` or `1`
    ativo: Option<String>,
    estoque: i32,
    categoria: Uuid,
    #[schema(value_type = Option<String>, format = Binary)]
    foto: Option<Vec<u8>>,
    /// Edit only; wins over a new `foto`
    removerfoto: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailPath {
    size: String,
}

/// Create the catalog router with all HTTP endpoints
pub fn router<S: CatalogStore>(service: CatalogService<S>) -> Router {
    let body_limit = service.settings().max_image_bytes + FORM_OVERHEAD_BYTES;
    let shared_service = Arc::new(service);

    Router::new()
        .route("/produto", get(list_products::<S>).post(list_products_form::<S>))
        .route("/produto/", get(list_products::<S>).post(list_products_form::<S>))
        .route("/produto/lista", get(list_products::<S>).post(list_products_form::<S>))
        .route("/produto/add", get(add_form::<S>).post(create_product::<S>))
        .route("/produto/edit/{id}", get(edit_form::<S>).post(update_product::<S>))
        .route(
            "/produto/delete/{id}",
            post(delete_product::<S>)
                .delete(delete_product::<S>)
                .fallback(method_not_allowed),
        )
        .route("/produto/imagem/{id}", get(product_image::<S>))
        .route("/produto/thumbnail/{id}", get(product_thumbnail::<S>))
        .route("/produto/thumbnail/{id}/{size}", get(product_thumbnail_sized::<S>))
        .route("/categoria", get(list_categories::<S>))
        .route("/categoria/", get(list_categories::<S>))
        .route("/categoria/add", post(create_category::<S>))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(shared_service)
}

/// Run the listing; an invalid category filter falls back to the
/// unfiltered listing with a `danger` notice
async fn listing<S: CatalogStore>(
    service: &CatalogService<S>,
    params: ListingParams,
) -> CatalogResult<ListingResponse> {
    match service.list_products(&params).await {
        Err(CatalogError::InvalidFilter(message)) => {
            tracing::info!(%message, "Ignoring invalid listing filter");
            let mut fallback = service.list_products(&ListingParams::default()).await?;
            fallback.notices.insert(0, Notice::danger(message));
            Ok(fallback)
        }
        other => other,
    }
}

/// List products with filters and pagination
#[utoipa::path(
    get,
    path = "/produto/",
    tag = PRODUCT_TAG,
    params(ListingParams),
    responses(
        (status = 200, description = "One page of products", body = ListingResponse),
        (status = 400, response = BadRequestParameterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    Query(params): Query<ListingParams>,
) -> CatalogResult<Json<ListingResponse>> {
    listing(&service, params).await.map(Json)
}

/// List products by POST.
///
/// Parameters come from the query string; a urlencoded filter form in the
/// body, if sent, overrides them field by field.
#[utoipa::path(
    post,
    path = "/produto/",
    tag = PRODUCT_TAG,
    params(ListingParams),
    request_body(
        content = ListingParams,
        content_type = "application/x-www-form-urlencoded",
        description = "Optional filter form; its fields override the query string"
    ),
    responses(
        (status = 200, description = "One page of products", body = ListingResponse),
        (status = 400, response = BadRequestParameterResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_products_form<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    Query(query): Query<ListingParams>,
    request: Request,
) -> Result<Json<ListingResponse>, AppError> {
    let params = if is_form_body(request.headers()) {
        let Form(body) = Form::<ListingParams>::from_request(request, &())
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        body.or(query)
    } else {
        query
    };

    Ok(listing(&service, params).await.map(Json)?)
}

fn is_form_body(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Context for the add-product form
#[utoipa::path(
    get,
    path = "/produto/add",
    tag = PRODUCT_TAG,
    responses(
        (status = 200, description = "Category choices", body = AddFormContext),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_form<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
) -> CatalogResult<Json<AddFormContext>> {
    service.add_form().await.map(Json)
}

/// Create a product
#[utoipa::path(
    post,
    path = "/produto/add",
    tag = PRODUCT_TAG,
    request_body(content = ProductFormBody, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 413, description = "Image too large"),
        (status = 415, description = "Upload is not an image"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_product<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = ProductForm::from_multipart(&mut multipart).await?;
    let product = service.create_product(form).await?;

    AuditEvent::new(
        "product.create",
        Some(format!("product:{}", product.id)),
        AuditOutcome::Success,
    )
    .with_request_headers(&headers)
    .with_details(json!({
        "name": product.name,
        "category_id": product.category_id,
        "has_image": product.has_image(),
    }))
    .log();

    let notices = vec![Notice::success(format!("Product '{}' created", product.name))];
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse { product, notices }),
    ))
}

/// Context for the edit-product form
#[utoipa::path(
    get,
    path = "/produto/edit/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product and category choices", body = EditFormContext),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn edit_form<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<EditFormContext>> {
    service.edit_form(id).await.map(Json)
}

/// Update a product
#[utoipa::path(
    post,
    path = "/produto/edit/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body(content = ProductFormBody, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 413, description = "Image too large"),
        (status = 415, description = "Upload is not an image"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_product<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    UuidPath(id): UuidPath,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<ProductResponse>, AppError> {
    let form = ProductForm::from_multipart(&mut multipart).await?;
    let product = service.update_product(id, form).await?;

    AuditEvent::new(
        "product.update",
        Some(format!("product:{}", id)),
        AuditOutcome::Success,
    )
    .with_request_headers(&headers)
    .with_details(json!({
        "name": product.name,
        "category_id": product.category_id,
        "has_image": product.has_image(),
    }))
    .log();

    let notices = vec![Notice::success(format!("Product '{}' updated", product.name))];
    Ok(Json(ProductResponse { product, notices }))
}

/// Delete a product (POST or DELETE; GET is rejected)
#[utoipa::path(
    post,
    path = "/produto/delete/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = DeleteResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 405, description = "Delete requested with GET"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_product<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    headers: HeaderMap,
    UuidPath(id): UuidPath,
) -> CatalogResult<Json<DeleteResponse>> {
    let result = service.delete_product(id).await;

    let outcome = match &result {
        Ok(()) => AuditOutcome::Success,
        Err(_) => AuditOutcome::Failure,
    };
    AuditEvent::new("product.delete", Some(format!("product:{}", id)), outcome)
        .with_request_headers(&headers)
        .log();

    result?;

    Ok(Json(DeleteResponse {
        id,
        notices: vec![Notice::success("Product deleted")],
    }))
}

/// Image endpoints answer a missing product or image with a bare 404
fn image_response(result: CatalogResult<ImageData>) -> Response {
    match result {
        Ok(image) => ([(header::CONTENT_TYPE, image.mime_type)], image.bytes).into_response(),
        Err(err) if err.is_missing_image() => StatusCode::NOT_FOUND.into_response(),
        Err(err) => err.into_response(),
    }
}

/// Original product image
#[utoipa::path(
    get,
    path = "/produto/imagem/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Image bytes with the stored MIME type", content_type = "application/octet-stream"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, description = "No such product, or product without image"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn product_image<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    UuidPath(id): UuidPath,
) -> Response {
    image_response(service.product_image(id).await)
}

/// PNG thumbnail at the default size
#[utoipa::path(
    get,
    path = "/produto/thumbnail/{id}",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "PNG thumbnail", content_type = "image/png"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, description = "No such product, or product without image"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn product_thumbnail<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    UuidPath(id): UuidPath,
) -> Response {
    let size = service.settings().default_thumbnail_size;
    image_response(service.product_thumbnail(id, size).await)
}

/// PNG thumbnail whose longest edge is at most `size`
#[utoipa::path(
    get,
    path = "/produto/thumbnail/{id}/{size}",
    tag = PRODUCT_TAG,
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("size" = u32, Path, description = "Longest edge in pixels")
    ),
    responses(
        (status = 200, description = "PNG thumbnail", content_type = "image/png"),
        (status = 400, response = BadRequestParameterResponse),
        (status = 404, description = "No such product, or product without image"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn product_thumbnail_sized<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    UuidPath(id): UuidPath,
    Path(ThumbnailPath { size }): Path<ThumbnailPath>,
) -> Response {
    let settings = service.settings();
    let size = match imaging::parse_thumbnail_size(
        Some(&size),
        settings.default_thumbnail_size,
        settings.max_thumbnail_size,
    ) {
        Ok(size) => size,
        Err(err) => return err.into_response(),
    };

    image_response(service.product_thumbnail(id, size).await)
}

/// List categories ordered by name
#[utoipa::path(
    get,
    path = "/categoria/",
    tag = CATEGORY_TAG,
    responses(
        (status = 200, description = "All categories", body = Vec<Category>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_categories<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
) -> CatalogResult<Json<Vec<Category>>> {
    service.list_categories().await.map(Json)
}

/// Create a category
#[utoipa::path(
    post,
    path = "/categoria/add",
    tag = CATEGORY_TAG,
    request_body = CreateCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_category<S: CatalogStore>(
    State(service): State<Arc<CatalogService<S>>>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> CatalogResult<impl IntoResponse> {
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
