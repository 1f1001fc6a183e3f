use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Products, categories, filtered listings and product images"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct BaseApiDoc;

/// Full document: base info plus the catalog paths at their real locations
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        let mut doc = BaseApiDoc::openapi();
        doc.merge(domain_catalog::handlers::ApiDoc::openapi());
        doc
    }
}
