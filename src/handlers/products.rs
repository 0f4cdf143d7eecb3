use crate::error::{ErrorResponse, ProductError};
use crate::models::product::ProductRequest;
use crate::services::product::ProductService;
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use tracing::error;
use utoipa::IntoParams;

fn default_page() -> usize {
    0
}
fn default_size() -> usize {
    10
}
fn default_sort_by() -> String {
    "id".to_string()
}
fn default_direction() -> String {
    "ASC".to_string()
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(rename = "sortBy", default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn product_error_response(err: ProductError, path: &str) -> HttpResponse {
    match err {
        ProductError::NotFound(_) => HttpResponse::NotFound().json(ErrorResponse::new(
            StatusCode::NOT_FOUND,
            err.to_string(),
            path,
        )),
        ProductError::Validation(_) => HttpResponse::BadRequest().json(ErrorResponse::new(
            StatusCode::BAD_REQUEST,
            err.to_string(),
            path,
        )),
        ProductError::Store(e) => {
            error!(error = %e, "Product store failure");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                path,
            ))
        }
    }
}

/// Get all products with pagination
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of products", body = crate::models::product::ProductPage),
        (status = 400, description = "Invalid pagination or sort parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_all_products(
    service: web::Data<ProductService>,
    query: web::Query<PageQuery>,
    req: HttpRequest,
) -> impl Responder {
    match service
        .get_all(query.page, query.size, &query.sort_by, &query.direction)
        .await
    {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => product_error_response(e, req.path()),
    }
}

/// Get a product by its ID
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = u64, Path, description = "ID of the product to retrieve")),
    responses(
        (status = 200, description = "Product found", body = crate::models::product::ProductResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_product_by_id(
    service: web::Data<ProductService>,
    id: web::Path<u64>,
    req: HttpRequest,
) -> impl Responder {
    match service.get_by_id(id.into_inner()).await {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(e) => product_error_response(e, req.path()),
    }
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = crate::models::product::ProductResponse),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    service: web::Data<ProductService>,
    payload: web::Json<ProductRequest>,
    req: HttpRequest,
) -> impl Responder {
    match service.create(&payload).await {
        Ok(product) => HttpResponse::Created().json(product),
        Err(e) => product_error_response(e, req.path()),
    }
}

/// Update an existing product
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = u64, Path, description = "ID of the product to update")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product updated", body = crate::models::product::ProductResponse),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    service: web::Data<ProductService>,
    id: web::Path<u64>,
    payload: web::Json<ProductRequest>,
    req: HttpRequest,
) -> impl Responder {
    match service.update(id.into_inner(), &payload).await {
        Ok(product) => HttpResponse::Ok().json(product),
        Err(e) => product_error_response(e, req.path()),
    }
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = u64, Path, description = "ID of the product to delete")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    service: web::Data<ProductService>,
    id: web::Path<u64>,
    req: HttpRequest,
) -> impl Responder {
    match service.delete(id.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => product_error_response(e, req.path()),
    }
}

/// Get products by category
#[utoipa::path(
    get,
    path = "/api/v1/products/category/{category}",
    params(("category" = String, Path, description = "Category to filter by")),
    responses(
        (status = 200, description = "Products in the category", body = [crate::models::product::ProductResponse]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn get_products_by_category(
    service: web::Data<ProductService>,
    category: web::Path<String>,
    req: HttpRequest,
) -> impl Responder {
    match service.get_by_category(&category).await {
        Ok(products) => HttpResponse::Ok().json(products),
        Err(e) => product_error_response(e, req.path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ProductCache;
    use crate::db::{product_repository::ProductRepository, Database};
    use actix_web::{test, App};
    use std::sync::Arc;

    macro_rules! product_app {
        () => {{
            let repo = ProductRepository::new(Database::temporary().unwrap());
            let cache = Arc::new(ProductCache::new());
            test::init_service(
                App::new()
                    .app_data(web::Data::new(ProductService::new(repo, cache)))
                    .app_data(
                        web::JsonConfig::default().error_handler(crate::error::json_error_handler),
                    )
                    .app_data(
                        web::PathConfig::default().error_handler(crate::error::path_error_handler),
                    )
                    .app_data(
                        web::QueryConfig::default()
                            .error_handler(crate::error::query_error_handler),
                    )
                    .route("/api/v1/products", web::get().to(get_all_products))
                    .route("/api/v1/products", web::post().to(create_product))
                    .route("/api/v1/products/{id}", web::get().to(get_product_by_id))
                    .route("/api/v1/products/{id}", web::put().to(update_product))
                    .route("/api/v1/products/{id}", web::delete().to(delete_product))
                    .route(
                        "/api/v1/products/category/{category}",
                        web::get().to(get_products_by_category),
                    ),
            )
            .await
        }};
    }

    fn widget_json() -> serde_json::Value {
        serde_json::json!({
            "name": "Widget",
            "price": 9.99,
            "category": "tools",
            "stock": 5
        })
    }

    #[actix_web::test]
    async fn create_returns_201_with_assigned_id_and_dates() {
        let app = product_app!();

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/products")
                .set_json(widget_json())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert!(body["id"].is_u64());
        assert_eq!(body["name"], "Widget");
        assert_eq!(body["createdDate"], body["lastUpdatedDate"]);
    }

    #[actix_web::test]
    async fn get_unknown_id_returns_404_error_body() {
        let app = product_app!();

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/products/999")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["message"], "product with id 999 not found");
        assert_eq!(body["path"], "/api/v1/products/999");
    }

    #[actix_web::test]
    async fn invalid_payload_returns_400() {
        let app = product_app!();

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/products")
                .set_json(serde_json::json!({"name": "", "price": 9.99}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Product name is required");
    }

    #[actix_web::test]
    async fn undeserializable_payload_returns_structured_400() {
        let app = product_app!();

        // stock is unsigned; -1 fails inside the JSON extractor, before
        // the handler runs, and must still produce the shared body shape.
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/products")
                .set_json(serde_json::json!({"name": "W", "price": 9.99, "stock": -1}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            res.headers().get("content-type").unwrap(),
            "application/json"
        );

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["error"], "Bad Request");
        assert_eq!(body["path"], "/api/v1/products");
        assert!(body["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn bad_path_and_query_params_return_structured_400() {
        let app = product_app!();

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/products/not-a-number")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["path"], "/api/v1/products/not-a-number");

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/products?page=minus-one")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["path"], "/api/v1/products");
    }

    #[actix_web::test]
    async fn update_and_delete_round_trip() {
        let app = product_app!();

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/products")
                .set_json(widget_json())
                .to_request(),
        )
        .await;
        let created: serde_json::Value = test::read_body_json(res).await;
        let id = created["id"].as_u64().unwrap();

        let mut updated_json = widget_json();
        updated_json["category"] = serde_json::json!("hardware");
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/products/{id}"))
                .set_json(updated_json)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(updated["category"], "hardware");

        let res = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/products/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/products/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn list_supports_paging_params() {
        let app = product_app!();
        for _ in 0..3 {
            test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/v1/products")
                    .set_json(widget_json())
                    .to_request(),
            )
            .await;
        }

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/products?page=0&size=2&sortBy=id&direction=DESC")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["totalElements"], 3);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["content"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn category_listing_returns_matches() {
        let app = product_app!();
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/products")
                .set_json(widget_json())
                .to_request(),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/products/category/tools")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }
}
