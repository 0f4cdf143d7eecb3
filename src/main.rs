mod cache;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod services;
#[cfg(test)]
mod test_support;
mod utils;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use cache::ProductCache;
use config::AppConfig;
use db::product_repository::ProductRepository;
use db::user_repository::UserRepository;
use db::Database;
use dotenv::dotenv;
use middleware::auth::SecurityMiddleware;
use middleware::rate_limit::RateLimitMiddleware;
use services::auth::AuthService;
use services::product::ProductService;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::products::get_all_products,
        handlers::products::get_product_by_id,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,
        handlers::products::get_products_by_category,
    ),
    components(
        schemas(
            handlers::auth::AuthRequest,
            handlers::auth::AuthResponse,
            models::product::ProductRequest,
            models::product::ProductResponse,
            models::product::ProductPage,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "Authentication", description = "User registration and login"),
        (name = "Products", description = "Product catalog management endpoints")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing subscriber for structured logging
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .json()
        .init();

    let config = AppConfig::from_env();

    if AppConfig::jwt_uses_default_secret() {
        warn!("JWT_SECRET not set; using built-in default - NOT SECURE FOR PRODUCTION");
    }

    let database = Database::new(&config.db_path).expect("Failed to initialize database");
    info!(db_path = %config.db_path, "Database initialized");

    let user_repo = UserRepository::new(database.clone());
    let product_repo = ProductRepository::new(database);

    let auth_service = web::Data::new(AuthService::new(user_repo.clone()));
    // One cache instance shared by every worker.
    let product_cache = Arc::new(ProductCache::new());
    let product_service = web::Data::new(ProductService::new(product_repo, product_cache));

    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        auth_service
            .seed_admin(username, password)
            .await
            .expect("Failed to seed admin user");
    }

    // One bucket for the whole process; workers share the same limiter.
    let rate_limiter = RateLimitMiddleware::new(config.rate_limit_per_minute);
    let security = SecurityMiddleware::new(user_repo);

    let bind_address = config.bind_address();
    info!(bind_address = %bind_address, rate_limit_per_minute = config.rate_limit_per_minute, "Starting product catalog server");
    info!("Available endpoints:");
    info!("   POST   /api/v1/auth/register             - Register new user (public)");
    info!("   POST   /api/v1/auth/login                - Login user (public)");
    info!("   GET    /api/v1/products                  - List products, paginated (authenticated)");
    info!("   GET    /api/v1/products/{{id}}             - Get product by id (authenticated)");
    info!("   POST   /api/v1/products                  - Create product (authenticated)");
    info!("   PUT    /api/v1/products/{{id}}             - Update product (authenticated)");
    info!("   DELETE /api/v1/products/{{id}}             - Delete product (authenticated)");
    info!("   GET    /api/v1/products/category/{{name}}  - List products by category (authenticated)");
    info!(
        swagger_url = format!("http://{}/swagger-ui/ (role ADMIN)", bind_address),
        "Swagger UI available"
    );

    HttpServer::new(move || {
        // Configure CORS
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        let openapi = ApiDoc::openapi();

        App::new()
            .app_data(auth_service.clone())
            .app_data(product_service.clone())
            // Extractor failures (bad JSON, path, query) share the
            // structured error body too.
            .app_data(web::JsonConfig::default().error_handler(error::json_error_handler))
            .app_data(web::PathConfig::default().error_handler(error::path_error_handler))
            .app_data(web::QueryConfig::default().error_handler(error::query_error_handler))
            // Registration order is inside-out: requests pass the tracing
            // logger, CORS, the rate limiter, then the security middleware
            // before reaching a handler.
            .wrap(security.clone())
            .wrap(rate_limiter.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            // Swagger UI (ADMIN-gated by the security middleware)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Public auth routes
            .service(
                web::scope("/api/v1/auth")
                    .route("/register", web::post().to(handlers::auth::register))
                    .route("/login", web::post().to(handlers::auth::login)),
            )
            // Protected product routes
            .service(
                web::scope("/api/v1/products")
                    .route(
                        "/category/{category}",
                        web::get().to(handlers::products::get_products_by_category),
                    )
                    .route("", web::get().to(handlers::products::get_all_products))
                    .route("", web::post().to(handlers::products::create_product))
                    .route("/{id}", web::get().to(handlers::products::get_product_by_id))
                    .route("/{id}", web::put().to(handlers::products::update_product))
                    .route(
                        "/{id}",
                        web::delete().to(handlers::products::delete_product),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
