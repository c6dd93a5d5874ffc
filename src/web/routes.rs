use actix_web::web;

// In a real deployment this might also check DB connectivity.
async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called from `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      // Health Check Route
      .route("/health", web::get().to(health_check_handler))
      // Authentication Routes (magic link)
      .service(
        web::scope("/auth")
          .route(
            "/magic-link",
            web::post().to(crate::web::handlers::auth_handlers::request_magic_link_handler),
          )
          .route(
            "/callback",
            web::get().to(crate::web::handlers::auth_handlers::auth_callback_handler),
          ),
      )
      // Checkout Routes
      .service(
        web::scope("/checkout").route(
          "",
          web::post().to(crate::web::handlers::checkout_handlers::create_checkout_handler),
        ),
      )
      // Catalog Routes
      .service(
        web::scope("/products")
          .route(
            "",
            web::get().to(crate::web::handlers::product_handlers::list_products_handler),
          )
          .route(
            "/{product_id}",
            web::get().to(crate::web::handlers::product_handlers::get_product_handler),
          ),
      )
      // Account Routes
      .service(
        web::scope("/account")
          .route(
            "/claim",
            web::post().to(crate::web::handlers::account_handlers::claim_orders_handler),
          )
          .route(
            "/orders",
            web::get().to(crate::web::handlers::account_handlers::order_history_handler),
          ),
      ),
  );
}
