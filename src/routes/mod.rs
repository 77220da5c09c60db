use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::handlers::shared::{ApiResponse, json_config, path_config, query_config};

pub mod auth;
pub mod manager;
pub mod notifications;
pub mod users;
pub mod vacation_requests;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .route("/health", web::get().to(health))
        .service(
            web::scope("/api")
                .configure(auth::configure)
                .configure(vacation_requests::configure)
                .configure(manager::configure)
                .configure(notifications::configure)
                .configure(users::configure),
        );
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
