use actix_web::web;

use crate::handlers::vacation_requests;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vacation-requests")
            .route("", web::get().to(vacation_requests::list_requests))
            .route("", web::post().to(vacation_requests::create_request))
            // Registered before "/{id}" so it is not parsed as an id
            .route("/stats", web::get().to(vacation_requests::request_stats))
            .route("/{id}", web::get().to(vacation_requests::get_request))
            .route("/{id}", web::put().to(vacation_requests::update_request))
            .route("/{id}", web::delete().to(vacation_requests::cancel_request))
            .route(
                "/{id}/cancel",
                web::put().to(vacation_requests::cancel_request),
            )
            .route(
                "/{id}/approve",
                web::put().to(vacation_requests::approve_request),
            )
            .route(
                "/{id}/reject",
                web::put().to(vacation_requests::reject_request),
            ),
    );
}
