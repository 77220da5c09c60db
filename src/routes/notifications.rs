use actix_web::web;

use crate::handlers::notifications;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .route("", web::get().to(notifications::list_notifications))
            .route("/read-all", web::put().to(notifications::mark_all_read))
            .route("/{id}/read", web::put().to(notifications::mark_read)),
    );
}
