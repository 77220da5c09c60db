use actix_web::web;

use crate::handlers::manager;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/manager")
            .route("/pending-requests", web::get().to(manager::pending_requests))
            .route("/team-calendar", web::get().to(manager::team_calendar))
            .route("/team-stats", web::get().to(manager::team_stats)),
    );
}
