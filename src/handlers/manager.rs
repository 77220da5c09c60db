use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::database::models::TeamCalendarQuery;
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, PageQuery};
use crate::services::auth::Claims;

pub async fn pending_requests(
    claims: Claims,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let list = state
        .vacation_service
        .pending_queue(&actor, query.page())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(list)))
}

pub async fn team_calendar(
    claims: Claims,
    state: web::Data<AppState>,
    query: web::Query<TeamCalendarQuery>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let calendar = state
        .vacation_service
        .team_calendar(&actor, query.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(calendar)))
}

pub async fn team_stats(
    claims: Claims,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let stats = state.vacation_service.team_stats(&actor).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}
