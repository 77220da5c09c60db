use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{NotificationQuery, Page, Paginated};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn list_notifications(
    claims: Claims,
    state: web::Data<AppState>,
    query: web::Query<NotificationQuery>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let page = Page::new(query.page, query.per_page);

    let result = state
        .notifications
        .list_for_user(actor.id, query.unread, page)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(Paginated::new(result, page))))
}

pub async fn mark_read(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let id = path.into_inner();

    let notification = state
        .notifications
        .mark_read(actor.id, id, Utc::now())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(notification)))
}

pub async fn mark_all_read(
    claims: Claims,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let updated = state
        .notifications
        .mark_all_read(actor.id, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(json!({ "updated": updated })),
        "All notifications marked as read",
    )))
}
