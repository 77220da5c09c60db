use actix_web::{HttpRequest, HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{
    CreateVacationRequestInput, DecisionInput, Page, UpdateVacationRequestInput,
    VacationRequestQuery,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::middleware::RequestIdExt;
use crate::services::auth::Claims;

pub async fn list_requests(
    claims: Claims,
    state: web::Data<AppState>,
    query: web::Query<VacationRequestQuery>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let query = query.into_inner();
    let page = Page::new(query.page, query.per_page);

    let list = state
        .vacation_service
        .list_own(&actor, query.status, page)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(list)))
}

pub async fn create_request(
    req: HttpRequest,
    claims: Claims,
    state: web::Data<AppState>,
    input: web::Json<CreateVacationRequestInput>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;

    let request = state
        .vacation_service
        .create(&actor, input.into_inner())
        .await
        .inspect_err(|e| {
            log::info!(
                "Vacation request by {} refused ({}): {}",
                actor.id,
                req.correlation_id().unwrap_or_default(),
                e
            )
        })?;

    Ok(HttpResponse::Created().json(ApiResponse::success(request)))
}

pub async fn request_stats(
    claims: Claims,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let stats = state.vacation_service.own_stats(&actor).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(stats)))
}

pub async fn get_request(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let request = state
        .vacation_service
        .get(&actor, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn update_request(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateVacationRequestInput>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let request = state
        .vacation_service
        .update(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn cancel_request(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let request = state
        .vacation_service
        .cancel(&actor, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn approve_request(
    req: HttpRequest,
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: Option<web::Json<DecisionInput>>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let id = path.into_inner();
    let comment = input.and_then(|body| body.into_inner().comment);

    log::debug!(
        "Approving request {} ({})",
        id,
        req.correlation_id().unwrap_or_default()
    );
    let request = state.vacation_service.approve(&actor, id, comment).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}

pub async fn reject_request(
    req: HttpRequest,
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: Option<web::Json<DecisionInput>>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let id = path.into_inner();
    let comment = input.and_then(|body| body.into_inner().comment);

    log::debug!(
        "Rejecting request {} ({})",
        id,
        req.correlation_id().unwrap_or_default()
    );
    let request = state.vacation_service.reject(&actor, id, comment).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(request)))
}
