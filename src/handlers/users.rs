use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{CreateUserInput, Page, UpdateUserInput, UserListQuery};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn list_users(
    claims: Claims,
    state: web::Data<AppState>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let page = Page::new(query.page, query.per_page);

    let users = state
        .user_service
        .list(&actor, query.active, page)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

pub async fn create_user(
    claims: Claims,
    state: web::Data<AppState>,
    input: web::Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let user = state
        .user_service
        .create(&actor, input.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success(user)))
}

pub async fn update_user(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    input: web::Json<UpdateUserInput>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let user = state
        .user_service
        .update(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}

pub async fn delete_user(
    claims: Claims,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let actor = state.auth_service.actor(&claims).await?;
    let user = state
        .user_service
        .deactivate(&actor, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        Some(user),
        "User deactivated",
    )))
}
