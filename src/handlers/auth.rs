use actix_web::{HttpResponse, web};

use crate::AppState;
use crate::database::models::{LoginInput, RefreshInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::auth::Claims;

pub async fn login(
    state: web::Data<AppState>,
    input: web::Json<LoginInput>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.login(input.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

pub async fn refresh(
    state: web::Data<AppState>,
    input: web::Json<RefreshInput>,
) -> Result<HttpResponse, AppError> {
    let response = state.auth_service.refresh(input.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(response)))
}

/// Tokens are stateless; the client discards them.
pub async fn logout(claims: Claims) -> Result<HttpResponse, AppError> {
    log::info!("User {} logged out", claims.user_id());

    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Logged out successfully",
    )))
}

pub async fn me(claims: Claims, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let user = state.auth_service.profile(&claims).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(user)))
}
