use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;

mod common;

use common::{TEST_PASSWORD, TestContext, read_json};
use vacation_api::database::models::UserPatch;
use vacation_api::database::store::UserStore;

#[actix_web::test]
async fn test_login_success_returns_tokens_and_user() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let employee = ctx.create_employee(&manager, 22).await;
    let app = test::init_service(ctx.app()).await;

    // Act
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": employee.email.to_uppercase(),
            "password": TEST_PASSWORD,
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["token_type"], json!("Bearer"));
    assert_eq!(body["data"]["expires_in"], json!(86400));
    assert_eq!(body["data"]["user"]["id"], json!(employee.id));
    assert_eq!(body["data"]["user"]["manager"]["id"], json!(manager.id));
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert!(body["data"]["access_token"].as_str().is_some());
    assert!(body["data"]["refresh_token"].as_str().is_some());
}

#[actix_web::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let app = test::init_service(ctx.app()).await;

    // Act
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": manager.email, "password": "wrong-password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"]["code"], json!("unauthorized"));
}

#[actix_web::test]
async fn test_inactive_user_cannot_login_or_use_tokens() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let employee = ctx.create_employee(&manager, 22).await;
    let token_header = ctx.auth_header(&employee);
    ctx.stores
        .users
        .update_user(
            employee.id,
            UserPatch {
                active: Some(false),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    let app = test::init_service(ctx.app()).await;

    // Act
    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": employee.email, "password": TEST_PASSWORD }))
        .to_request();
    let login_resp = test::call_service(&app, login).await;

    let me = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(token_header)
        .to_request();
    let me_resp = test::call_service(&app, me).await;

    // Assert
    assert_eq!(login_resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(me_resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_refresh_token_flow() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let app = test::init_service(ctx.app()).await;

    let login = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": manager.email, "password": TEST_PASSWORD }))
        .to_request();
    let tokens = read_json(test::call_service(&app, login).await).await;
    let refresh_token = tokens["data"]["refresh_token"].as_str().unwrap().to_string();

    // Act
    let refresh = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({ "refresh_token": refresh_token }))
        .to_request();
    let refresh_resp = test::call_service(&app, refresh).await;

    let misuse = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", refresh_token)))
        .to_request();
    let misuse_resp = test::call_service(&app, misuse).await;

    // Assert
    assert_eq!(refresh_resp.status(), StatusCode::OK);
    let body = read_json(refresh_resp).await;
    assert!(body["data"]["access_token"].as_str().is_some());
    assert_eq!(misuse_resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_me_and_logout() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let app = test::init_service(ctx.app()).await;

    // Act
    let me = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let me_resp = test::call_service(&app, me).await;

    let logout = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let logout_resp = test::call_service(&app, logout).await;

    // Assert
    assert_eq!(me_resp.status(), StatusCode::OK);
    let body = read_json(me_resp).await;
    assert_eq!(body["data"]["email"], json!(manager.email));
    assert_eq!(body["data"]["role"], json!("manager"));

    assert_eq!(logout_resp.status(), StatusCode::OK);
    let body = read_json(logout_resp).await;
    assert_eq!(body["message"], json!("Logged out successfully"));
}

#[actix_web::test]
async fn test_garbage_token_is_unauthorized() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let app = test::init_service(ctx.app()).await;

    // Act
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_health_and_correlation_header() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let app = test::init_service(ctx.app()).await;

    // Act
    let req = test::TestRequest::get()
        .uri("/health")
        .insert_header(("X-Correlation-ID", "health-check-1"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-correlation-id").unwrap(),
        "health-check-1"
    );
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], json!("ok"));
}
