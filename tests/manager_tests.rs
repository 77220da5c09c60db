use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::json;

mod common;

use common::{TestContext, read_json};

#[actix_web::test]
async fn test_approve_debits_balance_once() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let employee = ctx.create_employee(&manager, 22).await;
    let id = ctx
        .submit_request(&employee, "2025-02-03", "2025-02-07")
        .await;
    let app = test::init_service(ctx.app()).await;

    // Act
    let req = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/approve", id))
        .insert_header(ctx.auth_header(&manager))
        .set_json(json!({ "comment": "  Enjoy  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let again = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/approve", id))
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let again_resp = test::call_service(&app, again).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["status"], json!("approved"));
    assert_eq!(body["data"]["approved_by"], json!(manager.id));
    assert_eq!(body["data"]["approval_comment"], json!("Enjoy"));
    assert_eq!(body["data"]["approver"]["name"], json!(manager.name));
    assert!(!body["data"]["approval_date"].is_null());

    assert_eq!(again_resp.status(), StatusCode::CONFLICT);
    assert_eq!(ctx.balance_of(&employee).await, 17);
}

#[actix_web::test]
async fn test_concurrent_approvals_debit_once() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let employee = ctx.create_employee(&manager, 22).await;
    let id = ctx
        .submit_request(&employee, "2025-02-03", "2025-02-07")
        .await;
    let app = test::init_service(ctx.app()).await;

    let first = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/approve", id))
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let second = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/approve", id))
        .insert_header(ctx.auth_header(&manager))
        .to_request();

    // Act
    let (a, b) = tokio::join!(
        test::call_service(&app, first),
        test::call_service(&app, second)
    );

    // Assert
    let mut statuses = vec![a.status().as_u16(), b.status().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![200, 409]);
    assert_eq!(ctx.balance_of(&employee).await, 17);
}

#[actix_web::test]
async fn test_approve_and_cancel_race_has_one_winner() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let employee = ctx.create_employee(&manager, 22).await;
    let id = ctx
        .submit_request(&employee, "2025-02-03", "2025-02-07")
        .await;
    let app = test::init_service(ctx.app()).await;

    let approve = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/approve", id))
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let cancel = test::TestRequest::delete()
        .uri(&format!("/api/vacation-requests/{}", id))
        .insert_header(ctx.auth_header(&employee))
        .to_request();

    // Act
    let (approved, cancelled) = tokio::join!(
        test::call_service(&app, approve),
        test::call_service(&app, cancel)
    );

    // Assert
    let approve_won = approved.status() == StatusCode::OK;
    let cancel_won = cancelled.status() == StatusCode::OK;
    assert!(approve_won ^ cancel_won);
    let expected_balance = if approve_won { 17 } else { 22 };
    assert_eq!(ctx.balance_of(&employee).await, expected_balance);
}

#[actix_web::test]
async fn test_reject_requires_comment() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let employee = ctx.create_employee(&manager, 22).await;
    let id = ctx
        .submit_request(&employee, "2025-02-03", "2025-02-07")
        .await;
    let app = test::init_service(ctx.app()).await;

    // Act
    let blank = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/reject", id))
        .insert_header(ctx.auth_header(&manager))
        .set_json(json!({ "comment": "   " }))
        .to_request();
    let blank_resp = test::call_service(&app, blank).await;

    let reject = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/reject", id))
        .insert_header(ctx.auth_header(&manager))
        .set_json(json!({ "comment": "Release week" }))
        .to_request();
    let reject_resp = test::call_service(&app, reject).await;

    // Assert
    assert_eq!(blank_resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(blank_resp).await["data"]["code"],
        json!("missing_rejection_comment")
    );

    assert_eq!(reject_resp.status(), StatusCode::OK);
    let body = read_json(reject_resp).await;
    assert_eq!(body["data"]["status"], json!("rejected"));
    assert_eq!(body["data"]["approval_comment"], json!("Release week"));
    assert_eq!(ctx.balance_of(&employee).await, 22);
}

#[actix_web::test]
async fn test_employee_cannot_decide() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let employee = ctx.create_employee(&manager, 22).await;
    let colleague = ctx.create_employee(&manager, 22).await;
    let id = ctx
        .submit_request(&employee, "2025-02-03", "2025-02-07")
        .await;
    let app = test::init_service(ctx.app()).await;

    // Act
    let req = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/approve", id))
        .insert_header(ctx.auth_header(&colleague))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        read_json(resp).await["data"]["code"],
        json!("not_authorized")
    );
    assert_eq!(ctx.balance_of(&employee).await, 22);
}

#[actix_web::test]
async fn test_manager_of_another_team_sees_not_found() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let other_manager = ctx.create_manager().await;
    let employee = ctx.create_employee(&manager, 22).await;
    let id = ctx
        .submit_request(&employee, "2025-02-03", "2025-02-07")
        .await;
    let app = test::init_service(ctx.app()).await;

    // Act
    let req = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/approve", id))
        .insert_header(ctx.auth_header(&other_manager))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(ctx.balance_of(&employee).await, 22);
}

#[actix_web::test]
async fn test_pending_queue_is_oldest_first_and_team_scoped() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let other_manager = ctx.create_manager().await;
    let ana = ctx.create_employee(&manager, 22).await;
    let joao = ctx.create_employee(&manager, 22).await;
    let outsider = ctx.create_employee(&other_manager, 22).await;

    let first = ctx.submit_request(&ana, "2025-03-03", "2025-03-07").await;
    let second = ctx.submit_request(&joao, "2025-02-03", "2025-02-07").await;
    ctx.submit_request(&outsider, "2025-02-03", "2025-02-07")
        .await;
    let app = test::init_service(ctx.app()).await;

    // Act
    let req = test::TestRequest::get()
        .uri("/api/manager/pending-requests")
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["total"], json!(2));
    assert_eq!(body["data"]["requests"][0]["id"], json!(first));
    assert_eq!(body["data"]["requests"][0]["user"]["name"], json!(ana.name));
    assert_eq!(body["data"]["requests"][1]["id"], json!(second));
}

#[actix_web::test]
async fn test_employee_cannot_see_pending_queue() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let employee = ctx.create_employee(&manager, 22).await;
    let app = test::init_service(ctx.app()).await;

    // Act
    let req = test::TestRequest::get()
        .uri("/api/manager/pending-requests")
        .insert_header(ctx.auth_header(&employee))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_team_calendar_lists_approved_overlapping_requests() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let ana = ctx.create_employee(&manager, 30).await;
    let joao = ctx.create_employee(&manager, 30).await;

    let february = ctx.submit_request(&ana, "2025-02-03", "2025-02-07").await;
    let june = ctx.submit_request(&ana, "2025-06-02", "2025-06-06").await;
    let pending = ctx.submit_request(&joao, "2025-02-10", "2025-02-14").await;

    let app = test::init_service(ctx.app()).await;
    for id in [february, june] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/vacation-requests/{}/approve", id))
            .insert_header(ctx.auth_header(&manager))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    // Act
    let default_window = test::TestRequest::get()
        .uri("/api/manager/team-calendar")
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let default_body = read_json(test::call_service(&app, default_window).await).await;

    let explicit = test::TestRequest::get()
        .uri("/api/manager/team-calendar?start_date=2025-02-07&end_date=2025-06-02")
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let explicit_body = read_json(test::call_service(&app, explicit).await).await;

    let inverted = test::TestRequest::get()
        .uri("/api/manager/team-calendar?start_date=2025-06-02&end_date=2025-02-07")
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let inverted_resp = test::call_service(&app, inverted).await;

    // Assert
    assert_eq!(default_body["data"]["start_date"], json!("2025-01-01"));
    assert_eq!(default_body["data"]["end_date"], json!("2025-04-01"));
    assert_eq!(default_body["data"]["total"], json!(1));
    assert_eq!(default_body["data"]["entries"][0]["id"], json!(february));
    assert_eq!(
        default_body["data"]["entries"][0]["user_name"],
        json!(ana.name)
    );

    assert_eq!(explicit_body["data"]["total"], json!(2));
    assert_eq!(explicit_body["data"]["entries"][0]["id"], json!(february));
    assert_eq!(explicit_body["data"]["entries"][1]["id"], json!(june));
    assert_ne!(explicit_body["data"]["entries"][0]["id"], json!(pending));

    assert_eq!(inverted_resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_team_stats_summarise_direct_reports() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let ana = ctx.create_employee(&manager, 22).await;
    let joao = ctx.create_employee(&manager, 28).await;

    let approved = ctx.submit_request(&ana, "2025-02-03", "2025-02-07").await;
    ctx.submit_request(&joao, "2025-03-03", "2025-03-07").await;

    let app = test::init_service(ctx.app()).await;
    let approve = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/approve", approved))
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    test::call_service(&app, approve).await;

    // Act
    let req = test::TestRequest::get()
        .uri("/api/manager/team-stats")
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Assert
    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["data"]["team_members_count"], json!(2));
    assert_eq!(body["data"]["pending_requests_count"], json!(1));
    assert_eq!(body["data"]["approved_requests_count"], json!(1));
    assert_eq!(body["data"]["total_vacation_days"], json!(5));
    assert_eq!(body["data"]["current_year"], json!(2025));

    let balances: Vec<i64> = body["data"]["team_members"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["vacation_balance"].as_i64().unwrap())
        .collect();
    let mut sorted = balances.clone();
    sorted.sort();
    assert_eq!(sorted, vec![17, 28]);
}

#[actix_web::test]
async fn test_team_stats_count_pending_requests_from_next_year() {
    // Arrange
    common::setup_test_env();
    let ctx = TestContext::new().await.unwrap();
    let manager = ctx.create_manager().await;
    let ana = ctx.create_employee(&manager, 22).await;
    let joao = ctx.create_employee(&manager, 22).await;

    let queued = ctx.submit_request(&ana, "2026-01-05", "2026-01-09").await;
    let next_year = ctx.submit_request(&joao, "2026-01-12", "2026-01-16").await;

    let app = test::init_service(ctx.app()).await;
    let approve = test::TestRequest::put()
        .uri(&format!("/api/vacation-requests/{}/approve", next_year))
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    assert_eq!(
        test::call_service(&app, approve).await.status(),
        StatusCode::OK
    );

    // Act
    let queue = test::TestRequest::get()
        .uri("/api/manager/pending-requests")
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let queue_body = read_json(test::call_service(&app, queue).await).await;

    let stats = test::TestRequest::get()
        .uri("/api/manager/team-stats")
        .insert_header(ctx.auth_header(&manager))
        .to_request();
    let stats_body = read_json(test::call_service(&app, stats).await).await;

    // Assert
    assert_eq!(queue_body["data"]["total"], json!(1));
    assert_eq!(queue_body["data"]["requests"][0]["id"], json!(queued));
    assert_eq!(stats_body["data"]["pending_requests_count"], json!(1));
    assert_eq!(stats_body["data"]["approved_requests_count"], json!(0));
    assert_eq!(stats_body["data"]["total_vacation_days"], json!(0));
}
