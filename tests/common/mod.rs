#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use actix_web::{
    App,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    test, web,
};
use anyhow::Result;
use chrono::NaiveDate;
use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use serde_json::Value;
use uuid::Uuid;

use vacation_api::database::models::{CreateVacationRequestInput, User, UserRole};
use vacation_api::database::store::UserStore;
use vacation_api::middleware::RequestId;
use vacation_api::services::Actor;
use vacation_api::services::auth::{TokenType, hash_password};
use vacation_api::vacation::FixedClock;
use vacation_api::{AppState, Config, Stores, routes};

pub const TEST_PASSWORD: &str = "password123";

/// Wednesday, so week helpers below land on predictable business days.
pub fn today() -> NaiveDate {
    date("2025-01-01")
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid test date")
}

pub struct TestContext {
    pub config: Config,
    pub stores: Stores,
    pub state: web::Data<AppState>,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        Self::with_config(Config::test_config()).await
    }

    pub async fn with_config(config: Config) -> Result<Self> {
        Self::with_stores(config, Stores::in_memory()).await
    }

    pub async fn with_stores(config: Config, stores: Stores) -> Result<Self> {
        let state = AppState::new(&config, stores.clone())
            .with_clock(Arc::new(FixedClock::at_date(today())));

        Ok(TestContext {
            config,
            stores,
            state: web::Data::new(state),
        })
    }

    /// The full application, wired the same way as the server binary.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .app_data(web::Data::new(self.config.clone()))
            .wrap(RequestId)
            .configure(routes::configure)
    }

    pub async fn create_user(&self, role: UserRole, manager: Option<&User>, balance: i32) -> User {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();
        let email = format!("{}.{}", &Uuid::new_v4().simple().to_string()[..8], email);

        let user = User::new(
            email.to_lowercase(),
            hash_password(TEST_PASSWORD, self.config.bcrypt_cost).expect("hash password"),
            name,
            role,
        )
        .with_manager(manager.map(|m| m.id))
        .with_balance(balance)
        .with_department("Engineering");

        self.stores
            .users
            .create_user(&user)
            .await
            .expect("Failed to insert test user")
    }

    pub async fn create_manager(&self) -> User {
        self.create_user(UserRole::Manager, None, 25).await
    }

    pub async fn create_employee(&self, manager: &User, balance: i32) -> User {
        self.create_user(UserRole::Employee, Some(manager), balance)
            .await
    }

    pub async fn create_admin(&self) -> User {
        self.create_user(UserRole::Admin, None, 30).await
    }

    pub fn token(&self, user: &User) -> String {
        self.state
            .auth_service
            .issue_token(user, TokenType::Access)
            .expect("issue token")
    }

    pub fn auth_header(&self, user: &User) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.token(user)))
    }

    /// Submits a request through the service, bypassing HTTP.
    pub async fn submit_request(&self, user: &User, start: &str, end: &str) -> Uuid {
        let input = CreateVacationRequestInput {
            start_date: date(start),
            end_date: date(end),
            reason: "Family trip".to_string(),
            emergency_contact: "+55 11 99999-0000".to_string(),
        };

        self.state
            .vacation_service
            .create(&Actor::from(user), input)
            .await
            .expect("Failed to create test vacation request")
            .request
            .id
    }

    pub async fn balance_of(&self, user: &User) -> i32 {
        self.stores
            .users
            .find_by_id(user.id)
            .await
            .expect("load user")
            .expect("user exists")
            .vacation_balance
    }
}

/// Body for a request covering `start..=end`.
pub fn request_body(start: &str, end: &str) -> Value {
    serde_json::json!({
        "start_date": start,
        "end_date": end,
        "reason": "Family trip",
        "emergency_contact": "+55 11 99999-0000",
    })
}

pub async fn read_json(resp: ServiceResponse<impl MessageBody>) -> Value {
    let body = test::read_body(resp).await;
    serde_json::from_slice(&body).expect("Failed to parse JSON response")
}

pub fn setup_test_env() {
    unsafe {
        env::set_var("RUST_LOG", "debug");
    }
    let _ = env_logger::builder().is_test(true).try_init();
}
