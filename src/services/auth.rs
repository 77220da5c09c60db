use std::future::{Ready, ready};
use std::sync::Arc;

use actix_web::{Error as ActixError, FromRequest, HttpRequest, dev::Payload, web::Data};
use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{
    AuthResponse, LoginInput, RefreshInput, RefreshResponse, User, UserInfo, UserRole,
};
use crate::database::store::UserStore;
use crate::error::AppError;
use crate::services::access::Actor;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub email: String,
    pub role: UserRole,
    pub token_type: TokenType,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }
}

fn decode_claims(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(config) = req.app_data::<Data<Config>>() else {
            log::error!("Config is not registered as app data");
            return ready(Err(AppError::internal_server_error_message(
                "Authentication is not configured",
            )
            .into()));
        };

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        let Some(token) = token else {
            return ready(Err(AppError::Unauthorized(
                "Missing or invalid authorization header".to_string(),
            )
            .into()));
        };

        match decode_claims(token, &config.jwt_secret) {
            Ok(claims) if claims.token_type == TokenType::Access => ready(Ok(claims)),
            Ok(_) => ready(Err(AppError::Unauthorized(
                "Refresh tokens cannot be used for API access".to_string(),
            )
            .into())),
            Err(err) => {
                log::debug!("Rejected bearer token: {}", err);
                ready(Err(
                    AppError::Unauthorized("Invalid or expired token".to_string()).into(),
                ))
            }
        }
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(password, cost)
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    config: Config,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, config: Config) -> Self {
        Self { users, config }
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse, AppError> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let email = input.email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|u| u.active)
            .ok_or_else(invalid)?;

        if !verify(&input.password, &user.password_hash).unwrap_or(false) {
            log::warn!("Failed login attempt for {}", email);
            return Err(invalid());
        }

        let access_token = self.issue_token(&user, TokenType::Access)?;
        let refresh_token = self.issue_token(&user, TokenType::Refresh)?;
        log::info!("User {} logged in", user.id);

        Ok(AuthResponse {
            user: self.with_manager(user).await?,
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_seconds(),
        })
    }

    pub async fn refresh(&self, input: RefreshInput) -> Result<RefreshResponse, AppError> {
        let claims = decode_claims(&input.refresh_token, &self.config.jwt_secret)
            .ok()
            .filter(|c| c.token_type == TokenType::Refresh)
            .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

        let user = self.active_user(claims.sub).await?;

        Ok(RefreshResponse {
            access_token: self.issue_token(&user, TokenType::Access)?,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_seconds(),
        })
    }

    /// Loads the token's user, who must still exist and be active.
    pub async fn actor(&self, claims: &Claims) -> Result<Actor, AppError> {
        let user = self.active_user(claims.user_id()).await?;
        Ok(Actor::from(&user))
    }

    pub async fn profile(&self, claims: &Claims) -> Result<UserInfo, AppError> {
        let user = self.active_user(claims.user_id()).await?;
        self.with_manager(user).await
    }

    pub fn issue_token(&self, user: &User, token_type: TokenType) -> Result<String, AppError> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => Duration::hours(self.config.jwt_expiration_hours),
            TokenType::Refresh => Duration::days(self.config.refresh_token_expiration_days),
        };

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            token_type,
            iat: now.timestamp() as usize,
            exp: (now + lifetime).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )
        .map_err(|e| AppError::internal_server_error_message(format!("Token encoding failed: {}", e)))
    }

    async fn active_user(&self, id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .filter(|u| u.active)
            .ok_or_else(|| AppError::Unauthorized("User not found or inactive".to_string()))
    }

    async fn with_manager(&self, user: User) -> Result<UserInfo, AppError> {
        let manager = match user.manager_id {
            Some(manager_id) => self.users.find_by_id(manager_id).await?.map(|m| m.summary()),
            None => None,
        };
        Ok(UserInfo::from(user).with_manager(manager))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use pretty_assertions::assert_eq;

    async fn service_with_user(password: &str) -> (AuthService, User) {
        let store = Arc::new(MemoryStore::new());
        let user = User::new(
            "ana@example.com".to_string(),
            hash_password(password, 4).unwrap(),
            "Ana".to_string(),
            UserRole::Employee,
        );
        store.create_user(&user).await.unwrap();
        (AuthService::new(store, Config::test_config()), user)
    }

    #[tokio::test]
    async fn login_issues_both_tokens() {
        let (service, user) = service_with_user("secret1").await;

        let response = service
            .login(LoginInput {
                email: " Ana@Example.com ".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user.id, user.id);
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 86400);

        let access = decode_claims(&response.access_token, &Config::test_config().jwt_secret).unwrap();
        let refresh = decode_claims(&response.refresh_token, &Config::test_config().jwt_secret).unwrap();
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(refresh.token_type, TokenType::Refresh);
        assert!(refresh.exp > access.exp);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let (service, _) = service_with_user("secret1").await;

        let result = service
            .login(LoginInput {
                email: "ana@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn refresh_rejects_access_tokens() {
        let (service, user) = service_with_user("secret1").await;
        let access = service.issue_token(&user, TokenType::Access).unwrap();
        let refresh = service.issue_token(&user, TokenType::Refresh).unwrap();

        let rejected = service
            .refresh(RefreshInput {
                refresh_token: access,
            })
            .await;
        let accepted = service
            .refresh(RefreshInput {
                refresh_token: refresh,
            })
            .await
            .unwrap();

        assert!(matches!(rejected, Err(AppError::Unauthorized(_))));
        assert_eq!(accepted.token_type, "Bearer");
    }
}
