//! Auth API Endpoints
//!
//! - POST /api/auth/login - Form login
//! - POST /api/auth/login/json - JSON login
//! - GET /api/auth/me - Current user
//! - POST /api/auth/register - Create account (admin)
//! - POST /api/auth/refresh - Re-issue token

use axum::{extract::State, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::common::{ApiForm, ApiJson, ClientIp};
use crate::api::middleware::Authenticated;
use crate::domain::{Role, User};
use crate::error::PlatformError;
use crate::service::{AccountService, AuditService, AuthService, NewAccount, Operation};

#[derive(Clone)]
pub struct AuthState {
    pub auth: AuthService,
    pub accounts: AccountService,
    pub audit: AuditService,
}

/// Credentials, accepted as form fields or JSON
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User summary embedded in token responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `bearer`
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.active,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    /// Defaults to `viewer`
    #[serde(default)]
    pub role: Role,
}

async fn issue_login(
    state: &AuthState,
    request: LoginRequest,
    ip_address: Option<String>,
) -> Result<Json<TokenResponse>, PlatformError> {
    let user = state.auth.authenticate(&request.username, &request.password).await?;
    let issued = state.auth.issue_token(&user)?;
    state.audit.log_login(&user.username, ip_address).await;

    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
        user: UserSummary::from(&user),
    }))
}

/// Log in with form fields
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::api::common::ApiError)
    )
)]
pub async fn login(
    State(state): State<AuthState>,
    ClientIp(ip): ClientIp,
    ApiForm(request): ApiForm<LoginRequest>,
) -> Result<Json<TokenResponse>, PlatformError> {
    issue_login(&state, request, ip).await
}

/// Log in with a JSON body
#[utoipa::path(
    post,
    path = "/api/auth/login/json",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = crate::api::common::ApiError)
    )
)]
pub async fn login_json(
    State(state): State<AuthState>,
    ClientIp(ip): ClientIp,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, PlatformError> {
    issue_login(&state, request, ip).await
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user info", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AuthState>,
    Authenticated(auth): Authenticated,
) -> Result<Json<UserResponse>, PlatformError> {
    auth.require(Operation::ReadProfile)?;
    let user = state.auth.current_user(&auth).await?;
    Ok(Json(user.into()))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = UserResponse),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Username or email taken"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register(
    State(state): State<AuthState>,
    Authenticated(auth): Authenticated,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<Json<UserResponse>, PlatformError> {
    auth.require(Operation::RegisterUser)?;

    let user = state
        .accounts
        .register(NewAccount {
            username: request.username,
            email: request.email,
            full_name: request.full_name,
            password: request.password,
            role: request.role,
        })
        .await?;

    state.audit.log_register(&auth, &user.id, &user.username).await;
    Ok(Json(user.into()))
}

/// Re-issue a token for the current user
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "New token", body = TokenResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn refresh(
    State(state): State<AuthState>,
    Authenticated(auth): Authenticated,
) -> Result<Json<TokenResponse>, PlatformError> {
    auth.require(Operation::RefreshToken)?;

    // Role comes from the store so a changed role takes effect on refresh.
    let user = state.auth.current_user(&auth).await?;
    let issued = state.auth.issue_token(&user)?;
    state.audit.log_token_refreshed(&auth).await;

    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
        user: UserSummary::from(&user),
    }))
}

pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/login/json", post(login_json))
        .route("/me", get(me))
        .route("/register", post(register))
        .route("/refresh", post(refresh))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_defaults_to_viewer() {
        let json = r#"{"username":"jane","email":"jane@xdr.local","full_name":"Jane","password":"password1"}"#;
        let req: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.role, Role::Viewer);
    }

    #[test]
    fn test_token_response_shape() {
        let user = User::new("USR-001", "admin", "admin@xdr.local", "System Administrator", Role::Admin, "h");
        let response = TokenResponse {
            access_token: "abc".to_string(),
            token_type: "bearer".to_string(),
            expires_in: 3600,
            user: UserSummary::from(&user),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["user"]["full_name"], "System Administrator");
        assert_eq!(json["user"]["role"], "admin");
        assert!(json["user"].get("password_hash").is_none());
    }
}
