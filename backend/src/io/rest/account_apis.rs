//! # REST API for Accounts
//!
//! Registration, login and the bearer-authenticated endpoints for the
//! current user. Request bodies carrying passwords are never logged.

use axum::extract::State;
use shared::{
    AccountType, ChangePasswordRequest, CreateAccountTypeRequest, LoginRequest, LoginResponse,
    RegisterRequest, UserProfile,
};
use tracing::info;

use super::error::{ApiJson, ApiPath};
use super::extract::AuthenticatedUser;
use super::mappers::AccountMapper;
use super::response::{created, ok, ok_with_message, ApiResult};
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<UserProfile> {
    info!("POST /api/auth/register - username: {}", request.username);
    let command = AccountMapper::to_register_command(request);
    let account = state.account_service.register(command).await?;
    created(AccountMapper::to_profile_dto(account), "Account registered")
}

/// Exchange a username and password for an access token
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    info!("POST /api/auth/login - username: {}", request.username);
    let result = state
        .account_service
        .login(AccountMapper::to_login_command(request))
        .await?;
    ok_with_message(AccountMapper::to_login_dto(result), "Login successful")
}

pub async fn change_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> ApiResult<()> {
    info!("PUT /api/auth/password - user: {}", user.user_id);
    let command = AccountMapper::to_change_password_command(user.user_id, request);
    state.account_service.change_password(command).await?;
    ok_with_message((), "Password changed")
}

pub async fn me(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<UserProfile> {
    info!("GET /api/auth/me - user: {}", user.user_id);
    let account = state.account_service.get_user(user.user_id).await?;
    ok(AccountMapper::to_profile_dto(account))
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<i64>,
) -> ApiResult<UserProfile> {
    info!("GET /api/users/{}", user_id);
    let account = state.account_service.get_user(user_id).await?;
    ok(AccountMapper::to_profile_dto(account))
}

pub async fn list_account_types(State(state): State<AppState>) -> ApiResult<Vec<AccountType>> {
    info!("GET /api/account-types");
    let types = state.account_service.list_account_types().await?;
    ok(types.into_iter().map(AccountMapper::to_account_type_dto).collect())
}

pub async fn create_account_type(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAccountTypeRequest>,
) -> ApiResult<AccountType> {
    info!("POST /api/account-types - request: {:?}", request);
    let account_type = state.account_service.create_account_type(&request.name).await?;
    created(AccountMapper::to_account_type_dto(account_type), "Account type created")
}
