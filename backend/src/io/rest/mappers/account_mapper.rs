use shared::{
    AccountType as SharedAccountType, ChangePasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    UserProfile,
};

use crate::domain::commands::accounts::{ChangePasswordCommand, LoginCommand, LoginResult, RegisterCommand};
use crate::domain::models::{AccountType, UserAccount};

pub const TOKEN_TYPE: &str = "Bearer";

/// Mapper for users, account types and login results
pub struct AccountMapper;

impl AccountMapper {
    pub fn to_account_type_dto(domain: AccountType) -> SharedAccountType {
        SharedAccountType {
            id: domain.id,
            name: domain.name,
        }
    }

    /// Public profile of a user; credentials never leave the domain layer
    pub fn to_profile_dto(domain: UserAccount) -> UserProfile {
        UserProfile {
            id: domain.user.id,
            username: domain.username,
            first_name: domain.individual.first_name,
            last_name: domain.individual.last_name,
            email: domain.individual.email,
            account_type: Self::to_account_type_dto(domain.account_type),
            created_at: domain.user.created_at.to_rfc3339(),
        }
    }

    pub fn to_login_dto(result: LoginResult) -> LoginResponse {
        LoginResponse {
            token: result.token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: result.expires_in,
            user: Self::to_profile_dto(result.account),
        }
    }

    pub fn to_register_command(request: RegisterRequest) -> RegisterCommand {
        RegisterCommand {
            username: request.username,
            password: request.password,
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            account_type_id: request.account_type_id,
        }
    }

    pub fn to_login_command(request: LoginRequest) -> LoginCommand {
        LoginCommand {
            username: request.username,
            password: request.password,
        }
    }

    /// The user comes from the bearer token, never from the body
    pub fn to_change_password_command(user_id: i64, request: ChangePasswordRequest) -> ChangePasswordCommand {
        ChangePasswordCommand {
            user_id,
            current_password: request.current_password,
            new_password: request.new_password,
        }
    }
}
