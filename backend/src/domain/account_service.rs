//! User accounts: registration, login and password changes.

use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{hash_password, needs_rehash, verify_password, TokenIssuer};
use crate::domain::commands::accounts::{ChangePasswordCommand, LoginCommand, LoginResult, RegisterCommand};
use crate::domain::errors::{DomainError, DomainResult, Validator};
use crate::domain::models::{AccountType, NewAccount, UserAccount};
use crate::domain::non_blank;
use crate::storage::AccountStorage;

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_USERNAME_LEN: usize = 64;
const INVALID_LOGIN: &str = "Invalid username or password";

#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStorage>,
    tokens: TokenIssuer,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStorage>, tokens: TokenIssuer) -> Self {
        Self { accounts, tokens }
    }

    pub async fn list_account_types(&self) -> DomainResult<Vec<AccountType>> {
        Ok(self.accounts.list_account_types().await?)
    }

    pub async fn create_account_type(&self, name: &str) -> DomainResult<AccountType> {
        let name = name.trim();
        info!("Creating account type: {}", name);
        Validator::new()
            .check(!name.is_empty(), "Account type name cannot be empty")
            .finish()?;

        if self.accounts.find_account_type_by_name(name).await?.is_some() {
            return Err(DomainError::conflict(format!("Account type already exists: {}", name)));
        }
        Ok(self.accounts.store_account_type(name).await?)
    }

    /// Create the person, the user and the credentials in one transaction
    pub async fn register(&self, command: RegisterCommand) -> DomainResult<UserAccount> {
        let username = command.username.trim().to_string();
        info!("Registering user: {}", username);

        let first_name = command.first_name.trim().to_string();
        let last_name = command.last_name.trim().to_string();
        let email = non_blank(command.email);

        let mut validator = Validator::new();
        validator
            .check(!username.is_empty(), "Username cannot be empty")
            .check(
                username.chars().count() <= MAX_USERNAME_LEN,
                format!("Username cannot exceed {} characters", MAX_USERNAME_LEN),
            )
            .check(!first_name.is_empty(), "First name cannot be empty")
            .check(!last_name.is_empty(), "Last name cannot be empty")
            .check(
                email.as_deref().map_or(true, |e| e.contains('@')),
                "Email address is not valid",
            );
        check_password(&mut validator, &command.password);
        validator.finish()?;

        if self.accounts.get_account_type(command.account_type_id).await?.is_none() {
            return Err(DomainError::not_found("Account type", command.account_type_id));
        }
        if self.accounts.find_credentials(&username).await?.is_some() {
            return Err(DomainError::conflict(format!("Username is already taken: {}", username)));
        }

        let user_id = self
            .accounts
            .create_account(&NewAccount {
                username,
                password_hash: hash_password(&command.password)?,
                first_name,
                last_name,
                email,
                account_type_id: command.account_type_id,
            })
            .await?;

        info!("Registered user {}", user_id);
        self.get_user(user_id).await
    }

    /// Check credentials and issue an access token. Credentials still in the
    /// legacy digest format are rehashed with Argon2.
    pub async fn login(&self, command: LoginCommand) -> DomainResult<LoginResult> {
        let username = command.username.trim();
        info!("Login attempt for {}", username);

        let Some(credentials) = self.accounts.find_credentials(username).await? else {
            warn!("Login failed: unknown user {}", username);
            return Err(DomainError::Unauthorized(INVALID_LOGIN.to_string()));
        };

        if !verify_password(&credentials.password_hash, &command.password)? {
            warn!("Login failed: wrong password for {}", username);
            return Err(DomainError::Unauthorized(INVALID_LOGIN.to_string()));
        }

        if needs_rehash(&credentials.password_hash) {
            info!("Upgrading stored password hash for user {}", credentials.user_id);
            let upgraded = hash_password(&command.password)?;
            self.accounts.update_password_hash(credentials.id, &upgraded).await?;
        }

        let account = self.get_user(credentials.user_id).await?;
        let token = self.tokens.issue(credentials.user_id, &credentials.username)?;

        Ok(LoginResult {
            token,
            expires_in: self.tokens.expiry_seconds(),
            account,
        })
    }

    pub async fn change_password(&self, command: ChangePasswordCommand) -> DomainResult<()> {
        info!("Changing password for user {}", command.user_id);

        let credentials = self
            .accounts
            .get_credentials_for_user(command.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", command.user_id))?;

        if !verify_password(&credentials.password_hash, &command.current_password)? {
            return Err(DomainError::Unauthorized("Current password is incorrect".to_string()));
        }

        let mut validator = Validator::new();
        check_password(&mut validator, &command.new_password);
        validator.finish()?;

        let hash = hash_password(&command.new_password)?;
        self.accounts.update_password_hash(credentials.id, &hash).await?;
        Ok(())
    }

    pub async fn get_user(&self, user_id: i64) -> DomainResult<UserAccount> {
        self.accounts.get_user_account(user_id).await?.ok_or_else(|| {
            warn!("User not found: {}", user_id);
            DomainError::not_found("User", user_id)
        })
    }
}

fn check_password(validator: &mut Validator, password: &str) {
    validator.check(
        password.chars().count() >= MIN_PASSWORD_LEN,
        format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
    );
}
