//! Login principals: the person, their user record and credentials.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct AccountType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub individual_id: i64,
    pub account_type_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    /// PHC string, or a legacy unsalted digest awaiting upgrade
    pub password_hash: String,
}

/// Everything needed to create an account in one transaction
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub account_type_id: i64,
}

/// A user joined with the person and account type it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub user: User,
    pub individual: Individual,
    pub account_type: AccountType,
    pub username: String,
}
