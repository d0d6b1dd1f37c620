use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{AccountType, Credentials, Individual, NewAccount, User, UserAccount};
use crate::storage::connection::DbConnection;
use crate::storage::traits::AccountStorage;

/// Repository for account types, users and their credentials
#[derive(Clone)]
pub struct AccountRepository {
    db: DbConnection,
}

impl AccountRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn account_type_from_row(row: &SqliteRow) -> Result<AccountType> {
        Ok(AccountType {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }

    fn credentials_from_row(row: &SqliteRow) -> Result<Credentials> {
        Ok(Credentials {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
        })
    }

    fn user_account_from_row(row: &SqliteRow) -> Result<UserAccount> {
        Ok(UserAccount {
            user: User {
                id: row.try_get("user_id")?,
                individual_id: row.try_get("individual_id")?,
                account_type_id: row.try_get("account_type_id")?,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            },
            individual: Individual {
                id: row.try_get("individual_id")?,
                first_name: row.try_get("first_name")?,
                last_name: row.try_get("last_name")?,
                email: row.try_get("email")?,
            },
            account_type: AccountType {
                id: row.try_get("account_type_id")?,
                name: row.try_get("account_type_name")?,
            },
            username: row.try_get("username")?,
        })
    }
}

#[async_trait]
impl AccountStorage for AccountRepository {
    async fn store_account_type(&self, name: &str) -> Result<AccountType> {
        let id = sqlx::query("INSERT INTO account_types (name) VALUES (?)")
            .bind(name)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();

        Ok(AccountType {
            id,
            name: name.to_string(),
        })
    }

    async fn get_account_type(&self, account_type_id: i64) -> Result<Option<AccountType>> {
        let row = sqlx::query("SELECT id, name FROM account_types WHERE id = ?")
            .bind(account_type_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::account_type_from_row).transpose()
    }

    async fn find_account_type_by_name(&self, name: &str) -> Result<Option<AccountType>> {
        let row = sqlx::query("SELECT id, name FROM account_types WHERE name = ? COLLATE NOCASE")
            .bind(name)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::account_type_from_row).transpose()
    }

    async fn list_account_types(&self) -> Result<Vec<AccountType>> {
        let rows = sqlx::query("SELECT id, name FROM account_types ORDER BY name ASC")
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::account_type_from_row).collect()
    }

    async fn create_account(&self, account: &NewAccount) -> Result<i64> {
        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;

        let individual_id = sqlx::query(
            "INSERT INTO individuals (first_name, last_name, email) VALUES (?, ?, ?)",
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let user_id = sqlx::query(
            "INSERT INTO users (individual_id, account_type_id, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(individual_id)
        .bind(account.account_type_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("INSERT INTO credentials (user_id, username, password_hash) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(&account.username)
            .bind(&account.password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user_id)
    }

    async fn get_user_account(&self, user_id: i64) -> Result<Option<UserAccount>> {
        let row = sqlx::query(
            r#"
            SELECT u.id AS user_id, u.individual_id, u.account_type_id, u.created_at, u.updated_at,
                   i.first_name, i.last_name, i.email,
                   t.name AS account_type_name,
                   c.username
            FROM users u
            JOIN individuals i ON i.id = u.individual_id
            JOIN account_types t ON t.id = u.account_type_id
            JOIN credentials c ON c.user_id = u.id
            WHERE u.id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::user_account_from_row).transpose()
    }

    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>> {
        let row = sqlx::query(
            "SELECT id, user_id, username, password_hash FROM credentials WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::credentials_from_row).transpose()
    }

    async fn get_credentials_for_user(&self, user_id: i64) -> Result<Option<Credentials>> {
        let row = sqlx::query(
            "SELECT id, user_id, username, password_hash FROM credentials WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::credentials_from_row).transpose()
    }

    async fn update_password_hash(&self, credentials_id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE credentials SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(credentials_id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }
}
