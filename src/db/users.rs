//! User repository: accounts, login keys and the contact book.

use sqlx::PgPool;

use super::RepositoryError;
use crate::domain::aggregates::{ContactAddress, ContactPhone, User, UserType};
use crate::domain::value_objects::{Email, UserId};

const USER_COLUMNS: &str = "u.id, u.email, u.first_name, u.second_name, u.last_name, u.company, u.position, \
                            u.user_type, u.discount_factor, u.is_active, u.is_staff, u.created_at";

/// Fields of a new account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub first_name: String,
    pub second_name: Option<String>,
    pub last_name: String,
    pub company: Option<String>,
    pub position: Option<String>,
    pub user_type: UserType,
    pub is_active: bool,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    #[tracing::instrument(skip(self, new), fields(email = %new.email))]
    pub async fn create(&self, new: &NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users AS u (email, password_hash, first_name, second_name, last_name, company, position, user_type, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(new.email.as_str())
            .bind(&new.password_hash)
            .bind(&new.first_name)
            .bind(&new.second_name)
            .bind(&new.last_name)
            .bind(&new.company)
            .bind(&new.position)
            .bind(new.user_type.as_str())
            .bind(new.is_active)
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_insert(e, "email"))
    }

    /// Get a user together with their password hash.
    pub async fn get_credentials(&self, email: &Email) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1");
        let Some(user) = sqlx::query_as::<_, User>(&sql).bind(email.as_str()).fetch_optional(self.pool).await? else {
            return Ok(None);
        };
        let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
            .bind(user.id)
            .fetch_one(self.pool)
            .await?;
        Ok(Some((user, hash)))
    }

    /// Resolve a login key to its user.
    pub async fn get_by_token(&self, key: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth_tokens t JOIN users u ON u.id = t.user_id WHERE t.key = $1");
        Ok(sqlx::query_as::<_, User>(&sql).bind(key).fetch_optional(self.pool).await?)
    }

    /// Returns the user's login key, storing `candidate` if none exists yet.
    #[tracing::instrument(skip(self, candidate))]
    pub async fn issue_token(&self, user_id: UserId, candidate: &str) -> Result<String, RepositoryError> {
        let key = sqlx::query_scalar(
            "INSERT INTO auth_tokens (key, user_id) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id RETURNING key",
        )
        .bind(candidate)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(key)
    }

    pub async fn store_confirm_token(&self, user_id: UserId, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO email_confirm_tokens (key, user_id) VALUES ($1, $2)")
            .bind(key)
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Activate the account matching `email` if `key` was issued to it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pair does not match.
    #[tracing::instrument(skip(self, key), fields(email = %email))]
    pub async fn confirm_email(&self, email: &Email, key: &str) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let user_id: Option<UserId> = sqlx::query_scalar(
            "DELETE FROM email_confirm_tokens t USING users u \
             WHERE t.user_id = u.id AND t.key = $1 AND u.email = $2 RETURNING u.id",
        )
        .bind(key)
        .bind(email.as_str())
        .fetch_optional(&mut *tx)
        .await?;
        let user_id = user_id.ok_or(RepositoryError::NotFound)?;
        sqlx::query("UPDATE users SET is_active = TRUE WHERE id = $1").bind(user_id).execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_phones(&self, user_id: UserId) -> Result<Vec<ContactPhone>, RepositoryError> {
        Ok(sqlx::query_as::<_, ContactPhone>("SELECT id, value FROM contact_phones WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(self.pool)
            .await?)
    }

    pub async fn list_addresses(&self, user_id: UserId) -> Result<Vec<ContactAddress>, RepositoryError> {
        Ok(sqlx::query_as::<_, ContactAddress>(
            "SELECT id, city, street, house, structure, building, apartment FROM contact_addresses WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?)
    }
}
