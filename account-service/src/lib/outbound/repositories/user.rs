use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const USERNAME_CONSTRAINT: &str = "users_username_key";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Storage representation of a `users` row.
#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    username: String,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId(row.id),
            email: EmailAddress::new(row.email)?,
            username: Username::existing(row.username)?,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, username, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, username, password_hash, created_at, updated_at
            "#,
        )
        .bind(user.email.as_str())
        .bind(user.username.as_str())
        .bind(user.password_hash.as_deref())
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    match db_err.constraint() {
                        Some(EMAIL_CONSTRAINT) => {
                            return UserError::EmailAlreadyExists(user.email.to_string())
                        }
                        Some(USERNAME_CONSTRAINT) => {
                            return UserError::UsernameAlreadyExists(user.username.to_string())
                        }
                        _ => {}
                    }
                }
            }
            UserError::DatabaseError(e.to_string())
        })?;

        row.try_into()
    }

    async fn find_by_email_or_username(
        &self,
        identifier: &str,
    ) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1 OR username = $1
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, username, password_hash, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?
        .map(User::try_from)
        .transpose()
    }

    async fn update_password_hash(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<(), UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = $3
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .bind(password_hash)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound(email.to_string()));
        }

        Ok(())
    }

    async fn delete_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        sqlx::query_as::<_, UserRow>(
            r#"
            DELETE FROM users
            WHERE email = $1
            RETURNING id, email, username, password_hash, created_at, updated_at
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?
        .map(User::try_from)
        .transpose()
    }
}
