use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::errors::Result;
use domains::models::{NewUser, Page, PageRequest, ProfileChanges, PublicUser, User, UserId};
use domains::ports::UserRepository;

use super::{db_error, PgStore};

macro_rules! select_users {
    ($tail:literal) => {
        concat!(
            "SELECT id, username, email, password_hash, profile_picture, slogan, created_at FROM users ",
            $tail
        )
    };
}

const RETURNING_USER: &str =
    "RETURNING id, username, email, password_hash, profile_picture, slogan, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    profile_picture: Option<String>,
    slogan: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            profile_picture: row.profile_picture,
            slogan: row.slogan,
            created_at: row.created_at,
        }
    }
}

/// Escapes LIKE wildcards so user input only ever matches literally.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) {RETURNING_USER}"
        );
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map(User::from)
            .map_err(db_error)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(select_users!("WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(User::from))
            .map_err(db_error)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(select_users!("WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(User::from))
            .map_err(db_error)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>(select_users!("WHERE lower(username) = lower($1)"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(User::from))
            .map_err(db_error)
    }

    async fn list_users(&self, page: PageRequest) -> Result<Page<PublicUser>> {
        let rows = sqlx::query_as::<_, UserRow>(select_users!("ORDER BY id LIMIT $1 OFFSET $2"))
            .bind(i64::from(page.limit))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let users = rows.into_iter().map(|row| PublicUser::from(User::from(row))).collect();
        Ok(Page::new(users, page, total))
    }

    async fn search_users(&self, query: &str, limit: u32) -> Result<Vec<PublicUser>> {
        let rows = sqlx::query_as::<_, UserRow>(select_users!(
            "WHERE username ILIKE $1 ESCAPE '\\' ORDER BY username LIMIT $2"
        ))
        .bind(like_pattern(query))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(|row| PublicUser::from(User::from(row))).collect())
    }

    async fn update_profile(&self, id: UserId, changes: ProfileChanges) -> Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET username = COALESCE($2, username), \
             slogan = CASE WHEN $3 THEN $4 ELSE slogan END \
             WHERE id = $1 {RETURNING_USER}"
        );
        let clear_or_set = changes.slogan.is_some();
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(changes.username)
            .bind(clear_or_set)
            .bind(changes.slogan.flatten())
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(User::from))
            .map_err(db_error)
    }

    async fn set_profile_picture(&self, id: UserId, path: Option<String>) -> Result<Option<User>> {
        let sql = format!("UPDATE users SET profile_picture = $2 WHERE id = $1 {RETURNING_USER}");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(path)
            .fetch_optional(&self.pool)
            .await
            .map(|row| row.map(User::from))
            .map_err(db_error)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}
