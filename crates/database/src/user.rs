//! Region owner operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::User;
use crate::validation::validate_email;

/// Find a user by email, creating one if none exists.
pub async fn find_or_create_user(pool: &SqlitePool, email: &str) -> Result<User> {
    validate_email(email)?;
    let email = email.trim();

    sqlx::query(
        r#"
        INSERT INTO users (email)
        VALUES (?)
        ON CONFLICT(email) DO NOTHING
        "#,
    )
    .bind(email)
    .execute(pool)
    .await?;

    get_user_by_email(pool, email).await
}

/// Get a user by email.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, created_at
        FROM users
        WHERE email = ?
        "#,
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: email.to_string(),
    })
}

/// List all users.
pub async fn list_users(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, created_at
        FROM users
        ORDER BY email
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Delete a user and, through the foreign key, their regions.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "User",
            id: id.to_string(),
        });
    }

    Ok(())
}
