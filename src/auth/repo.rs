use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

/// Account row. Never serialized directly; the public shape is
/// `dto::PublicUser`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub theme: String,
    pub language: String,
    pub unit_system: String,
    pub currency: String,
    pub photo: Option<String>,
    pub first_login: bool,
    pub must_change_credentials: bool,
    pub email_verified: bool,
    pub email_verification_token: Option<String>,
    pub email_verification_sent_at: Option<OffsetDateTime>,
    pub two_factor_enabled: bool,
    pub two_factor_secret: Option<String>,
    pub backup_codes: Option<String>,
    pub created_at: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
}

impl User {
    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(db)
            .await?;
        Ok(user)
    }

    pub async fn find_by_verification_token(
        db: &SqlitePool,
        token: &str,
    ) -> anyhow::Result<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email_verification_token = ?")
                .bind(token)
                .fetch_optional(db)
                .await?;
        Ok(user)
    }

    pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await?;
        Ok(row.0)
    }

    /// Insert a new account with default preferences, returning its id.
    pub async fn create(
        db: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
        email_verified: bool,
    ) -> Result<i64, sqlx::Error> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, is_admin, email_verified, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(is_admin)
        .bind(email_verified)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn touch_last_login(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(OffsetDateTime::now_utc())
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_password_hash(db: &SqlitePool, id: i64, hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = ?, first_login = 0 WHERE id = ?")
            .bind(hash)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Store a pending two-factor secret plus hashed backup codes. Not yet
    /// enabled until the account confirms a code.
    pub async fn store_two_factor_setup(
        db: &SqlitePool,
        id: i64,
        secret: &str,
        backup_code_hashes: &str,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET two_factor_secret = ?, backup_codes = ? WHERE id = ?")
            .bind(secret)
            .bind(backup_code_hashes)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn enable_two_factor(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET two_factor_enabled = 1 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Clear enabled flag, secret, and all backup codes irreversibly.
    pub async fn disable_two_factor(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET two_factor_enabled = 0, two_factor_secret = NULL, backup_codes = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Compare-and-swap the backup-code list. Returns false when the stored
    /// value changed underneath us (e.g. a concurrent request consumed the
    /// same code first), in which case exactly one of the requests wins.
    pub async fn swap_backup_codes(
        db: &SqlitePool,
        id: i64,
        expected: &str,
        replacement: &str,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET backup_codes = ? WHERE id = ? AND backup_codes = ?")
            .bind(replacement)
            .bind(id)
            .bind(expected)
            .execute(db)
            .await?;
        Ok(res.rows_affected() == 1)
    }

    /// First-login credential swap: username, email, and password replaced in
    /// one write, clearing the first-login flags.
    pub async fn update_credentials(
        db: &SqlitePool,
        id: i64,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, password_hash = ?,
                must_change_credentials = 0, first_login = 0
            WHERE id = ?
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Store a fresh verification token, overwriting any prior unconsumed one.
    pub async fn set_verification_token(
        db: &SqlitePool,
        id: i64,
        token: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET email_verified = 0, email_verification_token = ?, email_verification_sent_at = ?
            WHERE id = ?
            "#,
        )
        .bind(token)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Mark verified and clear the token; tokens are single use.
    pub async fn mark_email_verified(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE users SET email_verified = 1, email_verification_token = NULL WHERE id = ?",
        )
        .bind(id)
        .execute(db)
        .await?;
        Ok(())
    }
}
