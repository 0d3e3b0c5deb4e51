use sqlx::SqlitePool;

pub async fn set_language(db: &SqlitePool, user_id: i64, language: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET language = ? WHERE id = ?")
        .bind(language)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_units(
    db: &SqlitePool,
    user_id: i64,
    unit_system: &str,
    currency: Option<&str>,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET unit_system = ?, currency = COALESCE(?, currency) WHERE id = ?")
        .bind(unit_system)
        .bind(currency)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_theme(db: &SqlitePool, user_id: i64, theme: &str) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET theme = ? WHERE id = ?")
        .bind(theme)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

pub async fn set_profile(
    db: &SqlitePool,
    user_id: i64,
    username: &str,
    email: &str,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET username = ?, email = ? WHERE id = ?")
        .bind(username)
        .bind(email)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}
