use crate::domain::preferences::InvestmentPreferences;
use anyhow::Context;
use uuid::Uuid;

pub async fn save_profile(
    pool: &sqlx::PgPool,
    session_id: Uuid,
    prefs: &InvestmentPreferences,
) -> anyhow::Result<()> {
    let preferences = serde_json::to_value(prefs).context("serialize preferences failed")?;
    sqlx::query(
        "INSERT INTO investment_profiles (session_id, preferences, updated_at) \
         VALUES ($1, $2, now()) \
         ON CONFLICT (session_id) DO UPDATE \
           SET preferences = EXCLUDED.preferences, updated_at = EXCLUDED.updated_at",
    )
    .persistent(false)
    .bind(session_id)
    .bind(preferences)
    .execute(pool)
    .await
    .context("upsert investment_profiles failed")?;
    Ok(())
}

pub async fn load_profile(
    pool: &sqlx::PgPool,
    session_id: Uuid,
) -> anyhow::Result<Option<InvestmentPreferences>> {
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT preferences FROM investment_profiles WHERE session_id = $1")
            .persistent(false)
            .bind(session_id)
            .fetch_optional(pool)
            .await
            .context("select investment_profiles failed")?;

    row.map(|(value,)| {
        serde_json::from_value(value).context("stored preferences do not deserialize")
    })
    .transpose()
}
