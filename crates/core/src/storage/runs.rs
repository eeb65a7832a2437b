use crate::domain::recommendation::RecommendationRun;
use anyhow::Context;
use uuid::Uuid;

/// Records one computed recommendation list with its ranked items.
pub async fn persist_run(
    pool: &sqlx::PgPool,
    session_id: Uuid,
    run: &RecommendationRun,
) -> anyhow::Result<Uuid> {
    let run_id = Uuid::new_v4();
    let mut tx = pool.begin().await.context("begin transaction failed")?;

    sqlx::query(
        "INSERT INTO recommendation_runs (id, session_id, kind, generated_at, item_count) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .persistent(false)
    .bind(run_id)
    .bind(session_id)
    .bind(run.kind.as_str())
    .bind(run.generated_at)
    .bind(run.items.len() as i32)
    .execute(&mut *tx)
    .await
    .context("insert recommendation_runs failed")?;

    if !run.items.is_empty() {
        let mut rows = Vec::with_capacity(run.items.len());
        for (idx, item) in run.items.iter().enumerate() {
            let details = serde_json::to_value(&item.stock).context("serialize stock details failed")?;
            rows.push((idx as i32 + 1, item, details));
        }

        let mut qb = sqlx::QueryBuilder::new(
            "INSERT INTO recommendation_run_items (run_id, rank, symbol, name, score, details) ",
        );
        qb.push_values(rows, |mut b, (rank, item, details)| {
            b.push_bind(run_id)
                .push_bind(rank)
                .push_bind(item.stock.symbol.clone())
                .push_bind(item.stock.name.clone())
                .push_bind(item.score)
                .push_bind(details);
        });
        qb.build()
            .persistent(false)
            .execute(&mut *tx)
            .await
            .context("insert recommendation_run_items failed")?;
    }

    tx.commit().await.context("commit transaction failed")?;
    tracing::debug!(%run_id, kind = run.kind.as_str(), items = run.items.len(), "recommendation run recorded");
    Ok(run_id)
}
