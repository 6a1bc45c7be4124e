use anyhow::Context;
use sqlx::{Executor, PgPool, Postgres, Transaction};

use crate::models::UserSettings;

use super::reconcile::{reconcile, PartialSettings};

/// Load the single settings row, reconciled with defaults.
pub async fn load(db: &PgPool) -> anyhow::Result<UserSettings> {
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT data FROM settings WHERE id = TRUE")
            .fetch_optional(db)
            .await
            .context("load settings")?;
    Ok(merge(row.map(|r| r.0)))
}

/// Load with a row lock. Every flow that writes streak or achievement state
/// goes through this so concurrent saves serialize on the settings row.
pub async fn load_for_update(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<UserSettings> {
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT data FROM settings WHERE id = TRUE FOR UPDATE")
            .fetch_optional(&mut **tx)
            .await
            .context("load settings for update")?;
    Ok(merge(row.map(|r| r.0)))
}

fn merge(stored: Option<serde_json::Value>) -> UserSettings {
    let partial = stored
        .and_then(|data| serde_json::from_value::<PartialSettings>(data).ok())
        .unwrap_or_default();
    reconcile(partial, UserSettings::default())
}

pub async fn save_tx(
    tx: &mut Transaction<'_, Postgres>,
    settings: &UserSettings,
) -> anyhow::Result<()> {
    let data = serde_json::to_value(settings).context("serialize settings")?;
    tx.execute(
        sqlx::query(
            r#"
            INSERT INTO settings (id, data, updated_at)
            VALUES (TRUE, $1, now())
            ON CONFLICT (id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()
            "#,
        )
        .bind(data),
    )
    .await
    .context("save settings")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_tolerates_missing_row_and_garbage() {
        let from_nothing = merge(None);
        assert_eq!(from_nothing.achievements.len(), 6);

        // A blob the current schema cannot read falls back to defaults
        // rather than failing the request.
        let from_garbage = merge(Some(serde_json::json!([1, 2, 3])));
        assert_eq!(from_garbage.daily_goals.calories, 2000.0);
    }
}
