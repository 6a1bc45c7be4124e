use anyhow::Context;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Insert a photo that is not yet attached to a meal. Analysis stores the
/// photo first; the meal links it at confirmation time.
pub async fn insert_unlinked(db: &PgPool, photo_id: Uuid, s3_key: &str) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO photos (id, meal_id, s3_key, status)
        VALUES ($1, NULL, $2, 'uploaded')
        "#,
    )
    .bind(photo_id)
    .bind(s3_key)
    .execute(db)
    .await
    .context("insert photo")?;

    Ok(())
}

/// Attach a previously uploaded photo to a meal. Returns false when the
/// photo id is unknown or already linked elsewhere.
pub async fn link_to_meal_tx(
    tx: &mut Transaction<'_, Postgres>,
    photo_id: Uuid,
    meal_id: Uuid,
) -> anyhow::Result<bool> {
    let result = tx
        .execute(
            sqlx::query(
                r#"
                UPDATE photos
                   SET meal_id = $2, status = 'linked'
                 WHERE id = $1 AND meal_id IS NULL
                "#,
            )
            .bind(photo_id)
            .bind(meal_id),
        )
        .await
        .context("link photo to meal")?;

    Ok(result.rows_affected() == 1)
}

/// All photo keys for a meal, oldest first.
pub async fn list_by_meal(db: &PgPool, meal_id: Uuid) -> anyhow::Result<Vec<(Uuid, String)>> {
    let rows: Vec<(Uuid, String)> = sqlx::query_as(
        r#"
        SELECT id, s3_key
          FROM photos
         WHERE meal_id = $1
         ORDER BY created_at ASC
        "#,
    )
    .bind(meal_id)
    .fetch_all(db)
    .await
    .context("list photos by meal")?;

    Ok(rows)
}

/// The first photo of a meal, if any.
pub async fn first_by_meal(db: &PgPool, meal_id: Uuid) -> anyhow::Result<Option<(Uuid, String)>> {
    let row = sqlx::query_as::<_, (Uuid, String)>(
        r#"
        SELECT id, s3_key
          FROM photos
         WHERE meal_id = $1
         ORDER BY created_at ASC
         LIMIT 1
        "#,
    )
    .bind(meal_id)
    .fetch_optional(db)
    .await
    .context("get first photo by meal")?;

    Ok(row)
}

/// Remove a meal's photo rows, returning the orphaned object keys so the
/// caller can clean up storage after the transaction commits.
pub async fn delete_by_meal_tx(
    tx: &mut Transaction<'_, Postgres>,
    meal_id: Uuid,
) -> anyhow::Result<Vec<String>> {
    let keys: Vec<(String,)> = sqlx::query_as(
        r#"
        DELETE FROM photos
         WHERE meal_id = $1
        RETURNING s3_key
        "#,
    )
    .bind(meal_id)
    .fetch_all(&mut **tx)
    .await
    .context("delete photos by meal")?;

    Ok(keys.into_iter().map(|(k,)| k).collect())
}
