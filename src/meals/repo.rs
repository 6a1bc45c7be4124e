use anyhow::Context;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::Meal;

const MEAL_COLUMNS: &str = "id, logged_at, items, total_calories, total_protein, \
                            total_carbs, total_fat, health_score, synced_to_health";

pub async fn insert_tx(tx: &mut Transaction<'_, Postgres>, meal: &Meal) -> anyhow::Result<()> {
    tx.execute(
        sqlx::query(
            r#"
            INSERT INTO meals (id, logged_at, items, total_calories, total_protein,
                               total_carbs, total_fat, health_score, synced_to_health)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(meal.id)
        .bind(meal.logged_at)
        .bind(&meal.items)
        .bind(meal.total_calories)
        .bind(meal.total_protein)
        .bind(meal.total_carbs)
        .bind(meal.total_fat)
        .bind(meal.health_score)
        .bind(meal.synced_to_health),
    )
    .await
    .context("insert meal")?;

    Ok(())
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Meal>> {
    let rows = sqlx::query_as::<_, Meal>(&format!(
        r#"
        SELECT {MEAL_COLUMNS}
        FROM meals
        ORDER BY logged_at DESC
        LIMIT $1 OFFSET $2
        "#,
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list meals")?;

    Ok(rows)
}

/// Full history snapshot for the aggregation and streak engine.
pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Meal>> {
    let rows = sqlx::query_as::<_, Meal>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals ORDER BY logged_at DESC",
    ))
    .fetch_all(db)
    .await
    .context("list all meals")?;

    Ok(rows)
}

/// Same snapshot, taken inside the meal-save transaction so the streak is
/// computed over a history that already includes the new row.
pub async fn list_all_tx(tx: &mut Transaction<'_, Postgres>) -> anyhow::Result<Vec<Meal>> {
    let rows = sqlx::query_as::<_, Meal>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals ORDER BY logged_at DESC",
    ))
    .fetch_all(&mut **tx)
    .await
    .context("list all meals in tx")?;

    Ok(rows)
}

pub async fn get(db: &PgPool, meal_id: Uuid) -> anyhow::Result<Option<Meal>> {
    let meal = sqlx::query_as::<_, Meal>(&format!(
        "SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1",
    ))
    .bind(meal_id)
    .fetch_optional(db)
    .await
    .context("get meal")?;

    Ok(meal)
}

/// Returns false when the meal did not exist.
pub async fn delete_tx(tx: &mut Transaction<'_, Postgres>, meal_id: Uuid) -> anyhow::Result<bool> {
    let result = tx
        .execute(sqlx::query("DELETE FROM meals WHERE id = $1").bind(meal_id))
        .await
        .context("delete meal")?;

    Ok(result.rows_affected() == 1)
}
