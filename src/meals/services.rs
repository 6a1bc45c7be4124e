use anyhow::Context;
use sqlx::types::Json;
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{FoodItem, Meal};
use crate::settings;
use crate::state::AppState;
use crate::tracker::{meal_health_score, streak_for, unlock_achievements, DayKey};
use crate::{health, photos};

use super::dto::{CreateMealRequest, CreateMealResponse};
use super::repo;

/// Confirm and persist a meal, then run the whole save-time chain the app
/// performs: health export (outcome recorded, never fatal), streak
/// recomputation over the full history, and achievement unlocks. Everything
/// that touches the settings row happens in one transaction with the row
/// locked, so concurrent saves cannot lose streak or unlock updates.
pub async fn log_meal(
    state: &AppState,
    req: CreateMealRequest,
) -> anyhow::Result<CreateMealResponse> {
    let now = OffsetDateTime::now_utc();

    let mut items = req.items;
    for item in &mut items {
        if item.id.is_empty() {
            item.id = Uuid::new_v4().to_string();
        }
    }

    let mut meal = Meal {
        id: Uuid::new_v4(),
        logged_at: req.logged_at.unwrap_or(now),
        total_calories: items.iter().map(|i| i.calories).sum(),
        total_protein: items.iter().map(|i| i.protein).sum(),
        total_carbs: items.iter().map(|i| i.carbs).sum(),
        total_fat: items.iter().map(|i| i.fat).sum(),
        health_score: Some(meal_health_score(&items)),
        synced_to_health: false,
        items: Json(items),
    };

    // Export before the insert so the stored row carries the outcome.
    let snapshot = settings::repo::load(&state.db).await?;
    let mut sync_outcome = None;
    if snapshot.health.enabled && snapshot.health.permission_granted {
        match state.health.export_meal(&meal).await {
            Ok(()) => {
                meal.synced_to_health = true;
                sync_outcome = Some(true);
            }
            Err(e) => {
                warn!(error = %e, meal_id = %meal.id, "health export failed");
                sync_outcome = Some(false);
            }
        }
    }

    let mut tx = state.db.begin().await.context("begin tx")?;
    let mut user_settings = settings::repo::load_for_update(&mut tx).await?;

    if let Some(success) = sync_outcome {
        health::record_sync_attempt(&mut user_settings.health, success, now);
    }

    repo::insert_tx(&mut tx, &meal).await?;
    if let Some(photo_id) = req.photo_id {
        if !photos::repo::link_to_meal_tx(&mut tx, photo_id, meal.id).await? {
            warn!(%photo_id, meal_id = %meal.id, "photo not found or already linked");
        }
    }

    let history = repo::list_all_tx(&mut tx).await?;
    let summary = streak_for(&history, DayKey::today());
    user_settings.streak.record(&summary);

    let unlocked = unlock_achievements(
        user_settings.streak.current_streak,
        &mut user_settings.achievements,
        now,
    );

    settings::repo::save_tx(&mut tx, &user_settings).await?;
    tx.commit().await.context("commit tx")?;

    debug!(
        meal_id = %meal.id,
        logged_today = DayKey::is_today(meal.logged_at),
        streak = user_settings.streak.current_streak,
        "meal saved"
    );

    let celebration = unlocked.first().cloned();
    Ok(CreateMealResponse {
        meal,
        streak: user_settings.streak,
        unlocked,
        celebration,
    })
}

/// Delete a meal and its photos. Streak history is deliberately not
/// rewritten here; the next save recomputes it from what survives.
pub async fn delete_meal(state: &AppState, meal_id: Uuid) -> anyhow::Result<bool> {
    let mut tx = state.db.begin().await.context("begin tx")?;
    let orphaned_keys = photos::repo::delete_by_meal_tx(&mut tx, meal_id).await?;
    let deleted = repo::delete_tx(&mut tx, meal_id).await?;
    tx.commit().await.context("commit tx")?;

    if deleted {
        for key in orphaned_keys {
            if let Err(e) = state.storage.delete_object(&key).await {
                warn!(error = %e, %key, "failed to delete photo object");
            }
        }
    }
    Ok(deleted)
}

pub fn photo_object_key(photo_id: Uuid, content_type: &str) -> String {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!("photos/{photo_id}.{ext}")
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}
