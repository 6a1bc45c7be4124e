use axum::{extract::State, http::StatusCode, Json};
use tracing::{error, instrument};

use crate::models::DailyGoals;
use crate::state::AppState;
use crate::vision::VisionError;

use super::dto::{PutApiKeyRequest, PutHealthRequest, SettingsView};
use super::repo;

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsView>, (StatusCode, String)> {
    let settings = repo::load(&state.db).await.map_err(internal)?;
    Ok(Json(settings.into()))
}

#[instrument(skip(state))]
pub async fn put_goals(
    State(state): State<AppState>,
    Json(goals): Json<DailyGoals>,
) -> Result<Json<DailyGoals>, (StatusCode, String)> {
    if goals.calories <= 0.0 || goals.protein <= 0.0 || goals.carbs <= 0.0 || goals.fat <= 0.0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "daily goals must all be positive".into(),
        ));
    }

    let mut tx = state.db.begin().await.map_err(db_internal)?;
    let mut settings = repo::load_for_update(&mut tx).await.map_err(internal)?;
    settings.daily_goals = goals;
    repo::save_tx(&mut tx, &settings).await.map_err(internal)?;
    tx.commit().await.map_err(db_internal)?;

    Ok(Json(goals))
}

#[instrument(skip(state, body))]
pub async fn put_api_key(
    State(state): State<AppState>,
    Json(body): Json<PutApiKeyRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let key = body.api_key.trim().to_string();
    if key.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "api_key must not be empty".into()));
    }

    // Probe the vision service before persisting anything.
    match state.vision.validate_api_key(&key).await {
        Ok(true) => {}
        Ok(false) | Err(VisionError::InvalidApiKey) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "API key was rejected by OpenAI. Double-check the key and try again.".into(),
            ));
        }
        Err(e) => {
            error!(error = %e, "api key validation failed");
            return Err((StatusCode::BAD_GATEWAY, e.to_string()));
        }
    }

    let mut tx = state.db.begin().await.map_err(db_internal)?;
    let mut settings = repo::load_for_update(&mut tx).await.map_err(internal)?;
    settings.openai_api_key = Some(key);
    repo::save_tx(&mut tx, &settings).await.map_err(internal)?;
    tx.commit().await.map_err(db_internal)?;

    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn put_health(
    State(state): State<AppState>,
    Json(body): Json<PutHealthRequest>,
) -> Result<Json<SettingsView>, (StatusCode, String)> {
    let mut tx = state.db.begin().await.map_err(db_internal)?;
    let mut settings = repo::load_for_update(&mut tx).await.map_err(internal)?;
    settings.health.enabled = body.enabled;
    if let Some(granted) = body.permission_granted {
        settings.health.permission_granted = granted;
    }
    repo::save_tx(&mut tx, &settings).await.map_err(internal)?;
    tx.commit().await.map_err(db_internal)?;

    Ok(Json(settings.into()))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "settings request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn db_internal(e: sqlx::Error) -> (StatusCode, String) {
    internal(anyhow::Error::new(e))
}
