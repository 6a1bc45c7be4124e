use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::{delete, get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::models::HealthRating;
use crate::settings;
use crate::state::AppState;
use crate::photos;
use crate::vision::VisionError;

use super::dto::{
    AnalyzeMealRequest, AnalyzeMealResponse, CreateMealRequest, CreateMealResponse, MealDetails,
    MealListItem, Pagination,
};
use super::{repo, services};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/:id", get(get_meal))
        .route("/meals/:id/photo", get(get_presigned_photo))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals/analyze", post(analyze_meal))
        .route("/meals", post(create_meal))
        .route("/meals/:id", delete(delete_meal))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB, photos come base64-encoded
}

/// POST /meals/analyze { image_b64, content_type? }
/// Stores the photo (unlinked) and runs vision analysis against it.
#[instrument(skip(state, body))]
pub async fn analyze_meal(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeMealRequest>,
) -> Result<Json<AnalyzeMealResponse>, (StatusCode, String)> {
    if body.image_b64.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image_b64 is required".into()));
    }

    let user_settings = settings::repo::load(&state.db).await.map_err(internal)?;
    let Some(api_key) = user_settings.openai_api_key else {
        return Err((
            StatusCode::BAD_REQUEST,
            "No OpenAI API key configured. Add your API key in Settings first.".into(),
        ));
    };

    let content_type = body.content_type.as_deref().unwrap_or("image/jpeg");
    let image = BASE64
        .decode(body.image_b64.as_bytes())
        .map_err(|_| (StatusCode::BAD_REQUEST, "invalid base64 image".into()))?;

    let photo_id = Uuid::new_v4();
    let key = services::photo_object_key(photo_id, content_type);
    state
        .storage
        .put_object(&key, Bytes::from(image), content_type)
        .await
        .map_err(internal)?;
    photos::repo::insert_unlinked(&state.db, photo_id, &key)
        .await
        .map_err(internal)?;

    let items = state
        .vision
        .analyze_meal_photo(
            &body.image_b64,
            content_type,
            &api_key,
            &user_settings.daily_goals,
        )
        .await
        .map_err(vision_error)?;

    Ok(Json(AnalyzeMealResponse { photo_id, items }))
}

/// POST /meals — confirm a reviewed meal. Response carries the updated
/// streak and any achievements this save unlocked.
#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, Json<CreateMealResponse>), (StatusCode, String)> {
    if body.items.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "items must be non-empty".into()));
    }

    let response = services::log_meal(&state, body).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<MealListItem>>, (StatusCode, String)> {
    let meals = repo::list(&state.db, p.limit, p.offset)
        .await
        .map_err(internal)?;
    Ok(Json(meals.into_iter().map(MealListItem::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MealDetails>, (StatusCode, String)> {
    let meal = repo::get(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Meal not found".to_string()))?;

    let photo_ids = photos::repo::list_by_meal(&state.db, id)
        .await
        .map_err(internal)?
        .into_iter()
        .map(|(photo_id, _)| photo_id)
        .collect();

    Ok(Json(MealDetails {
        id: meal.id,
        logged_at: meal.logged_at,
        items: meal.items.0,
        total_calories: meal.total_calories,
        total_protein: meal.total_protein,
        total_carbs: meal.total_carbs,
        total_fat: meal.total_fat,
        health_score: meal.health_score,
        health_rating: meal.health_score.map(HealthRating::for_score),
        synced_to_health: meal.synced_to_health,
        photos: photo_ids,
    }))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = services::delete_meal(&state, id).await.map_err(internal)?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Meal not found".into()))
    }
}

/// 302 to a presigned url for the meal's first photo.
#[instrument(skip(state))]
pub async fn get_presigned_photo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (_, s3_key) = photos::repo::first_by_meal(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Photo not found".to_string()))?;

    let url = state
        .storage
        .presign_get(&s3_key, 600)
        .await
        .map_err(internal)?;

    Ok(Redirect::temporary(&url))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "meal request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn vision_error(e: VisionError) -> (StatusCode, String) {
    let status = match &e {
        VisionError::InvalidApiKey => StatusCode::BAD_REQUEST,
        VisionError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        VisionError::Api { .. } => StatusCode::BAD_GATEWAY,
        VisionError::Unavailable
        | VisionError::MalformedResponse(_)
        | VisionError::Transport(_) => StatusCode::BAD_GATEWAY,
    };
    error!(error = %e, "vision analysis failed");
    (status, e.to_string())
}
