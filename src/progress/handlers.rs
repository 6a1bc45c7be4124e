use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::{error, instrument};

use crate::meals::repo as meals_repo;
use crate::settings;
use crate::state::AppState;
use crate::tracker::{goal_met, meals_for_day, streak_for, totals_for_day, DayKey};

use super::dto::{DayMeal, DayProgress, DayQuery, StreakView, WeekDay};

/// GET /progress/day?date=YYYY-MM-DD — defaults to today.
#[instrument(skip(state))]
pub async fn day(
    State(state): State<AppState>,
    Query(q): Query<DayQuery>,
) -> Result<Json<DayProgress>, (StatusCode, String)> {
    let date = q.date.unwrap_or_else(DayKey::today);
    let history = meals_repo::list_all(&state.db).await.map_err(internal)?;
    let user_settings = settings::repo::load(&state.db).await.map_err(internal)?;

    let totals = totals_for_day(&history, date);
    let meals = meals_for_day(&history, date)
        .into_iter()
        .map(|m| DayMeal {
            id: m.id,
            logged_at: m.logged_at,
            calories: m.total_calories,
            health_score: m.health_score,
        })
        .collect();

    Ok(Json(DayProgress {
        date,
        goal_met: goal_met(&totals, &user_settings.daily_goals),
        totals,
        meals,
    }))
}

/// GET /progress/week — the 7-day strip ending today, ascending.
#[instrument(skip(state))]
pub async fn week(
    State(state): State<AppState>,
) -> Result<Json<Vec<WeekDay>>, (StatusCode, String)> {
    let history = meals_repo::list_all(&state.db).await.map_err(internal)?;
    let user_settings = settings::repo::load(&state.db).await.map_err(internal)?;

    let strip = DayKey::window_ending(DayKey::today(), 7)
        .into_iter()
        .map(|date| {
            let totals = totals_for_day(&history, date);
            WeekDay {
                date,
                goal_met: goal_met(&totals, &user_settings.daily_goals),
                totals,
            }
        })
        .collect();

    Ok(Json(strip))
}

/// GET /progress/streak — the streak is recomputed from history for display
/// (a stored value can go stale overnight); longest streak and the
/// achievement catalog come from settings.
#[instrument(skip(state))]
pub async fn streak(
    State(state): State<AppState>,
) -> Result<Json<StreakView>, (StatusCode, String)> {
    let history = meals_repo::list_all(&state.db).await.map_err(internal)?;
    let user_settings = settings::repo::load(&state.db).await.map_err(internal)?;

    let summary = streak_for(&history, DayKey::today());
    Ok(Json(StreakView {
        current_streak: summary.current_streak,
        longest_streak: user_settings.streak.longest_streak,
        last_logged: summary.last_logged,
        achievements: user_settings.achievements,
    }))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    error!(error = %e, "progress request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
