use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{Achievement, DayTotals};
use crate::tracker::DayKey;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    #[serde(default)]
    pub date: Option<DayKey>,
}

#[derive(Debug, Serialize)]
pub struct DayMeal {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub calories: f64,
    pub health_score: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct DayProgress {
    pub date: DayKey,
    pub totals: DayTotals,
    pub goal_met: bool,
    pub meals: Vec<DayMeal>,
}

#[derive(Debug, Serialize)]
pub struct WeekDay {
    pub date: DayKey,
    pub totals: DayTotals,
    pub goal_met: bool,
}

#[derive(Debug, Serialize)]
pub struct StreakView {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_logged: Option<DayKey>,
    pub achievements: Vec<Achievement>,
}
