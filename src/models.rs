use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::tracker::DayKey;

/// One food item as identified by the vision service. Field names follow the
/// vision response contract (camelCase on the wire).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    /// Assigned server-side after analysis; absent in the raw vision response.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub unit: String,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub health_score: i32,
    pub health_breakdown: HealthBreakdown,
    pub health_reason: String,
    pub encouragement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBreakdown {
    pub nutrient_density: i32,
    pub processing_level: i32,
    pub goal_alignment: i32,
}

/// A confirmed meal. Immutable after insert except `synced_to_health`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub items: Json<Vec<FoodItem>>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    /// Rounded mean of item health scores; nullable to tolerate legacy rows.
    pub health_score: Option<i32>,
    pub synced_to_health: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyGoals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for DailyGoals {
    fn default() -> Self {
        Self {
            calories: 2000.0,
            protein: 150.0,
            carbs: 200.0,
            fat: 65.0,
        }
    }
}

/// Nutrition sums for one calendar day. Derived on demand, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DayTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub meals: u32,
    /// 0 exactly when `meals` is 0, otherwise the rounded arithmetic mean.
    pub avg_health_score: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreakData {
    pub current_streak: u32,
    /// Never decreases; raised to `current_streak` on every meal save.
    pub longest_streak: u32,
    pub last_logged: Option<DayKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub threshold: u32,
    pub emoji: String,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub unlocked_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSyncSettings {
    pub enabled: bool,
    pub permission_granted: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_sync_attempt: Option<OffsetDateTime>,
    pub sync_errors: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub openai_api_key: Option<String>,
    pub daily_goals: DailyGoals,
    pub streak: StreakData,
    pub achievements: Vec<Achievement>,
    pub health: HealthSyncSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            daily_goals: DailyGoals::default(),
            streak: StreakData::default(),
            achievements: default_achievements(),
            health: HealthSyncSettings::default(),
        }
    }
}

/// The fixed milestone catalog.
pub fn default_achievements() -> Vec<Achievement> {
    fn locked(id: &str, name: &str, description: &str, threshold: u32, emoji: &str) -> Achievement {
        Achievement {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            threshold,
            emoji: emoji.into(),
            unlocked: false,
            unlocked_at: None,
        }
    }
    vec![
        locked("week_warrior", "Week Warrior", "One full week of consistency", 7, "🔥"),
        locked("habit_builder", "Habit Builder", "Three weeks of tracking", 21, "⭐"),
        locked("streak_master", "Streak Master", "Five weeks strong", 35, "💪"),
        locked("dedication", "Dedication", "50 days of commitment", 50, "🏆"),
        locked("century_club", "Century Club", "100 days milestone", 100, "💎"),
        locked("year_champion", "Year Champion", "Full year of tracking", 365, "👑"),
    ]
}

/// Presentation bucket for a 0-100 health score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthRating {
    Nutritious,
    Good,
    Fair,
    Limited,
}

impl HealthRating {
    pub fn for_score(score: i32) -> Self {
        if score >= 90 {
            Self::Nutritious
        } else if score >= 70 {
            Self::Good
        } else if score >= 50 {
            Self::Fair
        } else {
            Self::Limited
        }
    }
}
