use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::{Achievement, FoodItem, HealthRating, Meal, StreakData};

#[derive(Debug, Deserialize)]
pub struct AnalyzeMealRequest {
    pub image_b64: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeMealResponse {
    /// The stored (not yet linked) photo; pass it back on confirmation.
    pub photo_id: Uuid,
    pub items: Vec<FoodItem>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub items: Vec<FoodItem>,
    #[serde(default)]
    pub photo_id: Option<Uuid>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub logged_at: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct CreateMealResponse {
    pub meal: Meal,
    pub streak: StreakData,
    /// Every achievement this save unlocked, in catalog order.
    pub unlocked: Vec<Achievement>,
    /// The single unlock the client celebrates: first of `unlocked`.
    pub celebration: Option<Achievement>,
}

#[derive(Debug, Serialize)]
pub struct MealListItem {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub health_score: Option<i32>,
    pub synced_to_health: bool,
}

impl From<Meal> for MealListItem {
    fn from(m: Meal) -> Self {
        Self {
            id: m.id,
            logged_at: m.logged_at,
            total_calories: m.total_calories,
            total_protein: m.total_protein,
            total_carbs: m.total_carbs,
            total_fat: m.total_fat,
            health_score: m.health_score,
            synced_to_health: m.synced_to_health,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MealDetails {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    pub items: Vec<FoodItem>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub health_score: Option<i32>,
    pub health_rating: Option<HealthRating>,
    pub synced_to_health: bool,
    pub photos: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}
