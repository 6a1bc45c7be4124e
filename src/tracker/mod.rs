//! Meal aggregation and streak engine.
//!
//! Pure, synchronous functions over meal snapshots: day keys, daily totals,
//! goal evaluation, streak recomputation and achievement unlocks. No I/O
//! happens here; handlers fetch the snapshot and persist the results.

mod achievements;
mod day_key;
mod streak;
mod totals;

pub use achievements::unlock_achievements;
pub use day_key::DayKey;
pub use streak::{streak_for, StreakSummary};
pub use totals::{goal_met, meal_health_score, meals_for_day, totals_for_day};

#[cfg(test)]
pub(crate) mod testutil {
    use sqlx::types::Json;
    use time::OffsetDateTime;
    use uuid::Uuid;

    use crate::models::{FoodItem, HealthBreakdown, Meal};

    pub fn item(calories: f64, protein: f64, carbs: f64, fat: f64, health_score: i32) -> FoodItem {
        FoodItem {
            id: Uuid::new_v4().to_string(),
            name: "test food".into(),
            amount: 1.0,
            unit: "piece".into(),
            calories,
            protein,
            carbs,
            fat,
            health_score,
            health_breakdown: HealthBreakdown {
                nutrient_density: health_score,
                processing_level: health_score,
                goal_alignment: health_score,
            },
            health_reason: String::new(),
            encouragement: String::new(),
        }
    }

    pub fn meal_at(logged_at: OffsetDateTime, calories: f64, health_score: Option<i32>) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            logged_at,
            items: Json(vec![item(
                calories,
                10.0,
                20.0,
                5.0,
                health_score.unwrap_or(0),
            )]),
            total_calories: calories,
            total_protein: 10.0,
            total_carbs: 20.0,
            total_fat: 5.0,
            health_score,
            synced_to_health: false,
        }
    }
}
