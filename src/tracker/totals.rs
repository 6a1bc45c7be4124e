use crate::models::{DailyGoals, DayTotals, FoodItem, Meal};

use super::DayKey;

/// Meals whose day key matches `day`, in input order.
pub fn meals_for_day<'a>(meals: &'a [Meal], day: DayKey) -> Vec<&'a Meal> {
    meals
        .iter()
        .filter(|m| DayKey::of(m.logged_at) == day)
        .collect()
}

/// Nutrition sums for one calendar day. Empty subset yields all zeros.
pub fn totals_for_day(meals: &[Meal], day: DayKey) -> DayTotals {
    let day_meals = meals_for_day(meals, day);
    let mut totals = DayTotals {
        meals: day_meals.len() as u32,
        ..DayTotals::default()
    };
    let mut score_sum: i64 = 0;
    for meal in &day_meals {
        totals.calories += meal.total_calories;
        totals.protein += meal.total_protein;
        totals.carbs += meal.total_carbs;
        totals.fat += meal.total_fat;
        // A missing score contributes 0 but the meal still counts.
        score_sum += i64::from(meal.health_score.unwrap_or(0));
    }
    if totals.meals > 0 {
        totals.avg_health_score = (score_sum as f64 / f64::from(totals.meals)).round() as i32;
    }
    totals
}

/// The daily goal is met when calories land within ±10% of the target,
/// inclusive. Protein/carbs/fat are displayed but never gate this.
pub fn goal_met(totals: &DayTotals, goals: &DailyGoals) -> bool {
    totals.calories >= goals.calories * 0.9 && totals.calories <= goals.calories * 1.1
}

/// Rounded mean of item health scores; 0 for an empty list (never NaN).
pub fn meal_health_score(items: &[FoodItem]) -> i32 {
    if items.is_empty() {
        return 0;
    }
    let sum: i64 = items.iter().map(|i| i64::from(i.health_score)).sum();
    (sum as f64 / items.len() as f64).round() as i32
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::tracker::testutil::{item, meal_at};

    use super::*;

    #[test]
    fn counts_only_meals_on_the_target_day() {
        let meals = vec![
            meal_at(datetime!(2024-01-01 08:00 UTC), 400.0, Some(80)),
            meal_at(datetime!(2024-01-01 19:00 UTC), 600.0, Some(60)),
            meal_at(datetime!(2024-01-02 12:00 UTC), 500.0, Some(90)),
        ];
        let day: DayKey = "2024-01-01".parse().unwrap();
        let totals = totals_for_day(&meals, day);
        assert_eq!(totals.meals, 2);
        assert_eq!(totals.calories, 1000.0);
        assert_eq!(meals_for_day(&meals, day).len(), 2);
        // Input list untouched.
        assert_eq!(meals.len(), 3);
    }

    #[test]
    fn empty_day_is_all_zeros() {
        let meals = vec![meal_at(datetime!(2024-01-01 08:00 UTC), 400.0, Some(80))];
        let totals = totals_for_day(&meals, "2024-05-05".parse().unwrap());
        assert_eq!(totals, DayTotals::default());
        assert_eq!(totals.avg_health_score, 0);
    }

    #[test]
    fn empty_meal_list_is_all_zeros() {
        let totals = totals_for_day(&[], "2024-01-01".parse().unwrap());
        assert_eq!(totals.meals, 0);
        assert_eq!(totals.calories, 0.0);
        assert_eq!(totals.avg_health_score, 0);
    }

    #[test]
    fn average_health_score_is_rounded_mean() {
        let meals = vec![
            meal_at(datetime!(2024-01-01 08:00 UTC), 100.0, Some(80)),
            meal_at(datetime!(2024-01-01 12:00 UTC), 100.0, Some(85)),
        ];
        let totals = totals_for_day(&meals, "2024-01-01".parse().unwrap());
        // (80 + 85) / 2 = 82.5, rounds to 83.
        assert_eq!(totals.avg_health_score, 83);
    }

    #[test]
    fn missing_health_score_counts_as_zero_but_meal_still_counts() {
        let meals = vec![
            meal_at(datetime!(2024-01-01 08:00 UTC), 100.0, Some(90)),
            meal_at(datetime!(2024-01-01 12:00 UTC), 100.0, None),
        ];
        let totals = totals_for_day(&meals, "2024-01-01".parse().unwrap());
        assert_eq!(totals.meals, 2);
        assert_eq!(totals.avg_health_score, 45);
    }

    #[test]
    fn goal_band_is_inclusive_on_both_edges() {
        let goals = DailyGoals {
            calories: 2000.0,
            ..DailyGoals::default()
        };
        let at = |calories: f64| DayTotals {
            calories,
            ..DayTotals::default()
        };
        assert!(goal_met(&at(1800.0), &goals));
        assert!(goal_met(&at(2000.0), &goals));
        assert!(goal_met(&at(2200.0), &goals));
        assert!(!goal_met(&at(1799.0), &goals));
        assert!(!goal_met(&at(2201.0), &goals));
    }

    #[test]
    fn goal_ignores_macros_other_than_calories() {
        let goals = DailyGoals::default();
        let totals = DayTotals {
            calories: 2000.0,
            protein: 900.0,
            carbs: 1200.0,
            fat: 400.0,
            meals: 5,
            avg_health_score: 10,
        };
        assert!(goal_met(&totals, &goals));
    }

    #[test]
    fn meal_health_score_guards_empty_items() {
        assert_eq!(meal_health_score(&[]), 0);
    }

    #[test]
    fn meal_health_score_rounds_mean() {
        let items = vec![
            item(100.0, 10.0, 10.0, 5.0, 70),
            item(100.0, 10.0, 10.0, 5.0, 75),
            item(100.0, 10.0, 10.0, 5.0, 75),
        ];
        // (70 + 75 + 75) / 3 = 73.33, rounds to 73.
        assert_eq!(meal_health_score(&items), 73);
    }
}
