use std::collections::BTreeSet;

use serde::Serialize;

use crate::models::{Meal, StreakData};

use super::DayKey;

/// Result of a streak recomputation over the full meal history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub last_logged: Option<DayKey>,
}

/// Current consecutive-day logging streak as of `today`.
///
/// The streak is alive only if the most recent logged day is today or
/// yesterday. When it is broken the count resets to 0 but `last_logged`
/// still reports the stale day.
pub fn streak_for(meals: &[Meal], today: DayKey) -> StreakSummary {
    let days: BTreeSet<DayKey> = meals.iter().map(|m| DayKey::of(m.logged_at)).collect();
    let Some(&last_logged) = days.iter().next_back() else {
        return StreakSummary {
            current_streak: 0,
            last_logged: None,
        };
    };

    if last_logged != today && Some(last_logged) != today.previous() {
        return StreakSummary {
            current_streak: 0,
            last_logged: Some(last_logged),
        };
    }

    // Walk backward from the last logged day; the first gap halts the walk.
    let mut current_streak = 0;
    let mut expected = Some(last_logged);
    while let Some(day) = expected {
        if !days.contains(&day) {
            break;
        }
        current_streak += 1;
        expected = day.previous();
    }

    StreakSummary {
        current_streak,
        last_logged: Some(last_logged),
    }
}

impl StreakData {
    /// Adopt a freshly computed summary. `longest_streak` only ever rises.
    pub fn record(&mut self, summary: &StreakSummary) {
        self.current_streak = summary.current_streak;
        self.last_logged = summary.last_logged;
        self.longest_streak = self.longest_streak.max(summary.current_streak);
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::OffsetDateTime;

    use crate::tracker::testutil::meal_at;

    use super::*;

    fn meal_on(day: &str) -> Meal {
        let ts = OffsetDateTime::parse(
            &format!("{day}T12:00:00Z"),
            &time::format_description::well_known::Rfc3339,
        )
        .unwrap();
        meal_at(ts, 500.0, Some(75))
    }

    fn day(s: &str) -> DayKey {
        s.parse().unwrap()
    }

    #[test]
    fn empty_history_has_no_streak_and_no_last_day() {
        let summary = streak_for(&[], day("2024-01-03"));
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.last_logged, None);
    }

    #[test]
    fn one_meal_today_is_a_streak_of_one() {
        let meals = vec![meal_on("2024-01-03")];
        let summary = streak_for(&meals, day("2024-01-03"));
        assert_eq!(summary.current_streak, 1);
        assert_eq!(summary.last_logged, Some(day("2024-01-03")));
    }

    #[test]
    fn last_meal_yesterday_keeps_the_streak_alive() {
        // Days 01 and 02 logged, nothing today (the 03rd).
        let meals = vec![meal_on("2024-01-01"), meal_on("2024-01-02")];
        let summary = streak_for(&meals, day("2024-01-03"));
        assert_eq!(summary.current_streak, 2);
        assert_eq!(summary.last_logged, Some(day("2024-01-02")));
    }

    #[test]
    fn gap_behind_today_stops_the_walk() {
        // Logged on the 01st and 03rd; the missing 02nd halts the count at 1.
        let meals = vec![meal_on("2024-01-01"), meal_on("2024-01-03")];
        let summary = streak_for(&meals, day("2024-01-03"));
        assert_eq!(summary.current_streak, 1);
        assert_eq!(summary.last_logged, Some(day("2024-01-03")));
    }

    #[test]
    fn stale_history_reports_zero_but_keeps_last_logged() {
        // Last meal five days before "today".
        let meals = vec![meal_on("2024-01-04"), meal_on("2024-01-05")];
        let summary = streak_for(&meals, day("2024-01-10"));
        assert_eq!(summary.current_streak, 0);
        assert_eq!(summary.last_logged, Some(day("2024-01-05")));
    }

    #[test]
    fn several_meals_on_one_day_count_once() {
        let meals = vec![
            meal_on("2024-01-02"),
            meal_at(datetime!(2024-01-02 19:30 UTC), 800.0, Some(60)),
            meal_on("2024-01-03"),
        ];
        let summary = streak_for(&meals, day("2024-01-03"));
        assert_eq!(summary.current_streak, 2);
    }

    #[test]
    fn streak_crosses_month_boundaries() {
        let meals = vec![
            meal_on("2024-02-28"),
            meal_on("2024-02-29"),
            meal_on("2024-03-01"),
        ];
        let summary = streak_for(&meals, day("2024-03-01"));
        assert_eq!(summary.current_streak, 3);
    }

    #[test]
    fn unsorted_input_is_fine() {
        let meals = vec![
            meal_on("2024-01-03"),
            meal_on("2024-01-01"),
            meal_on("2024-01-02"),
        ];
        let summary = streak_for(&meals, day("2024-01-03"));
        assert_eq!(summary.current_streak, 3);
        assert_eq!(summary.last_logged, Some(day("2024-01-03")));
    }

    #[test]
    fn longest_streak_tracks_the_running_maximum() {
        let mut streak = StreakData::default();
        let observed = [3, 5, 2, 0, 4];
        let mut running_max = 0;
        for current in observed {
            streak.record(&StreakSummary {
                current_streak: current,
                last_logged: Some(day("2024-01-01")),
            });
            running_max = running_max.max(current);
            assert_eq!(streak.current_streak, current);
            assert_eq!(streak.longest_streak, running_max);
            assert!(streak.longest_streak >= streak.current_streak);
        }
    }

    #[test]
    fn record_keeps_stale_last_logged_on_reset() {
        let mut streak = StreakData {
            current_streak: 6,
            longest_streak: 6,
            last_logged: Some(day("2024-01-06")),
        };
        streak.record(&StreakSummary {
            current_streak: 0,
            last_logged: Some(day("2024-01-06")),
        });
        assert_eq!(streak.current_streak, 0);
        assert_eq!(streak.longest_streak, 6);
        assert_eq!(streak.last_logged, Some(day("2024-01-06")));
    }
}
