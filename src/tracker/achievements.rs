use time::OffsetDateTime;

use crate::models::Achievement;

/// Flip every locked achievement whose threshold the streak has reached.
///
/// The catalog is walked in the order given (no sortedness assumed) and all
/// newly qualifying entries are unlocked and stamped with `now`. The returned
/// list preserves that order; by convention the first entry is the one the
/// client celebrates, but persistence covers them all.
pub fn unlock_achievements(
    current_streak: u32,
    achievements: &mut [Achievement],
    now: OffsetDateTime,
) -> Vec<Achievement> {
    let mut newly_unlocked = Vec::new();
    for achievement in achievements.iter_mut() {
        if !achievement.unlocked && current_streak >= achievement.threshold {
            achievement.unlocked = true;
            achievement.unlocked_at = Some(now);
            newly_unlocked.push(achievement.clone());
        }
    }
    newly_unlocked
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::models::default_achievements;

    use super::*;

    #[test]
    fn streak_jump_unlocks_every_crossed_threshold() {
        let mut catalog = default_achievements();
        let now = datetime!(2024-02-01 09:00 UTC);

        let unlocked = unlock_achievements(21, &mut catalog, now);

        let ids: Vec<&str> = unlocked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["week_warrior", "habit_builder"]);
        // First in catalog order is the one to celebrate.
        assert_eq!(unlocked[0].id, "week_warrior");
        assert!(unlocked.iter().all(|a| a.unlocked_at == Some(now)));
        // The catalog itself was mutated, not just the returned copies.
        assert!(catalog.iter().filter(|a| a.unlocked).count() == 2);
        assert!(catalog.iter().filter(|a| !a.unlocked).all(|a| a.threshold > 21));
    }

    #[test]
    fn reevaluation_with_unchanged_streak_unlocks_nothing() {
        let mut catalog = default_achievements();
        let first = unlock_achievements(7, &mut catalog, datetime!(2024-02-01 09:00 UTC));
        assert_eq!(first.len(), 1);

        let second = unlock_achievements(7, &mut catalog, datetime!(2024-02-01 10:00 UTC));
        assert!(second.is_empty());
        // The original unlock timestamp is untouched.
        assert_eq!(
            catalog[0].unlocked_at,
            Some(datetime!(2024-02-01 09:00 UTC))
        );
    }

    #[test]
    fn streak_below_every_threshold_unlocks_nothing() {
        let mut catalog = default_achievements();
        assert!(unlock_achievements(6, &mut catalog, datetime!(2024-02-01 09:00 UTC)).is_empty());
        assert!(catalog.iter().all(|a| !a.unlocked));
    }

    #[test]
    fn catalog_order_is_respected_even_when_unsorted() {
        let mut catalog = default_achievements();
        catalog.reverse();
        let unlocked = unlock_achievements(35, &mut catalog, datetime!(2024-02-01 09:00 UTC));
        // Reversed catalog: 35 before 21 before 7.
        let ids: Vec<&str> = unlocked.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["streak_master", "habit_builder", "week_warrior"]);
    }

    #[test]
    fn already_unlocked_entries_never_revert() {
        let mut catalog = default_achievements();
        unlock_achievements(7, &mut catalog, datetime!(2024-02-01 09:00 UTC));
        // Streak later drops to zero; the unlock must stay.
        let unlocked = unlock_achievements(0, &mut catalog, datetime!(2024-03-01 09:00 UTC));
        assert!(unlocked.is_empty());
        assert!(catalog[0].unlocked);
    }
}
