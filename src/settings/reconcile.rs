use serde::Deserialize;

use crate::models::{Achievement, DailyGoals, HealthSyncSettings, StreakData, UserSettings};

/// Settings as found in storage. Blobs written by older app versions may be
/// missing whole sections, so every field is optional here and the nested
/// structs carry per-field serde defaults of their own.
#[derive(Debug, Default, Deserialize)]
pub struct PartialSettings {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub daily_goals: Option<DailyGoals>,
    #[serde(default)]
    pub streak: Option<StreakData>,
    #[serde(default)]
    pub achievements: Option<Vec<Achievement>>,
    #[serde(default)]
    pub health: Option<HealthSyncSettings>,
}

/// Merge stored settings over defaults, section by section. Total and pure:
/// any partial blob reconciles to a complete `UserSettings`. A stored
/// achievements list is adopted wholesale; an absent one falls back to the
/// default catalog.
pub fn reconcile(stored: PartialSettings, defaults: UserSettings) -> UserSettings {
    UserSettings {
        openai_api_key: stored.openai_api_key.or(defaults.openai_api_key),
        daily_goals: stored.daily_goals.unwrap_or(defaults.daily_goals),
        streak: stored.streak.unwrap_or(defaults.streak),
        achievements: stored.achievements.unwrap_or(defaults.achievements),
        health: stored.health.unwrap_or(defaults.health),
    }
}
