use serde::{Deserialize, Serialize};

use crate::models::{Achievement, DailyGoals, HealthSyncSettings, StreakData, UserSettings};

#[derive(Debug, Serialize)]
pub struct SettingsView {
    /// The key itself is never echoed back.
    pub api_key_set: bool,
    pub daily_goals: DailyGoals,
    pub streak: StreakData,
    pub achievements: Vec<Achievement>,
    pub health: HealthSyncSettings,
}

impl From<UserSettings> for SettingsView {
    fn from(s: UserSettings) -> Self {
        Self {
            api_key_set: s.openai_api_key.is_some(),
            daily_goals: s.daily_goals,
            streak: s.streak,
            achievements: s.achievements,
            health: s.health,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PutApiKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct PutHealthRequest {
    pub enabled: bool,
    #[serde(default)]
    pub permission_granted: Option<bool>,
}
