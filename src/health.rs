use anyhow::Context;
use async_trait::async_trait;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::models::{HealthSyncSettings, Meal};

/// Health-record sink. The contract is the call itself: a meal's nutrition
/// goes out, success or failure comes back. What the receiving side does
/// with it (HealthKit bridge, warehouse, nothing) is not our concern.
#[async_trait]
pub trait HealthSink: Send + Sync {
    async fn export_meal(&self, meal: &Meal) -> anyhow::Result<()>;
}

/// Forwards meal nutrition to a configured webhook.
pub struct WebhookHealthSink {
    http: reqwest::Client,
    url: String,
}

impl WebhookHealthSink {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl HealthSink for WebhookHealthSink {
    async fn export_meal(&self, meal: &Meal) -> anyhow::Result<()> {
        let payload = serde_json::json!({
            "logged_at": meal.logged_at.format(&Rfc3339)?,
            "calories": meal.total_calories,
            "protein": meal.total_protein,
            "carbs": meal.total_carbs,
            "fat": meal.total_fat,
        });
        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .context("health export request")?;
        anyhow::ensure!(
            response.status().is_success(),
            "health export returned {}",
            response.status()
        );
        Ok(())
    }
}

/// Sink used when no export target is configured.
pub struct DisabledHealthSink;

#[async_trait]
impl HealthSink for DisabledHealthSink {
    async fn export_meal(&self, _meal: &Meal) -> anyhow::Result<()> {
        anyhow::bail!("health export is not configured")
    }
}

/// Sync-error bookkeeping applied after every export attempt: success resets
/// the error counter, failure increments it, both stamp the attempt time.
pub fn record_sync_attempt(health: &mut HealthSyncSettings, success: bool, now: OffsetDateTime) {
    health.last_sync_attempt = Some(now);
    if success {
        health.sync_errors = 0;
    } else {
        health.sync_errors += 1;
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn failure_increments_and_success_resets() {
        let mut health = HealthSyncSettings::default();

        record_sync_attempt(&mut health, false, datetime!(2024-01-01 08:00 UTC));
        record_sync_attempt(&mut health, false, datetime!(2024-01-01 12:00 UTC));
        assert_eq!(health.sync_errors, 2);
        assert_eq!(
            health.last_sync_attempt,
            Some(datetime!(2024-01-01 12:00 UTC))
        );

        record_sync_attempt(&mut health, true, datetime!(2024-01-01 19:00 UTC));
        assert_eq!(health.sync_errors, 0);
        assert_eq!(
            health.last_sync_attempt,
            Some(datetime!(2024-01-01 19:00 UTC))
        );
    }

    #[tokio::test]
    async fn disabled_sink_always_fails() {
        let sink = DisabledHealthSink;
        let meal = crate::tracker::testutil::meal_at(datetime!(2024-01-01 08:00 UTC), 500.0, Some(70));
        assert!(sink.export_meal(&meal).await.is_err());
    }
}
