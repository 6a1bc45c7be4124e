mod openai;

pub use openai::OpenAiVision;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DailyGoals, FoodItem};

/// Failure taxonomy for the vision collaborator. Every variant renders a
/// distinct, user-actionable message; the engine never sees any of this.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Invalid API key. Please check your OpenAI API key in Settings.")]
    InvalidApiKey,
    #[error("Rate limit exceeded. Please try again in a moment.")]
    RateLimited,
    #[error("OpenAI service temporarily unavailable. Please try again.")]
    Unavailable,
    #[error("OpenAI API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Could not read the meal analysis: {0}")]
    MalformedResponse(String),
    #[error("request to OpenAI failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Identify food items on a photographed meal. The caller supplies the
    /// user's stored API key and current goals (the prompt references them).
    async fn analyze_meal_photo(
        &self,
        image_b64: &str,
        content_type: &str,
        api_key: &str,
        goals: &DailyGoals,
    ) -> Result<Vec<FoodItem>, VisionError>;

    /// Cheap probe used before an API key is persisted.
    async fn validate_api_key(&self, api_key: &str) -> Result<bool, VisionError>;
}
