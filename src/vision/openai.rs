use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::VisionConfig;
use crate::models::{DailyGoals, FoodItem};

use super::{VisionClient, VisionError};

/// Vision analysis against the OpenAI chat-completions API.
pub struct OpenAiVision {
    http: reqwest::Client,
    config: VisionConfig,
}

impl OpenAiVision {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl VisionClient for OpenAiVision {
    #[instrument(skip(self, image_b64, api_key))]
    async fn analyze_meal_photo(
        &self,
        image_b64: &str,
        content_type: &str,
        api_key: &str,
        goals: &DailyGoals,
    ) -> Result<Vec<FoodItem>, VisionError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": build_prompt(goals) },
                    { "type": "image_url", "image_url": {
                        "url": format!("data:{};base64,{}", content_type, image_b64)
                    }},
                ],
            }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 => VisionError::InvalidApiKey,
                429 => VisionError::RateLimited,
                s if s >= 500 => VisionError::Unavailable,
                s => VisionError::Api {
                    status: s,
                    message: response.text().await.unwrap_or_default(),
                },
            });
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| VisionError::MalformedResponse(e.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VisionError::MalformedResponse("no completion content".into()))?;

        let items = parse_items(&content)?;
        debug!(items = items.len(), "meal photo analyzed");
        Ok(items)
    }

    async fn validate_api_key(&self, api_key: &str) -> Result<bool, VisionError> {
        let response = self
            .http
            .get(format!("{}/models", self.config.api_url))
            .bearer_auth(api_key)
            .send()
            .await?;
        Ok(response.status().is_success())
    }
}

/// Parse the completion content as a food item array, tolerating markdown
/// fences around the JSON, and assign server-side item ids.
fn parse_items(content: &str) -> Result<Vec<FoodItem>, VisionError> {
    let json = strip_fences(content);
    let mut items: Vec<FoodItem> =
        serde_json::from_str(&json).map_err(|e| VisionError::MalformedResponse(e.to_string()))?;
    for item in &mut items {
        item.id = Uuid::new_v4().to_string();
    }
    Ok(items)
}

fn strip_fences(content: &str) -> String {
    content
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn build_prompt(goals: &DailyGoals) -> String {
    format!(
        r#"Analyze this meal photo and return a JSON array of food items. For each item, provide:
- name: descriptive name of the food
- amount: estimated portion size as a number
- unit: unit of measurement (oz, cup, g, piece, etc.)
- calories: estimated calories
- protein: grams of protein
- carbs: grams of carbohydrates
- fat: grams of fat
- healthScore: score from 0-100 based on three factors (see breakdown below)
- healthBreakdown: object with three scores (0-100 each):
  - nutrientDensity: vitamins, minerals, fiber content
  - processingLevel: whole foods (high) vs processed foods (low)
  - goalAlignment: how well it fits user's goals ({calories} cal, {protein}g protein, {carbs}g carbs, {fat}g fat)
- healthReason: brief technical explanation of the scores (1 sentence)
- encouragement: personalized, positive feedback highlighting benefits and gently noting areas for improvement if any (1-2 sentences)

Calculate healthScore as: (nutrientDensity * 0.33) + (processingLevel * 0.33) + (goalAlignment * 0.34)

Return ONLY valid JSON array, no markdown or extra text."#,
        calories = goals.calories,
        protein = goals.protein,
        carbs = goals.carbs,
        fat = goals.fat,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_ITEMS: &str = r#"[{
        "name": "Protein shake",
        "amount": 1,
        "unit": "cup",
        "calories": 220,
        "protein": 25,
        "carbs": 12,
        "fat": 4,
        "healthScore": 72,
        "healthBreakdown": {"nutrientDensity": 60, "processingLevel": 55, "goalAlignment": 98},
        "healthReason": "High protein but highly processed.",
        "encouragement": "Excellent for muscle recovery with 25g protein."
    }]"#;

    #[test]
    fn strips_markdown_fences() {
        let fenced = format!("```json\n{SAMPLE_ITEMS}\n```");
        assert_eq!(strip_fences(&fenced), SAMPLE_ITEMS.trim());

        let bare_fence = format!("```\n{SAMPLE_ITEMS}\n```");
        assert_eq!(strip_fences(&bare_fence), SAMPLE_ITEMS.trim());

        assert_eq!(strip_fences(SAMPLE_ITEMS), SAMPLE_ITEMS.trim());
    }

    #[test]
    fn parses_items_and_assigns_ids() {
        let items = parse_items(&format!("```json\n{SAMPLE_ITEMS}\n```")).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Protein shake");
        assert_eq!(items[0].health_score, 72);
        assert!(!items[0].id.is_empty());
    }

    #[test]
    fn non_json_content_is_a_malformed_response() {
        let err = parse_items("I see a sandwich and some fries.").unwrap_err();
        assert!(matches!(err, VisionError::MalformedResponse(_)));
    }

    #[test]
    fn prompt_carries_the_user_goals() {
        let prompt = build_prompt(&DailyGoals::default());
        assert!(prompt.contains("2000 cal"));
        assert!(prompt.contains("150g protein"));
        assert!(prompt.contains("200g carbs"));
        assert!(prompt.contains("65g fat"));
        assert!(prompt.contains("ONLY valid JSON array"));
    }
}
