//! Structured content generation.
//!
//! The generator is an opaque collaborator: a prompt plus an output shape
//! (optionally an image) goes in, JSON matching that shape comes out.

pub mod gemini;
pub mod schema;

use axum::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

pub use gemini::GeminiClient;

/// Every kind of content the service asks the generator for. Each kind maps
/// to one fixed output shape (see [`schema::shape`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Condition,
    Fitness,
    Medicine,
    Onboarding,
    Mindfulness,
    Symptoms,
    Title,
    Mood,
    FitnessLanding,
    MindfulnessLanding,
    NutritionLanding,
    HealthInsights,
    NutritionPlan,
    DailyMealPlan,
    FoodIdentity,
    FoodIngredients,
    FoodRecipe,
}

impl ContentKind {
    #[cfg(test)]
    pub const ALL: [ContentKind; 17] = [
        ContentKind::Condition,
        ContentKind::Fitness,
        ContentKind::Medicine,
        ContentKind::Onboarding,
        ContentKind::Mindfulness,
        ContentKind::Symptoms,
        ContentKind::Title,
        ContentKind::Mood,
        ContentKind::FitnessLanding,
        ContentKind::MindfulnessLanding,
        ContentKind::NutritionLanding,
        ContentKind::HealthInsights,
        ContentKind::NutritionPlan,
        ContentKind::DailyMealPlan,
        ContentKind::FoodIdentity,
        ContentKind::FoodIngredients,
        ContentKind::FoodRecipe,
    ];

    /// Kinds clients may request by name through `/generate-content`.
    pub fn from_schema_name(name: &str) -> Option<Self> {
        match name {
            "condition" => Some(ContentKind::Condition),
            "fitness" => Some(ContentKind::Fitness),
            "medicine" => Some(ContentKind::Medicine),
            "onboarding" => Some(ContentKind::Onboarding),
            "mindfulness" => Some(ContentKind::Mindfulness),
            "symptoms" => Some(ContentKind::Symptoms),
            "title" => Some(ContentKind::Title),
            "mood" => Some(ContentKind::Mood),
            _ => None,
        }
    }

    /// Kinds selectable by the image inference keyword.
    pub fn from_image_keyword(keyword: &str) -> Option<Self> {
        match keyword.trim() {
            "foodid" => Some(ContentKind::FoodIdentity),
            "foodingredients" => Some(ContentKind::FoodIngredients),
            "foodrecipe" => Some(ContentKind::FoodRecipe),
            _ => None,
        }
    }

    /// Fixed instruction sent alongside an image.
    pub fn image_prompt(self) -> Option<&'static str> {
        match self {
            ContentKind::FoodIdentity => Some("What is this food name?"),
            ContentKind::FoodIngredients => Some("What ingredients make up this food?"),
            ContentKind::FoodRecipe => {
                Some("Give me a proper step by step recipe on cooking this meal.")
            }
            _ => None,
        }
    }

    pub fn uses_vision(self) -> bool {
        self.image_prompt().is_some()
    }
}

/// Inline image attached to a generation request.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: &'static str,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: ContentKind,
    pub prompt: String,
    pub image: Option<InlineImage>,
}

impl GenerationRequest {
    pub fn text(kind: ContentKind, prompt: impl Into<String>) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(kind: ContentKind, prompt: impl Into<String>, image: InlineImage) -> Self {
        Self {
            kind,
            prompt: prompt.into(),
            image: Some(image),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generator returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generator returned no content")]
    Empty,

    #[error("generator output did not match the expected shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<GenerationError> for AppError {
    fn from(e: GenerationError) -> Self {
        AppError::upstream("genai", e)
    }
}

pub type PartialStream = BoxStream<'static, Result<String, GenerationError>>;

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// One-shot generation; the result is parsed JSON.
    async fn generate(&self, request: GenerationRequest) -> Result<Value, GenerationError>;

    /// Incremental generation; yields raw text fragments as they arrive.
    async fn generate_stream(
        &self,
        request: GenerationRequest,
    ) -> Result<PartialStream, GenerationError>;
}

/// Generate and decode into a typed shape.
pub async fn generate_as<T: DeserializeOwned>(
    generator: &dyn ContentGenerator,
    request: GenerationRequest,
) -> Result<T, GenerationError> {
    let value = generator.generate(request).await?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_names_cover_public_kinds_only() {
        assert_eq!(
            ContentKind::from_schema_name("fitness"),
            Some(ContentKind::Fitness)
        );
        assert_eq!(ContentKind::from_schema_name("mood"), Some(ContentKind::Mood));
        assert_eq!(ContentKind::from_schema_name("nutrition_plan"), None);
        assert_eq!(ContentKind::from_schema_name(""), None);
    }

    #[test]
    fn image_keywords() {
        assert_eq!(
            ContentKind::from_image_keyword("foodid"),
            Some(ContentKind::FoodIdentity)
        );
        assert_eq!(
            ContentKind::from_image_keyword(" foodrecipe "),
            Some(ContentKind::FoodRecipe)
        );
        assert_eq!(ContentKind::from_image_keyword("calories"), None);
        assert!(ContentKind::FoodIngredients.uses_vision());
        assert!(!ContentKind::NutritionPlan.uses_vision());
    }
}
