use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::onboarding::units::UnitSystem;

/// Profile fields read straight from the onboarding answers, plus BMI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileBasics {
    pub name: String,
    pub age: i32,
    pub current_height: String,
    pub current_weight: String,
    pub desired_height: String,
    pub desired_weight: String,
    pub favorite_foods: Vec<String>,
    pub self_assessed_health: String,
    pub personal_touch_preference: bool,
    pub bmi: f64,
    pub preferred_unit: UnitSystem,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthInsights {
    pub health_risks: Vec<String>,
    pub dietary_recommendations: Vec<String>,
    pub predicted_calorie_needs: String,
}

pub const RISKS_FALLBACK: &str = "Unable to assess health risks due to an error.";
pub const DIET_FALLBACK: &str = "Unable to provide dietary recommendations due to an error.";
pub const CALORIES_FALLBACK: &str = "Unable to predict calorie needs due to an error.";

impl HealthInsights {
    pub fn fallback() -> Self {
        Self {
            health_risks: vec![RISKS_FALLBACK.to_string()],
            dietary_recommendations: vec![DIET_FALLBACK.to_string()],
            predicted_calorie_needs: CALORIES_FALLBACK.to_string(),
        }
    }
}

/// Shape returned by the generator for [`crate::genai::ContentKind::HealthInsights`].
#[derive(Debug, Deserialize)]
pub struct GeneratedInsights {
    pub health_risks: Vec<String>,
    pub dietary_recommendations: Vec<String>,
    pub predicted_calorie_needs: i64,
}

impl From<GeneratedInsights> for HealthInsights {
    fn from(g: GeneratedInsights) -> Self {
        Self {
            health_risks: g.health_risks,
            dietary_recommendations: g.dietary_recommendations,
            predicted_calorie_needs: format!("{} kcal/day", g.predicted_calorie_needs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub basics: ProfileBasics,
    #[serde(flatten)]
    pub insights: HealthInsights,
    pub updated_at: OffsetDateTime,
}
