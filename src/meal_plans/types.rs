use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::plan::types::MacroTargets;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodImage {
    pub food_name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedMeal {
    pub name: String,
    pub ingredients: Vec<String>,
    pub preparation: String,
    pub nutrition: MacroTargets,
    #[serde(default)]
    pub images: Vec<FoodImage>,
}

/// Generated content of one day's meal plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub meals: Vec<PlannedMeal>,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMealPlan {
    pub date: Date,
    pub stage_number: i32,
    #[serde(flatten)]
    pub plan: MealPlan,
    pub created_at: OffsetDateTime,
}
