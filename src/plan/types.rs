use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

/// One stage of a nutrition plan. Field names follow the generator's
/// output shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStage {
    #[serde(rename = "Stage_number")]
    pub stage_number: i32,
    #[serde(rename = "Stage_name")]
    pub stage_name: String,
    #[serde(rename = "Stage_description")]
    pub stage_description: String,
    #[serde(rename = "Stage_time_period")]
    pub stage_time_period: String,
    #[serde(rename = "Expected_outcomes")]
    pub expected_outcomes: Vec<String>,
    #[serde(rename = "What_to_do")]
    pub what_to_do: Vec<String>,
    #[serde(rename = "What_to_expect")]
    pub what_to_expect: Vec<String>,
    #[serde(rename = "Suggested_foods")]
    pub suggested_foods: Vec<String>,
    #[serde(rename = "Suggested_activity_level")]
    pub suggested_activity_level: String,
    #[serde(rename = "Suggested_activities")]
    pub suggested_activities: Vec<String>,
    #[serde(rename = "Suggested_avoid_foods")]
    pub suggested_avoid_foods: Vec<String>,
    #[serde(rename = "Suggested_avoid_activities")]
    pub suggested_avoid_activities: Vec<String>,
    #[serde(rename = "Tips_and_tricks")]
    pub tips_and_tricks: Vec<String>,
    #[serde(rename = "Daily_calorie_goal")]
    pub daily_calorie_goal: f64,
    #[serde(rename = "Macronutrient_targets")]
    pub macronutrient_targets: MacroTargets,
    #[serde(rename = "Hydration_goal")]
    pub hydration_goal: String,
    #[serde(rename = "Meal_frequency")]
    pub meal_frequency: String,
    #[serde(rename = "Sleep_recommendation")]
    pub sleep_recommendation: String,
    #[serde(rename = "Stress_management_techniques")]
    pub stress_management_techniques: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPlan {
    pub total_time_period_weeks: i32,
    pub plan_stages: Vec<PlanStage>,
    pub user_height: String,
    pub user_current_weight: String,
    pub user_desired_weight: String,
    pub user_bmi: f64,
    pub user_favorite_foods: Vec<String>,
    pub user_self_assessed_health: String,
    pub user_health_risks: Vec<String>,
    pub user_dietary_recommendations: Vec<String>,
    pub user_predicted_calorie_needs: String,
    pub plan_goals: Vec<String>,
    pub potential_challenges: Vec<String>,
    pub motivational_tips: Vec<String>,
    pub recommended_nutrients: Vec<String>,
    pub suggested_supplements: Vec<String>,
    pub monitoring_metrics: Vec<String>,
    pub success_indicators: Vec<String>,
    pub weekly_check_in_goals: Vec<String>,
    pub social_support_recommendations: Vec<String>,
    pub long_term_maintenance_strategies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPlan {
    #[serde(flatten)]
    pub plan: NutritionPlan,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}
