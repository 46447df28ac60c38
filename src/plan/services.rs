use tracing::{info, instrument};
use uuid::Uuid;

use super::types::{NutritionPlan, StoredPlan};
use crate::{
    config::PlanConfig,
    error::AppError,
    genai::{generate_as, ContentKind, GenerationRequest},
    profile::Profile,
    state::AppState,
};

pub fn plan_prompt(profile: &Profile, cfg: &PlanConfig) -> String {
    let b = &profile.basics;
    let i = &profile.insights;
    let stages = cfg.stages.max(1);
    let stage_weeks = cfg.total_weeks / stages;
    format!(
        "You are a nutrition and health expert. Based on the following user profile, create a \
         detailed strategic nutrition plan to help the user achieve their desired weight and \
         improve their health. The plan should be divided into {stages} stages, with each stage \
         lasting approximately {stage_weeks} weeks, for a total of {total} weeks. Give a common \
         daily macro goal (calories in kcal, proteins, carbs and fat in grams) within each stage. \
         My measurements are in the {unit} system; return results in the same system. For \
         expected outcomes mention the range of weight gain, maintenance or loss. Give at least \
         5 comprehensive points for every list.\n\n\
         User Profile:\n\
         - Name: {name}\n\
         - Age: {age}\n\
         - Current Height: {height}\n\
         - Current Weight: {weight}\n\
         - Desired Weight: {desired}\n\
         - BMI: {bmi}\n\
         - Favorite Foods: {foods}\n\
         - Self-Assessed Health: {health}\n\
         - Personal Touch Preference: {touch}\n\
         - Health Risks: {risks}\n\
         - Dietary Recommendations: {diet}\n\
         - Predicted Calorie Needs: {calories}\n",
        total = cfg.total_weeks,
        unit = b.preferred_unit.as_str(),
        name = b.name,
        age = b.age,
        height = b.current_height,
        weight = b.current_weight,
        desired = b.desired_weight,
        bmi = b.bmi,
        foods = b.favorite_foods.join(", "),
        health = b.self_assessed_health,
        touch = if b.personal_touch_preference { "Yes" } else { "No" },
        risks = i.health_risks.join("; "),
        diet = i.dietary_recommendations.join("; "),
        calories = i.predicted_calorie_needs,
    )
}

/// Returns the stored plan, generating and storing one first if needed.
/// The flag is `true` when this call created it.
#[instrument(skip(st))]
pub async fn get_or_create_plan(st: &AppState, user_id: Uuid) -> Result<(StoredPlan, bool), AppError> {
    if let Some(existing) = st.plans.get(user_id).await? {
        return Ok((existing, false));
    }

    let profile = st.profiles.get(user_id).await?.ok_or_else(|| {
        AppError::NotFound(
            "User profile not found. Please complete the onboarding process first.".into(),
        )
    })?;

    let req = GenerationRequest::text(ContentKind::NutritionPlan, plan_prompt(&profile, &st.config.plan));
    let plan: NutritionPlan = generate_as(st.generator.as_ref(), req).await?;

    let created = st.plans.insert_if_absent(user_id, &plan).await?;
    let stored = st
        .plans
        .get(user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("nutrition plan missing after insert"))?;
    info!(user_id = %user_id, created, stages = stored.plan.plan_stages.len(), "nutrition plan ready");
    Ok((stored, created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, profiled_user, sample_plan};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn generates_once_then_returns_stored_copy() {
        let h = testing::harness();
        let user = profiled_user(&h).await;
        h.generator
            .respond(ContentKind::NutritionPlan, serde_json::to_value(sample_plan()).unwrap());

        let (first, created) = get_or_create_plan(&h.state, user).await.unwrap();
        assert!(created);
        let (second, created_again) = get_or_create_plan(&h.state, user).await.unwrap();
        assert!(!created_again);
        assert_eq!(first, second);
        assert_eq!(h.generator.calls(ContentKind::NutritionPlan), 1);
    }

    #[tokio::test]
    async fn requires_a_profile() {
        let h = testing::harness();
        let err = get_or_create_plan(&h.state, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(h.generator.calls(ContentKind::NutritionPlan), 0);
    }

    #[tokio::test]
    async fn generator_failure_is_upstream_and_stores_nothing() {
        let h = testing::harness();
        let user = profiled_user(&h).await;
        h.generator.fail(ContentKind::NutritionPlan);

        let err = get_or_create_plan(&h.state, user).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(h.state.plans.get(user).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_plan_is_upstream() {
        let h = testing::harness();
        let user = profiled_user(&h).await;
        h.generator
            .respond(ContentKind::NutritionPlan, json!({ "plan_stages": "three" }));
        let err = get_or_create_plan(&h.state, user).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn prompt_mentions_stage_split_and_units() {
        let h = testing::harness();
        let user = profiled_user(&h).await;
        let profile = h.state.profiles.get(user).await.unwrap().unwrap();
        let prompt = plan_prompt(&profile, &PlanConfig { total_weeks: 12, stages: 3 });
        assert!(prompt.contains("divided into 3 stages"));
        assert!(prompt.contains("approximately 4 weeks"));
        assert!(prompt.contains("imperial system"));
    }
}
