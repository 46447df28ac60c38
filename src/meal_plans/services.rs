use time::{macros::format_description, Date};
use tracing::{info, instrument};
use uuid::Uuid;

use super::types::{DailyMealPlan, MealPlan};
use crate::{
    error::AppError,
    genai::{generate_as, ContentKind, GenerationRequest},
    plan::{PlanStage, StoredPlan},
    state::AppState,
};

pub fn parse_date(raw: Option<&str>) -> Result<Date, AppError> {
    let invalid = || AppError::validation("date", "Invalid date format. Use YYYY-MM-DD.");
    let raw = raw.ok_or_else(invalid)?;
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).map_err(|_| invalid())
}

/// The stage in force on `date`: whole weeks since the plan was created,
/// divided by the stage length, clamped to the plan's stages.
pub fn stage_for(plan: &StoredPlan, date: Date) -> Option<&PlanStage> {
    let stages = &plan.plan.plan_stages;
    if stages.is_empty() {
        return None;
    }
    let weeks = (date - plan.created_at.date()).whole_weeks().max(0);
    let stage_weeks = (i64::from(plan.plan.total_time_period_weeks) / stages.len() as i64).max(1);
    let idx = ((weeks / stage_weeks) as usize).min(stages.len() - 1);
    Some(&stages[idx])
}

pub fn meal_plan_prompt(stage: &PlanStage, favorite_foods: &[String], date: Date) -> String {
    let t = &stage.macronutrient_targets;
    format!(
        "Create a one-day meal plan for {date} that meets these daily targets: {cal} kcal, \
         {protein} g protein, {carbs} g carbs, {fats} g fat. Follow stage \"{name}\" of the \
         user's nutrition plan ({freq}). Prefer these foods: {suggested}. Work in the user's \
         favorite foods where they fit: {favorites}. Avoid: {avoid}. For every meal list the \
         ingredients, preparation steps and nutrition, and make the totals the sum of the meals.",
        cal = stage.daily_calorie_goal,
        protein = t.protein,
        carbs = t.carbs,
        fats = t.fats,
        name = stage.stage_name,
        freq = stage.meal_frequency,
        suggested = stage.suggested_foods.join(", "),
        favorites = favorite_foods.join(", "),
        avoid = stage.suggested_avoid_foods.join(", "),
    )
}

/// Returns the meal plan for `date`, generating it from the user's
/// nutrition plan if none exists. The flag is `true` when created.
#[instrument(skip(st))]
pub async fn get_or_create_meal_plan(
    st: &AppState,
    user_id: Uuid,
    date: Date,
) -> Result<(DailyMealPlan, bool), AppError> {
    if let Some(existing) = st.meal_plans.get(user_id, date).await? {
        return Ok((existing, false));
    }

    let plan = st
        .plans
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No nutrition plan found for user.".into()))?;
    let stage = stage_for(&plan, date)
        .ok_or_else(|| anyhow::anyhow!("nutrition plan has no stages"))?;

    let req = GenerationRequest::text(
        ContentKind::DailyMealPlan,
        meal_plan_prompt(stage, &plan.plan.user_favorite_foods, date),
    );
    let generated: MealPlan = generate_as(st.generator.as_ref(), req).await?;

    let created = st
        .meal_plans
        .insert_if_absent(user_id, date, stage.stage_number, &generated)
        .await?;
    let stored = st
        .meal_plans
        .get(user_id, date)
        .await?
        .ok_or_else(|| anyhow::anyhow!("meal plan missing after insert"))?;
    info!(user_id = %user_id, %date, stage = stage.stage_number, created, "daily meal plan ready");
    Ok((stored, created))
}
