use std::collections::HashMap;

use anyhow::Context;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::types::{GeneratedInsights, HealthInsights, Profile, ProfileBasics};
use crate::{
    genai::{generate_as, ContentKind, GenerationRequest},
    onboarding::{questions, repo::Answer, units::Measurement},
    state::AppState,
};

/// Builds the raw half of a profile from a complete answer set.
pub fn assemble(answers: &[Answer]) -> anyhow::Result<ProfileBasics> {
    let by_number: HashMap<i32, &str> = answers
        .iter()
        .map(|a| (a.question_number, a.answer.as_str()))
        .collect();
    let get = |n: i32| {
        by_number
            .get(&n)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("missing answer for question {n}"))
    };

    let age: i32 = get(questions::AGE)?.trim().parse().context("parse age")?;
    let current: Measurement =
        serde_json::from_str(get(questions::CURRENT_MEASUREMENT)?).context("parse current measurement")?;
    let desired: Measurement =
        serde_json::from_str(get(questions::DESIRED_MEASUREMENT)?).context("parse desired measurement")?;
    let favorite_foods: Vec<String> =
        serde_json::from_str(get(questions::FAVORITE_FOODS)?).context("parse favorite foods")?;
    let bmi = current.bmi().context("compute bmi")?;

    Ok(ProfileBasics {
        name: get(questions::NAME)?.trim().to_string(),
        age,
        current_height: current.height,
        current_weight: current.weight,
        desired_height: desired.height,
        desired_weight: desired.weight,
        favorite_foods,
        self_assessed_health: if get(questions::SELF_ASSESSED_HEALTH)? == "Yes" {
            "Healthy".into()
        } else {
            "Not Healthy".into()
        },
        personal_touch_preference: get(questions::PERSONAL_TOUCH)? == "Yes",
        bmi,
        preferred_unit: current.unit,
    })
}

pub fn insight_prompt(b: &ProfileBasics) -> String {
    format!(
        "You are a nutrition and health expert. Based on the following user profile, provide:\n\
         1. Potential health risks (e.g., based on BMI, age, self-assessed health).\n\
         2. Dietary recommendations (e.g., based on favorite foods, health status, and goals).\n\
         3. Predicted daily calorie needs in kcal (based on age, height, weight, and goals).\n\n\
         User Profile:\n\
         - Name: {}\n\
         - Age: {}\n\
         - Current Height: {}\n\
         - Current Weight: {}\n\
         - Desired Weight: {}\n\
         - BMI: {}\n\
         - Favorite Foods: {}\n\
         - Self-Assessed Health: {}\n\
         - Personal Touch Preference: {}\n\
         Measurements are in the {} system.",
        b.name,
        b.age,
        b.current_height,
        b.current_weight,
        b.desired_weight,
        b.bmi,
        b.favorite_foods.join(", "),
        b.self_assessed_health,
        if b.personal_touch_preference { "Yes" } else { "No" },
        b.preferred_unit.as_str(),
    )
}

/// Never fails: generator errors fall back to fixed explanatory strings.
pub async fn generate_insights(st: &AppState, basics: &ProfileBasics) -> HealthInsights {
    let req = GenerationRequest::text(ContentKind::HealthInsights, insight_prompt(basics));
    match generate_as::<GeneratedInsights>(st.generator.as_ref(), req).await {
        Ok(g) => g.into(),
        Err(e) => {
            warn!(error = %e, "health insight generation failed, storing fallback");
            HealthInsights::fallback()
        }
    }
}

/// Derives and stores the profile once every question has an answer.
/// Returns `None` while onboarding is incomplete.
pub async fn derive_if_complete(st: &AppState, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
    let answers = st.onboarding.answers(user_id).await?;
    let total = st.onboarding.question_count().await?;
    if total == 0 || (answers.len() as i64) < total {
        return Ok(None);
    }

    let basics = assemble(&answers)?;
    let insights = generate_insights(st, &basics).await;
    let profile = Profile {
        basics,
        insights,
        updated_at: OffsetDateTime::now_utc(),
    };
    st.profiles
        .upsert(user_id, &profile)
        .await
        .context("store profile")?;
    info!(user_id = %user_id, bmi = profile.basics.bmi, "profile derived");
    Ok(Some(profile))
}

/// Derives the profile only if none is stored yet.
pub async fn ensure_profile(st: &AppState, user_id: Uuid) -> anyhow::Result<()> {
    if st.profiles.get(user_id).await?.is_none() {
        derive_if_complete(st, user_id).await?;
    }
    Ok(())
}
