use uuid::Uuid;

use super::types::{NewMeal, TrackedMeal};
use crate::{error::AppError, state::AppState};

pub const MEAL_NOT_FOUND: &str = "Meal tracking not found or you don't have permission";

pub fn validate_meal(meal: &NewMeal) -> Result<(), AppError> {
    if meal.name.trim().is_empty() {
        return Err(AppError::validation("name", "must not be blank"));
    }
    for (field, v) in [
        ("calories", meal.calories),
        ("protein", meal.protein),
        ("carbs", meal.carbs),
        ("fats", meal.fats),
    ] {
        if !v.is_finite() || v < 0.0 {
            return Err(AppError::validation(field, "must be a non-negative number"));
        }
    }
    Ok(())
}

/// Records a meal and adds it to that day's totals.
pub async fn track_meal(st: &AppState, user_id: Uuid, meal: NewMeal) -> Result<TrackedMeal, AppError> {
    validate_meal(&meal)?;
    Ok(st.tracking.record_meal(user_id, &meal).await?)
}

/// Removes a meal and subtracts it from that day's totals.
pub async fn untrack_meal(st: &AppState, user_id: Uuid, id: Uuid) -> Result<TrackedMeal, AppError> {
    st.tracking
        .remove_meal(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(MEAL_NOT_FOUND.into()))
}
