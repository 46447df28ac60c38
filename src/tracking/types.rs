use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// A meal the user reports having eaten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TrackedMeal {
    pub id: Uuid,
    pub name: String,
    pub date: Date,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub created_at: OffsetDateTime,
}

impl TrackedMeal {
    pub fn totals(&self) -> Totals {
        Totals {
            total_calories: self.calories,
            total_protein: self.protein,
            total_carbs: self.carbs,
            total_fats: self.fats,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Totals {
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
}

impl Totals {
    pub fn of(meal: &NewMeal) -> Self {
        Self {
            total_calories: meal.calories,
            total_protein: meal.protein,
            total_carbs: meal.carbs,
            total_fats: meal.fats,
        }
    }

    /// Adds (`sign = 1.0`) or removes (`sign = -1.0`) a meal's values.
    pub fn apply(self, delta: Totals, sign: f64) -> Self {
        Self {
            total_calories: self.total_calories + sign * delta.total_calories,
            total_protein: self.total_protein + sign * delta.total_protein,
            total_carbs: self.total_carbs + sign * delta.total_carbs,
            total_fats: self.total_fats + sign * delta.total_fats,
        }
    }

    /// A day with nothing left on it is dropped rather than kept at zero.
    pub fn is_depleted(&self) -> bool {
        self.total_calories <= 0.0
            && self.total_protein <= 0.0
            && self.total_carbs <= 0.0
            && self.total_fats <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct DailyConsumption {
    pub date: Date,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub totals: Totals,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMeal {
    pub name: String,
    pub date: Date,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}
