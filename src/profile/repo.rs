use axum::async_trait;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::types::{HealthInsights, Profile, ProfileBasics};
use crate::{db::PgStore, onboarding::units::UnitSystem};

#[async_trait]
pub trait ProfileRepo: Send + Sync {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>>;
    /// Create-or-replace keyed on user.
    async fn upsert(&self, user_id: Uuid, profile: &Profile) -> anyhow::Result<()>;
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    name: String,
    age: i32,
    current_height: String,
    current_weight: String,
    desired_height: String,
    desired_weight: String,
    favorite_foods: Json<Vec<String>>,
    self_assessed_health: String,
    personal_touch_preference: bool,
    bmi: f64,
    preferred_unit: String,
    health_risks: Json<Vec<String>>,
    dietary_recommendations: Json<Vec<String>>,
    predicted_calorie_needs: String,
    updated_at: OffsetDateTime,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = anyhow::Error;

    fn try_from(r: ProfileRow) -> Result<Self, Self::Error> {
        let preferred_unit = UnitSystem::parse(&r.preferred_unit)
            .ok_or_else(|| anyhow::anyhow!("unknown unit system {}", r.preferred_unit))?;
        Ok(Profile {
            basics: ProfileBasics {
                name: r.name,
                age: r.age,
                current_height: r.current_height,
                current_weight: r.current_weight,
                desired_height: r.desired_height,
                desired_weight: r.desired_weight,
                favorite_foods: r.favorite_foods.0,
                self_assessed_health: r.self_assessed_health,
                personal_touch_preference: r.personal_touch_preference,
                bmi: r.bmi,
                preferred_unit,
            },
            insights: HealthInsights {
                health_risks: r.health_risks.0,
                dietary_recommendations: r.dietary_recommendations.0,
                predicted_calorie_needs: r.predicted_calorie_needs,
            },
            updated_at: r.updated_at,
        })
    }
}

#[async_trait]
impl ProfileRepo for PgStore {
    async fn get(&self, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT name, age, current_height, current_weight, desired_height, desired_weight,
                   favorite_foods, self_assessed_health, personal_touch_preference, bmi,
                   preferred_unit, health_risks, dietary_recommendations,
                   predicted_calorie_needs, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Profile::try_from).transpose()
    }

    async fn upsert(&self, user_id: Uuid, p: &Profile) -> anyhow::Result<()> {
        let b = &p.basics;
        let i = &p.insights;
        sqlx::query(
            r#"
            INSERT INTO profiles
                (user_id, name, age, current_height, current_weight, desired_height,
                 desired_weight, favorite_foods, self_assessed_health,
                 personal_touch_preference, bmi, preferred_unit, health_risks,
                 dietary_recommendations, predicted_calorie_needs, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (user_id) DO UPDATE SET
                name = EXCLUDED.name,
                age = EXCLUDED.age,
                current_height = EXCLUDED.current_height,
                current_weight = EXCLUDED.current_weight,
                desired_height = EXCLUDED.desired_height,
                desired_weight = EXCLUDED.desired_weight,
                favorite_foods = EXCLUDED.favorite_foods,
                self_assessed_health = EXCLUDED.self_assessed_health,
                personal_touch_preference = EXCLUDED.personal_touch_preference,
                bmi = EXCLUDED.bmi,
                preferred_unit = EXCLUDED.preferred_unit,
                health_risks = EXCLUDED.health_risks,
                dietary_recommendations = EXCLUDED.dietary_recommendations,
                predicted_calorie_needs = EXCLUDED.predicted_calorie_needs,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(&b.name)
        .bind(b.age)
        .bind(&b.current_height)
        .bind(&b.current_weight)
        .bind(&b.desired_height)
        .bind(&b.desired_weight)
        .bind(Json(&b.favorite_foods))
        .bind(&b.self_assessed_health)
        .bind(b.personal_touch_preference)
        .bind(b.bmi)
        .bind(b.preferred_unit.as_str())
        .bind(Json(&i.health_risks))
        .bind(Json(&i.dietary_recommendations))
        .bind(&i.predicted_calorie_needs)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
