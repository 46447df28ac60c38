//! Output-shape descriptors handed to the generator as `responseSchema`.
//!
//! The generator accepts an OpenAPI-style subset: upper-case type names,
//! `nullable`, string enums and `propertyOrdering`.

use serde_json::{json, Map, Value};

use super::ContentKind;

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn integer() -> Value {
    json!({ "type": "INTEGER" })
}

fn number() -> Value {
    json!({ "type": "NUMBER" })
}

fn boolean() -> Value {
    json!({ "type": "BOOLEAN" })
}

fn one_of(values: &[&str]) -> Value {
    json!({ "type": "STRING", "format": "enum", "enum": values })
}

fn nullable(mut v: Value) -> Value {
    v["nullable"] = Value::Bool(true);
    v
}

fn list(item: Value) -> Value {
    json!({ "type": "ARRAY", "items": item })
}

fn strings() -> Value {
    list(string())
}

fn object<const N: usize>(fields: [(&str, Value); N]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut ordering = Vec::new();
    for (name, shape) in fields {
        if shape.get("nullable") != Some(&Value::Bool(true)) {
            required.push(Value::String(name.to_string()));
        }
        ordering.push(Value::String(name.to_string()));
        properties.insert(name.to_string(), shape);
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
        "propertyOrdering": ordering,
    })
}

const DIFFICULTY: &[&str] = &["Beginner", "Intermediate", "Advanced"];

fn macros() -> Value {
    object([
        ("calories", number()),
        ("protein", number()),
        ("carbs", number()),
        ("fats", number()),
    ])
}

fn workout_plan() -> Value {
    let set = object([
        ("set_number", integer()),
        ("reps", integer()),
        ("rest_seconds", number()),
        ("set_duration_seconds", number()),
    ]);
    let exercise = object([
        ("workout_id", string()),
        ("workout_name", string()),
        ("workout_type", string()),
        ("workout_img_url", string()),
        ("total_time_take", number()),
        ("workout_equipment", string()),
        ("workout_category", one_of(DIFFICULTY)),
        ("workout_sets", list(set)),
        ("workout_instructions", strings()),
    ]);
    object([
        ("workout_plan_name", string()),
        ("workout_plan_img_url", string()),
        ("workout_plan_description", string()),
        ("workout_plan_total_time_seconds", number()),
        ("workout_plan_total_exercises", integer()),
        ("exercises", list(exercise)),
    ])
}

fn mindfulness_activity() -> Value {
    object([
        ("activity_title", string()),
        ("activity_description", string()),
        ("duration_minutes", integer()),
        ("audio_url", nullable(string())),
        ("video_url", nullable(string())),
        ("image_url", nullable(string())),
        ("tips", strings()),
    ])
}

fn mindfulness_plan() -> Value {
    let day = object([
        ("day", integer()),
        ("theme", string()),
        ("difficulty", one_of(DIFFICULTY)),
        (
            "motivation",
            object([("quote", string()), ("image_url", string())]),
        ),
        ("activities", list(mindfulness_activity())),
        (
            "reflection",
            object([("prompt", string()), ("journaling_tips", strings())]),
        ),
    ]);
    object([
        ("mindfulness_plan_name", string()),
        ("mindfulness_plan_img_url", string()),
        ("mindfulness_plan_description", string()),
        ("mindfulness_plan_total_days", integer()),
        (
            "features",
            object([
                ("audio_guide", boolean()),
                ("video_tutorials", boolean()),
                ("motivational_quotes", boolean()),
                ("progress_tracking", boolean()),
            ]),
        ),
        ("days", list(day)),
    ])
}

fn chronic_condition() -> Value {
    object([
        ("condition_name", string()),
        ("condition_description", string()),
        ("common_symptoms", strings()),
        ("severity_level", string()),
        (
            "management_strategies",
            list(object([
                ("strategy_name", string()),
                ("strategy_description", string()),
            ])),
        ),
        ("average_affected_age", nullable(integer())),
        ("condition_prevalence", nullable(string())),
        ("risk_factors", strings()),
        (
            "diagnostic_tests",
            list(object([
                ("test_name", string()),
                ("test_description", string()),
            ])),
        ),
        ("possible_complications", strings()),
        ("preventive_measures", strings()),
        ("recommended_specialists", strings()),
        ("common_treatments", strings()),
        (
            "support_groups_resources",
            list(object([
                ("resource_name", string()),
                ("resource_link", string()),
            ])),
        ),
    ])
}

fn medicine() -> Value {
    let ingredient = object([
        ("name", string()),
        ("strength", string()),
        ("unit", string()),
        ("purpose", string()),
        ("potential_side_effects", strings()),
    ]);
    object([
        ("name", string()),
        ("active_ingredients", list(ingredient)),
        ("dosage_form", string()),
        ("route_of_administration", string()),
        (
            "manufacturer",
            object([
                ("name", string()),
                ("country", string()),
                ("contact_email", string()),
            ]),
        ),
        ("indications", strings()),
        ("contraindications", strings()),
        ("side_effects", strings()),
        ("warnings", strings()),
        ("storage_conditions", string()),
        ("prescription_required", boolean()),
        ("mechanism_of_action", string()),
        ("interactions", strings()),
        ("lifestyle_considerations", string()),
        ("overdose_risks", string()),
        ("patient_experience", string()),
    ])
}

fn onboarding_question() -> Value {
    object([
        ("id", integer()),
        ("title", string()),
        ("question", string()),
        ("button_txt", string()),
        (
            "choices",
            list(object([
                ("choice_id", integer()),
                ("button_type", integer()),
                ("button_text", string()),
                ("img_path", string()),
            ])),
        ),
        ("next", boolean()),
    ])
}

fn landing_meal() -> Value {
    object([
        ("id", string()),
        ("name", string()),
        ("thumbnail", string()),
        ("description", string()),
        ("recipe_id", integer()),
        ("meal_type", one_of(&["Breakfast", "Lunch", "Dinner", "Snacks"])),
        ("serving", integer()),
        ("serving_description", string()),
        ("nutritional_value", string()),
        ("ingredients", strings()),
        ("directions", strings()),
        ("allergens", strings()),
        ("rich_in_nutrients", strings()),
    ])
}

fn plan_stage() -> Value {
    object([
        ("Stage_number", integer()),
        ("Stage_name", string()),
        ("Stage_description", string()),
        ("Stage_time_period", string()),
        ("Expected_outcomes", strings()),
        ("What_to_do", strings()),
        ("What_to_expect", strings()),
        ("Suggested_foods", strings()),
        ("Suggested_activity_level", string()),
        ("Suggested_activities", strings()),
        ("Suggested_avoid_foods", strings()),
        ("Suggested_avoid_activities", strings()),
        ("Tips_and_tricks", strings()),
        ("Daily_calorie_goal", number()),
        ("Macronutrient_targets", macros()),
        ("Hydration_goal", string()),
        ("Meal_frequency", string()),
        ("Sleep_recommendation", string()),
        ("Stress_management_techniques", strings()),
    ])
}

fn nutrition_plan() -> Value {
    object([
        ("total_time_period_weeks", integer()),
        ("plan_stages", list(plan_stage())),
        ("user_height", string()),
        ("user_current_weight", string()),
        ("user_desired_weight", string()),
        ("user_bmi", number()),
        ("user_favorite_foods", strings()),
        ("user_self_assessed_health", string()),
        ("user_health_risks", strings()),
        ("user_dietary_recommendations", strings()),
        ("user_predicted_calorie_needs", string()),
        ("plan_goals", strings()),
        ("potential_challenges", strings()),
        ("motivational_tips", strings()),
        ("recommended_nutrients", strings()),
        ("suggested_supplements", strings()),
        ("monitoring_metrics", strings()),
        ("success_indicators", strings()),
        ("weekly_check_in_goals", strings()),
        ("social_support_recommendations", strings()),
        ("long_term_maintenance_strategies", strings()),
    ])
}

fn daily_meal_plan() -> Value {
    let meal = object([
        ("name", string()),
        ("ingredients", strings()),
        ("preparation", string()),
        ("nutrition", macros()),
        (
            "images",
            list(object([("food_name", string()), ("image_url", string())])),
        ),
    ]);
    object([
        ("meals", list(meal)),
        ("total_calories", number()),
        ("total_protein", number()),
        ("total_carbs", number()),
        ("total_fats", number()),
    ])
}

fn ingredients() -> Value {
    list(object([
        ("name", string()),
        ("quantity", integer()),
        ("quantity_unit", string()),
    ]))
}

/// The shape a generator must return for `kind`.
pub fn shape(kind: ContentKind) -> Value {
    match kind {
        ContentKind::Condition => chronic_condition(),
        ContentKind::Fitness => workout_plan(),
        ContentKind::Medicine => medicine(),
        ContentKind::Onboarding => onboarding_question(),
        ContentKind::Mindfulness => mindfulness_plan(),
        ContentKind::Symptoms => object([("items", strings())]),
        ContentKind::Title => object([("title", string())]),
        ContentKind::Mood => object([(
            "recommendations",
            list(object([("category", string()), ("suggestions", strings())])),
        )]),
        ContentKind::FitnessLanding => object([("workoutplans", list(workout_plan()))]),
        ContentKind::MindfulnessLanding => {
            object([("activities", list(mindfulness_activity()))])
        }
        ContentKind::NutritionLanding => object([("meals", list(landing_meal()))]),
        ContentKind::HealthInsights => object([
            ("health_risks", strings()),
            ("dietary_recommendations", strings()),
            ("predicted_calorie_needs", integer()),
        ]),
        ContentKind::NutritionPlan => nutrition_plan(),
        ContentKind::DailyMealPlan => daily_meal_plan(),
        ContentKind::FoodIdentity => object([
            ("name", string()),
            ("description", string()),
            ("macro", macros()),
        ]),
        ContentKind::FoodIngredients => object([("ingredients", ingredients())]),
        ContentKind::FoodRecipe => object([
            ("ingredients", ingredients()),
            ("instructions", strings()),
        ]),
    }
}
