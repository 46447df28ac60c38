use serde_json::Value;

use super::questions::{Question, QuestionType};
use super::units::{parse_imperial_height, parse_number, UnitSystem};
use crate::error::AppError;

fn invalid(field: &str, message: impl Into<String>) -> AppError {
    AppError::validation(field, message)
}

fn in_range(field: &str, raw: &Value, lo: f64, hi: f64, unit: &str) -> Result<(), AppError> {
    let v = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s).ok(),
        _ => None,
    }
    .ok_or_else(|| invalid(field, format!("{field} must be a valid number")))?;
    if !(lo..=hi).contains(&v) {
        return Err(invalid(
            field,
            format!("{field} must be between {lo} and {hi} {unit}"),
        ));
    }
    Ok(())
}

fn validate_measurement(raw: &str) -> Result<(), AppError> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|_| invalid("answer", "Answer must be a valid JSON string"))?;
    let obj = parsed
        .as_object()
        .ok_or_else(|| invalid("answer", "Answer must be an object"))?;

    let unit = obj
        .get("unit")
        .and_then(Value::as_str)
        .and_then(UnitSystem::parse)
        .ok_or_else(|| invalid("unit", "Unit must be 'imperial' or 'metric'"))?;
    let height = obj.get("height").unwrap_or(&Value::Null);
    let weight = obj.get("weight").unwrap_or(&Value::Null);

    match unit {
        UnitSystem::Imperial => {
            let inches = height
                .as_str()
                .ok_or_else(|| invalid("height", "Imperial height must be in the format 5'10\""))
                .and_then(|h| {
                    parse_imperial_height(h).map_err(|e| {
                        invalid("height", format!("Imperial height must be in the format 5'10\": {e}"))
                    })
                })?;
            if inches <= 0.0 {
                return Err(invalid("height", "Height must be greater than zero"));
            }
            in_range("weight", weight, 10.0, 1000.0, "lbs")
        }
        UnitSystem::Metric => {
            in_range("height", height, 50.0, 300.0, "cm")?;
            in_range("weight", weight, 5.0, 500.0, "kg")
        }
    }
}

/// Checks an answer against its question and returns the text to store.
pub fn validate_answer(question: &Question, answer: &Value) -> Result<String, AppError> {
    let raw = answer
        .as_str()
        .ok_or_else(|| invalid("answer", "Answer must be a string"))?;

    match question.question_type {
        QuestionType::TextboxInput if question.is_number_specific => {
            let n: i64 = raw
                .trim()
                .parse()
                .map_err(|_| invalid("answer", "Age must be a valid integer"))?;
            if !(1..=120).contains(&n) {
                return Err(invalid("answer", "Age must be between 1 and 120"));
            }
        }
        QuestionType::TextboxInput => {
            if raw.trim().is_empty() {
                return Err(invalid("answer", "Answer must not be blank"));
            }
        }
        QuestionType::RangeInput => validate_measurement(raw)?,
        QuestionType::MultipleChoice => {
            serde_json::from_str::<Vec<String>>(raw)
                .map_err(|_| invalid("answer", "Answer must be a JSON list of strings"))?;
        }
        QuestionType::SingleChoice => {
            let options = question.options.as_deref().unwrap_or_default();
            if !options.iter().any(|o| o == raw) {
                return Err(invalid(
                    "answer",
                    format!("Answer must be one of: {}", options.join(", ")),
                ));
            }
        }
    }
    Ok(raw.to_string())
}
