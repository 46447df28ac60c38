use serde::{Deserialize, Deserializer, Serialize};

const METRES_PER_INCH: f64 = 0.0254;
const KG_PER_LB: f64 = 0.453592;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    Imperial,
    Metric,
}

impl UnitSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            UnitSystem::Imperial => "imperial",
            UnitSystem::Metric => "metric",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "imperial" => Some(UnitSystem::Imperial),
            "metric" => Some(UnitSystem::Metric),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("malformed measurement: {0}")]
    Format(String),
    #[error("invalid measurement: {0}")]
    InvalidMeasurement(String),
}

/// Height and weight as entered by the user, in the user's unit system.
/// Imperial height is `feet'inches"`, metric height is centimetres; weight is
/// pounds or kilograms respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub unit: UnitSystem,
    #[serde(deserialize_with = "string_or_number")]
    pub height: String,
    #[serde(deserialize_with = "string_or_number")]
    pub weight: String,
}

impl Measurement {
    pub fn to_metric(&self) -> Result<(f64, f64), UnitError> {
        to_metric(self.unit, &self.height, &self.weight)
    }

    pub fn bmi(&self) -> Result<f64, UnitError> {
        let (height_m, weight_kg) = self.to_metric()?;
        compute_bmi(height_m, weight_kg)
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }
    Ok(match Raw::deserialize(de)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

pub fn parse_number(raw: &str) -> Result<f64, UnitError> {
    let v: f64 = raw
        .trim()
        .parse()
        .map_err(|_| UnitError::Format(format!("{raw:?} is not a number")))?;
    if !v.is_finite() {
        return Err(UnitError::Format(format!("{raw:?} is not a number")));
    }
    Ok(v)
}

/// Total inches from a `5'10"` style string. Prime marks are accepted and an
/// absent inches part counts as zero.
pub fn parse_imperial_height(raw: &str) -> Result<f64, UnitError> {
    let normalized = raw.trim().replace('′', "'").replace('″', "\"");
    if normalized.matches('\'').count() != 1 {
        return Err(UnitError::Format(format!(
            "{raw:?} must look like 5'10\""
        )));
    }
    let (feet, inches) = normalized
        .split_once('\'')
        .ok_or_else(|| UnitError::Format(format!("{raw:?} must look like 5'10\"")))?;

    let feet = parse_number(feet)?;
    let inches = inches.trim().trim_end_matches('"').trim();
    let inches = if inches.is_empty() {
        0.0
    } else {
        parse_number(inches)?
    };
    Ok(feet * 12.0 + inches)
}

/// Converts a height/weight pair to metres and kilograms.
pub fn to_metric(unit: UnitSystem, height: &str, weight: &str) -> Result<(f64, f64), UnitError> {
    match unit {
        UnitSystem::Imperial => {
            let inches = parse_imperial_height(height)?;
            let lbs = parse_number(weight)?;
            Ok((inches * METRES_PER_INCH, lbs * KG_PER_LB))
        }
        UnitSystem::Metric => {
            let cm = parse_number(height)?;
            let kg = parse_number(weight)?;
            Ok((cm / 100.0, kg))
        }
    }
}

pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// `weight / height²`, one decimal.
pub fn compute_bmi(height_m: f64, weight_kg: f64) -> Result<f64, UnitError> {
    if !height_m.is_finite() || !weight_kg.is_finite() {
        return Err(UnitError::InvalidMeasurement(
            "height and weight must be finite".into(),
        ));
    }
    if height_m <= 0.0 {
        return Err(UnitError::InvalidMeasurement(
            "height must be greater than zero".into(),
        ));
    }
    if weight_kg <= 0.0 {
        return Err(UnitError::InvalidMeasurement(
            "weight must be greater than zero".into(),
        ));
    }
    Ok(round1(weight_kg / (height_m * height_m)))
}
