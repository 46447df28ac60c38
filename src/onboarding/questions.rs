use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    TextboxInput,
    MultipleChoice,
    SingleChoice,
    /// Composite height + weight input.
    RangeInput,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::TextboxInput => "textbox_input",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::SingleChoice => "single_choice",
            QuestionType::RangeInput => "range_input",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "textbox_input" => Some(QuestionType::TextboxInput),
            "multiple_choice" => Some(QuestionType::MultipleChoice),
            "single_choice" => Some(QuestionType::SingleChoice),
            "range_input" => Some(QuestionType::RangeInput),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub question_number: i32,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Option<Vec<String>>,
    pub is_number_specific: bool,
}

#[derive(Debug, FromRow)]
pub struct QuestionRow {
    pub question_number: i32,
    pub question_text: String,
    pub question_type: String,
    pub options: Option<Json<Vec<String>>>,
    pub is_number_specific: bool,
}

impl TryFrom<QuestionRow> for Question {
    type Error = anyhow::Error;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let question_type = QuestionType::parse(&row.question_type).ok_or_else(|| {
            anyhow::anyhow!(
                "question {} has unknown type {}",
                row.question_number,
                row.question_type
            )
        })?;
        Ok(Question {
            question_number: row.question_number,
            question_text: row.question_text,
            question_type,
            options: row.options.map(|o| o.0),
            is_number_specific: row.is_number_specific,
        })
    }
}

// Fixed answer positions the profile deriver reads.
pub const NAME: i32 = 0;
pub const AGE: i32 = 1;
pub const CURRENT_MEASUREMENT: i32 = 2;
pub const DESIRED_MEASUREMENT: i32 = 3;
pub const FAVORITE_FOODS: i32 = 4;
pub const SELF_ASSESSED_HEALTH: i32 = 5;
pub const PERSONAL_TOUCH: i32 = 6;

fn question(
    n: i32,
    text: &str,
    question_type: QuestionType,
    options: Option<&[&str]>,
    is_number_specific: bool,
) -> Question {
    Question {
        question_number: n,
        question_text: text.to_string(),
        question_type,
        options: options.map(|o| o.iter().map(|s| s.to_string()).collect()),
        is_number_specific,
    }
}

/// The onboarding questionnaire seeded at startup.
pub fn seed() -> Vec<Question> {
    const YES_NO: &[&str] = &["Yes", "No"];
    vec![
        question(
            NAME,
            "What should we call you?",
            QuestionType::TextboxInput,
            None,
            false,
        ),
        question(
            AGE,
            "What is your current age?",
            QuestionType::TextboxInput,
            None,
            true,
        ),
        question(
            CURRENT_MEASUREMENT,
            "What is your current height and weight?",
            QuestionType::RangeInput,
            None,
            false,
        ),
        question(
            DESIRED_MEASUREMENT,
            "What is your desired weight and height?",
            QuestionType::RangeInput,
            None,
            false,
        ),
        question(
            FAVORITE_FOODS,
            "Tell us your favorite foods?",
            QuestionType::MultipleChoice,
            Some(&["Pizza", "Sushi", "Pasta", "Salad", "Tacos"]),
            false,
        ),
        question(
            SELF_ASSESSED_HEALTH,
            "Would you consider yourself healthy?",
            QuestionType::SingleChoice,
            Some(YES_NO),
            false,
        ),
        question(
            PERSONAL_TOUCH,
            "Would you like a personal touch?",
            QuestionType::SingleChoice,
            Some(YES_NO),
            false,
        ),
    ]
}
