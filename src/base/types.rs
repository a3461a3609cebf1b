use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Topic a question belongs to.
///
/// Each category carries its own expert directive and form template (see [`crate::base::prompts`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Category {
    #[default]
    General,
    Visa,
    Tax,
    Rideshare,
    Housing,
    Health,
    License,
    Ssn,
    Bank,
    Phone,
    Car,
    Transfer,
    Flights,
}

impl Category {
    pub const ALL: [Category; 13] = [
        Category::General,
        Category::Visa,
        Category::Tax,
        Category::Rideshare,
        Category::Housing,
        Category::Health,
        Category::License,
        Category::Ssn,
        Category::Bank,
        Category::Phone,
        Category::Car,
        Category::Transfer,
        Category::Flights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Visa => "visa",
            Category::Tax => "tax",
            Category::Rideshare => "rideshare",
            Category::Housing => "housing",
            Category::Health => "health",
            Category::License => "license",
            Category::Ssn => "ssn",
            Category::Bank => "bank",
            Category::Phone => "phone",
            Category::Car => "car",
            Category::Transfer => "transfer",
            Category::Flights => "flights",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Res<Self> {
        let needle = s.trim().to_ascii_lowercase();

        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| anyhow::anyhow!("Unknown category `{s}`."))
    }
}

impl TryFrom<String> for Category {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Res<Self> {
        value.parse()
    }
}

/// A question submitted by a user.
///
/// Only `question` is strict. A missing, null, or unrecognized `category` means
/// [`Category::General`], and non-string follow-up fields are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionRequest {
    #[serde(default, deserialize_with = "lenient_category")]
    pub category: Category,
    pub question: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub follow_up: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub previous_answer: Option<String>,
}

fn lenient_category<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Category, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse().unwrap_or_default(),
        _ => Category::General,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

impl QuestionRequest {
    pub fn new(category: Category, question: impl Into<String>) -> Self {
        Self {
            category,
            question: question.into(),
            ..Default::default()
        }
    }
}

/// Whether an answer came from the model or from static fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerStatus {
    Ai,
    Fallback,
}

/// The answer returned for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub result: String,
    pub status: AnswerStatus,
}

impl AnswerResponse {
    pub fn ai(result: String) -> Self {
        Self { result, status: AnswerStatus::Ai }
    }

    pub fn fallback(result: String) -> Self {
        Self {
            result,
            status: AnswerStatus::Fallback,
        }
    }
}

/// A single piece of user feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub message: String,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackEntry {
    /// Create a new entry stamped with the current time.
    ///
    /// Message and contact are trimmed; a blank contact is stored as `None`.
    pub fn new(message: &str, contact: Option<&str>) -> Self {
        let contact = contact.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string);

        Self {
            message: message.trim().to_string(),
            contact,
            created_at: Utc::now(),
        }
    }
}
