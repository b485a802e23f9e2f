use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: String,
    pub label: String,
}

impl ChoiceOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into() }
    }
}

/// Validation applied to free-text answers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRule {
    /// Exactly five ASCII digits, as in an Italian CAP.
    PostalCode,
}

impl TextRule {
    pub fn accepts(&self, input: &str) -> bool {
        match self {
            Self::PostalCode => postal_code_pattern().is_match(input),
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Self::PostalCode => "Inserisci un CAP valido di 5 cifre",
        }
    }
}

fn postal_code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| match Regex::new(r"^[0-9]{5}$") {
        Ok(pattern) => pattern,
        Err(error) => unreachable!("static postal code pattern must compile: {error}"),
    })
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    Choice { options: Vec<ChoiceOption> },
    Freeform { rule: TextRule, placeholder: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub kind: QuestionKind,
}

impl Question {
    pub fn choice(id: &str, prompt: &str, options: Vec<ChoiceOption>) -> Self {
        Self {
            id: QuestionId(id.to_owned()),
            prompt: prompt.to_owned(),
            kind: QuestionKind::Choice { options },
        }
    }

    pub fn freeform(id: &str, prompt: &str, rule: TextRule, placeholder: &str) -> Self {
        Self {
            id: QuestionId(id.to_owned()),
            prompt: prompt.to_owned(),
            kind: QuestionKind::Freeform { rule, placeholder: placeholder.to_owned() },
        }
    }

    pub fn option(&self, option_id: &str) -> Option<&ChoiceOption> {
        match &self.kind {
            QuestionKind::Choice { options } => options.iter().find(|option| option.id == option_id),
            QuestionKind::Freeform { .. } => None,
        }
    }

    /// Label for a recorded answer; free-text answers are shown as entered.
    pub fn answer_label<'a>(&'a self, answer: &'a str) -> &'a str {
        self.option(answer).map(|option| option.label.as_str()).unwrap_or(answer)
    }
}
