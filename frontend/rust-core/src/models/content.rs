use serde::{Deserialize, Serialize};

/// One slide extracted from authored module content. Immutable once parsed;
/// the whole list is rebuilt when the module content changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    /// 1-based, order-significant within a module.
    pub number: u32,
    pub title: String,
    /// Opaque markup payload, rendered by the host, never interpreted here.
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
    Essay,
    Enumeration,
}

impl QuestionType {
    /// Selection types carry choices; everything else is free text.
    pub fn has_choices(self) -> bool {
        matches!(self, QuestionType::MultipleChoice | QuestionType::TrueFalse)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 1-based ordinal over the parsed blocks.
    pub number: u32,
    pub title: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub points: u32,
    /// Parsed choices; empty for free-text types.
    pub choices: Vec<Choice>,
    /// Set when the loose fallback pattern guessed which choice is correct
    /// (first match wins). Callers should surface these questions for review.
    #[serde(default)]
    pub heuristic_correctness: bool,
}

impl Question {
    /// Choice ids marked correct by the author.
    pub fn correct_choice_ids(&self) -> Vec<&str> {
        self.choices
            .iter()
            .filter(|c| c.is_correct)
            .map(|c| c.id.as_str())
            .collect()
    }

    /// The options actually presented to the user. True/false questions
    /// always offer exactly the synthetic pair, whatever was parsed.
    pub fn offered_choices(&self) -> Vec<Choice> {
        match self.question_type {
            QuestionType::TrueFalse => vec![
                Choice {
                    id: "true".to_string(),
                    text: "True".to_string(),
                    is_correct: false,
                },
                Choice {
                    id: "false".to_string(),
                    text: "False".to_string(),
                    is_correct: false,
                },
            ],
            _ => self.choices.clone(),
        }
    }
}
