//! Quiz answer bookkeeping, local scoring, and submission.
//!
//! Scoring is deterministic client-side arithmetic; the backend remains
//! authoritative for attempt limits. The pass/fail shown to the user is set
//! from the local score before the server round-trip and is never rolled
//! back, so the submission outcome keeps the server record separate and
//! callers can tell a confirmed result from a provisional one.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::content::{Question, QuestionType};
use crate::models::quiz::{AttemptRecord, QuizSubmission, ScoreSummary};
use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Choices(Vec<String>),
}

/// Per-attempt answer state, keyed by question number. Created empty at quiz
/// start, mutated on interaction, discarded on submit or retry.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    answers: HashMap<u32, Answer>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle a choice in a multi-select answer.
    pub fn toggle_choice(&mut self, question: u32, choice_id: &str) {
        let entry = self
            .answers
            .entry(question)
            .or_insert_with(|| Answer::Choices(Vec::new()));
        if let Answer::Choices(ids) = entry {
            if let Some(pos) = ids.iter().position(|id| id == choice_id) {
                ids.remove(pos);
            } else {
                ids.push(choice_id.to_string());
            }
        } else {
            *entry = Answer::Choices(vec![choice_id.to_string()]);
        }
    }

    /// Replace the selection with a single choice (true/false style).
    pub fn select_single(&mut self, question: u32, choice_id: &str) {
        self.answers
            .insert(question, Answer::Choices(vec![choice_id.to_string()]));
    }

    pub fn set_text(&mut self, question: u32, text: impl Into<String>) {
        self.answers.insert(question, Answer::Text(text.into()));
    }

    pub fn get(&self, question: u32) -> Option<&Answer> {
        self.answers.get(&question)
    }

    pub fn is_answered(&self, question: u32) -> bool {
        match self.answers.get(&question) {
            Some(Answer::Choices(ids)) => !ids.is_empty(),
            Some(Answer::Text(text)) => !text.trim().is_empty(),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.answers.clear();
    }
}

/// Score a sheet against the parsed questions.
///
/// Credit rules: multiple choice needs the selected set to equal the correct
/// set exactly (no partial credit, empty never earns); true/false needs the
/// single correct id among the selection; free-text types earn full credit
/// for any non-empty trimmed answer, content unvalidated.
pub fn calculate_score(questions: &[Question], sheet: &AnswerSheet) -> ScoreSummary {
    let mut earned = 0u32;
    let mut total = 0u32;

    for question in questions {
        total += question.points;
        let answer = sheet.get(question.number);

        match question.question_type {
            QuestionType::MultipleChoice => {
                let correct = question.correct_choice_ids();
                let selected: &[String] = match answer {
                    Some(Answer::Choices(ids)) => ids,
                    _ => &[],
                };
                let all_correct = correct
                    .iter()
                    .all(|id| selected.iter().any(|s| s == id));
                let no_wrong = selected
                    .iter()
                    .all(|s| correct.iter().any(|id| id == s));
                if all_correct && no_wrong && !selected.is_empty() {
                    earned += question.points;
                }
            }
            QuestionType::TrueFalse => {
                let correct = question.choices.iter().find(|c| c.is_correct);
                let selected: &[String] = match answer {
                    Some(Answer::Choices(ids)) => ids,
                    _ => &[],
                };
                if let Some(correct) = correct {
                    if selected.iter().any(|s| *s == correct.id) {
                        earned += question.points;
                    }
                }
            }
            _ => {
                if let Some(Answer::Text(text)) = answer {
                    if !text.trim().is_empty() {
                        earned += question.points;
                    }
                }
            }
        }
    }

    let percentage = if total > 0 {
        ((earned as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    ScoreSummary {
        earned,
        total,
        percentage,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Taking,
    Passed,
    Failed,
}

/// Result of a submission: the local summary the UI already showed, plus the
/// server's attempt record when the call went through.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub summary: ScoreSummary,
    pub passed: bool,
    /// `None` means the pass/fail on screen is provisional, unconfirmed by
    /// the server.
    pub server: Option<AttemptRecord>,
}

impl SubmissionOutcome {
    pub fn is_confirmed(&self) -> bool {
        self.server.is_some()
    }
}

/// One quiz-taking session over a parsed question list.
pub struct QuizAttempt {
    quiz_id: String,
    questions: Vec<Question>,
    sheet: AnswerSheet,
    current_question: usize,
    state: QuizState,
    passing_score: u32,
    attempts_remaining: Option<u32>,
    started: Instant,
}

impl QuizAttempt {
    pub fn new(quiz_id: impl Into<String>, questions: Vec<Question>, passing_score: u32) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            questions,
            sheet: AnswerSheet::new(),
            current_question: 0,
            state: QuizState::Taking,
            passing_score,
            attempts_remaining: None,
            started: Instant::now(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn sheet(&self) -> &AnswerSheet {
        &self.sheet
    }

    pub fn sheet_mut(&mut self) -> &mut AnswerSheet {
        &mut self.sheet
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn attempts_remaining(&self) -> Option<u32> {
        self.attempts_remaining
    }

    pub fn current_question(&self) -> usize {
        self.current_question
    }

    /// Free movement between questions; unlike slides, quizzes are not
    /// gated.
    pub fn go_to_question(&mut self, index: usize) {
        if index < self.questions.len() {
            self.current_question = index;
        }
    }

    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.sheet.is_answered(q.number))
            .count()
    }

    pub fn score(&self) -> ScoreSummary {
        calculate_score(&self.questions, &self.sheet)
    }

    /// Score locally, flip the visible state immediately, then report to the
    /// backend. The provisional state survives a failed call; an
    /// attempts-exhausted 400 additionally zeroes the remaining counter.
    pub async fn submit(&mut self, client: &ApiClient) -> Result<SubmissionOutcome, ApiError> {
        let summary = self.score();
        let passed = summary.passed(self.passing_score);
        self.state = if passed {
            QuizState::Passed
        } else {
            QuizState::Failed
        };

        let submission = QuizSubmission {
            score: summary.percentage,
            points_earned: summary.earned,
            total_points: summary.total,
            time_taken_seconds: self.started.elapsed().as_secs(),
        };

        tracing::info!(
            quiz = %self.quiz_id,
            score = summary.percentage,
            passed,
            "submitting quiz attempt"
        );

        match client.submit_quiz(&self.quiz_id, &submission).await {
            Ok(record) => {
                self.attempts_remaining = Some(record.attempts_remaining);
                Ok(SubmissionOutcome {
                    summary,
                    passed,
                    server: Some(record),
                })
            }
            Err(e) => {
                if e.is_attempts_exhausted() {
                    self.attempts_remaining = Some(0);
                }
                tracing::warn!(quiz = %self.quiz_id, error = %e, "quiz submission failed");
                Err(e)
            }
        }
    }

    /// Start over locally. The server-side attempt counter is untouched; it
    /// alone decides whether another submission will be accepted.
    pub fn retry(&mut self) {
        self.sheet.clear();
        self.current_question = 0;
        self.state = QuizState::Taking;
        self.started = Instant::now();
    }
}
