use serde::{Deserialize, Serialize};

/// Local scoring result. Purely client-side arithmetic; the server record
/// in [`AttemptRecord`] stays authoritative for attempt bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreSummary {
    pub earned: u32,
    pub total: u32,
    /// round(100 * earned / total), 0 when total is 0. Always in [0, 100].
    pub percentage: u32,
}

impl ScoreSummary {
    pub fn passed(&self, passing_score: u32) -> bool {
        self.percentage >= passing_score
    }
}

/// Body for `POST /learning/quizzes/{id}/submit_simple/`.
#[derive(Debug, Clone, Serialize)]
pub struct QuizSubmission {
    pub score: u32,
    pub points_earned: u32,
    pub total_points: u32,
    pub time_taken_seconds: u64,
}

/// Server response to a quiz submission.
#[derive(Debug, Clone, Deserialize)]
pub struct AttemptRecord {
    #[serde(default)]
    pub attempts_used: u32,
    #[serde(default)]
    pub attempts_remaining: u32,
}
