use serde::{Deserialize, Serialize};

/// The classifier's structured verdict on a listing.
///
/// `score` is expected in 1..=10; 0 is the sentinel for a failed
/// evaluation and always falls below the delivery threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    pub score: i64,
    pub summary: String,
    pub is_agency: bool,
}

impl Judgment {
    /// Sentinel judgment for a failed evaluation. Never delivered,
    /// but still recorded so the listing is not reprocessed.
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            score: 0,
            summary: format!("Evaluation failed: {reason}"),
            is_agency: false,
        }
    }
}
