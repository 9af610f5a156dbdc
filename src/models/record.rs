use sqlx::FromRow;

/// Durable, terminal stored form of a listing and its judgment.
///
/// Created exactly once per listing at the end of its processing,
/// never updated or deleted. `processed_date` is UTC ISO-8601,
/// assigned by the store at insert time.
#[derive(Debug, Clone, FromRow)]
pub struct ProcessedRecord {
    pub id: i64,
    pub job_url: String,
    pub title: String,
    pub company: String,
    pub raw_description: String,
    pub llm_score: i64,
    pub is_agency: bool,
    pub summary: String,
    pub processed_date: String,
}
