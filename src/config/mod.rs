use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// SQLite connection string for the listing store
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Listings page to monitor
    #[serde(default = "default_target_url")]
    pub target_url: String,

    /// Cap on listings fetched per run
    #[serde(default = "default_max_listings")]
    pub max_listings: usize,

    /// Groq API key for the relevance classifier
    pub groq_api_key: String,

    /// Groq model identifier
    #[serde(default = "default_groq_model")]
    pub groq_model: String,

    /// Candidate skill profile inserted into the classifier prompt
    #[serde(default = "default_skill_profile")]
    pub skill_profile: String,

    /// Minimum score for an alert (1-10 scale)
    #[serde(default = "default_delivery_threshold")]
    pub delivery_threshold: i64,

    /// Delay between processed listings, in seconds (classifier rate limit)
    #[serde(default = "default_listing_delay_secs")]
    pub listing_delay_secs: u64,

    /// Telegram bot token. Optional: alerts degrade to log-only when absent.
    pub telegram_bot_token: Option<String>,

    /// Telegram chat to deliver alerts to
    pub telegram_chat_id: Option<String>,
}

fn default_database_url() -> String {
    "sqlite://jobs.db".to_string()
}

fn default_target_url() -> String {
    "https://news.ycombinator.com/jobs".to_string()
}

fn default_max_listings() -> usize {
    15
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_skill_profile() -> String {
    "n8n, RAG, LLM fine-tuning, Python, API integration, and chatbots".to_string()
}

fn default_delivery_threshold() -> i64 {
    5
}

fn default_listing_delay_secs() -> u64 {
    3
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
