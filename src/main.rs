use std::time::Duration;

use tracing_subscriber::EnvFilter;

use job_scout::config::AppConfig;
use job_scout::db;
use job_scout::pipeline::{self, PipelineOptions};
use job_scout::services::classifier::GroqClient;
use job_scout::services::notifier::TelegramNotifier;
use job_scout::services::source::HttpListingSource;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Starting the AI-powered job opportunity tracker");

    // Initialize the listing store
    tracing::info!(database_url = %config.database_url, "Opening listing store");
    let db_pool = db::init_pool(&config.database_url)
        .await
        .expect("Failed to open listing store");

    db::run_migrations(&db_pool)
        .await
        .expect("Failed to run database migrations");

    // Initialize components
    let source = HttpListingSource::new().expect("Failed to build listing source");

    let classifier = GroqClient::new(
        config.groq_api_key.clone(),
        config.groq_model.clone(),
        config.skill_profile.clone(),
    )
    .expect("Failed to build classifier client");

    let notifier = TelegramNotifier::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    )
    .expect("Failed to build notifier");

    let opts = PipelineOptions {
        endpoint: config.target_url.clone(),
        max_listings: config.max_listings,
        delivery_threshold: config.delivery_threshold,
        listing_delay: Duration::from_secs(config.listing_delay_secs),
    };

    tracing::info!(endpoint = %opts.endpoint, max_listings = opts.max_listings, "Beginning pipeline run");

    match pipeline::run_pipeline(&db_pool, &source, &classifier, &notifier, &opts).await {
        Ok(summary) => {
            tracing::info!(
                fetched = summary.fetched,
                skipped = summary.skipped,
                evaluated = summary.evaluated,
                delivered = summary.delivered,
                stored = summary.stored,
                "Pipeline run complete"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "Pipeline run failed");
            std::process::exit(1);
        }
    }
}
