//! Alert Dispatcher
//!
//! Delivers a formatted match notification over the Telegram Bot API.
//! Delivery problems, including missing credentials, are reported as a
//! `false` return and logged; they never abort the run.

use async_trait::async_trait;
use std::time::Duration;

use crate::models::judgment::Judgment;
use crate::models::listing::Listing;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Returns `true` only on confirmed delivery.
    async fn dispatch(&self, listing: &Listing, judgment: &Judgment) -> bool;
}

/// Dispatcher backed by the Telegram `sendMessage` endpoint.
///
/// Credentials come from configuration at construction time; absence is
/// a configuration condition, not a fatal error.
pub struct TelegramNotifier {
    http: reqwest::Client,
    base_url: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(
        bot_token: Option<String>,
        chat_id: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            bot_token,
            chat_id,
        })
    }

    /// Point the client at a different API root, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Format the Markdown alert message for a qualifying listing.
fn format_alert(listing: &Listing, judgment: &Judgment) -> String {
    format!(
        "🚨 *High-Value Job Match! (Score: {}/10)*\n\n\
         *Role:* {}\n\
         *Company:* {}\n\
         *Summary:* {}\n\n\
         [Apply Here]({})",
        judgment.score, listing.title, listing.company, judgment.summary, listing.url
    )
}

#[async_trait]
impl Dispatcher for TelegramNotifier {
    async fn dispatch(&self, listing: &Listing, judgment: &Judgment) -> bool {
        let (token, chat_id) = match (&self.bot_token, &self.chat_id) {
            (Some(token), Some(chat_id)) => (token, chat_id),
            _ => {
                tracing::error!("telegram credentials missing, alert not sent");
                return false;
            }
        };

        let api_url = format!("{}/bot{}/sendMessage", self.base_url, token);
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": format_alert(listing, judgment),
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        match self
            .http
            .post(&api_url)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(_) => {
                tracing::info!(url = %listing.url, "telegram alert delivered");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to send telegram alert");
                false
            }
        }
    }
}
