use serde::Deserialize;
use tracing::info;

use crate::TELEGRAM_API_BASE;
use crate::error::NotifyError;
use crate::types::Listing;

/// Notification seam. The engine only needs "text in, delivered or not", so
/// tests can substitute recording or failing fakes.
pub trait Notifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Telegram Bot API `sendMessage` response envelope.
#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

/// Production notifier: posts to the Bot API `sendMessage` endpoint,
/// addressed to a single fixed user.
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: &str, chat_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{TELEGRAM_API_BASE}/bot{token}/sendMessage"),
            chat_id: chat_id.to_string(),
        }
    }
}

impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let params = [("chat_id", self.chat_id.as_str()), ("text", text)];
        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }

        let envelope: SendMessageResponse = response.json().await?;
        if !envelope.ok {
            return Err(NotifyError::Api(
                envelope.description.unwrap_or_else(|| "no description".to_string()),
            ));
        }

        info!("Delivered message to user {}", self.chat_id);
        Ok(())
    }
}

/// Render the notification text for a listing: title, price, posting time,
/// item URL and image URL (or a placeholder). One message per listing.
pub fn format_message(listing: &Listing) -> String {
    let price = match listing.price {
        Some(p) => format!("{p} €"),
        None => "Price not available".to_string(),
    };
    let image = listing.image_url.as_deref().unwrap_or("No image available");
    format!(
        "New item: {}\nPrice: {}\nTime: {}\nURL: {}\n{}",
        listing.title,
        price,
        listing.posted_at.format("%Y-%m-%d %H:%M"),
        listing.url,
        image,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn listing(price: Option<f64>, image: Option<&str>) -> Listing {
        Listing {
            id: "111".to_string(),
            title: "Guitar Hero World Tour".to_string(),
            price,
            url: "https://www.tori.fi/li/guitar_hero_111.htm".to_string(),
            image_url: image.map(str::to_string),
            posted_at: NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        }
    }

    #[test]
    fn message_includes_all_fields() {
        let text = format_message(&listing(Some(25.0), Some("https://img.tori.fi/111.jpg")));
        assert_eq!(
            text,
            "New item: Guitar Hero World Tour\n\
             Price: 25 €\n\
             Time: 2024-03-15 10:30\n\
             URL: https://www.tori.fi/li/guitar_hero_111.htm\n\
             https://img.tori.fi/111.jpg"
        );
    }

    #[test]
    fn message_without_price_or_image() {
        let text = format_message(&listing(None, None));
        assert!(text.contains("Price: Price not available"));
        assert!(text.ends_with("\nNo image available"));
    }
}
