use thiserror::Error;

/// Network/HTTP failure reaching the source site. Non-fatal: the cycle logs
/// it and goes straight to sleep.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Page structure not matching the expected shape. Treated identically to a
/// fetch failure.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The listing-row selector matched nothing; either the page layout
    /// changed or we were served an error/consent page.
    #[error("no listing rows found in page")]
    NoListings,
}

/// Telegram delivery failure (bad token, blocked user, network).
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("sendMessage request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("sendMessage returned HTTP {0}")]
    Status(reqwest::StatusCode),
    /// HTTP 200 but `ok: false` in the API envelope.
    #[error("Telegram API rejected message: {0}")]
    Api(String),
}
