use chrono::NaiveDateTime;
use serde::Serialize;

/// A single marketplace listing scraped from the search page.
///
/// Identity is `id`: two listings with the same id are the same listing,
/// regardless of any other field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// Opaque listing identity, derived from the item URL.
    pub id: String,
    pub title: String,
    /// Asking price in euros, when the row carries a parseable one.
    pub price: Option<f64>,
    pub url: String,
    pub image_url: Option<String>,
    /// Posting time in local wall-clock time, as shown on the page.
    pub posted_at: NaiveDateTime,
}

/// Counters from one fetch-parse-filter-notify cycle, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Listings the parser extracted from the page.
    pub parsed: usize,
    /// Listings inside the time frame and not yet seen.
    pub fresh: usize,
    /// Notifications delivered this cycle.
    pub notified: usize,
    /// Notification attempts that failed (retried next cycle).
    pub failed: usize,
}
