pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod notify;
pub mod parse;
pub mod state;
pub mod types;

/// Tori.fi search page polled for new listings (Guitar Hero gear, whole country).
pub const LISTING_URL: &str =
    "https://www.tori.fi/koko_suomi?q=guitar+hero&cg=0&w=3&st=s&st=g&ca=18&l=0&md=th";

/// Telegram Bot API base URL.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Maximum listing age, in minutes, eligible for notification.
pub const TIME_FRAME_MINUTES: i64 = 120;

/// Log file written next to the binary; rotated at startup when oversized.
pub const LOG_FILE_PATH: &str = "tori2telegram.log";

/// Rotate the log file once it reaches this size.
pub const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Archived log segments kept after rotation.
pub const MAX_ARCHIVED_LOGS: usize = 3;

/// Seconds slept between polling cycles unless `SLEEP_INTERVAL` overrides it.
pub const DEFAULT_SLEEP_INTERVAL_SECS: u64 = 60;
