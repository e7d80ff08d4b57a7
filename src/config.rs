use anyhow::{Context, Result, bail};

use crate::DEFAULT_SLEEP_INTERVAL_SECS;

/// Runtime configuration, read from the environment once at startup and
/// immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telegram bot token.
    pub telegram_token: String,
    /// Telegram user id notifications are addressed to.
    pub user_id: String,
    /// Tracing filter directive derived from `LOG_LEVEL`.
    pub log_level: String,
    /// Seconds slept between polling cycles.
    pub sleep_interval_secs: u64,
}

impl AppConfig {
    /// Load config from the environment. A `.env` file is loaded first if
    /// present; real environment variables win.
    ///
    /// Missing `TELEGRAM_TOKEN` or `USER_ID` is the only fatal condition in
    /// the program: it aborts startup before the polling loop is entered.
    pub fn from_env() -> Result<Self> {
        // Absent .env is fine; the variables may come from the environment.
        let _ = dotenvy::dotenv();

        let telegram_token = std::env::var("TELEGRAM_TOKEN")
            .context("TELEGRAM_TOKEN must be set (environment or .env)")?;
        let user_id =
            std::env::var("USER_ID").context("USER_ID must be set (environment or .env)")?;

        let log_level = std::env::var("LOG_LEVEL")
            .map(|s| level_directive(&s).to_string())
            .unwrap_or_else(|_| "info".to_string());

        let sleep_interval_secs = match std::env::var("SLEEP_INTERVAL") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("SLEEP_INTERVAL must be an integer, got {raw:?}"))?,
            Err(_) => DEFAULT_SLEEP_INTERVAL_SECS,
        };
        if sleep_interval_secs == 0 {
            bail!("SLEEP_INTERVAL must be positive");
        }

        Ok(Self {
            telegram_token,
            user_id,
            log_level,
            sleep_interval_secs,
        })
    }
}

/// Map a `LOG_LEVEL` name to a tracing filter directive.
///
/// Accepts DEBUG|INFO|WARNING|ERROR|CRITICAL, case-insensitive. WARNING and
/// CRITICAL have no tracing level of their own and map to `warn` and `error`.
/// Anything else must not reach the env filter untranslated: a bare word like
/// `warning` parses as a target directive there and silences everything, so
/// unrecognised values fall back to `info`.
fn level_directive(raw: &str) -> &'static str {
    match raw.to_uppercase().as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        "CRITICAL" => "error",
        _ => "info",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_map_to_tracing_directives() {
        assert_eq!(level_directive("DEBUG"), "debug");
        assert_eq!(level_directive("INFO"), "info");
        assert_eq!(level_directive("WARNING"), "warn");
        assert_eq!(level_directive("ERROR"), "error");
        assert_eq!(level_directive("CRITICAL"), "error");
    }

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(level_directive("warning"), "warn");
        assert_eq!(level_directive("Critical"), "error");
    }

    #[test]
    fn unrecognised_level_falls_back_to_info() {
        assert_eq!(level_directive("verbose"), "info");
        assert_eq!(level_directive(""), "info");
    }

    #[test]
    fn mapped_directive_keeps_errors_visible() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        use tracing_subscriber::EnvFilter;

        struct Buf(Arc<Mutex<Vec<u8>>>);

        impl Write for Buf {
            fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().write(bytes)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        // A raw "warning" parses as a target directive and silences ERROR
        // events; the mapped directive must keep them flowing.
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_new(level_directive("WARNING")).unwrap())
            .with_writer(move || Buf(sink.clone()))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!("fetch failed");
        });

        let output = String::from_utf8(captured.lock().unwrap().clone()).unwrap();
        assert!(output.contains("fetch failed"));
    }
}
