use chrono::{NaiveDateTime, TimeDelta};
use tracing::{error, info};

use crate::fetch::Fetcher;
use crate::notify::{self, Notifier};
use crate::parse;
use crate::state::WatchState;
use crate::types::{CycleReport, Listing};

/// Select the listings to dispatch this cycle: those posted within
/// `time_frame` of `now` and not yet in the seen-set.
///
/// Parser order is preserved; no other ordering is guaranteed. Listings
/// older than the time frame are dropped silently and never enter the
/// seen-set.
pub fn select_fresh<'a>(
    listings: &'a [Listing],
    state: &WatchState,
    now: NaiveDateTime,
    time_frame: TimeDelta,
) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|l| now - l.posted_at <= time_frame)
        .filter(|l| !state.is_seen(&l.id))
        .collect()
}

/// Send one notification per selected listing, in order.
///
/// A listing id enters the seen-set only on send success; on failure the
/// error is logged and the listing stays eligible, so it is retried next
/// cycle. A failure for one listing never blocks the rest of the batch.
pub async fn dispatch<N: Notifier>(
    selected: &[&Listing],
    notifier: &N,
    state: &mut WatchState,
) -> (usize, usize) {
    let mut notified = 0;
    let mut failed = 0;

    for listing in selected {
        info!("Processing listing: {}", listing.title);
        match notifier.send(&notify::format_message(listing)).await {
            Ok(()) => {
                state.mark_seen(&listing.id);
                state.notified += 1;
                notified += 1;
            }
            Err(e) => {
                error!("Failed to notify for {}: {e}", listing.url);
                state.send_failures += 1;
                failed += 1;
            }
        }
    }

    (notified, failed)
}

/// One full cycle: fetch the listing page, parse it, select fresh listings,
/// dispatch notifications.
///
/// Fetch and parse failures are recoverable: they are logged and an empty
/// report is returned so the caller proceeds straight to sleep. This
/// function never terminates the process.
pub async fn run_cycle<F: Fetcher, N: Notifier>(
    fetcher: &F,
    notifier: &N,
    state: &mut WatchState,
    url: &str,
    now: NaiveDateTime,
    time_frame: TimeDelta,
) -> CycleReport {
    state.cycles += 1;

    let body = match fetcher.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            error!("Error fetching listings: {e}");
            return CycleReport::default();
        }
    };

    let listings = match parse::extract_listings(&body, url, now) {
        Ok(listings) => listings,
        Err(e) => {
            error!("Error parsing listings: {e}");
            return CycleReport::default();
        }
    };

    let selected = select_fresh(&listings, state, now, time_frame);
    let fresh = selected.len();
    let (notified, failed) = dispatch(&selected, notifier, state).await;

    CycleReport {
        parsed: listings.len(),
        fresh,
        notified,
        failed,
    }
}
