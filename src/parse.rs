use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::ParseError;
use crate::types::Listing;

/// Numeric month for a Finnish month abbreviation as shown on listing rows.
fn finnish_month(abbr: &str) -> Option<u32> {
    let month = match abbr {
        "tam" => 1,
        "hel" => 2,
        "maa" => 3,
        "huh" => 4,
        "tou" => 5,
        "kes" => 6,
        "hei" => 7,
        "elo" => 8,
        "syy" => 9,
        "lok" => 10,
        "mar" => 11,
        "jou" => 12,
        _ => return None,
    };
    Some(month)
}

/// Parse a Finnish listing timestamp relative to `now`.
///
/// Accepted shapes: `"tänään HH:MM"` (today), `"eilen HH:MM"` (yesterday),
/// `"D mon HH:MM"` with a Finnish month abbreviation (current year).
/// Whitespace is normalised and matching is case-insensitive.
pub fn parse_posted_at(raw: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    debug!("Parsing listing timestamp {raw:?} as {text:?}");

    let (date, time_part) = if text.contains("tänään") {
        (Some(now.date()), text.rsplit(' ').next()?.to_string())
    } else if text.contains("eilen") {
        (now.date().checked_sub_days(Days::new(1)), text.rsplit(' ').next()?.to_string())
    } else {
        let mut parts = text.split(' ');
        let (day, month, time_part) = (parts.next()?, parts.next()?, parts.next()?);
        let day: u32 = day.parse().ok()?;
        let month = finnish_month(month)?;
        (
            NaiveDate::from_ymd_opt(now.date().year(), month, day),
            time_part.to_string(),
        )
    };

    let time = NaiveTime::parse_from_str(&time_part, "%H:%M").ok()?;
    Some(NaiveDateTime::new(date?, time))
}

/// Parse a price label like `"120 €"` or `"1 234 €"` into euros.
///
/// Returns `None` for missing or non-numeric labels ("Myydään", etc.).
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter_map(|c| {
            if c.is_ascii_digit() {
                Some(c)
            } else if c == ',' {
                Some('.')
            } else {
                None
            }
        })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Listing identity derived from the item URL: the trailing numeric segment
/// of the path when present, else the full URL.
pub fn listing_id(url: &str) -> String {
    let last = url.trim_end_matches('/').rsplit('/').next().unwrap_or(url);
    let stem = last.split('.').next().unwrap_or(last);
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        url.to_string()
    } else {
        digits.chars().rev().collect()
    }
}

/// CSS selectors for the Tori.fi search result layout, built once.
struct Selectors {
    row: Selector,
    title: Selector,
    price: Selector,
    time: Selector,
    image: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            row: Selector::parse("a.item_row_flex").unwrap(),
            title: Selector::parse("div.li-title").unwrap(),
            price: Selector::parse("p.list_price").unwrap(),
            time: Selector::parse("div.date_image").unwrap(),
            image: Selector::parse("img.item_image").unwrap(),
        }
    }
}

fn element_text(row: scraper::ElementRef<'_>, sel: &Selector) -> Option<String> {
    let el = row.select(sel).next()?;
    let text: String = el.text().collect::<String>().trim().to_string();
    Some(text)
}

/// Extract listings from a fetched search page.
///
/// Rows missing a title or timestamp, or with an unparseable timestamp, are
/// skipped individually. A page where the row selector matches nothing is a
/// [`ParseError::NoListings`]: either the layout changed or we were served
/// something other than the results page.
pub fn extract_listings(
    html: &str,
    base_url: &str,
    now: NaiveDateTime,
) -> Result<Vec<Listing>, ParseError> {
    let selectors = Selectors::new();
    let document = Html::parse_document(html);
    let base = Url::parse(base_url).ok();

    let mut listings = Vec::new();
    let mut rows = 0usize;

    for row in document.select(&selectors.row) {
        rows += 1;

        let Some(href) = row.value().attr("href") else {
            warn!("Listing row without href, skipping");
            continue;
        };
        let url = resolve_href(href, base.as_ref());

        let Some(title) = element_text(row, &selectors.title) else {
            warn!("Listing row without title, skipping: {url}");
            continue;
        };
        let Some(time_text) = element_text(row, &selectors.time) else {
            warn!("Listing row without timestamp, skipping: {url}");
            continue;
        };
        let Some(posted_at) = parse_posted_at(&time_text, now) else {
            warn!("Unrecognized date format {time_text:?}, skipping: {url}");
            continue;
        };

        let price = element_text(row, &selectors.price)
            .as_deref()
            .and_then(parse_price);
        let image_url = row
            .select(&selectors.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string);

        listings.push(Listing {
            id: listing_id(&url),
            title,
            price,
            url,
            image_url,
            posted_at,
        });
    }

    if rows == 0 {
        return Err(ParseError::NoListings);
    }

    debug!("Parsed {} listing(s) from {rows} row(s)", listings.len());
    Ok(listings)
}

/// Resolve a row href against the listing page URL; Tori normally serves
/// absolute hrefs, relative ones appear on some cached variants.
fn resolve_href(href: &str, base: Option<&Url>) -> String {
    if let Ok(absolute) = Url::parse(href) {
        return absolute.to_string();
    }
    if let Some(base) = base {
        if let Ok(joined) = base.join(href) {
            return joined.to_string();
        }
    }
    href.to_string()
}
