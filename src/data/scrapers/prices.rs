//! LiveFPL price-change page parser
//!
//! Each player on the page is a `<div>` carrying `data-id`, `data-now` and
//! `data-tonight` attributes. Other elements may carry `data-id` too (team
//! pickers, table rows) and are ignored. The page is not under our control, so parsing is
//! best effort: a value that is not a number becomes `None`, and when no
//! element carries `data-id` at all the raw text is scanned instead.

use crate::{PlayerId, PriceRecord, PriceSnapshot};
use chrono::{SecondsFormat, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Characters after a bare `data-id` searched for its sibling attributes
pub const FALLBACK_WINDOW: usize = 300;

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-id\s*=\s*["']?(\d+)["']?"#).expect("valid regex"));
static BARE_NOW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"data-now\s*=\s*["']?([^"'>\s]+)["']?"#).expect("valid regex"));
static BARE_TONIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"data-tonight\s*=\s*["']?([^"'>\s]+)["']?"#).expect("valid regex")
});

/// Parse the page and stamp it with the current UTC time
pub fn snapshot(html: &str) -> PriceSnapshot {
    PriceSnapshot {
        players: parse_prices(html),
        fetched_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    }
}

/// Extract one record per player id, in first-seen order
pub fn parse_prices(html: &str) -> Vec<PriceRecord> {
    let mut records = parse_tagged_elements(html);

    if records.is_empty() {
        records = parse_attribute_windows(html);
        if !records.is_empty() {
            log::debug!("Recovered {} price records from raw text", records.len());
        }
    }

    dedup_first_wins(records)
}

/// `<div>` elements that carry `data-id` themselves
fn parse_tagged_elements(html: &str) -> Vec<PriceRecord> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("div[data-id]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let attrs = element.value();
            let id = parse_id(attrs.attr("data-id")?)?;
            Some(PriceRecord {
                id,
                pct_now: attrs.attr("data-now").and_then(parse_pct),
                pct_tonight: attrs.attr("data-tonight").and_then(parse_pct),
            })
        })
        .collect()
}

/// Bare `data-id` matches anywhere in the text, with attributes taken from a
/// fixed window after each match. Dense markup can attribute a neighbour's
/// values to an id.
fn parse_attribute_windows(html: &str) -> Vec<PriceRecord> {
    BARE_ID
        .captures_iter(html)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let id = caps.get(1)?.as_str().parse().ok().map(PlayerId)?;
            let window = char_window(html, whole.start(), FALLBACK_WINDOW);
            Some(PriceRecord {
                id,
                pct_now: capture_pct(&BARE_NOW, window),
                pct_tonight: capture_pct(&BARE_TONIGHT, window),
            })
        })
        .collect()
}

fn capture_pct(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_pct(m.as_str()))
}

/// Up to `chars` characters of `text` starting at byte offset `start`
fn char_window(text: &str, start: usize, chars: usize) -> &str {
    let rest = &text[start..];
    match rest.char_indices().nth(chars) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}

/// Leading digits of an id attribute
fn parse_id(value: &str) -> Option<PlayerId> {
    let value = value.trim();
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok().map(PlayerId)
}

/// First token of a percentage attribute as a finite float
fn parse_pct(value: &str) -> Option<f64> {
    value
        .split_whitespace()
        .next()?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn dedup_first_wins(records: Vec<PriceRecord>) -> Vec<PriceRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, now: Option<f64>, tonight: Option<f64>) -> PriceRecord {
        PriceRecord {
            id: PlayerId(id),
            pct_now: now,
            pct_tonight: tonight,
        }
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let html = r#"<div data-id="10" data-now="5.2" data-tonight="-1.1"></div><div data-id="10" data-now="9.9"></div>"#;
        assert_eq!(parse_prices(html), vec![record(10, Some(5.2), Some(-1.1))]);
    }

    #[test]
    fn test_quoting_and_spacing_variants() {
        let html = r#"
            <div data-id = '1' data-now = '12.5' data-tonight=3></div>
            <div data-id=2 data-now="-0.75"></div>
            <DIV DATA-ID="3" data-tonight="101"></DIV>
        "#;
        assert_eq!(
            parse_prices(html),
            vec![
                record(1, Some(12.5), Some(3.0)),
                record(2, Some(-0.75), None),
                record(3, None, Some(101.0)),
            ]
        );
    }

    #[test]
    fn test_only_div_elements_are_players() {
        let html = r#"
            <select><option data-id="10">Arsenal</option></select>
            <div data-id="10" data-now="5.2" data-tonight="-1.1"></div>
            <a data-id="11" data-now="9"></a>
        "#;
        assert_eq!(parse_prices(html), vec![record(10, Some(5.2), Some(-1.1))]);
    }

    #[test]
    fn test_non_div_data_id_alone_falls_back_to_text_scan() {
        let html = r#"<tr data-id="12" data-now="1.5"></tr>"#;
        assert_eq!(parse_prices(html), vec![record(12, Some(1.5), None)]);
    }

    #[test]
    fn test_non_numeric_values_become_none() {
        let html = r#"<div data-id="5" data-now="N/A" data-tonight="nan"></div><div data-id="6" data-now=""></div>"#;
        assert_eq!(
            parse_prices(html),
            vec![record(5, None, None), record(6, None, None)]
        );
    }

    #[test]
    fn test_non_numeric_id_is_dropped() {
        let html = r#"<div data-id="abc" data-now="1"></div><div data-id="7" data-now="2"></div>"#;
        assert_eq!(parse_prices(html), vec![record(7, Some(2.0), None)]);
    }

    #[test]
    fn test_order_is_first_seen() {
        let html = r#"<div data-id="30"></div><div data-id="10"></div><div data-id="30" data-now="1"></div><div data-id="20"></div>"#;
        let ids: Vec<u64> = parse_prices(html).iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![30, 10, 20]);
    }

    #[test]
    fn test_fallback_scans_raw_text() {
        // No element carries data-id, so only the text scan can find it
        let html = r#"<!-- data-id="42" --><span data-now="3.5" data-tonight='-2'></span>"#;
        assert_eq!(parse_prices(html), vec![record(42, Some(3.5), Some(-2.0))]);
    }

    #[test]
    fn test_fallback_window_is_bounded() {
        let padding = "x".repeat(FALLBACK_WINDOW);
        let html = format!(r#"<!-- data-id="8" {} --><i data-now="4.0"></i>"#, padding);
        assert_eq!(parse_prices(&html), vec![record(8, None, None)]);
    }

    #[test]
    fn test_fallback_window_respects_char_boundaries() {
        let padding = "é".repeat(FALLBACK_WINDOW);
        let html = format!(r#"<!-- data-id="9" -->{}"#, padding);
        assert_eq!(parse_prices(&html), vec![record(9, None, None)]);
    }

    #[test]
    fn test_fallback_not_used_when_elements_found() {
        let html = r#"<div data-id="1"></div><!-- data-id="2" data-now="1" -->"#;
        assert_eq!(parse_prices(html), vec![record(1, None, None)]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let html = r#"<div data-id="3" data-now="1.5"></div><div data-id="4" data-tonight="2"></div>"#;
        assert_eq!(parse_prices(html), parse_prices(html));
    }

    #[test]
    fn test_empty_page() {
        assert!(parse_prices("").is_empty());
        assert!(parse_prices("<html><body>maintenance</body></html>").is_empty());
    }

    #[test]
    fn test_snapshot_timestamp_format() {
        let snap = snapshot(r#"<div data-id="1"></div>"#);
        assert_eq!(snap.players.len(), 1);
        assert!(snap.fetched_at.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&snap.fetched_at).is_ok());
    }

    #[test]
    fn test_helpers() {
        assert_eq!(parse_id(" 15 "), Some(PlayerId(15)));
        assert_eq!(parse_id("15abc"), Some(PlayerId(15)));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_pct(" 2.5 "), Some(2.5));
        assert_eq!(parse_pct("inf"), None);
        assert_eq!(char_window("abcdef", 2, 3), "cde");
        assert_eq!(char_window("abc", 1, 10), "bc");
    }
}
