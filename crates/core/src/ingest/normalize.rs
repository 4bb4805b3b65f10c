use crate::domain::rating_event::RatingEvent;
use crate::ingest::types::RawItem;
use chrono::{DateTime, SubsecRound, Utc};

/// Strips a leading `$` and parses the rest. `None` when the value is not a
/// finite number.
pub fn parse_target_price_strict(raw: &str) -> Option<f64> {
    let s = raw.trim();
    let s = s.strip_prefix('$').unwrap_or(s).trim();
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Malformed prices resolve to `0.0`.
pub fn parse_target_price(raw: &str) -> f64 {
    parse_target_price_strict(raw).unwrap_or(0.0)
}

#[derive(Debug, Default)]
pub struct NormalizedPage {
    pub events: Vec<RatingEvent>,
    pub malformed_prices: u64,
}

pub fn normalize_items(items: Vec<RawItem>, now: DateTime<Utc>) -> NormalizedPage {
    let mut out = NormalizedPage {
        events: Vec::with_capacity(items.len()),
        malformed_prices: 0,
    };

    for item in items {
        let target_from = price_or_zero(&item, &item.target_from, "target_from", &mut out);
        let target_to = price_or_zero(&item, &item.target_to, "target_to", &mut out);

        out.events.push(RatingEvent {
            ticker: item.ticker,
            company: item.company,
            brokerage: item.brokerage,
            action: item.action,
            rating_from: item.rating_from,
            rating_to: item.rating_to,
            target_from,
            target_to,
            // Postgres keeps microseconds; the natural key must compare the same in every store.
            time: item.time.trunc_subsecs(6),
            updated_at: now,
        });
    }

    out
}

fn price_or_zero(item: &RawItem, raw: &str, field: &'static str, out: &mut NormalizedPage) -> f64 {
    match parse_target_price_strict(raw) {
        Some(v) => v,
        None => {
            out.malformed_prices += 1;
            tracing::warn!(
                ticker = %item.ticker,
                time = %item.time,
                field,
                raw,
                "unparsable target price; using 0.0"
            );
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(target_from: &str, target_to: &str) -> RawItem {
        RawItem {
            ticker: "AKBA".to_string(),
            company: "Akebia Therapeutics".to_string(),
            brokerage: "HC Wainwright".to_string(),
            action: "target raised by".to_string(),
            rating_from: "Buy".to_string(),
            rating_to: "Buy".to_string(),
            target_from: target_from.to_string(),
            target_to: target_to.to_string(),
            time: Utc.with_ymd_and_hms(2025, 1, 10, 0, 30, 0).unwrap(),
        }
    }

    #[test]
    fn parses_currency_strings() {
        assert_eq!(parse_target_price("$33.00"), 33.0);
        assert_eq!(parse_target_price("4.70"), 4.7);
        assert_eq!(parse_target_price(" $1250.50 "), 1250.5);
    }

    #[test]
    fn malformed_prices_default_to_zero() {
        assert_eq!(parse_target_price("N/A"), 0.0);
        assert_eq!(parse_target_price(""), 0.0);
        assert_eq!(parse_target_price("$"), 0.0);
        assert_eq!(parse_target_price("$NaN"), 0.0);
        assert_eq!(parse_target_price("$1,250.50"), 0.0);
        assert_eq!(parse_target_price_strict("N/A"), None);
    }

    #[test]
    fn normalizes_and_counts_malformed_prices() {
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap();
        let page = normalize_items(vec![raw("$2.00", "$8.00"), raw("bogus", "$3.00")], now);

        assert_eq!(page.events.len(), 2);
        assert_eq!(page.malformed_prices, 1);
        assert_eq!(page.events[0].target_from, 2.0);
        assert_eq!(page.events[0].target_to, 8.0);
        assert_eq!(page.events[1].target_from, 0.0);
        assert_eq!(page.events[1].target_to, 3.0);
        assert_eq!(page.events[0].updated_at, now);
        assert_eq!(page.events[0].ticker, "AKBA");
    }

    #[test]
    fn truncates_time_to_microseconds() {
        let mut item = raw("$1.00", "$2.00");
        item.time = "2025-01-13T00:30:05.813548892Z".parse().unwrap();

        let page = normalize_items(vec![item], Utc::now());
        let expected: DateTime<Utc> = "2025-01-13T00:30:05.813548Z".parse().unwrap();
        assert_eq!(page.events[0].time, expected);
    }
}
