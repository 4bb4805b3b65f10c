use crate::domain::rating::rating_score;
use crate::domain::rating_event::RatingEvent;

const UPGRADE_ACTION: &str = "upgraded by";
const DOWNGRADE_ACTION: &str = "downgraded by";

const SIGNIFICANT_TARGET_CHANGE_PCT: f64 = 10.0;
const RATING_DELTA_WEIGHT: f64 = 0.5;
const POSITIVE_RATING_SCORE: i32 = 5;
// Category scores top out at 5, so this tier is never reached today.
const STRONG_RATING_SCORE: i32 = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct EventScore {
    pub score: f64,
    pub reason: String,
}

/// Sums the action, target-change, rating-delta and rating-strength factors.
/// Reasons are joined with `", "` in that order.
pub fn score_event(event: &RatingEvent) -> EventScore {
    let mut score = 0.0;
    let mut reasons: Vec<&'static str> = Vec::with_capacity(4);

    match event.action.as_str() {
        UPGRADE_ACTION => {
            score += 2.0;
            reasons.push("Stock was recently upgraded");
        }
        DOWNGRADE_ACTION => {
            score -= 2.0;
            reasons.push("Stock was recently downgraded");
        }
        _ => {}
    }

    let pct = target_change_pct(event.target_from, event.target_to);
    if pct > SIGNIFICANT_TARGET_CHANGE_PCT {
        score += 2.0;
        reasons.push("Target price increased significantly");
    } else if pct > 0.0 {
        score += 1.0;
        reasons.push("Target price increased");
    } else if pct < -SIGNIFICANT_TARGET_CHANGE_PCT {
        score -= 2.0;
        reasons.push("Target price decreased significantly");
    } else if pct < 0.0 {
        score -= 1.0;
        reasons.push("Target price decreased");
    }

    let from_score = rating_score(&event.rating_from);
    let to_score = rating_score(&event.rating_to);
    let delta = to_score - from_score;
    if delta > 0 {
        score += f64::from(delta) * RATING_DELTA_WEIGHT;
        reasons.push("Rating improved");
    } else if delta < 0 {
        score += f64::from(delta) * RATING_DELTA_WEIGHT;
        reasons.push("Rating downgraded");
    } else if to_score >= POSITIVE_RATING_SCORE {
        score += 0.5;
        reasons.push("Maintained positive rating");
    }

    if to_score >= STRONG_RATING_SCORE {
        score += 2.0;
        reasons.push("Strong positive rating");
    } else if to_score >= POSITIVE_RATING_SCORE {
        score += 1.0;
        reasons.push("Positive rating");
    }

    EventScore {
        score,
        reason: reasons.join(", "),
    }
}

/// Percent change from `from` to `to`; zero when `from` is not positive.
pub fn target_change_pct(from: f64, to: f64) -> f64 {
    if from > 0.0 {
        (to - from) / from * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(action: &str, rating_from: &str, rating_to: &str, from: f64, to: f64) -> RatingEvent {
        let time = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        RatingEvent {
            ticker: "NVDA".to_string(),
            company: "NVIDIA".to_string(),
            brokerage: "Citigroup".to_string(),
            action: action.to_string(),
            rating_from: rating_from.to_string(),
            rating_to: rating_to.to_string(),
            target_from: from,
            target_to: to,
            time,
            updated_at: time,
        }
    }

    #[test]
    fn upgrade_with_big_target_raise() {
        let s = score_event(&event("upgraded by", "Hold", "Buy", 150.0, 200.0));
        assert!((s.score - 6.0).abs() < 1e-9);
        assert_eq!(
            s.reason,
            "Stock was recently upgraded, Target price increased significantly, Rating improved, Positive rating"
        );
    }

    #[test]
    fn downgrade_to_sell_is_negative() {
        let s = score_event(&event("downgraded by", "Buy", "Sell", 120.0, 90.0));
        // -2 (downgrade) -2 (target -25%) -2 (rating 5 -> 1)
        assert!((s.score + 6.0).abs() < 1e-9);
        assert_eq!(
            s.reason,
            "Stock was recently downgraded, Target price decreased significantly, Rating downgraded"
        );
    }

    #[test]
    fn maintained_positive_rating_with_small_raise() {
        let s = score_event(&event("target raised by", "Buy", "Outperform", 100.0, 105.0));
        assert!((s.score - 2.5).abs() < 1e-9);
        assert_eq!(
            s.reason,
            "Target price increased, Maintained positive rating, Positive rating"
        );
    }

    #[test]
    fn target_thresholds_are_exclusive_at_ten_percent() {
        let s = score_event(&event("target raised by", "Hold", "Hold", 100.0, 110.0));
        assert_eq!(s.score, 1.0);
        assert_eq!(s.reason, "Target price increased");

        let s = score_event(&event("target lowered by", "Hold", "Hold", 100.0, 90.0));
        assert_eq!(s.score, -1.0);
        assert_eq!(s.reason, "Target price decreased");

        let s = score_event(&event("target lowered by", "Hold", "Hold", 100.0, 89.0));
        assert_eq!(s.score, -2.0);
    }

    #[test]
    fn neutral_event_contributes_nothing() {
        let s = score_event(&event("reiterated by", "Hold", "Neutral", 50.0, 50.0));
        assert_eq!(s.score, 0.0);
        assert_eq!(s.reason, "");
    }

    #[test]
    fn zero_or_missing_base_target_is_ignored() {
        assert_eq!(target_change_pct(0.0, 40.0), 0.0);
        assert_eq!(target_change_pct(-5.0, 40.0), 0.0);

        let s = score_event(&event("initiated by", "", "Underweight", 0.0, 40.0));
        assert_eq!(s.score, -1.0);
        assert_eq!(s.reason, "Rating downgraded");
    }

    #[test]
    fn unknown_ratings_score_as_neutral() {
        let s = score_event(&event("upgraded by", "Speculative", "Top Pick", 10.0, 10.0));
        assert_eq!(s.score, 2.0);
        assert_eq!(s.reason, "Stock was recently upgraded");
    }
}
