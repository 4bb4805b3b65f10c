use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingCategory {
    Positive,
    Neutral,
    Negative,
}

static RATING_CATEGORIES: LazyLock<HashMap<&'static str, RatingCategory>> = LazyLock::new(|| {
    use RatingCategory::*;

    HashMap::from([
        ("Buy", Positive),
        ("Strong-Buy", Positive),
        ("Outperform", Positive),
        ("Outperformer", Positive),
        ("Overweight", Positive),
        ("Positive", Positive),
        ("Market Outperform", Positive),
        ("Sector Outperform", Positive),
        ("Hold", Neutral),
        ("Neutral", Neutral),
        ("Equal Weight", Neutral),
        ("Market Perform", Neutral),
        ("Sector Perform", Neutral),
        ("In-Line", Neutral),
        ("Inline", Neutral),
        ("Peer Perform", Neutral),
        ("Sector Weight", Neutral),
        ("Sell", Negative),
        ("Reduce", Negative),
        ("Underperform", Negative),
        ("Underweight", Negative),
        ("Negative", Negative),
        ("Sector Underperform", Negative),
    ])
});

impl RatingCategory {
    /// Exact, case-sensitive label lookup. Unknown labels are `Neutral`.
    pub fn of(label: &str) -> Self {
        RATING_CATEGORIES
            .get(label)
            .copied()
            .unwrap_or(RatingCategory::Neutral)
    }

    pub fn score(self) -> i32 {
        match self {
            RatingCategory::Positive => 5,
            RatingCategory::Neutral => 3,
            RatingCategory::Negative => 1,
        }
    }
}

pub fn rating_score(label: &str) -> i32 {
    RatingCategory::of(label).score()
}
