use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One analyst action on one ticker. `(ticker, time)` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub ticker: String,
    pub company: String,
    pub brokerage: String,
    pub action: String,
    pub rating_from: String,
    pub rating_to: String,
    pub target_from: f64,
    pub target_to: f64,
    pub time: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RatingEvent {
    pub fn same_key(&self, other: &RatingEvent) -> bool {
        self.ticker == other.ticker && self.time == other.time
    }

    /// Copies every mutable field from `other`, leaving the natural key alone.
    pub fn apply_update(&mut self, other: &RatingEvent, updated_at: DateTime<Utc>) {
        self.company = other.company.clone();
        self.brokerage = other.brokerage.clone();
        self.action = other.action.clone();
        self.rating_from = other.rating_from.clone();
        self.rating_to = other.rating_to.clone();
        self.target_from = other.target_from;
        self.target_to = other.target_to;
        self.updated_at = updated_at;
    }
}

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    /// Non-positive inputs fall back to the defaults (page 1, 20 per page).
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page },
            page_size: if page_size < 1 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPage {
    #[serde(rename = "stocks")]
    pub events: Vec<RatingEvent>,
    pub total_count: i64,
    pub page_size: i64,
    pub page: i64,
    pub total_pages: i64,
}

impl EventPage {
    pub fn new(events: Vec<RatingEvent>, total_count: i64, request: PageRequest) -> Self {
        Self {
            events,
            total_count,
            page_size: request.page_size,
            page: request.page,
            total_pages: total_pages(total_count, request.page_size),
        }
    }
}

pub fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if total_count <= 0 || page_size <= 0 {
        return 0;
    }
    total_count / page_size + i64::from(total_count % page_size != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_request() {
        let req = PageRequest::new(0, -5);
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, 20);
        assert_eq!(req.offset(), 0);

        let req = PageRequest::new(3, 10);
        assert_eq!(req.offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(45, 20), 3);
        assert_eq!(total_pages(40, 20), 2);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(0, 20), 0);
    }

    #[test]
    fn huge_page_size_is_a_single_page() {
        assert_eq!(total_pages(45, i64::MAX), 1);
        assert_eq!(total_pages(i64::MAX, i64::MAX), 1);
        assert_eq!(total_pages(i64::MAX, 1), i64::MAX);

        let page = EventPage::new(vec![], 45, PageRequest::new(1, i64::MAX));
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page_size, i64::MAX);
    }
}
