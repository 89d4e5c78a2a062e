//! Filter, sort and paginate a snapshot of signals for display.
//!
//! Everything here is pure: the same snapshot and query always produce the
//! same page.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use common::{Signal, SignalAction, SignalCategory};

/// Page sizes offered by the dashboard.
pub const PAGE_SIZE_OPTIONS: [usize; 5] = [10, 15, 25, 50, 100];

/// Window of the "recent signals" view; the history view has none.
pub const RECENT_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFilter {
    #[default]
    All,
    Buy,
    Sell,
}

impl ActionFilter {
    fn matches(&self, action: SignalAction) -> bool {
        match self {
            ActionFilter::All => true,
            ActionFilter::Buy => action == SignalAction::Buy,
            ActionFilter::Sell => action == SignalAction::Sell,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Crypto,
    Forex,
    Commodities,
    /// Only favorited signals.
    Watchlist,
}

impl CategoryFilter {
    fn matches(&self, signal: &Signal) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Watchlist => signal.is_favorite,
            CategoryFilter::Crypto => signal.category == SignalCategory::Crypto,
            CategoryFilter::Forex => signal.category == SignalCategory::Forex,
            CategoryFilter::Commodities => signal.category == SignalCategory::Commodities,
        }
    }
}

/// Independent criteria; a signal is shown only if it passes all of them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// Case-insensitive substring of the ticker. Empty matches everything.
    pub search_term: String,
    pub action: ActionFilter,
    pub category: CategoryFilter,
    /// Calendar day the signal must fall on, in the zone passed to `derive`.
    pub selected_date: Option<NaiveDate>,
    /// Oldest signal time still shown.
    pub since: Option<DateTime<Utc>>,
}

impl Filters {
    /// Filters for the dashboard's recent view: last seven days before `now`.
    pub fn recent(now: DateTime<Utc>) -> Self {
        Self {
            since: Some(now - chrono::Duration::days(RECENT_WINDOW_DAYS)),
            ..Self::default()
        }
    }

    pub fn matches<Tz: TimeZone>(&self, signal: &Signal, tz: &Tz) -> bool {
        let search = self.search_term.to_lowercase();
        signal.ticker.to_lowercase().contains(&search)
            && self.action.matches(signal.action)
            && self.category.matches(signal)
            && self
                .selected_date
                .map_or(true, |day| signal.time.with_timezone(tz).date_naive() == day)
            && self.since.map_or(true, |since| signal.time >= since)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Ticker,
    Price,
    Time,
    Action,
    Category,
    IsFavorite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: SortKey::Time,
            direction: SortDirection::Desc,
        }
    }
}

impl SortConfig {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    fn compare(&self, a: &Signal, b: &Signal) -> Ordering {
        let directed = |ord: Ordering| match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        };

        match self.key {
            SortKey::Ticker => directed(a.ticker.cmp(&b.ticker)),
            SortKey::Price => directed(a.price.total_cmp(&b.price)),
            SortKey::Time => directed(a.time.cmp(&b.time)),
            SortKey::Action => directed(a.action.as_str().cmp(b.action.as_str())),
            SortKey::Category => directed(a.category.as_str().cmp(b.category.as_str())),
            // Ties always fall back to most recent first, whatever the direction.
            SortKey::IsFavorite => {
                directed(a.is_favorite.cmp(&b.is_favorite)).then_with(|| b.time.cmp(&a.time))
            }
        }
    }
}

/// Number of signals per page, restricted to `PAGE_SIZE_OPTIONS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct PageSize(usize);

impl PageSize {
    pub fn get(&self) -> usize {
        self.0
    }
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize(15)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        if PAGE_SIZE_OPTIONS.contains(&size) {
            Ok(PageSize(size))
        } else {
            Err(format!(
                "page size must be one of {PAGE_SIZE_OPTIONS:?}, got {size}"
            ))
        }
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> usize {
        size.0
    }
}

/// Everything the table needs to render one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    pub filters: Filters,
    pub sort: SortConfig,
    /// 1-based; 0 is treated as 1.
    pub page: usize,
    pub page_size: PageSize,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            filters: Filters::default(),
            sort: SortConfig::default(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalPage {
    pub items: Vec<Signal>,
    pub page: usize,
    pub page_size: usize,
    /// Filtered count before pagination.
    pub total_items: usize,
    pub total_pages: usize,
}

/// Filter, sort and paginate `signals`. Calendar days are evaluated in `tz`.
pub fn derive<Tz: TimeZone>(signals: &[Signal], query: &ViewQuery, tz: &Tz) -> SignalPage {
    let mut filtered: Vec<&Signal> = signals
        .iter()
        .filter(|s| query.filters.matches(s, tz))
        .collect();

    // `sort_by` is stable, so equal keys keep snapshot order.
    filtered.sort_by(|a, b| query.sort.compare(a, b));

    let page_size = query.page_size.get();
    let page = query.page.max(1);
    let total_items = filtered.len();
    let total_pages = total_items.div_ceil(page_size);

    let items = filtered
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    SignalPage {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}
