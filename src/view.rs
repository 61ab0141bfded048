//! Derived view data
//!
//! Pure functions computing what the subscriber table and dashboard cards
//! show. Nothing here touches egui, so the filter/sort/paginate pipeline can
//! be tested on plain vectors.

use crate::api::{Stats, Subscriber, SubscriberStatus, SystemStatus};
use crate::state::UiState;
use chrono::{DateTime, Local, Utc};

/// Rows per table page
pub const ITEMS_PER_PAGE: usize = 10;

/// Size of the sending quota the progress bar is measured against
pub const DAILY_QUOTA: u64 = 100;

/// Conversation bodies are cut to this many characters
pub const PREVIEW_LIMIT: usize = 500;

/// Sortable table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    /// Number of opens
    Opens,
    /// Number of clicks
    Clicks,
}

impl SortColumn {
    fn key(self, sub: &Subscriber) -> u64 {
        match self {
            SortColumn::Opens => sub.opens,
            SortColumn::Clicks => sub.clicks,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first
    Desc,
}

impl SortDirection {
    /// The opposite direction
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Arrow shown next to the active column header
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    /// Column being sorted
    pub column: SortColumn,
    /// Direction of the sort
    pub direction: SortDirection,
}

impl SortState {
    /// Sort state after a click on `column`
    ///
    /// Clicking the active column flips its direction; any other column
    /// starts descending.
    pub fn after_click(current: Option<SortState>, column: SortColumn) -> SortState {
        match current {
            Some(state) if state.column == column => SortState {
                column,
                direction: state.direction.flipped(),
            },
            _ => SortState {
                column,
                direction: SortDirection::Desc,
            },
        }
    }
}

/// Subscribers whose name or email contains `term`, case-insensitively
pub fn filter_subscribers<'a>(subscribers: &'a [Subscriber], term: &str) -> Vec<&'a Subscriber> {
    let needle = term.to_lowercase();
    subscribers
        .iter()
        .filter(|sub| {
            sub.name.to_lowercase().contains(&needle) || sub.email.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable in-place sort of table rows
pub fn sort_subscribers(rows: &mut [&Subscriber], sort: SortState) {
    let column = sort.column;
    match sort.direction {
        SortDirection::Asc => rows.sort_by_key(|sub| column.key(sub)),
        SortDirection::Desc => rows.sort_by(|a, b| column.key(b).cmp(&column.key(a))),
    }
}

/// Number of pages needed for `total` rows
pub fn page_count(total: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    total.div_ceil(per_page)
}

/// One page of the subscriber table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageView<'a> {
    /// Rows on this page
    pub rows: Vec<&'a Subscriber>,
    /// 1-based page actually shown
    pub page: usize,
    /// Number of pages for the current filter
    pub total_pages: usize,
    /// Rows matching the current filter
    pub total_filtered: usize,
}

impl PageView<'_> {
    /// "Previous" is enabled everywhere except the first page
    pub fn prev_enabled(&self) -> bool {
        self.page > 1
    }

    /// "Next" is enabled everywhere except the last page
    pub fn next_enabled(&self) -> bool {
        self.page < self.total_pages
    }

    /// The pager is only shown when there is more than one page
    pub fn show_pagination(&self) -> bool {
        self.total_pages > 1
    }

    /// Nothing matched the filter
    pub fn is_empty(&self) -> bool {
        self.total_filtered == 0
    }
}

/// Slice out one page; out-of-range pages are clamped to the nearest valid one
pub fn paginate<'a>(rows: Vec<&'a Subscriber>, page: usize, per_page: usize) -> PageView<'a> {
    let total_filtered = rows.len();
    let total_pages = page_count(total_filtered, per_page);
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * per_page;
    let rows = rows.into_iter().skip(start).take(per_page).collect();

    PageView {
        rows,
        page,
        total_pages,
        total_filtered,
    }
}

/// Filter, sort, and paginate the cached subscribers for the table
///
/// The date-range filter held in `ui` is intentionally not applied here.
pub fn compute_visible_rows<'a>(subscribers: &'a [Subscriber], ui: &UiState) -> PageView<'a> {
    let mut rows = filter_subscribers(subscribers, &ui.search_term);
    if let Some(sort) = ui.sort {
        sort_subscribers(&mut rows, sort);
    }
    paginate(rows, ui.current_page, ui.items_per_page)
}

/// Clicks per open as a percentage; zero when there are no opens
pub fn click_rate(sub: &Subscriber) -> f64 {
    if sub.opens > 0 {
        sub.clicks as f64 / sub.opens as f64 * 100.0
    } else {
        0.0
    }
}

/// Click rate with one decimal, or a bare `0` when there are no opens
pub fn format_click_rate(sub: &Subscriber) -> String {
    if sub.opens > 0 {
        format!("{:.1}", click_rate(sub))
    } else {
        "0".to_string()
    }
}

/// Colour band of the quota bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaLevel {
    /// At most 80% used
    Normal,
    /// More than 80% used
    Warning,
    /// More than 90% used
    Danger,
}

/// Quota consumption derived from the remaining-emails counter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaUsage {
    /// Percentage of the quota already used
    pub percent_used: f64,
    /// Colour band
    pub level: QuotaLevel,
}

/// How much of the sending quota is used up
pub fn quota_usage(stats: &Stats) -> QuotaUsage {
    let used = DAILY_QUOTA.saturating_sub(stats.remaining_emails);
    let percent_used = used as f64 / DAILY_QUOTA as f64 * 100.0;
    let level = if percent_used > 90.0 {
        QuotaLevel::Danger
    } else if percent_used > 80.0 {
        QuotaLevel::Warning
    } else {
        QuotaLevel::Normal
    };
    QuotaUsage {
        percent_used,
        level,
    }
}

/// Text next to the status dot
pub fn system_status_label(status: SystemStatus) -> &'static str {
    match status {
        SystemStatus::Online => "System Online",
        SystemStatus::Offline => "System Offline",
    }
}

/// Text of a subscriber's status badge
pub fn status_badge_label(status: SubscriberStatus) -> &'static str {
    match status {
        SubscriberStatus::Active => "✓ Active",
        SubscriberStatus::Unsubscribed => "✗ Unsubscribed",
    }
}

/// Body text cut to [`PREVIEW_LIMIT`] characters
pub fn preview_body(body: &str) -> String {
    match body.char_indices().nth(PREVIEW_LIMIT) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Local calendar date of a message, or `Unknown date`
pub fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.with_timezone(&Local).format("%Y-%m-%d").to_string(),
        None => "Unknown date".to_string(),
    }
}
