//! Admin statistics: submission counts per category over a month or a year.
//!
//! DESIGN
//! ======
//! Every submission collection is reduced to [`Record`]s (category + calendar
//! date), then filtered to the selected period and split into chart buckets:
//! four weeks for a month, four quarters for a year. All ranges are
//! inclusive calendar dates, so time zones never split a day.
//!
//! The fourth week of a month runs to the month's last day so days 29-31 are
//! counted.

use std::fmt;
use std::str::FromStr;

use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime};
use tracing::warn;

use super::store::{Collection, Document, DocumentStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("date out of range: {0}")]
    Date(#[from] time::error::ComponentRange),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("unknown period: {0} (expected 'month' or 'year')")]
    UnknownPeriod(String),
    #[error("unknown category: {0} (expected courses, workshops, clubs, jobs or interns)")]
    UnknownCategory(String),
}

/// Kind of submission counted in statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Courses,
    Workshops,
    Clubs,
    Jobs,
    Interns,
}

impl Category {
    pub const ALL: [Self; 5] = [Self::Courses, Self::Workshops, Self::Clubs, Self::Jobs, Self::Interns];

    #[must_use]
    pub fn collection(self) -> Collection {
        match self {
            Self::Courses => Collection::Applications,
            Self::Workshops => Collection::WorkshopRegistrations,
            Self::Clubs => Collection::ClubApplications,
            Self::Jobs => Collection::JobApplications,
            Self::Interns => Collection::InternApplications,
        }
    }

    /// Document field holding the submission timestamp.
    #[must_use]
    pub fn date_field(self) -> &'static str {
        match self {
            Self::Courses => "submissionDate",
            Self::Workshops => "registrationDate",
            Self::Clubs | Self::Jobs | Self::Interns => "applicationDate",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Courses => "طلبات الدورات",
            Self::Workshops => "تسجيلات الورش",
            Self::Clubs => "طلبات النوادي",
            Self::Jobs => "طلبات التوظيف",
            Self::Interns => "طلبات التدريب",
        }
    }

    /// Whether admins approve and reject submissions of this kind.
    /// Workshop registrations carry their own attendance status instead.
    #[must_use]
    pub fn reviewable(self) -> bool {
        self != Self::Workshops
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Category {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "courses" => Ok(Self::Courses),
            "workshops" => Ok(Self::Workshops),
            "clubs" => Ok(Self::Clubs),
            "jobs" => Ok(Self::Jobs),
            "interns" | "internship" => Ok(Self::Interns),
            other => Err(StatsError::UnknownCategory(other.to_owned())),
        }
    }
}

/// One submission reduced to what statistics need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub category: Category,
    pub date: Date,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Period {
    #[default]
    Month,
    Year,
}

impl FromStr for Period {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(StatsError::UnknownPeriod(other.to_owned())),
        }
    }
}

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Per-category counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    counts: [usize; 5],
}

impl Tally {
    pub fn add(&mut self, category: Category) {
        self.counts[category.index()] += 1;
    }

    #[must_use]
    pub fn get(&self, category: Category) -> usize {
        self.counts[category.index()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// One chart column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub range: DateRange,
    pub tally: Tally,
}

/// Everything the statistics page renders for one period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub period: Period,
    pub range: DateRange,
    pub summary: Tally,
    pub buckets: Vec<Bucket>,
    /// Largest bucket total, for scaling chart bars.
    pub max_total: usize,
}

/// Range covered by `period` around `anchor`.
pub fn period_range(period: Period, anchor: Date) -> Result<DateRange, StatsError> {
    match period {
        Period::Month => month_range(anchor.year(), anchor.month()),
        Period::Year => Ok(DateRange {
            start: Date::from_calendar_date(anchor.year(), Month::January, 1)?,
            end: Date::from_calendar_date(anchor.year(), Month::December, 31)?,
        }),
    }
}

fn month_range(year: i32, month: Month) -> Result<DateRange, StatsError> {
    let start = Date::from_calendar_date(year, month, 1)?;
    let mut end = Date::from_calendar_date(year, month, 28)?;
    while let Some(next) = end.next_day().filter(|d| d.month() == month) {
        end = next;
    }
    Ok(DateRange { start, end })
}

/// Chart buckets for `period`: weeks of the month or quarters of the year.
pub fn bucket_ranges(period: Period, anchor: Date) -> Result<Vec<(String, DateRange)>, StatsError> {
    match period {
        Period::Month => {
            let month = month_range(anchor.year(), anchor.month())?;
            let weeks = (1..=4i64)
                .map(|week| {
                    let start = month.start.saturating_add(Duration::days(7 * (week - 1)));
                    let end = if week == 4 { month.end } else { start.saturating_add(Duration::days(6)) };
                    (format!("الأسبوع {week}"), DateRange { start, end })
                })
                .collect();
            Ok(weeks)
        }
        Period::Year => {
            const QUARTERS: [&str; 4] = ["الربع الأول", "الربع الثاني", "الربع الثالث", "الربع الرابع"];
            let mut out = Vec::with_capacity(4);
            for (q, label) in (0u8..).zip(QUARTERS) {
                let first = month_range(anchor.year(), Month::try_from(q * 3 + 1)?)?;
                let last = month_range(anchor.year(), Month::try_from(q * 3 + 3)?)?;
                out.push((label.to_owned(), DateRange { start: first.start, end: last.end }));
            }
            Ok(out)
        }
    }
}

/// Filter `records` to the period around `anchor` and aggregate them.
pub fn report(records: &[Record], period: Period, anchor: Date) -> Result<Report, StatsError> {
    let range = period_range(period, anchor)?;
    let in_period: Vec<&Record> = records.iter().filter(|r| range.contains(r.date)).collect();

    let mut summary = Tally::default();
    for record in &in_period {
        summary.add(record.category);
    }

    let buckets: Vec<Bucket> = bucket_ranges(period, anchor)?
        .into_iter()
        .map(|(label, range)| {
            let mut tally = Tally::default();
            for record in in_period.iter().filter(|r| range.contains(r.date)) {
                tally.add(record.category);
            }
            Bucket { label, range, tally }
        })
        .collect();
    let max_total = buckets.iter().map(|b| b.tally.total()).max().unwrap_or(0);

    Ok(Report { period, range, summary, buckets, max_total })
}

/// Reduce stored documents of one category to records.
///
/// Documents without a parseable RFC 3339 timestamp are skipped.
#[must_use]
pub fn extract_records(category: Category, docs: &[Document]) -> Vec<Record> {
    docs.iter()
        .filter_map(|doc| {
            let raw = doc.data.get(category.date_field()).and_then(|v| v.as_str());
            match raw.map(|s| OffsetDateTime::parse(s, &Rfc3339)) {
                Some(Ok(ts)) => Some(Record { category, date: ts.date() }),
                _ => {
                    warn!(collection = category.collection().name(), id = %doc.id, "skipping document without valid date");
                    None
                }
            }
        })
        .collect()
}

/// Load records for every category from the store.
pub async fn load_records(store: &dyn DocumentStore) -> Result<Vec<Record>, StatsError> {
    let mut records = Vec::new();
    for category in Category::ALL {
        let docs = store.list(category.collection()).await?;
        records.extend(extract_records(category, &docs));
    }
    Ok(records)
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
