use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::activity::ActivityCategory;
use super::expense::{Cents, ExpenseCategory};
use super::trip::TripStatus;
use crate::errors::AppError;
use crate::utils::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// The fields of a trip the aggregates need.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct TripSpan {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: TripStatus,
}

impl TripSpan {
    /// Inclusive length in days; open-ended trips have none.
    pub fn days(&self) -> Option<i64> {
        self.end_date
            .map(|end| (end - self.start_date).num_days() + 1)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Serialize, Debug, PartialEq)]
pub struct TripStatistics {
    pub total_trips: i64,
    pub planned_trips: i64,
    pub ongoing_trips: i64,
    pub completed_trips: i64,
    pub trips_this_year: i64,
    pub trips_by_year: BTreeMap<i32, i64>,
    pub average_trip_duration: f64,
}

impl TripStatistics {
    pub fn from_spans(spans: &[TripSpan], current_year: i32) -> Self {
        let count = |status: TripStatus| spans.iter().filter(|s| s.status == status).count() as i64;

        let mut trips_by_year = BTreeMap::new();
        for span in spans {
            *trips_by_year.entry(span.start_date.year()).or_insert(0) += 1;
        }

        let durations: Vec<i64> = spans.iter().filter_map(TripSpan::days).collect();
        let average_trip_duration = if durations.is_empty() {
            0.0
        } else {
            round1(durations.iter().sum::<i64>() as f64 / durations.len() as f64)
        };

        TripStatistics {
            total_trips: spans.len() as i64,
            planned_trips: count(TripStatus::Planned),
            ongoing_trips: count(TripStatus::Ongoing),
            completed_trips: count(TripStatus::Completed),
            trips_this_year: trips_by_year.get(&current_year).copied().unwrap_or(0),
            trips_by_year,
            average_trip_duration,
        }
    }
}

/// Days spent on completed trips with a known end.
pub fn total_days_traveled(spans: &[TripSpan]) -> i64 {
    spans
        .iter()
        .filter(|s| s.status == TripStatus::Completed)
        .filter_map(TripSpan::days)
        .sum()
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ActivityStatistics {
    pub total_activities: i64,
    pub activities_by_category: BTreeMap<&'static str, i64>,
}

impl ActivityStatistics {
    /// Every category is listed, including those without activities.
    pub fn from_counts(counts: &[(ActivityCategory, i64)]) -> Self {
        let mut activities_by_category: BTreeMap<&'static str, i64> =
            ActivityCategory::ALL.iter().map(|c| (c.as_str(), 0)).collect();
        for (category, count) in counts {
            *activities_by_category.entry(category.as_str()).or_insert(0) += count;
        }

        ActivityStatistics {
            total_activities: counts.iter().map(|(_, count)| count).sum(),
            activities_by_category,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct MemoryStatistics {
    pub total_memories: i64,
    pub memories_this_year: i64,
    pub memories_by_trip: BTreeMap<Uuid, i64>,
}

#[derive(Serialize, Debug)]
pub struct ExpenseStatistics {
    pub total_expenses: i64,
    pub total_amount_by_currency: BTreeMap<String, Cents>,
    pub expenses_by_category: BTreeMap<&'static str, Cents>,
    pub average_expense: Cents,
}

/// Spending per category with every category listed.
pub fn spending_by_category(totals: &[(ExpenseCategory, Cents)]) -> BTreeMap<&'static str, Cents> {
    let mut by_category: BTreeMap<&'static str, Cents> =
        ExpenseCategory::ALL.iter().map(|c| (c.as_str(), Cents::default())).collect();
    for (category, amount) in totals {
        let entry = by_category.entry(category.as_str()).or_default();
        *entry = *entry + *amount;
    }
    by_category
}

/// Mean of `total` over `count` expenses, rounded to the cent.
pub fn average_cents(total: Cents, count: i64) -> Cents {
    if count <= 0 {
        return Cents::default();
    }
    Cents((total.0 as f64 / count as f64).round() as i64)
}

#[derive(Serialize, Debug)]
pub struct PackingStatistics {
    pub total_packing_items: i64,
    pub packed_items: i64,
    pub packing_completion_rate: f64,
}

#[derive(Serialize, Debug)]
pub struct OverallStatistics {
    pub trips: TripStatistics,
    pub activities: ActivityStatistics,
    pub memories: MemoryStatistics,
    pub expenses: ExpenseStatistics,
    pub packing: PackingStatistics,
    pub total_days_traveled: i64,
    pub member_since: NaiveDate,
}

/// Trip-derived part of a year in review.
#[derive(Debug, PartialEq)]
pub struct YearSpans {
    pub total_days_traveled: i64,
    pub longest_trip_days: i64,
    pub longest_trip_title: Option<String>,
    pub trips_by_month: BTreeMap<String, i64>,
    pub most_active_month: Option<String>,
}

impl YearSpans {
    pub fn from_spans(spans: &[TripSpan]) -> Self {
        let mut longest: Option<(&TripSpan, i64)> = None;
        for span in spans {
            if let Some(days) = span.days() {
                // Strictly longer, so the earliest listed trip wins a tie.
                if longest.map_or(true, |(_, best)| days > best) {
                    longest = Some((span, days));
                }
            }
        }

        let mut by_month = [0i64; 12];
        for span in spans {
            by_month[span.start_date.month0() as usize] += 1;
        }
        let month_name = |month0: usize| {
            NaiveDate::from_ymd_opt(2000, month0 as u32 + 1, 1)
                .map(|d| d.format("%B").to_string())
                .unwrap_or_default()
        };

        let mut most_active: Option<(usize, i64)> = None;
        for (month0, &count) in by_month.iter().enumerate() {
            if count > 0 && most_active.map_or(true, |(_, best)| count > best) {
                most_active = Some((month0, count));
            }
        }

        YearSpans {
            total_days_traveled: spans.iter().filter_map(TripSpan::days).sum(),
            longest_trip_days: longest.map_or(0, |(_, days)| days),
            longest_trip_title: longest.map(|(span, _)| span.title.clone()),
            trips_by_month: by_month
                .iter()
                .enumerate()
                .filter(|(_, count)| **count > 0)
                .map(|(month0, &count)| (month_name(month0), count))
                .collect(),
            most_active_month: most_active.map(|(month0, _)| month_name(month0)),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct YearInReview {
    pub year: i32,
    pub total_trips: i64,
    pub total_days_traveled: i64,
    pub total_activities: i64,
    pub total_memories: i64,
    pub total_expenses_by_currency: BTreeMap<String, Cents>,
    pub longest_trip_days: i64,
    pub longest_trip_title: Option<String>,
    pub most_active_month: Option<String>,
    pub trips_by_month: BTreeMap<String, i64>,
}

#[derive(sqlx::FromRow, Serialize, Debug)]
pub struct TimelineItem {
    pub trip_id: Uuid,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: TripStatus,
    pub cover_image_url: Option<String>,
    pub activities_count: i64,
    pub memories_count: i64,
}

#[derive(Serialize, Debug)]
pub struct Timeline {
    pub items: Vec<TimelineItem>,
    pub total_trips: i64,
}

/// A validated `limit`/`offset` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

impl Window {
    pub fn from_query(limit: Option<i64>, offset: Option<i64>) -> Result<Self, AppError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = offset.unwrap_or(0);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if offset < 0 {
            return Err(AppError::BadRequest("offset must not be negative".to_string()));
        }
        Ok(Window { limit, offset })
    }
}

/// Accepts the years a `DATE` column can usefully hold.
pub fn validate_year(year: i32) -> Result<i32, AppError> {
    if !(1..=9999).contains(&year) {
        return Err(AppError::BadRequest("year must be between 1 and 9999".to_string()));
    }
    Ok(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(title: &str, start: (i32, u32, u32), days: Option<i64>, status: TripStatus) -> TripSpan {
        let start_date = NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
        TripSpan {
            title: title.to_string(),
            start_date,
            end_date: days.map(|d| start_date + chrono::Duration::days(d - 1)),
            status,
        }
    }

    #[test]
    fn single_day_trip_lasts_one_day() {
        assert_eq!(span("Day out", (2025, 3, 1), Some(1), TripStatus::Completed).days(), Some(1));
        assert_eq!(span("Open", (2025, 3, 1), None, TripStatus::Planned).days(), None);
    }

    #[test]
    fn trip_statistics_count_statuses_and_years() {
        let spans = vec![
            span("Kyoto", (2024, 4, 1), Some(7), TripStatus::Completed),
            span("Lisbon", (2025, 5, 1), Some(4), TripStatus::Completed),
            span("Oslo", (2025, 12, 20), None, TripStatus::Planned),
            span("Cairo", (2025, 1, 3), Some(5), TripStatus::Ongoing),
        ];
        let stats = TripStatistics::from_spans(&spans, 2025);

        assert_eq!(stats.total_trips, 4);
        assert_eq!((stats.planned_trips, stats.ongoing_trips, stats.completed_trips), (1, 1, 2));
        assert_eq!(stats.trips_this_year, 3);
        assert_eq!(stats.trips_by_year.get(&2024), Some(&1));
        assert_eq!(stats.trips_by_year.get(&2025), Some(&3));
        assert_eq!(stats.average_trip_duration, 5.3);

        assert_eq!(total_days_traveled(&spans), 11);
    }

    #[test]
    fn empty_history_yields_zeros() {
        let stats = TripStatistics::from_spans(&[], 2025);
        assert_eq!(stats.total_trips, 0);
        assert_eq!(stats.average_trip_duration, 0.0);
        assert!(stats.trips_by_year.is_empty());

        let year = YearSpans::from_spans(&[]);
        assert_eq!(year.longest_trip_days, 0);
        assert_eq!(year.longest_trip_title, None);
        assert_eq!(year.most_active_month, None);
    }

    #[test]
    fn activity_categories_are_all_listed() {
        let stats = ActivityStatistics::from_counts(&[(ActivityCategory::Food, 3)]);
        assert_eq!(stats.total_activities, 3);
        assert_eq!(stats.activities_by_category.len(), ActivityCategory::ALL.len());
        assert_eq!(stats.activities_by_category["food"], 3);
        assert_eq!(stats.activities_by_category["stay"], 0);
    }

    #[test]
    fn year_review_finds_longest_trip_and_busiest_month() {
        let spans = vec![
            span("Porto", (2025, 3, 1), Some(3), TripStatus::Completed),
            span("Rome", (2025, 3, 20), Some(9), TripStatus::Completed),
            span("Seoul", (2025, 7, 1), Some(9), TripStatus::Planned),
            span("Tbd", (2025, 9, 1), None, TripStatus::Planned),
        ];
        let year = YearSpans::from_spans(&spans);

        assert_eq!(year.total_days_traveled, 21);
        assert_eq!(year.longest_trip_days, 9);
        assert_eq!(year.longest_trip_title.as_deref(), Some("Rome"));
        assert_eq!(year.most_active_month.as_deref(), Some("March"));
        assert_eq!(year.trips_by_month.get("March"), Some(&2));
        assert_eq!(year.trips_by_month.get("September"), Some(&1));
        assert_eq!(year.trips_by_month.get("January"), None);
    }

    #[test]
    fn spending_lists_every_category() {
        let by_category = spending_by_category(&[(ExpenseCategory::Food, Cents(1250))]);
        assert_eq!(by_category.len(), ExpenseCategory::ALL.len());
        assert_eq!(by_category["food"], Cents(1250));
        assert_eq!(by_category["shopping"], Cents(0));
    }

    #[test]
    fn average_rounds_to_the_cent() {
        assert_eq!(average_cents(Cents(1000), 3), Cents(333));
        assert_eq!(average_cents(Cents(0), 0), Cents(0));
    }

    #[test]
    fn window_bounds() {
        assert_eq!(Window::from_query(None, None).unwrap(), Window { limit: 20, offset: 0 });
        assert!(Window::from_query(Some(0), None).is_err());
        assert!(Window::from_query(Some(101), None).is_err());
        assert!(Window::from_query(Some(5), Some(-1)).is_err());
        assert!(validate_year(0).is_err());
        assert_eq!(validate_year(2025).unwrap(), 2025);
    }
}
