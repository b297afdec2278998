use std::fmt;

use chrono::{Datelike, Month, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::data::series::MeasurementSeries;

/// One calendar month. Used to slice a series by matching the year and month
/// of each timestamp, so month length is handled by the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthWindow {
    year: i32,
    month: u32,
}

impl MonthWindow {
    /// `None` unless `month` is in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Inclusive start of the window.
    pub fn start(&self) -> NaiveDateTime {
        self.first_day().and_time(chrono::NaiveTime::MIN)
    }

    /// Exclusive end of the window (start of the next month).
    pub fn end(&self) -> NaiveDateTime {
        self.next().start()
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        ts.year() == self.year && ts.month() == self.month
    }

    /// English month name, e.g. `March`.
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("Unknown")
    }

    /// Bundle key, e.g. `2025_March`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.year, self.month_name())
    }

    /// Short form used in messages, e.g. `2025-03`.
    pub fn short(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    /// Rows of `series` that fall inside this month. The series is sorted, so
    /// the bounds are found by binary search.
    pub fn filter(&self, series: &MeasurementSeries) -> MeasurementSeries {
        let (start, end) = (self.start(), self.end());
        let timestamps = series.timestamps();
        let lo = timestamps.partition_point(|ts| *ts < start);
        let hi = timestamps.partition_point(|ts| *ts < end);
        series.slice(lo..hi)
    }
}

impl fmt::Display for MonthWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

/// Every month from `start` to `end`, both inclusive, in ascending order.
/// Empty when `start` is after `end`.
pub fn month_range(start: MonthWindow, end: MonthWindow) -> Vec<MonthWindow> {
    let mut months = Vec::new();
    let mut current = start;
    while current <= end {
        months.push(current);
        current = current.next();
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::series::RECORD;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(MonthWindow::new(2025, 0).is_none());
        assert!(MonthWindow::new(2025, 13).is_none());
    }

    #[test]
    fn filter_respects_calendar_boundaries() {
        let series = MeasurementSeries::single(
            RECORD,
            vec![
                (at(2024, 1, 31, 23, 59), 1.0),
                (at(2024, 2, 1, 0, 0), 2.0),
                (at(2024, 2, 29, 23, 59), 3.0),
                (at(2024, 3, 1, 0, 0), 4.0),
            ],
        )
        .unwrap();

        let feb = MonthWindow::new(2024, 2).unwrap().filter(&series);
        assert_eq!(feb.column(RECORD), Some(&[2.0, 3.0][..]));
        assert!(feb.timestamps().iter().all(|ts| MonthWindow::new(2024, 2).unwrap().contains(ts)));

        let june = MonthWindow::new(2024, 6).unwrap().filter(&series);
        assert!(june.is_empty());
    }

    #[test]
    fn filter_of_empty_series_is_empty() {
        let window = MonthWindow::new(2025, 3).unwrap();
        assert!(window.filter(&MeasurementSeries::default()).is_empty());
    }

    #[test]
    fn labels() {
        let window = MonthWindow::new(2025, 3).unwrap();
        assert_eq!(window.label(), "2025_March");
        assert_eq!(window.short(), "2025-03");
        assert_eq!(window.to_string(), "March 2025");
    }

    #[test]
    fn range_crosses_year_end() {
        let months = month_range(
            MonthWindow::new(2024, 11).unwrap(),
            MonthWindow::new(2025, 2).unwrap(),
        );
        let pairs: Vec<(i32, u32)> = months.iter().map(|m| (m.year(), m.month())).collect();
        assert_eq!(pairs, vec![(2024, 11), (2024, 12), (2025, 1), (2025, 2)]);

        assert!(month_range(
            MonthWindow::new(2025, 2).unwrap(),
            MonthWindow::new(2025, 1).unwrap()
        )
        .is_empty());
    }
}
