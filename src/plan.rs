// src/plan.rs

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

/// A calendar month, ordered by year then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    fn succ(self) -> Option<Self> {
        self.first_day()?
            .checked_add_months(Months::new(1))
            .map(Self::of)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Inclusive date window; only the year and month of each bound matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl IngestionWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The window covering exactly the month that contains `day`.
    pub fn month_of(day: NaiveDate) -> Self {
        Self::new(day, day)
    }

    pub fn first_month(&self) -> YearMonth {
        YearMonth::of(self.start)
    }

    pub fn last_month(&self) -> YearMonth {
        YearMonth::of(self.end)
    }

    /// Every month from the start month through the end month, inclusive.
    /// Empty when the end month precedes the start month.
    pub fn months(&self) -> MonthRange {
        MonthRange {
            next: Some(self.first_month()),
            last: self.last_month(),
        }
    }
}

/// Lazy month iterator returned by [`IngestionWindow::months`]. Cloning it
/// restarts from the clone point.
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<YearMonth>,
    last: YearMonth,
}

impl Iterator for MonthRange {
    type Item = YearMonth;

    fn next(&mut self) -> Option<YearMonth> {
        let cur = self.next.filter(|m| *m <= self.last)?;
        self.next = cur.succ();
        Some(cur)
    }
}

/// One (category, month) combination to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchUnit {
    pub category: String,
    pub period: YearMonth,
}

impl fmt::Display for FetchUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.period)
    }
}

/// Category-major product of `categories` and the window's months.
pub fn plan_units<'a>(
    categories: &'a [String],
    window: &IngestionWindow,
) -> impl Iterator<Item = FetchUnit> + 'a {
    let months = window.months();
    categories.iter().flat_map(move |category| {
        months.clone().map(move |period| FetchUnit {
            category: category.clone(),
            period,
        })
    })
}
