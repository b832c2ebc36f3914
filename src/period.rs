//! Reporting-period resolution.
//!
//! A period is a `(year, month)` pair; the quarter is always derived, never
//! stored. The target period for an update is either given explicitly or
//! computed from the current date as the month immediately preceding the
//! current calendar month (reports are rolled forward once the month they
//! describe is complete).

use chrono::{Datelike, Local, NaiveDate};

use crate::{Error, Result};

/// Canonical English three-letter month abbreviations, indexed by month - 1.
const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A reporting period: a calendar year and month.
///
/// Quarter and month abbreviation are derived on demand so the two can never
/// fall out of sync with the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Creates a period, validating the month range.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidConfig(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The calendar month, 1-12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// The quarter this month falls in, 1-4.
    pub fn quarter(&self) -> u32 {
        (self.month + 2) / 3
    }

    /// The English three-letter abbreviation of the month.
    pub fn month_abbr(&self) -> &'static str {
        MONTH_ABBR[(self.month - 1) as usize]
    }

    /// The period one calendar month earlier.
    pub fn previous(&self) -> Period {
        if self.month == 1 {
            Period {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Period {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

/// A resolved update: the target period plus the old year value to search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPeriod {
    /// The period the report should show after the update.
    pub target: Period,
    /// The year literal expected in the not-yet-updated report.
    pub old_year: i32,
}

/// Resolves the target period from explicit values or the current date.
///
/// When `explicit` is `None`, the target is the month preceding the current
/// calendar month. `old_year` overrides the year literal to search for; by
/// default it is the year of the month preceding the target, which is what an
/// un-updated report carries.
pub fn resolve(explicit: Option<(i32, u32)>, old_year: Option<i32>) -> Result<ResolvedPeriod> {
    resolve_at(explicit, old_year, Local::now().date_naive())
}

/// [`resolve`] against a fixed "today", for deterministic computation.
pub fn resolve_at(
    explicit: Option<(i32, u32)>,
    old_year: Option<i32>,
    today: NaiveDate,
) -> Result<ResolvedPeriod> {
    let target = match explicit {
        Some((year, month)) => Period::new(year, month)?,
        None => Period::new(today.year(), today.month())?.previous(),
    };
    Ok(ResolvedPeriod {
        target,
        old_year: old_year.unwrap_or_else(|| target.previous().year),
    })
}
