//! Validity windows

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::errors::{IssuerError, Result};

/// Years an X.509 validity time can carry
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

/// Validity window of a certificate, end strictly after start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        for date in [start, end] {
            if !SUPPORTED_YEARS.contains(&date.year()) {
                return Err(IssuerError::invalid(format!(
                    "validity date {date} is outside years {}..={}",
                    SUPPORTED_YEARS.start(),
                    SUPPORTED_YEARS.end()
                )));
            }
        }
        if end <= start {
            return Err(IssuerError::invalid(format!(
                "validity end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window starting today (UTC) and ending at `end`
    pub fn until(end: NaiveDate) -> Result<Self> {
        Self::new(Utc::now().date_naive(), end)
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }
}
