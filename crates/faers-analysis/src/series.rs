//! Continuous monthly series construction.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

/// First calendar day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// First day of the following month.
pub fn next_month(month: NaiveDate) -> Option<NaiveDate> {
    let (year, month_number) = if month.month() == 12 {
        (month.year() + 1, 1)
    } else {
        (month.year(), month.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month_number, 1)
}

/// A gap-free monthly series: month-start dates with parallel values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    months: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl MonthlySeries {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.months.iter().copied().zip(self.values.iter().copied())
    }
}

/// Build a continuous monthly series from raw (date, value) pairs.
///
/// Values falling in the same month are summed; every month between the
/// minimum and maximum observed month is present, unobserved months as 0.
/// Detectors can therefore assume a gap-free index.
pub fn ensure_monthly_index(points: &[(NaiveDate, f64)]) -> MonthlySeries {
    if points.is_empty() {
        return MonthlySeries::empty();
    }

    let mut by_month: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, value) in points {
        *by_month.entry(month_start(*date)).or_insert(0.0) += value;
    }

    // BTreeMap iteration is ordered, so first/last are min/max.
    let first = match by_month.keys().next() {
        Some(month) => *month,
        None => return MonthlySeries::empty(),
    };
    let last = match by_month.keys().next_back() {
        Some(month) => *month,
        None => return MonthlySeries::empty(),
    };

    let mut months = Vec::new();
    let mut values = Vec::new();
    let mut cursor = first;
    loop {
        months.push(cursor);
        values.push(by_month.get(&cursor).copied().unwrap_or(0.0));
        if cursor == last {
            break;
        }
        cursor = match next_month(cursor) {
            Some(next) => next,
            None => break,
        };
    }

    MonthlySeries { months, values }
}
