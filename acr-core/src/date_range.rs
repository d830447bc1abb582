use chrono::{Days, NaiveDate};

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive).
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// The `span` consecutive calendar days starting at `start`.
    ///
    /// Returns `None` for an empty span or one running past the end of
    /// the representable calendar.
    pub fn from_span(start: NaiveDate, span: usize) -> Option<DateRange> {
        let extra = u64::try_from(span.checked_sub(1)?).ok()?;
        let end = start.checked_add_days(Days::new(extra))?;
        Some(DateRange(start, end))
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 > self.1 {
            return None;
        }
        let current = self.0;
        match current.succ_opt() {
            Some(next) => self.0 = next,
            None => self.1 = NaiveDate::MIN,
        }
        Some(current)
    }
}
