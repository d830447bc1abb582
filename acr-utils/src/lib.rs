//! Shared utility functions for ACR crates.

/// Date utility functions
pub mod dates {
    use crate::error::DateError;
    use chrono::{Datelike, NaiveDate, NaiveDateTime};

    /// Format a NaiveDate as the short "M/D" label used for table columns
    /// and chart axes.
    pub fn month_day_label(date: &NaiveDate) -> String {
        format!("{}/{}", date.month(), date.day())
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y-%m-%d")?)
    }

    /// Parse a date string in "YYYYMMDD" format
    pub fn parse_date_compact(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s, "%Y%m%d")?)
    }

    /// Parse an observation timestamp, accepting the layouts found in daily
    /// weather exports: "YYYY-MM-DD", "YYYY-MM-DD HH:MM", "YYYY-MM-DD HH:MM:SS"
    /// and "YYYYMMDD". The time of day is discarded.
    pub fn parse_timestamp(s: &str) -> Result<NaiveDate, DateError> {
        let s = s.trim();
        if let Ok(date) = parse_date(s) {
            return Ok(date);
        }
        for format in ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
                return Ok(datetime.date());
            }
        }
        parse_date_compact(s).map_err(|_| DateError(format!("unrecognized timestamp '{s}'")))
    }

    /// Parse a calendar day given as "MM-DD" or "M/D" into (month, day).
    ///
    /// Validated against a leap year so that 2/29 is accepted.
    pub fn parse_month_day(s: &str) -> Result<(u32, u32), DateError> {
        let s = s.trim();
        let (month, day) = s
            .split_once('-')
            .or_else(|| s.split_once('/'))
            .ok_or_else(|| DateError(format!("expected MM-DD or M/D, got '{s}'")))?;
        let month: u32 = month
            .trim()
            .parse()
            .map_err(|_| DateError(format!("invalid month in '{s}'")))?;
        let day: u32 = day
            .trim()
            .parse()
            .map_err(|_| DateError(format!("invalid day in '{s}'")))?;
        if NaiveDate::from_ymd_opt(2000, month, day).is_none() {
            return Err(DateError(format!("{month}/{day} is not a calendar day")));
        }
        Ok((month, day))
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::NaiveDate;

        #[test]
        fn test_parse_date_layouts() {
            let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
            assert_eq!(parse_date("2023-06-15").unwrap(), date);
            assert_eq!(parse_date_compact("20230615").unwrap(), date);
            assert!(parse_date("20230615").is_err());
            assert!(parse_date_compact("2023-06-15").is_err());
        }

        #[test]
        fn test_month_day_label() {
            let date = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
            assert_eq!(month_day_label(&date), "2/3");
        }

        #[test]
        fn test_parse_timestamp_layouts() {
            let expected = NaiveDate::from_ymd_opt(2015, 1, 28).unwrap();
            assert_eq!(parse_timestamp("2015-01-28").unwrap(), expected);
            assert_eq!(parse_timestamp("2015-01-28 00:00").unwrap(), expected);
            assert_eq!(parse_timestamp(" 2015-01-28 13:45:10 ").unwrap(), expected);
            assert_eq!(parse_timestamp("20150128").unwrap(), expected);
            assert!(parse_timestamp("28.01.2015").is_err());
        }

        #[test]
        fn test_parse_month_day() {
            assert_eq!(parse_month_day("01-28").unwrap(), (1, 28));
            assert_eq!(parse_month_day("2/29").unwrap(), (2, 29));
            assert!(parse_month_day("2/30").is_err());
            assert!(parse_month_day("13-01").is_err());
            assert!(parse_month_day("0128").is_err());
        }
    }
}

/// Rounding applied at presentation time only.
pub mod rounding {
    /// Round `value` to `places` decimal places, ties to even.
    ///
    /// Works on the exact decimal expansion, so the result always has the
    /// digits `format!("{:.places$}")` prints (31.25 -> 31.2).
    pub fn round_to(value: f64, places: u32) -> f64 {
        let places = places as usize;
        format!("{value:.places$}").parse().unwrap_or(value)
    }

    /// Round an optional value, keeping `None` as `None`.
    pub fn round_opt(value: Option<f64>, places: u32) -> Option<f64> {
        value.map(|v| round_to(v, places))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_round_to() {
            assert_eq!(round_to(12.345_6, 2), 12.35);
            assert_eq!(round_to(33.333_333, 1), 33.3);
            assert_eq!(round_to(7.0, 1), 7.0);
            assert_eq!(round_to(-2.46, 1), -2.5);
        }

        #[test]
        fn test_round_to_ties_go_to_even() {
            // 5 of 16 days
            assert_eq!(round_to(31.25, 1), 31.2);
            assert_eq!(round_to(0.125, 2), 0.12);
            assert_eq!(round_to(0.375, 2), 0.38);
            assert_eq!(round_to(62.5, 0), 62.0);
            // 2.675 is stored just below the tie
            assert_eq!(round_to(2.675, 2), 2.67);
        }

        #[test]
        fn test_round_to_matches_display() {
            for value in [12.5, 31.25, 33.333_333, 66.666_666, 87.5, 0.05] {
                assert_eq!(round_to(value, 1).to_string(), format!("{value:.1}"));
            }
        }

        #[test]
        fn test_round_opt_keeps_none() {
            assert_eq!(round_opt(None, 2), None);
            assert_eq!(round_opt(Some(1.005_1), 2), Some(1.01));
        }
    }
}

/// Error types
pub mod error {
    use std::fmt;

    #[derive(Debug)]
    pub struct DateError(pub String);

    impl fmt::Display for DateError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Date error: {}", self.0)
        }
    }

    impl std::error::Error for DateError {}
}
