use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::TempestError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A half-open `[start, end)` range of instants with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Raw date flags as the user typed them.
#[derive(Debug, Clone, Default)]
pub struct DateFlags {
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl TimeWindow {
    /// Builds a window, returning `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn span(&self) -> Duration {
        self.end - self.start
    }

    /// The rolling window ending at `now`.
    pub fn last_day(now: DateTime<Utc>) -> Self {
        Self {
            start: now - Duration::days(1),
            end: now,
        }
    }

    /// Resolves the window described by `flags`, using `now` for the default
    /// lookback.
    ///
    /// `date` wins over `from`/`to` without complaint. A range includes the
    /// whole `to` day.
    pub fn resolve(flags: &DateFlags, now: DateTime<Utc>) -> Result<Self, TempestError> {
        let date = non_empty(&flags.date);
        let from = non_empty(&flags.from);
        let to = non_empty(&flags.to);

        if let Some(date) = date {
            let day = parse_date("date", date)?;
            return Ok(Self {
                start: midnight(day),
                end: midnight(next_day(day)?),
            });
        }

        match (from, to) {
            (Some(from), Some(to)) => {
                let from = parse_date("from", from)?;
                let to = parse_date("to", to)?;
                if from > to {
                    return Err(TempestError::InvertedRange { from, to });
                }
                Ok(Self {
                    start: midnight(from),
                    end: midnight(next_day(to)?),
                })
            }
            (None, None) => Ok(Self::last_day(now)),
            _ => Err(TempestError::IncompleteRange),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date(flag: &'static str, value: &str) -> Result<NaiveDate, TempestError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|source| TempestError::InvalidDate {
        flag,
        value: value.to_string(),
        source,
    })
}

fn next_day(day: NaiveDate) -> Result<NaiveDate, TempestError> {
    day.succ_opt().ok_or(TempestError::DateOutOfRange(day))
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn flags(date: Option<&str>, from: Option<&str>, to: Option<&str>) -> DateFlags {
        DateFlags {
            date: date.map(String::from),
            from: from.map(String::from),
            to: to.map(String::from),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn single_date_covers_one_day() {
        let w = TimeWindow::resolve(&flags(Some("2024-01-15"), None, None), now()).unwrap();
        assert_eq!(w.start(), ymd(2024, 1, 15));
        assert_eq!(w.end(), ymd(2024, 1, 16));
    }

    #[test]
    fn date_wins_over_range() {
        let w = TimeWindow::resolve(
            &flags(Some("2024-01-15"), Some("2023-01-01"), Some("2023-12-31")),
            now(),
        )
        .unwrap();
        assert_eq!(w.start(), ymd(2024, 1, 15));
        assert_eq!(w.end(), ymd(2024, 1, 16));
    }

    #[test]
    fn range_includes_the_whole_end_day() {
        let w = TimeWindow::resolve(&flags(None, Some("2024-01-01"), Some("2024-01-31")), now())
            .unwrap();
        assert_eq!(w.start(), ymd(2024, 1, 1));
        assert_eq!(w.end(), ymd(2024, 2, 1));
    }

    #[test]
    fn range_span_is_days_between_plus_one() {
        let cases = [
            ("2024-01-01", "2024-01-01"),
            ("2024-02-27", "2024-03-02"),
            ("2023-12-31", "2024-12-31"),
        ];
        for (from, to) in cases {
            let w = TimeWindow::resolve(&flags(None, Some(from), Some(to)), now()).unwrap();
            let from_d = NaiveDate::parse_from_str(from, DATE_FORMAT).unwrap();
            let to_d = NaiveDate::parse_from_str(to, DATE_FORMAT).unwrap();
            assert_eq!(w.span(), (to_d - from_d) + Duration::days(1), "{from}..{to}");
        }
    }

    #[test]
    fn half_a_range_is_rejected() {
        for f in [
            flags(None, Some("2024-01-01"), None),
            flags(None, None, Some("2024-01-31")),
        ] {
            let err = TimeWindow::resolve(&f, now()).unwrap_err();
            assert!(matches!(err, TempestError::IncompleteRange));
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
    }

    #[test]
    fn malformed_dates_name_the_flag() {
        let cases = [
            (flags(Some("01-15-2024"), None, None), "--date"),
            (flags(None, Some("bad"), Some("2024-01-31")), "--from"),
            (flags(None, Some("2024-01-01"), Some("bad")), "--to"),
        ];
        for (f, flag) in cases {
            let err = TimeWindow::resolve(&f, now()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(err.to_string().contains(flag), "{err}");
        }
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = TimeWindow::resolve(&flags(None, Some("2024-02-01"), Some("2024-01-01")), now())
            .unwrap_err();
        assert!(matches!(err, TempestError::InvertedRange { .. }));
    }

    #[test]
    fn no_flags_means_last_24_hours() {
        let w = TimeWindow::resolve(&DateFlags::default(), now()).unwrap();
        assert_eq!(w.end(), now());
        assert_eq!(w.span(), Duration::hours(24));
    }

    #[test]
    fn blank_flags_are_unset() {
        let w = TimeWindow::resolve(&flags(Some(""), Some(" "), None), now()).unwrap();
        assert_eq!(w.end(), now());
    }

    #[test]
    fn new_rejects_empty_windows() {
        assert!(TimeWindow::new(now(), now()).is_none());
        assert!(TimeWindow::new(now(), now() + Duration::hours(1)).is_some());
    }
}
