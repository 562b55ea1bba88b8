use chrono::{Duration, NaiveDate, NaiveTime, Timelike};

use crate::errors::{Error, Result};
use crate::slots::{CLOSING_HOUR, OPENING_HOUR};

/// Reservations must land between 3 and 15 days out, both inclusive.
pub const WINDOW_MIN_DAYS: i64 = 3;
pub const WINDOW_MAX_DAYS: i64 = 15;

/// The window is evaluated against "today" at write/query time, so the
/// same reservation can drift out of validity as days pass.
pub fn check_window(today: NaiveDate, date: NaiveDate) -> Result<()> {
    let min = today + Duration::days(WINDOW_MIN_DAYS);
    let max = today + Duration::days(WINDOW_MAX_DAYS);

    if date < min || date > max {
        return Err(Error::OutOfWindow { min, max });
    }
    Ok(())
}

pub fn check_time_range(start: NaiveTime, end: NaiveTime) -> Result<()> {
    if start >= end {
        return Err(Error::InvalidTimeRange {
            message: "start_time must be earlier than end_time".to_string(),
        });
    }
    if start.minute() != 0 || start.second() != 0 || end.minute() != 0 || end.second() != 0 {
        return Err(Error::InvalidTimeRange {
            message: "reservation times must be aligned to the hour".to_string(),
        });
    }
    if start.hour() < OPENING_HOUR || end.hour() > CLOSING_HOUR {
        return Err(Error::InvalidTimeRange {
            message: format!(
                "reservations must fall between {:02}:00 and {:02}:00",
                OPENING_HOUR, CLOSING_HOUR
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

        assert!(check_window(today, today + Duration::days(3)).is_ok());
        assert!(check_window(today, today + Duration::days(15)).is_ok());
        assert!(check_window(today, today + Duration::days(9)).is_ok());
    }

    #[test]
    fn dates_outside_window_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();

        for days in [0, 2, 16, 120] {
            let result = check_window(today, today + Duration::days(days));
            assert!(matches!(result, Err(Error::OutOfWindow { .. })), "day offset {}", days);
        }
    }

    #[test]
    fn valid_time_ranges_pass() {
        assert!(check_time_range(time(9, 0), time(10, 0)).is_ok());
        assert!(check_time_range(time(9, 0), time(18, 0)).is_ok());
        assert!(check_time_range(time(17, 0), time(18, 0)).is_ok());
    }

    #[test]
    fn reversed_or_empty_ranges_are_rejected() {
        assert!(matches!(
            check_time_range(time(12, 0), time(10, 0)),
            Err(Error::InvalidTimeRange { .. })
        ));
        assert!(matches!(
            check_time_range(time(10, 0), time(10, 0)),
            Err(Error::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn unaligned_times_are_rejected() {
        assert!(matches!(
            check_time_range(time(9, 30), time(11, 0)),
            Err(Error::InvalidTimeRange { .. })
        ));
        assert!(matches!(
            check_time_range(time(9, 0), time(10, 15)),
            Err(Error::InvalidTimeRange { .. })
        ));
    }

    #[test]
    fn times_outside_business_hours_are_rejected() {
        assert!(matches!(
            check_time_range(time(8, 0), time(10, 0)),
            Err(Error::InvalidTimeRange { .. })
        ));
        assert!(matches!(
            check_time_range(time(17, 0), time(19, 0)),
            Err(Error::InvalidTimeRange { .. })
        ));
    }
}
