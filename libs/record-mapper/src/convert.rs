//! Epoch-second conversions behind date/time column coercion.
//!
//! Any `i64` is accepted. Values outside chrono's representable range
//! (roughly ±262,000 years) yield `None`.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use record_api::TimeZoneSetting;

/// Epoch seconds → calendar date in `zone`.
pub fn int64_to_date(seconds: i64, zone: TimeZoneSetting) -> Option<NaiveDate> {
    int64_to_datetime(seconds, zone).map(|dt| dt.date_naive())
}

/// Epoch seconds → date + time in `zone`.
pub fn int64_to_datetime(seconds: i64, zone: TimeZoneSetting) -> Option<DateTime<FixedOffset>> {
    let utc = DateTime::<Utc>::from_timestamp(seconds, 0)?;
    Some(utc.with_timezone(&zone.offset_at(&utc)))
}

/// Epoch seconds → instant, expressed in `zone`.
pub fn int64_to_time(seconds: i64, zone: TimeZoneSetting) -> Option<DateTime<FixedOffset>> {
    int64_to_datetime(seconds, zone)
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveTime, Timelike};

    use super::*;

    #[test]
    fn local_midnight_is_todays_date() {
        let today = Local::now().date_naive();
        let midnight = today
            .and_time(NaiveTime::MIN)
            .and_local_timezone(Local)
            .earliest()
            .unwrap()
            .timestamp();

        assert_eq!(int64_to_date(midnight, TimeZoneSetting::Local), Some(today));
    }

    #[test]
    fn date_depends_on_zone() {
        let west = TimeZoneSetting::Fixed { offset_seconds: -3600 };
        let east = TimeZoneSetting::Fixed { offset_seconds: 3600 };

        assert_eq!(int64_to_date(0, west), NaiveDate::from_ymd_opt(1969, 12, 31));
        assert_eq!(int64_to_date(0, east), NaiveDate::from_ymd_opt(1970, 1, 1));
    }

    #[test]
    fn datetime_keeps_the_instant() {
        let seconds = 1_700_000_000;
        let dt = int64_to_datetime(seconds, TimeZoneSetting::Fixed { offset_seconds: 19800 }).unwrap();

        assert_eq!(dt.timestamp(), seconds);
        assert_eq!(dt.offset().local_minus_utc(), 19800);
        // 22:13:20 UTC + 5:30
        assert_eq!((dt.hour(), dt.minute()), (3, 43));
    }

    #[test]
    fn time_within_a_second_of_now() {
        let now = Utc::now();
        let time = int64_to_time(now.timestamp(), TimeZoneSetting::Utc).unwrap();

        assert!((now - time.with_timezone(&Utc)).num_seconds().abs() <= 1);
    }

    #[test]
    fn negative_seconds_are_accepted() {
        let dt = int64_to_datetime(-86_400, TimeZoneSetting::Utc).unwrap();
        assert_eq!(dt.date_naive(), NaiveDate::from_ymd_opt(1969, 12, 31).unwrap());
    }

    #[test]
    fn out_of_range_yields_none() {
        assert_eq!(int64_to_date(i64::MAX, TimeZoneSetting::Utc), None);
        assert_eq!(int64_to_time(i64::MIN, TimeZoneSetting::Utc), None);
    }
}
