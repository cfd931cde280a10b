//! Excel 1900 date-system serial numbers.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const MS_PER_DAY: f64 = 86_400_000.0;

fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

// Excel treats 1900 as a leap year: serial 60 is the nonexistent 1900-02-29, so serials below it
// sit one day off the 1899-12-30 epoch.
const PHANTOM_LEAP_DAY: f64 = 60.0;

pub(crate) fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = if serial < PHANTOM_LEAP_DAY {
        serial + 1.0
    } else {
        serial
    };
    let ms = (days * MS_PER_DAY).round() as i64;
    epoch()?.checked_add_signed(TimeDelta::try_milliseconds(ms)?)
}

pub(crate) fn datetime_to_serial(dt: &NaiveDateTime) -> Option<f64> {
    let ms = dt.signed_duration_since(epoch()?).num_milliseconds();
    let days = ms as f64 / MS_PER_DAY;
    Some(if days < PHANTOM_LEAP_DAY + 1.0 {
        days - 1.0
    } else {
        days
    })
}

/// Parse the ISO 8601 date/time strings some workbook formats (e.g. `.ods`) store.
pub(crate) fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn converts_known_serials() {
        assert_eq!(serial_to_datetime(1.0), Some(at(1900, 1, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(59.0), Some(at(1900, 2, 28, 0, 0, 0)));
        assert_eq!(serial_to_datetime(61.0), Some(at(1900, 3, 1, 0, 0, 0)));
        assert_eq!(serial_to_datetime(45_292.5), Some(at(2024, 1, 1, 12, 0, 0)));
        assert_eq!(serial_to_datetime(f64::NAN), None);
    }

    #[test]
    fn serials_round_trip() {
        for dt in [
            at(1900, 1, 1, 0, 0, 0),
            at(1900, 3, 1, 0, 0, 0),
            at(2024, 2, 29, 23, 59, 59),
        ] {
            let serial = datetime_to_serial(&dt).unwrap();
            assert_eq!(serial_to_datetime(serial), Some(dt));
        }
    }

    #[test]
    fn parses_iso_strings() {
        assert_eq!(
            parse_iso_datetime("2024-05-06T07:08:09"),
            Some(at(2024, 5, 6, 7, 8, 9))
        );
        assert_eq!(parse_iso_datetime("2024-05-06"), Some(at(2024, 5, 6, 0, 0, 0)));
        assert_eq!(parse_iso_datetime("PT1H"), None);
    }
}
