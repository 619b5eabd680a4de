//! Archive-date helpers for the `yyyyMMddHHmmss` format.
//!
//! Two readings of the same 14 digits exist. [`parse_strict`] accepts only
//! real calendar values. [`to_epoch_millis`] is lenient: out-of-range
//! components roll over into the next larger unit, so `20120235131415`
//! (Feb 35) lands on 2012-03-06. Crawlers did write such dates, and the
//! binary layout must still be able to carry them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::WireError;

/// Digits in an archive date.
pub const TIMESTAMP_LEN: usize = 14;

/// `chrono` rendering of the archive-date layout.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Split 14 ASCII digits into year, month, day, hour, minute, second.
fn components(raw: &str) -> Option<[i64; 6]> {
    let bytes = raw.as_bytes();
    if bytes.len() != TIMESTAMP_LEN || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let num = |range: std::ops::Range<usize>| {
        bytes[range]
            .iter()
            .fold(0i64, |acc, &b| acc * 10 + i64::from(b - b'0'))
    };
    Some([
        num(0..4),
        num(4..6),
        num(6..8),
        num(8..10),
        num(10..12),
        num(12..14),
    ])
}

/// Parse an archive date as an exact calendar value.
pub fn parse_strict(raw: &str) -> Option<NaiveDateTime> {
    let [y, mo, d, h, mi, s] = components(raw)?;
    NaiveDate::from_ymd_opt(
        i32::try_from(y).ok()?,
        u32::try_from(mo).ok()?,
        u32::try_from(d).ok()?,
    )?
    .and_hms_opt(
        u32::try_from(h).ok()?,
        u32::try_from(mi).ok()?,
        u32::try_from(s).ok()?,
    )
}

/// Milliseconds since the Unix epoch (UTC), rolling over out-of-range
/// components.
///
/// # Errors
///
/// [`WireError::InvalidTimestamp`] if `raw` is not exactly 14 ASCII digits.
pub fn to_epoch_millis(raw: &str) -> Result<i64, WireError> {
    let invalid = || WireError::InvalidTimestamp {
        value: raw.to_string(),
    };
    let [y, mo, d, h, mi, s] = components(raw).ok_or_else(invalid)?;

    // Month 0 is December of the previous year, month 13 January of the next.
    let months = y * 12 + (mo - 1);
    let year = i32::try_from(months.div_euclid(12)).map_err(|_| invalid())?;
    let month = u32::try_from(months.rem_euclid(12) + 1).map_err(|_| invalid())?;

    let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(invalid)?;

    let dt = first_of_month
        + TimeDelta::days(d - 1)
        + TimeDelta::hours(h)
        + TimeDelta::minutes(mi)
        + TimeDelta::seconds(s);
    Ok(dt.and_utc().timestamp_millis())
}

/// Render epoch milliseconds back into `yyyyMMddHHmmss`.
///
/// Sub-second precision is dropped. Returns `None` outside chrono's range.
pub fn from_epoch_millis(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_start() {
        assert_eq!(to_epoch_millis("19700101000000").unwrap(), 0);
        assert_eq!(from_epoch_millis(0).unwrap(), "19700101000000");
    }

    #[test]
    fn known_instant() {
        // 2001-01-01T00:00:00Z
        assert_eq!(to_epoch_millis("20010101000000").unwrap(), 978_307_200_000);
    }

    #[test]
    fn lenient_day_rolls_into_next_month() {
        let millis = to_epoch_millis("20120235131415").unwrap();
        assert_eq!(from_epoch_millis(millis).unwrap(), "20120306131415");
    }

    #[test]
    fn lenient_month_zero_and_thirteen() {
        let dec = to_epoch_millis("20120001000000").unwrap();
        assert_eq!(from_epoch_millis(dec).unwrap(), "20111201000000");
        let jan = to_epoch_millis("20121301000000").unwrap();
        assert_eq!(from_epoch_millis(jan).unwrap(), "20130101000000");
    }

    #[test]
    fn lenient_seconds_overflow() {
        let millis = to_epoch_millis("20010101235960").unwrap();
        assert_eq!(from_epoch_millis(millis).unwrap(), "20010102000000");
    }

    #[test]
    fn rejects_wrong_shape() {
        for raw in ["2001010100000", "200101010000000", "2001-01-01T000", "", "2001010100000x"] {
            assert!(
                matches!(to_epoch_millis(raw), Err(WireError::InvalidTimestamp { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn strict_parse_rejects_rollover() {
        assert!(parse_strict("20120229120000").is_some());
        assert!(parse_strict("20110229120000").is_none());
        assert!(parse_strict("20010101246000").is_none());
    }
}
