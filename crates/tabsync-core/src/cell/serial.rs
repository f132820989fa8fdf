//! Conversion between dates and spreadsheet serial numbers
//!
//! Spreadsheets store dates as fractional day counts. The 1900 date system
//! counts from 1900-01-00 and keeps the historical phantom 1900-02-29
//! (serial 60); the 1904 system counts from 1904-01-01.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Serial of 1970-01-01 in the 1900 date system
const EPOCH_SERIAL_1900: f64 = 25_569.0;

/// Serial of 1970-01-01 in the 1904 date system
const EPOCH_SERIAL_1904: f64 = 24_107.0;

/// First serial after the phantom leap day
const FIRST_REAL_MARCH_1900: f64 = 61.0;

/// Largest serial a spreadsheet accepts (9999-12-31)
const MAX_SERIAL: f64 = 2_958_466.0;

fn unix_epoch() -> NaiveDateTime {
    NaiveDate::default().and_time(NaiveTime::default())
}

fn epoch_serial(date_1904: bool) -> f64 {
    if date_1904 {
        EPOCH_SERIAL_1904
    } else {
        EPOCH_SERIAL_1900
    }
}

/// Convert a date-time to its serial number
pub fn datetime_to_serial(dt: NaiveDateTime, date_1904: bool) -> f64 {
    let ms = (dt - unix_epoch()).num_milliseconds() as f64;
    let serial = ms / MS_PER_DAY + epoch_serial(date_1904);
    if !date_1904 && serial < FIRST_REAL_MARCH_1900 {
        serial - 1.0
    } else {
        serial
    }
}

/// Convert a serial number back to a date-time, rounded to the millisecond.
///
/// Returns `None` for negative, non-finite or out-of-range serials.
pub fn serial_to_datetime(serial: f64, date_1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_SERIAL {
        return None;
    }
    let serial = if !date_1904 && serial < FIRST_REAL_MARCH_1900 {
        serial + 1.0
    } else {
        serial
    };
    let ms = ((serial - epoch_serial(date_1904)) * MS_PER_DAY).round() as i64;
    unix_epoch().checked_add_signed(Duration::milliseconds(ms))
}
