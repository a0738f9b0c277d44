//! Scalar types with no direct JSON counterpart.
//!
//! Each calendar type stores a single canonical integer and uses `chrono`
//! only for calendar math, parsing, and formatting:
//!
//! - [`Date`]: days since the Unix epoch (timezone-free)
//! - [`Time`]: milliseconds since midnight (timezone-free)
//! - [`Timestamp`]: milliseconds since the Unix epoch, UTC
//! - [`Interval`]: a duration in milliseconds
//!
//! [`Decimal`] is an arbitrary-precision decimal: an unscaled `BigInt`
//! paired with a base-10 scale, so `1.10` is unscaled `110` at scale `2`.
//! Equality and ordering are numeric (scale-aligned), which means `1.1`
//! and `1.10` compare equal even though they print differently.
//!
//! ## Examples
//!
//! ```rust
//! use jsondoc::{Date, Decimal};
//!
//! let d = Date::from_ymd(2024, 3, 15).unwrap();
//! assert_eq!(d.to_string(), "2024-03-15");
//!
//! let a: Decimal = "1.10".parse().unwrap();
//! let b: Decimal = "1.1".parse().unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.to_string(), "1.10");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc};
use num_bigint::{BigInt, Sign};

use crate::error::{Error, Result};

/// Days between 0001-01-01 (chrono's "day 1 of the common era") and 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

const MILLIS_PER_SECOND: i64 = 1_000;
const MILLIS_PER_MINUTE: i64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: i64 = 60 * MILLIS_PER_MINUTE;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// A timezone-free calendar date, stored as days since 1970-01-01.
///
/// Negative values are dates before the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(i32);

impl Date {
    /// Creates a date from a day count relative to 1970-01-01.
    pub const fn new(days_since_epoch: i32) -> Self {
        Date(days_since_epoch)
    }

    /// Creates a date from a calendar year, month (1-12), and day (1-31).
    ///
    /// Returns `None` for dates that do not exist on the proleptic Gregorian
    /// calendar.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_naive)
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Date(date.num_days_from_ce() - EPOCH_DAYS_FROM_CE)
    }

    /// Parses the `YYYY-MM-DD` text form, or the raw `<days>d` form used
    /// when the day count falls outside the calendar range.
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(raw) = s.strip_suffix('d') {
            if let Ok(days) = raw.parse::<i32>() {
                return Ok(Date(days));
            }
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::from_naive)
            .map_err(|e| Error::decoding(format!("invalid date '{}': {}", s, e)))
    }

    pub const fn days_since_epoch(&self) -> i32 {
        self.0
    }

    /// The chrono view of this date, or `None` when the day count falls
    /// outside chrono's representable range.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_num_days_from_ce_opt(self.0.saturating_add(EPOCH_DAYS_FROM_CE))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            None => write!(f, "{}d", self.0),
        }
    }
}

impl FromStr for Date {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Date::parse(s)
    }
}

/// A timezone-free time of day, stored as milliseconds since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(u32);

impl Time {
    /// Creates a time from a millisecond-of-day count.
    ///
    /// Values at or past 86,400,000 do not name a time of day; they are kept
    /// as-is and render in raw form.
    pub const fn new(millis_of_day: u32) -> Self {
        Time(millis_of_day)
    }

    /// Creates a time from hour (0-23), minute, second, and millisecond
    /// components. Returns `None` for out-of-range components.
    pub fn from_hms_milli(hour: u32, minute: u32, second: u32, milli: u32) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 || milli > 999 {
            return None;
        }
        Some(Time(
            hour * 3_600_000 + minute * 60_000 + second * 1_000 + milli,
        ))
    }

    /// Parses the `HH:MM:SS` text form with an optional fractional part,
    /// or the raw `<millis>ms` form used past the end of the day.
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(raw) = s.strip_suffix("ms") {
            if let Ok(millis) = raw.parse::<u32>() {
                return Ok(Time(millis));
            }
        }
        let t = NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
            .map_err(|e| Error::decoding(format!("invalid time '{}': {}", s, e)))?;
        Ok(Time(
            t.num_seconds_from_midnight() * 1_000 + t.nanosecond() / 1_000_000,
        ))
    }

    pub const fn millis_of_day(&self) -> u32 {
        self.0
    }

    pub const fn hour(&self) -> u32 {
        self.0 / 3_600_000
    }

    pub const fn minute(&self) -> u32 {
        self.0 / 60_000 % 60
    }

    pub const fn second(&self) -> u32 {
        self.0 / 1_000 % 60
    }

    pub const fn millisecond(&self) -> u32 {
        self.0 % 1_000
    }

    pub fn to_naive(&self) -> Option<NaiveTime> {
        NaiveTime::from_num_seconds_from_midnight_opt(self.0 / 1_000, self.0 % 1_000 * 1_000_000)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_naive() {
            Some(t) => write!(f, "{}", t.format("%H:%M:%S%.3f")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl FromStr for Time {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Time::parse(s)
    }
}

/// An instant in time, stored as milliseconds since the Unix epoch, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from a millisecond count relative to the epoch.
    pub const fn new(millis_since_epoch: i64) -> Self {
        Timestamp(millis_since_epoch)
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Timestamp(dt.timestamp_millis())
    }

    /// Parses an RFC 3339 instant; any offset is converted to UTC. Also
    /// accepts the raw `<millis>ms` form used when the instant falls
    /// outside chrono's range.
    pub fn parse(s: &str) -> Result<Self> {
        if let Some(raw) = s.strip_suffix("ms") {
            if let Ok(millis) = raw.parse::<i64>() {
                return Ok(Timestamp(millis));
            }
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Timestamp(dt.with_timezone(&Utc).timestamp_millis()))
            .map_err(|e| Error::decoding(format!("invalid timestamp '{}': {}", s, e)))
    }

    pub const fn millis_since_epoch(&self) -> i64 {
        self.0
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Timestamp::parse(s)
    }
}

/// A signed duration, stored as milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval(i64);

impl Interval {
    pub const fn new(millis: i64) -> Self {
        Interval(millis)
    }

    /// Assembles an interval from day and time-of-day components.
    pub const fn from_parts(
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        millis: i64,
    ) -> Self {
        Interval(
            days * MILLIS_PER_DAY
                + hours * MILLIS_PER_HOUR
                + minutes * MILLIS_PER_MINUTE
                + seconds * MILLIS_PER_SECOND
                + millis,
        )
    }

    pub const fn millis(&self) -> i64 {
        self.0
    }

    /// Whole days in this interval.
    pub const fn days(&self) -> i64 {
        self.0 / MILLIS_PER_DAY
    }

    /// Hour component after whole days are removed.
    pub const fn hours(&self) -> i64 {
        self.0 / MILLIS_PER_HOUR % 24
    }

    pub const fn minutes(&self) -> i64 {
        self.0 / MILLIS_PER_MINUTE % 60
    }

    pub const fn seconds(&self) -> i64 {
        self.0 / MILLIS_PER_SECOND % 60
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ISO 8601 duration form, e.g. "P1DT2H3M4.005S".
        let mut v = self.0 as i128;
        if v < 0 {
            write!(f, "-")?;
            v = -v;
        }
        let days = v / MILLIS_PER_DAY as i128;
        let hours = v / MILLIS_PER_HOUR as i128 % 24;
        let minutes = v / MILLIS_PER_MINUTE as i128 % 60;
        let seconds = v / MILLIS_PER_SECOND as i128 % 60;
        let millis = v % MILLIS_PER_SECOND as i128;
        write!(f, "P")?;
        if days != 0 {
            write!(f, "{}D", days)?;
        }
        if hours != 0 || minutes != 0 || seconds != 0 || millis != 0 || days == 0 {
            write!(f, "T")?;
            if hours != 0 {
                write!(f, "{}H", hours)?;
            }
            if minutes != 0 {
                write!(f, "{}M", minutes)?;
            }
            if millis != 0 {
                write!(f, "{}.{:03}S", seconds, millis)?;
            } else if seconds != 0 || (days == 0 && hours == 0 && minutes == 0) {
                write!(f, "{}S", seconds)?;
            }
        }
        Ok(())
    }
}

/// An arbitrary-precision decimal number: `unscaled * 10^(-scale)`.
///
/// The scale is preserved through parsing and printing, so `"1.10"` keeps its
/// trailing zero. Comparison is numeric: values are aligned to a common scale
/// before their unscaled parts are compared.
#[derive(Debug, Clone)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i32,
}

impl Decimal {
    pub fn new(unscaled: BigInt, scale: i32) -> Self {
        Decimal { unscaled, scale }
    }

    /// Creates a decimal from a finite float, using its shortest decimal
    /// rendering. Returns `None` for NaN and infinities.
    pub fn from_f64(f: f64) -> Option<Self> {
        if !f.is_finite() {
            return None;
        }
        format!("{}", f).parse().ok()
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub const fn scale(&self) -> i32 {
        self.scale
    }

    /// The integer part, truncated toward zero and wrapped to 64 bits.
    pub fn to_i64_wrapping(&self) -> i64 {
        let truncated = if self.scale > 0 {
            &self.unscaled / pow10(self.scale as u32)
        } else if self.scale < 0 {
            &self.unscaled * pow10(self.scale.unsigned_abs())
        } else {
            self.unscaled.clone()
        };
        let (sign, digits) = truncated.to_u64_digits();
        let low = digits.first().copied().unwrap_or(0) as i64;
        if sign == Sign::Minus {
            low.wrapping_neg()
        } else {
            low
        }
    }

    /// A lossy float approximation.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }

    /// Trailing zeros removed from the unscaled part, with the scale adjusted
    /// to match. Zero normalizes to scale 0.
    fn normalized(&self) -> (BigInt, i32) {
        let zero = BigInt::from(0);
        if self.unscaled == zero {
            return (zero, 0);
        }
        let ten = BigInt::from(10);
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;
        while (&unscaled % &ten) == zero {
            unscaled /= &ten;
            scale -= 1;
        }
        (unscaled, scale)
    }

    fn cmp_numeric(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.unscaled.cmp(&other.unscaled);
        }
        if self.scale < other.scale {
            let lifted = &self.unscaled * pow10((other.scale - self.scale) as u32);
            lifted.cmp(&other.unscaled)
        } else {
            let lifted = &other.unscaled * pow10((self.scale - other.scale) as u32);
            self.unscaled.cmp(&lifted)
        }
    }
}

fn pow10(n: u32) -> BigInt {
    let mut p = BigInt::from(1);
    for _ in 0..n {
        p *= 10;
    }
    p
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_numeric(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_numeric(other)
    }
}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (unscaled, scale) = self.normalized();
        unscaled.hash(state);
        scale.hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, magnitude) = match self.unscaled.sign() {
            Sign::Minus => ("-", (-&self.unscaled).to_string()),
            _ => ("", self.unscaled.to_string()),
        };
        if self.scale <= 0 {
            write!(f, "{}{}", sign, magnitude)?;
            for _ in 0..self.scale.unsigned_abs() {
                write!(f, "0")?;
            }
            Ok(())
        } else {
            let scale = self.scale as usize;
            if magnitude.len() > scale {
                let (int_part, frac_part) = magnitude.split_at(magnitude.len() - scale);
                write!(f, "{}{}.{}", sign, int_part, frac_part)
            } else {
                write!(f, "{}0.{}{}", sign, "0".repeat(scale - magnitude.len()), magnitude)
            }
        }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    /// Parses `[sign] digits [. digits] [e [sign] digits]`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::decoding(format!("invalid decimal '{}'", s));
        let (mantissa, exponent) = match s.find(['e', 'E']) {
            Some(i) => {
                let exp: i32 = s[i + 1..].parse().map_err(|_| invalid())?;
                (&s[..i], exp)
            }
            None => (s, 0),
        };
        let (sign, body) = match mantissa.strip_prefix('-') {
            Some(rest) => ("-", rest),
            None => ("", mantissa.strip_prefix('+').unwrap_or(mantissa)),
        };
        let (int_part, frac_part) = match body.find('.') {
            Some(i) => (&body[..i], &body[i + 1..]),
            None => (body, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let digits = format!("{}{}{}", sign, int_part, frac_part);
        let unscaled: BigInt = digits.parse().map_err(|_| invalid())?;
        let scale = frac_part.len() as i32 - exponent;
        Ok(Decimal::new(unscaled, scale))
    }
}

macro_rules! decimal_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Decimal {
                fn from(v: $t) -> Self {
                    Decimal::new(BigInt::from(v), 0)
                }
            }
        )*
    };
}

decimal_from_int!(i8, i16, i32, i64, u8, u16, u32, u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_epoch() {
        assert_eq!(Date::new(0).to_string(), "1970-01-01");
        assert_eq!(Date::from_ymd(1970, 1, 1), Some(Date::new(0)));
    }

    #[test]
    fn test_date_parse_round_trip() {
        let d = Date::parse("2024-03-15").unwrap();
        assert_eq!(d.to_string(), "2024-03-15");
        assert_eq!(Date::from_ymd(2024, 3, 15), Some(d));
        assert!(Date::parse("2024-13-01").is_err());
    }

    #[test]
    fn test_date_before_epoch() {
        let d = Date::parse("1969-12-31").unwrap();
        assert_eq!(d.days_since_epoch(), -1);
    }

    #[test]
    fn test_time_components() {
        let t = Time::from_hms_milli(13, 45, 30, 250).unwrap();
        assert_eq!(t.hour(), 13);
        assert_eq!(t.minute(), 45);
        assert_eq!(t.second(), 30);
        assert_eq!(t.millisecond(), 250);
        assert_eq!(t.to_string(), "13:45:30.250");
    }

    #[test]
    fn test_time_parse() {
        assert_eq!(
            Time::parse("07:08:09.120").unwrap(),
            Time::from_hms_milli(7, 8, 9, 120).unwrap()
        );
        assert_eq!(
            Time::parse("07:08:09").unwrap(),
            Time::from_hms_milli(7, 8, 9, 0).unwrap()
        );
        assert!(Time::from_hms_milli(24, 0, 0, 0).is_none());
    }

    #[test]
    fn test_out_of_range_values_render_and_parse_raw() {
        // Past the calendar range the text form is the raw integer with a
        // unit suffix, and parse accepts it back.
        let t = Time::new(90_000_000);
        assert_eq!(t.to_string(), "90000000ms");
        assert_eq!(Time::parse("90000000ms").unwrap(), t);

        let d = Date::new(i32::MIN);
        assert_eq!(Date::parse(&d.to_string()).unwrap(), d);

        let ts = Timestamp::new(i64::MAX);
        assert_eq!(ts.to_string(), "9223372036854775807ms");
        assert_eq!(Timestamp::parse(&ts.to_string()).unwrap(), ts);
    }

    #[test]
    fn test_timestamp_rfc3339() {
        let ts = Timestamp::parse("2024-03-15T10:30:00.500Z").unwrap();
        assert_eq!(ts.to_string(), "2024-03-15T10:30:00.500Z");

        // Offsets are normalized to UTC.
        let offset = Timestamp::parse("2024-03-15T12:30:00.500+02:00").unwrap();
        assert_eq!(offset, ts);
    }

    #[test]
    fn test_timestamp_epoch() {
        assert_eq!(Timestamp::new(0).to_string(), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_interval_parts() {
        let iv = Interval::from_parts(1, 2, 3, 4, 5);
        assert_eq!(iv.days(), 1);
        assert_eq!(iv.hours(), 2);
        assert_eq!(iv.minutes(), 3);
        assert_eq!(iv.seconds(), 4);
        assert_eq!(iv.to_string(), "P1DT2H3M4.005S");
        assert_eq!(Interval::new(0).to_string(), "PT0S");
    }

    #[test]
    fn test_decimal_parse_display() {
        let d: Decimal = "123.450".parse().unwrap();
        assert_eq!(d.scale(), 3);
        assert_eq!(d.to_string(), "123.450");

        let small: Decimal = "-0.05".parse().unwrap();
        assert_eq!(small.to_string(), "-0.05");

        let exp: Decimal = "1.5e2".parse().unwrap();
        assert_eq!(exp, "150".parse().unwrap());

        assert!("abc".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_decimal_scale_aligned_equality() {
        let a: Decimal = "1.10".parse().unwrap();
        let b: Decimal = "1.1".parse().unwrap();
        assert_eq!(a, b);
        assert!(a.to_string() != b.to_string());
    }

    #[test]
    fn test_decimal_ordering() {
        let a: Decimal = "1.05".parse().unwrap();
        let b: Decimal = "1.5".parse().unwrap();
        let c: Decimal = "-2".parse().unwrap();
        assert!(a < b);
        assert!(c < a);
    }

    #[test]
    fn test_decimal_to_i64() {
        let d: Decimal = "65.999".parse().unwrap();
        assert_eq!(d.to_i64_wrapping(), 65);

        let neg: Decimal = "-3.7".parse().unwrap();
        assert_eq!(neg.to_i64_wrapping(), -3);
    }

    #[test]
    fn test_decimal_from_f64() {
        assert_eq!(Decimal::from_f64(2.5), Some("2.5".parse().unwrap()));
        assert_eq!(Decimal::from_f64(f64::NAN), None);
        assert_eq!(Decimal::from_f64(f64::INFINITY), None);
    }
}
