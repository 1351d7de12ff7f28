//! Unit formatting for benchmark measurements.
//!
//! Every formatter has two forms: a `String` one for display and a
//! `Measurement` one that carries the rounded magnitude and unit along with
//! the text, so ranking never has to parse display strings back.

use serde::Serialize;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const MS_PER_SEC: f64 = 1000.0;

/// Placeholder text for values that are not finite numbers.
pub const NOT_AVAILABLE: &str = "n/a";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "MB")]
    Megabytes,
    #[serde(rename = "MB/s")]
    MegabytesPerSecond,
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Seconds => "s",
            Unit::Megabytes => "MB",
            Unit::MegabytesPerSecond => "MB/s",
        }
    }
}

/// A formatted value together with the number it was formatted from.
///
/// `magnitude` is in display units, rounded to two decimals, so two cells
/// that print the same also rank the same. A magnitude of 0 means "no data".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub magnitude: f64,
    pub unit: Unit,
    pub text: String,
}

impl Measurement {
    fn from_display_value(value: f64, unit: Unit) -> Self {
        if !value.is_finite() {
            return Self {
                magnitude: 0.0,
                unit,
                text: NOT_AVAILABLE.to_string(),
            };
        }
        let rounded = round2(value);
        Self {
            magnitude: rounded,
            unit,
            text: format!("{}{}", group_thousands(rounded), unit.suffix()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude == 0.0
    }
}

pub fn duration(ms: f64) -> Measurement {
    Measurement::from_display_value(ms / MS_PER_SEC, Unit::Seconds)
}

pub fn size(bytes: f64) -> Measurement {
    Measurement::from_display_value(bytes / BYTES_PER_MB, Unit::Megabytes)
}

/// Throughput of `bytes` processed in `ms`. Zero time yields zero speed.
pub fn speed(bytes: f64, ms: f64) -> Measurement {
    if ms == 0.0 {
        return Measurement {
            magnitude: 0.0,
            unit: Unit::MegabytesPerSecond,
            text: format!("0{}", Unit::MegabytesPerSecond.suffix()),
        };
    }
    Measurement::from_display_value(
        (bytes / BYTES_PER_MB) / (ms / MS_PER_SEC),
        Unit::MegabytesPerSecond,
    )
}

pub fn format_duration(ms: f64) -> String {
    duration(ms).text
}

pub fn format_size(bytes: f64) -> String {
    size(bytes).text
}

pub fn format_speed(bytes: f64, ms: f64) -> String {
    speed(bytes, ms).text
}

fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    // avoid "-0.00"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Two-decimal rendering with `,` thousands separators.
fn group_thousands(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_two_decimals() {
        assert_eq!(format_duration(1000.0), "1.00s");
        assert_eq!(format_duration(150.0), "0.15s");
        assert_eq!(format_duration(1234.0), "1.23s");
        assert_eq!(format_duration(0.0), "0.00s");
    }

    #[test]
    fn test_size_megabytes() {
        assert_eq!(format_size(1_048_576.0), "1.00MB");
        assert_eq!(format_size(1_572_864.0), "1.50MB");
        assert_eq!(format_size(0.0), "0.00MB");
    }

    #[test]
    fn test_speed_zero_time() {
        assert_eq!(format_speed(1_048_576.0, 0.0), "0MB/s");
        assert_eq!(speed(42.0, 0.0).magnitude, 0.0);
    }

    #[test]
    fn test_speed_throughput() {
        // 10 MB over 2 s
        assert_eq!(format_speed(10.0 * 1_048_576.0, 2000.0), "5.00MB/s");
    }

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(format_duration(2_871_750_000.0), "2,871,750.00s");
        assert_eq!(format_size(124_610_255_258.0), "118,837.60MB");
        assert_eq!(group_thousands(999.999), "1,000.00");
        assert_eq!(group_thousands(-1234.5), "-1,234.50");
    }

    #[test]
    fn test_magnitude_is_rounded_display_value() {
        let m = duration(4.0);
        assert_eq!(m.text, "0.00s");
        assert_eq!(m.magnitude, 0.0);
        assert!(m.is_empty());

        let m = size(3_758_274_642.0);
        assert_eq!(m.magnitude, 3584.17);
        assert_eq!(m.unit, Unit::Megabytes);
    }

    #[test]
    fn test_non_finite_is_not_available() {
        let m = duration(f64::NAN);
        assert_eq!(m.text, NOT_AVAILABLE);
        assert!(m.is_empty());
        assert_eq!(format_size(f64::INFINITY), NOT_AVAILABLE);
    }
}
