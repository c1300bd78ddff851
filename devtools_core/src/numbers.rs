//! Number tools: arbitrary-precision base conversion, Roman numerals,
//! temperature scales and percentages.
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use serde::Serialize;

use crate::error::{Result, ToolError};

/// Digit alphabet for bases up to 64; bases up to 36 read it case-insensitively.
const DIGITS: &[u8; 64] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+/";
const RFC4648_BASE32: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Radix {
    Positional(u32),
    Base32,
}

impl Radix {
    fn named(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        Ok(match normalized.as_str() {
            "binary" | "bin" => Self::Positional(2),
            "octal" | "oct" => Self::Positional(8),
            "decimal" | "dec" => Self::Positional(10),
            "hex" | "hexadecimal" => Self::Positional(16),
            "base32" => Self::Base32,
            "base36" => Self::Positional(36),
            "base62" => Self::Positional(62),
            "base64" => Self::Positional(64),
            other => Self::Positional(check_base(
                other
                    .parse::<u32>()
                    .map_err(|_| ToolError::unsupported("base", name.trim()))?,
            )?),
        })
    }

    fn base(self) -> u32 {
        match self {
            Self::Positional(base) => base,
            Self::Base32 => 32,
        }
    }

    fn digit_value(self, ch: u8) -> Option<u8> {
        let value = match self {
            Self::Base32 => RFC4648_BASE32
                .iter()
                .position(|d| *d == ch.to_ascii_uppercase())?,
            Self::Positional(base) if base <= 36 => DIGITS
                .iter()
                .position(|d| *d == ch.to_ascii_lowercase())?,
            Self::Positional(_) => DIGITS.iter().position(|d| *d == ch)?,
        };
        (value < self.base() as usize).then_some(value as u8)
    }

    fn digit_char(self, value: u8) -> char {
        match self {
            Self::Base32 => char::from(RFC4648_BASE32[usize::from(value)]),
            Self::Positional(_) => char::from(DIGITS[usize::from(value)]),
        }
    }

    fn prefix(self) -> Option<&'static str> {
        match self {
            Self::Positional(2) => Some("0b"),
            Self::Positional(8) => Some("0o"),
            Self::Positional(16) => Some("0x"),
            _ => None,
        }
    }
}

fn check_base(base: u32) -> Result<u32> {
    if (2..=64).contains(&base) {
        Ok(base)
    } else {
        Err(ToolError::OutOfRange(format!(
            "base must be between 2 and 64, got {base}"
        )))
    }
}

fn parse_in(radix: Radix, value: &str) -> Result<BigInt> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != '_' && !c.is_whitespace())
        .collect();
    let (negative, unsigned) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let digits = radix
        .prefix()
        .and_then(|prefix| {
            unsigned
                .get(..2)
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| &unsigned[2..])
        })
        .unwrap_or(unsigned);
    if digits.is_empty() {
        return Err(ToolError::EmptyInput("number"));
    }
    let values = digits
        .bytes()
        .map(|ch| radix.digit_value(ch))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(|| ToolError::invalid("digit for this base", digits))?;
    let magnitude = BigUint::from_radix_be(&values, radix.base())
        .ok_or_else(|| ToolError::invalid("number", digits))?;
    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Ok(BigInt::from_biguint(sign, magnitude))
}

fn format_in(radix: Radix, value: &BigInt) -> String {
    let rendered: String = value
        .magnitude()
        .to_radix_be(radix.base())
        .into_iter()
        .map(|digit| radix.digit_char(digit))
        .collect();
    if value.sign() == Sign::Minus && !value.is_zero() {
        format!("-{rendered}")
    } else {
        rendered
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseConversion {
    pub binary: String,
    pub octal: String,
    pub decimal: String,
    pub hex: String,
    pub base32: String,
    pub base36: String,
    pub base62: String,
    pub base64: String,
}

/// Reads `value` in `from_base` (a name such as `hex` or a number 2..=64) and
/// renders it in every common base.
pub fn convert_base(value: &str, from_base: &str) -> Result<BaseConversion> {
    let number = parse_in(Radix::named(from_base)?, value)?;
    log::debug!("converting {}-bit integer", number.bits());
    Ok(BaseConversion {
        binary: format_in(Radix::Positional(2), &number),
        octal: format_in(Radix::Positional(8), &number),
        decimal: number.to_string(),
        hex: format_in(Radix::Positional(16), &number).to_uppercase(),
        base32: format_in(Radix::Base32, &number),
        base36: format_in(Radix::Positional(36), &number),
        base62: format_in(Radix::Positional(62), &number),
        base64: format_in(Radix::Positional(64), &number),
    })
}

pub fn convert_to_base(value: &str, from_base: u32, to_base: u32) -> Result<String> {
    let from = Radix::Positional(check_base(from_base)?);
    let to = Radix::Positional(check_base(to_base)?);
    Ok(format_in(to, &parse_in(from, value)?))
}

const ROMAN: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

pub const MAX_ROMAN: u32 = 3999;

pub fn to_roman(number: u32) -> Result<String> {
    if !(1..=MAX_ROMAN).contains(&number) {
        return Err(ToolError::OutOfRange(format!(
            "roman numerals cover 1 to {MAX_ROMAN}, got {number}"
        )));
    }
    let mut remaining = number;
    let mut out = String::new();
    for (value, symbol) in ROMAN {
        while remaining >= value {
            out.push_str(symbol);
            remaining -= value;
        }
    }
    Ok(out)
}

/// Only the canonical spelling is accepted, so `IIII` or `VX` are rejected.
pub fn from_roman(text: &str) -> Result<u32> {
    let upper = text.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(ToolError::EmptyInput("roman numeral"));
    }
    let mut rest = upper.as_str();
    let mut total = 0u32;
    for (value, symbol) in ROMAN {
        while let Some(tail) = rest.strip_prefix(symbol) {
            total = total
                .checked_add(value)
                .ok_or_else(|| ToolError::invalid("roman numeral", "value too large"))?;
            rest = tail;
        }
    }
    let canonical = to_roman(total).ok();
    if rest.is_empty() && canonical.as_deref() == Some(upper.as_str()) {
        Ok(total)
    } else {
        Err(ToolError::invalid("roman numeral", text.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureScales {
    pub kelvin: f64,
    pub celsius: f64,
    pub fahrenheit: f64,
    pub rankine: f64,
    pub delisle: f64,
    pub newton: f64,
    pub reaumur: f64,
    pub romer: f64,
}

pub fn convert_temperature(value: f64, unit: &str) -> Result<TemperatureScales> {
    if !value.is_finite() {
        return Err(ToolError::invalid("temperature", value.to_string()));
    }
    let kelvin = match unit.trim().to_ascii_lowercase().as_str() {
        "kelvin" | "k" => value,
        "celsius" | "c" => value + 273.15,
        "fahrenheit" | "f" => (value + 459.67) * 5.0 / 9.0,
        "rankine" | "r" => value * 5.0 / 9.0,
        "delisle" | "de" => 373.15 - value * 2.0 / 3.0,
        "newton" | "n" => value * 100.0 / 33.0 + 273.15,
        "reaumur" | "re" => value * 5.0 / 4.0 + 273.15,
        "romer" | "ro" => (value - 7.5) * 40.0 / 21.0 + 273.15,
        other => return Err(ToolError::unsupported("temperature unit", other)),
    };
    let celsius = kelvin - 273.15;
    Ok(TemperatureScales {
        kelvin,
        celsius,
        fahrenheit: kelvin * 9.0 / 5.0 - 459.67,
        rankine: kelvin * 9.0 / 5.0,
        delisle: (373.15 - kelvin) * 3.0 / 2.0,
        newton: celsius * 33.0 / 100.0,
        reaumur: celsius * 4.0 / 5.0,
        romer: celsius * 21.0 / 40.0 + 7.5,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Percentages {
    pub x_percent_of_y: f64,
    /// `None` when `y` is zero.
    pub x_is_what_percent_of_y: Option<f64>,
    /// `None` when `x` is zero.
    pub percent_change_from_x_to_y: Option<f64>,
}

pub fn percentage(x: f64, y: f64) -> Percentages {
    Percentages {
        x_percent_of_y: x * y / 100.0,
        x_is_what_percent_of_y: (y != 0.0).then(|| x * 100.0 / y),
        percent_change_from_x_to_y: (x != 0.0).then(|| (y - x) * 100.0 / x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_between_named_bases() {
        let result = convert_base("0xFF_FF", "hex").unwrap();
        assert_eq!(result.binary, "1111111111111111");
        assert_eq!(result.octal, "177777");
        assert_eq!(result.decimal, "65535");
        assert_eq!(result.hex, "FFFF");
        assert_eq!(result.base36, "1ekf");
        assert_eq!(result.base62, "h31");
        assert_eq!(result.base64, "f//");
        assert_eq!(result.base32, "B777");
    }

    #[test]
    fn handles_big_and_negative_values() {
        let huge = "123456789012345678901234567890";
        let result = convert_base(huge, "decimal").unwrap();
        assert_eq!(result.decimal, huge);
        assert_eq!(convert_to_base(&result.hex, 16, 10).unwrap(), huge);
        assert_eq!(convert_base("-0b1010", "binary").unwrap().decimal, "-10");
        assert_eq!(convert_base("-0", "decimal").unwrap().hex, "0");
    }

    #[test]
    fn base_conversion_validates_digits_and_bases() {
        assert!(convert_base("12", "binary").is_err());
        assert!(convert_base("", "hex").is_err());
        assert!(convert_base("0x", "hex").is_err());
        assert!(convert_base("1", "base99").is_err());
        assert!(convert_to_base("1", 1, 10).is_err());
        assert!(convert_to_base("1", 10, 65).is_err());
        assert_eq!(convert_to_base("zz", 36, 10).unwrap(), "1295");
        assert_eq!(convert_to_base("ZZ", 36, 10).unwrap(), "1295");
        assert_eq!(convert_to_base("Zz", 62, 10).unwrap(), "3817");
    }

    #[test]
    fn roman_numerals_round_trip_over_the_full_range() {
        for number in 1..=MAX_ROMAN {
            let roman = to_roman(number).unwrap();
            assert_eq!(from_roman(&roman).unwrap(), number, "{roman}");
        }
        assert_eq!(to_roman(1994).unwrap(), "MCMXCIV");
        assert_eq!(from_roman("mmxxiv").unwrap(), 2024);
        assert!(to_roman(0).is_err());
        assert!(to_roman(4000).is_err());
        for bad in ["IIII", "VX", "IC", "MMMM", "ABC", ""] {
            assert!(from_roman(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn endless_thousands_are_rejected_without_overflow() {
        let huge = "M".repeat(4_300_000);
        assert!(from_roman(&huge).is_err());
    }

    #[test]
    fn temperature_fixed_points() {
        let boiling = convert_temperature(100.0, "celsius").unwrap();
        let close = |a: f64, b: f64| (a - b).abs() < 1e-9;
        assert!(close(boiling.kelvin, 373.15));
        assert!(close(boiling.fahrenheit, 212.0));
        assert!(close(boiling.rankine, 671.67));
        assert!(close(boiling.delisle, 0.0));
        assert!(close(boiling.newton, 33.0));
        assert!(close(boiling.reaumur, 80.0));
        assert!(close(boiling.romer, 60.0));

        let freezing = convert_temperature(32.0, "F").unwrap();
        assert!(close(freezing.celsius, 0.0));
        assert!(close(convert_temperature(7.5, "romer").unwrap().celsius, 0.0));
        assert!(convert_temperature(1.0, "gas mark").is_err());
    }

    #[test]
    fn percentages() {
        let result = percentage(20.0, 50.0);
        assert_eq!(result.x_percent_of_y, 10.0);
        assert_eq!(result.x_is_what_percent_of_y, Some(40.0));
        assert_eq!(result.percent_change_from_x_to_y, Some(150.0));
        let zero = percentage(0.0, 0.0);
        assert_eq!(zero.x_is_what_percent_of_y, None);
        assert_eq!(zero.percent_change_from_x_to_y, None);
    }
}
