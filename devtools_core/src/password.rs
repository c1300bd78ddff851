//! Brute-force password strength estimate.
use serde::Serialize;

pub const DEFAULT_GUESSES_PER_SECOND: f64 = 1e9;

const SYMBOL_CLASS_SIZE: u32 = 32;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordStrength {
    pub password_length: usize,
    pub charset_size: u32,
    pub entropy: f64,
    pub seconds_to_crack: f64,
    pub crack_duration: String,
    /// 0.0 ..= 1.0, reaching 1.0 at 128 bits of entropy.
    pub score: f64,
}

pub fn analyse_password(password: &str, guesses_per_second: f64) -> PasswordStrength {
    let guesses_per_second = if guesses_per_second > 0.0 {
        guesses_per_second
    } else {
        DEFAULT_GUESSES_PER_SECOND
    };
    let length = password.chars().count();
    let charset = charset_size(password);
    log::debug!("scoring {length} character password");
    let entropy = if length == 0 {
        0.0
    } else {
        length as f64 * f64::from(charset).log2()
    };
    let seconds = 2f64.powf(entropy) / guesses_per_second;
    PasswordStrength {
        password_length: length,
        charset_size: charset,
        entropy,
        seconds_to_crack: seconds,
        crack_duration: human_duration(seconds),
        score: (entropy / 128.0).min(1.0),
    }
}

pub fn charset_size(password: &str) -> u32 {
    let has = |pred: fn(&char) -> bool| password.chars().any(|c| pred(&c));
    [
        (has(char::is_ascii_lowercase), 26),
        (has(char::is_ascii_uppercase), 26),
        (has(char::is_ascii_digit), 10),
        (has(|c| !c.is_ascii_alphanumeric()), SYMBOL_CLASS_SIZE),
    ]
    .iter()
    .filter(|(present, _)| *present)
    .map(|(_, size)| size)
    .sum()
}

const UNITS_MS: [(&str, &str, f64); 10] = [
    ("millennium", "millennia", 31_536_000_000_000.0),
    ("century", "centuries", 3_153_600_000_000.0),
    ("year", "years", 31_536_000_000.0),
    ("month", "months", 2_592_000_000.0),
    ("week", "weeks", 604_800_000.0),
    ("day", "days", 86_400_000.0),
    ("hour", "hours", 3_600_000.0),
    ("minute", "minutes", 60_000.0),
    ("second", "seconds", 1_000.0),
    ("millisecond", "milliseconds", 1.0),
];

/// Two largest non-zero units, e.g. `3 years, 2 months`.
pub fn human_duration(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "Forever".to_string();
    }
    let mut remaining = seconds * 1000.0;
    if remaining < 1.0 {
        return "Instantly".to_string();
    }
    UNITS_MS
        .iter()
        .filter_map(|(singular, plural, size)| {
            let count = (remaining / size).floor();
            if count < 1.0 {
                return None;
            }
            remaining -= count * size;
            let unit = if count == 1.0 { singular } else { plural };
            Some(format!("{count:.0} {unit}"))
        })
        .take(2)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charset_counts_classes_once() {
        assert_eq!(charset_size(""), 0);
        assert_eq!(charset_size("abc"), 26);
        assert_eq!(charset_size("aB3"), 62);
        assert_eq!(charset_size("aB3!"), 94);
        assert_eq!(charset_size("é"), 32);
    }

    #[test]
    fn empty_password_is_instant() {
        let strength = analyse_password("", DEFAULT_GUESSES_PER_SECOND);
        assert_eq!(strength.entropy, 0.0);
        assert_eq!(strength.score, 0.0);
        assert_eq!(strength.crack_duration, "Instantly");
    }

    #[test]
    fn entropy_follows_length_and_charset() {
        let strength = analyse_password("abcdefgh", DEFAULT_GUESSES_PER_SECOND);
        assert_eq!(strength.charset_size, 26);
        assert!((strength.entropy - 8.0 * 26f64.log2()).abs() < 1e-9);
        // 26^8 / 1e9 ~ 208.8 seconds
        assert_eq!(strength.crack_duration, "3 minutes, 28 seconds");
        let long = analyse_password(&"aB3!".repeat(10), DEFAULT_GUESSES_PER_SECOND);
        assert_eq!(long.score, 1.0);
        assert!(long.crack_duration.contains("millennia"));
    }

    #[test]
    fn slower_attackers_take_longer() {
        let fast = analyse_password("hunter2", 1e12);
        let slow = analyse_password("hunter2", 1e3);
        assert!(slow.seconds_to_crack > fast.seconds_to_crack);
        assert!((analyse_password("x", 0.0).seconds_to_crack - 26.0 / 1e9).abs() < 1e-15);
    }

    #[test]
    fn durations_use_two_largest_units() {
        assert_eq!(human_duration(0.0005), "Instantly");
        assert_eq!(human_duration(0.25), "250 milliseconds");
        assert_eq!(human_duration(90_061.0), "1 day, 1 hour");
        assert_eq!(human_duration(86_400.0 + 30.0), "1 day, 30 seconds");
        assert_eq!(human_duration(f64::INFINITY), "Forever");
    }
}
