//! HOTP (RFC 4226) and TOTP (RFC 6238) one-time passwords over HMAC-SHA1.
use data_encoding::BASE32_NOPAD;
use hmac::Hmac;
use serde::{Deserialize, Serialize};
use sha1::Sha1;

use crate::error::{Result, ToolError};
use crate::hashing::mac_bytes;
use crate::random;

const SECRET_BYTES: usize = 20;

pub fn generate_totp_secret() -> Result<String> {
    Ok(BASE32_NOPAD.encode(&random::bytes::<SECRET_BYTES>()?))
}

/// Decodes a Base32 secret the way authenticator apps do: case-insensitive,
/// with spaces, dashes and `=` padding ignored.
pub fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    let cleaned: String = secret
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '='))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        return Err(ToolError::EmptyInput("secret"));
    }
    BASE32_NOPAD
        .decode(cleaned.as_bytes())
        .map_err(|err| ToolError::invalid("base32 secret", err.to_string()))
}

pub fn hotp(key: &[u8], counter: u64, digits: u32) -> Result<String> {
    if !(6..=8).contains(&digits) {
        return Err(ToolError::OutOfRange(format!(
            "digits must be between 6 and 8, got {digits}"
        )));
    }
    let mac = mac_bytes::<Hmac<Sha1>>(key, &counter.to_be_bytes())?;
    let offset = usize::from(mac[mac.len() - 1] & 0x0f);
    let binary = u32::from_be_bytes([
        mac[offset] & 0x7f,
        mac[offset + 1],
        mac[offset + 2],
        mac[offset + 3],
    ]);
    let code = binary % 10u32.pow(digits);
    Ok(format!("{code:0width$}", width = digits as usize))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TotpOptions {
    pub secret: String,
    pub period: u64,
    pub digits: u32,
    /// Milliseconds since the epoch; the current time when absent.
    pub timestamp_ms: Option<i64>,
}

impl Default for TotpOptions {
    fn default() -> Self {
        Self {
            secret: String::new(),
            period: 30,
            digits: 6,
            timestamp_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpCodes {
    pub previous: String,
    pub current: String,
    pub next: String,
    pub seconds_remaining: u64,
    pub counter: u64,
    pub counter_hex: String,
}

pub fn totp(options: &TotpOptions) -> Result<TotpCodes> {
    if options.period == 0 {
        return Err(ToolError::OutOfRange("period must be positive".into()));
    }
    let key = decode_secret(&options.secret)?;
    let now_ms = options
        .timestamp_ms
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    if now_ms < 0 {
        return Err(ToolError::OutOfRange("timestamp precedes the epoch".into()));
    }
    let seconds = now_ms as u64 / 1000;
    let counter = seconds / options.period;
    log::debug!("totp counter {counter} for {}-digit codes", options.digits);
    Ok(TotpCodes {
        previous: hotp(&key, counter.saturating_sub(1), options.digits)?,
        current: hotp(&key, counter, options.digits)?,
        next: hotp(&key, counter + 1, options.digits)?,
        seconds_remaining: options.period - seconds % options.period,
        counter,
        counter_hex: format!("{counter:016x}"),
    })
}

/// Key URI understood by authenticator apps (the Google Authenticator format).
pub fn otpauth_uri(secret: &str, issuer: &str, account: &str, period: u64, digits: u32) -> String {
    let secret: String = secret
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '='))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let label = if issuer.is_empty() {
        urlencoding::encode(account).into_owned()
    } else {
        format!(
            "{}:{}",
            urlencoding::encode(issuer),
            urlencoding::encode(account)
        )
    };
    let mut uri = format!("otpauth://totp/{label}?secret={secret}");
    if !issuer.is_empty() {
        uri.push_str(&format!("&issuer={}", urlencoding::encode(issuer)));
    }
    uri.push_str(&format!("&algorithm=SHA1&digits={digits}&period={period}"));
    uri
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC_KEY: &[u8] = b"12345678901234567890";
    const RFC_KEY_BASE32: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test]
    fn hotp_matches_rfc_4226_vectors() {
        let expected = [
            "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583",
            "399871", "520489",
        ];
        for (counter, code) in expected.iter().enumerate() {
            assert_eq!(hotp(RFC_KEY, counter as u64, 6).unwrap(), *code, "counter {counter}");
        }
        assert!(hotp(RFC_KEY, 0, 5).is_err());
    }

    #[test]
    fn totp_matches_rfc_6238_sha1_vectors() {
        for (seconds, code) in [
            (59i64, "94287082"),
            (1_111_111_109, "07081804"),
            (1_234_567_890, "89005924"),
            (2_000_000_000, "69279037"),
        ] {
            let codes = totp(&TotpOptions {
                secret: RFC_KEY_BASE32.to_string(),
                digits: 8,
                timestamp_ms: Some(seconds * 1000),
                ..TotpOptions::default()
            })
            .unwrap();
            assert_eq!(codes.current, code, "t={seconds}");
        }
    }

    #[test]
    fn totp_window_and_counter() {
        let codes = totp(&TotpOptions {
            secret: "gezd gnbv gy3t qojq gezd gnbv gy3t qojq".to_string(),
            timestamp_ms: Some(59_000),
            ..TotpOptions::default()
        })
        .unwrap();
        assert_eq!(codes.counter, 1);
        assert_eq!(codes.counter_hex, "0000000000000001");
        assert_eq!(codes.seconds_remaining, 1);
        assert_eq!(codes.previous, "755224");
        assert_eq!(codes.current, "287082");
        assert_eq!(codes.next, "359152");
    }

    #[test]
    fn generated_secrets_decode_to_twenty_bytes() {
        let secret = generate_totp_secret().unwrap();
        assert_eq!(secret.len(), 32);
        assert_eq!(decode_secret(&secret).unwrap().len(), SECRET_BYTES);
        assert!(decode_secret("not base32!").is_err());
        assert!(decode_secret("  ").is_err());
    }

    #[test]
    fn otpauth_uri_escapes_label() {
        assert_eq!(
            otpauth_uri("jbsw y3dp", "ACME Co", "ada@example.com", 30, 6),
            concat!(
                "otpauth://totp/ACME%20Co:ada%40example.com?secret=JBSWY3DP",
                "&issuer=ACME%20Co&algorithm=SHA1&digits=6&period=30"
            )
        );
    }
}
