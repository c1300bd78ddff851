//! UUID, ULID and random token generators.
use std::sync::OnceLock;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::{Builder, Context, NoContext, Timestamp, Uuid, Variant};

use crate::error::{Result, ToolError};
use crate::random;

pub const MAX_BATCH: usize = 50;
pub const MAX_TOKEN_LENGTH: usize = 512;

const ULID_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const ULID_RANDOM_MASK: u128 = (1 << 80) - 1;

static NODE_ID: OnceLock<[u8; 6]> = OnceLock::new();
static V1_CONTEXT: OnceLock<Context> = OnceLock::new();

fn node_id() -> Result<&'static [u8; 6]> {
    if let Some(node) = NODE_ID.get() {
        return Ok(node);
    }
    let mut node = random::bytes::<6>()?;
    // random node ids must set the multicast bit (RFC 9562 6.10)
    node[0] |= 0x01;
    Ok(NODE_ID.get_or_init(|| node))
}

fn context_v1() -> Result<&'static Context> {
    if let Some(context) = V1_CONTEXT.get() {
        return Ok(context);
    }
    let seed = u16::from_ne_bytes(random::bytes::<2>()?);
    Ok(V1_CONTEXT.get_or_init(|| Context::new(seed)))
}

fn unix_parts(now: DateTime<Utc>) -> (u64, u32) {
    (now.timestamp().max(0) as u64, now.timestamp_subsec_nanos())
}

fn check_count(count: usize) -> Result<()> {
    if count == 0 || count > MAX_BATCH {
        return Err(ToolError::OutOfRange(format!(
            "count must be between 1 and {MAX_BATCH}"
        )));
    }
    Ok(())
}

fn parse_namespace(namespace: &str) -> Result<Uuid> {
    match namespace.trim().to_ascii_lowercase().as_str() {
        "dns" => Ok(Uuid::NAMESPACE_DNS),
        "url" => Ok(Uuid::NAMESPACE_URL),
        "oid" => Ok(Uuid::NAMESPACE_OID),
        "x500" => Ok(Uuid::NAMESPACE_X500),
        "" => Err(ToolError::EmptyInput("namespace")),
        other => {
            Uuid::parse_str(other).map_err(|err| ToolError::invalid("namespace", err.to_string()))
        }
    }
}

/// Generates `count` UUIDs of the requested version. `namespace` and `name`
/// are only read for the name-based versions 3 and 5, which are
/// deterministic and therefore repeat the same value `count` times.
pub fn generate_uuids(
    version: &str,
    count: usize,
    namespace: &str,
    name: &str,
) -> Result<Vec<String>> {
    check_count(count)?;
    let version = version.trim().to_ascii_lowercase();
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let id = match version.as_str() {
            "nil" => Uuid::nil(),
            "v1" => {
                let (seconds, nanos) = unix_parts(Utc::now());
                Uuid::new_v1(Timestamp::from_unix(context_v1()?, seconds, nanos), node_id()?)
            }
            "v3" => Uuid::new_v3(&parse_namespace(namespace)?, name.as_bytes()),
            "v4" | "" => Builder::from_random_bytes(random::bytes::<16>()?).into_uuid(),
            "v5" => Uuid::new_v5(&parse_namespace(namespace)?, name.as_bytes()),
            "v7" => {
                let (seconds, nanos) = unix_parts(Utc::now());
                Uuid::new_v7(Timestamp::from_unix(NoContext, seconds, nanos))
            }
            other => return Err(ToolError::unsupported("UUID version", other)),
        };
        out.push(id.to_string());
    }
    log::debug!("generated {count} {version} uuids");
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UuidDetails {
    pub hyphenated: String,
    pub uppercase: String,
    pub simple: String,
    pub braced: String,
    pub urn: String,
    pub version: usize,
    pub variant: String,
    pub timestamp: Option<String>,
}

pub fn inspect_uuid(text: &str) -> Result<UuidDetails> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ToolError::EmptyInput("UUID"));
    }
    let id = Uuid::parse_str(trimmed).map_err(|err| ToolError::invalid("UUID", err.to_string()))?;
    let variant = match id.get_variant() {
        Variant::NCS => "NCS",
        Variant::RFC4122 => "RFC 4122",
        Variant::Microsoft => "Microsoft",
        _ => "future",
    };
    let timestamp = id.get_timestamp().and_then(|ts| {
        let (seconds, nanos) = ts.to_unix();
        DateTime::<Utc>::from_timestamp(seconds as i64, nanos)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    });
    Ok(UuidDetails {
        hyphenated: id.hyphenated().to_string(),
        uppercase: id.hyphenated().to_string().to_uppercase(),
        simple: id.simple().to_string(),
        braced: id.braced().to_string(),
        urn: id.urn().to_string(),
        version: id.get_version_num(),
        variant: variant.to_string(),
        timestamp,
    })
}

pub fn encode_ulid(timestamp_ms: u64, randomness: u128) -> String {
    let mut chars = [0u8; 26];
    let mut ts = timestamp_ms & ((1u64 << 48) - 1);
    for idx in (0..10).rev() {
        chars[idx] = ULID_ALPHABET[(ts & 0x1f) as usize];
        ts >>= 5;
    }
    let mut rand = randomness & ULID_RANDOM_MASK;
    for idx in (10..26).rev() {
        chars[idx] = ULID_ALPHABET[(rand & 0x1f) as usize];
        rand >>= 5;
    }
    chars.iter().map(|&b| b as char).collect()
}

fn random_ulid_bits() -> Result<u128> {
    let bytes = random::bytes::<10>()?;
    Ok(bytes.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b)))
}

/// Generates ULIDs that sort strictly increasing within the batch: ids that
/// share a millisecond reuse the previous random part plus one.
pub fn generate_ulids(count: usize) -> Result<Vec<String>> {
    check_count(count)?;
    let mut out = Vec::with_capacity(count);
    let mut last: Option<(u64, u128)> = None;
    for _ in 0..count {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let (ts, rand) = match last {
            Some((prev_ts, prev_rand)) if now <= prev_ts => {
                if prev_rand == ULID_RANDOM_MASK {
                    return Err(ToolError::OutOfRange(
                        "ULID random component overflowed".into(),
                    ));
                }
                (prev_ts, prev_rand + 1)
            }
            _ => (now, random_ulid_bits()?),
        };
        out.push(encode_ulid(ts, rand));
        last = Some((ts, rand));
    }
    Ok(out)
}

pub fn decode_ulid_timestamp(ulid: &str) -> Result<u64> {
    let trimmed = ulid.trim();
    if trimmed.chars().count() != 26 {
        return Err(ToolError::invalid("ULID", "expected 26 characters"));
    }
    let mut ts = 0u64;
    for (idx, ch) in trimmed.chars().enumerate() {
        let value = crockford_value(ch)
            .ok_or_else(|| ToolError::invalid("ULID", format!("unexpected character '{ch}'")))?;
        if idx < 10 {
            ts = (ts << 5) | u64::from(value);
        }
    }
    if ts >> 48 != 0 {
        return Err(ToolError::invalid("ULID", "timestamp exceeds 48 bits"));
    }
    Ok(ts)
}

fn crockford_value(ch: char) -> Option<u8> {
    let normalized = match ch.to_ascii_uppercase() {
        'I' | 'L' => '1',
        'O' => '0',
        other => other,
    };
    ULID_ALPHABET
        .iter()
        .position(|&b| b as char == normalized)
        .map(|idx| idx as u8)
}

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>/?";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            length: 64,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: false,
        }
    }
}

pub fn generate_token(options: &TokenOptions) -> Result<String> {
    if options.length == 0 || options.length > MAX_TOKEN_LENGTH {
        return Err(ToolError::OutOfRange(format!(
            "length must be between 1 and {MAX_TOKEN_LENGTH}"
        )));
    }
    let classes: Vec<Vec<char>> = [
        (options.uppercase, UPPERCASE),
        (options.lowercase, LOWERCASE),
        (options.numbers, NUMBERS),
        (options.symbols, SYMBOLS),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .map(|(_, set)| set.chars().collect())
    .collect();
    if classes.is_empty() {
        return Err(ToolError::invalid("token options", "select at least one character set"));
    }
    let pool: Vec<char> = classes.iter().flatten().copied().collect();

    let mut chars = Vec::with_capacity(options.length);
    if options.length >= classes.len() {
        for class in &classes {
            chars.push(class[random::below(class.len() as u64)? as usize]);
        }
    }
    while chars.len() < options.length {
        chars.push(pool[random::below(pool.len() as u64)? as usize]);
    }
    random::shuffle(&mut chars)?;
    Ok(chars.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_versions_are_stamped() {
        for (version, digit) in [("v1", '1'), ("v4", '4'), ("v7", '7')] {
            let ids = generate_uuids(version, 3, "", "").unwrap();
            assert_eq!(ids.len(), 3);
            for id in ids {
                assert_eq!(id.len(), 36);
                assert_eq!(id.chars().nth(14), Some(digit), "{version}: {id}");
            }
        }
        assert_eq!(
            generate_uuids("nil", 1, "", "").unwrap(),
            vec!["00000000-0000-0000-0000-000000000000"]
        );
    }

    #[test]
    fn name_based_uuids_are_deterministic() {
        let v5 = generate_uuids("v5", 1, "dns", "example.com").unwrap();
        assert_eq!(v5[0], "cfbff0d1-9375-5685-968c-48ce8b15ae17");
        let v3 = generate_uuids("v3", 1, "DNS", "example.com").unwrap();
        assert_eq!(v3[0], "9073926b-929f-31c2-abc9-fad77ae3e8eb");
        assert!(generate_uuids("v5", 1, "", "x").is_err());
    }

    #[test]
    fn uuid_batch_limits() {
        assert!(generate_uuids("v4", 0, "", "").is_err());
        assert!(generate_uuids("v4", MAX_BATCH + 1, "", "").is_err());
        assert!(generate_uuids("v9", 1, "", "").is_err());
    }

    #[test]
    fn inspect_reports_forms_and_version() {
        let details = inspect_uuid("{CFBFF0D1-9375-5685-968C-48CE8B15AE17}").unwrap();
        assert_eq!(details.hyphenated, "cfbff0d1-9375-5685-968c-48ce8b15ae17");
        assert_eq!(details.simple, "cfbff0d193755685968c48ce8b15ae17");
        assert_eq!(details.urn, "urn:uuid:cfbff0d1-9375-5685-968c-48ce8b15ae17");
        assert_eq!(details.version, 5);
        assert_eq!(details.variant, "RFC 4122");
        assert!(details.timestamp.is_none());
        assert!(inspect_uuid("nope").is_err());
    }

    #[test]
    fn v7_inspection_recovers_timestamp() {
        let id = generate_uuids("v7", 1, "", "").unwrap().remove(0);
        let details = inspect_uuid(&id).unwrap();
        assert!(details.timestamp.unwrap().starts_with("20"));
    }

    #[test]
    fn ulid_encoding_matches_reference() {
        assert_eq!(encode_ulid(0, 0), "00000000000000000000000000");
        assert_eq!(
            encode_ulid(1_469_918_176_385, 0),
            "01ARYZ6S410000000000000000"
        );
        assert_eq!(decode_ulid_timestamp("01ARYZ6S41TSV4RRFFQ69G5FAV").unwrap(), 1_469_918_176_385);
        assert!(decode_ulid_timestamp("01ARYZ6S41").is_err());
        assert!(decode_ulid_timestamp("81ARYZ6S41TSV4RRFFQ69G5FAV").is_err());
        assert!(decode_ulid_timestamp("01ARYZ6S41TSV4RRFFQ69G5FA!").is_err());
        assert!(decode_ulid_timestamp("01ARYZ6S41UUUUUUUUUUUUUUUU").is_err());
    }

    #[test]
    fn ulid_batches_are_strictly_increasing() {
        let ids = generate_ulids(MAX_BATCH).unwrap();
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(ids.iter().all(|id| id.len() == 26));
    }

    #[test]
    fn tokens_cover_each_enabled_class() {
        let options = TokenOptions {
            length: 12,
            symbols: true,
            ..TokenOptions::default()
        };
        for _ in 0..20 {
            let token = generate_token(&options).unwrap();
            assert_eq!(token.chars().count(), 12);
            assert!(token.chars().any(|c| c.is_ascii_uppercase()));
            assert!(token.chars().any(|c| c.is_ascii_lowercase()));
            assert!(token.chars().any(|c| c.is_ascii_digit()));
            assert!(token.chars().any(|c| SYMBOLS.contains(c)));
        }
    }

    #[test]
    fn token_options_are_validated() {
        let none = TokenOptions {
            uppercase: false,
            lowercase: false,
            numbers: false,
            symbols: false,
            ..TokenOptions::default()
        };
        assert!(generate_token(&none).is_err());
        let long = TokenOptions {
            length: MAX_TOKEN_LENGTH + 1,
            ..TokenOptions::default()
        };
        assert!(generate_token(&long).is_err());
        let digits = TokenOptions {
            length: 6,
            uppercase: false,
            lowercase: false,
            ..TokenOptions::default()
        };
        assert!(generate_token(&digits).unwrap().chars().all(|c| c.is_ascii_digit()));
    }
}
