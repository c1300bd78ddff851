//! MAC address generation and IPv6 unique local prefixes derived from a MAC.
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{Result, ToolError};
use crate::random;

pub const MAX_MACS: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MacOptions {
    pub count: usize,
    /// Leading octets (OUI) kept as-is; separators in it are ignored.
    pub prefix: String,
    /// One of `:`, `-`, `.` (Cisco style, groups of four) or empty.
    pub separator: String,
    pub uppercase: bool,
}

impl Default for MacOptions {
    fn default() -> Self {
        Self {
            count: 1,
            prefix: "64:16:7F".into(),
            separator: ":".into(),
            uppercase: true,
        }
    }
}

pub fn generate_macs(options: &MacOptions) -> Result<Vec<String>> {
    if options.count == 0 || options.count > MAX_MACS {
        return Err(ToolError::OutOfRange(format!(
            "MAC count must be between 1 and {MAX_MACS}"
        )));
    }
    if !matches!(options.separator.as_str(), ":" | "-" | "." | "") {
        return Err(ToolError::unsupported("MAC separator", &options.separator));
    }
    let prefix = parse_prefix(&options.prefix)?;
    (0..options.count)
        .map(|_| {
            let mut octets = [0u8; 6];
            octets[..prefix.len()].copy_from_slice(&prefix);
            random::fill(&mut octets[prefix.len()..])?;
            Ok(format_mac(&octets, &options.separator, options.uppercase))
        })
        .collect()
}

fn parse_prefix(prefix: &str) -> Result<Vec<u8>> {
    let digits: String = prefix
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.' | ' '))
        .collect();
    if digits.len() % 2 != 0 || digits.len() > 12 {
        return Err(ToolError::invalid(
            "MAC prefix",
            "expected up to six whole octets",
        ));
    }
    hex::decode(&digits).map_err(|err| ToolError::invalid("MAC prefix", err.to_string()))
}

pub fn format_mac(octets: &[u8; 6], separator: &str, uppercase: bool) -> String {
    let digits = if uppercase {
        hex::encode_upper(octets)
    } else {
        hex::encode(octets)
    };
    let group = if separator == "." { 4 } else { 2 };
    digits
        .as_bytes()
        .chunks(group)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Parses `aa:bb:cc:dd:ee:ff`, `aa-bb-...`, `aabb.ccdd.eeff` or bare hex.
pub fn parse_mac(input: &str) -> Result<[u8; 6]> {
    let digits: String = input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .collect();
    let invalid = || ToolError::invalid("MAC address", input.trim());
    let bytes = hex::decode(&digits).map_err(|_| invalid())?;
    <[u8; 6]>::try_from(bytes.as_slice()).map_err(|_| invalid())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UlaPrefix {
    pub ula: String,
    pub first_routable_block: String,
    pub last_routable_block: String,
}

/// RFC 4193 style unique local prefix: 40 bits of SHA-1 over the current
/// time in milliseconds followed by the MAC text.
pub fn ipv6_ula(mac: &str) -> Result<UlaPrefix> {
    ula_for(mac, chrono::Utc::now().timestamp_millis())
}

pub fn ula_for(mac: &str, timestamp_ms: i64) -> Result<UlaPrefix> {
    parse_mac(mac)?;
    let digest = Sha1::digest(format!("{timestamp_ms}{}", mac.trim()).as_bytes());
    let global_id = hex::encode(&digest[15..]);
    let ula = format!(
        "fd{}:{}:{}",
        &global_id[..2],
        &global_id[2..6],
        &global_id[6..]
    );
    log::debug!("derived ULA {ula} from {mac}");
    Ok(UlaPrefix {
        first_routable_block: format!("{ula}:0::/64"),
        last_routable_block: format!("{ula}:ffff::/64"),
        ula: format!("{ula}::/48"),
    })
}

/// Random non-privileged TCP/UDP port.
pub fn random_port() -> Result<u16> {
    let offset = random::below(65536 - 1024)?;
    Ok(1024 + offset as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_macs_keep_prefix_and_format() {
        let macs = generate_macs(&MacOptions {
            count: 5,
            ..MacOptions::default()
        })
        .unwrap();
        assert_eq!(macs.len(), 5);
        for mac in &macs {
            assert!(mac.starts_with("64:16:7F:"), "{mac}");
            assert_eq!(mac.len(), 17);
            assert!(parse_mac(mac).is_ok());
        }
    }

    #[test]
    fn cisco_and_bare_layouts() {
        let octets = [0x00, 0x1a, 0x2b, 0x3c, 0x4d, 0x5e];
        assert_eq!(format_mac(&octets, ".", false), "001a.2b3c.4d5e");
        assert_eq!(format_mac(&octets, "", true), "001A2B3C4D5E");
        assert_eq!(format_mac(&octets, "-", true), "00-1A-2B-3C-4D-5E");
    }

    #[test]
    fn full_prefix_is_a_fixed_address() {
        let macs = generate_macs(&MacOptions {
            count: 2,
            prefix: "aa-bb-cc-dd-ee-ff".into(),
            separator: "-".into(),
            uppercase: false,
        })
        .unwrap();
        assert_eq!(macs, vec!["aa-bb-cc-dd-ee-ff"; 2]);
    }

    #[test]
    fn rejects_bad_options() {
        let bad_count = MacOptions {
            count: 0,
            ..MacOptions::default()
        };
        assert!(generate_macs(&bad_count).is_err());
        let bad_prefix = MacOptions {
            prefix: "ABC".into(),
            ..MacOptions::default()
        };
        assert!(generate_macs(&bad_prefix).is_err());
        let bad_separator = MacOptions {
            separator: "/".into(),
            ..MacOptions::default()
        };
        assert!(generate_macs(&bad_separator).is_err());
    }

    #[test]
    fn ula_is_deterministic_for_a_timestamp() {
        let first = ula_for("20:37:06:12:34:56", 1_700_000_000_000).unwrap();
        let again = ula_for("20:37:06:12:34:56", 1_700_000_000_000).unwrap();
        assert_eq!(first, again);
        assert!(first.ula.starts_with("fd"));
        assert!(first.ula.ends_with("::/48"));
        let prefix = first.ula.trim_end_matches("::/48");
        assert_eq!(prefix.len(), "fdxx:xxxx:xxxx".len());
        assert_eq!(first.first_routable_block, format!("{prefix}:0::/64"));
        assert_eq!(first.last_routable_block, format!("{prefix}:ffff::/64"));
        assert!(ula_for("not-a-mac", 0).is_err());
    }

    #[test]
    fn ports_stay_unprivileged() {
        for _ in 0..100 {
            assert!(random_port().unwrap() >= 1024);
        }
    }
}
