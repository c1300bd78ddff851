//! IPv4 subnet calculator, address converter and range tools.
//!
//! All arithmetic runs on the `u32` form of an address.
use std::net::Ipv4Addr;

use serde::Serialize;

use crate::error::{Result, ToolError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetInfo {
    pub address: String,
    pub network_address: String,
    pub netmask: String,
    pub wildcard_mask: String,
    pub cidr: String,
    pub prefix_length: u8,
    pub network_size: u64,
    pub usable_hosts: u64,
    pub first_address: String,
    pub last_address: String,
    pub broadcast_address: Option<String>,
    pub ip_class: String,
    pub previous_block: Option<String>,
    pub next_block: Option<String>,
}

/// Accepts `a.b.c.d`, `a.b.c.d/len` or `a.b.c.d/mask`. A bare address is a
/// `/32`. Prefixes 31 and 32 have no broadcast and every address is usable
/// (RFC 3021).
pub fn ipv4_subnet(input: &str) -> Result<SubnetInfo> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ToolError::EmptyInput("IPv4 address"));
    }
    let (ip, prefix) = match trimmed.split_once('/') {
        Some((addr, suffix)) => (parse_ipv4(addr)?, parse_prefix(suffix)?),
        None => (parse_ipv4(trimmed)?, 32),
    };
    let mask = prefix_to_mask(prefix);
    let network = u32::from(ip) & mask;
    let broadcast = network | !mask;
    let size = 1u64 << (32 - u32::from(prefix));

    let (first, last, usable, broadcast_address) = if prefix >= 31 {
        (network, broadcast, size, None)
    } else {
        (
            network + 1,
            broadcast - 1,
            size - 2,
            Some(Ipv4Addr::from(broadcast).to_string()),
        )
    };
    let previous_block = u64::from(network)
        .checked_sub(size)
        .map(|start| format!("{}/{prefix}", Ipv4Addr::from(start as u32)));
    let next_start = u64::from(network) + size;
    let next_block = (next_start <= u64::from(u32::MAX))
        .then(|| format!("{}/{prefix}", Ipv4Addr::from(next_start as u32)));

    Ok(SubnetInfo {
        address: ip.to_string(),
        network_address: Ipv4Addr::from(network).to_string(),
        netmask: Ipv4Addr::from(mask).to_string(),
        wildcard_mask: Ipv4Addr::from(!mask).to_string(),
        cidr: format!("{}/{prefix}", Ipv4Addr::from(network)),
        prefix_length: prefix,
        network_size: size,
        usable_hosts: usable,
        first_address: Ipv4Addr::from(first).to_string(),
        last_address: Ipv4Addr::from(last).to_string(),
        broadcast_address,
        ip_class: ip_class(ip).to_string(),
        previous_block,
        next_block,
    })
}

pub fn ip_class(ip: Ipv4Addr) -> &'static str {
    match ip.octets()[0] {
        0..=127 => "A",
        128..=191 => "B",
        192..=223 => "C",
        224..=239 => "D (multicast)",
        _ => "E (reserved)",
    }
}

/// Every textual form of one IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForms {
    pub dotted: String,
    pub three_part: String,
    pub two_part: String,
    pub integer: String,
    pub hex: String,
    pub binary: String,
    pub ipv6: String,
    pub ipv6_short: String,
}

pub fn address_forms(ip: Ipv4Addr) -> AddressForms {
    let [a, b, c, d] = ip.octets();
    let value = u32::from(ip);
    let high = value >> 16;
    let low = value & 0xffff;
    AddressForms {
        dotted: ip.to_string(),
        three_part: format!("{a}.{b}.{}", (u32::from(c) << 8) | u32::from(d)),
        two_part: format!("{a}.{}", value & 0x00ff_ffff),
        integer: value.to_string(),
        hex: format!("{value:08X}"),
        binary: format!("{value:032b}"),
        ipv6: format!("0000:0000:0000:0000:0000:ffff:{high:04x}:{low:04x}"),
        ipv6_short: format!("::ffff:{high:x}:{low:x}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ipv4InputKind {
    Single,
    Network,
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ipv4Info {
    #[serde(rename = "type")]
    pub kind: Ipv4InputKind,
    pub input: String,
    /// Exact CIDR cover of the input, smallest number of blocks.
    pub cidrs: Vec<String>,
    pub range_start: String,
    pub range_end: String,
    pub total: u64,
    pub forms: Option<AddressForms>,
}

/// Summarizes a single address, a CIDR network or a `start-end` range.
pub fn ipv4_info(input: &str) -> Result<Ipv4Info> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ToolError::EmptyInput("IPv4 input"));
    }
    let normalized = normalize_range(trimmed);
    log::debug!("inspecting IPv4 input {normalized}");
    if let Some((left, right)) = normalized.split_once('-') {
        let start = u32::from(parse_ipv4(left)?);
        let end = u32::from(parse_ipv4(right)?);
        if start > end {
            return Err(ToolError::invalid(
                "IPv4 range",
                "start address must not exceed end address",
            ));
        }
        return Ok(Ipv4Info {
            kind: Ipv4InputKind::Range,
            input: trimmed.to_string(),
            cidrs: range_to_cidrs(start, end),
            range_start: Ipv4Addr::from(start).to_string(),
            range_end: Ipv4Addr::from(end).to_string(),
            total: u64::from(end - start) + 1,
            forms: None,
        });
    }
    let subnet = ipv4_subnet(trimmed)?;
    let ip = parse_ipv4(&subnet.address)?;
    let single = !trimmed.contains('/');
    Ok(Ipv4Info {
        kind: if single {
            Ipv4InputKind::Single
        } else {
            Ipv4InputKind::Network
        },
        input: trimmed.to_string(),
        cidrs: vec![subnet.cidr],
        range_start: subnet.network_address,
        range_end: subnet
            .broadcast_address
            .unwrap_or(subnet.last_address),
        total: subnet.network_size,
        forms: Some(address_forms(ip)),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeExpansion {
    pub old_start: String,
    pub old_end: String,
    pub old_size: u64,
    pub new_start: String,
    pub new_end: String,
    pub new_size: u64,
    pub cidr: String,
}

/// Finds the smallest single CIDR block containing both `start` and `end`.
pub fn expand_ipv4_range(start: &str, end: &str) -> Result<RangeExpansion> {
    let start_ip = parse_ipv4(start)?;
    let end_ip = parse_ipv4(end)?;
    let (lo, hi) = (u32::from(start_ip), u32::from(end_ip));
    if lo > hi {
        return Err(ToolError::invalid(
            "IPv4 range",
            "start address must not exceed end address",
        ));
    }
    let prefix = (lo ^ hi).leading_zeros() as u8;
    let mask = prefix_to_mask(prefix);
    let new_start = lo & mask;
    let new_end = new_start | !mask;
    Ok(RangeExpansion {
        old_start: start_ip.to_string(),
        old_end: end_ip.to_string(),
        old_size: u64::from(hi - lo) + 1,
        new_start: Ipv4Addr::from(new_start).to_string(),
        new_end: Ipv4Addr::from(new_end).to_string(),
        new_size: u64::from(new_end - new_start) + 1,
        cidr: format!("{}/{prefix}", Ipv4Addr::from(new_start)),
    })
}

/// Decomposes `start..=end` into the minimal list of aligned CIDR blocks.
pub fn range_to_cidrs(start: u32, end: u32) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut cursor = u64::from(start);
    let end = u64::from(end);
    while cursor <= end {
        let align = if cursor == 0 {
            32
        } else {
            cursor.trailing_zeros().min(32)
        };
        let mut host_bits = align;
        while (1u64 << host_bits) > end - cursor + 1 {
            host_bits -= 1;
        }
        blocks.push(format!(
            "{}/{}",
            Ipv4Addr::from(cursor as u32),
            32 - host_bits
        ));
        cursor += 1u64 << host_bits;
    }
    blocks
}

pub fn parse_ipv4(value: &str) -> Result<Ipv4Addr> {
    value
        .trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| ToolError::invalid("IPv4 address", value.trim()))
}

fn parse_prefix(suffix: &str) -> Result<u8> {
    let suffix = suffix.trim();
    if suffix.contains('.') {
        return mask_to_prefix(u32::from(parse_ipv4(suffix)?))
            .ok_or_else(|| ToolError::invalid("subnet mask", suffix));
    }
    suffix
        .parse::<u8>()
        .ok()
        .filter(|prefix| *prefix <= 32)
        .ok_or_else(|| ToolError::invalid("prefix length", suffix))
}

pub fn prefix_to_mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p.min(32))),
    }
}

/// Returns the prefix length of a contiguous mask, `None` for masks with holes.
pub fn mask_to_prefix(mask: u32) -> Option<u8> {
    let prefix = mask.leading_ones();
    (mask.checked_shl(prefix).unwrap_or(0) == 0).then_some(prefix as u8)
}

fn normalize_range(input: &str) -> String {
    input
        .replace(' ', "")
        .replace("->", "-")
        .replace(['\u{2014}', '\u{2013}'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subnet_for_slash_24() {
        let info = ipv4_subnet("192.168.0.77/24").unwrap();
        assert_eq!(info.network_address, "192.168.0.0");
        assert_eq!(info.netmask, "255.255.255.0");
        assert_eq!(info.wildcard_mask, "0.0.0.255");
        assert_eq!(info.cidr, "192.168.0.0/24");
        assert_eq!(info.network_size, 256);
        assert_eq!(info.usable_hosts, 254);
        assert_eq!(info.first_address, "192.168.0.1");
        assert_eq!(info.last_address, "192.168.0.254");
        assert_eq!(info.broadcast_address.as_deref(), Some("192.168.0.255"));
        assert_eq!(info.ip_class, "C");
        assert_eq!(info.previous_block.as_deref(), Some("192.167.255.0/24"));
        assert_eq!(info.next_block.as_deref(), Some("192.168.1.0/24"));
    }

    #[test]
    fn dotted_masks_and_edge_prefixes() {
        let info = ipv4_subnet("10.1.2.3/255.255.0.0").unwrap();
        assert_eq!(info.prefix_length, 16);
        assert_eq!(info.ip_class, "A");

        let p2p = ipv4_subnet("10.0.0.1/31").unwrap();
        assert_eq!(p2p.usable_hosts, 2);
        assert_eq!(p2p.first_address, "10.0.0.0");
        assert_eq!(p2p.last_address, "10.0.0.1");
        assert!(p2p.broadcast_address.is_none());

        let all = ipv4_subnet("0.0.0.0/0").unwrap();
        assert_eq!(all.network_size, 1 << 32);
        assert!(all.previous_block.is_none());
        assert!(all.next_block.is_none());

        let host = ipv4_subnet("255.255.255.255").unwrap();
        assert_eq!(host.cidr, "255.255.255.255/32");
        assert!(host.next_block.is_none());
    }

    #[test]
    fn rejects_bad_masks_and_prefixes() {
        assert!(ipv4_subnet("10.0.0.1/255.0.255.0").is_err());
        assert!(ipv4_subnet("10.0.0.1/33").is_err());
        assert!(ipv4_subnet("10.0.0/8").is_err());
        assert!(ipv4_subnet("").is_err());
    }

    #[test]
    fn mask_prefix_conversions_agree() {
        for prefix in 0..=32u8 {
            assert_eq!(mask_to_prefix(prefix_to_mask(prefix)), Some(prefix));
        }
        assert_eq!(mask_to_prefix(0xff00_ff00), None);
    }

    #[test]
    fn address_forms_for_private_address() {
        let forms = address_forms(Ipv4Addr::new(192, 168, 0, 1));
        assert_eq!(forms.integer, "3232235521");
        assert_eq!(forms.hex, "C0A80001");
        assert_eq!(forms.binary, "11000000101010000000000000000001");
        assert_eq!(forms.three_part, "192.168.1");
        assert_eq!(forms.two_part, "192.11010049");
        assert_eq!(forms.ipv6, "0000:0000:0000:0000:0000:ffff:c0a8:0001");
        assert_eq!(forms.ipv6_short, "::ffff:c0a8:1");
    }

    #[test]
    fn info_decomposes_ranges_exactly() {
        let info = ipv4_info("10.0.0.1 -> 10.0.0.6").unwrap();
        assert_eq!(info.kind, Ipv4InputKind::Range);
        assert_eq!(info.total, 6);
        assert_eq!(
            info.cidrs,
            vec!["10.0.0.1/32", "10.0.0.2/31", "10.0.0.4/31", "10.0.0.6/32"]
        );
        let full = ipv4_info("0.0.0.0-255.255.255.255").unwrap();
        assert_eq!(full.cidrs, vec!["0.0.0.0/0"]);
        assert!(ipv4_info("10.0.0.9-10.0.0.1").is_err());
    }

    #[test]
    fn info_for_single_and_network() {
        let single = ipv4_info("8.8.8.8").unwrap();
        assert_eq!(single.kind, Ipv4InputKind::Single);
        assert_eq!(single.cidrs, vec!["8.8.8.8/32"]);
        assert_eq!(single.total, 1);
        assert!(single.forms.is_some());

        let network = ipv4_info("172.16.5.4/12").unwrap();
        assert_eq!(network.kind, Ipv4InputKind::Network);
        assert_eq!(network.range_start, "172.16.0.0");
        assert_eq!(network.range_end, "172.31.255.255");
        assert_eq!(network.total, 1 << 20);
    }

    #[test]
    fn single_address_expands_to_itself() {
        for addr in ["0.0.0.0", "10.20.30.40", "255.255.255.255"] {
            let expansion = expand_ipv4_range(addr, addr).unwrap();
            assert_eq!(expansion.cidr, format!("{addr}/32"));
            assert_eq!(expansion.new_size, 1);
        }
    }

    #[test]
    fn expansion_covers_both_ends() {
        let expansion = expand_ipv4_range("192.168.1.1", "192.168.6.255").unwrap();
        assert_eq!(expansion.cidr, "192.168.0.0/21");
        assert_eq!(expansion.new_start, "192.168.0.0");
        assert_eq!(expansion.new_end, "192.168.7.255");
        assert_eq!(expansion.old_size, 1535);
        assert_eq!(expansion.new_size, 2048);
        assert!(expand_ipv4_range("10.0.0.2", "10.0.0.1").is_err());
    }
}
