//! Unix permission calculator: octal <-> symbolic.
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Access {
    pub read: bool,
    pub write: bool,
    pub execute: bool,
}

impl Access {
    fn from_digit(digit: u8) -> Self {
        Self {
            read: digit & 4 != 0,
            write: digit & 2 != 0,
            execute: digit & 1 != 0,
        }
    }

    fn digit(self) -> u8 {
        (u8::from(self.read) << 2) | (u8::from(self.write) << 1) | u8::from(self.execute)
    }

    fn symbols(self) -> [char; 3] {
        [
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.execute { 'x' } else { '-' },
        ]
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub owner: Access,
    pub group: Access,
    pub public: Access,
}

impl Permissions {
    pub fn from_bits(bits: u16) -> Self {
        Self {
            owner: Access::from_digit(((bits >> 6) & 7) as u8),
            group: Access::from_digit(((bits >> 3) & 7) as u8),
            public: Access::from_digit((bits & 7) as u8),
        }
    }

    pub fn bits(self) -> u16 {
        (u16::from(self.owner.digit()) << 6)
            | (u16::from(self.group.digit()) << 3)
            | u16::from(self.public.digit())
    }
}

pub fn to_octal(perms: Permissions) -> String {
    format!(
        "{}{}{}",
        perms.owner.digit(),
        perms.group.digit(),
        perms.public.digit()
    )
}

pub fn to_symbolic(perms: Permissions) -> String {
    [perms.owner, perms.group, perms.public]
        .into_iter()
        .flat_map(Access::symbols)
        .collect()
}

/// Three octal digits; a leading `0` (as in `0755`) is tolerated.
pub fn parse_octal(text: &str) -> Result<Permissions> {
    let trimmed = text.trim();
    let digits = match trimmed.len() {
        4 if trimmed.starts_with('0') => &trimmed[1..],
        _ => trimmed,
    };
    if digits.len() != 3 || !digits.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return Err(ToolError::invalid("octal permissions", trimmed));
    }
    let bits = u16::from_str_radix(digits, 8)
        .map_err(|err| ToolError::invalid("octal permissions", err.to_string()))?;
    Ok(Permissions::from_bits(bits))
}

/// Nine `rwx`/`-` characters, optionally preceded by a file type character
/// such as `-`, `d` or `l` (the `ls -l` layout).
pub fn parse_symbolic(text: &str) -> Result<Permissions> {
    let trimmed = text.trim();
    let chars: Vec<char> = trimmed.chars().collect();
    let body = match chars.len() {
        9 => &chars[..],
        10 if "-dlcbps".contains(chars[0]) => &chars[1..],
        _ => return Err(ToolError::invalid("symbolic permissions", trimmed)),
    };
    let mut bits = 0u16;
    for (idx, ch) in body.iter().enumerate() {
        let expected = ['r', 'w', 'x'][idx % 3];
        bits <<= 1;
        match *ch {
            c if c == expected => bits |= 1,
            '-' => {}
            _ => return Err(ToolError::invalid("symbolic permissions", trimmed)),
        }
    }
    Ok(Permissions::from_bits(bits))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChmodInfo {
    pub permissions: Permissions,
    pub octal: String,
    pub symbolic: String,
    pub command: String,
}

/// Accepts either notation and reports both.
pub fn chmod_info(input: &str) -> Result<ChmodInfo> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ToolError::EmptyInput("permissions"));
    }
    let perms = if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        parse_octal(trimmed)?
    } else {
        parse_symbolic(trimmed)?
    };
    let octal = to_octal(perms);
    Ok(ChmodInfo {
        permissions: perms,
        command: format!("chmod {octal} path"),
        symbolic: to_symbolic(perms),
        octal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn octal_and_symbolic_agree_for_every_mode() {
        for bits in 0..512u16 {
            let perms = Permissions::from_bits(bits);
            assert_eq!(perms.bits(), bits);
            let octal = to_octal(perms);
            let symbolic = to_symbolic(perms);
            assert_eq!(octal, format!("{bits:03o}"));
            assert_eq!(parse_octal(&octal).unwrap(), perms, "{octal}");
            assert_eq!(parse_symbolic(&symbolic).unwrap(), perms, "{symbolic}");
            assert_eq!(to_octal(parse_symbolic(&symbolic).unwrap()), octal);
        }
    }

    #[test]
    fn common_modes() {
        let info = chmod_info("755").unwrap();
        assert_eq!(info.symbolic, "rwxr-xr-x");
        assert_eq!(info.command, "chmod 755 path");
        assert_eq!(chmod_info("drw-r--r--").unwrap().octal, "644");
        assert_eq!(chmod_info("0600").unwrap().symbolic, "rw-------");
    }

    #[test]
    fn rejects_malformed_modes() {
        for bad in ["", "8", "7777", "rwxrwxrw", "rwxrwxrwz", "xrwrwxrwx", "qrwxrwxrwx"] {
            assert!(chmod_info(bad).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn matrix_round_trips_through_serde() {
        let perms = parse_octal("640").unwrap();
        let json = serde_json::to_value(perms).unwrap();
        assert_eq!(json["owner"]["write"], true);
        assert_eq!(json["public"]["read"], false);
        let back: Permissions = serde_json::from_value(json).unwrap();
        assert_eq!(back, perms);
    }
}
