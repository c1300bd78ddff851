//! Digest and HMAC generators.
use std::collections::BTreeMap;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use md5::Md5;
use serde::Deserialize;
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::error::{Result, ToolError};

pub const ALGORITHMS: &[&str] = &["md5", "sha1", "sha224", "sha256", "sha384", "sha512"];

/// How raw digest bytes are rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestEncoding {
    #[default]
    Hex,
    Base64,
    Base64Url,
    Binary,
}

impl DigestEncoding {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            "binary" | "bin" => Ok(Self::Binary),
            other => Err(ToolError::unsupported("digest encoding", other)),
        }
    }

    pub fn render(self, bytes: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(bytes),
            Self::Base64 => STANDARD.encode(bytes),
            Self::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
            Self::Binary => bytes.iter().map(|b| format!("{b:08b}")).collect(),
        }
    }
}

pub fn hash_text(text: &str, encoding: DigestEncoding) -> BTreeMap<String, String> {
    let data = text.as_bytes();
    log::debug!("hashing {} bytes", data.len());
    ALGORITHMS
        .iter()
        .filter_map(|name| {
            digest_bytes(name, data).map(|digest| (name.to_string(), encoding.render(&digest)))
        })
        .collect()
}

fn digest_bytes(algorithm: &str, data: &[u8]) -> Option<Vec<u8>> {
    let bytes = match algorithm {
        "md5" => Md5::digest(data).to_vec(),
        "sha1" => Sha1::digest(data).to_vec(),
        "sha224" => Sha224::digest(data).to_vec(),
        "sha256" => Sha256::digest(data).to_vec(),
        "sha384" => Sha384::digest(data).to_vec(),
        "sha512" => Sha512::digest(data).to_vec(),
        _ => return None,
    };
    Some(bytes)
}

pub fn hmac_text(
    text: &str,
    secret: &str,
    algorithm: &str,
    encoding: DigestEncoding,
) -> Result<String> {
    let key = secret.as_bytes();
    let data = text.as_bytes();
    let algorithm = algorithm.trim().to_ascii_lowercase().replace('-', "");
    let mac = match algorithm.as_str() {
        "md5" => mac_bytes::<Hmac<Md5>>(key, data)?,
        "sha1" => mac_bytes::<Hmac<Sha1>>(key, data)?,
        "sha224" => mac_bytes::<Hmac<Sha224>>(key, data)?,
        "sha256" | "" => mac_bytes::<Hmac<Sha256>>(key, data)?,
        "sha384" => mac_bytes::<Hmac<Sha384>>(key, data)?,
        "sha512" => mac_bytes::<Hmac<Sha512>>(key, data)?,
        other => return Err(ToolError::unsupported("HMAC algorithm", other)),
    };
    Ok(encoding.render(&mac))
}

pub(crate) fn mac_bytes<M: Mac + KeyInit>(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|err| ToolError::invalid("HMAC key", err.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
