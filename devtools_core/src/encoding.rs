//! Base64 string and file converters.
//!
//! Decoding is deliberately forgiving about the shape of what users paste:
//! wrapped lines, missing padding and `data:` URL prefixes are all accepted.
use base64::alphabet;
use base64::engine::general_purpose::{
    GeneralPurpose, GeneralPurposeConfig, STANDARD, URL_SAFE_NO_PAD,
};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

const DEFAULT_MIME: &str = "application/octet-stream";

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Base64Options {
    /// Use the `-_` alphabet and omit padding.
    pub url_safe: bool,
}

pub fn encode_base64_text(text: &str, options: Base64Options) -> String {
    encode_base64_bytes(text.as_bytes(), options)
}

pub fn encode_base64_bytes(data: &[u8], options: Base64Options) -> String {
    if options.url_safe {
        URL_SAFE_NO_PAD.encode(data)
    } else {
        STANDARD.encode(data)
    }
}

pub fn decode_base64_text(text: &str, options: Base64Options) -> Result<String> {
    let bytes = decode_base64_bytes(text, options)?;
    String::from_utf8(bytes)
        .map_err(|_| ToolError::invalid("base64", "decoded bytes are not UTF-8"))
}

pub fn decode_base64_bytes(text: &str, options: Base64Options) -> Result<Vec<u8>> {
    let payload = strip_data_url_prefix(text.trim());
    let mut cleaned: String = payload.chars().filter(|ch| !ch.is_whitespace()).collect();
    if options.url_safe {
        cleaned = cleaned.replace('+', "-").replace('/', "_");
        URL_SAFE_LENIENT.decode(cleaned.as_bytes())
    } else {
        STANDARD_LENIENT.decode(cleaned.as_bytes())
    }
    .map_err(|err| ToolError::invalid("base64", err.to_string()))
}

pub fn is_valid_base64(text: &str, options: Base64Options) -> bool {
    !text.trim().is_empty() && decode_base64_bytes(text, options).is_ok()
}

fn strip_data_url_prefix(text: &str) -> &str {
    if !text.starts_with("data:") {
        return text;
    }
    match text.split_once(";base64,") {
        Some((_, payload)) => payload,
        None => text,
    }
}

/// Payload recovered from a base64 string or data URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedFile {
    pub mime: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

pub fn encode_data_url(data: &[u8], mime: &str) -> String {
    let mime = mime.trim();
    let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
    format!("data:{mime};base64,{}", STANDARD.encode(data))
}

pub fn decode_data_url(text: &str) -> Result<DecodedFile> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ToolError::EmptyInput("base64 file"));
    }
    let declared = trimmed
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(mime, _)| mime.trim().to_string())
        .filter(|mime| !mime.is_empty());
    let bytes = decode_base64_bytes(trimmed, Base64Options::default())?;
    let mime = declared.unwrap_or_else(|| sniff_mime(&bytes).to_string());
    log::debug!("decoded {} byte file as {mime}", bytes.len());
    Ok(DecodedFile {
        extension: extension_for_mime(&mime).to_string(),
        mime,
        bytes,
    })
}

/// Guesses a MIME type from the leading magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
    ];
    for (magic, mime) in SIGNATURES {
        if bytes.starts_with(magic) {
            return mime;
        }
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    if !bytes.is_empty() && std::str::from_utf8(bytes).is_ok() {
        return "text/plain";
    }
    DEFAULT_MIME
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        "application/pdf" => "pdf",
        "application/zip" => "zip",
        "application/gzip" => "gz",
        "application/json" => "json",
        "text/plain" => "txt",
        "text/html" => "html",
        "text/csv" => "csv",
        _ => "bin",
    }
}
