//! Plain text transforms: case styles, statistics, NATO spelling, binary and
//! Unicode escapes, HTML entities, URL encoding, slugs, numeronyms and
//! obfuscation.
use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// Every case style offered by the case converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResults {
    pub lowercase: String,
    pub uppercase: String,
    pub camel: String,
    pub capital: String,
    pub constant: String,
    pub dot: String,
    pub header: String,
    pub no: String,
    pub param: String,
    pub pascal: String,
    pub path: String,
    pub sentence: String,
    pub snake: String,
    pub mocking: String,
}

pub fn convert_case(text: &str) -> CaseResults {
    let words = split_words(text);
    let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let capitalized: Vec<String> = words.iter().map(|w| capitalize(w)).collect();

    let camel = lower
        .iter()
        .take(1)
        .cloned()
        .chain(capitalized.iter().skip(1).cloned())
        .collect::<String>();
    let sentence = capitalized
        .iter()
        .take(1)
        .cloned()
        .chain(lower.iter().skip(1).cloned())
        .collect::<Vec<_>>()
        .join(" ");

    CaseResults {
        lowercase: text.to_lowercase(),
        uppercase: text.to_uppercase(),
        camel,
        capital: capitalized.join(" "),
        constant: lower.join("_").to_uppercase(),
        dot: lower.join("."),
        header: capitalized.join("-"),
        no: lower.join(" "),
        param: lower.join("-"),
        pascal: capitalized.concat(),
        path: lower.join("/"),
        sentence,
        snake: lower.join("_"),
        mocking: mocking_case(text),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn mocking_case(text: &str) -> String {
    text.chars()
        .enumerate()
        .flat_map(|(idx, ch)| {
            if idx % 2 == 0 {
                ch.to_uppercase().collect::<Vec<_>>()
            } else {
                ch.to_lowercase().collect::<Vec<_>>()
            }
        })
        .collect()
}

/// Splits text into words on separators and on case changes
/// (`fooBar` -> `foo`, `Bar`; `XMLHttp` -> `XML`, `Http`).
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in text.split(|ch: char| !ch.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (idx, &ch) in chars.iter().enumerate() {
            if let Some(&prev) = idx.checked_sub(1).and_then(|p| chars.get(p)) {
                let next_lower = chars.get(idx + 1).is_some_and(|c| c.is_lowercase());
                let boundary = ch.is_uppercase()
                    && (prev.is_lowercase()
                        || prev.is_ascii_digit()
                        || (prev.is_uppercase() && next_lower));
                if boundary && !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(ch);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStatistics {
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
    pub bytes: usize,
}

pub fn text_statistics(text: &str) -> TextStatistics {
    TextStatistics {
        characters: text.chars().count(),
        words: text.split_whitespace().count(),
        lines: text.lines().count(),
        bytes: text.len(),
    }
}

const NATO_LETTERS: [&str; 26] = [
    "Alfa", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India", "Juliett",
    "Kilo", "Lima", "Mike", "November", "Oscar", "Papa", "Quebec", "Romeo", "Sierra", "Tango",
    "Uniform", "Victor", "Whiskey", "X-ray", "Yankee", "Zulu",
];

const NATO_DIGITS: [&str; 10] = [
    "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];

/// Spells text with the NATO phonetic alphabet, one token per character.
/// Characters without a code word, whitespace included, are kept verbatim.
pub fn text_to_nato(text: &str) -> String {
    text.chars()
        .map(|ch| {
            if ch.is_ascii_alphabetic() {
                NATO_LETTERS[(ch.to_ascii_uppercase() as u8 - b'A') as usize].to_string()
            } else if ch.is_ascii_digit() {
                NATO_DIGITS[(ch as u8 - b'0') as usize].to_string()
            } else {
                ch.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn text_to_binary(text: &str, separator: &str) -> String {
    text.bytes()
        .map(|byte| format!("{byte:08b}"))
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn binary_to_text(bits: &str) -> Result<String> {
    let cleaned: Vec<u8> = bits.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if let Some(bad) = cleaned.iter().find(|b| **b != b'0' && **b != b'1') {
        return Err(ToolError::invalid(
            "binary",
            format!("unexpected character '{}'", *bad as char),
        ));
    }
    if cleaned.len() % 8 != 0 {
        return Err(ToolError::invalid("binary", "bit count must be a multiple of 8"));
    }
    let bytes: Vec<u8> = cleaned
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, bit| (acc << 1) | (bit - b'0')))
        .collect();
    String::from_utf8(bytes).map_err(|_| ToolError::invalid("binary", "bytes are not UTF-8"))
}

pub fn text_to_unicode(text: &str) -> String {
    text.chars().map(|ch| format!("&#{};", ch as u32)).collect()
}

/// Resolves `&#NNN;` and `&#xHH;` references; everything else is kept.
pub fn unicode_to_text(escaped: &str) -> String {
    decode_references(escaped, false)
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn unescape_html(text: &str) -> String {
    decode_references(text, true)
}

fn decode_references(text: &str, named: bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let candidate = &rest[start..];
        let resolved = candidate.find(';').and_then(|end| {
            let body = &candidate[1..end];
            resolve_reference(body, named).map(|ch| (ch, end + 1))
        });
        match resolved {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &candidate[consumed..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_reference(body: &str, named: bool) -> Option<char> {
    if let Some(numeric) = body.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    if !named {
        return None;
    }
    match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        _ => None,
    }
}

pub fn url_encode(text: &str) -> String {
    urlencoding::encode(text).replace("%20", "+")
}

pub fn url_decode(text: &str) -> Result<String> {
    let normalized = text.replace('+', " ");
    urlencoding::decode(&normalized)
        .map(|cow| cow.into_owned())
        .map_err(|_| ToolError::invalid("URL encoding", "escapes do not form UTF-8"))
}

pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.to_lowercase().chars() {
        let folded = fold_accent(ch);
        let mut emitted = false;
        for c in folded.chars().filter(char::is_ascii_alphanumeric) {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
            emitted = true;
        }
        if !emitted {
            pending_dash = true;
        }
    }
    slug
}

fn fold_accent(ch: char) -> String {
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'ç' => "c",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'ù' | 'ú' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        other => return other.to_string(),
    };
    folded.to_string()
}

/// `internationalization` -> `i18n`.
pub fn numeronym(word: &str) -> String {
    let chars: Vec<char> = word.trim().chars().collect();
    if chars.len() < 4 {
        return chars.into_iter().collect();
    }
    format!("{}{}{}", chars[0], chars.len() - 2, chars[chars.len() - 1])
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObfuscateOptions {
    pub keep_first: usize,
    pub keep_last: usize,
    pub keep_space: bool,
    pub replacement: char,
}

impl Default for ObfuscateOptions {
    fn default() -> Self {
        Self {
            keep_first: 4,
            keep_last: 0,
            keep_space: true,
            replacement: '*',
        }
    }
}

pub fn obfuscate(text: &str, options: &ObfuscateOptions) -> String {
    let total = text.chars().count();
    text.chars()
        .enumerate()
        .map(|(idx, ch)| {
            let visible = idx < options.keep_first
                || idx + options.keep_last >= total
                || (options.keep_space && ch == ' ');
            if visible {
                ch
            } else {
                options.replacement
            }
        })
        .collect()
}
