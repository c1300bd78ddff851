//! Date-time converter between timestamp notations, always rendered in UTC.
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::error::{Result, ToolError};

/// Days between the Excel epoch (1899-12-30) and the Unix epoch.
const EXCEL_UNIX_OFFSET_DAYS: f64 = 25_569.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampKind {
    Now,
    UnixSeconds,
    UnixMillis,
    Iso8601,
    Rfc3339,
    Rfc2822,
    SqlDatetime,
    MongoObjectId,
    Excel,
    Auto,
}

impl TimestampKind {
    pub fn parse(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Ok(match normalized.as_str() {
            "now" => Self::Now,
            "unix" | "unix_seconds" | "timestamp" => Self::UnixSeconds,
            "unix_millis" | "unix_ms" | "milliseconds" => Self::UnixMillis,
            "iso" | "iso8601" | "iso_8601" => Self::Iso8601,
            "rfc3339" => Self::Rfc3339,
            "rfc2822" | "rfc_2822" => Self::Rfc2822,
            "sql" | "sql_datetime" => Self::SqlDatetime,
            "mongo" | "mongo_object_id" | "objectid" => Self::MongoObjectId,
            "excel" => Self::Excel,
            "" | "auto" => Self::Auto,
            _ => return Err(ToolError::unsupported("date format", name.trim())),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFormats {
    pub iso8601: String,
    pub rfc3339: String,
    pub rfc2822: String,
    pub rfc7231: String,
    pub sql_datetime: String,
    pub sql_date: String,
    pub unix_seconds: i64,
    pub unix_millis: i64,
    pub mongo_object_id: String,
    pub excel: f64,
}

pub fn convert_timestamp(kind: &str, input: &str) -> Result<DateFormats> {
    let kind = TimestampKind::parse(kind)?;
    let instant = parse_instant(kind, input.trim())?;
    log::debug!("rendering {instant} parsed as {kind:?}");
    Ok(render(instant))
}

pub fn parse_instant(kind: TimestampKind, input: &str) -> Result<DateTime<Utc>> {
    if kind != TimestampKind::Now && input.is_empty() {
        return Err(ToolError::EmptyInput("date"));
    }
    let parsed = match kind {
        TimestampKind::Now => Some(Utc::now()),
        TimestampKind::UnixSeconds => input
            .parse::<f64>()
            .ok()
            .and_then(|secs| from_millis_f64(secs * 1000.0)),
        TimestampKind::UnixMillis => input
            .parse::<i64>()
            .ok()
            .and_then(DateTime::from_timestamp_millis),
        TimestampKind::Iso8601 => parse_rfc3339(input).or_else(|| parse_naive(input, 'T')),
        TimestampKind::Rfc3339 => parse_rfc3339(input),
        TimestampKind::Rfc2822 => DateTime::parse_from_rfc2822(input)
            .ok()
            .map(|date| date.with_timezone(&Utc)),
        TimestampKind::SqlDatetime => parse_naive(input, ' '),
        TimestampKind::MongoObjectId => parse_object_id(input),
        TimestampKind::Excel => input.parse::<f64>().ok().and_then(|serial| {
            from_millis_f64((serial - EXCEL_UNIX_OFFSET_DAYS) * SECONDS_PER_DAY * 1000.0)
        }),
        TimestampKind::Auto => detect(input),
    };
    parsed.ok_or_else(|| ToolError::invalid("date", input))
}

fn detect(input: &str) -> Option<DateTime<Utc>> {
    if input.len() == 24 && input.bytes().all(|b| b.is_ascii_hexdigit()) {
        return parse_object_id(input);
    }
    if let Ok(number) = input.parse::<i64>() {
        // 11+ digit values are taken as milliseconds
        return if number.unsigned_abs() >= 10_000_000_000 {
            DateTime::from_timestamp_millis(number)
        } else {
            DateTime::from_timestamp(number, 0)
        };
    }
    parse_rfc3339(input)
        .or_else(|| parse_naive(input, 'T'))
        .or_else(|| parse_naive(input, ' '))
        .or_else(|| {
            DateTime::parse_from_rfc2822(input)
                .ok()
                .map(|date| date.with_timezone(&Utc))
        })
}

fn parse_rfc3339(input: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// `YYYY-MM-DD<sep>HH:MM:SS[.fff]` or a bare date, taken as UTC.
fn parse_naive(input: &str, separator: char) -> Option<DateTime<Utc>> {
    let datetime_format = format!("%Y-%m-%d{separator}%H:%M:%S%.f");
    NaiveDateTime::parse_from_str(input, &datetime_format)
        .or_else(|_| NaiveDateTime::parse_from_str(input, &format!("%Y-%m-%d{separator}%H:%M")))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn parse_object_id(input: &str) -> Option<DateTime<Utc>> {
    if input.len() != 24 {
        return None;
    }
    let seconds = u32::from_str_radix(input.get(..8)?, 16).ok()?;
    input[8..]
        .bytes()
        .all(|b| b.is_ascii_hexdigit())
        .then(|| DateTime::from_timestamp(i64::from(seconds), 0))
        .flatten()
}

fn from_millis_f64(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}

pub fn render(instant: DateTime<Utc>) -> DateFormats {
    let unix_seconds = instant.timestamp();
    let unix_millis = instant.timestamp_millis();
    DateFormats {
        iso8601: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        rfc3339: instant.to_rfc3339_opts(SecondsFormat::AutoSi, false),
        rfc2822: instant.to_rfc2822(),
        rfc7231: instant.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        sql_datetime: instant.format("%Y-%m-%d %H:%M:%S").to_string(),
        sql_date: instant.format("%Y-%m-%d").to_string(),
        unix_seconds,
        unix_millis,
        mongo_object_id: format!(
            "{:08x}0000000000000000",
            unix_seconds.clamp(0, i64::from(u32::MAX))
        ),
        excel: unix_millis as f64 / 1000.0 / SECONDS_PER_DAY + EXCEL_UNIX_OFFSET_DAYS,
    }
}
