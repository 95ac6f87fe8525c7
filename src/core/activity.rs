//! Rules for human-readable recent-activity entries.

use crate::core::shapes::non_empty_str;
use crate::utils::error::{ProbeError, Result};
use crate::verify;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Words that betray raw technical data when they appear in a description.
pub const FORBIDDEN_WORDS: [&str; 5] = ["api", "raw", "internal", "id", "uuid"];

/// 描述中不該出現的字元片段（JSON、HTML 或資料庫欄位殘留）
pub const FORBIDDEN_FRAGMENTS: [&str; 8] = ["{", "}", "[", "]", "<", ">", "$", "_id"];

pub const RELATIVE_TERMS: [&str; 6] = ["ago", "just now", "minute", "hour", "day", "second"];

/// Keys that must never be exposed on an activity entry.
pub const RAW_KEYS: [&str; 5] = ["raw", "audit", "apiData", "internalData", "detailsJson"];

const OLD_ENTRY_KEYWORDS: [&str; 4] = ["ago", "on", "at", "date"];
const OLD_ENTRY_MIN_DESCRIPTION_LEN: usize = 20;

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

/// 回傳描述中第一個禁止出現的詞或片段
pub fn find_forbidden_token(description: &str) -> Option<&'static str> {
    let lower = description.to_lowercase();

    if let Some(fragment) = FORBIDDEN_FRAGMENTS.iter().copied().find(|f| lower.contains(*f)) {
        return Some(fragment);
    }

    let found = words(&lower).find_map(|word| FORBIDDEN_WORDS.iter().find(|w| **w == word).copied());
    found
}

pub fn is_relative_time(text: &str) -> bool {
    let lower = text.to_lowercase();
    RELATIVE_TERMS.iter().any(|term| lower.contains(term))
}

/// 儀表板對較舊紀錄顯示的日期格式
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%b %d, %Y"];

/// RFC 3339, a naive `%Y-%m-%dT%H:%M:%S` prefix, or a plain date, all read as UTC.
///
/// A date without a year (`Sep 19`) is taken to be in the current year.
pub fn parse_absolute_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(naive) = text
        .get(..19)
        .and_then(|prefix| NaiveDateTime::parse_from_str(prefix, "%Y-%m-%dT%H:%M:%S").ok())
    {
        return Some(naive.and_utc());
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| NaiveDate::parse_from_str(&format!("{} {}", text, Utc::now().year()), "%b %d %Y").ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 與儀表板相同的相對時間字串
pub fn time_ago(past: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now - past;
    let minutes = diff.num_minutes();
    let hours = diff.num_hours();
    let days = diff.num_days();
    let plural = |n: i64| if n > 1 { "s" } else { "" };

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{} min{} ago", minutes, plural(minutes))
    } else if hours < 24 {
        format!("{} hour{} ago", hours, plural(hours))
    } else if days < 7 {
        format!("{} day{} ago", days, plural(days))
    } else {
        past.format("%Y-%m-%d").to_string()
    }
}

/// Timestamp of an entry: `timestamp`, falling back to `timeAgo`.
fn entry_time(entry: &Value) -> Option<&str> {
    non_empty_str(entry.get("timestamp")).or_else(|| non_empty_str(entry.get("timeAgo")))
}

/// 驗證單筆活動紀錄是否為人類可讀格式
pub fn validate_activity(entry: &Value) -> Result<()> {
    verify!(entry.is_object(), "Each activity log entry should be an object, got {}", entry);

    let description = non_empty_str(entry.get("description"))
        .ok_or_else(|| ProbeError::assertion("Activity description must be a non-empty string"))?;

    if let Some(token) = find_forbidden_token(description) {
        return Err(ProbeError::assertion(format!(
            "Activity description contains internal term '{}': {}",
            token, description
        )));
    }

    let timestamp = entry_time(entry)
        .ok_or_else(|| ProbeError::assertion(format!("Activity '{}' has no timestamp or timeAgo", description)))?;

    verify!(
        is_relative_time(timestamp) || parse_absolute_timestamp(timestamp).is_some(),
        "Activity '{}' has a timestamp that is neither relative nor parseable: {}",
        description,
        timestamp
    );

    if let Some(key) = RAW_KEYS.iter().find(|key| entry.get(**key).is_some()) {
        return Err(ProbeError::assertion(format!(
            "Activity '{}' exposes raw field '{}'",
            description, key
        )));
    }

    Ok(())
}

/// 邊界情況：很舊的紀錄、同時發生的事件、異常的稽核資料
pub fn validate_edge_cases(entries: &[Value], now: DateTime<Utc>) -> Result<()> {
    let mut by_timestamp: HashMap<&str, Vec<&str>> = HashMap::new();

    for entry in entries {
        let description = non_empty_str(entry.get("description"))
            .ok_or_else(|| ProbeError::assertion(format!("Activity missing human-readable description: {}", entry)))?;

        verify!(
            entry_time(entry).is_some(),
            "Activity '{}' is missing a timestamp/timeAgo field",
            description
        );

        if let Some(timestamp) = non_empty_str(entry.get("timestamp")) {
            let at = parse_absolute_timestamp(timestamp).ok_or_else(|| {
                ProbeError::assertion(format!("Activity '{}' has an unparseable timestamp: {}", description, timestamp))
            })?;

            if now - at > Duration::days(365) {
                let lower = description.to_lowercase();
                verify!(
                    description.chars().count() > OLD_ENTRY_MIN_DESCRIPTION_LEN,
                    "Old activity from {} has a description that is too short: {}",
                    time_ago(at, now),
                    description
                );
                verify!(
                    words(&lower).any(|w| OLD_ENTRY_KEYWORDS.contains(&w)),
                    "Old activity from {} may not be human-readable: {}",
                    time_ago(at, now),
                    description
                );
            }

            by_timestamp.entry(timestamp).or_default().push(description);
        }

        if let Some(fragment) = FORBIDDEN_FRAGMENTS.iter().find(|f| description.contains(**f)) {
            return Err(ProbeError::assertion(format!(
                "Description contains raw/unusual audit data '{}': {}",
                fragment, description
            )));
        }
    }

    for (timestamp, descriptions) in by_timestamp.iter().filter(|(_, d)| d.len() > 1) {
        let unique: HashSet<&&str> = descriptions.iter().collect();
        verify!(
            unique.len() == descriptions.len(),
            "Duplicate descriptions for simultaneous events at {}",
            timestamp
        );
    }

    Ok(())
}
