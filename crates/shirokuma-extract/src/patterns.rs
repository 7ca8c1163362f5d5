// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The regular expressions behind extraction.
//!
//! Date and code patterns are tried in priority order and the first one that
//! matches decides the outcome. A match with an impossible calendar date or
//! an invalid code letter is a failure, not a reason to try the next shape.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use shirokuma_core::{BirthDate, PersonalityCode};

static LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"《《《(.*?)》》》").unwrap());

static LABELED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"生年月日\s*[：:]\s*(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日").unwrap()
});

static LABELED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i:mbti)\s*[：:]\s*([A-Za-z]{4})(?:[^A-Za-z]|$)").unwrap()
});

static JP_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日").unwrap()
});

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d{4})[/.\-](\d{1,2})[/.\-](\d{1,2})(?:\D|$)").unwrap()
});

static JP_DATE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d{4})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*日[\s、,]*([A-Za-z]{4})(?:[^A-Za-z]|$)",
    )
    .unwrap()
});

static NUMERIC_DATE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\D)(\d{4})[/.\-](\d{1,2})[/.\-](\d{1,2})[\s、,]*([A-Za-z]{4})(?:[^A-Za-z]|$)",
    )
    .unwrap()
});

static GENDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"性別\s*[：:]\s*([^\s、,]+)").unwrap());

/// The trimmed text inside the first `《《《》》》` marker.
pub fn find_label(text: &str) -> Option<&str> {
    LABEL
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
}

/// Finds one birth date and code pair.
///
/// Priority:
/// 1. an `MBTI：` line, with the date from a `生年月日：` line or the first
///    date anywhere in the text
/// 2. a Japanese date directly followed by the code
/// 3. a numeric `YYYY/M/D` or `YYYY-M-D` date directly followed by the code
pub fn find_record(text: &str) -> Option<(BirthDate, PersonalityCode)> {
    if let Some(code) = LABELED_CODE.captures(text) {
        let date = LABELED_DATE
            .captures(text)
            .or_else(|| JP_DATE.captures(text))
            .or_else(|| NUMERIC_DATE.captures(text));
        if let Some(date) = date {
            return Some((birth_date(&date)?, PersonalityCode::parse(&code[1])?));
        }
    }

    let caps = JP_DATE_CODE
        .captures(text)
        .or_else(|| NUMERIC_DATE_CODE.captures(text))?;
    Some((birth_date(&caps)?, PersonalityCode::parse(&caps[4])?))
}

/// The value of a `性別：` line.
pub fn find_gender(text: &str) -> Option<String> {
    GENDER
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// The rest of a `name：value` line, trimmed; `None` when empty.
pub fn find_line_field(text: &str, name: &str) -> Option<String> {
    let pattern = format!(r"(?m)^[ \t]*{}[ \t]*[：:][ \t]*(.*?)[ \t]*$", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}

/// Builds a date from capture groups 1..=3; impossible dates yield `None`.
fn birth_date(caps: &Captures<'_>) -> Option<BirthDate> {
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    BirthDate::from_ymd(year, month, day)
}
