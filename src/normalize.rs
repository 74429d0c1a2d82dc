//! Row normalization.
//!
//! Turns the free-text cells of a [`RawRow`] into the pieces the hierarchy
//! builder aggregates on. Week labels look like
//! `"Semana 3 (29/09 a 05/10) Clínica Médica"`: the first integer becomes the
//! week key and sort order, the first parenthesized group is the period, and
//! whatever follows it is the topic area. Combined topic labels look like
//! `"Cardiologia - Hipertensão"` and split into topic and subtopic.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::RawRow;

/// Prefix of every derived week key.
pub const WEEK_KEY_PREFIX: &str = "week_";

/// Separator between topic and subtopic in the combined topic column.
pub const TOPIC_SEPARATOR: &str = " - ";

/// First run of ASCII digits.
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("digits regex"));

/// Shortest parenthesized group.
static PERIOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*?)\)").expect("period regex"));

/// Closing parenthesis plus trailing whitespace.
static AREA_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\)\s*").expect("area split regex"));

/// A row that survived normalization, ready for aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub week_key: String,
    pub week_label: String,
    pub numeric_order: u32,
    pub period: String,
    pub topic_area: String,
    pub day: String,
    pub topic: String,
    pub subtopic: String,
    pub lesson: String,
    pub lesson_link: String,
    pub free_link: String,
}

fn first_digit_run(week_label: &str) -> Option<&str> {
    DIGITS_RE.find(week_label).map(|m| m.as_str())
}

/// `"Semana 12 (...)"` → `Some("week_12")`; `None` when the label has no digit.
pub fn derive_week_key(week_label: &str) -> Option<String> {
    first_digit_run(week_label).map(|digits| format!("{}{}", WEEK_KEY_PREFIX, digits))
}

/// Integer value of the first digit run, or `0` when there is none or it
/// does not fit in a `u32`.
pub fn derive_numeric_order(week_label: &str) -> u32 {
    first_digit_run(week_label)
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

pub fn derive_period(week_label: &str) -> String {
    PERIOD_RE
        .captures(week_label)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn derive_topic_area(week_label: &str) -> String {
    AREA_SPLIT_RE
        .splitn(week_label, 2)
        .nth(1)
        .map(|rest| rest.trim().to_string())
        .unwrap_or_default()
}

/// Splits on the first `" - "`. Without a separator the whole trimmed label
/// is the topic and the subtopic is empty.
pub fn split_topic_subtopic(topic_label: &str) -> (String, String) {
    match topic_label.split_once(TOPIC_SEPARATOR) {
        Some((topic, subtopic)) => (topic.trim().to_string(), subtopic.trim().to_string()),
        None => (topic_label.trim().to_string(), String::new()),
    }
}

/// Normalizes one row, or returns `None` when the row must be skipped: blank
/// day, blank combined topic, or no derivable week key.
pub fn normalize_row(row: &RawRow) -> Option<NormalizedRow> {
    let week_label = row.week.trim();
    let day = row.day.trim();
    let topic_label = row.topic.trim();

    if day.is_empty() || topic_label.is_empty() {
        return None;
    }
    let week_key = derive_week_key(week_label)?;
    let (topic, subtopic) = split_topic_subtopic(topic_label);

    Some(NormalizedRow {
        week_key,
        week_label: week_label.to_string(),
        numeric_order: derive_numeric_order(week_label),
        period: derive_period(week_label),
        topic_area: derive_topic_area(week_label),
        day: day.to_string(),
        topic,
        subtopic,
        lesson: row.lesson.trim().to_string(),
        lesson_link: row.lesson_link.trim().to_string(),
        free_link: row.free_link.trim().to_string(),
    })
}
