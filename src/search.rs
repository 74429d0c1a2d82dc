//! Free-text search over a built [`Schedule`].
//!
//! Matching is case-insensitive substring containment against lower-cased
//! composite strings, evaluated top-down with first-match-wins per level:
//!
//! 1. **Week**: `"{key} {display_label} {topic_area} {period}"`. A hit emits
//!    one day-level match for every day of the week and skips the rest of
//!    the week.
//! 2. **Day**: the day name. A hit emits one day-level match for that day
//!    and skips its lessons.
//! 3. **Lesson**: `"{week composite} {day} {topic} {subtopic} {lesson}"`.
//!    Every hit emits a lesson-level match.
//!
//! Results come out in schedule traversal order and are never re-sorted.
//! Matches borrow from the schedule they were produced from.

use anyhow::Result;
use serde::Serialize;

use crate::config::Config;
use crate::ingest;
use crate::models::{DayEntry, Lesson, Schedule, TopicEntry, WeekEntry};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("search term must not be empty")]
    EmptyTerm,
}

/// A whole day matched through its week or its own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayMatch<'a> {
    #[serde(rename = "semana")]
    pub week: &'a str,
    #[serde(rename = "dia")]
    pub day: &'a str,
    #[serde(rename = "area_conhecimento")]
    pub topic_area: &'a str,
    #[serde(rename = "temas")]
    pub topics: &'a [TopicEntry],
    /// Always empty; kept so both match shapes carry the field.
    #[serde(rename = "aula_encontrada")]
    pub lesson: &'a [Lesson],
}

/// A single lesson matched through its full path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonMatch<'a> {
    #[serde(rename = "area_conhecimento")]
    pub topic_area: &'a str,
    #[serde(rename = "semana")]
    pub week: &'a str,
    #[serde(rename = "dia")]
    pub day: &'a str,
    #[serde(rename = "tema")]
    pub topic: &'a str,
    #[serde(rename = "subtema")]
    pub subtopic: &'a str,
    #[serde(rename = "aula_encontrada")]
    pub lesson: &'a Lesson,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SearchMatch<'a> {
    Day(DayMatch<'a>),
    Lesson(LessonMatch<'a>),
}

impl<'a> SearchMatch<'a> {
    pub fn week(&self) -> &'a str {
        match self {
            SearchMatch::Day(m) => m.week,
            SearchMatch::Lesson(m) => m.week,
        }
    }

    pub fn day(&self) -> &'a str {
        match self {
            SearchMatch::Day(m) => m.day,
            SearchMatch::Lesson(m) => m.day,
        }
    }
}

fn week_composite(week: &WeekEntry) -> String {
    format!(
        "{} {} {} {}",
        week.key, week.display_label, week.topic_area, week.period
    )
    .to_lowercase()
}

fn day_match<'a>(week: &'a WeekEntry, day: &'a DayEntry) -> SearchMatch<'a> {
    SearchMatch::Day(DayMatch {
        week: &week.key,
        day: &day.name,
        topic_area: &week.topic_area,
        topics: &day.topics,
        lesson: &[],
    })
}

/// Searches `schedule` for `term`.
///
/// Returns [`SearchError::EmptyTerm`] when `term` is empty. Whitespace is
/// part of the term and matched like any other character.
pub fn search<'a>(schedule: &'a Schedule, term: &str) -> Result<Vec<SearchMatch<'a>>, SearchError> {
    if term.is_empty() {
        return Err(SearchError::EmptyTerm);
    }
    let term = term.to_lowercase();
    let mut results = Vec::new();

    for week in schedule.weeks() {
        let week_text = week_composite(week);

        if week_text.contains(&term) {
            results.extend(week.days.iter().map(|day| day_match(week, day)));
            continue;
        }

        for day in &week.days {
            if day.name.to_lowercase().contains(&term) {
                results.push(day_match(week, day));
                continue;
            }

            for topic in &day.topics {
                for subtopic in &topic.subtopics {
                    for lesson in &subtopic.lessons {
                        let path = format!(
                            "{} {} {} {} {}",
                            week_text, day.name, topic.name, subtopic.name, lesson.name
                        )
                        .to_lowercase();
                        if path.contains(&term) {
                            results.push(SearchMatch::Lesson(LessonMatch {
                                topic_area: &week.topic_area,
                                week: &week.key,
                                day: &day.name,
                                topic: &topic.name,
                                subtopic: &subtopic.name,
                                lesson,
                            }));
                        }
                    }
                }
            }
        }
    }

    Ok(results)
}

/// CLI entry for `cronograma search`.
///
/// Builds the schedule from the configured data directory and prints the
/// matches, either as a table or as the same JSON body `GET /api/buscar`
/// returns.
pub fn run_search(config: &Config, term: &str, json: bool) -> Result<()> {
    let (schedule, _report) = ingest::build_schedule(config);
    let matches = search(&schedule, term)?;

    if json {
        let body = serde_json::json!({ "resultados": matches });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, m) in matches.iter().enumerate() {
        match m {
            SearchMatch::Day(d) => {
                println!(
                    "{}. [{}] {}: whole day ({} topics)",
                    i + 1,
                    d.week,
                    d.day,
                    d.topics.len()
                );
            }
            SearchMatch::Lesson(l) => {
                let subtopic = if l.subtopic.is_empty() {
                    String::new()
                } else {
                    format!(" / {}", l.subtopic)
                };
                println!(
                    "{}. [{}] {} | {}{}: {}",
                    i + 1,
                    l.week,
                    l.day,
                    l.topic,
                    subtopic,
                    l.lesson.name
                );
                if !l.lesson.lesson_link.is_empty() {
                    println!("    link: {}", l.lesson.lesson_link);
                }
            }
        }
    }
    println!("\n{} result(s).", matches.len());

    Ok(())
}
