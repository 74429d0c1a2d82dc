//! Core data models used throughout Cronograma.
//!
//! These types represent the raw spreadsheet rows that enter the pipeline and
//! the nested week → day → topic → subtopic → lesson tree that comes out of
//! it. Serialized field names follow the public JSON contract of
//! `GET /api/cronograma`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One spreadsheet row, before normalization.
///
/// Every field is a plain string; readers put blanks in place of missing
/// cells or missing optional columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub week: String,
    pub day: String,
    pub topic: String,
    pub lesson: String,
    pub lesson_link: String,
    pub free_link: String,
}

/// A single lesson. Two lessons are duplicates when all three fields match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Lesson {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "link_aula")]
    pub lesson_link: String,
    #[serde(rename = "link_gratuito")]
    pub free_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtopicEntry {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "aulas")]
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicEntry {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "subtemas")]
    pub subtopics: Vec<SubtopicEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "temas")]
    pub topics: Vec<TopicEntry>,
}

/// A study week. The key is not part of the serialized body; it is the
/// map key of the enclosing [`Schedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekEntry {
    #[serde(skip)]
    pub key: String,
    #[serde(rename = "nome_exibicao")]
    pub display_label: String,
    #[serde(rename = "numero")]
    pub numeric_order: u32,
    #[serde(rename = "periodo")]
    pub period: String,
    #[serde(rename = "area_conhecimento")]
    pub topic_area: String,
    #[serde(rename = "dias")]
    pub days: Vec<DayEntry>,
}

/// The finished, immutable schedule.
///
/// Weeks are kept in ascending `numeric_order`; serialization emits a JSON
/// object keyed by week key in that same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    weeks: Vec<WeekEntry>,
}

impl Schedule {
    /// Wraps weeks that are already in their final order.
    pub(crate) fn from_sorted(weeks: Vec<WeekEntry>) -> Self {
        Self { weeks }
    }

    pub fn weeks(&self) -> &[WeekEntry] {
        &self.weeks
    }

    pub fn get(&self, key: &str) -> Option<&WeekEntry> {
        self.weeks.iter().find(|w| w.key == key)
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Total number of lessons across all weeks.
    pub fn lesson_count(&self) -> usize {
        self.weeks
            .iter()
            .flat_map(|w| &w.days)
            .flat_map(|d| &d.topics)
            .flat_map(|t| &t.subtopics)
            .map(|s| s.lessons.len())
            .sum()
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.weeks.len()))?;
        for week in &self.weeks {
            map.serialize_entry(&week.key, week)?;
        }
        map.end()
    }
}
