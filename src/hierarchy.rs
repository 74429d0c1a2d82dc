//! Hierarchy builder.
//!
//! Folds flat [`RawRow`]s into the nested [`Schedule`] tree:
//!
//! ```text
//! week (key, first-write-wins metadata)
//!  └─ day        (sorted by name)
//!      └─ topic      (sorted by name)
//!          └─ subtopic   (sorted by name)
//!              └─ lesson     (first-insertion order, deduplicated)
//! ```
//!
//! Weeks are ordered by their numeric order; weeks sharing a numeric order
//! keep the order in which their keys were first seen.

use std::collections::{BTreeMap, HashMap};

use crate::models::{DayEntry, Lesson, RawRow, Schedule, SubtopicEntry, TopicEntry, WeekEntry};
use crate::normalize::{normalize_row, NormalizedRow};

/// Accumulates rows and produces a [`Schedule`] on [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct ScheduleBuilder {
    weeks: Vec<WeekBuilder>,
    week_index: HashMap<String, usize>,
    rows_accepted: usize,
    rows_skipped: usize,
}

#[derive(Debug)]
struct WeekBuilder {
    key: String,
    display_label: String,
    numeric_order: u32,
    period: String,
    topic_area: String,
    days: BTreeMap<String, DayBuilder>,
}

#[derive(Debug, Default)]
struct DayBuilder {
    topics: BTreeMap<String, TopicBuilder>,
}

#[derive(Debug, Default)]
struct TopicBuilder {
    subtopics: BTreeMap<String, Vec<Lesson>>,
}

impl WeekBuilder {
    fn from_row(row: &NormalizedRow) -> Self {
        Self {
            key: row.week_key.clone(),
            display_label: row.week_label.clone(),
            numeric_order: row.numeric_order,
            period: row.period.clone(),
            topic_area: row.topic_area.clone(),
            days: BTreeMap::new(),
        }
    }

    fn finish(self) -> WeekEntry {
        WeekEntry {
            key: self.key,
            display_label: self.display_label,
            numeric_order: self.numeric_order,
            period: self.period,
            topic_area: self.topic_area,
            days: self
                .days
                .into_iter()
                .map(|(name, day)| day.finish(name))
                .collect(),
        }
    }
}

impl DayBuilder {
    fn finish(self, name: String) -> DayEntry {
        DayEntry {
            name,
            topics: self
                .topics
                .into_iter()
                .map(|(name, topic)| topic.finish(name))
                .collect(),
        }
    }
}

impl TopicBuilder {
    fn finish(self, name: String) -> TopicEntry {
        TopicEntry {
            name,
            subtopics: self
                .subtopics
                .into_iter()
                .map(|(name, lessons)| SubtopicEntry { name, lessons })
                .collect(),
        }
    }
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one row. Returns `false` when the row was skipped by
    /// normalization.
    pub fn push(&mut self, row: &RawRow) -> bool {
        match normalize_row(row) {
            Some(normalized) => {
                self.insert(normalized);
                self.rows_accepted += 1;
                true
            }
            None => {
                self.rows_skipped += 1;
                false
            }
        }
    }

    pub fn extend<'a, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'a RawRow>,
    {
        for row in rows {
            self.push(row);
        }
    }

    pub fn rows_accepted(&self) -> usize {
        self.rows_accepted
    }

    pub fn rows_skipped(&self) -> usize {
        self.rows_skipped
    }

    fn week_mut(&mut self, row: &NormalizedRow) -> &mut WeekBuilder {
        let idx = match self.week_index.get(&row.week_key) {
            Some(&idx) => idx,
            None => {
                let idx = self.weeks.len();
                self.weeks.push(WeekBuilder::from_row(row));
                self.week_index.insert(row.week_key.clone(), idx);
                idx
            }
        };
        &mut self.weeks[idx]
    }

    fn insert(&mut self, row: NormalizedRow) {
        let lesson = Lesson {
            name: row.lesson.clone(),
            lesson_link: row.lesson_link.clone(),
            free_link: row.free_link.clone(),
        };

        let lessons = self
            .week_mut(&row)
            .days
            .entry(row.day)
            .or_default()
            .topics
            .entry(row.topic)
            .or_default()
            .subtopics
            .entry(row.subtopic)
            .or_default();

        if !lessons.contains(&lesson) {
            lessons.push(lesson);
        }
    }

    pub fn finish(self) -> Schedule {
        let mut weeks: Vec<WeekEntry> = self.weeks.into_iter().map(WeekBuilder::finish).collect();
        weeks.sort_by_key(|w| w.numeric_order);
        Schedule::from_sorted(weeks)
    }
}

/// Builds a schedule from rows in the given order.
pub fn build<'a, I>(rows: I) -> Schedule
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut builder = ScheduleBuilder::new();
    builder.extend(rows);
    builder.finish()
}
