use std::collections::BTreeMap;

use chrono::Utc;
use shared::{
    domain::{BehaviorCategory, IncidentLogEntry, LogEntryId},
    error::ValidationError,
};

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 5;

/// Append-only, newest-first collection of behavior incidents. Per-category
/// counts for the dashboard chart are cached and recomputed lazily after each
/// append.
#[derive(Debug, Default)]
pub struct LogStore {
    entries: Vec<IncidentLogEntry>,
    counts: Option<BTreeMap<BehaviorCategory, usize>>,
}

impl LogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an incident at the front of the list. Entries are immutable
    /// once logged. The GUI slider cannot produce an out-of-range intensity,
    /// but the API still rejects one.
    pub fn add_entry(
        &mut self,
        student_name: &str,
        category: BehaviorCategory,
        description: &str,
        intensity: u8,
    ) -> Result<&IncidentLogEntry, ValidationError> {
        if student_name.trim().is_empty() {
            return Err(ValidationError::EmptyStudentName);
        }
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&intensity) {
            return Err(ValidationError::IntensityOutOfRange { value: intensity });
        }

        let logged_at = Utc::now();
        // Ids are timestamp-derived; same-millisecond saves still get strictly
        // increasing ids so newest-first stays unambiguous.
        let mut id = logged_at.timestamp_millis();
        if let Some(newest) = self.entries.first() {
            if id <= newest.id.0 {
                id = newest.id.0 + 1;
            }
        }

        self.entries.insert(
            0,
            IncidentLogEntry {
                id: LogEntryId(id),
                logged_at,
                student_name: student_name.to_string(),
                category,
                description: description.to_string(),
                intensity,
            },
        );
        self.counts = None;
        Ok(&self.entries[0])
    }

    /// Entries ordered newest-first.
    pub fn entries(&self) -> &[IncidentLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Incident count per category, for chart rendering only.
    pub fn aggregate_by_category(&mut self) -> &BTreeMap<BehaviorCategory, usize> {
        let entries = &self.entries;
        self.counts.get_or_insert_with(|| {
            let mut counts = BTreeMap::new();
            for entry in entries {
                *counts.entry(entry.category).or_insert(0) += 1;
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_student_name() {
        let mut store = LogStore::new();
        let err = store
            .add_entry("", BehaviorCategory::Defiance, "", 3)
            .expect_err("empty name must be rejected");
        assert_eq!(err, ValidationError::EmptyStudentName);
        assert!(store.is_empty());
    }

    #[test]
    fn rejects_out_of_range_intensity() {
        let mut store = LogStore::new();
        for value in [0u8, 6, 200] {
            let err = store
                .add_entry("Sam", BehaviorCategory::Frustration, "slammed book", value)
                .expect_err("out-of-range intensity must be rejected");
            assert_eq!(err, ValidationError::IntensityOutOfRange { value });
        }
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn orders_newest_first_and_aggregates_counts() {
        let mut store = LogStore::new();
        store
            .add_entry("Sam", BehaviorCategory::Disengagement, "stared at wall", 2)
            .expect("first entry");
        store
            .add_entry("Sam", BehaviorCategory::Defiance, "refused", 5)
            .expect("second entry");

        let categories: Vec<_> = store.entries().iter().map(|e| e.category).collect();
        assert_eq!(
            categories,
            vec![BehaviorCategory::Defiance, BehaviorCategory::Disengagement]
        );

        let counts = store.aggregate_by_category();
        assert_eq!(counts.get(&BehaviorCategory::Disengagement), Some(&1));
        assert_eq!(counts.get(&BehaviorCategory::Defiance), Some(&1));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn same_millisecond_saves_get_strictly_decreasing_ids_down_the_list() {
        let mut store = LogStore::new();
        for i in 0..5 {
            store
                .add_entry("Ana", BehaviorCategory::Distraction, &format!("event {i}"), 1)
                .expect("entry");
        }
        let ids: Vec<_> = store.entries().iter().map(|e| e.id.0).collect();
        assert!(ids.windows(2).all(|pair| pair[0] > pair[1]));
    }

    #[test]
    fn aggregation_cache_is_invalidated_by_appends() {
        let mut store = LogStore::new();
        store
            .add_entry("Sam", BehaviorCategory::Impulsivity, "shouted out", 4)
            .expect("entry");
        assert_eq!(
            store.aggregate_by_category().get(&BehaviorCategory::Impulsivity),
            Some(&1)
        );
        store
            .add_entry("Sam", BehaviorCategory::Impulsivity, "again", 4)
            .expect("entry");
        assert_eq!(
            store.aggregate_by_category().get(&BehaviorCategory::Impulsivity),
            Some(&2)
        );
    }
}
