use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::weights::WeightEntry;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeightStats {
    pub current_weight: f64,
    pub change_7_days: f64,
    pub change_30_days: f64,
    pub average_weight: f64,
    pub total_entries: usize,
    pub min_weight: f64,
    pub max_weight: f64,
}

impl WeightStats {
    /// `entries` must be newest first. The 7/30 day baselines are the first
    /// entries (scanning from newest) at least that old relative to `now`;
    /// without one the change stays 0. `total_entries` counts what was passed
    /// in, so it is capped by whatever limit the caller fetched with.
    pub fn compute(entries: &[WeightEntry], now: OffsetDateTime) -> Self {
        let Some(latest) = entries.first() else {
            return Self::default();
        };

        let current = latest.weight_kg;
        let mut stats = Self {
            current_weight: current,
            total_entries: entries.len(),
            min_weight: current,
            max_weight: current,
            ..Self::default()
        };

        let mut total = 0.0;
        let mut baseline_7 = None;
        let mut baseline_30 = None;
        for entry in entries {
            total += entry.weight_kg;
            stats.min_weight = stats.min_weight.min(entry.weight_kg);
            stats.max_weight = stats.max_weight.max(entry.weight_kg);

            let age = now - entry.recorded_at;
            if baseline_7.is_none() && age >= Duration::days(7) {
                baseline_7 = Some(entry.weight_kg);
            }
            if baseline_30.is_none() && age >= Duration::days(30) {
                baseline_30 = Some(entry.weight_kg);
            }
        }

        stats.average_weight = total / entries.len() as f64;
        if let Some(then) = baseline_7 {
            stats.change_7_days = current - then;
        }
        if let Some(then) = baseline_30 {
            stats.change_30_days = current - then;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-06-15 12:00 UTC);

    fn entry(kg: f64, days_ago: i64) -> WeightEntry {
        let at = NOW - Duration::days(days_ago);
        WeightEntry {
            id: days_ago,
            user_id: 1,
            weight_kg: kg,
            recorded_at: at,
            notes: String::new(),
            created_at: at,
            updated_at: at,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input_is_all_zero() {
        let stats = WeightStats::compute(&[], NOW);
        assert_eq!(stats, WeightStats::default());
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.average_weight, 0.0);
    }

    #[test]
    fn three_entries_over_forty_days() {
        let entries = [entry(77.0, 0), entry(78.5, 10), entry(80.0, 40)];
        let stats = WeightStats::compute(&entries, NOW);

        assert_eq!(stats.current_weight, 77.0);
        assert!(close(stats.change_30_days, -3.0));
        // Scanning newest first, the 10-day-old entry is the first one at
        // least 7 days old, so the weekly change is -1.5 rather than 0.
        assert!(close(stats.change_7_days, -1.5));
        assert!(close(stats.average_weight, 78.5));
        assert_eq!(stats.min_weight, 77.0);
        assert_eq!(stats.max_weight, 80.0);
        assert_eq!(stats.total_entries, 3);
    }

    #[test]
    fn recent_entries_only_leave_changes_at_zero() {
        let entries = [entry(77.0, 0), entry(77.5, 3), entry(78.0, 6)];
        let stats = WeightStats::compute(&entries, NOW);
        assert_eq!(stats.change_7_days, 0.0);
        assert_eq!(stats.change_30_days, 0.0);
        assert_eq!(stats.min_weight, 77.0);
        assert_eq!(stats.max_weight, 78.0);
    }

    #[test]
    fn baseline_is_first_old_enough_entry_not_the_oldest() {
        let entries = [entry(70.0, 0), entry(72.0, 8), entry(75.0, 20), entry(90.0, 31), entry(95.0, 60)];
        let stats = WeightStats::compute(&entries, NOW);
        assert!(close(stats.change_7_days, -2.0));
        assert!(close(stats.change_30_days, -20.0));
    }

    #[test]
    fn exactly_seven_days_counts() {
        let entries = [entry(70.0, 0), entry(71.0, 7)];
        let stats = WeightStats::compute(&entries, NOW);
        assert!(close(stats.change_7_days, -1.0));
        assert_eq!(stats.change_30_days, 0.0);
    }

    #[test]
    fn serializes_with_snake_case_keys() {
        let json = serde_json::to_value(WeightStats::compute(&[entry(80.0, 0)], NOW)).unwrap();
        for key in [
            "current_weight",
            "change_7_days",
            "change_30_days",
            "average_weight",
            "total_entries",
            "min_weight",
            "max_weight",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["total_entries"], 1);
    }
}
