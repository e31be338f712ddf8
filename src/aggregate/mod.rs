//! Multi-source daily aggregation.
//!
//! Merges same-day records from independent sources (Fit2Go, Google Fit,
//! Health Connect) into one `IntegratedDailySummary`:
//!
//! - heart rate: duration-weighted mean across sources
//! - active time / calories / steps: plain sums, missing counts as 0
//! - time series: aligned on the sorted union of slot keys, combined per slot
//!   with `max`
//!
//! Everything here is pure. Records have already been fetched and decoded;
//! missing fields arrive as defaults, so a half-empty source only contributes
//! less, it never fails the day.

use std::collections::BTreeSet;

use crate::domain::{IntegratedDailySummary, SourceDailyRecord};

/// A value paired with its weight. Either side may be missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weighted {
    pub value: Option<f64>,
    pub weight: Option<f64>,
}

impl Weighted {
    pub fn new(value: Option<f64>, weight: Option<f64>) -> Self {
        Self { value, weight }
    }
}

/// Weighted mean of `items`, or `None` when the total weight is zero.
///
/// A missing value or weight counts as 0 in the sums. An item with no value
/// but a positive weight therefore still counts toward the denominator and
/// pulls the mean toward 0.
pub fn weighted_average(items: &[Weighted]) -> Option<f64> {
    let total_weight: f64 = items.iter().map(|item| item.weight.unwrap_or(0.0)).sum();
    if total_weight == 0.0 {
        return None;
    }

    let weighted_sum: f64 = items
        .iter()
        .map(|item| item.value.unwrap_or(0.0) * item.weight.unwrap_or(0.0))
        .sum();

    Some(weighted_sum / total_weight)
}

/// Sorted, duplicate-free union of every source's slot keys.
pub fn merge_time_slots(sources: &[SourceDailyRecord]) -> Vec<String> {
    let slots: BTreeSet<&str> = sources
        .iter()
        .flat_map(|source| source.time_slots.iter().map(String::as_str))
        .collect();
    slots.into_iter().map(str::to_string).collect()
}

/// Per merged slot, the highest activity level any source reports (absent = 0).
pub fn calculate_activity_levels(sources: &[SourceDailyRecord]) -> Vec<f64> {
    activity_levels_for(&merge_time_slots(sources), sources)
}

/// Per merged slot, the highest heart rate any source reports.
///
/// Unlike activity levels, a slot no source reports stays `None`.
pub fn merge_heart_rate_data(sources: &[SourceDailyRecord]) -> Vec<Option<f64>> {
    heart_rates_for(&merge_time_slots(sources), sources)
}

/// Combine all sources for one day.
pub fn integrate(sources: &[SourceDailyRecord]) -> IntegratedDailySummary {
    let heart_rate_items: Vec<Weighted> = sources
        .iter()
        .map(|source| Weighted::new(source.avg_heart_rate, source.duration))
        .collect();

    let time_slots = merge_time_slots(sources);
    let activity_level = activity_levels_for(&time_slots, sources);
    let heart_rate = heart_rates_for(&time_slots, sources);

    IntegratedDailySummary {
        avg_heart_rate: weighted_average(&heart_rate_items),
        total_active_time: sources.iter().map(|s| s.active_time.unwrap_or(0.0)).sum(),
        total_calories: sources.iter().map(|s| s.calories.unwrap_or(0.0)).sum(),
        total_steps: sources.iter().map(|s| s.steps.unwrap_or(0)).sum(),
        time_slots,
        activity_level,
        heart_rate,
    }
}

fn activity_levels_for(slots: &[String], sources: &[SourceDailyRecord]) -> Vec<f64> {
    slots
        .iter()
        .map(|slot| {
            sources
                .iter()
                .map(|source| source.activity_levels.get(slot).copied().flatten().unwrap_or(0.0))
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect()
}

fn heart_rates_for(slots: &[String], sources: &[SourceDailyRecord]) -> Vec<Option<f64>> {
    slots
        .iter()
        .map(|slot| {
            sources
                .iter()
                .filter_map(|source| source.heart_rates.get(slot).copied().flatten())
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slots: &[&str]) -> SourceDailyRecord {
        SourceDailyRecord {
            time_slots: slots.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn with_activity(mut r: SourceDailyRecord, levels: &[(&str, f64)]) -> SourceDailyRecord {
        for (slot, v) in levels {
            r.activity_levels.insert(slot.to_string(), Some(*v));
        }
        r
    }

    fn with_heart(mut r: SourceDailyRecord, rates: &[(&str, Option<f64>)]) -> SourceDailyRecord {
        for (slot, v) in rates {
            r.heart_rates.insert(slot.to_string(), *v);
        }
        r
    }

    #[test]
    fn weighted_average_is_none_without_weight() {
        assert_eq!(weighted_average(&[]), None);
        let items = [
            Weighted::new(Some(120.0), Some(0.0)),
            Weighted::new(Some(90.0), None),
            Weighted::new(None, Some(0.0)),
        ];
        assert_eq!(weighted_average(&items), None);
    }

    #[test]
    fn weighted_average_counts_null_value_in_denominator() {
        let items = [Weighted::new(Some(100.0), Some(10.0)), Weighted::new(None, Some(10.0))];
        assert_eq!(weighted_average(&items), Some(50.0));
    }

    #[test]
    fn weighted_average_stays_within_bounds() {
        let sets: [&[(f64, f64)]; 4] = [
            &[(60.0, 1.0), (180.0, 3.0)],
            &[(72.5, 0.5), (72.5, 12.0)],
            &[(90.0, 2.0), (110.0, 0.0), (150.0, 7.5)],
            &[(55.0, 100.0), (200.0, 0.01)],
        ];
        for set in sets {
            let items: Vec<Weighted> = set.iter().map(|(v, w)| Weighted::new(Some(*v), Some(*w))).collect();
            let contributing: Vec<f64> = set.iter().filter(|(_, w)| *w > 0.0).map(|(v, _)| *v).collect();
            let lo = contributing.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = contributing.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let avg = weighted_average(&items).unwrap();
            assert!(avg >= lo - 1e-9 && avg <= hi + 1e-9, "avg {avg} outside [{lo}, {hi}]");
        }
    }

    #[test]
    fn integrate_weights_heart_rate_by_duration() {
        let sources = [
            SourceDailyRecord { avg_heart_rate: Some(120.0), duration: Some(30.0), ..Default::default() },
            SourceDailyRecord { avg_heart_rate: Some(100.0), duration: Some(10.0), ..Default::default() },
            SourceDailyRecord { avg_heart_rate: None, duration: Some(0.0), ..Default::default() },
        ];
        let summary = integrate(&sources);
        let avg = summary.avg_heart_rate.unwrap();
        assert!((avg - 115.0).abs() < 1e-9);
    }

    #[test]
    fn integrate_zero_duration_has_no_heart_rate() {
        let sources = [
            SourceDailyRecord { avg_heart_rate: Some(120.0), duration: Some(0.0), ..Default::default() },
            SourceDailyRecord::default(),
        ];
        assert_eq!(integrate(&sources).avg_heart_rate, None);
    }

    #[test]
    fn totals_treat_missing_as_zero() {
        let sources = [
            SourceDailyRecord {
                active_time: Some(25.0),
                calories: Some(310.0),
                steps: Some(4000),
                ..Default::default()
            },
            SourceDailyRecord { calories: Some(90.5), ..Default::default() },
            SourceDailyRecord { steps: Some(1234), ..Default::default() },
        ];
        let summary = integrate(&sources);
        assert_eq!(summary.total_active_time, 25.0);
        assert_eq!(summary.total_calories, 400.5);
        assert_eq!(summary.total_steps, 5234);
    }

    #[test]
    fn merge_time_slots_sorts_and_dedups() {
        let sources = [record(&["09:00", "08:00"]), record(&["08:00", "10:30"]), record(&[])];
        assert_eq!(merge_time_slots(&sources), vec!["08:00", "09:00", "10:30"]);
    }

    #[test]
    fn merge_time_slots_ignores_source_order() {
        let a = record(&["12:00", "07:45"]);
        let b = record(&["07:45", "23:15"]);
        let c = record(&["00:00"]);
        let expected = merge_time_slots(&[a.clone(), b.clone(), c.clone()]);
        let permutations = [
            [a.clone(), c.clone(), b.clone()],
            [b.clone(), a.clone(), c.clone()],
            [b.clone(), c.clone(), a.clone()],
            [c.clone(), a.clone(), b.clone()],
            [c.clone(), b.clone(), a.clone()],
        ];
        for perm in permutations {
            assert_eq!(merge_time_slots(&perm), expected);
        }

        let merged = SourceDailyRecord { time_slots: expected.clone(), ..Default::default() };
        assert_eq!(merge_time_slots(&[merged]), expected);
    }

    #[test]
    fn disjoint_slots_combine_with_max() {
        let first = with_activity(record(&["08:00"]), &[("08:00", 3.5)]);
        let second = with_activity(record(&["09:00"]), &[("09:00", 7.0)]);
        let sources = [first, second];

        assert_eq!(merge_time_slots(&sources), vec!["08:00", "09:00"]);
        assert_eq!(calculate_activity_levels(&sources[..1]), vec![3.5]);
        assert_eq!(calculate_activity_levels(&sources), vec![3.5, 7.0]);
    }

    #[test]
    fn activity_levels_default_to_zero() {
        let sources = [
            with_activity(record(&["08:00", "08:15"]), &[("08:00", 2.0)]),
            record(&["08:30"]),
        ];
        let levels = calculate_activity_levels(&sources);
        assert_eq!(levels.len(), merge_time_slots(&sources).len());
        assert_eq!(levels, vec![2.0, 0.0, 0.0]);
    }

    #[test]
    fn null_activity_level_counts_as_zero() {
        let mut quiet = record(&["08:00"]);
        quiet.activity_levels.insert("08:00".to_string(), None);
        assert_eq!(calculate_activity_levels(&[quiet.clone()]), vec![0.0]);

        let busy = with_activity(record(&["08:00"]), &[("08:00", 1.5)]);
        assert_eq!(calculate_activity_levels(&[quiet, busy]), vec![1.5]);
    }

    #[test]
    fn heart_rate_is_none_only_when_unreported() {
        let sources = [
            with_heart(record(&["08:00", "08:15"]), &[("08:00", Some(98.0)), ("08:15", None)]),
            with_heart(record(&["08:00", "08:30"]), &[("08:00", Some(131.0)), ("08:30", Some(0.0))]),
            record(&["08:45"]),
        ];
        let rates = merge_heart_rate_data(&sources);
        assert_eq!(rates, vec![Some(131.0), None, Some(0.0), None]);
    }

    #[test]
    fn integrate_aligns_series_with_slots() {
        let fit2go = with_heart(
            with_activity(record(&["10:00", "10:15"]), &[("10:00", 4.0), ("10:15", 6.0)]),
            &[("10:00", Some(140.0))],
        );
        let google_fit = with_activity(record(&["10:15", "10:30"]), &[("10:15", 9.0)]);
        let summary = integrate(&[fit2go, google_fit, SourceDailyRecord::default()]);

        assert_eq!(summary.time_slots, vec!["10:00", "10:15", "10:30"]);
        assert_eq!(summary.activity_level, vec![4.0, 9.0, 0.0]);
        assert_eq!(summary.heart_rate, vec![Some(140.0), None, None]);
    }

    #[test]
    fn integrate_tolerates_empty_records() {
        let malformed: SourceDailyRecord = serde_json::from_str("{}").unwrap();
        let summary = integrate(&[malformed]);
        assert_eq!(summary, IntegratedDailySummary::default());
    }
}
