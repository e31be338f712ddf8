//! Formatted terminal output.
//!
//! All string building lives here so the fetch/aggregate code stays free of
//! presentation details.

use crate::domain::{
    CumulativeStats, DailyBucket, HistorySample, IntegratedDailySummary, LiveReadout, SessionDetail, SessionSpan,
};

/// `HH:MM:SS` for an elapsed session time.
pub fn format_time(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// `Xh Ym` for accumulated totals.
pub fn format_total_time(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    format!("{h}h {m}m")
}

/// Thousands separators for step counts.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_live(readout: &LiveReadout) -> String {
    format!(
        "speed {:5.1} km/h | rpm {:5.0} | METs {:4.1} | {:.2} km | {} kcal | {}",
        readout.speed_kmh,
        readout.rpm,
        readout.mets,
        readout.distance_km,
        readout.calories_kcal.round(),
        format_time(readout.time_seconds)
    )
}

pub fn format_cumulative(stats: &CumulativeStats) -> String {
    format!(
        "Total: {} | {:.2} km | {} kcal",
        format_total_time(stats.total_time_seconds),
        stats.total_distance_km,
        stats.total_calories_kcal.round()
    )
}

pub fn format_history(samples: &[HistorySample]) -> String {
    let Some(last) = samples.last() else {
        return "History: no samples".to_string();
    };
    let max_speed = samples.iter().map(|s| s.speed_kmh).fold(0.0, f64::max);
    let avg_rpm = samples.iter().map(|s| s.rpm).sum::<f64>() / samples.len() as f64;
    format!(
        "History: {} samples | max {:.1} km/h | avg {:.0} rpm | last {}",
        samples.len(),
        max_speed,
        avg_rpm,
        last.timestamp.format("%H:%M:%S")
    )
}

/// 15-minute buckets as a small table.
pub fn format_daily_buckets(buckets: &[DailyBucket]) -> String {
    if buckets.is_empty() {
        return "No activity recorded for this day.".to_string();
    }
    let mut out = String::new();
    out.push_str(&format!("{:<6} {:>10} {:>8} {:>8}\n", "time", "avg km/h", "avg rpm", "points"));
    for b in buckets {
        out.push_str(&format!(
            "{:<6} {:>10.1} {:>8.0} {:>8}\n",
            b.time.format("%H:%M"),
            b.avg_speed,
            b.avg_rpm,
            b.point_count.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
        ));
    }
    out
}

/// Summary card plus the per-slot series.
///
/// Zero or missing totals render as `--`, matching the web dashboard.
pub fn format_integrated_summary(date: &str, summary: &IntegratedDailySummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Daily summary {date} ===\n"));
    out.push_str(&format!(
        "Avg heart rate: {}\n",
        summary
            .avg_heart_rate
            .filter(|v| *v != 0.0)
            .map(|v| format!("{} bpm", v.round()))
            .unwrap_or_else(|| "-- bpm".to_string())
    ));
    out.push_str(&format!(
        "Active time:    {}\n",
        placeholder(summary.total_active_time, |v| format!("{} min", v.round()), "-- min")
    ));
    out.push_str(&format!(
        "Calories:       {}\n",
        placeholder(summary.total_calories, |v| format!("{} kcal", v.round()), "-- kcal")
    ));
    out.push_str(&format!(
        "Steps:          {}\n",
        if summary.total_steps == 0 {
            "-- steps".to_string()
        } else {
            format!("{} steps", format_count(summary.total_steps))
        }
    ));

    if summary.time_slots.is_empty() {
        return out;
    }

    out.push_str(&format!("\n{:<8} {:>9} {:>6}\n", "slot", "activity", "bpm"));
    for (i, slot) in summary.time_slots.iter().enumerate() {
        let activity = summary.activity_level.get(i).copied().unwrap_or(0.0);
        let hr = summary
            .heart_rate
            .get(i)
            .copied()
            .flatten()
            .map(|v| format!("{v:.0}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!("{slot:<8} {activity:>9.1} {hr:>6}\n"));
    }
    out
}

fn placeholder(value: f64, fmt: impl Fn(f64) -> String, empty: &str) -> String {
    if value == 0.0 || !value.is_finite() {
        empty.to_string()
    } else {
        fmt(value)
    }
}

pub fn format_session_list(spans: &[SessionSpan]) -> String {
    if spans.is_empty() {
        return "No sessions recorded.".to_string();
    }
    let mut out = String::new();
    for span in spans {
        let end = span
            .end_time
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "active".to_string());
        out.push_str(&format!(
            "#{:<5} {}  {} - {}\n",
            span.id,
            span.start_time.format("%Y-%m-%d"),
            span.start_time.format("%H:%M"),
            end
        ));
    }
    out
}

pub fn format_session_detail(detail: &SessionDetail) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Session #{} ===\n", detail.id));
    out.push_str(&format!("Start: {}\n", detail.start_time));
    match detail.end_time {
        Some(end) => out.push_str(&format!("End:   {end}\n")),
        None => out.push_str("End:   (active)\n"),
    }
    out.push_str(&format!(
        "Time {} | {:.2} km | {} kcal\n",
        format_time(detail.total_time_seconds),
        detail.total_distance_km,
        detail.total_calories_kcal.round()
    ));
    out.push_str(&format!(
        "Avg: {:.1} km/h | {:.0} rpm | {:.1} METs\n",
        detail.average_speed_kmh, detail.average_rpm, detail.average_mets
    ));
    out.push_str(&format!("Data points: {}\n", detail.data_points.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formats() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(3723), "01:02:03");
        assert_eq!(format_total_time(3723), "1h 2m");
        assert_eq!(format_total_time(59), "0h 0m");
    }

    #[test]
    fn count_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(12345), "12,345");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn integrated_summary_placeholders() {
        let summary = IntegratedDailySummary::default();
        let text = format_integrated_summary("2025-03-01", &summary);
        assert!(text.contains("-- bpm"));
        assert!(text.contains("-- min"));
        assert!(text.contains("-- kcal"));
        assert!(text.contains("-- steps"));
        assert!(!text.contains("slot"));
    }

    #[test]
    fn integrated_summary_table() {
        let summary = IntegratedDailySummary {
            avg_heart_rate: Some(115.0),
            total_active_time: 42.4,
            total_calories: 350.0,
            total_steps: 8200,
            time_slots: vec!["08:00".to_string(), "08:15".to_string()],
            activity_level: vec![3.0, 0.0],
            heart_rate: vec![Some(120.0), None],
        };
        let text = format_integrated_summary("2025-03-01", &summary);
        assert!(text.contains("115 bpm"));
        assert!(text.contains("42 min"));
        assert!(text.contains("8,200 steps"));
        assert!(text.contains("08:15"));
    }
}
