//! Fixed-cadence scheduling of the refresh cycles.
//!
//! Three independent timers: live snapshot (+ recent history), daily summary,
//! cumulative stats. They are not synchronised with each other; each keeps its
//! own next-due instant and all run on the calling thread.

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::data::DashboardApi;
use crate::domain::PollConfig;
use crate::poller::{DisplaySink, Poller};

/// A refresh cycle. `History` has no timer of its own; it runs inside the
/// live cycle while a session is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cycle {
    Live,
    History,
    DailySummary,
    CumulativeStats,
}

impl Cycle {
    pub fn label(self) -> &'static str {
        match self {
            Cycle::Live => "live snapshot",
            Cycle::History => "session history",
            Cycle::DailySummary => "daily summary",
            Cycle::CumulativeStats => "cumulative stats",
        }
    }
}

#[derive(Debug, Clone)]
struct Timer {
    cycle: Cycle,
    interval: Duration,
    /// `None` once the next tick lies beyond what `Instant` can represent.
    next_due: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct Schedule {
    timers: Vec<Timer>,
}

impl Schedule {
    /// All cycles are due immediately at `start`.
    pub fn new(config: &PollConfig, start: Instant) -> Self {
        let timer = |cycle, interval: Duration| Timer {
            cycle,
            interval: interval.max(Duration::from_millis(1)),
            next_due: Some(start),
        };
        Self {
            timers: vec![
                timer(Cycle::Live, config.live_interval),
                timer(Cycle::DailySummary, config.summary_interval),
                timer(Cycle::CumulativeStats, config.cumulative_interval),
            ],
        }
    }

    /// Cycles due at `now`, in a fixed order. Each returned timer is advanced
    /// by one interval; ticks missed while the loop was busy are skipped
    /// rather than replayed. A timer whose next tick would overflow `Instant`
    /// never fires again.
    pub fn due(&mut self, now: Instant) -> Vec<Cycle> {
        let mut out = Vec::new();
        for timer in &mut self.timers {
            let Some(next_due) = timer.next_due else {
                continue;
            };
            if next_due > now {
                continue;
            }
            out.push(timer.cycle);
            timer.next_due = match next_due.checked_add(timer.interval) {
                Some(next) if next > now => Some(next),
                _ => now.checked_add(timer.interval),
            };
        }
        out
    }

    pub fn next_wake(&self) -> Option<Instant> {
        self.timers.iter().filter_map(|t| t.next_due).min()
    }
}

/// Drive `poller` until `config.run_for` elapses (or forever).
pub fn run_loop<A: DashboardApi, S: DisplaySink>(poller: &mut Poller<A, S>) {
    let start = Instant::now();
    let deadline = poller.config().run_for.and_then(|d| start.checked_add(d));
    let mut schedule = Schedule::new(poller.config(), start);

    info!(
        "Polling every {:?} (summary {:?}, cumulative {:?})",
        poller.config().live_interval,
        poller.config().summary_interval,
        poller.config().cumulative_interval
    );

    loop {
        let now = Instant::now();
        if deadline.is_some_and(|d| now >= d) {
            break;
        }

        for cycle in schedule.due(now) {
            poller.run_cycle(cycle);
        }

        let wake = match (schedule.next_wake(), deadline) {
            (Some(w), Some(d)) => w.min(d),
            (Some(w), None) => w,
            (None, Some(d)) => d,
            (None, None) => {
                warn!("No refresh cycle can be scheduled again");
                break;
            }
        };
        let now = Instant::now();
        if wake > now {
            std::thread::sleep(wake - now);
        }
    }

    info!("Polling stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PollConfig {
        PollConfig {
            live_interval: Duration::from_secs(1),
            summary_interval: Duration::from_secs(60),
            cumulative_interval: Duration::from_secs(60),
            ..PollConfig::default()
        }
    }

    #[test]
    fn everything_fires_at_start() {
        let start = Instant::now();
        let mut schedule = Schedule::new(&config(), start);
        assert_eq!(
            schedule.due(start),
            vec![Cycle::Live, Cycle::DailySummary, Cycle::CumulativeStats]
        );
        assert!(schedule.due(start).is_empty());
        assert_eq!(schedule.next_wake(), Some(start + Duration::from_secs(1)));
    }

    #[test]
    fn cadences_are_independent() {
        let start = Instant::now();
        let mut schedule = Schedule::new(&config(), start);
        schedule.due(start);

        let mut live = 0;
        let mut summary = 0;
        for sec in 1..=120 {
            for cycle in schedule.due(start + Duration::from_secs(sec)) {
                match cycle {
                    Cycle::Live => live += 1,
                    Cycle::DailySummary => summary += 1,
                    Cycle::History | Cycle::CumulativeStats => {}
                }
            }
        }
        assert_eq!(live, 120);
        assert_eq!(summary, 2);
    }

    #[test]
    fn huge_interval_does_not_overflow() {
        let start = Instant::now();
        let config = PollConfig { summary_interval: Duration::from_secs(u64::MAX), ..config() };
        let mut schedule = Schedule::new(&config, start);
        assert_eq!(
            schedule.due(start),
            vec![Cycle::Live, Cycle::DailySummary, Cycle::CumulativeStats]
        );
        assert!(schedule.due(start).is_empty());

        let later = start + Duration::from_secs(120);
        assert_eq!(schedule.due(later), vec![Cycle::Live, Cycle::CumulativeStats]);
        assert_eq!(schedule.next_wake(), Some(later + Duration::from_secs(1)));
    }

    #[test]
    fn missed_ticks_are_not_replayed() {
        let start = Instant::now();
        let mut schedule = Schedule::new(&config(), start);
        schedule.due(start);

        let late = start + Duration::from_millis(5500);
        assert_eq!(schedule.due(late), vec![Cycle::Live]);
        assert!(schedule.due(late).is_empty());
        assert_eq!(schedule.next_wake(), Some(late + Duration::from_secs(1)));
    }
}
