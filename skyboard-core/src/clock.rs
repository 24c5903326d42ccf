//! Local wall-clock derivation from provider UTC offsets.
//!
//! The displayed time is never stored as a fact: every refresh reads the
//! current instant and applies each location's offset again.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::debug;

use crate::model::WeatherRecord;

/// Record id -> formatted local time (`HH:MM`, or `HH:MM:SS` for second-precision entries).
pub type LocalClockState = BTreeMap<String, String>;

pub const DEFAULT_REFRESH: Duration = Duration::from_secs(1);

/// Shown when an offset cannot be applied to the current instant.
pub const UNKNOWN_TIME: &str = "--:--";

/// Source of the current instant.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// How much of the local time an entry shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    /// `HH:MM`, used on the popular-cities panel.
    #[default]
    Minutes,
    /// `HH:MM:SS`, used on the searched-city card.
    Seconds,
}

impl Precision {
    fn pattern(self) -> &'static str {
        match self {
            Precision::Minutes => "%H:%M",
            Precision::Seconds => "%H:%M:%S",
        }
    }
}

/// `now` shifted by `utc_offset_seconds`, or `None` if the shift leaves chrono's range.
pub fn shift_to_local(now: DateTime<Utc>, utc_offset_seconds: i64) -> Option<DateTime<Utc>> {
    ChronoDuration::try_seconds(utc_offset_seconds).and_then(|offset| now.checked_add_signed(offset))
}

fn format_shifted(now: DateTime<Utc>, utc_offset_seconds: i64, precision: Precision) -> String {
    match shift_to_local(now, utc_offset_seconds) {
        Some(local) => local.format(precision.pattern()).to_string(),
        None => UNKNOWN_TIME.to_string(),
    }
}

/// `now` shifted by `utc_offset_seconds`, as zero-padded 24-hour `HH:MM`.
pub fn format_local_time(now: DateTime<Utc>, utc_offset_seconds: i64) -> String {
    format_shifted(now, utc_offset_seconds, Precision::Minutes)
}

/// Like [`format_local_time`] but `HH:MM:SS`.
pub fn format_local_time_with_seconds(now: DateTime<Utc>, utc_offset_seconds: i64) -> String {
    format_shifted(now, utc_offset_seconds, Precision::Seconds)
}

pub fn derive_local_times<'a, I>(entries: I, now: DateTime<Utc>) -> LocalClockState
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    entries
        .into_iter()
        .map(|(id, offset)| (id.to_owned(), format_local_time(now, offset)))
        .collect()
}

/// One clock to keep refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockEntry {
    pub id: String,
    pub utc_offset_seconds: i64,
    pub precision: Precision,
}

impl ClockEntry {
    pub fn new(id: impl Into<String>, utc_offset_seconds: i64, precision: Precision) -> Self {
        Self { id: id.into(), utc_offset_seconds, precision }
    }
}

pub fn derive_clock_state(entries: &[ClockEntry], now: DateTime<Utc>) -> LocalClockState {
    entries
        .iter()
        .map(|e| (e.id.clone(), format_shifted(now, e.utc_offset_seconds, e.precision)))
        .collect()
}

pub fn clock_entries(records: &[WeatherRecord], precision: Precision) -> Vec<ClockEntry> {
    records
        .iter()
        .map(|r| ClockEntry::new(r.id.clone(), r.utc_offset_seconds, precision))
        .collect()
}

/// A periodically refreshed [`LocalClockState`].
///
/// The refresh task lives until [`LiveClock::cancel`] is called or the handle
/// is dropped, whichever comes first.
#[derive(Debug)]
pub struct LiveClock {
    state: watch::Receiver<LocalClockState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LiveClock {
    /// Compute the state now, then recompute every `period` on the tokio runtime.
    ///
    /// With no entries there is nothing to refresh and an idle handle is returned.
    pub fn start<C: Clock>(entries: Vec<ClockEntry>, clock: C, period: Duration) -> Self {
        if entries.is_empty() {
            return Self::idle();
        }

        let compute = move |clock: &C| derive_clock_state(&entries, clock.now());

        let (state_tx, state_rx) = watch::channel(compute(&clock));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick completes immediately; the initial state is already published.
            interval.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    _ = interval.tick() => {
                        if state_tx.send(compute(&clock)).is_err() {
                            break;
                        }
                    }
                }
            }

            debug!("local clock refresh stopped");
        });

        Self {
            state: state_rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// A handle with no refresh running and an empty state.
    pub fn idle() -> Self {
        let (_tx, state) = watch::channel(LocalClockState::new());
        Self {
            state,
            shutdown: None,
            task: None,
        }
    }

    pub fn for_records(records: &[WeatherRecord], precision: Precision) -> Self {
        Self::start(clock_entries(records, precision), SystemClock, DEFAULT_REFRESH)
    }

    /// Latest derived times.
    pub fn snapshot(&self) -> LocalClockState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocalClockState> {
        self.state.clone()
    }

    pub fn time_for(&self, id: &str) -> Option<String> {
        self.state.borrow().get(id).cloned()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Stop the refresh task.
    ///
    /// Returns `true` only for the call that stopped a running refresh; later
    /// calls, and calls on an idle handle, return `false`.
    pub fn cancel(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        task.abort();
        debug!("local clock refresh cancelled");
        true
    }
}

impl Drop for LiveClock {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, m, s).unwrap()
    }

    fn minutes_of_day(hhmm: &str) -> i64 {
        let (h, m) = hhmm.split_once(':').unwrap();
        h.parse::<i64>().unwrap() * 60 + m.parse::<i64>().unwrap()
    }

    #[test]
    fn negative_offset_shifts_west() {
        assert_eq!(format_local_time(at(12, 0, 0), -18000), "07:00");
    }

    #[test]
    fn output_is_zero_padded_24_hour() {
        assert_eq!(format_local_time(at(3, 5, 0), 0), "03:05");
        assert_eq!(format_local_time(at(21, 45, 59), 0), "21:45");
    }

    #[test]
    fn same_instant_is_idempotent() {
        let now = at(9, 17, 42);
        assert_eq!(format_local_time(now, 19800), format_local_time(now, 19800));
    }

    #[test]
    fn one_hour_later_rolls_over_midnight() {
        let now = at(21, 30, 0);
        let offset = 2 * 3600;
        assert_eq!(format_local_time(now, offset), "23:30");
        assert_eq!(format_local_time(now + ChronoDuration::hours(1), offset), "00:30");
    }

    #[test]
    fn offsets_beyond_twelve_hours() {
        // Kiribati (+14h) and Baker Island (-12h).
        assert_eq!(format_local_time(at(12, 0, 0), 14 * 3600), "02:00");
        assert_eq!(format_local_time(at(6, 0, 0), -12 * 3600), "18:00");
    }

    #[test]
    fn entries_an_hour_apart_differ_by_one_hour() {
        let state = derive_local_times([("a", 0), ("b", 3600)], at(10, 20, 0));

        let a = minutes_of_day(&state["a"]);
        let b = minutes_of_day(&state["b"]);
        assert_eq!((b - a).rem_euclid(24 * 60), 60);
    }

    #[test]
    fn derivation_covers_every_entry() {
        let state = derive_local_times([("x", 0), ("y", -3600), ("z", 5400)], at(0, 10, 0));
        assert_eq!(state.len(), 3);
        assert_eq!(state["y"], "23:10");
        assert_eq!(state["z"], "01:40");
    }

    #[test]
    fn seconds_precision_keeps_seconds() {
        assert_eq!(format_local_time_with_seconds(at(12, 0, 7), -18000), "07:00:07");
        assert_eq!(format_local_time_with_seconds(at(23, 59, 59), 1), "00:00:00");
    }

    #[test]
    fn out_of_range_offset_does_not_panic() {
        let now = at(12, 0, 0);
        assert_eq!(format_local_time(now, 1_000_000_000_000_000), UNKNOWN_TIME);
        assert_eq!(format_local_time(now, i64::MIN), UNKNOWN_TIME);
        assert_eq!(format_local_time_with_seconds(now, i64::MAX), UNKNOWN_TIME);
        assert!(shift_to_local(now, 1_000_000_000_000_000).is_none());
    }

    #[test]
    fn clock_state_mixes_precisions() {
        let entries = [
            ClockEntry::new("card", 3600, Precision::Seconds),
            ClockEntry::new("panel", 3600, Precision::Minutes),
        ];
        let state = derive_clock_state(&entries, at(10, 20, 30));

        assert_eq!(state["card"], "11:20:30");
        assert_eq!(state["panel"], "11:20");
    }

    /// Clock that advances one minute per reading and counts readings.
    #[derive(Clone)]
    struct SteppingClock {
        start: DateTime<Utc>,
        reads: Arc<AtomicUsize>,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            self.start + ChronoDuration::minutes(n as i64)
        }
    }

    fn minutes(id: &str, offset: i64) -> ClockEntry {
        ClockEntry::new(id, offset, Precision::Minutes)
    }

    fn stepping() -> (SteppingClock, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        let clock = SteppingClock { start: at(8, 0, 0), reads: reads.clone() };
        (clock, reads)
    }

    #[tokio::test(start_paused = true)]
    async fn live_clock_populates_immediately() {
        let (clock, _) = stepping();
        let live = LiveClock::start(vec![minutes("Tokyo-JP", 9 * 3600)], clock, DEFAULT_REFRESH);

        assert!(live.is_running());
        assert_eq!(live.time_for("Tokyo-JP").as_deref(), Some("17:00"));
    }

    #[tokio::test(start_paused = true)]
    async fn live_clock_recomputes_each_period() {
        let (clock, reads) = stepping();
        let live = LiveClock::start(vec![minutes("a", 0)], clock, DEFAULT_REFRESH);
        let mut rx = live.subscribe();
        rx.mark_unchanged();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update()["a"], "08:01");
        assert!(reads.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn no_recomputation_after_teardown() {
        let (clock, reads) = stepping();
        let mut live = LiveClock::start(vec![minutes("a", 0)], clock, DEFAULT_REFRESH);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(reads.load(Ordering::SeqCst) >= 3);

        assert!(live.cancel());
        assert!(!live.cancel());
        assert!(!live.is_running());

        let frozen = reads.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(reads.load(Ordering::SeqCst), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_refresh() {
        let (clock, reads) = stepping();
        let live = LiveClock::start(vec![minutes("a", 0)], clock, DEFAULT_REFRESH);
        let rx = live.subscribe();

        drop(live);
        let frozen = reads.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(reads.load(Ordering::SeqCst), frozen);
        assert_eq!(rx.borrow()["a"], "08:00");
    }

    #[tokio::test(start_paused = true)]
    async fn second_precision_entry_ticks_every_refresh() {
        let reads = Arc::new(AtomicUsize::new(0));
        let clock = SteppingClock { start: at(8, 0, 0), reads: reads.clone() };
        let live = LiveClock::start(vec![ClockEntry::new("card", 0, Precision::Seconds)], clock, DEFAULT_REFRESH);
        let mut rx = live.subscribe();

        assert_eq!(rx.borrow_and_update()["card"], "08:00:00");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update()["card"], "08:01:00");
    }

    #[tokio::test]
    async fn idle_handle_cancels_safely() {
        let mut live = LiveClock::idle();
        assert!(!live.is_running());
        assert!(live.snapshot().is_empty());
        assert!(!live.cancel());
    }

    #[tokio::test]
    async fn no_entries_starts_nothing() {
        let (clock, reads) = stepping();
        let live = LiveClock::start(Vec::new(), clock, DEFAULT_REFRESH);

        assert!(!live.is_running());
        assert_eq!(reads.load(Ordering::SeqCst), 0);
    }
}
