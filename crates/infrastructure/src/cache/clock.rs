use chrono::{DateTime, Utc};
use ferrous_cache_application::ports::Clock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Reads the operating system clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Both readings share one offset from the creation point, so entry ages and
/// trim slices advance together. With a non-zero tick, every `instant()`
/// reading moves the clock forward by that tick, which lets a test make a trim
/// run out of its time slice after a known number of evictions.
#[derive(Debug)]
pub struct ManualClock {
    base_instant: Instant,
    base_time: DateTime<Utc>,
    offset_us: AtomicU64,
    tick_us: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(time: DateTime<Utc>) -> Self {
        Self {
            base_instant: Instant::now(),
            base_time: time,
            offset_us: AtomicU64::new(0),
            tick_us: AtomicU64::new(0),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset_us
            .fetch_add(by.as_micros() as u64, Ordering::Relaxed);
    }

    /// Moves the clock forward by `tick` on every `instant()` reading.
    pub fn set_tick(&self, tick: Duration) {
        self.tick_us.store(tick.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.offset_us.load(Ordering::Relaxed))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let offset = self.offset_us.load(Ordering::Relaxed);
        self.base_time + chrono::Duration::microseconds(offset as i64)
    }

    fn instant(&self) -> Instant {
        let tick = self.tick_us.load(Ordering::Relaxed);
        let offset = self.offset_us.fetch_add(tick, Ordering::Relaxed);
        self.base_instant + Duration::from_micros(offset)
    }
}
