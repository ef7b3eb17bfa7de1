//! Performance measurement tools.

use std::{
    cell::Cell,
    fmt,
    time::{Duration, Instant},
};

/// Measures and averages the time an operation takes.
///
/// Collected timings are averaged and reset when the timer is displayed using `{}`
/// ([`std::fmt::Display`]).
#[derive(Debug)]
pub struct Timer {
    name: &'static str,
    total: Cell<Duration>,
    count: Cell<u32>,
}

impl Timer {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            total: Cell::new(Duration::ZERO),
            count: Cell::new(0),
        }
    }

    /// Invokes a closure, measuring and recording the time it takes.
    pub fn time<T>(&mut self, timee: impl FnOnce() -> T) -> T {
        let _guard = self.start();
        timee()
    }

    /// Starts timing an operation using a drop guard.
    ///
    /// When the returned [`TimerGuard`] is dropped, the time between the call to `start` and the
    /// drop is recorded.
    pub fn start(&mut self) -> TimerGuard<'_> {
        TimerGuard {
            start: Instant::now(),
            timer: self,
        }
    }

    /// Returns the number of operations recorded since the timer was last displayed.
    pub fn count(&self) -> u32 {
        self.count.get()
    }

    /// Returns the average duration of the recorded operations.
    pub fn average(&self) -> Option<Duration> {
        match self.count.get() {
            0 => None,
            n => Some(self.total.get() / n),
        }
    }

    fn record(&mut self, duration: Duration) {
        self.total.set(self.total.get().saturating_add(duration));
        self.count.set(self.count.get().saturating_add(1));
    }
}

/// Displays the average recorded time and resets it.
impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.count.get();
        let avg_ms = self.average().unwrap_or_default().as_secs_f32() * 1000.0;
        self.total.set(Duration::ZERO);
        self.count.set(0);

        write!(f, "{}: {count}x{avg_ms:.01}ms", self.name)
    }
}

/// Guard returned by [`Timer::start`]. Stops timing the operation when dropped.
pub struct TimerGuard<'a> {
    start: Instant,
    timer: &'a mut Timer,
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.timer.record(self.start.elapsed());
    }
}

/// Logs frames per second, along with a set of [`Timer`]s.
#[derive(Debug)]
pub struct FpsCounter {
    name: String,
    frames: u32,
    start: Instant,
}

impl FpsCounter {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            frames: 0,
            start: Instant::now(),
        }
    }

    /// Advances the frame counter by 1 and logs FPS if one second has passed.
    pub fn tick(&mut self) {
        self.tick_with(std::iter::empty::<&Timer>());
    }

    /// Advances the frame counter by 1 and logs FPS and the `timers` if one second has passed.
    ///
    /// Logging a [`Timer`] resets it.
    pub fn tick_with<T: fmt::Display, I: IntoIterator<Item = T>>(&mut self, timers: I) {
        self.frames += 1;
        if self.start.elapsed() < Duration::from_secs(1) {
            return;
        }

        let extra = timers
            .into_iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>();
        if extra.is_empty() {
            log::debug!("{}: {} FPS", self.name, self.frames);
        } else {
            log::debug!("{}: {} FPS ({})", self.name, self.frames, extra.join(", "));
        }

        self.frames = 0;
        self.start = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_and_resets() {
        let mut timer = Timer::new("op");
        assert_eq!(timer.average(), None);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(30));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), Some(Duration::from_millis(20)));

        assert_eq!(timer.to_string(), "op: 2x20.0ms");
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.to_string(), "op: 0x0.0ms");
    }

    #[test]
    fn guard_records() {
        let mut timer = Timer::new("op");
        let value = timer.time(|| 42);
        assert_eq!(value, 42);
        drop(timer.start());
        assert_eq!(timer.count(), 2);
    }
}
