//! Rate-limited frame sampling on a background thread.
//!
//! A [`Sampler`] pulls the latest frame from a [`FrameSource`] and runs a [`HandDetector`] on it,
//! at most once per sampling interval. A [`Scheduler`] drives a [`Sampler`] and a [`Session`] on a
//! dedicated thread and publishes the resulting [`Event`]s.

use std::{
    env::{self, VarError},
    io,
    panic::resume_unwind,
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crossbeam::channel::{self, select, Receiver, Sender};
use once_cell::sync::Lazy;

use crate::{
    landmark::HandFrame,
    session::{Event, Session},
    task::Answer,
    timer::{FpsCounter, Timer},
};

/// The shortest allowed interval between two detector invocations.
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

static DEFAULT_INTERVAL: Lazy<Duration> =
    Lazy::new(|| match env::var("AIRSKETCH_SAMPLE_INTERVAL_MS") {
        Ok(v) => match v.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms).max(MIN_SAMPLE_INTERVAL),
            Err(e) => {
                log::warn!(
                    "invalid value set for `AIRSKETCH_SAMPLE_INTERVAL_MS` variable: '{v}' ({e}); \
                     using {MIN_SAMPLE_INTERVAL:?}"
                );
                MIN_SAMPLE_INTERVAL
            }
        },
        Err(VarError::NotPresent) => MIN_SAMPLE_INTERVAL,
        Err(VarError::NotUnicode(s)) => {
            log::warn!(
                "invalid value set for `AIRSKETCH_SAMPLE_INTERVAL_MS` variable: {}; using {:?}",
                s.to_string_lossy(),
                MIN_SAMPLE_INTERVAL,
            );
            MIN_SAMPLE_INTERVAL
        }
    });

/// Returns the sampling interval used by newly created [`Sampler`]s.
///
/// This is [`MIN_SAMPLE_INTERVAL`], unless overridden with the `AIRSKETCH_SAMPLE_INTERVAL_MS`
/// environment variable.
pub fn default_interval() -> Duration {
    *DEFAULT_INTERVAL
}

/// A source of video frames, such as a webcam.
pub trait FrameSource: Send {
    type Frame;

    /// Returns the most recent frame, or [`None`] if the source isn't producing frames yet.
    fn latest_frame(&mut self) -> Option<Self::Frame>;
}

/// Finds hand landmarks in video frames.
pub trait HandDetector: Send {
    type Frame;

    /// Returns whether the detector is initialized and able to process frames.
    fn is_ready(&self) -> bool {
        true
    }

    /// Runs hand detection on `frame`.
    ///
    /// `timestamp` is the time since the [`Sampler`] was created, and increases monotonically
    /// between calls. Returns [`None`] if there is no hand in the frame.
    fn detect(
        &mut self,
        frame: &Self::Frame,
        timestamp: Duration,
    ) -> anyhow::Result<Option<HandFrame>>;
}

/// Reason for [`Sampler::sample`] not running the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The [`FrameSource`] has no frame yet.
    SourceNotReady,
    /// The [`HandDetector`] is not initialized yet.
    DetectorNotReady,
    /// The previous detector invocation was less than one sampling interval ago.
    RateLimited,
}

/// Feeds frames from a [`FrameSource`] to a [`HandDetector`], at a bounded rate.
pub struct Sampler<S, D> {
    source: S,
    detector: D,
    interval: Duration,
    start: Instant,
    last: Option<Instant>,
    timer: Timer,
}

impl<S, D> Sampler<S, D>
where
    S: FrameSource,
    D: HandDetector<Frame = S::Frame>,
{
    /// Creates a sampler using the [`default_interval`].
    pub fn new(source: S, detector: D) -> Self {
        Self {
            source,
            detector,
            interval: default_interval(),
            start: Instant::now(),
            last: None,
            timer: Timer::new("detect"),
        }
    }

    /// Sets the minimum time between two detector invocations.
    ///
    /// # Panics
    ///
    /// This method panics if `interval` is shorter than [`MIN_SAMPLE_INTERVAL`].
    pub fn set_interval(&mut self, interval: Duration) {
        assert!(
            interval >= MIN_SAMPLE_INTERVAL,
            "sampling interval {interval:?} is shorter than the minimum of {MIN_SAMPLE_INTERVAL:?}"
        );
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns the [`Timer`] measuring detector invocations.
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Samples the latest frame at time `now`.
    ///
    /// Returns the detected hand, if any, or the reason why no detection was attempted. Detector
    /// errors are logged and reported as "no hand".
    pub fn sample(&mut self, now: Instant) -> Result<Option<HandFrame>, Skip> {
        let frame = self.source.latest_frame().ok_or(Skip::SourceNotReady)?;
        if !self.detector.is_ready() {
            return Err(Skip::DetectorNotReady);
        }
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.interval {
                return Err(Skip::RateLimited);
            }
        }
        self.last = Some(now);

        let timestamp = now.saturating_duration_since(self.start);
        match self.timer.time(|| self.detector.detect(&frame, timestamp)) {
            Ok(hand) => Ok(hand),
            Err(e) => {
                log::warn!("hand detection failed: {e:#}");
                Ok(None)
            }
        }
    }
}

enum Command {
    SetTask(Option<Answer>),
}

/// Handle to the gesture sampling thread.
///
/// The thread runs until [`Scheduler::stop`] is called, or the [`Scheduler`] is dropped. Either
/// cancels any pending stroke timeout and joins the thread. If the thread has panicked, the panic
/// will be forwarded to the thread stopping the [`Scheduler`].
pub struct Scheduler {
    commands: Option<Sender<Command>>,
    events: Receiver<Event>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawns the sampling thread.
    ///
    /// The thread samples frames with `sampler` once per sampling interval, feeds them into
    /// `session`, and fires the session's stroke timeouts.
    pub fn spawn<S, D>(sampler: Sampler<S, D>, session: Session) -> io::Result<Self>
    where
        S: FrameSource + 'static,
        D: HandDetector<Frame = S::Frame> + 'static,
    {
        let (cmd_sender, cmd_recv) = channel::unbounded();
        let (event_sender, event_recv) = channel::unbounded();
        let handle = thread::Builder::new()
            .name("gesture sampler".into())
            .spawn(move || {
                log::debug!("gesture sampler starting");
                run(sampler, session, cmd_recv, event_sender);
                log::debug!("gesture sampler exiting");
            })?;

        Ok(Self {
            commands: Some(cmd_sender),
            events: event_recv,
            handle: Some(handle),
        })
    }

    /// Switches to a new task, or to no task at all.
    ///
    /// If the sampling thread has panicked, this will propagate the panic to the calling thread.
    pub fn set_task(&mut self, answer: Option<Answer>) {
        let Some(commands) = &self.commands else {
            return;
        };
        if commands.send(Command::SetTask(answer)).is_err() {
            self.wait_for_exit();
        }
    }

    /// Returns the channel on which [`Event`]s are published.
    pub fn events(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Stops the sampling thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Closing the command channel tells the thread to exit.
        drop(self.commands.take());
        self.wait_for_exit();
    }

    fn wait_for_exit(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(payload) = handle.join() {
                if !thread::panicking() {
                    resume_unwind(payload);
                }
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<S, D>(
    mut sampler: Sampler<S, D>,
    mut session: Session,
    commands: Receiver<Command>,
    events: Sender<Event>,
) where
    S: FrameSource,
    D: HandDetector<Frame = S::Frame>,
{
    let ticker = channel::tick(sampler.interval());
    let mut fps = FpsCounter::new("gesture sampler");
    let mut pending = Vec::new();

    loop {
        let deadline = match session.next_deadline() {
            Some(deadline) => channel::at(deadline),
            None => channel::never(),
        };

        select! {
            recv(commands) -> cmd => match cmd {
                Ok(Command::SetTask(answer)) => session.set_task(answer),
                Err(_) => break,
            },
            recv(ticker) -> _ => {
                let now = Instant::now();
                match sampler.sample(now) {
                    Ok(hand) => {
                        session.on_frame(hand.as_ref(), now, &mut pending);
                        fps.tick_with([sampler.timer()]);
                    }
                    Err(skip) => log::trace!("skipping frame: {skip:?}"),
                }
            },
            recv(deadline) -> _ => session.on_timer(Instant::now(), &mut pending),
        }

        for event in pending.drain(..) {
            if events.send(event).is_err() {
                log::debug!("event receiver dropped, stopping");
                session.shutdown();
                return;
            }
        }
    }

    session.shutdown();
}
