//! Accumulation of air-drawn strokes.
//!
//! A [`StrokeAccumulator`] collects the index fingertip positions of consecutive
//! [`GestureSample`]s while the hand is in the drawing pose. Once no new point has arrived for the
//! inactivity timeout, the stroke is considered finished and is either handed out for
//! classification or discarded, depending on its length.

use std::{
    mem,
    time::{Duration, Instant},
};

use crate::{
    geometry::{point, Point},
    gesture::GestureSample,
    shape::{Shape, ShapeClassifier},
};

/// The ordered points of one drawing attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// The drawing surface that normalized fingertip positions are mapped onto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    width: f32,
    height: f32,
}

impl Surface {
    /// A surface that keeps normalized coordinates as-is.
    pub const UNIT: Self = Self {
        width: 1.0,
        height: 1.0,
    };

    /// Creates a surface of the given size.
    ///
    /// # Panics
    ///
    /// This method panics if `width` or `height` is not a positive number.
    pub fn new(width: f32, height: f32) -> Self {
        assert!(
            width > 0.0 && height > 0.0,
            "invalid surface size {width}x{height}"
        );
        Self { width, height }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Maps a point from normalized image coordinates onto this surface.
    #[inline]
    pub fn map(&self, p: Point) -> Point {
        point(p.x * self.width, p.y * self.height)
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::UNIT
    }
}

/// Whether a stroke is currently being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No stroke is in progress.
    Idle,
    /// Points are being appended to the current stroke.
    Recording,
}

/// A finished stroke handed out for classification.
///
/// While a [`Submission`] is outstanding, its [`StrokeAccumulator`] will not submit another
/// stroke. Call [`StrokeAccumulator::resolve`] once the result has been acted on.
#[derive(Debug)]
#[must_use = "the accumulator stays blocked until `StrokeAccumulator::resolve` is called"]
pub struct Submission {
    stroke: Stroke,
}

impl Submission {
    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }

    pub fn len(&self) -> usize {
        self.stroke.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stroke.is_empty()
    }

    pub fn classify(&self, classifier: &ShapeClassifier) -> Shape {
        classifier.classify(self.stroke.points())
    }
}

/// What happened to a stroke when its inactivity timeout expired.
#[derive(Debug)]
pub enum Expiry {
    /// The stroke was too short to classify and was dropped.
    Discarded { points: usize },
    /// The stroke is ready for classification.
    Submitted(Submission),
}

/// Collects fingertip positions into [`Stroke`]s.
///
/// The accumulator is [`Phase::Idle`] until it receives a sample in the drawing pose, then
/// [`Phase::Recording`] until the stroke's inactivity timeout expires. Time is passed in by the
/// caller, which must [`poll`][Self::poll] the accumulator at or after
/// [`next_deadline`][Self::next_deadline].
#[derive(Debug)]
pub struct StrokeAccumulator {
    surface: Surface,
    timeout: Duration,
    min_points: usize,
    phase: Phase,
    stroke: Stroke,
    deadline: Option<Instant>,
    classifying: bool,
}

impl Default for StrokeAccumulator {
    fn default() -> Self {
        Self::new(Surface::UNIT)
    }
}

impl StrokeAccumulator {
    pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_millis(1500);

    pub const DEFAULT_MIN_POINTS: usize = 20;

    /// Creates an idle accumulator that maps fingertip positions onto `surface`.
    pub fn new(surface: Surface) -> Self {
        Self {
            surface,
            timeout: Self::DEFAULT_INACTIVITY_TIMEOUT,
            min_points: Self::DEFAULT_MIN_POINTS,
            phase: Phase::Idle,
            stroke: Stroke::new(),
            deadline: None,
            classifying: false,
        }
    }

    /// Sets how long a stroke may go without new points before it is considered finished.
    ///
    /// By default, [`StrokeAccumulator::DEFAULT_INACTIVITY_TIMEOUT`] is used.
    pub fn set_inactivity_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Sets the number of points a finished stroke has to *exceed* to be submitted.
    ///
    /// By default, [`StrokeAccumulator::DEFAULT_MIN_POINTS`] is used.
    pub fn set_min_points(&mut self, min_points: usize) {
        self.min_points = min_points;
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the stroke currently being drawn.
    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }

    /// Returns whether a [`Submission`] is outstanding.
    pub fn is_classifying(&self) -> bool {
        self.classifying
    }

    /// Returns when the current stroke's inactivity timeout expires, if a stroke is in progress.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Feeds a gesture sample into the accumulator.
    ///
    /// Samples in the drawing pose append their (mapped) index fingertip to the current stroke and
    /// restart the inactivity timeout. All other samples are ignored.
    ///
    /// Returns whether a point was appended.
    pub fn push(&mut self, sample: &GestureSample, now: Instant) -> bool {
        if !sample.is_drawing_pose {
            return false;
        }
        let Some(tip) = sample.index_tip else {
            return false;
        };

        if self.phase == Phase::Idle {
            log::debug!("stroke started");
            self.phase = Phase::Recording;
        }

        self.stroke.push(self.surface.map(tip));
        self.deadline = Some(now + self.timeout);
        true
    }

    /// Checks whether the current stroke's inactivity timeout has expired at `now`.
    ///
    /// If it has, the stroke is taken out of the accumulator, which returns to [`Phase::Idle`] with
    /// a fresh, empty stroke. Strokes with more than the minimum number of points are returned as a
    /// [`Submission`]; shorter ones are discarded.
    ///
    /// While a previous [`Submission`] is outstanding, this always returns [`None`] and the
    /// expired stroke is kept.
    pub fn poll(&mut self, now: Instant) -> Option<Expiry> {
        let deadline = self.deadline?;
        if now < deadline || self.classifying {
            return None;
        }

        self.deadline = None;
        self.phase = Phase::Idle;
        let stroke = mem::take(&mut self.stroke);
        if stroke.len() > self.min_points {
            log::debug!("submitting stroke with {} points", stroke.len());
            self.classifying = true;
            Some(Expiry::Submitted(Submission { stroke }))
        } else {
            log::debug!("discarding stroke with {} points", stroke.len());
            Some(Expiry::Discarded {
                points: stroke.len(),
            })
        }
    }

    /// Marks the outstanding [`Submission`] as handled.
    ///
    /// Anything drawn since the submission is dropped, so that the next attempt starts from a
    /// clean slate.
    pub fn resolve(&mut self) {
        if !self.classifying {
            log::warn!("`StrokeAccumulator::resolve` called without outstanding submission");
        }
        self.clear();
    }

    /// Drops the current stroke, its pending timeout and any outstanding submission.
    pub fn cancel(&mut self) {
        if self.phase == Phase::Recording || self.classifying {
            log::debug!(
                "cancelling stroke with {} points (classifying: {})",
                self.stroke.len(),
                self.classifying
            );
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.phase = Phase::Idle;
        self.stroke = Stroke::new();
        self.deadline = None;
        self.classifying = false;
    }
}
