//! Per-frame orchestration of gesture classification, stroke accumulation and answer checking.

use std::time::{Duration, Instant};

use crate::{
    gesture::{GestureClassifier, GestureSample},
    landmark::HandFrame,
    shape::{Shape, ShapeClassifier, ShapeThresholds},
    stroke::{Expiry, StrokeAccumulator, Surface},
    task::{Answer, AnswerMatcher, TaskKind, Verdict},
};

/// Something that happened while processing a frame or timer.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The gesture recognized in a sampled frame. Emitted for every frame, with or without a hand.
    Sample(GestureSample),
    /// A finished stroke was too short to classify.
    StrokeDiscarded { points: usize },
    /// A finished stroke was classified.
    ShapeDetected { shape: Shape, points: usize },
    /// The result of checking a gesture or shape against the current task's answer.
    Verdict(Verdict),
}

/// Drives the recognition pipeline for one user.
///
/// A [`Session`] is purely reactive: feed it frames via [`Session::on_frame`] and call
/// [`Session::on_timer`] whenever [`Session::next_deadline`] has passed. Neither blocks.
#[derive(Debug)]
pub struct Session {
    gestures: GestureClassifier,
    shapes: ShapeClassifier,
    strokes: StrokeAccumulator,
    matcher: Option<AnswerMatcher>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Surface::UNIT)
    }
}

impl Session {
    /// Creates a session without a task, mapping strokes onto `surface`.
    pub fn new(surface: Surface) -> Self {
        Self {
            gestures: GestureClassifier::new(),
            shapes: ShapeClassifier::default(),
            strokes: StrokeAccumulator::new(surface),
            matcher: None,
        }
    }

    /// Sets the distance between index and thumb tip above which strokes are recorded.
    ///
    /// # Panics
    ///
    /// This method panics when `threshold` is negative or NaN.
    pub fn set_drawing_threshold(&mut self, threshold: f32) {
        self.gestures.set_drawing_threshold(threshold);
    }

    pub fn set_shape_thresholds(&mut self, thresholds: ShapeThresholds) {
        self.shapes = ShapeClassifier::new(thresholds);
    }

    pub fn set_inactivity_timeout(&mut self, timeout: Duration) {
        self.strokes.set_inactivity_timeout(timeout);
    }

    pub fn set_min_stroke_points(&mut self, min_points: usize) {
        self.strokes.set_min_points(min_points);
    }

    /// Switches to a new task, or to no task at all.
    ///
    /// Any stroke in progress is dropped.
    pub fn set_task(&mut self, answer: Option<Answer>) {
        match answer {
            Some(answer) => log::info!("new task: {:?} {}", answer.kind(), answer),
            None => log::info!("task cleared"),
        }
        self.strokes.cancel();
        self.matcher = answer.map(AnswerMatcher::new);
    }

    /// Returns the answer expected by the current task.
    pub fn task(&self) -> Option<Answer> {
        self.matcher.as_ref().map(|m| m.answer())
    }

    pub fn strokes(&self) -> &StrokeAccumulator {
        &self.strokes
    }

    /// Returns when [`Session::on_timer`] needs to be called next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.strokes.next_deadline()
    }

    /// Processes the hand detected in a sampled frame (or the lack thereof).
    pub fn on_frame(&mut self, hand: Option<&HandFrame>, now: Instant, events: &mut Vec<Event>) {
        let sample = self.gestures.classify(hand);
        events.push(Event::Sample(sample));

        let Some(matcher) = &mut self.matcher else {
            return;
        };
        match matcher.answer().kind() {
            TaskKind::Gesture => {
                if let Some(verdict) = matcher.check_gesture(sample.finger_count) {
                    events.push(Event::Verdict(verdict));
                }
            }
            TaskKind::Drawing => {
                if !matcher.is_accepted() {
                    self.strokes.push(&sample, now);
                }
            }
        }
    }

    /// Handles expiry of the stroke inactivity timeout.
    ///
    /// Does nothing if the deadline hasn't passed at `now`.
    pub fn on_timer(&mut self, now: Instant, events: &mut Vec<Event>) {
        match self.strokes.poll(now) {
            None => {}
            Some(Expiry::Discarded { points }) => {
                events.push(Event::StrokeDiscarded { points });
            }
            Some(Expiry::Submitted(submission)) => {
                let shape = submission.classify(&self.shapes);
                log::debug!("stroke with {} points is a {}", submission.len(), shape);
                events.push(Event::ShapeDetected {
                    shape,
                    points: submission.len(),
                });
                if let Some(verdict) = self.matcher.as_mut().and_then(|m| m.check_shape(shape)) {
                    events.push(Event::Verdict(verdict));
                }
                self.strokes.resolve();
            }
        }
    }

    /// Drops all pending work. Called when the session ends.
    pub fn shutdown(&mut self) {
        self.strokes.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use crate::{geometry::point, synth::HandPose};

    use super::*;

    const FRAME: Duration = Duration::from_millis(100);

    /// Feeds a drawn circle of `n` frames, starting at `t`. Returns the time of the last frame.
    fn draw_circle(session: &mut Session, t: Instant, n: usize, events: &mut Vec<Event>) -> Instant {
        let mut now = t;
        for i in 0..=n {
            now = t + FRAME * i as u32;
            let angle = TAU * i as f32 / n as f32;
            let tip = point(0.5 + 0.3 * angle.cos(), 0.5 + 0.3 * angle.sin());
            session.on_frame(Some(&HandPose::drawing_at(tip).build()), now, events);
        }
        now
    }

    fn verdicts(events: &[Event]) -> Vec<Verdict> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Verdict(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn every_frame_is_sampled() {
        let mut session = Session::default();
        let mut events = Vec::new();
        let now = Instant::now();
        session.on_frame(None, now, &mut events);
        session.on_frame(Some(&HandPose::new().fingers(3).build()), now, &mut events);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::Sample(GestureSample::NEUTRAL));
        let Event::Sample(sample) = events[1] else {
            panic!("{:?}", events[1]);
        };
        assert_eq!(sample.finger_count, 3);
    }

    #[test]
    fn no_task_records_nothing() {
        let mut session = Session::default();
        let mut events = Vec::new();
        draw_circle(&mut session, Instant::now(), 100, &mut events);
        assert_eq!(session.next_deadline(), None);
        assert!(verdicts(&events).is_empty());
    }

    #[test]
    fn gesture_task() {
        let mut session = Session::default();
        session.set_task(Some(Answer::Fingers(3)));
        let mut events = Vec::new();
        let now = Instant::now();
        for n in [0, 1, 2, 4, 3, 3, 3] {
            session.on_frame(Some(&HandPose::new().fingers(n).build()), now, &mut events);
        }
        assert_eq!(verdicts(&events), [Verdict::Correct]);

        // Gesture tasks never record strokes, even in the drawing pose.
        session.on_frame(
            Some(&HandPose::drawing_at(point(0.5, 0.5)).build()),
            now,
            &mut events,
        );
        assert_eq!(session.next_deadline(), None);
    }

    #[test]
    fn drawing_task() {
        let mut session = Session::new(Surface::new(640.0, 480.0));
        session.set_task(Some(Answer::Shape(Shape::Circle)));
        let mut events = Vec::new();
        let t0 = Instant::now();

        let last = draw_circle(&mut session, t0, 100, &mut events);
        assert_eq!(events.len(), 101);
        let deadline = session.next_deadline().unwrap();
        assert_eq!(deadline, last + Duration::from_millis(1500));

        events.clear();
        session.on_timer(deadline - Duration::from_millis(1), &mut events);
        assert!(events.is_empty());

        session.on_timer(deadline, &mut events);
        assert_eq!(
            events,
            [
                Event::ShapeDetected {
                    shape: Shape::Circle,
                    points: 101
                },
                Event::Verdict(Verdict::Correct),
            ]
        );
        assert!(!session.strokes().is_classifying());
        assert_eq!(session.next_deadline(), None);

        // Further drawing is ignored once the task is solved.
        events.clear();
        draw_circle(&mut session, deadline, 100, &mut events);
        assert_eq!(session.next_deadline(), None);
        assert!(verdicts(&events).is_empty());
    }

    #[test]
    fn wrong_shape_then_retry() {
        let mut session = Session::default();
        session.set_task(Some(Answer::Shape(Shape::Triangle)));
        let mut events = Vec::new();
        let t0 = Instant::now();

        let last = draw_circle(&mut session, t0, 100, &mut events);
        events.clear();
        session.on_timer(last + Duration::from_secs(2), &mut events);
        assert_eq!(
            events,
            [
                Event::ShapeDetected {
                    shape: Shape::Circle,
                    points: 101
                },
                Event::Verdict(Verdict::TryAgain),
            ]
        );

        // The accumulator is free for another attempt.
        let last = draw_circle(&mut session, last + Duration::from_secs(3), 100, &mut events);
        assert!(session.next_deadline().is_some());
        events.clear();
        session.on_timer(last + Duration::from_secs(2), &mut events);
        assert_eq!(verdicts(&events), [Verdict::TryAgain]);
    }

    #[test]
    fn short_stroke_is_discarded() {
        let mut session = Session::default();
        session.set_task(Some(Answer::Shape(Shape::Circle)));
        let mut events = Vec::new();
        let t0 = Instant::now();
        for i in 0..5 {
            session.on_frame(
                Some(&HandPose::drawing_at(point(0.5, 0.1 * i as f32)).build()),
                t0 + FRAME * i,
                &mut events,
            );
        }
        events.clear();
        session.on_timer(t0 + Duration::from_secs(10), &mut events);
        assert_eq!(events, [Event::StrokeDiscarded { points: 5 }]);
    }

    #[test]
    fn changing_task_drops_stroke() {
        let mut session = Session::default();
        session.set_task(Some(Answer::Shape(Shape::Circle)));
        let mut events = Vec::new();
        let last = draw_circle(&mut session, Instant::now(), 50, &mut events);
        assert!(session.next_deadline().is_some());

        session.set_task(Some(Answer::Shape(Shape::Square)));
        assert_eq!(session.task(), Some(Answer::Shape(Shape::Square)));
        assert_eq!(session.next_deadline(), None);
        events.clear();
        session.on_timer(last + Duration::from_secs(10), &mut events);
        assert!(events.is_empty());

        session.set_task(None);
        assert_eq!(session.task(), None);
    }

    #[test]
    fn shutdown_cancels_pending_stroke() {
        let mut session = Session::default();
        session.set_task(Some(Answer::Shape(Shape::Circle)));
        let mut events = Vec::new();
        draw_circle(&mut session, Instant::now(), 50, &mut events);
        session.shutdown();
        assert_eq!(session.next_deadline(), None);
        assert!(session.strokes().stroke().is_empty());
    }
}
