//! Matching recognized gestures and shapes against an expected answer.

use std::{fmt, str::FromStr};

use anyhow::bail;

use crate::shape::Shape;

/// The answer a task expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Show this many extended fingers (1 to 5).
    Fingers(u8),
    /// Draw this shape in the air.
    Shape(Shape),
}

/// How a task is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Answered by holding up fingers.
    Gesture,
    /// Answered by drawing a shape.
    Drawing,
}

impl Answer {
    pub fn kind(&self) -> TaskKind {
        match self {
            Answer::Fingers(_) => TaskKind::Gesture,
            Answer::Shape(_) => TaskKind::Drawing,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Fingers(n) => write!(f, "{n}"),
            Answer::Shape(shape) => fmt::Display::fmt(shape, f),
        }
    }
}

/// Parses a finger count (`"0"` to `"5"`) or a shape name (`"circle"`, `"triangle"`, `"square"`).
impl FromStr for Answer {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(n) = s.parse::<u8>() {
            if n > 5 {
                bail!("finger count {n} out of range (expected 0 to 5)");
            }
            return Ok(Answer::Fingers(n));
        }

        match s.parse::<Shape>()? {
            Shape::Unknown => bail!("'{s}' is not a valid answer"),
            shape => Ok(Answer::Shape(shape)),
        }
    }
}

/// The outcome of comparing a recognized result with the expected [`Answer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    TryAgain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Awaiting,
    Accepted,
}

/// Compares recognized results against the [`Answer`] of the current task.
///
/// Once a correct answer has been seen, the matcher stops producing verdicts until it is
/// [`reset`][Self::reset] for the next task.
#[derive(Debug, Clone)]
pub struct AnswerMatcher {
    answer: Answer,
    state: State,
}

impl AnswerMatcher {
    pub fn new(answer: Answer) -> Self {
        Self {
            answer,
            state: State::Awaiting,
        }
    }

    pub fn answer(&self) -> Answer {
        self.answer
    }

    /// Returns whether the correct answer has been given.
    pub fn is_accepted(&self) -> bool {
        self.state == State::Accepted
    }

    /// Rearms the matcher for a new attempt.
    pub fn reset(&mut self) {
        self.state = State::Awaiting;
    }

    /// Checks a per-frame finger count.
    ///
    /// Finger counts are noisy from frame to frame, so wrong counts don't produce a verdict. Only
    /// the first matching non-zero count yields [`Verdict::Correct`]. Always returns [`None`] for
    /// drawing tasks.
    pub fn check_gesture(&mut self, finger_count: u8) -> Option<Verdict> {
        match (self.state, self.answer) {
            (State::Awaiting, Answer::Fingers(expected))
                if finger_count > 0 && finger_count == expected =>
            {
                log::debug!("correct finger count {finger_count}");
                self.state = State::Accepted;
                Some(Verdict::Correct)
            }
            _ => None,
        }
    }

    /// Checks a classified stroke.
    ///
    /// Every stroke is a deliberate attempt, so this yields a verdict either way, unless the task
    /// has already been answered correctly. Always returns [`None`] for gesture tasks.
    pub fn check_shape(&mut self, shape: Shape) -> Option<Verdict> {
        let State::Awaiting = self.state else {
            return None;
        };
        let Answer::Shape(expected) = self.answer else {
            return None;
        };

        if shape == expected {
            log::debug!("correct shape {shape}");
            self.state = State::Accepted;
            Some(Verdict::Correct)
        } else {
            log::debug!("expected {expected}, got {shape}");
            Some(Verdict::TryAgain)
        }
    }
}
