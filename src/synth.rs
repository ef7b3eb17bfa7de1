//! Synthetic hand poses.
//!
//! Useful for driving the engine without a camera or detector, in demos and tests.

use crate::{
    geometry::{point, Point},
    landmark::{Finger, HandFrame, Landmark, LandmarkIdx, NUM_LANDMARKS},
};

/// Horizontal spacing between neighboring fingers.
const FINGER_SPACING: f32 = 0.04;
/// Distance between a fingertip and the joint it is compared against.
const JOINT_OFFSET: f32 = 0.06;

/// Builder for a synthetic right-facing hand with chosen finger states.
///
/// The index fingertip is placed exactly at [`HandPose::index_tip`], and the thumb tip exactly
/// [`HandPose::thumb_gap`] below it, so the pose controls both the finger count and the drawing
/// signal of the resulting [`HandFrame`].
#[derive(Debug, Clone)]
pub struct HandPose {
    extended: [bool; 5],
    index_tip: Point,
    thumb_gap: f32,
}

impl Default for HandPose {
    fn default() -> Self {
        Self::new()
    }
}

impl HandPose {
    /// Creates a closed fist with thumb and index finger pinched together, centered in the image.
    pub fn new() -> Self {
        Self {
            extended: [false; 5],
            index_tip: point(0.5, 0.5),
            thumb_gap: 0.03,
        }
    }

    /// Extends `finger`.
    pub fn extend(mut self, finger: Finger) -> Self {
        self.extended[finger as usize] = true;
        self
    }

    /// Extends the first `count` fingers, starting at the index finger and ending with the thumb.
    ///
    /// # Panics
    ///
    /// This method panics if `count` is larger than 5.
    pub fn fingers(mut self, count: u8) -> Self {
        const ORDER: [Finger; 5] = [
            Finger::Index,
            Finger::Middle,
            Finger::Ring,
            Finger::Pinky,
            Finger::Thumb,
        ];
        assert!(count <= 5, "a hand has 5 fingers, not {count}");

        self.extended = [false; 5];
        for &finger in &ORDER[..usize::from(count)] {
            self = self.extend(finger);
        }
        self
    }

    /// Places the index fingertip.
    pub fn index_tip(self, index_tip: Point) -> Self {
        Self { index_tip, ..self }
    }

    /// Sets the distance between the index fingertip and the thumb tip.
    pub fn thumb_gap(self, thumb_gap: f32) -> Self {
        Self { thumb_gap, ..self }
    }

    /// Shorthand for a pose that records strokes at `index_tip`.
    pub fn drawing_at(index_tip: Point) -> Self {
        Self::new()
            .extend(Finger::Index)
            .thumb_gap(0.15)
            .index_tip(index_tip)
    }

    /// Builds the [`HandFrame`].
    ///
    /// # Panics
    ///
    /// This method panics if the index tip or thumb gap are NaN or infinite.
    pub fn build(&self) -> HandFrame {
        let mut lms = [Landmark::default(); NUM_LANDMARKS];
        let mut set = |idx: LandmarkIdx, p: Point| lms[idx.index()] = Landmark::new([p.x, p.y, 0.0]);

        let (x, y) = (self.index_tip.x, self.index_tip.y);

        set(LandmarkIdx::Wrist, point(x + 0.06, y + 0.30));

        // Thumb: extension is decided on the X axis.
        let thumb_tip = point(x, y + self.thumb_gap);
        let ip_dx = if self.extended[Finger::Thumb as usize] {
            0.03
        } else {
            -0.03
        };
        set(LandmarkIdx::ThumbTip, thumb_tip);
        set(LandmarkIdx::ThumbIp, point(thumb_tip.x + ip_dx, thumb_tip.y + 0.02));
        set(LandmarkIdx::ThumbMcp, point(x - 0.02, y + 0.20));
        set(LandmarkIdx::ThumbCmc, point(x, y + 0.25));

        // Other fingers: extension is decided on the Y axis.
        let fingers = [
            (Finger::Index, LandmarkIdx::IndexFingerMcp),
            (Finger::Middle, LandmarkIdx::MiddleFingerMcp),
            (Finger::Ring, LandmarkIdx::RingFingerMcp),
            (Finger::Pinky, LandmarkIdx::PinkyMcp),
        ];
        for (column, (finger, mcp)) in fingers.into_iter().enumerate() {
            let fx = x + column as f32 * FINGER_SPACING;
            let pip_dy = if self.extended[finger as usize] {
                JOINT_OFFSET
            } else {
                -JOINT_OFFSET
            };
            let tip = point(fx, y);
            let pip = point(fx, y + pip_dy);
            set(finger.tip(), tip);
            set(finger.reference_joint(), pip);
            // The DIP sits between tip and PIP, the MCP below everything.
            set(LandmarkIdx::ALL[finger.tip().index() - 1], point(fx, y + pip_dy / 2.0));
            set(mcp, point(fx, y + 0.15));
        }

        HandFrame::new(lms).expect("synthetic hand pose has non-finite coordinates")
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::distance;

    use super::*;

    #[test]
    fn index_tip_and_gap_are_exact() {
        let hand = HandPose::new()
            .index_tip(point(0.25, 0.75))
            .thumb_gap(0.125)
            .build();
        assert_eq!(hand[LandmarkIdx::IndexFingerTip].xy(), point(0.25, 0.75));
        assert_eq!(
            distance(
                &hand[LandmarkIdx::IndexFingerTip].xy(),
                &hand[LandmarkIdx::ThumbTip].xy()
            ),
            0.125
        );
    }

    #[test]
    #[should_panic]
    fn six_fingers() {
        HandPose::new().fingers(6);
    }
}
