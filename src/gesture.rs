//! Per-frame gesture classification: finger counting and the drawing pose.

use crate::{
    geometry::{distance, Point},
    landmark::{Finger, HandFrame, LandmarkIdx},
};

/// The gesture derived from a single video frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    /// Number of extended fingers, in range 0 to 5.
    pub finger_count: u8,
    /// Position of the index finger tip in normalized image coordinates.
    ///
    /// This is [`None`] exactly when no hand was detected.
    pub index_tip: Option<Point>,
    /// Whether the hand is in the pose that records air-drawing strokes.
    pub is_drawing_pose: bool,
}

impl GestureSample {
    /// The sample produced for frames without a hand.
    pub const NEUTRAL: Self = Self {
        finger_count: 0,
        index_tip: None,
        is_drawing_pose: false,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

impl Default for GestureSample {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Returns whether `finger` is extended.
///
/// The thumb counts as extended when its tip is left of its IP joint in image space. This assumes
/// one particular hand in a mirrored camera image and is not handedness-invariant.
///
/// All other fingers count as extended when their tip is above their PIP joint (Y points down).
pub fn is_extended(hand: &HandFrame, finger: Finger) -> bool {
    let tip = hand[finger.tip()];
    let joint = hand[finger.reference_joint()];
    match finger {
        Finger::Thumb => tip.x() < joint.x(),
        _ => tip.y() < joint.y(),
    }
}

/// Counts the extended fingers of `hand`.
pub fn count_fingers(hand: &HandFrame) -> u8 {
    Finger::ALL
        .into_iter()
        .filter(|&finger| is_extended(hand, finger))
        .count() as u8
}

/// Classifies hand landmarks into [`GestureSample`]s.
///
/// Classification is stateless: every frame is judged on its own.
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    drawing_threshold: f32,
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureClassifier {
    pub const DEFAULT_DRAWING_THRESHOLD: f32 = 0.08;

    pub fn new() -> Self {
        Self {
            drawing_threshold: Self::DEFAULT_DRAWING_THRESHOLD,
        }
    }

    /// Sets the index-tip-to-thumb-tip distance above which the hand is in the drawing pose.
    ///
    /// The distance is measured in normalized image coordinates. Note that fingers spread *apart*
    /// (not pinched together) start a stroke.
    ///
    /// By default, [`GestureClassifier::DEFAULT_DRAWING_THRESHOLD`] is used.
    ///
    /// # Panics
    ///
    /// This method panics when `threshold` is negative or NaN.
    pub fn set_drawing_threshold(&mut self, threshold: f32) {
        assert!(threshold >= 0.0, "invalid drawing threshold {threshold}");
        self.drawing_threshold = threshold;
    }

    pub fn drawing_threshold(&self) -> f32 {
        self.drawing_threshold
    }

    /// Classifies the hand detected in one frame.
    ///
    /// If `hand` is [`None`], [`GestureSample::NEUTRAL`] is returned.
    pub fn classify(&self, hand: Option<&HandFrame>) -> GestureSample {
        let Some(hand) = hand else {
            return GestureSample::NEUTRAL;
        };

        let index_tip = hand[LandmarkIdx::IndexFingerTip].xy();
        let thumb_tip = hand[LandmarkIdx::ThumbTip].xy();
        let spread = distance(&index_tip, &thumb_tip);

        GestureSample {
            finger_count: count_fingers(hand),
            index_tip: Some(index_tip),
            is_drawing_pose: spread > self.drawing_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        geometry::point,
        landmark::{Landmark, NUM_LANDMARKS},
        synth::HandPose,
    };

    use super::*;

    #[test]
    fn no_hand_is_neutral() {
        let sample = GestureClassifier::new().classify(None);
        assert_eq!(sample, GestureSample::NEUTRAL);
        assert!(sample.is_neutral());
        assert_eq!(GestureSample::default(), GestureSample::NEUTRAL);
    }

    #[test]
    fn counts_index_and_middle() {
        // Thumb tip right of the IP joint: not extended.
        let mut lms = [Landmark::default(); NUM_LANDMARKS];
        let mut set = |idx: LandmarkIdx, x: f32, y: f32| lms[idx.index()] = Landmark::new([x, y, 0.0]);
        set(LandmarkIdx::ThumbIp, 0.40, 0.60);
        set(LandmarkIdx::ThumbTip, 0.45, 0.55);
        set(LandmarkIdx::IndexFingerPip, 0.50, 0.50);
        set(LandmarkIdx::IndexFingerTip, 0.50, 0.30);
        set(LandmarkIdx::MiddleFingerPip, 0.55, 0.50);
        set(LandmarkIdx::MiddleFingerTip, 0.55, 0.28);
        set(LandmarkIdx::RingFingerPip, 0.60, 0.50);
        set(LandmarkIdx::RingFingerTip, 0.60, 0.58);
        set(LandmarkIdx::PinkyPip, 0.65, 0.52);
        set(LandmarkIdx::PinkyTip, 0.65, 0.60);
        let hand = HandFrame::new(lms).unwrap();

        assert!(!is_extended(&hand, Finger::Thumb));
        assert!(is_extended(&hand, Finger::Index));
        assert!(is_extended(&hand, Finger::Middle));
        assert!(!is_extended(&hand, Finger::Ring));
        assert!(!is_extended(&hand, Finger::Pinky));

        let sample = GestureClassifier::new().classify(Some(&hand));
        assert_eq!(sample.finger_count, 2);
        assert_eq!(sample.index_tip, Some(point(0.50, 0.30)));
        // Index and thumb tips are ~0.27 apart.
        assert!(sample.is_drawing_pose);
    }

    #[test]
    fn thumb_extension_uses_x_axis() {
        let hand = HandPose::new().extend(Finger::Thumb).build();
        assert!(is_extended(&hand, Finger::Thumb));
        assert_eq!(count_fingers(&hand), 1);

        let hand = HandPose::new().build();
        assert!(!is_extended(&hand, Finger::Thumb));
        assert_eq!(count_fingers(&hand), 0);
    }

    #[test]
    fn counts_every_combination() {
        for n in 0..=5 {
            let hand = HandPose::new().fingers(n).build();
            let sample = GestureClassifier::new().classify(Some(&hand));
            assert_eq!(sample.finger_count, n);
            assert!(sample.index_tip.is_some());
        }
    }

    #[test]
    fn drawing_pose_threshold() {
        let classifier = GestureClassifier::new();
        let spread = HandPose::new().thumb_gap(0.12).build();
        let pinched = HandPose::new().thumb_gap(0.03).build();
        assert!(classifier.classify(Some(&spread)).is_drawing_pose);
        assert!(!classifier.classify(Some(&pinched)).is_drawing_pose);

        // Exactly at the threshold is not drawing.
        let mut classifier = GestureClassifier::new();
        classifier.set_drawing_threshold(0.125);
        let at = HandPose::new().thumb_gap(0.125).build();
        assert!(!classifier.classify(Some(&at)).is_drawing_pose);
        assert!(!classifier.classify(Some(&spread)).is_drawing_pose);
    }

    #[test]
    #[should_panic]
    fn rejects_negative_threshold() {
        GestureClassifier::new().set_drawing_threshold(-0.1);
    }
}
