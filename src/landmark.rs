//! Hand landmarks as produced by an external hand pose detector.

use std::ops::Index;

use crate::geometry::{point, Point};

/// Number of landmarks describing a single hand.
pub const NUM_LANDMARKS: usize = 21;

/// A hand landmark.
///
/// X and Y are normalized image coordinates in range 0.0 to 1.0, with Y pointing *down*. Z is the
/// depth relative to the wrist, in roughly the same scale as X.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Landmark {
    pos: [f32; 3],
}

impl Landmark {
    #[inline]
    pub fn new(position: [f32; 3]) -> Self {
        Self { pos: position }
    }

    #[inline]
    pub fn position(&self) -> [f32; 3] {
        self.pos
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos[0]
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos[1]
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.pos[2]
    }

    /// Returns the landmark's image-space position, dropping the depth coordinate.
    #[inline]
    pub fn xy(&self) -> Point {
        point(self.pos[0], self.pos[1])
    }

    fn is_finite(&self) -> bool {
        self.pos.iter().all(|c| c.is_finite())
    }
}

/// Names for the hand pose landmarks.
///
/// # Terminology
///
/// - **CMC**: [Carpometacarpal joint], the lowest joint of the thumb, located near the wrist.
/// - **MCP**: [Metacarpophalangeal joint], the lower joint forming the knuckles near the palm of
///   the hand.
/// - **PIP**: Proximal Interphalangeal joint, the joint between the MCP and DIP.
/// - **IP**: Interphalangeal joint of the thumb, which only has one.
/// - **DIP**: Distal Interphalangeal joint, the highest joint of a finger.
/// - **Tip**: This landmark is just placed on the tip of the finger, above the DIP.
///
/// [Carpometacarpal joint]: https://en.wikipedia.org/wiki/Carpometacarpal_joint
/// [Metacarpophalangeal joint]: https://en.wikipedia.org/wiki/Metacarpophalangeal_joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandmarkIdx {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkIdx {
    /// All landmarks, in detector output order.
    pub const ALL: [LandmarkIdx; NUM_LANDMARKS] = {
        use LandmarkIdx::*;
        [
            Wrist,
            ThumbCmc,
            ThumbMcp,
            ThumbIp,
            ThumbTip,
            IndexFingerMcp,
            IndexFingerPip,
            IndexFingerDip,
            IndexFingerTip,
            MiddleFingerMcp,
            MiddleFingerPip,
            MiddleFingerDip,
            MiddleFingerTip,
            RingFingerMcp,
            RingFingerPip,
            RingFingerDip,
            RingFingerTip,
            PinkyMcp,
            PinkyPip,
            PinkyDip,
            PinkyTip,
        ]
    };

    /// Returns the position of this landmark in the detector's output.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// The five fingers of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Returns the landmark placed on the tip of this finger.
    pub fn tip(self) -> LandmarkIdx {
        match self {
            Finger::Thumb => LandmarkIdx::ThumbTip,
            Finger::Index => LandmarkIdx::IndexFingerTip,
            Finger::Middle => LandmarkIdx::MiddleFingerTip,
            Finger::Ring => LandmarkIdx::RingFingerTip,
            Finger::Pinky => LandmarkIdx::PinkyTip,
        }
    }

    /// Returns the joint the tip is compared against to decide whether the finger is extended.
    ///
    /// This is the IP joint for the thumb and the PIP joint for all other fingers.
    pub fn reference_joint(self) -> LandmarkIdx {
        match self {
            Finger::Thumb => LandmarkIdx::ThumbIp,
            Finger::Index => LandmarkIdx::IndexFingerPip,
            Finger::Middle => LandmarkIdx::MiddleFingerPip,
            Finger::Ring => LandmarkIdx::RingFingerPip,
            Finger::Pinky => LandmarkIdx::PinkyPip,
        }
    }
}

/// The landmarks of one detected hand in one video frame.
///
/// A [`HandFrame`] always holds exactly [`NUM_LANDMARKS`] landmarks with finite coordinates. Frames
/// that don't satisfy this are rejected on construction, which makes them indistinguishable from
/// frames without a hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandFrame {
    landmarks: [Landmark; NUM_LANDMARKS],
}

impl HandFrame {
    /// Creates a hand frame from a full set of landmarks.
    ///
    /// Returns [`None`] if any coordinate is NaN or infinite.
    pub fn new(landmarks: [Landmark; NUM_LANDMARKS]) -> Option<Self> {
        if let Some(idx) = landmarks.iter().position(|lm| !lm.is_finite()) {
            log::trace!(
                "rejecting hand frame: non-finite coordinates at {:?}",
                LandmarkIdx::ALL[idx]
            );
            return None;
        }

        Some(Self { landmarks })
    }

    /// Creates a hand frame from a detector's landmark list.
    ///
    /// Returns [`None`] if the list does not contain exactly [`NUM_LANDMARKS`] entries, or if any
    /// coordinate is not finite.
    pub fn from_slice(landmarks: &[Landmark]) -> Option<Self> {
        let Ok(landmarks) = <[Landmark; NUM_LANDMARKS]>::try_from(landmarks) else {
            log::trace!(
                "rejecting hand frame: expected {NUM_LANDMARKS} landmarks, got {}",
                landmarks.len()
            );
            return None;
        };
        Self::new(landmarks)
    }

    /// Creates a hand frame from a detector's list of `[x, y, z]` positions.
    pub fn from_positions(positions: &[[f32; 3]]) -> Option<Self> {
        let landmarks = positions.iter().copied().map(Landmark::new).collect::<Vec<_>>();
        Self::from_slice(&landmarks)
    }

    #[inline]
    pub fn get(&self, idx: LandmarkIdx) -> Landmark {
        self.landmarks[idx.index()]
    }

    /// Returns all landmarks in detector output order.
    #[inline]
    pub fn landmarks(&self) -> &[Landmark; NUM_LANDMARKS] {
        &self.landmarks
    }

    /// Returns an iterator over all landmarks together with their names.
    pub fn iter(&self) -> impl Iterator<Item = (LandmarkIdx, Landmark)> + '_ {
        LandmarkIdx::ALL.into_iter().zip(self.landmarks.iter().copied())
    }
}

impl Index<LandmarkIdx> for HandFrame {
    type Output = Landmark;

    #[inline]
    fn index(&self, idx: LandmarkIdx) -> &Landmark {
        &self.landmarks[idx.index()]
    }
}
