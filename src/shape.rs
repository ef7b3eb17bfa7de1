//! Classification of air-drawn strokes into simple shapes.
//!
//! The classifier works on the raw point sequence of a stroke, in any coordinate system:
//!
//! 1. Strokes with too few points are rejected.
//! 2. The points are normalized into the unit square using their bounding box.
//! 3. Strokes whose start and end points are too far apart are rejected as not closed.
//! 4. A smoothed copy of the stroke is scanned for *corners*, positions where the direction of
//!    travel changes sharply.
//! 5. The *circularity* of the stroke measures how constant its distance to the centroid is.
//! 6. Corner count and circularity decide the shape.
//!
//! Note that the corner count is the number of *positions* along the stroke at which a sharp turn
//! is visible, not the number of distinct vertices. A single vertex typically shows up at several
//! neighboring positions, so the corner ranges in [`ShapeThresholds`] are calibrated against that.

use std::{
    error::Error,
    f32::consts::{FRAC_PI_4, PI},
    fmt,
    ops::RangeInclusive,
    str::FromStr,
};

use crate::geometry::{self, distance, Point};

/// The shapes recognized by [`ShapeClassifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Circle,
    Triangle,
    Square,
    /// The stroke could not be classified as any known shape.
    Unknown,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Circle, Shape::Triangle, Shape::Square, Shape::Unknown];

    /// Returns the lowercase name of the shape.
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Triangle => "triangle",
            Shape::Square => "square",
            Shape::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Shape`] from an unrecognized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseShapeError {
    name: String,
}

impl fmt::Display for ParseShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown shape name '{}'", self.name)
    }
}

impl Error for ParseShapeError {}

impl FromStr for Shape {
    type Err = ParseShapeError;

    /// Parses a shape from its name, as returned by [`Shape::as_str`] (case insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Shape::ALL
            .into_iter()
            .find(|shape| shape.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseShapeError {
                name: name.to_string(),
            })
    }
}

/// Tunable parameters of the [`ShapeClassifier`].
///
/// The defaults are empirically chosen. Distances are in normalized (unit square) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeThresholds {
    /// Strokes with fewer points are always [`Shape::Unknown`].
    pub min_points: usize,
    /// Maximum distance between the first and last point of a closed stroke.
    pub closure_distance: f32,
    /// Radius of the moving average applied before corner detection.
    pub smoothing_radius: usize,
    /// Number of points between the positions used to compute the incoming and outgoing direction
    /// at each candidate corner. Corner detection requires at least twice as many points.
    pub corner_span: usize,
    /// Minimum change of direction (in radians) that counts as a corner.
    pub corner_angle: f32,
    /// Circles need a circularity *above* this value.
    pub circle_min_circularity: f32,
    pub circle_corners: RangeInclusive<usize>,
    /// Triangles need a circularity *below* this value.
    pub triangle_max_circularity: f32,
    pub triangle_corners: RangeInclusive<usize>,
    /// Squares need a circularity *below* this value.
    pub square_max_circularity: f32,
    pub square_corners: RangeInclusive<usize>,
}

impl Default for ShapeThresholds {
    fn default() -> Self {
        Self {
            min_points: 10,
            closure_distance: 0.15,
            smoothing_radius: 5,
            corner_span: 10,
            corner_angle: FRAC_PI_4,
            circle_min_circularity: 0.7,
            circle_corners: 0..=2,
            triangle_max_circularity: 0.6,
            triangle_corners: 2..=4,
            square_max_circularity: 0.7,
            square_corners: 3..=6,
        }
    }
}

/// Measurements taken from a stroke, which [`ShapeClassifier`] bases its decision on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeFeatures {
    /// Whether the stroke ends close to where it started.
    pub closed: bool,
    /// Number of positions along the smoothed stroke with a sharp change in direction.
    pub corners: usize,
    /// `1 - stddev / mean` of the distances to the centroid. 1.0 for a perfect circle, lower
    /// values for polygonal or irregular paths.
    pub circularity: f32,
}

/// Classifies strokes into [`Shape`]s.
#[derive(Debug, Clone, Default)]
pub struct ShapeClassifier {
    thresholds: ShapeThresholds,
}

impl ShapeClassifier {
    pub fn new(thresholds: ShapeThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ShapeThresholds {
        &self.thresholds
    }

    /// Measures the [`StrokeFeatures`] of a point sequence.
    ///
    /// Returns [`None`] if the stroke has fewer than [`ShapeThresholds::min_points`] points.
    pub fn features(&self, points: &[Point]) -> Option<StrokeFeatures> {
        let t = &self.thresholds;
        if points.len() < t.min_points {
            return None;
        }

        let normalized = geometry::normalize(points);
        let first = normalized.first()?;
        let last = normalized.last()?;
        let closed = distance(first, last) < t.closure_distance;

        let smoothed = geometry::smooth(&normalized, t.smoothing_radius);
        let corners = count_corners(&smoothed, t.corner_span, t.corner_angle);

        Some(StrokeFeatures {
            closed,
            corners,
            circularity: circularity(&normalized),
        })
    }

    /// Classifies a point sequence.
    ///
    /// This never fails: anything that doesn't look like a known shape is [`Shape::Unknown`].
    pub fn classify(&self, points: &[Point]) -> Shape {
        let Some(features) = self.features(points) else {
            log::trace!("stroke with {} points is too short", points.len());
            return Shape::Unknown;
        };

        let shape = self.decide(&features);
        log::trace!("{} points, {:?} -> {}", points.len(), features, shape);
        shape
    }

    fn decide(&self, f: &StrokeFeatures) -> Shape {
        let t = &self.thresholds;
        if !f.closed {
            return Shape::Unknown;
        }

        if f.circularity > t.circle_min_circularity && t.circle_corners.contains(&f.corners) {
            Shape::Circle
        } else if t.triangle_corners.contains(&f.corners)
            && f.circularity < t.triangle_max_circularity
        {
            Shape::Triangle
        } else if t.square_corners.contains(&f.corners) && f.circularity < t.square_max_circularity
        {
            Shape::Square
        } else {
            Shape::Unknown
        }
    }
}

/// Classifies a stroke using the default [`ShapeThresholds`].
pub fn detect_shape(points: &[Point]) -> Shape {
    ShapeClassifier::default().classify(points)
}

/// Counts the positions along `points` where the direction of travel turns by more than `angle`.
///
/// At each index `i` in `span..len - span`, the direction from `points[i - span]` to `points[i]`
/// is compared with the direction from `points[i]` to `points[i + span]`. Returns 0 if there are
/// fewer than `2 * span` points.
pub fn count_corners(points: &[Point], span: usize, angle: f32) -> usize {
    if span == 0 || points.len() < 2 * span {
        return 0;
    }

    let heading = |from: &Point, to: &Point| (to.y - from.y).atan2(to.x - from.x);

    (span..points.len() - span)
        .filter(|&i| {
            let incoming = heading(&points[i - span], &points[i]);
            let outgoing = heading(&points[i], &points[i + span]);
            let mut turn = (outgoing - incoming).abs();
            if turn > PI {
                turn = 2.0 * PI - turn;
            }
            turn > angle
        })
        .count()
}

/// Computes how close `points` are to lying on a circle around their centroid.
///
/// Returns `1 - stddev / mean` of the point distances to the centroid. If all points coincide
/// (or `points` is empty), 0.0 is returned.
pub fn circularity(points: &[Point]) -> f32 {
    let Some(center) = geometry::centroid(points) else {
        return 0.0;
    };

    let distances = points
        .iter()
        .map(|p| distance(p, &center))
        .collect::<Vec<_>>();
    let n = distances.len() as f32;
    let mean = distances.iter().sum::<f32>() / n;
    if mean == 0.0 {
        return 0.0;
    }

    let variance = distances.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / n;
    1.0 - variance.sqrt() / mean
}
