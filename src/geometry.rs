//! 2D geometry helpers for stroke analysis.

use nalgebra::Point2;

/// A point in 2D space.
///
/// Points may be in normalized detector coordinates or in drawing surface (pixel) coordinates.
/// Nothing in this module depends on the unit.
pub type Point = Point2<f32>;

/// Shorthand for constructing a [`Point`].
#[inline]
pub fn point(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Computes the Euclidean distance between two points.
#[inline]
pub fn distance(a: &Point, b: &Point) -> f32 {
    nalgebra::distance(a, b)
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// Computes the bounding box of a set of points.
    ///
    /// Returns [`None`] if `points` is empty.
    pub fn bounding<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();

        let first = iter.next()?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (first.x, first.x, first.y, first.y);

        for p in iter {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }

        Some(Self {
            min: point(x_min, y_min),
            max: point(x_max, y_max),
        })
    }

    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point {
        self.max
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Returns whether the box has zero width or zero height.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0.0 || self.height() == 0.0
    }

    /// Maps `p` from this box into the unit square.
    ///
    /// The result is meaningless if the box [`is_degenerate`][Self::is_degenerate].
    pub fn to_unit(&self, p: Point) -> Point {
        point(
            (p.x - self.min.x) / self.width(),
            (p.y - self.min.y) / self.height(),
        )
    }
}

/// Normalizes `points` into the unit square `[0,1]×[0,1]` using their bounding box.
///
/// Each axis is scaled independently, so the aspect ratio is not preserved. If the bounding box has
/// zero width or height, the points are returned unchanged.
pub fn normalize(points: &[Point]) -> Vec<Point> {
    match Bounds::bounding(points.iter().copied()) {
        Some(bounds) if !bounds.is_degenerate() => {
            points.iter().map(|&p| bounds.to_unit(p)).collect()
        }
        _ => points.to_vec(),
    }
}

/// Computes the arithmetic mean of `points`.
///
/// Returns [`None`] if `points` is empty.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }

    let sum = points
        .iter()
        .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
    Some(Point::from(sum / points.len() as f32))
}

/// Smooths a point sequence with a centered moving average.
///
/// Each output point is the mean of the input points at most `radius` positions before and after
/// it (`2 * radius + 1` points in total). The window is truncated at both ends of the sequence, so
/// the output has the same length as the input.
pub fn smooth(points: &[Point], radius: usize) -> Vec<Point> {
    (0..points.len())
        .map(|i| {
            let start = i.saturating_sub(radius);
            let end = (i + radius + 1).min(points.len());
            // Non-empty, since it always contains `points[i]`.
            let window = &points[start..end];
            let sum = window
                .iter()
                .fold(nalgebra::Vector2::zeros(), |acc, p| acc + p.coords);
            Point::from(sum / window.len() as f32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn bounding_box() {
        let bounds = Bounds::bounding([point(1.0, 5.0), point(-2.0, 3.0), point(4.0, 4.0)]).unwrap();
        assert_eq!(bounds.min(), point(-2.0, 3.0));
        assert_eq!(bounds.max(), point(4.0, 5.0));
        assert_eq!(bounds.width(), 6.0);
        assert_eq!(bounds.height(), 2.0);
        assert!(!bounds.is_degenerate());

        assert_eq!(Bounds::bounding(Vec::new()), None);
        assert!(Bounds::bounding([point(1.0, 1.0)]).unwrap().is_degenerate());
    }

    #[test]
    fn normalize_maps_into_unit_square() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        for _ in 0..100 {
            let points = (0..rng.usize(2..50))
                .map(|_| point(rng.f32() * 640.0 - 100.0, rng.f32() * 480.0 + 20.0))
                .collect::<Vec<_>>();
            let bounds = Bounds::bounding(points.iter().copied()).unwrap();
            if bounds.is_degenerate() {
                continue;
            }

            let normalized = normalize(&points);
            assert_eq!(normalized.len(), points.len());
            for p in &normalized {
                assert!((0.0..=1.0).contains(&p.x), "{p:?}");
                assert!((0.0..=1.0).contains(&p.y), "{p:?}");
            }

            // Extremal points land exactly on the unit square's edges.
            for (orig, norm) in points.iter().zip(&normalized) {
                if orig.x == bounds.min().x {
                    assert_eq!(norm.x, 0.0);
                }
                if orig.x == bounds.max().x {
                    assert_eq!(norm.x, 1.0);
                }
                if orig.y == bounds.min().y {
                    assert_eq!(norm.y, 0.0);
                }
                if orig.y == bounds.max().y {
                    assert_eq!(norm.y, 1.0);
                }
            }
        }
    }

    #[test]
    fn normalize_degenerate_passes_through() {
        let horizontal = [point(0.0, 2.0), point(5.0, 2.0), point(3.0, 2.0)];
        assert_eq!(normalize(&horizontal), horizontal);

        let vertical = [point(1.0, 0.0), point(1.0, 7.0)];
        assert_eq!(normalize(&vertical), vertical);

        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn smooth_truncates_at_ends() {
        let points = (0..5).map(|i| point(i as f32, 0.0)).collect::<Vec<_>>();
        let smoothed = smooth(&points, 1);
        assert_eq!(smoothed.len(), 5);
        assert_abs_diff_eq!(smoothed[0].x, 0.5);
        assert_abs_diff_eq!(smoothed[1].x, 1.0);
        assert_abs_diff_eq!(smoothed[2].x, 2.0);
        assert_abs_diff_eq!(smoothed[4].x, 3.5);

        // A radius larger than the sequence averages everything.
        for p in smooth(&points, 10) {
            assert_abs_diff_eq!(p.x, 2.0);
        }

        assert_eq!(smooth(&points, 0), points);
    }

    #[test]
    fn centroid_and_distance() {
        assert_eq!(centroid(&[]), None);
        let c = centroid(&[point(0.0, 0.0), point(2.0, 0.0), point(2.0, 2.0), point(0.0, 2.0)])
            .unwrap();
        assert_abs_diff_eq!(c.x, 1.0);
        assert_abs_diff_eq!(c.y, 1.0);

        assert_abs_diff_eq!(distance(&point(0.0, 0.0), &point(3.0, 4.0)), 5.0);
    }
}
