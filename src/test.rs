//! Stroke fixtures shared by unit tests.

use std::f32::consts::TAU;

use crate::geometry::{point, Point};

/// Samples `n` points on a circle around the origin, plus a final point closing the stroke.
pub fn circle(n: usize, radius: f32) -> Vec<Point> {
    let mut points = (0..n)
        .map(|i| {
            let angle = TAU * i as f32 / n as f32;
            point(radius * angle.cos(), radius * angle.sin())
        })
        .collect::<Vec<_>>();
    points.push(points[0]);
    points
}

/// Traces the closed polygon through `vertices`, placing `counts[i]` evenly spaced points on the
/// edge starting at `vertices[i]`. The stroke ends exactly on its first point.
pub fn polygon(vertices: &[Point], counts: &[usize]) -> Vec<Point> {
    assert_eq!(vertices.len(), counts.len());

    let mut points = Vec::new();
    for (i, (&from, &count)) in vertices.iter().zip(counts).enumerate() {
        let to = vertices[(i + 1) % vertices.len()];
        points.extend((0..count).map(|j| {
            let t = j as f32 / count as f32;
            point(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
        }));
    }
    points.push(vertices[0]);
    points
}

/// A quickly drawn, narrow triangle: 23 points, 3 corner positions, circularity ~0.5.
pub fn triangle() -> Vec<Point> {
    polygon(
        &[point(0.0, 0.0), point(1.0, 1.0), point(0.8, 1.0)],
        &[6, 8, 8],
    )
}

/// A quickly drawn, skewed quadrilateral: 25 points, 5 corner positions, circularity ~0.46.
pub fn square() -> Vec<Point> {
    polygon(
        &[
            point(0.0, 0.0),
            point(1.0, 1.0),
            point(0.9, 1.0),
            point(0.5, 0.6),
        ],
        &[6; 4],
    )
}
