use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::domain::PlatePolygon;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("polygon needs at least 3 vertices, got {vertices}")]
    InvalidGeometry { vertices: usize },
}

/// Planar area of a simple polygon via the Shoelace formula.
///
/// The vertex sequence is treated as cyclic (the last vertex connects back
/// to the first), so the ring does not need an explicit closing vertex.
/// The signed cross terms are summed and the absolute value halved, which
/// makes the result independent of winding order. Self-intersecting
/// polygons produce a meaningless value and are out of scope.
///
/// # Arguments
/// * `points` - Ordered (x, y) vertices, at least 3
///
/// # Returns
/// * Non-negative area in squared dataset units
pub fn polygon_area(points: &[(f64, f64)]) -> Result<f64, GeometryError> {
    let n = points.len();
    if n < 3 {
        return Err(GeometryError::InvalidGeometry { vertices: n });
    }

    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].0 * points[j].1;
        sum -= points[j].0 * points[i].1;
    }

    Ok(sum.abs() / 2.0)
}

/// Computes per-plate areas with a configurable synthetic latency.
///
/// The latency simulates non-trivial per-unit cost so sequential vs parallel
/// timings stay meaningful when the raw computation is near-instant. It is a
/// load-simulation knob, not part of the area contract; set it to zero to
/// disable (tests do).
#[derive(Debug, Clone)]
pub struct AreaEngine {
    latency: Duration,
    per_unit_timing: bool,
}

impl AreaEngine {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(200);

    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            per_unit_timing: false,
        }
    }

    /// Print an elapsed-time diagnostic to stderr after each unit
    pub fn with_per_unit_timing(mut self, enabled: bool) -> Self {
        self.per_unit_timing = enabled;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Compute the area of one plate, applying the synthetic latency
    pub fn area_of(&self, index: usize, plate: &PlatePolygon) -> Result<f64, GeometryError> {
        let start = Instant::now();

        let area = polygon_area(&plate.points)?;

        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }

        if self.per_unit_timing {
            eprintln!(
                "  unit {} ({}) finished in {:.4}s",
                index,
                plate.name,
                start.elapsed().as_secs_f64()
            );
        }

        Ok(area)
    }
}

impl Default for AreaEngine {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_square() {
        let square = vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        assert_eq!(polygon_area(&square).unwrap(), 1.0);
    }

    #[test]
    fn test_triangle() {
        let triangle = vec![(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)];
        assert_eq!(polygon_area(&triangle).unwrap(), 6.0);
    }

    #[test]
    fn test_winding_order_invariance() {
        let ccw = vec![(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)];
        let cw: Vec<(f64, f64)> = ccw.iter().rev().copied().collect();

        assert_eq!(polygon_area(&ccw).unwrap(), polygon_area(&cw).unwrap());
    }

    #[test]
    fn test_explicit_closing_vertex_is_harmless() {
        let open = vec![(0.0, 0.0), (4.0, 0.0), (0.0, 3.0)];
        let closed = vec![(0.0, 0.0), (4.0, 0.0), (0.0, 3.0), (0.0, 0.0)];

        assert_eq!(
            polygon_area(&open).unwrap(),
            polygon_area(&closed).unwrap()
        );
    }

    #[test]
    fn test_degenerate_input_rejected() {
        let segment = vec![(0.0, 0.0), (1.0, 1.0)];
        assert_eq!(
            polygon_area(&segment),
            Err(GeometryError::InvalidGeometry { vertices: 2 })
        );
        assert_eq!(
            polygon_area(&[]),
            Err(GeometryError::InvalidGeometry { vertices: 0 })
        );
    }

    #[test]
    fn test_idempotent() {
        let pentagon = vec![(1.0, 0.0), (3.0, 1.0), (2.5, 3.0), (0.5, 3.5), (-0.5, 1.5)];
        assert_eq!(
            polygon_area(&pentagon).unwrap(),
            polygon_area(&pentagon).unwrap()
        );
    }

    #[test]
    fn test_matches_geo_crate() {
        use geo::{Area, LineString, Polygon};

        let points = vec![
            (-122.42, 37.77),
            (-122.38, 37.75),
            (-122.35, 37.79),
            (-122.39, 37.82),
            (-122.44, 37.80),
        ];

        let ours = polygon_area(&points).unwrap();
        let reference = Polygon::new(LineString::from(points), vec![]).unsigned_area();

        assert!((ours - reference).abs() < 1e-12);
    }

    #[test]
    fn test_engine_skips_latency_when_zero() {
        let engine = AreaEngine::new(Duration::ZERO);
        let plate = PlatePolygon::new("square", vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);

        let start = Instant::now();
        assert_eq!(engine.area_of(0, &plate).unwrap(), 4.0);
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_engine_propagates_invalid_geometry() {
        let engine = AreaEngine::new(Duration::ZERO);
        let plate = PlatePolygon::new("broken", vec![(0.0, 0.0)]);

        assert_eq!(
            engine.area_of(0, &plate),
            Err(GeometryError::InvalidGeometry { vertices: 1 })
        );
    }
}
