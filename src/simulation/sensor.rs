//! Ray-fan sensor turning nearby borders and traffic into brain inputs.
//!
//! The sensor casts a fixed fan of rays from the car and keeps, for each
//! ray, the nearest point where it touches a border segment or an edge of
//! another car's polygon.

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::geometry::{Point, Polygon, Segment, edges, get_intersection, lerp};
use super::params::SensorParams;

/// A sensor ray from the car position to the end of its range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    /// Ray start, the car position.
    pub origin: Point,
    /// Ray end at full length.
    pub tip: Point,
}

/// Nearest hit along one ray, if any.
pub type Reading = Option<Point>;

/// Ray-fan sensor owned by a car.
#[derive(Debug, Clone, PartialEq)]
pub struct Sensor {
    params: SensorParams,
    rays: Vec<Ray>,
    readings: Vec<Reading>,
}

impl Sensor {
    /// Creates a sensor with no rays cast yet.
    ///
    /// # Panics
    ///
    /// Panics if `params.ray_count` is zero.
    pub fn new(params: SensorParams) -> Self {
        assert!(params.ray_count > 0, "a sensor needs at least one ray");
        Self {
            params,
            rays: Vec::new(),
            readings: Vec::new(),
        }
    }

    /// Number of rays, which is also the number of brain inputs.
    pub fn ray_count(&self) -> usize {
        self.params.ray_count
    }

    /// Sensor configuration.
    pub fn params(&self) -> &SensorParams {
        &self.params
    }

    /// Rays cast by the last update.
    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    /// Readings of the last update, one per ray.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Recasts the rays from the given pose and takes new readings.
    pub fn update(
        &mut self,
        origin: Point,
        heading: f64,
        borders: &[Segment],
        obstacles: &[Polygon],
    ) {
        self.rays = cast_rays(&self.params, origin, heading);
        self.readings = self
            .rays
            .iter()
            .map(|ray| nearest_hit(ray, borders, obstacles))
            .collect();
    }

    /// Brain inputs derived from the readings.
    ///
    /// Each value is `1 - offset` of the nearest hit, so `1.0` means touching
    /// and `0.0` means nothing within range.
    pub fn features(&self) -> Array1<f64> {
        self.readings
            .iter()
            .map(|reading| reading.map_or(0.0, |p| 1.0 - p.offset.unwrap_or(0.0)))
            .collect()
    }
}

/// Casts the ray fan for a pose.
///
/// Angles run from `+spread/2` (left) to `-spread/2` (right), relative to
/// the heading. A single ray points straight ahead.
pub fn cast_rays(params: &SensorParams, origin: Point, heading: f64) -> Vec<Ray> {
    let half_spread = params.ray_spread / 2.0;
    (0..params.ray_count)
        .map(|i| {
            let t = if params.ray_count == 1 {
                0.5
            } else {
                i as f64 / (params.ray_count - 1) as f64
            };
            let ray_angle = lerp(half_spread, -half_spread, t) + heading;
            let tip = Point::new(
                origin.x - ray_angle.sin() * params.ray_length,
                origin.y - ray_angle.cos() * params.ray_length,
            );
            Ray {
                origin: Point::new(origin.x, origin.y),
                tip,
            }
        })
        .collect()
}

/// Finds the touch with the smallest offset along `ray`.
///
/// Among equally near touches, whichever was found first is returned.
pub fn nearest_hit(ray: &Ray, borders: &[Segment], obstacles: &[Polygon]) -> Reading {
    let Ray { origin, tip } = *ray;
    let border_touches = borders
        .iter()
        .filter_map(move |border| get_intersection(&origin, &tip, &border.p1, &border.p2));
    let obstacle_touches = obstacles.iter().flat_map(move |poly| {
        edges(poly).filter_map(move |(p1, p2)| get_intersection(&origin, &tip, p1, p2))
    });

    border_touches
        .chain(obstacle_touches)
        .fold(None, |nearest: Reading, touch| match nearest {
            Some(best) if best.offset <= touch.offset => Some(best),
            _ => Some(touch),
        })
}
