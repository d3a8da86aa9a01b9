//! The car: kinematics, body polygon, damage and the sense-think-act loop.

use log::debug;
use rand::Rng;

use super::super::brain::NeuralNetwork;
use super::super::error::SimError;
use super::super::geometry::{Point, Polygon, Segment, polys_intersect};
use super::super::params::{CONTROL_OUTPUTS, CarParams, Params};
use super::super::sensor::Sensor;
use super::controls::{ControlType, Controls};

/// A simulated car.
///
/// Cars can:
/// - Accelerate, brake, reverse and steer with simple kinematics
/// - Sense borders and traffic with a ray fan
/// - Let a neural network choose their controls
/// - Crash, after which they stay frozen in place
///
/// Heading zero points up (towards decreasing y); positive headings turn left.
#[derive(Debug, Clone)]
pub struct Car {
    /// Horizontal position of the body centre.
    pub x: f64,
    /// Vertical position of the body centre.
    pub y: f64,
    /// Heading in radians.
    pub angle: f64,
    /// Signed speed; negative while reversing.
    pub speed: f64,
    /// Current control inputs.
    pub controls: Controls,
    params: CarParams,
    control_type: ControlType,
    polygon: Polygon,
    damaged: bool,
    fitness: f64,
    sensor: Option<Sensor>,
    brain: Option<NeuralNetwork>,
}

impl Car {
    /// Creates a car at the given pose.
    ///
    /// `params.car.max_speed` must not be negative.
    /// AI and keyboard cars get a sensor and a fresh random brain shaped
    /// after [`Params::brain_shape`]; dummy traffic gets neither.
    pub fn new<R: Rng>(
        x: f64,
        y: f64,
        angle: f64,
        control_type: ControlType,
        params: &Params,
        rng: &mut R,
    ) -> Self {
        let (sensor, brain) = match control_type {
            ControlType::Dummy => (None, None),
            ControlType::Keys | ControlType::Ai => (
                Some(Sensor::new(params.sensor.clone())),
                Some(NeuralNetwork::new(&params.brain_shape(), rng)),
            ),
        };

        Self::assemble(x, y, angle, control_type, &params.car, sensor, brain)
    }

    /// Creates an AI car driven by an existing brain.
    pub fn with_brain(
        x: f64,
        y: f64,
        angle: f64,
        params: &Params,
        brain: NeuralNetwork,
    ) -> Result<Self, SimError> {
        brain.ensure_shape(params.sensor.ray_count, CONTROL_OUTPUTS)?;

        Ok(Self::assemble(
            x,
            y,
            angle,
            ControlType::Ai,
            &params.car,
            Some(Sensor::new(params.sensor.clone())),
            Some(brain),
        ))
    }

    fn assemble(
        x: f64,
        y: f64,
        angle: f64,
        control_type: ControlType,
        params: &CarParams,
        sensor: Option<Sensor>,
        brain: Option<NeuralNetwork>,
    ) -> Self {
        let mut car = Self {
            x,
            y,
            angle,
            speed: 0.0,
            controls: Controls::new(control_type),
            params: params.clone(),
            control_type,
            polygon: Vec::new(),
            damaged: false,
            fitness: 0.0,
            sensor,
            brain,
        };
        // Valid as an obstacle before the first tick.
        car.polygon = car.create_polygon();
        car
    }

    /// Control mode chosen at creation.
    pub fn control_type(&self) -> ControlType {
        self.control_type
    }

    /// Body polygon as of the last update.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Whether the car has crashed. Once set, it never clears.
    pub fn is_damaged(&self) -> bool {
        self.damaged
    }

    /// Accumulated signed distance travelled while undamaged.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// The ray sensor, absent on dummy traffic.
    pub fn sensor(&self) -> Option<&Sensor> {
        self.sensor.as_ref()
    }

    /// The brain, absent on dummy traffic.
    pub fn brain(&self) -> Option<&NeuralNetwork> {
        self.brain.as_ref()
    }

    /// Replaces the brain after checking that it fits the sensor and the
    /// four controls. On error the current brain is kept.
    pub fn set_brain(&mut self, brain: NeuralNetwork) -> Result<(), SimError> {
        let Some(sensor) = &self.sensor else {
            return Err(SimError::ShapeMismatch {
                expected: "no brain on a car without a sensor".to_string(),
                found: brain.shape(),
            });
        };
        brain.ensure_shape(sensor.ray_count(), CONTROL_OUTPUTS)?;
        self.brain = Some(brain);
        Ok(())
    }

    /// Advances the car by one tick.
    ///
    /// `obstacles` are the other cars' polygons from the previous tick.
    /// An undamaged car moves, scores its speed as fitness and checks for a
    /// crash. Any car with a sensor and a brain then senses and thinks; AI
    /// cars take their next controls from the brain.
    pub fn update(&mut self, borders: &[Segment], obstacles: &[Polygon]) {
        if !self.damaged {
            self.apply_kinematics();
            self.fitness += self.speed;
            self.polygon = self.create_polygon();
            self.damaged = self.assess_damage(borders, obstacles);
            if self.damaged {
                debug!(
                    "car crashed at ({:.1}, {:.1}) with fitness {:.2}",
                    self.x, self.y, self.fitness
                );
            }
        }

        if let (Some(sensor), Some(brain)) = (&mut self.sensor, &mut self.brain) {
            sensor.update(Point::new(self.x, self.y), self.angle, borders, obstacles);
            let outputs = brain.feed_forward(&sensor.features());
            if self.control_type == ControlType::Ai {
                self.controls = Controls::from_outputs(outputs.as_slice().unwrap_or(&[]));
            }
        }
    }

    fn apply_kinematics(&mut self) {
        let p = &self.params;

        if self.controls.forward {
            self.speed += p.acceleration;
        }
        if self.controls.reverse {
            self.speed -= p.acceleration;
        }

        self.speed = self.speed.clamp(-p.max_speed / 2.0, p.max_speed);

        if self.speed > 0.0 {
            self.speed -= p.friction;
        } else if self.speed < 0.0 {
            self.speed += p.friction;
        }
        if self.speed.abs() < p.friction {
            self.speed = 0.0;
        }

        if self.speed.abs() > 0.0 {
            // Steering reverses with the direction of travel.
            let flip = if self.speed > 0.0 { 1.0 } else { -1.0 };
            if self.controls.left {
                self.angle += p.turn_rate * flip;
            }
            if self.controls.right {
                self.angle -= p.turn_rate * flip;
            }
        }

        self.x -= self.angle.sin() * self.speed;
        self.y -= self.angle.cos() * self.speed;
    }

    /// Rectangle of the body, rotated by the heading around the centre.
    fn create_polygon(&self) -> Polygon {
        use std::f64::consts::PI;

        let rad = self.params.width.hypot(self.params.height) / 2.0;
        let alpha = self.params.width.atan2(self.params.height);

        [
            self.angle - alpha,
            self.angle + alpha,
            PI + self.angle - alpha,
            PI + self.angle + alpha,
        ]
        .iter()
        .map(|a| Point::new(self.x - a.sin() * rad, self.y - a.cos() * rad))
        .collect()
    }

    fn assess_damage(&self, borders: &[Segment], obstacles: &[Polygon]) -> bool {
        borders
            .iter()
            .any(|border| polys_intersect(&self.polygon, &border.as_polygon()))
            || obstacles
                .iter()
                .any(|poly| polys_intersect(&self.polygon, poly))
    }
}
