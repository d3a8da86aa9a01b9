use serde::{Deserialize, Serialize};

use super::error::SimError;

/// Number of control outputs a driving brain must produce:
/// forward, left, right, reverse.
pub const CONTROL_OUTPUTS: usize = 4;

/// Vehicle body and kinematics parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarParams {
    /// Body width.
    pub width: f64,
    /// Body length along the heading.
    pub height: f64,
    /// Speed gained per tick while accelerating.
    pub acceleration: f64,
    /// Forward speed cap. Reverse is capped at half of it.
    pub max_speed: f64,
    /// Speed lost per tick while coasting.
    pub friction: f64,
    /// Heading change per tick while steering, in radians.
    pub turn_rate: f64,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 50.0,
            acceleration: 0.9,
            max_speed: 1.0,
            friction: 0.05,
            turn_rate: 0.03,
        }
    }
}

/// Ray fan configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorParams {
    /// Number of rays (at least one).
    pub ray_count: usize,
    /// Maximum ray length.
    pub ray_length: f64,
    /// Angular spread of the fan in radians, centred on the heading.
    pub ray_spread: f64,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            ray_count: 5,
            ray_length: 150.0,
            ray_spread: std::f64::consts::FRAC_PI_2,
        }
    }
}

/// Simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Vehicle parameters shared by every car.
    pub car: CarParams,
    /// Sensor parameters for cars that carry a sensor.
    pub sensor: SensorParams,
    /// Hidden layer widths between the sensor inputs and the four controls.
    pub hidden_layers: Vec<usize>,
    /// Blend factor used when deriving a generation from the best brain.
    pub mutation_amount: f64,
    /// Number of AI cars per generation.
    pub population_size: usize,
    /// Tick limit for a single generation.
    pub max_ticks: usize,
    /// Update AI cars on the rayon pool.
    pub parallel: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            car: CarParams::default(),
            sensor: SensorParams::default(),
            hidden_layers: vec![6],
            mutation_amount: 0.1,
            population_size: 100,
            max_ticks: 2000,
            parallel: false,
        }
    }
}

impl Params {
    /// Parses parameters from JSON. Missing fields take their default value.
    ///
    /// The result is checked with [`Params::validate`].
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// Rejects values that cannot produce a working car: no sensor rays, an
    /// empty hidden layer, or a negative (or NaN) speed cap.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.sensor.ray_count == 0 {
            return Err(SimError::InvalidParams(
                "sensor.ray_count must be at least 1".to_string(),
            ));
        }
        if let Some(i) = self.hidden_layers.iter().position(|&width| width == 0) {
            return Err(SimError::InvalidParams(format!(
                "hidden_layers[{i}] has zero width"
            )));
        }
        if self.car.max_speed.is_nan() || self.car.max_speed < 0.0 {
            return Err(SimError::InvalidParams(format!(
                "car.max_speed must not be negative, got {}",
                self.car.max_speed
            )));
        }
        Ok(())
    }

    /// Layer sizes of a driving brain: ray count, hidden layers, controls.
    pub fn brain_shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(self.hidden_layers.len() + 2);
        shape.push(self.sensor.ray_count);
        shape.extend(self.hidden_layers.iter().copied());
        shape.push(CONTROL_OUTPUTS);
        shape
    }
}
