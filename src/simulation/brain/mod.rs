//! Feed-forward neural network driving the cars.
//!
//! The network is a list of [`Level`]s with hard-threshold activations. It is
//! never trained by gradients: new generations are derived from the best
//! brain by [`NeuralNetwork::mutate`].
//!
//! The JSON form is the persistence contract for the "best brain" slot:
//! `{"levels": [{"inputs", "outputs", "weights", "biases"}, ..]}` with bare
//! numeric arrays.

use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::error::SimError;

pub mod level;

pub use level::{Level, random_weight};

/// Layered feed-forward network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralNetwork {
    /// Ordered levels from input to output.
    pub levels: Vec<Level>,
}

impl NeuralNetwork {
    /// Creates a network with random weights for the given layer sizes.
    ///
    /// `shape` lists the width of every layer, inputs first. Level `i` maps
    /// `shape[i]` inputs to `shape[i + 1]` outputs.
    ///
    /// # Panics
    ///
    /// Panics if `shape` has fewer than two layers or a layer of width zero.
    pub fn new<R: Rng>(shape: &[usize], rng: &mut R) -> Self {
        assert!(shape.len() >= 2, "a network needs at least two layers");
        assert!(shape.iter().all(|&n| n > 0), "layer widths must be positive");

        let levels = shape
            .windows(2)
            .map(|pair| Level::new_random(pair[0], pair[1], rng))
            .collect();

        Self { levels }
    }

    /// Layer widths, inputs first.
    pub fn shape(&self) -> Vec<usize> {
        let mut shape = Vec::with_capacity(self.levels.len() + 1);
        if let Some(first) = self.levels.first() {
            shape.push(first.input_size());
        }
        shape.extend(self.levels.iter().map(Level::output_size));
        shape
    }

    /// Number of inputs the first level expects.
    pub fn input_size(&self) -> usize {
        self.levels.first().map_or(0, Level::input_size)
    }

    /// Number of outputs of the last level.
    pub fn output_size(&self) -> usize {
        self.levels.last().map_or(0, Level::output_size)
    }

    /// Runs a forward pass and records each level's inputs and outputs.
    ///
    /// A level's caches are replaced only once its outputs are complete, so
    /// observers never see a half-updated level.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` does not match [`Self::input_size`].
    pub fn feed_forward(&mut self, inputs: &Array1<f64>) -> Array1<f64> {
        let mut signal = inputs.clone();
        for level in &mut self.levels {
            let outputs = level.forward(&signal);
            level.inputs = signal;
            level.outputs = outputs.clone();
            signal = outputs;
        }
        signal
    }

    /// Runs a forward pass without recording anything.
    pub fn predict(&self, inputs: &Array1<f64>) -> Array1<f64> {
        self.levels
            .iter()
            .fold(inputs.clone(), |signal, level| level.forward(&signal))
    }

    /// Moves every parameter towards a fresh random value by `amount`.
    ///
    /// `amount` is in `[0, 1]`: zero leaves the network unchanged, one
    /// replaces every parameter. Per level, biases are drawn before weights.
    pub fn mutate<R: Rng>(&mut self, amount: f64, rng: &mut R) {
        for level in &mut self.levels {
            level.mutate(amount, rng);
        }
    }

    /// Returns a mutated copy, leaving `self` untouched.
    pub fn mutated<R: Rng>(&self, amount: f64, rng: &mut R) -> Self {
        let mut child = self.clone();
        child.mutate(amount, rng);
        child
    }

    /// Fails with [`SimError::ShapeMismatch`] unless the network maps
    /// `inputs` values to `outputs` values.
    pub fn ensure_shape(&self, inputs: usize, outputs: usize) -> Result<(), SimError> {
        if self.input_size() == inputs && self.output_size() == outputs {
            Ok(())
        } else {
            Err(SimError::ShapeMismatch {
                expected: format!("{inputs} inputs and {outputs} outputs"),
                found: self.shape(),
            })
        }
    }

    /// Serializes the network to its persistence JSON.
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Loads a network from its persistence JSON and checks that the levels
    /// chain together.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let network: Self = serde_json::from_str(json)?;
        network.validate()?;
        Ok(network)
    }

    fn validate(&self) -> Result<(), SimError> {
        if self.levels.is_empty() {
            return Err(SimError::MalformedNetwork("no levels".to_string()));
        }
        for (i, level) in self.levels.iter().enumerate() {
            level
                .check_consistency()
                .map_err(|reason| SimError::MalformedNetwork(format!("level {i}: {reason}")))?;
        }
        for (i, pair) in self.levels.windows(2).enumerate() {
            if pair[0].output_size() != pair[1].input_size() {
                return Err(SimError::MalformedNetwork(format!(
                    "level {i} has {} outputs but level {} has {} inputs",
                    pair[0].output_size(),
                    i + 1,
                    pair[1].input_size()
                )));
            }
        }
        Ok(())
    }
}
