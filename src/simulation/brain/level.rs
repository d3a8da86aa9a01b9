//! A single weight/bias level of the feed-forward network.

use ndarray::{Array1, Array2};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Draws a fresh parameter value, uniform in `[-1, 1]`.
pub fn random_weight<R: Rng>(rng: &mut R) -> f64 {
    rng.random_range(-1.0..=1.0)
}

/// Moves `value` towards `target` by `amount`.
///
/// Same blend as `lerp(value, target, amount)`, written as
/// `value·(1 - amount) + target·amount` so that both ends are exact:
/// `amount == 0` returns `value` and `amount == 1` returns `target` bit for
/// bit. In between the two forms agree to within a few ulps.
#[inline]
fn blend(value: f64, target: f64, amount: f64) -> f64 {
    value * (1.0 - amount) + target * amount
}

/// One level of the network, mapping `n` inputs to `m` outputs.
///
/// Serializes as plain arrays: `weights` is `n` rows of `m` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// Inputs seen by the last forward pass.
    #[serde(with = "plain::vector")]
    pub inputs: Array1<f64>,
    /// Outputs produced by the last forward pass.
    #[serde(with = "plain::vector")]
    pub outputs: Array1<f64>,
    /// Weight matrix (`input_size` × `output_size`).
    #[serde(with = "plain::matrix")]
    pub weights: Array2<f64>,
    /// Per-output activation thresholds.
    #[serde(with = "plain::vector")]
    pub biases: Array1<f64>,
}

impl Level {
    /// Creates a level with weights and biases drawn from `rng`.
    pub fn new_random<R: Rng>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        let weights = Array2::from_shape_simple_fn((input_size, output_size), || random_weight(rng));
        let biases = Array1::from_shape_simple_fn(output_size, || random_weight(rng));

        Self {
            inputs: Array1::zeros(input_size),
            outputs: Array1::zeros(output_size),
            weights,
            biases,
        }
    }

    /// Number of inputs.
    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    /// Number of outputs.
    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Computes the level's outputs without touching its caches.
    ///
    /// Each output fires (`1.0`) when the weighted input sum exceeds its
    /// bias, otherwise it stays at `0.0`.
    #[inline]
    pub fn forward(&self, inputs: &Array1<f64>) -> Array1<f64> {
        let sums = inputs.dot(&self.weights);
        sums.iter()
            .zip(self.biases.iter())
            .map(|(&sum, &bias)| if sum > bias { 1.0 } else { 0.0 })
            .collect()
    }

    /// Blends every bias, then every weight, towards a fresh random value.
    pub fn mutate<R: Rng>(&mut self, amount: f64, rng: &mut R) {
        self.biases
            .mapv_inplace(|b| blend(b, random_weight(rng), amount));
        self.weights
            .mapv_inplace(|w| blend(w, random_weight(rng), amount));
    }

    /// Checks that the stored arrays agree with each other.
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        let (rows, cols) = self.weights.dim();
        if self.inputs.len() != rows {
            return Err(format!(
                "{} inputs but {} weight rows",
                self.inputs.len(),
                rows
            ));
        }
        if self.biases.len() != cols || self.outputs.len() != cols {
            return Err(format!(
                "{} biases and {} outputs but {} weight columns",
                self.biases.len(),
                self.outputs.len(),
                cols
            ));
        }
        Ok(())
    }
}

/// Serde adapters writing ndarray values as bare JSON arrays.
mod plain {
    pub mod vector {
        use ndarray::Array1;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(v: &Array1<f64>, s: S) -> Result<S::Ok, S::Error> {
            s.collect_seq(v.iter())
        }

        // Caches that were never filled are stored as nulls.
        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Array1<f64>, D::Error> {
            let values = Vec::<Option<f64>>::deserialize(d)?;
            Ok(values.into_iter().map(|v| v.unwrap_or(0.0)).collect())
        }
    }

    pub mod matrix {
        use ndarray::Array2;
        use serde::de::Error;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(m: &Array2<f64>, s: S) -> Result<S::Ok, S::Error> {
            s.collect_seq(m.rows().into_iter().map(|row| row.to_vec()))
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Array2<f64>, D::Error> {
            let rows = Vec::<Vec<f64>>::deserialize(d)?;
            let cols = rows.first().map_or(0, Vec::len);
            if rows.iter().any(|row| row.len() != cols) {
                return Err(D::Error::custom("weight rows have different lengths"));
            }
            let n_rows = rows.len();
            let flat: Vec<f64> = rows.into_iter().flatten().collect();
            Array2::from_shape_vec((n_rows, cols), flat).map_err(D::Error::custom)
        }
    }
}
