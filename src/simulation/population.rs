//! Population of cars sharing one road.
//!
//! The population owns the AI cars of a generation plus dummy traffic and
//! advances them together. Each step:
//! - Snapshots the traffic polygons from the previous tick
//! - Updates traffic against the road borders only
//! - Updates every AI car against the borders and the snapshot, optionally
//!   in parallel using rayon
//! - Leaves the fittest car available through [`Population::best`]
//!
//! Cars of the same generation never collide with each other.

use log::warn;
use rand::Rng;
use rayon::prelude::*;

use super::brain::NeuralNetwork;
use super::car::{Car, ControlType};
use super::error::SimError;
use super::geometry::{Point, Polygon, Segment, heading_from_direction};
use super::params::{CONTROL_OUTPUTS, Params};
use super::sensor::Sensor;

/// Spawn point used when the world has no start marking.
pub const DEFAULT_START: Point = Point {
    x: 100.0,
    y: 100.0,
    id: None,
    offset: None,
};

/// Road direction used when the world has no start marking.
pub const DEFAULT_DIRECTION: Point = Point {
    x: 0.0,
    y: -1.0,
    id: None,
    offset: None,
};

/// Start point and heading for worlds without a start marking.
pub fn default_start() -> (Point, f64) {
    (DEFAULT_START, heading_from_direction(&DEFAULT_DIRECTION))
}

/// The cars of one generation, the traffic they drive through, and the
/// static road borders.
#[derive(Debug, Clone)]
pub struct Population {
    /// Controllable cars (AI or keyboard).
    pub cars: Vec<Car>,
    /// Non-player traffic.
    pub traffic: Vec<Car>,
    borders: Vec<Segment>,
    parallel: bool,
    tick: u64,
}

impl Population {
    /// Creates a population from existing cars.
    pub fn new(cars: Vec<Car>, traffic: Vec<Car>, borders: Vec<Segment>) -> Self {
        Self {
            cars,
            traffic,
            borders,
            parallel: false,
            tick: 0,
        }
    }

    /// Spawns `count` AI cars with fresh brains on a start point.
    ///
    /// Worlds with a start marking derive `heading` from its direction with
    /// [`heading_from_direction`]; see [`default_start`] otherwise.
    pub fn spawn<R: Rng>(
        count: usize,
        start: Point,
        heading: f64,
        borders: Vec<Segment>,
        params: &Params,
        rng: &mut R,
    ) -> Self {
        let cars = (0..count)
            .map(|_| Car::new(start.x, start.y, heading, ControlType::Ai, params, rng))
            .collect();

        let mut population = Self::new(cars, Vec::new(), borders);
        population.parallel = params.parallel;
        population
    }

    /// Enables or disables parallel car updates.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.parallel = parallel;
    }

    /// Road borders the cars drive between.
    pub fn borders(&self) -> &[Segment] {
        &self.borders
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Gives every car a copy of `best`, mutating all copies but the first.
    ///
    /// The first car gets an exact copy. If `best` does not fit every car's
    /// sensor, no car is changed.
    pub fn seed_brains<R: Rng>(
        &mut self,
        best: &NeuralNetwork,
        amount: f64,
        rng: &mut R,
    ) -> Result<(), SimError> {
        for car in &self.cars {
            let ray_count = car.sensor().map_or(0, Sensor::ray_count);
            if let Err(e) = best.ensure_shape(ray_count, CONTROL_OUTPUTS) {
                warn!("discarding stored brain: {e}");
                return Err(e);
            }
        }

        for (i, car) in self.cars.iter_mut().enumerate() {
            let brain = if i == 0 {
                best.clone()
            } else {
                best.mutated(amount, rng)
            };
            car.set_brain(brain)?;
        }
        Ok(())
    }

    /// Advances every car by one tick.
    ///
    /// All collision and sensor queries see traffic where it was at the end
    /// of the previous tick, so update order never changes the outcome.
    pub fn step(&mut self) {
        let snapshot: Vec<Polygon> = self.traffic.iter().map(|c| c.polygon().clone()).collect();
        let borders = &self.borders;

        for car in &mut self.traffic {
            car.update(borders, &[]);
        }

        if self.parallel {
            self.cars
                .par_iter_mut()
                .for_each(|car| car.update(borders, &snapshot));
        } else {
            for car in &mut self.cars {
                car.update(borders, &snapshot);
            }
        }

        self.tick += 1;
    }

    /// Index of the fittest car; the first one wins ties.
    pub fn best_index(&self) -> Option<usize> {
        self.cars
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, car)| match best {
                Some((_, fitness)) if fitness >= car.fitness() => best,
                _ => Some((i, car.fitness())),
            })
            .map(|(i, _)| i)
    }

    /// The fittest car.
    pub fn best(&self) -> Option<&Car> {
        self.best_index().map(|i| &self.cars[i])
    }

    /// The best car's brain as persistence JSON, if it has one.
    pub fn best_brain_json(&self) -> Result<Option<String>, SimError> {
        self.best()
            .and_then(Car::brain)
            .map(NeuralNetwork::to_json)
            .transpose()
    }

    /// Whether every controllable car has crashed.
    pub fn all_damaged(&self) -> bool {
        self.cars.iter().all(Car::is_damaged)
    }
}
