//! # Autodrive - Self-Driving Car Simulation
//!
//! A simulation of 2D cars that learn to follow a road. Each car senses the
//! road borders and traffic with a fan of rays and is steered by a small
//! feed-forward neural network. Generations improve by keeping the fittest
//! brain and mutating copies of it.
//!
//! ## Features
//!
//! - Segment and polygon intersection tests for sensing and collisions
//! - Ray-fan sensor producing bounded brain inputs
//! - Hard-threshold feed-forward network with random-blend mutation
//! - Kinematic car model with friction, reversing and sticky damage
//! - Population stepping with snapshot semantics and best-car selection
//! - JSON persistence of the best brain
//!
//! ## Core Modules
//!
//! - [`simulation::geometry`] - Points, segments and intersection tests
//! - [`simulation::sensor`] - Ray casting and readings
//! - [`simulation::brain`] - Neural network implementation
//! - [`simulation::car`] - Car behavior and state
//! - [`simulation::population`] - Main simulation step

/// Core simulation logic and data structures.
pub mod simulation {
    /// Neural network implementation for car brains.
    pub mod brain;
    /// Car kinematics, control modes and damage.
    pub mod car;
    /// Error types.
    pub mod error;
    /// Geometric primitives and intersection tests.
    pub mod geometry;
    /// Simulation parameters.
    pub mod params;
    /// Population stepping and selection.
    pub mod population;
    /// Ray-fan sensor.
    pub mod sensor;
}
