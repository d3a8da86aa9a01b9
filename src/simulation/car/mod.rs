//! Car module containing vehicle kinematics, control modes and damage.

#[allow(clippy::module_inception)]
mod car;
mod controls;

pub use car::*;
pub use controls::{ControlType, Controls, Key};
