//! Animation simulation module
//!
//! Everything that changes over time lives here:
//! - Star field kinematics and consumption
//! - Horizon growth state machine
//! - Frame clock (wall-clock gaps to ticks)
//!
//! No rendering or platform dependencies.

pub mod clock;
pub mod growth;
pub mod particles;

pub use clock::FrameClock;
pub use growth::{GrowthController, GrowthState, GrowthStep};
pub use particles::{Particle, ParticleField};
