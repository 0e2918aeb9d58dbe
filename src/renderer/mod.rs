//! CPU rendering module
//!
//! Two RGBA surfaces are painted every tick: the star background, and the
//! foreground holding the accretion disk, the lensed background and the horizon.

pub mod background;
pub mod color;
pub mod disk;
pub mod horizon;
pub mod lensing;
pub mod sdf;
pub mod surface;

pub use background::BackgroundRenderer;
pub use color::Rgba;
pub use disk::AccretionDiskRenderer;
pub use horizon::EventHorizon;
pub use lensing::LensingCompositor;
pub use surface::{RenderSurfacePair, Surface};
