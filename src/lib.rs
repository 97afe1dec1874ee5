//! A handful of particles bouncing around a cube under adjustable gravity,
//! watched through a free-fly camera.
//!
//! The physics is plain per-frame integration: gravity pulls each particle
//! down, and [`Container::collide`] clamps it back inside the cube and
//! reflects the velocity with some damping. Everything else is the window,
//! the wgpu draw calls and the egui sliders that tune the run.

pub mod app;
pub mod camera;
pub mod container;
pub mod light;
pub mod particle;
pub mod render;
pub mod settings;
pub mod simulation;
pub mod timing;
pub mod ui;

pub use camera::Camera;
pub use container::Container;
pub use light::{Light, LightKind};
pub use particle::{Particle, STANDARD_GRAVITY};
pub use settings::Settings;
pub use simulation::{Simulation, SimulationParams};
