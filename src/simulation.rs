use rand::Rng;
use rayon::prelude::*;

use crate::container::Container;
use crate::particle::Particle;

pub const MIN_PARTICLES: u32 = 1;
pub const MAX_PARTICLES: u32 = 200;
pub const MAX_GRAVITY: f32 = 10.0;
pub const MIN_TARGET_FPS: u32 = 10;
pub const MAX_TARGET_FPS: u32 = 480;

const PALETTE: [[f32; 3]; 5] = [
    [1.0, 0.0, 0.0], // red
    [0.0, 1.0, 0.0], // green
    [0.0, 0.0, 1.0], // blue
    [1.0, 1.0, 0.0], // yellow
    [1.0, 0.0, 1.0], // purple
];

/// The four values the sliders edit, plus how fast new particles are launched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    pub radius: f32,
    pub target_count: u32,
    pub gravity: f32,
    pub target_fps: u32,
    pub spawn_speed: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            target_count: 100,
            gravity: 1.0,
            target_fps: 60,
            spawn_speed: 20.0,
        }
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

pub struct Simulation {
    pub container: Container,
    pub particles: Vec<Particle>,
    params: SimulationParams,
}

impl Simulation {
    /// Starts empty; [`Simulation::sync_count`] fills it one particle per call.
    ///
    /// Non-finite values in `params` are replaced by the defaults.
    pub fn new(container: Container, params: SimulationParams) -> Self {
        let defaults = SimulationParams::default();
        let mut simulation = Self {
            container,
            particles: Vec::with_capacity(MAX_PARTICLES as usize),
            params: defaults,
        };
        simulation.set_radius(finite_or(params.radius, defaults.radius));
        simulation.set_target_count(params.target_count);
        simulation.set_gravity(params.gravity);
        simulation.set_target_fps(params.target_fps);
        simulation.params.spawn_speed =
            finite_or(params.spawn_speed, defaults.spawn_speed).max(0.0);
        simulation
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn step(&mut self, ts: f32) {
        let gravity = self.params.gravity;
        let container = self.container;
        self.particles
            .par_iter_mut()
            .for_each(|particle| particle.update(ts, gravity, &container));
    }

    /// Every particle shares one radius, capped at the container's cell size.
    /// Non-finite input is ignored.
    pub fn set_radius(&mut self, radius: f32) {
        if !radius.is_finite() {
            return;
        }
        // `max` drops a NaN cell size, so a broken container caps the radius at zero.
        let radius = radius.max(0.0).min(self.container.cell_size.max(0.0));
        self.params.radius = radius;
        for particle in &mut self.particles {
            particle.radius = radius;
        }
    }

    pub fn set_target_count(&mut self, count: u32) {
        self.params.target_count = count.clamp(MIN_PARTICLES, MAX_PARTICLES);
    }

    /// Non-finite input is ignored.
    pub fn set_gravity(&mut self, gravity: f32) {
        if gravity.is_finite() {
            self.params.gravity = gravity.clamp(0.0, MAX_GRAVITY);
        }
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.params.target_fps = fps.clamp(MIN_TARGET_FPS, MAX_TARGET_FPS);
    }

    /// Moves the population one particle toward the target count.
    /// Drops the oldest particle when there are too many.
    pub fn sync_count<R: Rng>(&mut self, rng: &mut R) {
        let target = self.params.target_count as usize;
        if self.particles.len() > target {
            self.particles.remove(0);
        } else if self.particles.len() < target {
            let particle = self.spawn(rng);
            self.particles.push(particle);
        }
    }

    fn spawn<R: Rng>(&self, rng: &mut R) -> Particle {
        let radius = self.params.radius;
        let speed = self.params.spawn_speed;
        let position = self.container.random_point(rng, radius);
        let velocity = if speed > 0.0 {
            cgmath::vec3(
                rng.gen_range(-speed..=speed),
                rng.gen_range(-speed..=speed),
                rng.gen_range(-speed..=speed),
            )
        } else {
            cgmath::vec3(0.0, 0.0, 0.0)
        };
        let color = PALETTE[rng.gen_range(0..PALETTE.len())];
        Particle::new(position, velocity, radius, color.into())
    }
}
