use cgmath::prelude::*;
use rand::Rng;

use crate::particle::Particle;

/// Axis-aligned cuboid the particles bounce around in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Container {
    pub center: cgmath::Vector3<f32>,
    pub size: cgmath::Vector3<f32>,
    /// Largest radius a particle may take.
    pub cell_size: f32,
    /// Fraction of the velocity kept after hitting a wall.
    pub damping: f32,
}

impl Default for Container {
    fn default() -> Self {
        Self::new(
            cgmath::vec3(0.0, 0.0, 0.0),
            cgmath::vec3(100.0, 100.0, 100.0),
            4.0,
        )
    }
}

impl Container {
    pub const DEFAULT_DAMPING: f32 = 0.8;

    pub fn new(center: cgmath::Vector3<f32>, size: cgmath::Vector3<f32>, cell_size: f32) -> Self {
        Self {
            center,
            size,
            cell_size,
            damping: Self::DEFAULT_DAMPING,
        }
    }

    /// Clamped to `[0, 1]`. Non-finite input keeps the current damping.
    pub fn with_damping(mut self, damping: f32) -> Self {
        if damping.is_finite() {
            self.damping = damping.clamp(0.0, 1.0);
        }
        self
    }

    pub fn min(&self) -> cgmath::Vector3<f32> {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> cgmath::Vector3<f32> {
        self.center + self.size * 0.5
    }

    /// Whether a sphere of `radius` at `point` lies fully inside.
    pub fn contains(&self, point: cgmath::Vector3<f32>, radius: f32) -> bool {
        let (min, max) = (self.min(), self.max());
        (0..3).all(|axis| point[axis] >= min[axis] + radius && point[axis] <= max[axis] - radius)
    }

    /// Pushes the particle back inside and reflects the velocity on every axis it crossed.
    pub fn collide(&self, particle: &mut Particle) {
        let (min, max) = (self.min(), self.max());
        let radius = particle.radius;

        for axis in 0..3 {
            let low = min[axis] + radius;
            let high = max[axis] - radius;

            if low > high {
                // Too big to fit on this axis; park it in the middle.
                particle.position[axis] = self.center[axis];
                particle.velocity[axis] = 0.0;
                continue;
            }

            if particle.position[axis] < low {
                particle.position[axis] = low;
                if particle.velocity[axis] < 0.0 {
                    particle.velocity[axis] *= -self.damping;
                }
            } else if particle.position[axis] > high {
                particle.position[axis] = high;
                if particle.velocity[axis] > 0.0 {
                    particle.velocity[axis] *= -self.damping;
                }
            }
        }
    }

    /// Uniform point inside the container, inset by `radius` from every wall.
    pub fn random_point<R: Rng>(&self, rng: &mut R, radius: f32) -> cgmath::Vector3<f32> {
        let (min, max) = (self.min(), self.max());
        let mut point = self.center;
        for axis in 0..3 {
            let low = min[axis] + radius;
            let high = max[axis] - radius;
            if low < high {
                point[axis] = rng.gen_range(low..=high);
            }
        }
        point
    }

    /// Endpoint pairs of the 12 cube edges.
    pub fn edges(&self) -> [cgmath::Vector3<f32>; 24] {
        let (min, max) = (self.min(), self.max());
        let corner = |i: usize| {
            cgmath::vec3(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        };

        #[rustfmt::skip]
        const EDGES: [(usize, usize); 12] = [
            (0, 1), (2, 3), (4, 5), (6, 7),
            (0, 2), (1, 3), (4, 6), (5, 7),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];

        let mut points = [cgmath::Vector3::zero(); 24];
        for (i, (a, b)) in EDGES.iter().enumerate() {
            points[i * 2] = corner(*a);
            points[i * 2 + 1] = corner(*b);
        }
        points
    }
}
