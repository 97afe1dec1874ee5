use encase::ShaderType;

use crate::container::Container;

/// Standard gravity in world units per second squared; the gravity slider is in multiples of it.
pub const STANDARD_GRAVITY: f32 = 9.81;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: cgmath::Vector3<f32>,
    pub velocity: cgmath::Vector3<f32>,
    pub radius: f32,
    pub color: cgmath::Vector3<f32>,
}

/// What the particle shader reads for one sphere.
#[derive(Clone, Copy, ShaderType)]
pub struct GpuParticle {
    pub position: cgmath::Vector3<f32>,
    pub radius: f32,
    pub color: cgmath::Vector3<f32>,
}

impl Particle {
    pub fn new(
        position: cgmath::Vector3<f32>,
        velocity: cgmath::Vector3<f32>,
        radius: f32,
        color: cgmath::Vector3<f32>,
    ) -> Self {
        Self {
            position,
            velocity,
            radius: radius.max(0.0),
            color,
        }
    }

    /// Integrates one step of `ts` seconds under `gravity` (in g) and bounces off the container.
    pub fn update(&mut self, ts: f32, gravity: f32, container: &Container) {
        self.velocity.y -= gravity * STANDARD_GRAVITY * ts;
        self.position += self.velocity * ts;
        container.collide(self);
    }

    pub fn to_gpu(&self) -> GpuParticle {
        GpuParticle {
            position: self.position,
            radius: self.radius,
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_under_gravity() {
        let container = Container::default();
        let mut particle = Particle::new(
            cgmath::vec3(0.0, 0.0, 0.0),
            cgmath::vec3(0.0, 0.0, 0.0),
            1.0,
            cgmath::vec3(1.0, 0.0, 0.0),
        );

        particle.update(0.5, 1.0, &container);

        assert!((particle.velocity.y + STANDARD_GRAVITY * 0.5).abs() < 1e-5);
        assert!((particle.position.y + STANDARD_GRAVITY * 0.25).abs() < 1e-5);
        assert_eq!(particle.position.x, 0.0);
    }

    #[test]
    fn zero_gravity_keeps_velocity() {
        let container = Container::default();
        let mut particle = Particle::new(
            cgmath::vec3(0.0, 0.0, 0.0),
            cgmath::vec3(2.0, 1.0, -3.0),
            1.0,
            cgmath::vec3(1.0, 0.0, 0.0),
        );

        particle.update(1.0, 0.0, &container);

        assert_eq!(particle.velocity, cgmath::vec3(2.0, 1.0, -3.0));
        assert_eq!(particle.position, cgmath::vec3(2.0, 1.0, -3.0));
    }

    #[test]
    fn negative_radius_is_clamped() {
        let particle = Particle::new(
            cgmath::vec3(0.0, 0.0, 0.0),
            cgmath::vec3(0.0, 0.0, 0.0),
            -1.0,
            cgmath::vec3(1.0, 0.0, 0.0),
        );
        assert_eq!(particle.radius, 0.0);
    }
}
