//! Whole-simulation tests
//!
//! Drives `Simulation` for many frames the way the app does: step, then
//! move the population one particle toward the slider count.

use particle_box::{Container, Settings, Simulation, SimulationParams};
use rand::{SeedableRng, rngs::StdRng};

const DT: f32 = 1.0 / 60.0;

fn simulation(target_count: u32, gravity: f32) -> Simulation {
    Simulation::new(
        Container::default(),
        SimulationParams {
            radius: 2.0,
            target_count,
            gravity,
            target_fps: 60,
            spawn_speed: 40.0,
        },
    )
}

fn run_frames(sim: &mut Simulation, rng: &mut StdRng, frames: usize) {
    for _ in 0..frames {
        sim.step(DT);
        sim.sync_count(rng);
    }
}

/// Particles never leave the container, even at full gravity and high spawn speed
#[test]
fn test_particles_stay_inside_container() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut sim = simulation(200, 10.0);

    for _ in 0..600 {
        sim.step(DT);
        sim.sync_count(&mut rng);
        for particle in &sim.particles {
            assert!(
                sim.container.contains(particle.position, particle.radius),
                "Particle escaped the container: {:?}",
                particle.position
            );
        }
    }
}

/// The population reaches the target one particle per frame
#[test]
fn test_count_converges_gradually() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut sim = simulation(100, 1.0);

    run_frames(&mut sim, &mut rng, 50);
    assert_eq!(sim.particles.len(), 50);

    run_frames(&mut sim, &mut rng, 100);
    assert_eq!(sim.particles.len(), 100);

    sim.set_target_count(10);
    run_frames(&mut sim, &mut rng, 30);
    assert_eq!(sim.particles.len(), 70);

    run_frames(&mut sim, &mut rng, 100);
    assert_eq!(sim.particles.len(), 10);
}

/// With damping, particles lose energy and settle on the floor
#[test]
fn test_particles_settle_on_floor() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut sim = simulation(20, 10.0);

    run_frames(&mut sim, &mut rng, 60 * 60);

    let floor = sim.container.min().y + sim.params().radius;
    let resting = sim
        .particles
        .iter()
        .filter(|p| p.position.y - floor < 1.0)
        .count();
    assert!(
        resting * 2 >= sim.particles.len(),
        "Only {} of {} particles near the floor",
        resting,
        sim.particles.len()
    );
}

/// Without gravity walls only ever take speed away
#[test]
fn test_zero_gravity_never_gains_speed() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut sim = simulation(1, 0.0);
    sim.sync_count(&mut rng);
    let initial = sim.particles[0].velocity;

    for _ in 0..600 {
        sim.step(DT);
        let velocity = sim.particles[0].velocity;
        for axis in 0..3 {
            assert!(velocity[axis].abs() <= initial[axis].abs() + 1e-4);
        }
    }
}

/// Default settings build a simulation matching the original defaults
#[test]
fn test_default_settings_build() {
    let settings = Settings::default();
    settings.validate().unwrap();

    let sim = Simulation::new(settings.container.build(), settings.simulation.params());

    assert_eq!(sim.container.min().x, -50.0);
    assert_eq!(sim.container.cell_size, 4.0);
    assert_eq!(sim.params().target_count, 100);
    assert!(sim.particles.is_empty());
}
