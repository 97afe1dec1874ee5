use eframe::egui;

use crate::simulation::{self, Simulation};

const TEXT_SIZE: f32 = 20.0;
const SLIDER_WIDTH: f32 = 240.0;

/// Per-frame values shown above the sliders.
pub struct OverlayStats {
    pub fps: u32,
    pub camera_position: cgmath::Vector3<f32>,
    pub captured: bool,
}

pub fn fps_text(fps: u32) -> String {
    format!("{fps} FPS")
}

pub fn position_text(position: cgmath::Vector3<f32>) -> String {
    format!(
        "X: {:.2}; Y: {:.2}; Z: {:.2}",
        position.x, position.y, position.z
    )
}

fn white(text: impl Into<String>) -> egui::RichText {
    egui::RichText::new(text)
        .color(egui::Color32::WHITE)
        .size(TEXT_SIZE)
}

/// One labelled slider; true when the user moved it this frame.
fn slider_row(ui: &mut egui::Ui, label: &str, slider: egui::Slider<'_>) -> bool {
    ui.horizontal(|ui| {
        ui.label(white(label));
        ui.add(slider).changed()
    })
    .inner
}

/// Stats text and the four simulation sliders. Slider edits go through the simulation's setters.
pub fn overlay(ui: &mut egui::Ui, simulation: &mut Simulation, stats: &OverlayStats) {
    ui.label(white(fps_text(stats.fps)));
    ui.label(white(position_text(stats.camera_position)));

    ui.spacing_mut().slider_width = SLIDER_WIDTH;
    let params = *simulation.params();

    let mut radius = params.radius;
    let max_radius = simulation.container.cell_size;
    let slider = egui::Slider::new(&mut radius, 0.0..=max_radius).fixed_decimals(2);
    if slider_row(ui, "Particle radius", slider) {
        simulation.set_radius(radius);
    }

    let mut count = params.target_count;
    let range = simulation::MIN_PARTICLES..=simulation::MAX_PARTICLES;
    if slider_row(ui, "Particle count", egui::Slider::new(&mut count, range)) {
        simulation.set_target_count(count);
    }

    let mut gravity = params.gravity;
    let slider = egui::Slider::new(&mut gravity, 0.0..=simulation::MAX_GRAVITY)
        .fixed_decimals(2)
        .suffix(" g");
    if slider_row(ui, "Gravity", slider) {
        simulation.set_gravity(gravity);
    }

    let mut target_fps = params.target_fps;
    let range = simulation::MIN_TARGET_FPS..=simulation::MAX_TARGET_FPS;
    if slider_row(ui, "Target FPS", egui::Slider::new(&mut target_fps, range)) {
        simulation.set_target_fps(target_fps);
    }

    let hint = if stats.captured {
        "Esc to release the mouse"
    } else {
        "Esc to look around"
    };
    ui.label(egui::RichText::new(hint).color(egui::Color32::GRAY));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_text() {
        assert_eq!(fps_text(60), "60 FPS");
        assert_eq!(
            position_text(cgmath::vec3(1.0, -2.345, 0.0)),
            "X: 1.00; Y: -2.35; Z: 0.00"
        );
    }
}
