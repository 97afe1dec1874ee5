use std::time::Instant;

use eframe::egui;
use eframe::egui_wgpu::wgpu;

use crate::camera::{Camera, MovementInput};
use crate::render::{self, GpuFrame, Renderer};
use crate::settings::{Settings, SettingsLoadError};
use crate::simulation::Simulation;
use crate::timing::{FpsCounter, FramePacer, clamp_frame_time};
use crate::ui::{OverlayStats, overlay};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to load settings: {0}")]
    Settings(#[from] SettingsLoadError),
    #[error("failed to open the window: {0}")]
    Window(String),
}

pub struct ParticleBox {
    settings: Settings,
    simulation: Simulation,
    camera: Camera,
    fps: FpsCounter,
    pacer: FramePacer,
    /// Pointer hidden and driving the camera.
    captured: bool,
    renderer_ready: bool,
}

impl ParticleBox {
    pub fn new(cc: &eframe::CreationContext, settings: Settings) -> Self {
        let container = settings.container.build();
        let simulation = Simulation::new(container, settings.simulation.params());
        let camera = Camera::looking_at(
            settings.camera.position.into(),
            settings.camera.target.into(),
            settings.camera.fovy,
        );

        let mut style = (*cc.egui_ctx.style()).clone();
        style
            .text_styles
            .insert(egui::TextStyle::Body, egui::FontId::proportional(20.0));
        style.visuals.override_text_color = Some(egui::Color32::WHITE);
        cc.egui_ctx.set_style(style);

        let renderer_ready = match cc.wgpu_render_state.as_ref() {
            Some(render_state) => match Renderer::new(render_state, &container) {
                Ok(renderer) => {
                    render_state
                        .renderer
                        .write()
                        .paint_callback_resources
                        .insert(renderer);
                    true
                }
                Err(e) => {
                    log::error!("Failed to build the scene renderer: {}", e);
                    false
                }
            },
            None => {
                log::error!("wgpu render state unavailable, the 3D view is disabled");
                false
            }
        };

        let now = Instant::now();
        Self {
            settings,
            simulation,
            camera,
            fps: FpsCounter::new(now),
            pacer: FramePacer::new(now),
            captured: true,
            renderer_ready,
        }
    }

    fn handle_camera_input(&mut self, ctx: &egui::Context, ts: f32) {
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.captured = !self.captured;
            log::info!("Mouse captured: {}", self.captured);
        }

        if !self.captured {
            return;
        }
        ctx.output_mut(|o| o.cursor_icon = egui::CursorIcon::None);

        if ctx.wants_keyboard_input() {
            return;
        }

        let camera_settings = &self.settings.camera;
        let (delta, movement) = ctx.input(|i| {
            let delta = i.pointer.delta();
            let movement = MovementInput {
                forward: i.key_down(egui::Key::W),
                back: i.key_down(egui::Key::S),
                left: i.key_down(egui::Key::A),
                right: i.key_down(egui::Key::D),
                up: i.key_down(egui::Key::Space),
                down: i.key_down(egui::Key::C) || i.modifiers.ctrl,
                sprint: i.modifiers.shift,
            };
            (cgmath::vec2(delta.x, delta.y), movement)
        });

        if !pointer_busy(ctx) {
            self.camera.apply_mouse(delta, camera_settings.sensitivity);
        }
        self.camera.apply_movement(
            &movement,
            camera_settings.move_speed,
            camera_settings.sprint_multiplier,
            ts,
        );
    }

    fn paint_scene(&self, ui: &mut egui::Ui) {
        let (rect, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());

        if !self.renderer_ready {
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "3D view unavailable",
                egui::FontId::proportional(20.0),
                egui::Color32::WHITE,
            );
            return;
        }

        let frame = GpuFrame::new(
            &self.camera,
            rect.width() / rect.height().max(1.0),
            &self.settings.lights,
            self.settings.ambient,
        );
        let (frame, particles) = rayon::join(
            || frame.encode(),
            || render::encode_particles(&self.simulation.particles),
        );
        let (frame, particles) = match (frame, particles) {
            (Ok(frame), Ok(particles)) => (frame, particles),
            (Err(e), _) | (_, Err(e)) => {
                log::error!("Failed to encode scene data: {}", e);
                return;
            }
        };

        let sphere_count = self.simulation.particles.len() as u32;

        ui.painter().add(egui::PaintCallback {
            rect,
            callback: std::sync::Arc::new(
                eframe::egui_wgpu::CallbackFn::new()
                    .prepare(move |device, queue, _encoder, paint_callback_resources| {
                        let renderer: Option<&mut Renderer> = paint_callback_resources.get_mut();
                        match renderer {
                            Some(renderer) => renderer.prepare(&frame, &particles, device, queue),
                            None => Vec::<wgpu::CommandBuffer>::new(),
                        }
                    })
                    .paint(move |_info, render_pass, paint_callback_resources| {
                        let renderer: Option<&Renderer> = paint_callback_resources.get();
                        if let Some(renderer) = renderer {
                            renderer.paint(sphere_count, render_pass);
                        }
                    }),
            ),
        });
    }
}

/// A press or drag that started on a widget belongs to egui, not to mouse-look.
///
/// `wants_pointer_input` is no use here: the scene panel covers the whole window.
fn pointer_busy(ctx: &egui::Context) -> bool {
    ctx.is_using_pointer()
}

impl eframe::App for ParticleBox {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        let ts = clamp_frame_time(self.pacer.begin_frame(now));
        self.fps.tick(now);

        self.handle_camera_input(ctx, ts);
        self.simulation.step(ts);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| self.paint_scene(ui));

        let stats = OverlayStats {
            fps: self.fps.fps(),
            camera_position: self.camera.position,
            captured: self.captured,
        };
        egui::Area::new("overlay")
            .fixed_pos(egui::pos2(12.0, 12.0))
            .show(ctx, |ui| overlay(ui, &mut self.simulation, &stats));

        self.simulation.sync_count(&mut rand::thread_rng());

        let target_fps = self.simulation.params().target_fps;
        ctx.request_repaint_after(self.pacer.delay(target_fps, Instant::now()));
    }
}

pub fn run() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    log::info!("Initializing particle box...");

    let settings = Settings::load()?;
    let title = settings.window.title.clone();

    let options = eframe::NativeOptions {
        initial_window_size: Some(egui::vec2(settings.window.width, settings.window.height)),
        resizable: true,
        renderer: eframe::Renderer::Wgpu,
        wgpu_options: eframe::egui_wgpu::WgpuConfiguration {
            present_mode: wgpu::PresentMode::AutoNoVsync,
            depth_format: Some(wgpu::TextureFormat::Depth32Float),
            ..Default::default()
        },
        vsync: false,
        depth_buffer: 32,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Box::new(ParticleBox::new(cc, settings))),
    )
    .map_err(|e| AppError::Window(e.to_string()))?;

    log::info!("Window closed");
    Ok(())
}
