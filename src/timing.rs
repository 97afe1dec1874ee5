use std::time::{Duration, Instant};

/// Physics never steps further than this in one frame, so a stalled window
/// does not launch particles through the walls.
pub const MAX_FRAME_TIME: f32 = 0.1;

pub fn clamp_frame_time(frame_time: Duration) -> f32 {
    frame_time.as_secs_f32().min(MAX_FRAME_TIME)
}

/// Counts frames over one-second windows.
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
    fps: u32,
}

impl FpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            fps: 0,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed >= Duration::from_secs(1) {
            self.fps = (self.frames as f64 / elapsed.as_secs_f64()).round() as u32;
            self.frames = 0;
            self.window_start = now;
        }
    }

    /// Frame rate of the last completed window.
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Decides how long to wait before asking for the next frame.
pub struct FramePacer {
    frame_start: Instant,
}

impl FramePacer {
    pub fn new(now: Instant) -> Self {
        Self { frame_start: now }
    }

    /// Marks the start of a frame and returns the time since the previous one.
    pub fn begin_frame(&mut self, now: Instant) -> Duration {
        let frame_time = now.saturating_duration_since(self.frame_start);
        self.frame_start = now;
        frame_time
    }

    pub fn budget(target_fps: u32) -> Duration {
        Duration::from_secs_f64(1.0 / target_fps.max(1) as f64)
    }

    /// Remaining wait at `now` so that frames start `1 / target_fps` apart.
    pub fn delay(&self, target_fps: u32, now: Instant) -> Duration {
        let spent = now.saturating_duration_since(self.frame_start);
        Self::budget(target_fps).saturating_sub(spent)
    }
}
