use cgmath::prelude::*;

const PITCH_LIMIT: f32 = 89.9;

pub struct Axes {
    pub forward: cgmath::Vector3<f32>,
    pub right: cgmath::Vector3<f32>,
    pub up: cgmath::Vector3<f32>,
}

/// Keys held this frame, already translated from the windowing layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct MovementInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub sprint: bool,
}

/// Free-fly camera. Angles are in degrees, `+Y` is up.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: cgmath::Vector3<f32>,
    pub up: cgmath::Vector3<f32>,
    pub pitch: f32,
    pub yaw: f32,
    pub fovy: f32,
}

impl Camera {
    pub fn new(position: cgmath::Vector3<f32>, fovy: f32) -> Self {
        Self {
            position,
            up: cgmath::vec3(0.0, 1.0, 0.0),
            pitch: 0.0,
            yaw: 0.0,
            fovy,
        }
    }

    pub fn looking_at(
        position: cgmath::Vector3<f32>,
        target: cgmath::Vector3<f32>,
        fovy: f32,
    ) -> Self {
        let mut camera = Self::new(position, fovy);
        let direction = target - position;
        if direction.magnitude2() > f32::EPSILON {
            let direction = direction.normalize();
            camera.pitch = direction.y.clamp(-1.0, 1.0).asin().to_degrees();
            camera.yaw = direction.x.atan2(-direction.z).to_degrees();
            camera.pitch = camera.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        camera
    }

    pub fn axes(&self) -> Axes {
        let yaw_rad = self.yaw.to_radians();
        let pitch_rad = self.pitch.to_radians();

        let forward = cgmath::vec3(
            pitch_rad.cos() * yaw_rad.sin(),
            pitch_rad.sin(),
            -pitch_rad.cos() * yaw_rad.cos(),
        )
        .normalize();

        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        Axes { forward, right, up }
    }

    /// Mouse-look; `delta` is in screen pixels with `+y` pointing down.
    pub fn apply_mouse(&mut self, delta: cgmath::Vector2<f32>, sensitivity: f32) {
        self.yaw = (self.yaw + delta.x * sensitivity) % 360.0;
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn apply_movement(
        &mut self,
        input: &MovementInput,
        speed: f32,
        sprint_multiplier: f32,
        ts: f32,
    ) {
        let multiplier = if input.sprint { sprint_multiplier } else { 1.0 };
        let speed = speed * multiplier * ts;
        let axes = self.axes();

        if input.forward {
            self.position += axes.forward * speed;
        }
        if input.back {
            self.position -= axes.forward * speed;
        }
        if input.left {
            self.position -= axes.right * speed;
        }
        if input.right {
            self.position += axes.right * speed;
        }
        if input.up {
            self.position += self.up * speed;
        }
        if input.down {
            self.position -= self.up * speed;
        }
    }

    pub fn view_matrix(&self) -> cgmath::Matrix4<f32> {
        let axes = self.axes();
        let eye = cgmath::Point3::from_vec(self.position);
        cgmath::Matrix4::look_to_rh(eye, axes.forward, axes.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> cgmath::Matrix4<f32> {
        cgmath::perspective(
            cgmath::Rad::from(cgmath::Deg(self.fovy)),
            aspect.max(f32::EPSILON),
            0.01,
            1000.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: cgmath::Vector3<f32>, b: cgmath::Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-4
    }

    #[test]
    fn default_orientation_looks_down_negative_z() {
        let camera = Camera::new(cgmath::vec3(0.0, 0.0, 0.0), 90.0);
        let axes = camera.axes();
        assert!(close(axes.forward, cgmath::vec3(0.0, 0.0, -1.0)));
        assert!(close(axes.right, cgmath::vec3(1.0, 0.0, 0.0)));
        assert!(close(axes.up, cgmath::vec3(0.0, 1.0, 0.0)));
    }

    #[test]
    fn looking_at_points_forward_at_target() {
        let camera = Camera::looking_at(
            cgmath::vec3(0.0, 0.0, 0.0),
            cgmath::vec3(-1.0, -1.0, -1.0),
            120.0,
        );
        let expected = cgmath::vec3(-1.0, -1.0, -1.0).normalize();
        assert!(close(camera.axes().forward, expected));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(cgmath::vec3(0.0, 0.0, 0.0), 90.0);
        camera.apply_mouse(cgmath::vec2(0.0, -100_000.0), 0.5);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.apply_mouse(cgmath::vec2(0.0, 100_000.0), 0.5);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn mouse_right_turns_right() {
        let mut camera = Camera::new(cgmath::vec3(0.0, 0.0, 0.0), 90.0);
        camera.apply_mouse(cgmath::vec2(10.0, 0.0), 1.0);
        assert!(camera.axes().forward.x > 0.0);
    }

    #[test]
    fn sprint_doubles_distance() {
        let input = MovementInput {
            forward: true,
            ..Default::default()
        };
        let mut walk = Camera::new(cgmath::vec3(0.0, 0.0, 0.0), 90.0);
        walk.apply_movement(&input, 10.0, 2.0, 1.0);

        let mut run = Camera::new(cgmath::vec3(0.0, 0.0, 0.0), 90.0);
        let sprint = MovementInput {
            sprint: true,
            ..input
        };
        run.apply_movement(&sprint, 10.0, 2.0, 1.0);

        assert!(close(walk.position, cgmath::vec3(0.0, 0.0, -10.0)));
        assert!(close(run.position, cgmath::vec3(0.0, 0.0, -20.0)));
    }

    #[test]
    fn vertical_movement_ignores_pitch() {
        let mut camera = Camera::new(cgmath::vec3(0.0, 0.0, 0.0), 90.0);
        camera.pitch = 45.0;
        let input = MovementInput {
            up: true,
            ..Default::default()
        };
        camera.apply_movement(&input, 4.0, 2.0, 0.5);
        assert!(close(camera.position, cgmath::vec3(0.0, 2.0, 0.0)));
    }
}
