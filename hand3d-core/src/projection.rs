/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

use crate::transform::Transform;

/// Half extent of the orthographic view volume
pub const ORTHO_SIZE: f32 = 10.0;
const MIN_ORTHO_SIZE: f32 = 2.0;
const MAX_ORTHO_SIZE: f32 = 50.0;
const MAX_PITCH: f32 = 1.5;
/// Eye distance limits for perspective zoom
const MIN_DISTANCE: f32 = 2.0;
const MAX_DISTANCE: f32 = 80.0;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub size: f32,
    pub mode: ProjectionMode,
}

impl Camera {
    /// Parallel-projection camera looking at the hand from the front and above
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 10.0, 20.0),
            target: Point3::new(0.0, 5.0, 0.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: aspect_of(width as f32, height as f32),
            near: 0.1,
            far: 100.0,
            size: ORTHO_SIZE,
            mode: ProjectionMode::Orthographic,
        }
    }

    /// Re-derive the aspect ratio after the drawing surface changed size.
    ///
    /// `cell_aspect` is the height/width ratio of one surface cell (1.0 for
    /// square pixels, about 2.0 for terminal character cells).
    pub fn set_viewport(&mut self, width: u32, height: u32, cell_aspect: f32) {
        self.aspect = aspect_of(width as f32, height as f32 * cell_aspect);
    }

    /// Restore the initial eye, target and zoom, keeping the aspect ratio
    /// and projection mode
    pub fn reset(&mut self) {
        let (aspect, mode) = (self.aspect, self.mode);
        *self = Self {
            aspect,
            mode,
            ..Self::default()
        };
    }

    /// Switch between parallel and perspective projection
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
        };
    }

    /// Orbit the eye around the target (radians)
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius < 1e-6 {
            return;
        }

        let yaw = offset.x.atan2(offset.z) + d_yaw;
        let pitch = ((offset.y / radius).clamp(-1.0, 1.0).asin() + d_pitch)
            .clamp(-MAX_PITCH, MAX_PITCH);

        let (sy, cy) = yaw.sin_cos();
        let (sp, cp) = pitch.sin_cos();
        self.position = self.target + Vector3::new(radius * cp * sy, radius * sp, radius * cp * cy);
    }

    /// Scale the view; factors above 1 zoom out
    pub fn zoom(&mut self, factor: f32) {
        match self.mode {
            ProjectionMode::Orthographic => {
                self.size = (self.size * factor).clamp(MIN_ORTHO_SIZE, MAX_ORTHO_SIZE);
            }
            ProjectionMode::Perspective => {
                let offset = self.position - self.target;
                let distance = (offset.norm() * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
                if let Some(direction) = offset.try_normalize(1e-6) {
                    self.position = self.target + direction * distance;
                }
            }
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                // Vertical bounds stay fixed, horizontal follow the aspect ratio
                let half_height = self.size;
                let half_width = self.size * self.aspect;
                Matrix4::new_orthographic(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Project a 3D point to 2D screen space
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = Transform::mvp_matrix(model_matrix, &self.view_matrix(), &self.projection_matrix());
        let ndc = mvp.transform_point(point);

        if !ndc.x.is_finite() || !ndc.y.is_finite() || !ndc.z.is_finite() {
            return None;
        }

        // Clip test
        if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 || ndc.z < -1.0 || ndc.z > 1.0 {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

fn aspect_of(width: f32, height: f32) -> f32 {
    if height > 0.0 && width > 0.0 {
        width / height
    } else {
        1.0
    }
}
