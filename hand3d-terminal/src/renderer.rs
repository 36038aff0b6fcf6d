/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use hand3d_core::{Camera, Hand, Mesh, SegmentId, Triangle};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Glyph used for floor grid points
const GRID_CHAR: char = '·';

/// Directional light plus a faint ambient term
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    /// Unit vector pointing from the surface toward the light
    pub to_light: Vector3<f32>,
    pub ambient: f32,
    pub intensity: f32,
}

impl Lighting {
    pub fn directional(position: Point3<f32>, target: Point3<f32>, intensity: f32, ambient: f32) -> Self {
        Self {
            to_light: (position - target).normalize(),
            ambient,
            intensity,
        }
    }

    /// Brightness of a surface with this normal, 0.0 to 1.0
    pub fn shade(&self, normal: &Vector3<f32>) -> f32 {
        (self.ambient + self.intensity * normal.dot(&self.to_light).max(0.0)).clamp(0.0, 1.0)
    }
}

impl Default for Lighting {
    fn default() -> Self {
        Self::directional(Point3::new(0.0, 10.0, 0.0), Point3::new(-5.0, 0.0, 0.0), 1.0, 0.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Empty,
    Grid,
    Surface { ch: char, highlight: bool },
}

/// ASCII renderer that converts the posed hand to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    lighting: Lighting,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![Cell::Empty; size],
            lighting: Lighting::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate the buffers for a new surface size
    pub fn resize(&mut self, width: usize, height: usize) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Self {
            lighting: self.lighting,
            ..Self::new(width, height)
        };
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(Cell::Empty);
    }

    /// Floor grid on the y = 0 plane, `half_extent` units each way
    pub fn render_grid(&mut self, camera: &Camera, half_extent: i32) {
        let identity = Matrix4::identity();
        for gx in -half_extent..=half_extent {
            for gz in -half_extent..=half_extent {
                let point = Point3::new(gx as f32, 0.0, gz as f32);
                let Some((x, y, depth)) =
                    camera.project_to_screen(&point, &identity, self.width as u32, self.height as u32)
                else {
                    continue;
                };
                let (x, y) = (x as usize, y as usize);
                if x >= self.width || y >= self.height {
                    continue;
                }
                let idx = y * self.width + x;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = Cell::Grid;
                }
            }
        }
    }

    /// Draw every segment of the hand as a scaled copy of `primitive`
    pub fn render_hand(&mut self, hand: &Hand, primitive: &Mesh, camera: &Camera, highlight: &[SegmentId]) {
        for (id, model) in hand.world_segments() {
            let world = primitive.transformed(&model);
            let lit = highlight.contains(&id);
            for triangle in &world.triangles {
                self.render_triangle(triangle, camera, lit);
            }
        }
    }

    /// Rasterize one triangle already in world space
    fn render_triangle(&mut self, triangle: &Triangle, camera: &Camera, highlight: bool) {
        let identity = Matrix4::identity();

        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(&vertex.position, &identity, self.width as u32, self.height as u32) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        // Smooth-ish shading from the averaged vertex normals
        let normal = triangle
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.normal);
        let normal = if normal.norm() > 1e-6 {
            normal.normalize()
        } else {
            triangle.calculate_normal()
        };
        let brightness = self.lighting.shade(&normal);

        // Map brightness to character, never fully blank
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, Cell::Surface { ch: character, highlight });
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;

                        let idx = y as usize * self.width + x as usize;
                        if depth < self.depth_buffer[idx] {
                            self.depth_buffer[idx] = depth;
                            self.cells[idx] = cell;
                        }
                    }
                }
            }
        }
    }

    /// Queue the frame at screen row `top`, one cursor move per row
    pub fn draw<W: Write>(&self, writer: &mut W, top: u16) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, top + y as u16))?;
            for x in 0..self.width {
                let (c, color) = glyph(self.cells[y * self.width + x]);
                writer.queue(SetForegroundColor(color))?;
                writer.queue(Print(c))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    /// Uncoloured frame, one string per row
    pub fn to_lines(&self) -> Vec<String> {
        self.cells
            .chunks(self.width.max(1))
            .take(self.height)
            .map(|row| row.iter().map(|&cell| glyph(cell).0).collect())
            .collect()
    }

    /// Number of cells covered by the hand
    pub fn covered_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| matches!(cell, Cell::Surface { .. }))
            .count()
    }
}

fn glyph(cell: Cell) -> (char, Color) {
    match cell {
        Cell::Empty => (' ', Color::Reset),
        Cell::Grid => (GRID_CHAR, Color::DarkGrey),
        Cell::Surface { ch, highlight: true } => (ch, Color::Yellow),
        // Color based on character intensity
        Cell::Surface { ch, .. } => {
            let color = match ch {
                '.' | ':' => Color::DarkGrey,
                '-' | '=' => Color::Grey,
                '+' | '*' => Color::White,
                '#' | '%' | '@' => Color::Cyan,
                _ => Color::White,
            };
            (ch, color)
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hand3d_core::{ChannelBank, ChannelId, PoseController};

    fn camera_for(renderer: &AsciiRenderer) -> Camera {
        let mut camera = Camera::default();
        camera.set_viewport(renderer.width() as u32, renderer.height() as u32, 2.0);
        camera
    }

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_lighting_faces_light() {
        let lighting = Lighting::default();
        let up = lighting.shade(&Vector3::new(0.0, 1.0, 0.0));
        let down = lighting.shade(&Vector3::new(0.0, -1.0, 0.0));
        assert!(up > down);
        assert!((down - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_rest_hand_covers_cells() {
        let mut renderer = AsciiRenderer::new(80, 40);
        let camera = camera_for(&renderer);
        renderer.render_hand(&Hand::build(), &Mesh::unit_cylinder(), &camera, &[]);
        assert!(renderer.covered_cells() > 50);
        assert_eq!(renderer.to_lines().len(), 40);
    }

    #[test]
    fn test_pose_changes_frame() {
        let mut hand = Hand::build();
        let mut bank = ChannelBank::new(&hand, PoseController::default());
        let primitive = Mesh::unit_cylinder();

        let mut renderer = AsciiRenderer::new(80, 40);
        let camera = camera_for(&renderer);
        renderer.render_hand(&hand, &primitive, &camera, &[]);
        let rest = renderer.to_lines();

        bank.set(&mut hand, ChannelId::WristBend, 45.0);
        renderer.clear();
        renderer.render_hand(&hand, &primitive, &camera, &[]);
        assert_ne!(renderer.to_lines(), rest);
    }

    #[test]
    fn test_grid_drawn_under_hand() {
        let mut renderer = AsciiRenderer::new(80, 40);
        let camera = camera_for(&renderer);
        renderer.render_grid(&camera, 15);
        assert!(renderer.to_lines().iter().any(|line| line.contains(GRID_CHAR)));
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_resize_reallocates() {
        let mut renderer = AsciiRenderer::new(10, 5);
        renderer.resize(20, 8);
        assert_eq!(renderer.to_lines().len(), 8);
        assert!(renderer.to_lines().iter().all(|line| line.chars().count() == 20));
    }
}
