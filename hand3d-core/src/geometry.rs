/// Geometry primitives for 3D rendering
use nalgebra::{Matrix4, Point3, Vector3};
use std::f32::consts::TAU;

/// Radial subdivisions of the shared cylinder primitive
pub const CYLINDER_SEGMENTS: usize = 16;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Capped cylinder centred on the origin with its axis along +Y
    pub fn cylinder(radius: f32, height: f32, segments: usize) -> Self {
        let segments = segments.max(3);
        let half = height / 2.0;
        let mut mesh = Self::with_capacity(segments * 4);

        for i in 0..segments {
            let a0 = TAU * i as f32 / segments as f32;
            let a1 = TAU * (i + 1) as f32 / segments as f32;
            let (s0, c0) = a0.sin_cos();
            let (s1, c1) = a1.sin_cos();
            let (x0, z0) = (radius * s0, radius * c0);
            let (x1, z1) = (radius * s1, radius * c1);

            // Side wall, outward normals
            mesh.add_triangle(Triangle::new(
                Vertex::new(x0, -half, z0, s0, 0.0, c0),
                Vertex::new(x1, -half, z1, s1, 0.0, c1),
                Vertex::new(x1, half, z1, s1, 0.0, c1),
            ));
            mesh.add_triangle(Triangle::new(
                Vertex::new(x0, -half, z0, s0, 0.0, c0),
                Vertex::new(x1, half, z1, s1, 0.0, c1),
                Vertex::new(x0, half, z0, s0, 0.0, c0),
            ));

            // Top cap
            mesh.add_triangle(Triangle::new(
                Vertex::new(0.0, half, 0.0, 0.0, 1.0, 0.0),
                Vertex::new(x0, half, z0, 0.0, 1.0, 0.0),
                Vertex::new(x1, half, z1, 0.0, 1.0, 0.0),
            ));

            // Bottom cap
            mesh.add_triangle(Triangle::new(
                Vertex::new(0.0, -half, 0.0, 0.0, -1.0, 0.0),
                Vertex::new(x1, -half, z1, 0.0, -1.0, 0.0),
                Vertex::new(x0, -half, z0, 0.0, -1.0, 0.0),
            ));
        }

        mesh
    }

    /// The primitive every hand segment is scaled from: radius 1, height 2
    pub fn unit_cylinder() -> Self {
        Self::cylinder(1.0, 2.0, CYLINDER_SEGMENTS)
    }

    /// Copy of the mesh with every vertex moved by `matrix`.
    ///
    /// Normals go through the inverse-transpose so non-uniform scale keeps
    /// them perpendicular to the surface.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let linear = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .map(|inv| inv.transpose())
            .unwrap_or(linear);

        let triangles = self
            .triangles
            .iter()
            .map(|triangle| {
                let mut vertices = triangle.vertices;
                for vertex in &mut vertices {
                    vertex.position = matrix.transform_point(&vertex.position);
                    let n = normal_matrix * vertex.normal;
                    vertex.normal = if n.norm() > 1e-12 { n.normalize() } else { n };
                }
                Triangle { vertices }
            })
            .collect();

        Self { triangles }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cylinder_triangle_count() {
        let mesh = Mesh::cylinder(1.0, 2.0, 16);
        assert_eq!(mesh.triangles.len(), 64);
    }

    #[test]
    fn test_unit_cylinder_bounds() {
        let mesh = Mesh::unit_cylinder();
        for triangle in &mesh.triangles {
            for v in &triangle.vertices {
                assert!(v.position.y.abs() <= 1.0 + 1e-6);
                assert!((v.position.x.powi(2) + v.position.z.powi(2)).sqrt() <= 1.0 + 1e-5);
            }
        }
    }

    #[test]
    fn test_side_normals_point_outward() {
        let mesh = Mesh::unit_cylinder();
        let side = &mesh.triangles[0];
        let normal = side.calculate_normal();
        let centre = side.vertices[0].position.coords + side.vertices[1].position.coords;
        assert!(normal.dot(&Vector3::new(centre.x, 0.0, centre.z)) > 0.0);
    }

    #[test]
    fn test_transformed_applies_scale() {
        let mesh = Mesh::unit_cylinder();
        let scale = Matrix4::new_nonuniform_scaling(&Vector3::new(0.4, 1.05, 0.8));
        let scaled = mesh.transformed(&scale);
        let top = scaled
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .map(|v| v.position.y)
            .fold(f32::MIN, f32::max);
        assert_relative_eq!(top, 1.05, epsilon = 1e-5);

        for triangle in &scaled.triangles {
            for v in &triangle.vertices {
                assert_relative_eq!(v.normal.norm(), 1.0, epsilon = 1e-5);
            }
        }
    }
}
