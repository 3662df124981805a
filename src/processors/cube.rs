//! Cube geometry for orientation rendering.
//!
//! The cube is centered at the origin with edge length 2 (vertices at ±1).

use nalgebra::{Point3, UnitQuaternion};

/// Half the edge length.
pub const CUBE_HALF_EXTENT: f64 = 1.0;

const R: f64 = CUBE_HALF_EXTENT;

/// Vertex order: top face counter-clockwise from (+,+), then bottom face.
pub const CUBE_VERTICES: [[f64; 3]; 8] = [
    [R, R, R],
    [-R, R, R],
    [-R, -R, R],
    [R, -R, R],
    [R, R, -R],
    [-R, R, -R],
    [-R, -R, -R],
    [R, -R, -R],
];

/// Quadrilateral faces as indices into [`CUBE_VERTICES`].
pub const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [0, 3, 7, 4],
    [1, 2, 6, 5],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
];

/// One face as four corner points, ready for a polygon element.
pub type Face = [(f64, f64, f64); 4];

/// Cube vertices rotated by `orientation`.
pub fn rotated_vertices(orientation: &UnitQuaternion<f64>) -> [Point3<f64>; 8] {
    CUBE_VERTICES.map(|[x, y, z]| orientation * Point3::new(x, y, z))
}

/// Faces of the rotated cube.
pub fn cube_faces(orientation: &UnitQuaternion<f64>) -> [Face; 6] {
    let vertices = rotated_vertices(orientation);
    CUBE_FACES.map(|face| face.map(|i| (vertices[i].x, vertices[i].y, vertices[i].z)))
}
