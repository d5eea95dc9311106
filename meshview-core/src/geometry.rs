/// Mesh storage and the geometric primitives shared by the parser and engine
use std::collections::HashSet;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::error::{ParseError, ParseResult};

/// Coordinate axis targeted by a translation or rotation delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Component index of this axis in a 3-vector
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A polygon given as an ordered list of 0-based vertex indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Boundary edges in winding order, closing back to the first vertex
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn extent(&self) -> Vector3<f32> {
        self.max - self.min
    }
}

/// A loaded polygonal model.
///
/// Every face index is within `[0, vertices.len())` and there is at least one
/// vertex. Vertex positions change only through [`MeshData::apply_transform`];
/// faces never change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    vertices: Vec<Point3<f32>>,
    faces: Vec<Face>,
}

impl MeshData {
    /// Build a mesh from parts, checking the index invariants.
    ///
    /// Violations are reported with `line: 0` since the parts did not come
    /// from source text.
    pub fn new(vertices: Vec<Point3<f32>>, faces: Vec<Face>) -> ParseResult<Self> {
        if vertices.is_empty() {
            return Err(ParseError::EmptyModel);
        }

        for face in &faces {
            if face.len() < 3 {
                return Err(ParseError::malformed(
                    0,
                    "f",
                    format!("face has {} vertices, need at least 3", face.len()),
                ));
            }
            if let Some(&index) = face.indices().iter().find(|&&i| i >= vertices.len()) {
                return Err(ParseError::DanglingFaceIndex {
                    line: 0,
                    index: index as i64 + 1,
                    vertex_count: vertices.len(),
                });
            }
        }

        Ok(Self::from_parts_unchecked(vertices, faces))
    }

    /// Caller guarantees the invariants hold
    pub(crate) fn from_parts_unchecked(vertices: Vec<Point3<f32>>, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    pub fn vertices(&self) -> &[Point3<f32>] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of distinct undirected edges over all face boundaries
    pub fn edge_count(&self) -> usize {
        let mut edges = HashSet::new();
        for face in &self.faces {
            for (a, b) in face.edges() {
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.len()
    }

    pub fn bounds(&self) -> Bounds {
        let first = self.vertices[0];
        let (min, max) = self
            .vertices
            .iter()
            .fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
        Bounds { min, max }
    }

    /// Rewrite every vertex as `affine * (x, y, z, 1)`. Faces are untouched.
    pub fn apply_transform(&mut self, affine: &Matrix4<f32>) {
        for vertex in &mut self.vertices {
            *vertex = affine.transform_point(vertex);
        }
    }

    /// Cube with edge length `size` centered at the origin, quad faces
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let vertices = vec![
            Point3::new(-h, -h, -h),
            Point3::new(h, -h, -h),
            Point3::new(h, h, -h),
            Point3::new(-h, h, -h),
            Point3::new(-h, -h, h),
            Point3::new(h, -h, h),
            Point3::new(h, h, h),
            Point3::new(-h, h, h),
        ];
        let faces = [
            [0, 3, 2, 1], // back
            [4, 5, 6, 7], // front
            [0, 1, 5, 4], // bottom
            [3, 7, 6, 2], // top
            [1, 2, 6, 5], // right
            [0, 4, 7, 3], // left
        ]
        .into_iter()
        .map(|f| Face::new(f.to_vec()))
        .collect();

        Self::from_parts_unchecked(vertices, faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> MeshData {
        MeshData::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![Face::new(vec![0, 1, 2])],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_out_of_range_index() {
        let err = MeshData::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![Face::new(vec![0, 1, 3])],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ParseError::DanglingFaceIndex { index: 4, vertex_count: 3, .. }
        ));
    }

    #[test]
    fn test_new_rejects_empty_and_degenerate() {
        assert!(matches!(
            MeshData::new(Vec::new(), Vec::new()),
            Err(ParseError::EmptyModel)
        ));
        assert!(matches!(
            MeshData::new(vec![Point3::origin(), Point3::origin()], vec![Face::new(vec![0, 1])]),
            Err(ParseError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_apply_transform_keeps_faces() {
        let mut mesh = triangle();
        let faces_before = mesh.faces().to_vec();
        mesh.apply_transform(&Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0)));

        assert_eq!(mesh.faces(), faces_before.as_slice());
        assert_relative_eq!(mesh.vertices()[0], Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(mesh.vertices()[2], Point3::new(1.0, 3.0, 3.0));
    }

    #[test]
    fn test_cube_statistics() {
        let cube = MeshData::cube(2.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 6);
        assert_eq!(cube.edge_count(), 12);

        let bounds = cube.bounds();
        assert_relative_eq!(bounds.min, Point3::new(-1.0, -1.0, -1.0));
        assert_relative_eq!(bounds.extent(), Vector3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(bounds.center(), Point3::origin());
    }

    #[test]
    fn test_face_edges_wrap_around() {
        let face = Face::new(vec![4, 7, 9]);
        let edges: Vec<_> = face.edges().collect();
        assert_eq!(edges, vec![(4, 7), (7, 9), (9, 4)]);
    }

    #[test]
    fn test_axis_index() {
        assert_eq!(Axis::X.index(), 0);
        assert_eq!(Axis::Y.index(), 1);
        assert_eq!(Axis::Z.index(), 2);
    }
}
