/// Geometry primitives for the viewer core
use nalgebra::{Point3, Vector3};

/// A polygon given as 1-based indices into the vertex sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// The 1-based vertex indices, in winding order
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Consecutive index pairs closing the loop back to the first index,
    /// which is what a wireframe collaborator draws.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.indices.len();
        let closing = if n > 2 { n } else { n.saturating_sub(1) };
        (0..closing).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }
}

/// Axis-aligned bounds of a vertex set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    /// Bounds of the given points, `None` when there are none
    pub fn from_points(points: &[Point3<f32>]) -> Option<Self> {
        let first = points.first()?;
        let (min, max) = points.iter().skip(1).fold((*first, *first), |(min, max), p| {
            (min.inf(p), max.sup(p))
        });
        Some(Self { min, max })
    }

    pub fn range(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Largest extent over the three axes
    pub fn max_range(&self) -> f32 {
        self.range().max()
    }
}

/// Mean position of the given points, `None` when there are none
pub fn centroid(points: &[Point3<f32>]) -> Option<Point3<f32>> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc: Vector3<f32>, p| acc + p.coords);
    Some(Point3::from(sum / points.len() as f32))
}

/// A polygon mesh: vertices plus faces indexing into them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3<f32>>,
    pub faces: Vec<Face>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    pub fn add_vertex(&mut self, vertex: Point3<f32>) {
        self.vertices.push(vertex);
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Look up a vertex by its 1-based index
    pub fn vertex(&self, index: usize) -> Option<&Point3<f32>> {
        index.checked_sub(1).and_then(|i| self.vertices.get(i))
    }

    /// Create an axis-aligned cube of quads centered on the origin
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(8, 6);

        for &x in &[-half, half] {
            for &y in &[-half, half] {
                for &z in &[-half, half] {
                    mesh.add_vertex(Point3::new(x, y, z));
                }
            }
        }

        // Vertex n (1-based) sits at bits (x, y, z) of n - 1
        mesh.add_face(Face::new(vec![1, 2, 4, 3])); // -x
        mesh.add_face(Face::new(vec![5, 7, 8, 6])); // +x
        mesh.add_face(Face::new(vec![1, 5, 6, 2])); // -y
        mesh.add_face(Face::new(vec![3, 4, 8, 7])); // +y
        mesh.add_face(Face::new(vec![1, 3, 7, 5])); // -z
        mesh.add_face(Face::new(vec![2, 6, 8, 4])); // +z

        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_counts() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 6);
        assert!(cube.faces.iter().all(|f| f.len() == 4));
    }

    #[test]
    fn test_vertex_lookup_is_one_based() {
        let cube = Mesh::cube(2.0);
        assert!(cube.vertex(0).is_none());
        assert_eq!(cube.vertex(1), Some(&Point3::new(-1.0, -1.0, -1.0)));
        assert_eq!(cube.vertex(8), Some(&Point3::new(1.0, 1.0, 1.0)));
        assert!(cube.vertex(9).is_none());
    }

    #[test]
    fn test_bounding_box() {
        let points = [
            Point3::new(1.0, -2.0, 0.5),
            Point3::new(-3.0, 4.0, 0.0),
            Point3::new(0.0, 0.0, 2.5),
        ];
        let bounds = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bounds.min, Point3::new(-3.0, -2.0, 0.0));
        assert_eq!(bounds.max, Point3::new(1.0, 4.0, 2.5));
        assert_relative_eq!(bounds.max_range(), 6.0);
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_centroid() {
        let cube = Mesh::cube(3.0);
        let c = centroid(&cube.vertices).unwrap();
        assert_relative_eq!(c, Point3::origin(), epsilon = 1e-6);
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn test_face_edges_close_the_loop() {
        let quad = Face::new(vec![1, 2, 3, 4]);
        let edges: Vec<_> = quad.edges().collect();
        assert_eq!(edges, vec![(1, 2), (2, 3), (3, 4), (4, 1)]);

        let segment = Face::new(vec![5, 6]);
        assert_eq!(segment.edges().collect::<Vec<_>>(), vec![(5, 6)]);
    }
}
