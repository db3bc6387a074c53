// rs_ray
use crate::core::common::Float;
use crate::core::error::{Location, Result, SceneError};
use crate::core::geometry::{bnd3_union_pnt3f, Bounds3f, Normal3f, Point3f, Ray};
use crate::core::interaction::RayHit;
use crate::core::parser::SceneParser;
use crate::core::shape::{Shape, TriangleBuffer};
use crate::shapes::triangle::{face_normal, intersect_triangle};

/// Triangles sharing one vertex buffer. Answers every query exactly
/// like a **ShapeList** of the same **Triangle**s would.
#[derive(Debug, Clone)]
pub struct TriangleList {
    pub positions: Vec<Point3f>,
    pub indices: Vec<[usize; 3]>,
    /// one geometric normal per triangle
    normals: Vec<Normal3f>,
}

impl TriangleList {
    pub const DIRECTIVE: &'static str = "triangleList";

    /// Returns `None` if an index points past the vertex buffer.
    pub fn new(positions: Vec<Point3f>, indices: Vec<[usize; 3]>) -> Option<Self> {
        let n_vertices: usize = positions.len();
        if indices.iter().flatten().any(|i| *i >= n_vertices) {
            return None;
        }
        let normals: Vec<Normal3f> = indices
            .iter()
            .map(|[i0, i1, i2]| face_normal(&positions[*i0], &positions[*i1], &positions[*i2]))
            .collect();
        Some(TriangleList {
            positions,
            indices,
            normals,
        })
    }
    /// `triangleList nv (x y z){nv} nt (i j k){nt}`
    pub fn create(parser: &mut SceneParser) -> Result<Box<dyn Shape>> {
        let n_vertices: usize = parser.next_usize()?;
        let mut positions: Vec<Point3f> =
            Vec::with_capacity(n_vertices.min(parser.remaining_tokens() / 3));
        for _ in 0..n_vertices {
            positions.push(parser.next_point3f()?);
        }
        let n_triangles: usize = parser.next_usize()?;
        let mut indices: Vec<[usize; 3]> =
            Vec::with_capacity(n_triangles.min(parser.remaining_tokens() / 3));
        for _ in 0..n_triangles {
            let mut triangle: [usize; 3] = [0; 3];
            for index in triangle.iter_mut() {
                let location: Location = parser.location();
                *index = parser.next_usize()?;
                if *index >= n_vertices {
                    return Err(SceneError::malformed(
                        parser.current_directive(),
                        location,
                        format!(
                            "vertex index {} out of range for {} vertices",
                            index, n_vertices
                        ),
                    ));
                }
            }
            indices.push(triangle);
        }
        match TriangleList::new(positions, indices) {
            Some(list) => Ok(Box::new(list)),
            None => Err(parser.malformed("vertex index out of range")),
        }
    }
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
    fn vertices(&self, triangle: usize) -> (&Point3f, &Point3f, &Point3f) {
        let [i0, i1, i2] = self.indices[triangle];
        (&self.positions[i0], &self.positions[i1], &self.positions[i2])
    }
}

impl Shape for TriangleList {
    fn object_bound(&self) -> Bounds3f {
        // unreferenced vertices do not count
        self.indices
            .iter()
            .flatten()
            .fold(Bounds3f::default(), |b, i| bnd3_union_pnt3f(&b, &self.positions[*i]))
    }
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let mut r: Ray = *ray;
        let mut nearest: Option<(Float, usize)> = None;
        for triangle in 0..self.indices.len() {
            if self.normals[triangle].length_squared() == 0.0 {
                continue;
            }
            let (p0, p1, p2) = self.vertices(triangle);
            // the segment shrinks to the nearest hit so far, later
            // triangles have to be strictly closer
            if let Some(t) = intersect_triangle(p0, p1, p2, &r) {
                r.t_max = t;
                nearest = Some((t, triangle));
            }
        }
        nearest.map(|(t, triangle)| RayHit::new(t, ray.position(t), self.normals[triangle]))
    }
    fn tessellate(&self, _complexity: usize) -> TriangleBuffer {
        let mut buffer: TriangleBuffer = TriangleBuffer::new();
        for triangle in 0..self.indices.len() {
            let (p0, p1, p2) = self.vertices(triangle);
            let n: Normal3f = self.normals[triangle];
            let i0: usize = buffer.push_vertex(*p0, n);
            let i1: usize = buffer.push_vertex(*p1, n);
            let i2: usize = buffer.push_vertex(*p2, n);
            buffer.push_triangle(i0, i1, i2);
        }
        buffer
    }
    fn directive(&self) -> &'static str {
        TriangleList::DIRECTIVE
    }
}
