//! Polyhedral models: indexed vertices, edges and planar faces.
use nalgebra::{Point3, Vector3};

use crate::error::GeometryError;

/// Faces whose normal is shorter than this are treated as degenerate.
pub const DEGENERATE_NORMAL: f64 = 1e-12;

/// An indexed polyhedral model.
///
/// Every index stored in `edges` and `faces` refers to an existing vertex;
/// the append methods reject anything else.
#[derive(Debug, Clone, Default)]
pub struct Model {
    vertices: Vec<Point3<f64>>,
    edges: Vec<[usize; 2]>,
    faces: Vec<Vec<usize>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Append a vertex and return its index.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    pub fn add_edge(&mut self, a: usize, b: usize) -> Result<(), GeometryError> {
        self.check_index(a)?;
        self.check_index(b)?;
        self.edges.push([a, b]);
        Ok(())
    }

    /// Append a face given as an ordered loop of vertex indices.
    pub fn add_face(&mut self, indices: &[usize]) -> Result<usize, GeometryError> {
        if indices.len() < 3 {
            return Err(GeometryError::FaceTooSmall(indices.len()));
        }
        for &index in indices {
            self.check_index(index)?;
        }
        self.faces.push(indices.to_vec());
        Ok(self.faces.len() - 1)
    }

    fn check_index(&self, index: usize) -> Result<(), GeometryError> {
        if index < self.vertices.len() {
            Ok(())
        } else {
            Err(GeometryError::VertexOutOfRange {
                index,
                len: self.vertices.len(),
            })
        }
    }

    /// Positions of a face's vertices in loop order.
    pub fn face_points(&self, face: usize) -> Vec<Point3<f64>> {
        self.faces
            .get(face)
            .map(|indices| indices.iter().map(|&i| self.vertices[i]).collect())
            .unwrap_or_default()
    }

    /// Triangle fan of a face: `{v0, vi, vi+1}`. A quad yields `{v0,v1,v2}`
    /// and `{v0,v2,v3}`, sharing the v0-v2 diagonal.
    pub fn face_triangles(&self, face: usize) -> Vec<[Point3<f64>; 3]> {
        let points = self.face_points(face);
        if points.len() < 3 {
            return Vec::new();
        }
        (1..points.len() - 1)
            .map(|i| [points[0], points[i], points[i + 1]])
            .collect()
    }

    /// Unit normal from the first three vertices, `None` if they are collinear.
    pub fn face_normal(&self, face: usize) -> Option<Vector3<f64>> {
        let points = self.face_points(face);
        if points.len() < 3 {
            return None;
        }
        let edge1 = points[1] - points[0];
        let edge2 = points[2] - points[0];
        edge1.cross(&edge2).try_normalize(DEGENERATE_NORMAL)
    }

    /// Cube with corners at ±1 on each axis.
    pub fn cube() -> Self {
        let corners = [
            (-1.0, -1.0, -1.0),
            (1.0, -1.0, -1.0),
            (1.0, 1.0, -1.0),
            (-1.0, 1.0, -1.0),
            (-1.0, -1.0, 1.0),
            (1.0, -1.0, 1.0),
            (1.0, 1.0, 1.0),
            (-1.0, 1.0, 1.0),
        ];
        let edges = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        let faces: [[usize; 4]; 6] = [
            [0, 1, 2, 3], // bottom
            [4, 5, 6, 7], // top
            [0, 1, 5, 4], // front
            [2, 3, 7, 6], // back
            [1, 2, 6, 5], // right
            [0, 3, 7, 4], // left
        ];

        let mut model = Self::new();
        for (x, y, z) in corners {
            model.add_vertex(Point3::new(x, y, z));
        }
        for (a, b) in edges {
            model.edges.push([a, b]);
        }
        for face in faces {
            model.faces.push(face.to_vec());
        }
        model
    }

    /// Low-poly torus in the XY plane with `sides` segments around both
    /// circles. Major radius 1.0, minor radius 0.5.
    pub fn donut(sides: usize) -> Self {
        let sides = sides.max(3);
        let mut model = Self::new();
        let step = std::f64::consts::TAU / sides as f64;

        for i in 0..sides {
            let angle = step * i as f64;
            for j in 0..sides {
                let sub_angle = step * j as f64;
                let radius = 1.0 + 0.5 * sub_angle.cos();
                model.add_vertex(Point3::new(
                    radius * angle.cos(),
                    radius * angle.sin(),
                    0.5 * sub_angle.sin(),
                ));
            }
        }

        let index = |i: usize, j: usize| (i % sides) * sides + (j % sides);
        for i in 0..sides {
            for j in 0..sides {
                let quad = [index(i, j), index(i, j + 1), index(i + 1, j + 1), index(i + 1, j)];
                model.faces.push(quad.to_vec());
                model.edges.push([quad[0], quad[1]]);
                model.edges.push([quad[0], quad[3]]);
            }
        }
        model
    }
}
