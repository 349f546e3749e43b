//! Ray-cast face picking.
//!
//! A click is unprojected at depth 0 and depth 1 to form a ray, which is
//! intersected with the plane of every face and tested against the face's
//! triangle fan.
use nalgebra::{Matrix4, Point3, Unit, Vector3};
use tracing::trace;

use crate::geometry::Model;
use crate::transform::{unproject, Viewport};

/// Rays closer to parallel with a face plane than this are ignored.
pub const PARALLEL_EPSILON: f64 = 1e-6;
/// Barycentric denominators (squared double areas) below this mark a
/// degenerate triangle.
pub const AREA_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Option<Self> {
        Unit::try_new(direction, PARALLEL_EPSILON).map(|direction| Self { origin, direction })
    }

    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * t
    }
}

/// How to choose among several faces hit by the same ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PickPolicy {
    /// Closest intersection along the ray.
    #[default]
    Nearest,
    /// First face in model-then-face order whose triangles contain the
    /// intersection, regardless of distance.
    FirstHit,
}

/// A face hit by a pick ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceHit {
    pub model_index: usize,
    pub face_index: usize,
    /// Ray parameter at the intersection, in object-space units.
    pub distance: f64,
}

impl FaceHit {
    pub fn id(&self) -> (usize, usize) {
        (self.model_index, self.face_index)
    }
}

/// Ray through a click. `click_y` counts down from the top of the viewport,
/// as window systems report it.
pub fn ray_from_click(
    click_x: f64,
    click_y: f64,
    viewport: &Viewport,
    modelview: &Matrix4<f64>,
    projection: &Matrix4<f64>,
) -> Option<Ray> {
    let win_x = click_x;
    let win_y = viewport.height as f64 - click_y;
    let near = unproject(&Point3::new(win_x, win_y, 0.0), modelview, projection, viewport)?;
    let far = unproject(&Point3::new(win_x, win_y, 1.0), modelview, projection, viewport)?;
    Ray::new(near, far - near)
}

/// Barycentric inside test for `p` against triangle `(a, b, c)`. Points on
/// an edge count as inside.
pub fn point_in_triangle(p: &Point3<f64>, triangle: &[Point3<f64>; 3]) -> bool {
    let [a, b, c] = triangle;
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = v0.dot(&v0);
    let dot01 = v0.dot(&v1);
    let dot02 = v0.dot(&v2);
    let dot11 = v1.dot(&v1);
    let dot12 = v1.dot(&v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < AREA_EPSILON {
        return false;
    }
    let inv_denom = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;
    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}

/// Intersect `ray` with one face. Returns the ray parameter of the hit.
pub fn intersect_face(ray: &Ray, model: &Model, face_index: usize) -> Option<f64> {
    let normal = model.face_normal(face_index)?;
    let points = model.face_points(face_index);

    let denom = normal.dot(ray.direction.as_ref());
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let d = -normal.dot(&points[0].coords);
    let t = -(normal.dot(&ray.origin.coords) + d) / denom;
    if t < 0.0 {
        return None;
    }

    let hit = ray.at(t);
    model
        .face_triangles(face_index)
        .iter()
        .any(|triangle| point_in_triangle(&hit, triangle))
        .then_some(t)
}

/// Find the face hit by `ray` according to `policy`.
pub fn pick(models: &[Model], ray: &Ray, policy: PickPolicy) -> Option<FaceHit> {
    let mut best: Option<FaceHit> = None;
    for (model_index, model) in models.iter().enumerate() {
        for face_index in 0..model.faces().len() {
            let Some(distance) = intersect_face(ray, model, face_index) else {
                continue;
            };
            let hit = FaceHit {
                model_index,
                face_index,
                distance,
            };
            trace!(model_index, face_index, distance, "pick candidate");
            match policy {
                PickPolicy::FirstHit => return Some(hit),
                PickPolicy::Nearest => {
                    if best.map_or(true, |b| distance < b.distance) {
                        best = Some(hit);
                    }
                }
            }
        }
    }
    best
}

/// Cast a ray through a click and pick.
pub fn pick_click(
    models: &[Model],
    click_x: f64,
    click_y: f64,
    viewport: &Viewport,
    modelview: &Matrix4<f64>,
    projection: &Matrix4<f64>,
    policy: PickPolicy,
) -> Option<FaceHit> {
    let ray = ray_from_click(click_x, click_y, viewport, modelview, projection)?;
    pick(models, &ray, policy)
}
