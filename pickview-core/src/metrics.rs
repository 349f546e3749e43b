//! Scene measurements used to fit the camera: overall bounding size and the
//! on-screen size of the face nearest the camera.
use nalgebra::{Matrix4, Point3};
use tracing::trace;

use crate::geometry::Model;
use crate::transform::{project, Viewport};

/// Returned by every metric when there is nothing meaningful to measure.
pub const DEFAULT_METRIC: f64 = 1.0;

/// Diagonal of the axis-aligned bounding box over every vertex of every model.
pub fn scene_size(models: &[Model]) -> f64 {
    let mut points = models.iter().flat_map(|m| m.vertices().iter());
    let Some(first) = points.next() else {
        return DEFAULT_METRIC;
    };
    let (min, max) = points.fold((*first, *first), |(min, max), p| {
        (min.inf(p), max.sup(p))
    });
    let size = (max - min).norm();
    if size > 0.0 {
        size
    } else {
        DEFAULT_METRIC
    }
}

/// Face nearest the camera, as `(model_index, face_index)`.
///
/// Distance is the mean eye-space depth of the face's vertices under
/// `modelview`. Ties go to the first face in model-then-face order. Faces
/// without a usable normal are skipped, and so are faces with a vertex at or
/// behind the eye (clip `w <= 0` under `projection`), which cannot be
/// projected to the screen.
pub fn nearest_face(
    models: &[Model],
    modelview: &Matrix4<f64>,
    projection: &Matrix4<f64>,
) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), f64)> = None;
    for (model_index, model) in models.iter().enumerate() {
        for face_index in 0..model.faces().len() {
            if model.face_normal(face_index).is_none() {
                trace!(model_index, face_index, "skipping degenerate face");
                continue;
            }
            let points = model.face_points(face_index);
            let eye: Vec<Point3<f64>> = points.iter().map(|p| modelview.transform_point(p)).collect();
            if eye.iter().any(|p| (projection * p.to_homogeneous()).w <= 0.0) {
                trace!(model_index, face_index, "skipping face behind the eye");
                continue;
            }
            let depth = eye.iter().map(|p| -p.z).sum::<f64>() / eye.len() as f64;
            if best.map_or(true, |(_, closest)| depth < closest) {
                best = Some(((model_index, face_index), depth));
            }
        }
    }
    best.map(|(id, _)| id)
}

/// Largest pairwise screen distance, in pixels, between the projected
/// vertices of the nearest face.
pub fn nearest_face_screen_size(
    models: &[Model],
    modelview: &Matrix4<f64>,
    projection: &Matrix4<f64>,
    viewport: &Viewport,
) -> f64 {
    let Some((model_index, face_index)) = nearest_face(models, modelview, projection) else {
        return DEFAULT_METRIC;
    };
    let screen: Vec<Point3<f64>> = models[model_index]
        .face_points(face_index)
        .iter()
        .filter_map(|p| project(p, modelview, projection, viewport))
        .collect();

    let mut largest: Option<f64> = None;
    for (i, a) in screen.iter().enumerate() {
        for b in &screen[i + 1..] {
            let distance = (a.xy() - b.xy()).norm();
            largest = Some(largest.map_or(distance, |l| l.max(distance)));
        }
    }
    largest.unwrap_or(DEFAULT_METRIC)
}
