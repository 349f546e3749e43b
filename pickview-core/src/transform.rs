//! Modelview construction and window-space projection helpers
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Rotation about the X and Y axes, in degrees. Unbounded, no wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f64,
    pub y: f64,
}

impl RotationState {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Rotate by delta amounts (in degrees)
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }
}

/// Pixel rectangle the scene is drawn into. Window coordinates have their
/// origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Width over height, or 1.0 for a viewport with no area.
    pub fn aspect(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

pub struct Transform;

impl Transform {
    /// Rotation about X then Y, both in degrees
    pub fn rotation_matrix(rotation: &RotationState) -> Matrix4<f64> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x.to_radians(), 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y.to_radians(), 0.0));
        rx * ry
    }

    pub fn translation_matrix(x: f64, y: f64, z: f64) -> Matrix4<f64> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// `translate(pan_x, pan_y, zoom) * Rx * Ry`: the scene is rotated in
    /// place, then pushed along the view axis by the zoom value.
    pub fn modelview(pan_x: f64, pan_y: f64, zoom: f64, rotation: &RotationState) -> Matrix4<f64> {
        Self::translation_matrix(pan_x, pan_y, zoom) * Self::rotation_matrix(rotation)
    }
}

/// Map an object-space point to window coordinates `(x, y, depth)`, depth in
/// `[0, 1]` for points inside the clip volume.
pub fn project(
    point: &Point3<f64>,
    modelview: &Matrix4<f64>,
    projection: &Matrix4<f64>,
    viewport: &Viewport,
) -> Option<Point3<f64>> {
    let clip = projection * modelview * point.to_homogeneous();
    if clip.w.abs() < f64::EPSILON {
        return None;
    }
    let ndc = clip.xyz() / clip.w;
    Some(Point3::new(
        viewport.x as f64 + viewport.width as f64 * (ndc.x + 1.0) * 0.5,
        viewport.y as f64 + viewport.height as f64 * (ndc.y + 1.0) * 0.5,
        (ndc.z + 1.0) * 0.5,
    ))
}

/// Inverse of [`project`]: map window coordinates back to object space.
pub fn unproject(
    window: &Point3<f64>,
    modelview: &Matrix4<f64>,
    projection: &Matrix4<f64>,
    viewport: &Viewport,
) -> Option<Point3<f64>> {
    if viewport.width == 0 || viewport.height == 0 {
        return None;
    }
    let inverse = (projection * modelview).try_inverse()?;
    let ndc = Vector4::new(
        2.0 * (window.x - viewport.x as f64) / viewport.width as f64 - 1.0,
        2.0 * (window.y - viewport.y as f64) / viewport.height as f64 - 1.0,
        2.0 * window.z - 1.0,
        1.0,
    );
    let object = inverse * ndc;
    if object.w.abs() < f64::EPSILON {
        return None;
    }
    Some(Point3::from(object.xyz() / object.w))
}
