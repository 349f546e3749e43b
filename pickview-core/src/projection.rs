//! Projection strategies and zoom normalization between perspective and
//! orthographic views.
//!
//! Orthographic zoom is linear in log space: the visible half-height is
//! `ortho_base_size / exp(zoom * ZOOM_SHAPE)`. The perspective conversion
//! inverts that mapping so an object keeps its on-screen size when the mode
//! changes. Both conversions share the `ortho_base_size` computed by the
//! last normalization.
use nalgebra::Matrix4;
use tracing::debug;

use crate::camera::{CameraState, ViewMode};

/// On-screen size, in pixels, the nearest face should occupy at default fit.
pub const TARGET_FACE_PIXELS: f64 = 200.0;
/// Steepness of the orthographic log-scale zoom.
pub const ZOOM_SHAPE: f64 = 0.15;
/// Below this, zoom denominators are treated as zero.
pub const ZOOM_EPSILON: f64 = 1e-6;

pub const PERSPECTIVE_FOV_DEG: f64 = 45.0;
pub const PERSPECTIVE_NEAR: f64 = 0.1;
pub const PERSPECTIVE_FAR: f64 = 50.0;
pub const ORTHOGRAPHIC_NEAR: f64 = -100.0;
pub const ORTHOGRAPHIC_FAR: f64 = 100.0;
/// Bounds on the orthographic half-height; `exp(zoom * ZOOM_SHAPE)` leaves
/// the finite range long before the zoom value itself does.
pub const ORTHOGRAPHIC_MIN_HALF_EXTENT: f64 = 1e-6;
pub const ORTHOGRAPHIC_MAX_HALF_EXTENT: f64 = 1e6;

/// Closest the perspective camera gets after normalization.
pub const MIN_PERSPECTIVE_DISTANCE: f64 = 5.0;

/// Values derived from the scene and the current view, recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationParams {
    pub scene_size: f64,
    pub base_ortho: f64,
    pub face_screen_size: f64,
    pub target_size: f64,
    pub scale: f64,
    pub ortho_base_size: f64,
}

impl NormalizationParams {
    pub fn compute(scene_size: f64, face_screen_size: f64) -> Self {
        let base_ortho = scene_size.max(1.0) * 1.5;
        let target_size = TARGET_FACE_PIXELS;
        let scale = if face_screen_size > 0.0 {
            face_screen_size / target_size
        } else {
            1.0
        };
        let params = Self {
            scene_size,
            base_ortho,
            face_screen_size,
            target_size,
            scale,
            ortho_base_size: base_ortho / scale,
        };
        debug!(
            scene_size,
            base_ortho,
            face_screen_size,
            scale,
            ortho_base_size = params.ortho_base_size,
            "normalization params"
        );
        params
    }
}

/// Behaviour that differs between the two projection modes.
pub trait ProjectionStrategy {
    fn mode(&self) -> ViewMode;

    /// Fit the camera zoom of this mode to the scene. Returns the
    /// `ortho_base_size` the caller must retain for later conversions.
    fn normalize(&self, camera: &mut CameraState, params: &NormalizationParams) -> f64;

    /// Projection matrix for the camera's current zoom.
    fn projection_matrix(&self, camera: &CameraState, ortho_base_size: f64, aspect: f64) -> Matrix4<f64>;

    /// Convert a zoom value of the other mode into this mode's zoom.
    fn convert_zoom(&self, zoom: f64, ortho_base_size: f64) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Perspective;

#[derive(Debug, Clone, Copy, Default)]
pub struct Orthographic;

impl ViewMode {
    pub fn strategy(self) -> &'static dyn ProjectionStrategy {
        match self {
            ViewMode::Perspective => &Perspective,
            ViewMode::Orthographic => &Orthographic,
        }
    }
}

impl ProjectionStrategy for Perspective {
    fn mode(&self) -> ViewMode {
        ViewMode::Perspective
    }

    fn normalize(&self, camera: &mut CameraState, params: &NormalizationParams) -> f64 {
        let zoom = -(2.5 * params.scene_size).max(MIN_PERSPECTIVE_DISTANCE);
        camera.set_stored_zoom(ViewMode::Perspective, zoom);
        debug!(zoom, "perspective normalized");
        params.ortho_base_size
    }

    fn projection_matrix(&self, _camera: &CameraState, _ortho_base_size: f64, aspect: f64) -> Matrix4<f64> {
        Matrix4::new_perspective(
            aspect,
            PERSPECTIVE_FOV_DEG.to_radians(),
            PERSPECTIVE_NEAR,
            PERSPECTIVE_FAR,
        )
    }

    fn convert_zoom(&self, ortho_zoom: f64, ortho_base_size: f64) -> f64 {
        -ortho_base_size / (ortho_zoom * ZOOM_SHAPE).exp()
    }
}

impl ProjectionStrategy for Orthographic {
    fn mode(&self) -> ViewMode {
        ViewMode::Orthographic
    }

    fn normalize(&self, camera: &mut CameraState, params: &NormalizationParams) -> f64 {
        let perspective_zoom = camera.stored_zoom(ViewMode::Perspective);
        let zoom = self.convert_zoom(perspective_zoom, params.ortho_base_size);
        camera.set_stored_zoom(ViewMode::Orthographic, zoom);
        debug!(perspective_zoom, zoom, "orthographic normalized");
        params.ortho_base_size
    }

    fn projection_matrix(&self, camera: &CameraState, ortho_base_size: f64, aspect: f64) -> Matrix4<f64> {
        let half_height = orthographic_half_height(camera.stored_zoom(ViewMode::Orthographic), ortho_base_size);
        let half_width = half_height * aspect;
        Matrix4::new_orthographic(
            -half_width,
            half_width,
            -half_height,
            half_height,
            ORTHOGRAPHIC_NEAR,
            ORTHOGRAPHIC_FAR,
        )
    }

    fn convert_zoom(&self, perspective_zoom: f64, ortho_base_size: f64) -> f64 {
        if ortho_base_size > 0.0 && perspective_zoom.abs() > ZOOM_EPSILON {
            (ortho_base_size / perspective_zoom.abs()).ln() / ZOOM_SHAPE
        } else {
            0.0
        }
    }
}

/// Visible half-height for an orthographic zoom, kept inside the range a
/// projection matrix can be built from.
pub fn orthographic_half_height(zoom: f64, ortho_base_size: f64) -> f64 {
    let half_height = ortho_base_size / (zoom * ZOOM_SHAPE).exp();
    if half_height.is_nan() {
        debug!(zoom, ortho_base_size, "orthographic extent undefined, using default fit");
        return 1.0;
    }
    half_height.clamp(ORTHOGRAPHIC_MIN_HALF_EXTENT, ORTHOGRAPHIC_MAX_HALF_EXTENT)
}
