//! Camera state: pan, rotation, and a zoom value remembered per projection mode.
use nalgebra::{Matrix4, Vector2};

use crate::transform::{RotationState, Transform};

/// Perspective zoom used on startup and by the isometric reset.
pub const DEFAULT_PERSPECTIVE_ZOOM: f64 = -5.0;
/// Orthographic zoom that shows the scene at its default fit.
pub const DEFAULT_ORTHOGRAPHIC_ZOOM: f64 = 0.0;
/// Rotation (degrees about X, then Y) of the standard isometric view.
pub const ISOMETRIC_ROTATION: RotationState = RotationState { x: 35.264, y: 45.0 };

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewMode {
    Perspective,
    Orthographic,
}

impl ViewMode {
    pub fn other(self) -> Self {
        match self {
            ViewMode::Perspective => ViewMode::Orthographic,
            ViewMode::Orthographic => ViewMode::Perspective,
        }
    }
}

/// Camera parameters driven by user input and zoom normalization.
///
/// Zoom is stored twice, once per [`ViewMode`]. The active zoom always equals
/// the stored zoom of the current mode, so the zoom fields are private and
/// only change through the methods below.
///
/// Perspective zoom is a signed distance along the view axis (more negative
/// is farther away). Orthographic zoom is a log-scale control centered at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraState {
    mode: ViewMode,
    pub pan: Vector2<f64>,
    pub rotation: RotationState,
    zoom: f64,
    perspective_zoom: f64,
    orthographic_zoom: f64,
}

impl CameraState {
    pub fn new() -> Self {
        Self {
            mode: ViewMode::Perspective,
            pan: Vector2::zeros(),
            rotation: RotationState::zero(),
            zoom: DEFAULT_PERSPECTIVE_ZOOM,
            perspective_zoom: DEFAULT_PERSPECTIVE_ZOOM,
            orthographic_zoom: DEFAULT_ORTHOGRAPHIC_ZOOM,
        }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Zoom of the active mode.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom remembered for `mode`, whether or not it is active.
    pub fn stored_zoom(&self, mode: ViewMode) -> f64 {
        match mode {
            ViewMode::Perspective => self.perspective_zoom,
            ViewMode::Orthographic => self.orthographic_zoom,
        }
    }

    /// Overwrite the zoom remembered for `mode`, mirroring it into the active
    /// zoom when `mode` is current.
    pub fn set_stored_zoom(&mut self, mode: ViewMode, zoom: f64) {
        match mode {
            ViewMode::Perspective => self.perspective_zoom = zoom,
            ViewMode::Orthographic => self.orthographic_zoom = zoom,
        }
        if mode == self.mode {
            self.zoom = zoom;
        }
    }

    /// Switch projection mode. The outgoing mode keeps the current zoom and
    /// the incoming mode's zoom becomes active, unconverted.
    ///
    /// Returns `false` when `mode` is already active.
    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        if mode == self.mode {
            return false;
        }
        let outgoing = self.mode;
        self.set_stored_zoom(outgoing, self.zoom);
        self.mode = mode;
        self.zoom = self.stored_zoom(mode);
        true
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.other());
    }

    pub fn apply_pan(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    pub fn apply_rotation(&mut self, dx: f64, dy: f64) {
        self.rotation.rotate(dx, dy);
    }

    pub fn apply_zoom(&mut self, delta: f64) {
        self.set_stored_zoom(self.mode, self.zoom + delta);
    }

    /// Top-left isometric view at the default perspective distance.
    pub fn reset_isometric(&mut self) {
        self.set_mode(ViewMode::Perspective);
        self.rotation = ISOMETRIC_ROTATION;
        self.pan = Vector2::zeros();
        self.set_stored_zoom(ViewMode::Perspective, DEFAULT_PERSPECTIVE_ZOOM);
    }

    /// Zero pan and rotation, leaving zoom and mode alone.
    pub fn reset_orientation(&mut self) {
        self.pan = Vector2::zeros();
        self.rotation = RotationState::zero();
    }

    pub fn modelview(&self) -> Matrix4<f64> {
        Transform::modelview(self.pan.x, self.pan.y, self.zoom, &self.rotation)
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults() {
        let camera = CameraState::new();
        assert_eq!(camera.mode(), ViewMode::Perspective);
        assert_eq!(camera.zoom(), DEFAULT_PERSPECTIVE_ZOOM);
        assert_eq!(camera.stored_zoom(ViewMode::Orthographic), 0.0);
    }

    #[test]
    fn test_mode_switch_swaps_zoom_slots() {
        let mut camera = CameraState::new();
        camera.apply_zoom(-2.0);
        assert!(camera.set_mode(ViewMode::Orthographic));
        assert_eq!(camera.zoom(), 0.0);
        assert_eq!(camera.stored_zoom(ViewMode::Perspective), -7.0);

        camera.apply_zoom(1.5);
        assert_eq!(camera.stored_zoom(ViewMode::Orthographic), 1.5);

        camera.toggle_mode();
        assert_eq!(camera.mode(), ViewMode::Perspective);
        assert_eq!(camera.zoom(), -7.0);
        assert_eq!(camera.stored_zoom(ViewMode::Orthographic), 1.5);
    }

    #[test]
    fn test_redundant_set_mode_is_noop() {
        let mut camera = CameraState::new();
        camera.apply_zoom(0.5);
        camera.set_mode(ViewMode::Orthographic);
        let after_first = camera.clone();
        assert!(!camera.set_mode(ViewMode::Orthographic));
        assert_eq!(camera, after_first);
    }

    #[test]
    fn test_pan_rotation_are_additive() {
        let mut camera = CameraState::new();
        camera.apply_pan(0.25, -0.5);
        camera.apply_pan(0.25, 0.0);
        camera.apply_rotation(200.0, 10.0);
        camera.apply_rotation(200.0, -30.0);
        assert_eq!(camera.pan, Vector2::new(0.5, -0.5));
        assert_eq!(camera.rotation, RotationState::new(400.0, -20.0));
    }

    #[test]
    fn test_reset_isometric_from_orthographic() {
        let mut camera = CameraState::new();
        camera.set_mode(ViewMode::Orthographic);
        camera.apply_zoom(3.0);
        camera.apply_pan(1.0, 1.0);
        camera.reset_isometric();

        assert_eq!(camera.mode(), ViewMode::Perspective);
        assert_eq!(camera.rotation, RotationState::new(35.264, 45.0));
        assert_eq!(camera.pan, Vector2::zeros());
        assert_eq!(camera.zoom(), -5.0);
        assert_eq!(camera.stored_zoom(ViewMode::Perspective), -5.0);
        assert_eq!(camera.stored_zoom(ViewMode::Orthographic), 3.0);
    }
}
