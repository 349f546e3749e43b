//! Viewer configuration
use crate::picking::PickPolicy;
use crate::transform::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Resolve clicks to faces.
    pub picking: bool,
    /// Allow switching to the orthographic projection.
    pub allow_orthographic: bool,
    pub pick_policy: PickPolicy,
    /// Zoom change per scroll step.
    pub zoom_step: f64,
    /// Degrees of rotation per pixel of drag.
    pub rotate_sensitivity: f64,
    /// Pan units per pixel of drag.
    pub pan_sensitivity: f64,
    pub viewport: Viewport,
}

impl ViewerConfig {
    /// Perspective-only viewer without face picking.
    pub fn wireframe() -> Self {
        Self {
            picking: false,
            allow_orthographic: false,
            ..Self::default()
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            picking: true,
            allow_orthographic: true,
            pick_policy: PickPolicy::Nearest,
            zoom_step: 0.5,
            rotate_sensitivity: 0.5,
            pan_sensitivity: 0.01,
            viewport: Viewport::new(800, 600),
        }
    }
}
