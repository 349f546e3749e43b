//! Per-frame driver tying camera, projection, metrics and picking together.
//!
//! The window and renderer sit outside this crate. Each frame they call
//! [`Viewer::begin_frame`], draw with the returned matrices, and highlight
//! [`Frame::highlighted`].
use nalgebra::Matrix4;
use tracing::{debug, info, warn};

use crate::camera::{CameraState, ViewMode};
use crate::config::ViewerConfig;
use crate::geometry::Model;
use crate::metrics::{nearest_face_screen_size, scene_size};
use crate::picking::{pick_click, FaceHit};
use crate::projection::NormalizationParams;
use crate::transform::Viewport;

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub mode: ViewMode,
    pub modelview: Matrix4<f64>,
    pub projection: Matrix4<f64>,
    pub viewport: Viewport,
    pub highlighted: Option<FaceHit>,
}

pub struct Viewer {
    config: ViewerConfig,
    models: Vec<Model>,
    camera: CameraState,
    viewport: Viewport,
    ortho_base_size: f64,
    last_mode: Option<ViewMode>,
    needs_normalize: bool,
    pending_click: Option<(f64, f64)>,
    highlighted: Option<FaceHit>,
    presented: Option<Frame>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            viewport: config.viewport,
            config,
            models: Vec::new(),
            camera: CameraState::new(),
            ortho_base_size: 1.0,
            last_mode: None,
            needs_normalize: false,
            pending_click: None,
            highlighted: None,
            presented: None,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Direct camera access for input handlers. Mode changes should go
    /// through [`Viewer::set_mode`] so the configuration is honoured.
    pub fn camera_mut(&mut self) -> &mut CameraState {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn ortho_base_size(&self) -> f64 {
        self.ortho_base_size
    }

    /// Face chosen by the most recent click, if any.
    pub fn pick_result(&self) -> Option<FaceHit> {
        self.highlighted
    }

    /// Add a model and refit the view around the enlarged scene.
    pub fn add_model(&mut self, model: Model) {
        info!(
            vertices = model.vertices().len(),
            faces = model.faces().len(),
            "model added"
        );
        self.models.push(model);
        self.highlighted = None;
        self.reset_view();
    }

    pub fn remove_model(&mut self, index: usize) -> Option<Model> {
        if index >= self.models.len() {
            warn!(index, "no model to remove");
            return None;
        }
        let removed = self.models.remove(index);
        self.highlighted = None;
        self.normalize();
        Some(removed)
    }

    /// Zero pan and rotation, then refit the zoom of the active mode.
    pub fn reset_view(&mut self) {
        self.camera.reset_orientation();
        self.normalize();
    }

    pub fn reset_isometric(&mut self) {
        self.camera.reset_isometric();
    }

    /// Returns `true` if the mode changed.
    pub fn set_mode(&mut self, mode: ViewMode) -> bool {
        if mode == ViewMode::Orthographic && !self.config.allow_orthographic {
            warn!("orthographic projection is disabled");
            return false;
        }
        self.camera.set_mode(mode)
    }

    pub fn toggle_mode(&mut self) -> bool {
        self.set_mode(self.camera.mode().other())
    }

    /// The view is refitted before the next frame if the size changed.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport != self.viewport {
            debug!(width = viewport.width, height = viewport.height, "viewport resized");
            self.viewport = viewport;
            self.presented = None;
            self.needs_normalize = true;
        }
    }

    /// Store a click for the next frame, replacing any unconsumed one.
    pub fn queue_click(&mut self, x: f64, y: f64) {
        self.pending_click = Some((x, y));
    }

    pub fn current_projection_matrix(&self) -> Matrix4<f64> {
        self.camera
            .mode()
            .strategy()
            .projection_matrix(&self.camera, self.ortho_base_size, self.viewport.aspect())
    }

    pub fn current_modelview_transform(&self) -> Matrix4<f64> {
        self.camera.modelview()
    }

    /// Refit the active mode's zoom to the scene.
    ///
    /// The nearest face is measured with the transforms of the last frame
    /// handed to the renderer, i.e. what is currently on screen.
    pub fn normalize(&mut self) {
        let (modelview, projection, viewport) = match &self.presented {
            Some(frame) => (frame.modelview, frame.projection, frame.viewport),
            None => (
                self.current_modelview_transform(),
                self.current_projection_matrix(),
                self.viewport,
            ),
        };
        let params = NormalizationParams::compute(
            scene_size(&self.models),
            nearest_face_screen_size(&self.models, &modelview, &projection, &viewport),
        );
        let strategy = self.camera.mode().strategy();
        self.ortho_base_size = strategy.normalize(&mut self.camera, &params);
        self.needs_normalize = false;
    }

    /// Prepare the next frame: refit on mode or viewport change, build the
    /// matrices, and resolve at most one pending click.
    pub fn begin_frame(&mut self) -> Frame {
        let mode = self.camera.mode();
        if self.last_mode != Some(mode) || self.needs_normalize {
            if let Some(previous) = self.last_mode.filter(|&m| m != mode) {
                info!(?previous, ?mode, "projection mode changed");
            }
            self.normalize();
            self.last_mode = Some(mode);
        }

        let projection = self.current_projection_matrix();
        let modelview = self.current_modelview_transform();

        if let Some((x, y)) = self.pending_click.take() {
            if self.config.picking {
                self.highlighted = pick_click(
                    &self.models,
                    x,
                    y,
                    &self.viewport,
                    &modelview,
                    &projection,
                    self.config.pick_policy,
                );
                debug!(x, y, hit = ?self.highlighted.map(|h| h.id()), "click resolved");
            }
        }

        let frame = Frame {
            mode,
            modelview,
            projection,
            viewport: self.viewport,
            highlighted: self.highlighted,
        };
        self.presented = Some(frame);
        frame
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
