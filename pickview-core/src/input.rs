//! Window-system independent input handling.
//!
//! Front ends translate their native events into [`InputEvent`]s and feed
//! them to an [`InputController`], which turns them into camera operations
//! on a [`Viewer`].
use std::collections::HashSet;

use tracing::debug;

use crate::viewer::Viewer;

/// Degrees of rotation per arrow-key press.
pub const KEY_ROTATE_STEP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Shift,
    Up,
    Down,
    Left,
    Right,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Button press at a viewport position, `y` counted from the top.
    MouseDown { button: MouseButton, x: f64, y: f64 },
    /// Pointer motion while `button` is held, in pixels.
    MouseDrag { button: MouseButton, dx: f64, dy: f64 },
    /// Wheel steps, positive away from the user.
    Scroll(f64),
}

#[derive(Debug, Default)]
pub struct InputController {
    pressed: HashSet<Key>,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn shift_held(&self) -> bool {
        self.is_pressed(Key::Shift)
    }

    pub fn handle(&mut self, event: InputEvent, viewer: &mut Viewer) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed.insert(key);
                self.key_pressed(key, viewer);
            }
            InputEvent::KeyUp(key) => {
                self.pressed.remove(&key);
            }
            InputEvent::MouseDown { button: MouseButton::Left, x, y } => {
                viewer.queue_click(x, y);
            }
            InputEvent::MouseDown { .. } => {}
            InputEvent::MouseDrag { button: MouseButton::Middle, dx, dy } => {
                let config = viewer.config().clone();
                let camera = viewer.camera_mut();
                if self.shift_held() {
                    camera.apply_pan(dx * config.pan_sensitivity, -dy * config.pan_sensitivity);
                } else {
                    camera.apply_rotation(dy * config.rotate_sensitivity, dx * config.rotate_sensitivity);
                }
            }
            InputEvent::MouseDrag { .. } => {}
            InputEvent::Scroll(steps) => {
                let step = viewer.config().zoom_step;
                viewer.camera_mut().apply_zoom(steps * step);
            }
        }
    }

    fn key_pressed(&mut self, key: Key, viewer: &mut Viewer) {
        let zoom_step = viewer.config().zoom_step;
        match key {
            Key::Char('v') => {
                debug!("isometric reset");
                viewer.reset_isometric();
            }
            Key::Char('o') => {
                viewer.toggle_mode();
            }
            Key::Char('+') | Key::Char('=') => viewer.camera_mut().apply_zoom(zoom_step),
            Key::Char('-') => viewer.camera_mut().apply_zoom(-zoom_step),
            Key::Up => viewer.camera_mut().apply_rotation(-KEY_ROTATE_STEP, 0.0),
            Key::Down => viewer.camera_mut().apply_rotation(KEY_ROTATE_STEP, 0.0),
            Key::Left => viewer.camera_mut().apply_rotation(0.0, -KEY_ROTATE_STEP),
            Key::Right => viewer.camera_mut().apply_rotation(0.0, KEY_ROTATE_STEP),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::ViewMode;
    use crate::config::ViewerConfig;
    use crate::transform::RotationState;
    use nalgebra::Vector2;

    #[test]
    fn test_middle_drag_rotates() {
        let mut viewer = Viewer::default();
        let mut input = InputController::new();
        input.handle(
            InputEvent::MouseDrag { button: MouseButton::Middle, dx: 10.0, dy: 4.0 },
            &mut viewer,
        );
        assert_eq!(viewer.camera().rotation, RotationState::new(2.0, 5.0));
    }

    #[test]
    fn test_shift_drag_pans() {
        let mut viewer = Viewer::default();
        let mut input = InputController::new();
        input.handle(InputEvent::KeyDown(Key::Shift), &mut viewer);
        input.handle(
            InputEvent::MouseDrag { button: MouseButton::Middle, dx: 100.0, dy: 50.0 },
            &mut viewer,
        );
        assert_eq!(viewer.camera().pan, Vector2::new(1.0, -0.5));
        assert_eq!(viewer.camera().rotation, RotationState::zero());

        input.handle(InputEvent::KeyUp(Key::Shift), &mut viewer);
        assert!(!input.shift_held());
    }

    #[test]
    fn test_left_drag_is_ignored() {
        let mut viewer = Viewer::default();
        let mut input = InputController::new();
        input.handle(
            InputEvent::MouseDrag { button: MouseButton::Left, dx: 10.0, dy: 10.0 },
            &mut viewer,
        );
        assert_eq!(viewer.camera().rotation, RotationState::zero());
    }

    #[test]
    fn test_scroll_zooms_current_mode() {
        let mut viewer = Viewer::default();
        let mut input = InputController::new();
        input.handle(InputEvent::Scroll(1.0), &mut viewer);
        assert_eq!(viewer.camera().zoom(), -4.5);
        input.handle(InputEvent::KeyDown(Key::Char('o')), &mut viewer);
        input.handle(InputEvent::Scroll(-2.0), &mut viewer);
        assert_eq!(viewer.camera().stored_zoom(ViewMode::Orthographic), -1.0);
        assert_eq!(viewer.camera().stored_zoom(ViewMode::Perspective), -4.5);
    }

    #[test]
    fn test_isometric_key() {
        let mut viewer = Viewer::default();
        let mut input = InputController::new();
        input.handle(InputEvent::KeyDown(Key::Char('o')), &mut viewer);
        input.handle(InputEvent::KeyDown(Key::Char('v')), &mut viewer);
        assert_eq!(viewer.camera().mode(), ViewMode::Perspective);
        assert_eq!(viewer.camera().rotation, RotationState::new(35.264, 45.0));
        assert!(input.is_pressed(Key::Char('v')));
    }

    #[test]
    fn test_toggle_refused_in_wireframe() {
        let mut viewer = Viewer::new(ViewerConfig::wireframe());
        let mut input = InputController::new();
        input.handle(InputEvent::KeyDown(Key::Char('o')), &mut viewer);
        assert_eq!(viewer.camera().mode(), ViewMode::Perspective);
    }

    #[test]
    fn test_left_click_queues_pick() {
        let mut viewer = Viewer::default();
        viewer.add_model(crate::geometry::Model::cube());
        let mut input = InputController::new();
        input.handle(InputEvent::MouseDown { button: MouseButton::Left, x: 415.0, y: 290.0 }, &mut viewer);
        assert!(viewer.begin_frame().highlighted.is_some());
    }
}
