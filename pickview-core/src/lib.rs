//! PickView core library: camera state, projection normalization and
//! ray-based face picking for a small interactive polyhedron viewer.
//!
//! Nothing here touches a window or a graphics API. A front end feeds input
//! through [`InputController`], calls [`Viewer::begin_frame`] once per frame
//! and draws with the matrices it returns.

pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod metrics;
pub mod picking;
pub mod projection;
pub mod stl;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use camera::{CameraState, ViewMode};
pub use config::ViewerConfig;
pub use error::{GeometryError, StlError};
pub use geometry::Model;
pub use input::{InputController, InputEvent, Key, MouseButton};
pub use picking::{FaceHit, PickPolicy, Ray};
pub use projection::{NormalizationParams, Orthographic, Perspective, ProjectionStrategy};
pub use transform::{RotationState, Transform, Viewport};
pub use viewer::{Frame, Viewer};
