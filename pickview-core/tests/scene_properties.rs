use nalgebra::{Point3, Vector3};
use pickview_core::metrics::scene_size;
use pickview_core::picking::pick_click;
use pickview_core::transform::project;
use pickview_core::{
    CameraState, Model, PickPolicy, ProjectionStrategy, ViewMode, Viewer, ViewerConfig, Viewport,
};

fn transformed(model: &Model, f: impl Fn(&Point3<f64>) -> Point3<f64>) -> Model {
    let mut out = Model::new();
    for p in model.vertices() {
        out.add_vertex(f(p));
    }
    for face in model.faces() {
        out.add_face(face).unwrap();
    }
    out
}

#[test]
fn cube_scenario() {
    let models = [Model::cube()];
    assert!((scene_size(&models) - 2.0 * 3f64.sqrt()).abs() < 1e-12);

    let mut camera = CameraState::new();
    assert_eq!(camera.zoom(), -5.0);
    camera.apply_rotation(12.0, -7.0);
    camera.reset_isometric();
    assert_eq!(camera.rotation.x, 35.264);
    assert_eq!(camera.rotation.y, 45.0);
    assert_eq!(camera.zoom(), -5.0);
}

#[test]
fn scene_size_is_translation_invariant_and_scales_linearly() {
    let base = [Model::cube(), Model::donut(8)];
    let size = scene_size(&base);

    let moved: Vec<Model> = base
        .iter()
        .map(|m| transformed(m, |p| *p + Vector3::new(12.5, -3.0, 100.0)))
        .collect();
    assert!((scene_size(&moved) - size).abs() < 1e-9);

    for c in [0.1, 2.0, 37.0] {
        let scaled: Vec<Model> = base.iter().map(|m| transformed(m, |p| *p * c)).collect();
        assert!((scene_size(&scaled) - c * size).abs() < 1e-9 * c * size);
    }
}

/// Click inside each front-facing face and expect that face back. The click
/// is the centroid of the face's first projected triangle; the mean of all
/// four corners of a parallelogram would sit on the split diagonal.
fn assert_front_faces_pickable(viewer: &mut Viewer) {
    let frame = viewer.begin_frame();
    let model = &viewer.models()[0];
    let mut checked = 0;

    for face_index in 0..model.faces().len() {
        let points = model.face_points(face_index);
        let center = points.iter().fold(Vector3::<f64>::zeros(), |acc, p| acc + p.coords) / points.len() as f64;
        let eye_center = frame.modelview.transform_point(&Point3::from(center));
        let eye_outward = frame.modelview.transform_vector(&center);
        let to_camera = match frame.mode {
            ViewMode::Perspective => -eye_center.coords,
            ViewMode::Orthographic => Vector3::z(),
        };
        if eye_outward.dot(&to_camera) <= 1e-6 {
            continue;
        }

        let screen: Vec<Point3<f64>> = points
            .iter()
            .map(|p| project(p, &frame.modelview, &frame.projection, &frame.viewport).unwrap())
            .collect();
        let x = (screen[0].x + screen[1].x + screen[2].x) / 3.0;
        let y = (screen[0].y + screen[1].y + screen[2].y) / 3.0;
        let click_y = frame.viewport.height as f64 - y;

        let hit = pick_click(
            viewer.models(),
            x,
            click_y,
            &frame.viewport,
            &frame.modelview,
            &frame.projection,
            PickPolicy::Nearest,
        );
        assert_eq!(hit.map(|h| h.id()), Some((0, face_index)), "face {face_index}");
        checked += 1;
    }
    assert_eq!(checked, 3);
}

#[test]
fn pick_containment_isometric_perspective() {
    let mut viewer = Viewer::default();
    viewer.add_model(Model::cube());
    viewer.camera_mut().apply_rotation(35.264, 45.0);
    assert_front_faces_pickable(&mut viewer);
}

#[test]
fn pick_containment_isometric_orthographic() {
    let mut viewer = Viewer::default();
    viewer.add_model(Model::cube());
    viewer.begin_frame();
    viewer.set_mode(ViewMode::Orthographic);
    viewer.camera_mut().apply_rotation(35.264, 45.0);
    assert_front_faces_pickable(&mut viewer);
}

#[test]
fn pick_at_projected_center_of_triangle() {
    let mut triangle = Model::new();
    triangle.add_vertex(Point3::new(-1.0, -0.5, 0.25));
    triangle.add_vertex(Point3::new(1.5, -0.75, 0.0));
    triangle.add_vertex(Point3::new(0.25, 1.25, -0.5));
    triangle.add_face(&[0, 1, 2]).unwrap();

    let mut viewer = Viewer::default();
    viewer.add_model(Model::cube());
    viewer.add_model(triangle);
    viewer.camera_mut().apply_rotation(-20.0, 30.0);
    let frame = viewer.begin_frame();

    let corners = viewer.models()[1].face_points(0);
    let screen: Vec<Point3<f64>> = corners
        .iter()
        .map(|p| project(p, &frame.modelview, &frame.projection, &frame.viewport).unwrap())
        .collect();
    let x = screen.iter().map(|p| p.x).sum::<f64>() / 3.0;
    let y = screen.iter().map(|p| p.y).sum::<f64>() / 3.0;

    // the triangle pokes through the cube; pick against it alone
    let hit = pick_click(
        &viewer.models()[1..],
        x,
        frame.viewport.height as f64 - y,
        &frame.viewport,
        &frame.modelview,
        &frame.projection,
        PickPolicy::Nearest,
    );
    assert_eq!(hit.map(|h| h.id()), Some((0, 0)));
}

#[test]
fn pick_miss_outside_every_face() {
    let mut viewer = Viewer::new(ViewerConfig {
        viewport: Viewport::new(640, 480),
        ..ViewerConfig::default()
    });
    viewer.add_model(Model::cube());
    viewer.camera_mut().apply_rotation(35.264, 45.0);
    viewer.begin_frame();

    for (x, y) in [(3.0, 3.0), (636.0, 10.0), (320.0, 470.0), (5.0, 240.0)] {
        viewer.queue_click(x, y);
        assert!(viewer.begin_frame().highlighted.is_none(), "click at {x},{y}");
    }
}

#[test]
fn mode_toggle_twice_restores_zoom_conversion() {
    let mut viewer = Viewer::default();
    viewer.add_model(Model::donut(12));
    viewer.begin_frame();
    viewer.camera_mut().apply_zoom(-1.5);
    let perspective_zoom = viewer.camera().zoom();

    viewer.toggle_mode();
    viewer.begin_frame();
    let ortho_zoom = viewer.camera().zoom();
    let restored = ViewMode::Perspective
        .strategy()
        .convert_zoom(ortho_zoom, viewer.ortho_base_size());
    assert!(((restored - perspective_zoom) / perspective_zoom).abs() < 1e-9);

    viewer.toggle_mode();
    viewer.begin_frame();
    assert_eq!(viewer.camera().mode(), ViewMode::Perspective);
    assert_eq!(viewer.camera().stored_zoom(ViewMode::Orthographic), ortho_zoom);
}

#[test]
fn redundant_set_mode_leaves_camera_unchanged() {
    let mut camera = CameraState::new();
    camera.apply_zoom(2.0);
    camera.set_mode(ViewMode::Orthographic);
    camera.apply_zoom(0.75);
    let snapshot = camera.clone();
    camera.set_mode(ViewMode::Orthographic);
    assert_eq!(camera, snapshot);
}
