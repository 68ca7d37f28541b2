use primitive_viewer::camera::{CameraInput, MoveKey};
use primitive_viewer::config::ViewerConfig;
use primitive_viewer::mesh::{CylinderParams, ShapeKind, SphereParams};
use primitive_viewer::render::{GpuBackend, NullGpuBackend, Renderer};
use primitive_viewer::scene::SceneController;
use primitive_viewer::texture::{TextureKind, TextureLibrary};
use std::io::Write;

fn renderer_for(config: &ViewerConfig) -> Renderer {
    Renderer::new(
        Box::new(NullGpuBackend::new([640, 480])),
        TextureLibrary::new(config.asset_dir.clone()),
    )
}

#[test]
fn config_file_drives_initial_scene() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("viewer.json");
    let mut file = std::fs::File::create(&path).expect("create config");
    write!(
        file,
        r#"{{
            "shape": "Sphere",
            "texture": "Metal",
            "sphere": {{ "latitude_segments": 6, "longitude_segments": 5 }},
            "asset_dir": "{}"
        }}"#,
        dir.path().display()
    )
    .expect("write config");

    let config = ViewerConfig::load_or_default(Some(&path)).expect("config loads");
    let mut scene = SceneController::new(&config);
    let mut renderer = renderer_for(&config);

    renderer.render(0.016, &mut scene).expect("first frame");

    assert_eq!(scene.shape(), ShapeKind::Sphere);
    assert_eq!(scene.texture(), TextureKind::Metal);
    let stats = renderer.mesh_stats();
    assert_eq!(stats.vertices, 2 + 5 * 6);
    assert_eq!(stats.triangles, 2 * 5 * 5);
}

#[test]
fn editing_parameters_regenerates_once_per_change() {
    let config = ViewerConfig::default();
    let mut scene = SceneController::new(&config);
    let mut renderer = renderer_for(&config);

    scene.select_shape(ShapeKind::Cylinder);
    renderer.render(0.016, &mut scene).expect("frame");
    assert_eq!(renderer.mesh_stats().triangles, 4 * 16);

    scene.set_cylinder(CylinderParams {
        segments: 8,
        ..scene.cylinder()
    });
    for _ in 0..3 {
        renderer.render(0.016, &mut scene).expect("frame");
    }
    assert_eq!(renderer.mesh_stats().triangles, 32);
    assert_eq!(renderer.mesh_slot().upload_count(), 2);
}

#[test]
fn out_of_range_edits_are_clamped_before_generation() {
    let mut scene = SceneController::default();
    let mut renderer = renderer_for(&ViewerConfig::default());

    scene.select_shape(ShapeKind::Sphere);
    scene.set_sphere(SphereParams {
        radius: 50.0,
        latitude_segments: 1,
        longitude_segments: 1000,
    });
    renderer.render(0.016, &mut scene).expect("frame");

    let sphere = scene.sphere();
    assert_eq!(sphere.radius, 2.0);
    assert_eq!(sphere.latitude_segments, 4);
    assert_eq!(sphere.longitude_segments, 100);
    assert!(renderer.mesh_slot().last_error().is_none());
}

#[test]
fn camera_moves_only_while_dragging() {
    let mut scene = SceneController::default();
    let mut renderer = renderer_for(&ViewerConfig::default());
    let start = scene.camera.position;

    scene.handle_camera_input(CameraInput::Key {
        key: MoveKey::Forward,
        pressed: true,
    });
    renderer.render(0.5, &mut scene).expect("frame");
    assert_eq!(scene.camera.position, start);

    scene.handle_camera_input(CameraInput::DragStart { x: 10.0, y: 10.0 });
    renderer.render(0.5, &mut scene).expect("frame");
    assert!(scene.camera.position.z < start.z);

    scene.handle_camera_input(CameraInput::DragEnd);
    let stopped = scene.camera.position;
    renderer.render(0.5, &mut scene).expect("frame");
    assert_eq!(scene.camera.position, stopped);

    scene.reset_camera();
    assert_eq!(scene.camera.position, start);
}

#[test]
fn failed_upload_is_retried_on_next_frame() {
    let mut backend = NullGpuBackend::default();
    backend.fail_next_uploads(1);
    let mut renderer = Renderer::new(Box::new(backend), TextureLibrary::default());
    let mut scene = SceneController::default();

    assert!(renderer.render(0.016, &mut scene).is_err());
    assert_eq!(renderer.frame_index(), 0);

    renderer.render(0.016, &mut scene).expect("retry succeeds");
    assert_eq!(renderer.frame_index(), 1);
    assert_eq!(renderer.mesh_stats().vertices, 24);
}

#[test]
fn resize_updates_viewport() {
    let mut renderer = renderer_for(&ViewerConfig::default());
    renderer.backend_mut().resize([1024, 256]);
    assert_eq!(renderer.backend().viewport(), [1024, 256]);
    assert_eq!(renderer.backend_label(), "Null GPU Backend");
}
