use std::path::PathBuf;

use cgmath::{Point3, Vector3, Vector4};
use instant::Duration;
use lantern::{
    flow::{Command, SceneHandler},
    input::Input,
    scene::{CUBE_VERTICES, MeshSource, ObjectLayout, SceneConfig, SceneLoop, model_transform},
};
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::common::test_utils::{assert_close, assert_vec3_close};
mod common;

const FRAME: Duration = Duration::from_millis(16);

/// Clicks into the window and runs the frame that captures the cursor.
fn captured_scene(input: &mut Input) -> SceneLoop {
    let mut scene = SceneLoop::new(SceneConfig::spheres());
    input.press_button(MouseButton::Left);
    assert_eq!(scene.on_update(input, FRAME), vec![Command::CaptureCursor]);
    input.release_button(MouseButton::Left);
    input.end_frame();
    scene
}

#[test]
fn nothing_happens_without_focus() {
    let mut scene = SceneLoop::new(SceneConfig::spheres());
    let mut input = Input::new();
    input.set_focused(false);
    input.press_key(KeyCode::Escape);
    input.press_button(MouseButton::Left);
    input.move_pointer(40.0, 40.0);

    assert!(scene.on_update(&input, FRAME).is_empty());
    assert!(!scene.is_captured());
    assert_close(scene.camera().yaw().0, -90.0);
}

#[test]
fn click_captures_the_cursor() {
    let mut input = Input::new();
    let scene = captured_scene(&mut input);
    assert!(scene.is_captured());
}

#[test]
fn first_pointer_sample_after_capture_is_discarded() {
    let mut input = Input::new();
    // Motion accumulated before the click must not turn the camera.
    input.move_pointer(500.0, 300.0);
    let mut scene = captured_scene(&mut input);
    assert_close(scene.camera().yaw().0, -90.0);
    assert_close(scene.camera().pitch().0, 0.0);

    input.move_pointer(100.0, -50.0);
    assert!(scene.on_update(&input, FRAME).is_empty());
    assert_close(scene.camera().yaw().0, -70.0);
    assert_close(scene.camera().pitch().0, 10.0);
}

#[test]
fn pointer_is_ignored_while_released() {
    let mut scene = SceneLoop::new(SceneConfig::spheres());
    let mut input = Input::new();
    input.move_pointer(100.0, 100.0);
    scene.on_update(&input, FRAME);
    input.move_pointer(100.0, 100.0);
    scene.on_update(&input, FRAME);
    assert_close(scene.camera().yaw().0, -90.0);
}

#[test]
fn escape_releases_then_exits() {
    let mut input = Input::new();
    let mut scene = captured_scene(&mut input);

    input.press_key(KeyCode::Escape);
    assert_eq!(scene.on_update(&input, FRAME), vec![Command::ReleaseCursor]);
    assert!(!scene.is_captured());
    input.release_key(KeyCode::Escape);
    input.end_frame();

    input.press_key(KeyCode::Escape);
    assert_eq!(scene.on_update(&input, FRAME), vec![Command::Exit]);
}

#[test]
fn recapture_discards_the_first_sample_again() {
    let mut input = Input::new();
    let mut scene = captured_scene(&mut input);

    input.press_key(KeyCode::Escape);
    scene.on_update(&input, FRAME);
    input.release_key(KeyCode::Escape);
    input.end_frame();

    input.move_pointer(1000.0, 0.0);
    input.press_button(MouseButton::Left);
    assert_eq!(scene.on_update(&input, FRAME), vec![Command::CaptureCursor]);
    assert_close(scene.camera().yaw().0, -90.0);
}

#[test]
fn v_toggles_vsync_once_per_press() {
    let mut scene = SceneLoop::new(SceneConfig::spheres());
    let mut input = Input::new();
    input.press_key(KeyCode::KeyV);
    assert_eq!(scene.on_update(&input, FRAME), vec![Command::ToggleVsync]);
    input.end_frame();

    // still held
    input.press_key(KeyCode::KeyV);
    assert!(scene.on_update(&input, FRAME).is_empty());
}

#[test]
fn held_keys_move_the_captured_camera() {
    let mut input = Input::new();
    let mut scene = captured_scene(&mut input);
    let start = scene.camera().position();

    input.press_key(KeyCode::KeyW);
    scene.on_update(&input, Duration::from_secs(1));
    let moved = scene.camera().position() - start;
    assert_vec3_close(moved, Vector3::new(0.0, 0.0, -3.0));

    input.release_key(KeyCode::KeyW);
    input.press_key(KeyCode::Space);
    scene.on_update(&input, Duration::from_millis(500));
    assert_close(scene.camera().position().y, start.y + 1.5);
}

#[test]
fn keys_do_nothing_until_captured() {
    let mut scene = SceneLoop::new(SceneConfig::spheres());
    let mut input = Input::new();
    input.press_key(KeyCode::KeyW);
    scene.on_update(&input, Duration::from_secs(1));
    assert_eq!(scene.camera().position(), Point3::new(0.0, 5.0, 13.0));
}

#[test]
fn scroll_zooms_within_limits() {
    let mut scene = SceneLoop::new(SceneConfig::spheres());
    scene.on_scroll(10.0);
    assert_close(scene.camera().fov().0, 80.0);
    scene.on_scroll(-50.0);
    assert_close(scene.camera().fov().0, 90.0);
    scene.on_scroll(500.0);
    assert_close(scene.camera().fov().0, 1.0);
}

#[test]
fn resize_updates_the_aspect_ratio() {
    let mut scene = SceneLoop::new(SceneConfig::spheres());
    scene.on_resize(1600, 900);
    assert_close(scene.camera().aspect_ratio(), 16.0 / 9.0);
    scene.on_resize(0, 900);
    scene.on_resize(1600, 0);
    assert_close(scene.camera().aspect_ratio(), 16.0 / 9.0);
}

#[test]
fn unload_before_load_is_harmless() {
    let mut scene = SceneLoop::new(SceneConfig::orbiting_cubes());
    scene.on_unload();
    scene.on_unload();
    assert!(scene.objects().is_empty());
}

#[test]
fn orbit_rotates_about_y() {
    let mut positions = vec![Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 2.0, 0.0)];
    let orbit = ObjectLayout::Orbit {
        degrees_per_second: 90.0,
    };
    orbit.advance(&mut positions, Duration::from_secs(1));
    assert_vec3_close(positions[0], Vector3::new(0.0, 0.0, -1.0));
    assert_vec3_close(positions[1], Vector3::new(0.0, 2.0, 0.0));

    orbit.advance(&mut positions, Duration::from_millis(500));
    let half = std::f32::consts::FRAC_1_SQRT_2;
    assert_vec3_close(positions[0], Vector3::new(-half, 0.0, -half));
}

#[test]
fn ring_stays_put() {
    let mut positions = vec![Vector3::new(4.0, 0.0, 0.0)];
    ObjectLayout::Ring.advance(&mut positions, Duration::from_secs(10));
    assert_eq!(positions, vec![Vector3::new(4.0, 0.0, 0.0)]);
}

#[test]
fn model_scales_about_its_own_origin() {
    let model = model_transform(Vector3::new(1.0, 2.0, 3.0), 2.0);
    let corner = model * Vector4::new(1.0, 1.0, 1.0, 1.0);
    assert_eq!(corner, Vector4::new(3.0, 4.0, 5.0, 1.0));
    let origin = model * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert_eq!(origin, Vector4::new(1.0, 2.0, 3.0, 1.0));
}

#[test]
fn presets_share_the_ring() {
    let spheres = SceneConfig::spheres();
    assert_eq!(spheres.object_positions.len(), 8);
    assert_eq!(spheres.layout, ObjectLayout::Ring);
    assert_close(spheres.spacing, 1.5);
    assert_eq!(spheres.lamp_positions, vec![Vector3::new(0.0, 0.0, 0.0)]);
    assert_eq!(spheres.audio, None);
    assert_eq!(
        spheres.object_mesh,
        MeshSource::File("objects/sphere.obj".into())
    );

    let cubes = SceneConfig::orbiting_cubes();
    assert_eq!(cubes.object_positions, spheres.object_positions);
    assert_eq!(
        cubes.layout,
        ObjectLayout::Orbit {
            degrees_per_second: 20.0
        }
    );
    assert_eq!(cubes.object_mesh, MeshSource::Floats(&CUBE_VERTICES));
    assert_eq!(cubes.audio, Some(PathBuf::from("audio/background.ogg")));
}

#[test]
fn scene_starts_from_the_configured_camera() {
    let scene = SceneLoop::new(SceneConfig::spheres());
    assert_eq!(scene.camera().position(), Point3::new(0.0, 5.0, 13.0));
    assert_eq!(scene.positions(), SceneConfig::spheres().object_positions.as_slice());
    assert_eq!(scene.frames().get(), 0);
    assert!(scene.programs().is_empty());
    assert!(scene.lamps().is_empty());
    assert_eq!(scene.config().object_scale, 0.4);
}

#[tokio::test]
async fn mesh_sources_produce_vertices() {
    let cube = MeshSource::Floats(&CUBE_VERTICES).vertices().await.unwrap();
    assert_eq!(cube.len(), 36);

    let sphere = MeshSource::File("objects/sphere.obj".into())
        .vertices()
        .await
        .unwrap();
    assert!(!sphere.is_empty());

    let err = MeshSource::File("objects/missing.obj".into())
        .vertices()
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("missing.obj"));
}

#[test]
fn motion_while_unfocused_does_not_turn_on_return() {
    let mut input = Input::new();
    let mut scene = captured_scene(&mut input);

    input.set_focused(false);
    assert!(scene.on_update(&input, FRAME).is_empty());
    input.move_pointer(900.0, 0.0);
    scene.on_update(&input, FRAME);

    input.set_focused(true);
    scene.on_update(&input, FRAME);
    assert_close(scene.camera().yaw().0, -90.0);

    input.move_pointer(50.0, 0.0);
    scene.on_update(&input, FRAME);
    assert_close(scene.camera().yaw().0, -80.0);
}

#[test]
fn every_rendered_frame_is_counted_once() {
    let mut scene = SceneLoop::new(SceneConfig::orbiting_cubes());
    for _ in 0..3 {
        scene.advance_frame(Duration::from_millis(500));
    }
    assert_eq!(scene.frames().take(), 3);
    assert_eq!(scene.frames().get(), 0);

    // 3 × 0.5 s at 20°/s
    let expected = cgmath::Matrix3::from_angle_y(cgmath::Deg(30.0)) * Vector3::new(4.0, 0.0, 0.0);
    assert_vec3_close(scene.positions()[0], expected);
}

#[test]
fn ring_frames_count_without_moving() {
    let mut scene = SceneLoop::new(SceneConfig::spheres());
    scene.advance_frame(Duration::from_secs(2));
    assert_eq!(scene.frames().get(), 1);
    assert_eq!(scene.positions(), SceneConfig::spheres().object_positions.as_slice());
}
