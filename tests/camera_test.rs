use cgmath::{Deg, InnerSpace, Point3, Vector3};
use lantern::camera::{Camera, Direction, SPEED};

use crate::common::test_utils::{assert_close, assert_vec3_close};

mod common;

fn camera() -> Camera {
    Camera::new((0.0, 5.0, 13.0), 4.0 / 3.0)
}

#[test]
fn starts_looking_down_negative_z() {
    let camera = camera();
    assert_vec3_close(camera.front(), -Vector3::unit_z());
    assert_vec3_close(camera.up(), Vector3::unit_y());
    assert_vec3_close(camera.right(), Vector3::unit_x());
    assert_close(camera.yaw().0, -90.0);
    assert_close(camera.pitch().0, 0.0);
    assert_close(camera.fov().0, 90.0);
}

#[test]
fn pitch_and_fov_stay_clamped() {
    let mut camera = camera();
    for pitch in [-1000.0, -90.0, -89.0, -12.5, 0.0, 45.0, 89.0, 89.5, 720.0] {
        camera.set_pitch(Deg(pitch));
        let stored = camera.pitch().0;
        assert!((-89.0 - 1e-3..=89.0 + 1e-3).contains(&stored), "pitch {stored}");
    }
    for fov in [-10.0, 0.0, 0.5, 1.0, 45.0, 90.0, 91.0, 500.0] {
        camera.set_fov(Deg(fov));
        let stored = camera.fov().0;
        assert!((1.0 - 1e-3..=90.0 + 1e-3).contains(&stored), "fov {stored}");
    }
}

#[test]
fn turning_clamps_pitch() {
    let mut camera = camera();
    // pointer moved far up
    camera.turn(0.0, -10_000.0);
    assert_close(camera.pitch().0, 89.0);
    camera.turn(0.0, 20_000.0);
    assert_close(camera.pitch().0, -89.0);
}

#[test]
fn zoom_clamps_fov() {
    let mut camera = camera();
    camera.zoom(30.0);
    assert_close(camera.fov().0, 60.0);
    camera.zoom(200.0);
    assert_close(camera.fov().0, 1.0);
    camera.zoom(-500.0);
    assert_close(camera.fov().0, 90.0);
}

#[test]
fn basis_is_orthonormal_for_any_orientation() {
    let mut camera = camera();
    for yaw in (-360..=360).step_by(30) {
        for pitch in (-120..=120).step_by(15) {
            camera.set_yaw(Deg(yaw as f32));
            camera.set_pitch(Deg(pitch as f32));
            let (front, up, right) = (camera.front(), camera.up(), camera.right());
            assert_close(front.magnitude(), 1.0);
            assert_close(up.magnitude(), 1.0);
            assert_close(right.magnitude(), 1.0);
            assert_close(front.dot(up), 0.0);
            assert_close(front.dot(right), 0.0);
            assert_close(up.dot(right), 0.0);
        }
    }
}

#[test]
fn turning_right_rotates_yaw_by_sensitivity() {
    let mut camera = camera();
    camera.turn(100.0, 0.0);
    assert_close(camera.yaw().0, -70.0);
    camera.turn(0.0, 50.0);
    assert_close(camera.pitch().0, -10.0);
}

#[test]
fn view_matrix_is_pure() {
    let mut camera = camera();
    camera.turn(12.0, -7.0);
    assert_eq!(camera.view_matrix(), camera.view_matrix());
    assert_eq!(camera.projection_matrix(), camera.projection_matrix());
}

#[test]
fn forward_then_backward_returns_home() {
    let mut camera = camera();
    camera.turn(37.0, 21.0);
    let start = camera.position();
    camera.move_in(Direction::Forward, 0.75);
    assert!((camera.position() - start).magnitude() > 1.0);
    camera.move_in(Direction::Backward, 0.75);
    assert_vec3_close(camera.position() - start, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn vertical_moves_follow_world_up() {
    let mut camera = camera();
    camera.set_pitch(Deg(45.0));
    camera.move_in(Direction::Up, 1.0);
    assert_vec3_close(
        camera.position() - Point3::new(0.0, 5.0, 13.0),
        Vector3::new(0.0, SPEED, 0.0),
    );
    camera.move_in(Direction::Down, 2.0);
    assert_close(camera.position().y, 5.0 - SPEED);
}

#[test]
fn strafing_follows_right_vector() {
    let mut camera = camera();
    camera.move_in(Direction::Right, 1.0);
    assert_vec3_close(
        camera.position() - Point3::new(0.0, 5.0, 13.0),
        Vector3::new(SPEED, 0.0, 0.0),
    );
    camera.move_in(Direction::Left, 1.0);
    assert_vec3_close(
        camera.position() - Point3::new(0.0, 5.0, 13.0),
        Vector3::new(0.0, 0.0, 0.0),
    );
}

#[test]
fn projection_maps_near_and_far_to_wgpu_depth() {
    let camera = camera();
    let projection = camera.projection_matrix();
    let clip = |z: f32| {
        let p = projection * cgmath::Vector4::new(0.0, 0.0, z, 1.0);
        p.z / p.w
    };
    assert_close(clip(-lantern::camera::Z_NEAR), 0.0);
    assert_close(clip(-lantern::camera::Z_FAR), 1.0);
}
