use cgmath::{Deg, Point3, Vector3};
use lantern::{
    camera::Camera,
    pipelines::lighting::{Lighting, Material},
};

use crate::common::test_utils::{assert_close, assert_vec3_close, lamp_layout, lighting_uniforms};
mod common;

fn camera() -> Camera {
    Camera::new(Point3::new(0.0, 5.0, 13.0), 4.0 / 3.0)
}

#[test]
fn default_lighting_writes_the_fixed_model() {
    let mut uniforms = lighting_uniforms();
    Lighting::default().apply(&mut uniforms, &camera(), &[Vector3::new(0.0, 0.0, 0.0)]);

    assert_eq!(uniforms.get_int("material.diffuse"), Some(0));
    assert_vec3_close(
        uniforms.get_vector3("material.specular").unwrap(),
        Vector3::new(0.5, 0.5, 0.5),
    );
    assert_close(uniforms.get_float("material.shininess").unwrap(), 32.0);

    assert_vec3_close(
        uniforms.get_vector3("dirLight.direction").unwrap(),
        Vector3::new(-0.2, -1.0, -0.3),
    );
    assert_vec3_close(
        uniforms.get_vector3("dirLight.diffuse").unwrap(),
        Vector3::new(0.4, 0.4, 0.4),
    );

    assert_vec3_close(
        uniforms.get_vector3("pointLights[0].diffuse").unwrap(),
        Vector3::new(0.8, 0.8, 0.8),
    );
    assert_close(uniforms.get_float("pointLights[0].constant").unwrap(), 1.0);
    assert_close(uniforms.get_float("pointLights[0].linear").unwrap(), 0.09);
    assert_close(uniforms.get_float("pointLights[0].quadratic").unwrap(), 0.032);
    assert_eq!(uniforms.get_int("pointLightCount"), Some(1));
}

#[test]
fn spotlight_follows_the_camera() {
    let mut uniforms = lighting_uniforms();
    let mut camera = camera();
    camera.turn(50.0, -25.0);
    Lighting::default().apply(&mut uniforms, &camera, &[]);

    assert_vec3_close(
        uniforms.get_vector3("spotLight.position").unwrap(),
        Vector3::new(0.0, 5.0, 13.0),
    );
    assert_vec3_close(uniforms.get_vector3("spotLight.direction").unwrap(), camera.front());
    assert_close(
        uniforms.get_float("spotLight.cutOff").unwrap(),
        12.5f32.to_radians().cos(),
    );
    assert_close(
        uniforms.get_float("spotLight.outerCutOff").unwrap(),
        17.5f32.to_radians().cos(),
    );
    assert_vec3_close(
        uniforms.get_vector3("spotLight.ambient").unwrap(),
        Vector3::new(0.0, 0.0, 0.0),
    );
    assert_eq!(uniforms.get_int("pointLightCount"), Some(0));
}

#[test]
fn point_lights_are_capped_at_the_declared_array() {
    let mut uniforms = lighting_uniforms();
    let lamps: Vec<_> = (0..6).map(|i| Vector3::new(i as f32, 0.0, 0.0)).collect();
    Lighting::default().apply(&mut uniforms, &camera(), &lamps);

    assert_eq!(uniforms.get_int("pointLightCount"), Some(4));
    for i in 0..4 {
        assert_vec3_close(
            uniforms
                .get_vector3(&format!("pointLights[{i}].position"))
                .unwrap(),
            lamps[i],
        );
    }
}

#[test]
fn custom_values_replace_the_defaults() {
    let mut uniforms = lighting_uniforms();
    let mut lighting = Lighting {
        material: Material {
            shininess: 64.0,
            ..Material::default()
        },
        ..Lighting::default()
    };
    lighting.spot.cut_off = Deg(20.0);
    lighting.apply(&mut uniforms, &camera(), &[]);

    assert_close(uniforms.get_float("material.shininess").unwrap(), 64.0);
    assert_close(
        uniforms.get_float("spotLight.cutOff").unwrap(),
        20f32.to_radians().cos(),
    );
}

#[test]
fn programs_without_lights_are_left_alone() {
    let mut uniforms = lamp_layout().uniforms;
    Lighting::default().apply(&mut uniforms, &camera(), &[Vector3::new(1.0, 1.0, 1.0)]);

    assert_eq!(uniforms.len(), 3);
    assert!(uniforms
        .blocks()
        .iter()
        .all(|b| b.bytes().iter().all(|&byte| byte == 0)));
}
