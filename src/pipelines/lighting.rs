//! The fixed multi-light shading model: one material, one directional
//! light, a list of point lights and a spotlight carried by the camera.

use cgmath::{Angle, Deg, EuclideanSpace, Vector3};

use crate::{camera::Camera, data_structures::mesh::TEXTURE_UNIT, pipelines::uniforms::Uniforms};

fn grey(value: f32) -> Vector3<f32> {
    Vector3::new(value, value, value)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse_unit: i32,
    pub specular: Vector3<f32>,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_unit: TEXTURE_UNIT as i32,
            specular: grey(0.5),
            shininess: 32.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vector3<f32>,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vector3::new(-0.2, -1.0, -0.3),
            ambient: grey(0.05),
            diffuse: grey(0.4),
            specular: grey(0.5),
        }
    }
}

/// Colour terms shared by every point light; positions come per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            ambient: grey(0.05),
            diffuse: grey(0.8),
            specular: grey(1.0),
            attenuation: Attenuation::default(),
        }
    }
}

/// A flashlight placed at the camera and pointing where it looks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub attenuation: Attenuation,
    pub cut_off: Deg<f32>,
    pub outer_cut_off: Deg<f32>,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            ambient: grey(0.0),
            diffuse: grey(1.0),
            specular: grey(1.0),
            attenuation: Attenuation::default(),
            cut_off: Deg(12.5),
            outer_cut_off: Deg(17.5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lighting {
    pub material: Material,
    pub directional: DirectionalLight,
    pub point: PointLight,
    pub spot: SpotLight,
}

impl Lighting {
    /// Writes every lighting uniform. Names the program does not declare are
    /// skipped, so the lamp program only keeps what it reads.
    pub fn apply(&self, uniforms: &mut Uniforms, camera: &Camera, point_lights: &[Vector3<f32>]) {
        uniforms.set_int("material.diffuse", self.material.diffuse_unit);
        uniforms.set_vector3("material.specular", self.material.specular);
        uniforms.set_float("material.shininess", self.material.shininess);

        uniforms.set_vector3("dirLight.direction", self.directional.direction);
        uniforms.set_vector3("dirLight.ambient", self.directional.ambient);
        uniforms.set_vector3("dirLight.diffuse", self.directional.diffuse);
        uniforms.set_vector3("dirLight.specular", self.directional.specular);

        let mut count = 0;
        for (i, position) in point_lights.iter().enumerate() {
            let light = format!("pointLights[{i}]");
            if !uniforms.contains(&format!("{light}.position")) {
                if uniforms.contains("pointLightCount") {
                    log::debug!(
                        "only {i} of {} point lights fit the program",
                        point_lights.len()
                    );
                }
                break;
            }
            uniforms.set_vector3(&format!("{light}.position"), *position);
            uniforms.set_vector3(&format!("{light}.ambient"), self.point.ambient);
            uniforms.set_vector3(&format!("{light}.diffuse"), self.point.diffuse);
            uniforms.set_vector3(&format!("{light}.specular"), self.point.specular);
            set_attenuation(uniforms, &light, &self.point.attenuation);
            count += 1;
        }
        uniforms.set_int("pointLightCount", count);

        uniforms.set_vector3("spotLight.position", camera.position().to_vec());
        uniforms.set_vector3("spotLight.direction", camera.front());
        uniforms.set_vector3("spotLight.ambient", self.spot.ambient);
        uniforms.set_vector3("spotLight.diffuse", self.spot.diffuse);
        uniforms.set_vector3("spotLight.specular", self.spot.specular);
        set_attenuation(uniforms, "spotLight", &self.spot.attenuation);
        uniforms.set_float("spotLight.cutOff", self.spot.cut_off.cos());
        uniforms.set_float("spotLight.outerCutOff", self.spot.outer_cut_off.cos());
    }
}

fn set_attenuation(uniforms: &mut Uniforms, light: &str, attenuation: &Attenuation) {
    uniforms.set_float(&format!("{light}.constant"), attenuation.constant);
    uniforms.set_float(&format!("{light}.linear"), attenuation.linear);
    uniforms.set_float(&format!("{light}.quadratic"), attenuation.quadratic);
}
