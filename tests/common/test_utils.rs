use cgmath::{InnerSpace, Vector3};
use lantern::pipelines::{reflect::ProgramLayout, uniforms::Uniforms};

pub const EPSILON: f32 = 1e-4;

pub const VERTEX_SHADER: &str = include_str!("../../assets/shaders/shader.vert.wgsl");
pub const LIGHTING_SHADER: &str = include_str!("../../assets/shaders/lighting.frag.wgsl");
pub const LAMP_SHADER: &str = include_str!("../../assets/shaders/lamp.frag.wgsl");

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

pub fn assert_vec3_close(actual: Vector3<f32>, expected: Vector3<f32>) {
    assert!(
        (actual - expected).magnitude() < EPSILON,
        "expected {expected:?}, got {actual:?}"
    );
}

pub fn lighting_layout() -> ProgramLayout {
    ProgramLayout::from_sources("lighting", VERTEX_SHADER, LIGHTING_SHADER)
        .expect("the shipped lighting program links")
}

pub fn lamp_layout() -> ProgramLayout {
    ProgramLayout::from_sources("lamp", VERTEX_SHADER, LAMP_SHADER)
        .expect("the shipped lamp program links")
}

pub fn lighting_uniforms() -> Uniforms {
    lighting_layout().uniforms
}

/// Headless device for GPU tests. Returns `None` when no adapter exists.
#[cfg(feature = "integration-tests")]
pub fn headless_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    futures::executor::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("test device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
            })
            .await
            .ok()
    })
}
