//! Linked shading programs.
//!
//! A [`ShaderProgram`] is built from one vertex and one fragment WGSL source.
//! Construction compiles and links both stages, resolves every uniform name
//! once, and builds the render pipeline. Uniform values are staged on the
//! host and reach the GPU when a mesh using the program draws.

use std::cell::{Ref, RefCell};

use cgmath::{Matrix4, Vector3};

use crate::{
    camera::Camera,
    data_structures::{texture::Texture, vertex::Vertex},
    pipelines::{
        lighting::Lighting,
        reflect::{FRAGMENT_ENTRY, ProgramLayout, ResourceKind, Stage, VERTEX_ENTRY},
        uniforms::Uniforms,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to compile the {stage} stage of `{label}`:\n{log}")]
    Compile {
        label: String,
        stage: Stage,
        log: String,
    },
    #[error("failed to link `{label}`: {log}")]
    Link { label: String, log: String },
}

#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    layout: ProgramLayout,
    uniforms: RefCell<Uniforms>,
    attributes: Vec<wgpu::VertexAttribute>,
    bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pipeline: RefCell<Option<wgpu::RenderPipeline>>,
}

impl ShaderProgram {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let mut layout = ProgramLayout::from_sources(label, vertex_source, fragment_source)?;
        let uniforms = std::mem::take(&mut layout.uniforms);
        log::debug!(
            "linked `{}`: {} uniforms in {} blocks, {} bindings",
            label,
            uniforms.len(),
            uniforms.blocks().len(),
            layout.resources.len()
        );

        let attributes = resolve_attributes(label, &layout);
        let bind_group_layouts = mk_bind_group_layouts(device, label, &layout);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &bind_group_layouts.iter().collect::<Vec<_>>(),
            push_constant_ranges: &[],
        });
        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} vertex stage")),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} fragment stage")),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });
        let pipeline = mk_render_pipeline(
            device,
            label,
            &pipeline_layout,
            color_format,
            Some(Texture::DEPTH_FORMAT),
            &[Vertex::desc(&attributes)],
            &vertex,
            &fragment,
        );

        Ok(Self {
            label: label.to_string(),
            layout,
            uniforms: RefCell::new(uniforms),
            attributes,
            bind_group_layouts,
            pipeline: RefCell::new(Some(pipeline)),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Makes this program current. Returns `false` once the program is
    /// disposed, in which case nothing should be drawn with it.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) -> bool {
        match self.pipeline.borrow().as_ref() {
            Some(pipeline) => {
                pass.set_pipeline(pipeline);
                true
            }
            None => {
                log::warn!("program `{}` is disposed", self.label);
                false
            }
        }
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.uniforms.borrow_mut().set_int(name, value);
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.uniforms.borrow_mut().set_float(name, value);
    }

    pub fn set_vector3(&self, name: &str, value: Vector3<f32>) {
        self.uniforms.borrow_mut().set_vector3(name, value);
    }

    pub fn set_matrix4(&self, name: &str, value: Matrix4<f32>) {
        self.uniforms.borrow_mut().set_matrix4(name, value);
    }

    /// Staged uniform values, as the next draw will upload them.
    pub fn uniforms(&self) -> Ref<'_, Uniforms> {
        self.uniforms.borrow()
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.layout.attributes.get(name).copied()
    }

    pub fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    pub fn bind_group_layouts(&self) -> &[wgpu::BindGroupLayout] {
        &self.bind_group_layouts
    }

    pub fn vertex_attributes(&self) -> &[wgpu::VertexAttribute] {
        &self.attributes
    }

    /// Uploads the default lighting model.
    pub fn preset_lighting(&self, camera: &Camera, point_lights: &[Vector3<f32>]) {
        self.preset_lighting_with(&Lighting::default(), camera, point_lights);
    }

    pub fn preset_lighting_with(
        &self,
        lighting: &Lighting,
        camera: &Camera,
        point_lights: &[Vector3<f32>],
    ) {
        lighting.apply(&mut self.uniforms.borrow_mut(), camera, point_lights);
    }

    pub fn is_disposed(&self) -> bool {
        self.pipeline.borrow().is_none()
    }

    pub fn dispose(&self) {
        if self.pipeline.borrow_mut().take().is_some() {
            log::debug!("disposed program `{}`", self.label);
        }
    }
}

/// Matches the vertex layout against the inputs the vertex stage declares.
fn resolve_attributes(label: &str, layout: &ProgramLayout) -> Vec<wgpu::VertexAttribute> {
    Vertex::ATTRIBUTES
        .iter()
        .filter_map(|(name, offset, format)| match layout.attributes.get(*name) {
            Some(location) => Some(wgpu::VertexAttribute {
                format: *format,
                offset: *offset,
                shader_location: *location,
            }),
            None => {
                log::debug!("`{label}` does not read vertex input `{name}`");
                None
            }
        })
        .collect()
}

fn mk_bind_group_layouts(
    device: &wgpu::Device,
    label: &str,
    layout: &ProgramLayout,
) -> Vec<wgpu::BindGroupLayout> {
    (0..layout.group_count())
        .map(|group| {
            let entries: Vec<_> = layout
                .resources_in(group)
                .map(|resource| wgpu::BindGroupLayoutEntry {
                    binding: resource.binding,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: match resource.kind {
                        ResourceKind::Uniform { .. } => wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        ResourceKind::Texture { .. } => wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        ResourceKind::Sampler { .. } => {
                            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering)
                        }
                    },
                    count: None,
                })
                .collect();
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label} group {group}")),
                entries: &entries,
            })
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    vertex: &wgpu::ShaderModule,
    fragment: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: vertex,
            entry_point: Some(VERTEX_ENTRY),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: fragment,
            entry_point: Some(FRAGMENT_ENTRY),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
