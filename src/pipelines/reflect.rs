//! Stage compilation and program linking on top of `naga`.
//!
//! Compiling parses and validates one WGSL stage. Linking checks that both
//! entry points exist and that the two stages agree on every shared
//! binding, then enumerates all uniforms, textures, samplers and vertex
//! inputs once. None of this touches the GPU.

use std::{collections::HashMap, fmt};

use naga::{
    AddressSpace, ArraySize, Binding, ImageClass, ImageDimension, Module, Scalar, ScalarKind,
    TypeInner, VectorSize,
    valid::{Capabilities, ValidationFlags, Validator},
};

use crate::pipelines::{
    shader::ShaderError,
    uniforms::{UniformKind, UniformLocation, Uniforms},
};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn entry_point(self) -> &'static str {
        match self {
            Stage::Vertex => VERTEX_ENTRY,
            Stage::Fragment => FRAGMENT_ENTRY,
        }
    }

    fn naga(self) -> naga::ShaderStage {
        match self {
            Stage::Vertex => naga::ShaderStage::Vertex,
            Stage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// A parsed and validated stage.
#[derive(Debug)]
pub struct CompiledStage {
    pub stage: Stage,
    pub module: Module,
}

pub fn compile_stage(label: &str, stage: Stage, source: &str) -> Result<CompiledStage, ShaderError> {
    let failed = |log: String| ShaderError::Compile {
        label: label.to_string(),
        stage,
        log,
    };
    let module = naga::front::wgsl::parse_str(source).map_err(|e| failed(e.emit_to_string(source)))?;
    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| failed(e.emit_to_string(source)))?;
    Ok(CompiledStage { stage, module })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Uniform { block: usize },
    /// A float 2D texture; `unit` counts textures in binding order.
    Texture { unit: usize },
    /// A filtering sampler; `unit` counts samplers in binding order.
    Sampler { unit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
}

/// What a stage declares at one binding; both stages must agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Declaration {
    Uniform { size: u32 },
    Texture,
    Sampler,
}

#[derive(Debug, Default)]
pub struct ProgramLayout {
    /// Sorted by `(group, binding)`.
    pub resources: Vec<Resource>,
    pub uniforms: Uniforms,
    /// Vertex input name to `@location`.
    pub attributes: HashMap<String, u32>,
}

impl ProgramLayout {
    /// Compiles both stages and links them.
    pub fn from_sources(label: &str, vertex: &str, fragment: &str) -> Result<Self, ShaderError> {
        let vertex = compile_stage(label, Stage::Vertex, vertex)?;
        let fragment = compile_stage(label, Stage::Fragment, fragment)?;
        Self::link(label, &vertex, &fragment)
    }

    pub fn link(
        label: &str,
        vertex: &CompiledStage,
        fragment: &CompiledStage,
    ) -> Result<Self, ShaderError> {
        let failed = |log: String| ShaderError::Link {
            label: label.to_string(),
            log,
        };
        for stage in [vertex, fragment] {
            let entry = stage.stage.entry_point();
            let found = stage
                .module
                .entry_points
                .iter()
                .any(|ep| ep.name == entry && ep.stage == stage.stage.naga());
            if !found {
                return Err(failed(format!(
                    "{} stage has no `{}` entry point",
                    stage.stage, entry
                )));
            }
        }

        let mut declared: Vec<(u32, u32, String, Declaration, Stage)> = Vec::new();
        let mut layout = ProgramLayout::default();
        for stage in [vertex, fragment] {
            let module = &stage.module;
            for (_, var) in module.global_variables.iter() {
                let Some(binding) = &var.binding else {
                    continue;
                };
                let name = var.name.clone().unwrap_or_default();
                let declaration = declaration(module, var).map_err(|log| {
                    failed(format!("{} stage binding `{name}`: {log}", stage.stage))
                })?;
                if let Some((_, _, other_name, other, other_stage)) = declared
                    .iter()
                    .find(|(g, b, ..)| *g == binding.group && *b == binding.binding)
                {
                    if *other_name != name || *other != declaration {
                        return Err(failed(format!(
                            "@group({}) @binding({}) is `{other_name}` ({other:?}) in the {other_stage} stage but `{name}` ({declaration:?}) in the {} stage",
                            binding.group, binding.binding, stage.stage
                        )));
                    }
                    continue;
                }
                if let Declaration::Uniform { size } = declaration {
                    let block =
                        layout
                            .uniforms
                            .add_block(&name, binding.group, binding.binding, size as usize);
                    flatten(module, var.ty, name.clone(), 0, block, &mut layout.uniforms);
                }
                declared.push((binding.group, binding.binding, name, declaration, stage.stage));
            }
        }

        declared.sort_by_key(|(group, binding, ..)| (*group, *binding));
        let (mut textures, mut samplers, mut blocks) = (0, 0, HashMap::new());
        for (index, block) in layout.uniforms.blocks().iter().enumerate() {
            blocks.insert((block.group, block.binding), index);
        }
        for (group, binding, name, declaration, _) in declared {
            let kind = match declaration {
                Declaration::Uniform { .. } => ResourceKind::Uniform {
                    block: blocks[&(group, binding)],
                },
                Declaration::Texture => {
                    textures += 1;
                    ResourceKind::Texture { unit: textures - 1 }
                }
                Declaration::Sampler => {
                    samplers += 1;
                    ResourceKind::Sampler { unit: samplers - 1 }
                }
            };
            layout.resources.push(Resource {
                name,
                group,
                binding,
                kind,
            });
        }

        layout.attributes = vertex_inputs(&vertex.module);
        Ok(layout)
    }

    /// Number of bind groups the pipeline layout needs (gaps included).
    pub fn group_count(&self) -> u32 {
        self.resources
            .iter()
            .map(|r| r.group + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn resources_in(&self, group: u32) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(move |r| r.group == group)
    }

    pub fn has_textures(&self) -> bool {
        self.resources.iter().any(|r| {
            matches!(
                r.kind,
                ResourceKind::Texture { .. } | ResourceKind::Sampler { .. }
            )
        })
    }
}

fn declaration(module: &Module, var: &naga::GlobalVariable) -> Result<Declaration, String> {
    let inner = &module.types[var.ty].inner;
    match (var.space, inner) {
        (AddressSpace::Uniform, inner) => Ok(Declaration::Uniform {
            size: inner.size(module.to_ctx()),
        }),
        (
            AddressSpace::Handle,
            TypeInner::Image {
                dim: ImageDimension::D2,
                arrayed: false,
                class:
                    ImageClass::Sampled {
                        kind: ScalarKind::Float,
                        multi: false,
                    },
            },
        ) => Ok(Declaration::Texture),
        (AddressSpace::Handle, TypeInner::Sampler { comparison: false }) => Ok(Declaration::Sampler),
        (space, _) => Err(format!(
            "only uniforms, float 2D textures and filtering samplers are supported, found {space:?}"
        )),
    }
}

/// Registers every leaf of `ty` under its GLSL-style name.
fn flatten(
    module: &Module,
    ty: naga::Handle<naga::Type>,
    name: String,
    offset: u32,
    block: usize,
    uniforms: &mut Uniforms,
) {
    match &module.types[ty].inner {
        TypeInner::Struct { members, .. } => {
            for member in members {
                let member_name = member.name.as_deref().unwrap_or_default();
                flatten(
                    module,
                    member.ty,
                    format!("{name}.{member_name}"),
                    offset + member.offset,
                    block,
                    uniforms,
                );
            }
        }
        TypeInner::Array {
            base,
            size: ArraySize::Constant(count),
            stride,
        } => {
            for i in 0..count.get() {
                flatten(
                    module,
                    *base,
                    format!("{name}[{i}]"),
                    offset + i * stride,
                    block,
                    uniforms,
                );
            }
        }
        inner => uniforms.insert(
            name,
            UniformLocation {
                block,
                offset: offset as usize,
                kind: leaf_kind(inner),
            },
        ),
    }
}

fn leaf_kind(inner: &TypeInner) -> UniformKind {
    match inner {
        TypeInner::Scalar(scalar) if *scalar == Scalar::I32 => UniformKind::Int,
        TypeInner::Scalar(scalar) if *scalar == Scalar::F32 => UniformKind::Float,
        TypeInner::Vector {
            size: VectorSize::Tri,
            scalar,
        } if *scalar == Scalar::F32 => UniformKind::Vec3,
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar,
        } if *scalar == Scalar::F32 => UniformKind::Mat4,
        _ => UniformKind::Other,
    }
}

/// `@location` inputs of the vertex entry point, plain or inside a struct.
fn vertex_inputs(module: &Module) -> HashMap<String, u32> {
    let mut inputs = HashMap::new();
    let Some(entry) = module
        .entry_points
        .iter()
        .find(|ep| ep.name == VERTEX_ENTRY && ep.stage == naga::ShaderStage::Vertex)
    else {
        return inputs;
    };
    for argument in &entry.function.arguments {
        match (&argument.binding, &module.types[argument.ty].inner) {
            (Some(Binding::Location { location, .. }), _) => {
                if let Some(name) = &argument.name {
                    inputs.insert(name.clone(), *location);
                }
            }
            (None, TypeInner::Struct { members, .. }) => {
                for member in members {
                    if let (Some(Binding::Location { location, .. }), Some(name)) =
                        (&member.binding, &member.name)
                    {
                        inputs.insert(name.clone(), *location);
                    }
                }
            }
            _ => (),
        }
    }
    inputs
}
