//! The lit scene: a ring of textured objects around a lamp, a free camera
//! and the per-frame update/draw order.

use std::{path::PathBuf, rc::Rc};

use anyhow::Context as _;
use cgmath::{Deg, Matrix3, Matrix4, Point3, Vector3};
use instant::Duration;
use winit::{event::MouseButton, keyboard::KeyCode};

use crate::{
    camera::{Camera, Direction},
    context::Context,
    data_structures::{mesh::Mesh, vertex::Vertex},
    flow::{Command, SceneHandler},
    fps::{FrameCounter, PeriodicTask, spawn_fps_reporter},
    input::Input,
    pipelines::shader::ShaderProgram,
    resources,
};

pub const VERTEX_SHADER: &str = "shaders/shader.vert.wgsl";
pub const LIGHTING_SHADER: &str = "shaders/lighting.frag.wgsl";
pub const LAMP_SHADER: &str = "shaders/lamp.frag.wgsl";

const MOVEMENT_KEYS: [(KeyCode, Direction); 6] = [
    (KeyCode::KeyW, Direction::Forward),
    (KeyCode::KeyS, Direction::Backward),
    (KeyCode::KeyA, Direction::Left),
    (KeyCode::KeyD, Direction::Right),
    (KeyCode::Space, Direction::Up),
    (KeyCode::ShiftLeft, Direction::Down),
];

/// Unit cube, 36 vertices of `[position, normal, texcoord]`.
#[rustfmt::skip]
pub const CUBE_VERTICES: [f32; 288] = [
    -0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 0.0,
     0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 1.0,
    -0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 0.0,
    -0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 0.0,
     0.5, -0.5,  0.5,  0.0,  0.0,  1.0,  0.0, 1.0,
     0.5,  0.5,  0.5,  0.0,  0.0,  1.0,  1.0, 1.0,

    -0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  0.0, 0.0,
     0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  0.0, 1.0,
    -0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  1.0, 0.0,
    -0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  1.0, 0.0,
     0.5,  0.5,  0.5,  0.0,  1.0,  0.0,  0.0, 1.0,
     0.5,  0.5, -0.5,  0.0,  1.0,  0.0,  1.0, 1.0,

    -0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 1.0,
     0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 0.0,
    -0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 1.0,
    -0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 1.0,
     0.5,  0.5, -0.5,  0.0,  0.0, -1.0,  1.0, 0.0,
     0.5, -0.5, -0.5,  0.0,  0.0, -1.0,  0.0, 0.0,

    -0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 0.0,
     0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0,
    -0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0,
    -0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 0.0,
     0.5, -0.5, -0.5,  0.0, -1.0,  0.0,  0.0, 1.0,
     0.5, -0.5,  0.5,  0.0, -1.0,  0.0,  1.0, 1.0,

     0.5, -0.5,  0.5,  1.0,  0.0,  0.0,  0.0, 0.0,
     0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0,
     0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0,
     0.5,  0.5,  0.5,  1.0,  0.0,  0.0,  1.0, 0.0,
     0.5, -0.5, -0.5,  1.0,  0.0,  0.0,  0.0, 1.0,
     0.5,  0.5, -0.5,  1.0,  0.0,  0.0,  1.0, 1.0,

    -0.5, -0.5, -0.5, -1.0,  0.0,  0.0,  0.0, 0.0,
    -0.5, -0.5,  0.5, -1.0,  0.0,  0.0,  0.0, 1.0,
    -0.5,  0.5, -0.5, -1.0,  0.0,  0.0,  1.0, 0.0,
    -0.5,  0.5, -0.5, -1.0,  0.0,  0.0,  1.0, 0.0,
    -0.5, -0.5,  0.5, -1.0,  0.0,  0.0,  0.0, 1.0,
    -0.5,  0.5,  0.5, -1.0,  0.0,  0.0,  1.0, 1.0,
];

/// Where a mesh's vertices come from.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshSource {
    /// Mesh-file path relative to the asset directory.
    File(String),
    /// Flat `[position, normal, texcoord]` floats.
    Floats(&'static [f32]),
}

impl MeshSource {
    pub async fn vertices(&self) -> anyhow::Result<Vec<Vertex>> {
        match self {
            MeshSource::File(path) => resources::load_obj(path).await,
            MeshSource::Floats(data) => {
                Vertex::from_floats(data).context("invalid built-in vertex data")
            }
        }
    }
}

/// How object positions evolve over time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectLayout {
    /// Positions never move.
    Ring,
    /// Positions rotate around the Y axis.
    Orbit { degrees_per_second: f32 },
}

impl ObjectLayout {
    pub fn advance(&self, positions: &mut [Vector3<f32>], elapsed: Duration) {
        if let ObjectLayout::Orbit { degrees_per_second } = *self {
            let rotation = Matrix3::from_angle_y(Deg(degrees_per_second * elapsed.as_secs_f32()));
            for position in positions.iter_mut() {
                *position = rotation * *position;
            }
        }
    }
}

/// `translation · scale`, scaling about the object's own origin.
pub fn model_transform(translation: Vector3<f32>, scale: f32) -> Matrix4<f32> {
    Matrix4::from_translation(translation) * Matrix4::from_scale(scale)
}

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub object_mesh: MeshSource,
    /// Texture path relative to the asset directory.
    pub object_texture: Option<String>,
    pub object_positions: Vec<Vector3<f32>>,
    pub layout: ObjectLayout,
    /// Multiplies every object position.
    pub spacing: f32,
    pub object_scale: f32,
    pub lamp_mesh: MeshSource,
    /// Point light positions; a lamp is drawn at each.
    pub lamp_positions: Vec<Vector3<f32>>,
    pub lamp_scale: f32,
    pub camera_position: Point3<f32>,
    pub audio: Option<PathBuf>,
}

fn ring() -> Vec<Vector3<f32>> {
    vec![
        Vector3::new(4.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 4.0),
        Vector3::new(-4.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, -4.0),
        Vector3::new(3.0, 0.0, 3.0),
        Vector3::new(3.0, 0.0, -3.0),
        Vector3::new(-3.0, 0.0, -3.0),
        Vector3::new(-3.0, 0.0, 3.0),
    ]
}

impl SceneConfig {
    /// Eight textured spheres around a spherical lamp.
    pub fn spheres() -> Self {
        Self {
            object_mesh: MeshSource::File("objects/sphere.obj".into()),
            object_texture: Some("textures/checker.png".into()),
            object_positions: ring(),
            layout: ObjectLayout::Ring,
            spacing: 1.5,
            object_scale: 0.4,
            lamp_mesh: MeshSource::File("objects/sphere.obj".into()),
            lamp_positions: vec![Vector3::new(0.0, 0.0, 0.0)],
            lamp_scale: 0.3,
            camera_position: Point3::new(0.0, 5.0, 13.0),
            audio: None,
        }
    }

    /// Eight textured cubes orbiting a cube lamp, with background audio.
    pub fn orbiting_cubes() -> Self {
        Self {
            object_mesh: MeshSource::Floats(&CUBE_VERTICES),
            object_texture: Some("textures/crate.png".into()),
            layout: ObjectLayout::Orbit {
                degrees_per_second: 20.0,
            },
            lamp_mesh: MeshSource::Floats(&CUBE_VERTICES),
            audio: Some(PathBuf::from("audio/background.ogg")),
            ..Self::spheres()
        }
    }
}

pub struct SceneLoop {
    config: SceneConfig,
    camera: Camera,
    positions: Vec<Vector3<f32>>,
    programs: Vec<Rc<ShaderProgram>>,
    objects: Vec<Mesh>,
    lamps: Vec<Mesh>,
    frames: FrameCounter,
    fps_task: Option<PeriodicTask>,
    pending: Vec<Command>,
    captured: bool,
    /// `None` until the first pointer sample after capture.
    last_pointer: Option<(f32, f32)>,
}

impl SceneLoop {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            camera: Camera::new(config.camera_position, 800.0 / 600.0),
            positions: config.object_positions.clone(),
            config,
            programs: Vec::new(),
            objects: Vec::new(),
            lamps: Vec::new(),
            frames: FrameCounter::new(),
            fps_task: None,
            pending: Vec::new(),
            captured: false,
            last_pointer: None,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn positions(&self) -> &[Vector3<f32>] {
        &self.positions
    }

    pub fn frames(&self) -> &FrameCounter {
        &self.frames
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn objects(&self) -> &[Mesh] {
        &self.objects
    }

    pub fn lamps(&self) -> &[Mesh] {
        &self.lamps
    }

    pub fn programs(&self) -> &[Rc<ShaderProgram>] {
        &self.programs
    }

    /// Per-frame bookkeeping of the render phase: moves orbiting objects by
    /// `elapsed` and counts the frame.
    pub fn advance_frame(&mut self, elapsed: Duration) {
        self.config.layout.advance(&mut self.positions, elapsed);
        self.frames.increment();
    }

    fn steer(&mut self, input: &Input, elapsed: Duration) {
        let distance = elapsed.as_secs_f32();
        for (key, direction) in MOVEMENT_KEYS {
            if input.is_held(key) {
                self.camera.move_in(direction, distance);
            }
        }

        let pointer = input.pointer();
        if let Some((x, y)) = self.last_pointer {
            self.camera.turn(pointer.0 - x, pointer.1 - y);
        }
        self.last_pointer = Some(pointer);
    }
}

impl SceneHandler for SceneLoop {
    async fn on_load(&mut self, ctx: &Context) -> anyhow::Result<()> {
        let (vertex, lighting) = resources::load_shader(VERTEX_SHADER, LIGHTING_SHADER).await?;
        let lamp = resources::load_string(LAMP_SHADER).await?;
        let format = ctx.config.format;
        let lit_program = Rc::new(ShaderProgram::new(
            &ctx.device,
            format,
            "lighting",
            &vertex,
            &lighting,
        )?);
        let lamp_program = Rc::new(ShaderProgram::new(
            &ctx.device,
            format,
            "lamp",
            &vertex,
            &lamp,
        )?);

        let texture = match &self.config.object_texture {
            Some(path) => Some(Rc::new(
                resources::load_texture(path, &ctx.device, &ctx.queue).await?,
            )),
            None => None,
        };

        let object_vertices = self.config.object_mesh.vertices().await?;
        self.objects = (0..self.positions.len())
            .map(|i| {
                Mesh::from_vertices(
                    &ctx.device,
                    &ctx.queue,
                    &format!("object {i}"),
                    object_vertices.clone(),
                    lit_program.clone(),
                    texture.clone(),
                )
            })
            .collect();

        let lamp_vertices = self.config.lamp_mesh.vertices().await?;
        self.lamps = (0..self.config.lamp_positions.len())
            .map(|i| {
                Mesh::from_vertices(
                    &ctx.device,
                    &ctx.queue,
                    &format!("lamp {i}"),
                    lamp_vertices.clone(),
                    lamp_program.clone(),
                    None,
                )
            })
            .collect();
        self.programs = vec![lit_program, lamp_program];

        self.camera.set_aspect_ratio(ctx.aspect_ratio());
        self.fps_task = Some(spawn_fps_reporter(&ctx.runtime, self.frames.clone()));
        if let Some(audio) = &self.config.audio {
            self.pending.push(Command::PlayAudio(audio.clone()));
        }
        log::info!(
            "loaded {} objects and {} lamps",
            self.objects.len(),
            self.lamps.len()
        );
        Ok(())
    }

    fn on_update(&mut self, input: &Input, elapsed: Duration) -> Vec<Command> {
        let mut commands = std::mem::take(&mut self.pending);
        if !input.is_focused() {
            // Motion while unfocused must not turn the camera on return.
            self.last_pointer = None;
            return commands;
        }

        if input.was_pressed(KeyCode::Escape) {
            if self.captured {
                self.captured = false;
                self.last_pointer = None;
                commands.push(Command::ReleaseCursor);
            } else {
                commands.push(Command::Exit);
                return commands;
            }
        }
        if input.was_pressed(KeyCode::KeyV) {
            commands.push(Command::ToggleVsync);
        }
        if !self.captured && input.is_button_held(MouseButton::Left) {
            self.captured = true;
            self.last_pointer = None;
            commands.push(Command::CaptureCursor);
        }

        if self.captured {
            self.steer(input, elapsed);
        }
        commands
    }

    fn on_render(&mut self, ctx: &Context, pass: &mut wgpu::RenderPass<'_>, elapsed: Duration) {
        self.advance_frame(elapsed);

        for program in &self.programs {
            program.preset_lighting(&self.camera, &self.config.lamp_positions);
        }
        for (mesh, position) in self.objects.iter().zip(&self.positions) {
            let model = model_transform(*position * self.config.spacing, self.config.object_scale);
            mesh.draw(&ctx.queue, pass, &self.camera, model);
        }
        for (mesh, position) in self.lamps.iter().zip(&self.config.lamp_positions) {
            let model = model_transform(*position, self.config.lamp_scale);
            mesh.draw(&ctx.queue, pass, &self.camera, model);
        }
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.camera.set_aspect_ratio(width as f32 / height as f32);
        }
    }

    fn on_scroll(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }

    fn on_unload(&mut self) {
        for mesh in self.objects.iter_mut().chain(self.lamps.iter_mut()) {
            mesh.dispose();
        }
        for program in &self.programs {
            program.dispose();
        }
        if let Some(task) = self.fps_task.take() {
            task.cancel();
        }
        log::info!("scene unloaded");
    }
}
