use lantern::{
    flow,
    scene::{SceneConfig, SceneLoop},
};

fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1).as_deref() {
        None | Some("spheres") => SceneConfig::spheres(),
        Some("cubes") => SceneConfig::orbiting_cubes(),
        Some(other) => anyhow::bail!("unknown scene `{other}`, expected `spheres` or `cubes`"),
    };
    flow::run(SceneLoop::new(config))
}
