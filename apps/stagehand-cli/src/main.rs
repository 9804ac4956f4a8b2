use clap::{Parser, Subcommand};
use glam::Vec3;
use stagehand_author::Editor;
use stagehand_kernel::Scene;
use stagehand_persist::{JsonSceneSerializer, SceneSerializer};
use stagehand_scenes::{
    Broadcaster, LoadOutcome, ResetSignal, SceneManager, SceneManagerConfig, TracingConsole,
};
use stagehand_tools::SceneInspector;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type Manager = SceneManager<JsonSceneSerializer, Broadcaster, TracingConsole>;

#[derive(Parser)]
#[command(name = "stagehand", about = "CLI tool for stagehand scene projects")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Project root holding the scene registry
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered scenes in load order
    List,
    /// Register or re-point a scene name
    Register {
        name: String,
        /// Document path, relative to the project root
        path: String,
    },
    /// Create a demo scene document and register it
    New {
        name: String,
        /// Document path; defaults to scenes/<name>.scene
        #[arg(long)]
        path: Option<String>,
        /// Number of branches under the root
        #[arg(short, long, default_value = "2")]
        width: usize,
        /// Length of each branch
        #[arg(short, long, default_value = "2")]
        depth: usize,
    },
    /// Load a scene (the first registered one if no name is given) and print its hierarchy
    Load { name: Option<String> },
    /// Load a scene and print one node's details
    Inspect { name: String, id: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut manager = start(&cli.project)?;

    match cli.command {
        Commands::List => {
            if manager.registry().is_empty() {
                println!("no scenes registered in {}", manager.registry().path().display());
            }
            for (i, (name, path)) in manager.registry().iter().enumerate() {
                let marker = if i == 0 { "*" } else { " " };
                println!("{marker} {name:<24} {path}");
            }
        }
        Commands::Register { name, path } => {
            manager.register_scene_path(&name, &path)?;
            println!("registered {name} -> {path}");
        }
        Commands::New {
            name,
            path,
            width,
            depth,
        } => {
            let scene = demo_scene(&name, width, depth)?;
            let path = path.unwrap_or_else(|| format!("scenes/{}.scene", name.to_lowercase()));
            manager.serializer().serialize(Path::new(&path), &scene)?;
            manager.register_scene_path(&name, &path)?;
            println!("created {name} ({} nodes) at {path}", scene.len());
        }
        Commands::Load { name } => {
            let outcome = match name {
                Some(name) => manager.load_by_name(&name),
                None => manager.load_default(),
            };
            let scene = published(&manager, outcome)?;
            println!("{}", SceneInspector::summary(scene));
            print!("{}", SceneInspector::render_tree(scene));
        }
        Commands::Inspect { name, id } => {
            let outcome = manager.load_by_name(&name);
            let scene = published(&manager, outcome)?;
            match SceneInspector::inspect_node(scene, &id) {
                Some(info) => println!("{info}"),
                None => anyhow::bail!("no node {id} in scene {name}"),
            }
        }
    }

    Ok(())
}

fn start(project: &Path) -> anyhow::Result<Manager> {
    let mut bus = Broadcaster::new();
    bus.subscribe(|signal: &ResetSignal| {
        tracing::debug!(outgoing = ?signal.outgoing, "collaborators reset");
    });
    let manager = SceneManager::init(
        &SceneManagerConfig::new(project),
        JsonSceneSerializer::new(project),
        bus,
        TracingConsole,
    )?;
    Ok(manager)
}

fn published(manager: &Manager, outcome: LoadOutcome) -> anyhow::Result<&Scene> {
    match outcome {
        LoadOutcome::Published { .. } => manager
            .active()
            .ok_or_else(|| anyhow::anyhow!("published scene missing from slot")),
        LoadOutcome::Failed { requested, reason } => {
            anyhow::bail!("scene {requested} failed to load: {reason}")
        }
    }
}

/// A root with `width` branches, each a parent chain `depth` nodes long.
fn demo_scene(name: &str, width: usize, depth: usize) -> anyhow::Result<Scene> {
    let mut scene = Scene::new(name);
    let mut editor = Editor::new();
    let root = editor.spawn(&mut scene, "root", None)?;
    for branch in 0..width {
        let mut parent = root.clone();
        for level in 0..depth {
            let id = editor.spawn(
                &mut scene,
                &format!("branch{branch}.{level}"),
                Some(parent.as_str()),
            )?;
            if let Some(node) = scene
                .position_of(id.as_str())
                .and_then(|i| scene.node_mut(i))
            {
                node.transform_mut().position =
                    Vec3::new(branch as f32 * 2.0, level as f32 + 1.0, 0.0);
            }
            parent = id;
        }
    }
    Ok(scene)
}
