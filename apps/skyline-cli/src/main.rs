use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use skyline_input::InputCommand;
use skyline_kernel::plane::MAX_EXTENT;
use skyline_kernel::{Scene, Transition, ViewerState, apply};
use skyline_render::{CityMesh, DebugTextRenderer, RenderView, Renderer, Theme};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Textured,
    Flat,
}

impl ThemeArg {
    fn theme(self) -> Theme {
        match self {
            ThemeArg::Textured => Theme::textured(),
            ThemeArg::Flat => Theme::flat(),
        }
    }
}

#[derive(Parser)]
#[command(name = "skyline-cli", about = "Headless tools for the skyline city renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Generate a city layout and print it
    Layout {
        /// City extent in world units
        #[arg(short, long, default_value = "196", value_parser = extent_parser())]
        extent: i32,
        /// RNG seed
        #[arg(short, long, default_value = "1")]
        seed: u64,
        /// Emit the scene as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay viewer commands and dump the resulting frame
    Frame {
        #[arg(long, value_enum, default_value = "textured")]
        theme: ThemeArg,
        /// City extent (defaults to the theme's)
        #[arg(short, long, value_parser = extent_parser())]
        extent: Option<i32>,
        #[arg(short, long, default_value = "1")]
        seed: u64,
        /// JSON array of commands, e.g. '["MoveForward","PanLeft"]'
        #[arg(short, long, default_value = "[]")]
        commands: String,
        #[arg(long, default_value = "1280")]
        width: u32,
        #[arg(long, default_value = "720")]
        height: u32,
        /// Buildings to list
        #[arg(long, default_value = "8")]
        max_buildings: usize,
    },
}

fn extent_parser() -> clap::builder::RangedI64ValueParser<i32> {
    clap::value_parser!(i32).range(..=i64::from(MAX_EXTENT))
}

/// Fold commands through the viewer. Stops at the first quit.
fn replay(mut viewer: ViewerState, commands: &[InputCommand]) -> (ViewerState, usize) {
    for (applied, &command) in commands.iter().enumerate() {
        match apply(viewer, command) {
            Transition::Continue(next) => viewer = next,
            Transition::Quit => {
                tracing::info!(applied, "quit command ends replay");
                return (viewer, applied);
            }
        }
    }
    (viewer, commands.len())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("skyline-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: {}", skyline_kernel::crate_info());
            println!("input: {}", skyline_input::crate_info());
            println!("assets: {}", skyline_assets::crate_info());
            println!("render: {}", skyline_render::crate_info());
        }
        Commands::Layout { extent, seed, json } => {
            let scene = Scene::generate(extent, seed);
            if json {
                println!("{}", serde_json::to_string_pretty(&scene)?);
            } else {
                println!(
                    "City: extent={}, seed={seed}, buildings={}",
                    scene.plane.extent,
                    scene.building_count()
                );
                if let Some(tallest) = scene.tallest() {
                    println!(
                        "Tallest: x={} z={} height={}",
                        tallest.grid_x, tallest.grid_z, tallest.height
                    );
                }
                let above = scene
                    .buildings
                    .iter()
                    .filter(|b| b.exceeds_short_range())
                    .count();
                println!("Above short range (height > 7): {above}");
                let mesh = CityMesh::build(&scene, &Theme::default());
                println!("Building vertices: {}", mesh.building_vertex_count());
            }
        }
        Commands::Frame {
            theme,
            extent,
            seed,
            commands,
            width,
            height,
            max_buildings,
        } => {
            let theme = theme.theme();
            let extent = extent.unwrap_or(theme.extent);
            let commands: Vec<InputCommand> =
                serde_json::from_str(&commands).context("parsing --commands")?;

            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let scene = Scene::from_rng(extent, &mut rng);
            let viewer = theme
                .initial_viewer(&mut rng)
                .context("placing camera and light")?;
            let (viewer, applied) = replay(viewer, &commands);
            tracing::debug!(applied, total = commands.len(), "commands replayed");

            let renderer = DebugTextRenderer { max_buildings };
            print!(
                "{}",
                renderer.render(&scene, &RenderView::new(&viewer, width, height))
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer() -> ViewerState {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        Theme::flat().initial_viewer(&mut rng).unwrap()
    }

    #[test]
    fn replay_stops_at_quit() {
        let start = viewer();
        let commands = [
            InputCommand::MoveForward,
            InputCommand::Quit,
            InputCommand::MoveForward,
        ];
        let (end, applied) = replay(start, &commands);
        assert_eq!(applied, 1);
        let mut once = start;
        once.step(InputCommand::MoveForward);
        assert_eq!(end.camera.position(), once.camera.position());
    }

    #[test]
    fn extent_above_limit_is_rejected() {
        let too_big = (MAX_EXTENT + 1).to_string();
        assert!(Cli::try_parse_from(["skyline-cli", "layout", "--extent", &too_big]).is_err());
        let ok = MAX_EXTENT.to_string();
        assert!(Cli::try_parse_from(["skyline-cli", "layout", "--extent", &ok]).is_ok());
        assert!(Cli::try_parse_from(["skyline-cli", "layout", "--extent=-5"]).is_ok());
    }

    #[test]
    fn commands_parse_from_json() {
        let parsed: Vec<InputCommand> =
            serde_json::from_str(r#"["PanLeft", "ToggleLight"]"#).unwrap();
        assert_eq!(parsed, vec![InputCommand::PanLeft, InputCommand::ToggleLight]);
    }
}
