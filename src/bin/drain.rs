//! Headless drainage run: load a structure, let a planner pick rotations,
//! simulate each one and log the progress.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use gravity_drain::grid::levels;
use gravity_drain::{DrainConfig, Grid, PlannerKind, Simulation};

#[derive(Parser, Debug)]
#[command(name = "drain", about = "Plan rotations that drain fluid out of a voxel structure")]
struct Args {
    /// Built-in level, by name or index
    #[arg(long, short = 'l', default_value = "0", conflicts_with = "map")]
    level: String,

    /// ASCII map file ('o' solid, 'w' fluid, '.' empty)
    #[arg(long, short = 'm', value_name = "PATH")]
    map: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// random, mcts or gbfs
    #[arg(long, short = 'p', default_value = "mcts")]
    planner: PlannerKind,

    /// Search steps before each decision
    #[arg(long, default_value_t = 50)]
    search_steps: usize,

    /// Rotations to commit before giving up
    #[arg(long, default_value_t = 10)]
    decisions: usize,

    /// Print the planner's search tree after each decision
    #[arg(long)]
    tree: bool,

    /// Override both simulation and planner seeds
    #[arg(long)]
    seed: Option<u64>,

    /// List the built-in levels and exit
    #[arg(long)]
    list_levels: bool,
}

fn load_grid(args: &Args) -> anyhow::Result<Grid> {
    if let Some(path) = &args.map {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading map {}", path.display()))?;
        return Grid::from_ascii(&source).with_context(|| format!("parsing map {}", path.display()));
    }
    let index = match args.level.parse::<usize>() {
        Ok(index) => index,
        Err(_) => match levels::find(&args.level) {
            Some(index) => index,
            None => bail!(
                "unknown level '{}', expected one of {:?}",
                args.level,
                levels::NAMES
            ),
        },
    };
    Ok(levels::load(index)?)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,gravity_drain=debug"),
    )
    .init();

    let args = Args::parse();
    if args.list_levels {
        for (index, name) in levels::NAMES.iter().enumerate() {
            println!("{index}: {name}");
        }
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => DrainConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DrainConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
        config.planner.seed = seed;
    }
    config.validate()?;

    let grid = load_grid(&args)?;
    let goal = config.planner.goal_fraction;
    let window = config.planner.window_seconds;
    let mut sim = Simulation::new(grid, config.simulation.clone())?;
    let mut planner = args.planner.build(config.planner.clone())?;
    let ticks = sim.ticks_for(window);

    log::info!(
        "[drain] {} planner, {} search steps per decision, {} ticks per window",
        planner.name(),
        args.search_steps,
        ticks
    );

    for decision in 1..=args.decisions {
        planner.begin_search(&mut sim)?;
        for _ in 0..args.search_steps.max(1) {
            planner.search_step(&mut sim)?;
        }
        if args.tree {
            if let Some(report) = planner.report() {
                println!("{report}");
            }
        }

        let action = planner.decide(&mut sim)?;
        let drained = sim.run(ticks);
        log::info!(
            "[drain] Decision {}: rotate {} drained {:.3}, {:.1}% of the fluid is out",
            decision,
            action,
            drained,
            sim.drained_fraction() * 100.0
        );

        if sim.drained_fraction() >= goal {
            log::info!("[drain] Goal reached after {} rotations", decision);
            break;
        }
    }

    println!("{}", sim.grid().to_ascii());
    Ok(())
}
