use std::fs;
use std::num::NonZero;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};

use wayfinder::blockade::MemorySpace;
use wayfinder::builder::{Builder, OrientedGridBuilder, PlainGridBuilder, DEFAULT_TURN_COST};
use wayfinder::keypad::RobotChain;
use wayfinder::metrics::{find_cheats, savings_histogram, tiles_on_best_paths};
use wayfinder::patrol::{find_guard, loop_inducing_obstructions, patrol};
use wayfinder::region::{reachable_ends, regions, Region};
use wayfinder::render::{costs_on_grid, path_on_grid, region_mask};
use wayfinder::{Grid, Heading, Location, Oriented, PathSolver, INFINITY};

/// Solve grid path-finding puzzles.
#[derive(Parser)]
#[command(about, long_about = None, version)]
struct Args {
    /// Enable debug messages, including renderings of intermediate results
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    puzzle: Puzzle,
}

#[derive(Subcommand)]
enum Puzzle {
    /// Cheapest route from S to E when turning in place costs extra
    Maze {
        input: PathBuf,
        /// Cost of a 90 degree turn
        #[arg(long, default_value_t = DEFAULT_TURN_COST)]
        turn_cost: u64,
        /// Write the state graph to this file in Graphviz DOT format
        #[arg(long)]
        dot: Option<PathBuf>,
    },
    /// Count shortcuts through the walls of a race track
    Race {
        input: PathBuf,
        /// Longest shortcut allowed, in steps
        #[arg(long, default_value_t = 2)]
        max_jump: usize,
        /// Least number of steps a shortcut must save to be counted
        #[arg(long, default_value_t = 100)]
        min_savings: u64,
    },
    /// Fence prices of the plots of a garden
    Garden { input: PathBuf },
    /// Escape a memory space while bytes fall into it
    Memory {
        input: PathBuf,
        /// Width and height of the space
        #[arg(long, default_value_t = 71)]
        size: usize,
        /// Number of bytes fallen before the route is measured
        #[arg(long, default_value_t = 1024)]
        take: usize,
    },
    /// Score and rate hiking trails on a height map
    Trails { input: PathBuf },
    /// Follow a guard and find where a new obstacle would trap them
    Patrol { input: PathBuf },
    /// Type door codes through a chain of robots
    Keypad {
        input: PathBuf,
        /// Number of keypads between the human and the door, door included
        #[arg(long, default_value_t = 3)]
        depth: usize,
    },
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn read_grid(path: &Path) -> Result<Grid> {
    read(path)?.parse::<Grid>().with_context(|| format!("cannot parse {} as a grid", path.display()))
}

fn walls(c: char) -> bool {
    c == '#'
}

fn maze(input: &Path, turn_cost: u64, dot: Option<&Path>) -> Result<()> {
    let grid = read_grid(input)?;
    let graph = OrientedGridBuilder::from_grid(&grid, walls)
        .turn_cost(turn_cost)
        .build()
        .map_err(|reasons| anyhow!("invalid maze: {reasons:?}"))?;

    if let Some(dot) = dot {
        fs::write(dot, graph.to_dot()).with_context(|| format!("cannot write {}", dot.display()))?;
    }

    let start = Oriented::new(grid.find('S')?, Heading::East);
    let end = grid.find('E')?;
    let optima = PathSolver::from(&graph).solve(start)?;

    let cost = optima.min_cost_where(|state| state.location == end);
    if cost == INFINITY {
        bail!("the end is unreachable");
    }

    if let Some((arrival, _)) = optima.iter().find(|(state, optimum)| state.location == end && optimum.cost == cost) {
        if let Some(path) = optima.paths_to(*arrival).first() {
            debug!("one of the best paths:\n{}", path_on_grid(&grid, path));
        }
    }

    println!("{cost}");
    println!("{}", tiles_on_best_paths(&optima, |state| state.location == end).len());
    Ok(())
}

fn race(input: &Path, max_jump: usize, min_savings: u64) -> Result<()> {
    let grid = read_grid(input)?;
    let graph = PlainGridBuilder::from_grid(&grid, walls)
        .build()
        .map_err(|reasons| anyhow!("invalid track: {reasons:?}"))?;

    let optima = PathSolver::from(&graph).path_limit(1).solve(grid.find('S')?)?;
    let costs = optima.cost_table();
    debug!("costs along the track:\n{}", costs_on_grid(&grid, &costs, 4));

    let cheats = find_cheats(&costs, max_jump, min_savings);
    for (saved, count) in savings_histogram(&cheats) {
        debug!("{count} cheat(s) save {saved}");
    }

    println!("{}", cheats.len());
    Ok(())
}

fn garden(input: &Path) -> Result<()> {
    let grid = read_grid(input)?;
    let plots = regions(&grid);
    for region in &plots {
        debug!("plot {} with area {}:\n{}", region.label(), region.area(), region_mask(&grid, region));
    }

    println!("{}", plots.iter().map(Region::fence_price).sum::<usize>());
    println!("{}", plots.iter().map(Region::bulk_price).sum::<usize>());
    Ok(())
}

fn parse_location(line: &str) -> Result<Location> {
    let (x, y) = line.trim()
        .split_once(',')
        .ok_or_else(|| anyhow!("expected x,y but got {line:?}"))?;
    Ok(Location(x.trim().parse()?, y.trim().parse()?))
}

fn memory(input: &Path, size: usize, take: usize) -> Result<()> {
    let size = NonZero::new(size).context("the memory space needs a positive size")?;
    let bytes = read(input)?
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_location)
        .collect::<Result<Vec<_>>>()?;

    let space = MemorySpace::square(size);
    let known_open = take.min(bytes.len());
    match space.escape_cost(&bytes[..known_open])? {
        INFINITY => bail!("the exit is blocked after {known_open} bytes"),
        cost => println!("{cost}"),
    }

    let (index, location) = space.first_blocking(&bytes, known_open)?;
    debug!("byte {index} blocks the exit");
    println!("{location}");
    Ok(())
}

fn trails(input: &Path) -> Result<()> {
    let grid = read_grid(input)?;
    let graph = PlainGridBuilder::from_grid(&grid, |c| !c.is_ascii_digit())
        .step_rule(|from, to| matches!((from.to_digit(10), to.to_digit(10)), (Some(a), Some(b)) if b == a + 1))
        .build()
        .map_err(|reasons| anyhow!("invalid height map: {reasons:?}"))?;

    let trails = grid.cells()
        .filter(|(_, c)| *c == '0')
        .map(|(trailhead, _)| reachable_ends(&graph, trailhead, |location| grid.get(*location) == Some('9')))
        .collect::<Result<Vec<_>, _>>()?;
    let (score, rating) = trails.iter()
        .fold((0, 0), |(score, rating), ends| (score + ends.len(), rating + ends.values().sum::<usize>()));

    println!("{score}");
    println!("{rating}");
    Ok(())
}

fn guard(input: &Path) -> Result<()> {
    let grid = read_grid(input)?;
    let start = find_guard(&grid)?;
    let route = patrol(&grid, start);
    if route.is_loop() {
        bail!("the guard never leaves the lab");
    }

    println!("{}", route.visited_locations().len());
    println!("{}", loop_inducing_obstructions(&grid, start).len());
    Ok(())
}

fn keypad(input: &Path, depth: usize) -> Result<()> {
    let codes = read(input)?;
    let total = RobotChain::new(depth)
        .total_complexity(codes.lines().map(str::trim).filter(|code| !code.is_empty()))?;

    println!("{total}");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.debug {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    match args.puzzle {
        Puzzle::Maze { input, turn_cost, dot } => maze(&input, turn_cost, dot.as_deref()),
        Puzzle::Race { input, max_jump, min_savings } => race(&input, max_jump, min_savings),
        Puzzle::Garden { input } => garden(&input),
        Puzzle::Memory { input, size, take } => memory(&input, size, take),
        Puzzle::Trails { input } => trails(&input),
        Puzzle::Patrol { input } => guard(&input),
        Puzzle::Keypad { input, depth } => keypad(&input, depth),
    }
}
