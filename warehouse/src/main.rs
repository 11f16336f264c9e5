//! Warehouse order-picking simulator.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use pickar_core::Vec3;
use pickar_nav::{PathFinder, storage};
use log::{info, warn};
use tracing_subscriber::filter::LevelFilter;

use warehouse_lib::{Session, SimConfig, Walker, drive, layout};

#[derive(Parser, Debug)]
#[command(name = "warehouse", version)]
#[command(about = "Simulate waypoint-guided order picking in a warehouse")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Walk a simulated picker through one or more jobs
    Run {
        /// Jobs to complete before stopping
        #[arg(long, default_value_t = 1)]
        jobs: usize,

        /// Give up after this many ticks
        #[arg(long, default_value_t = 20_000)]
        max_ticks: u64,

        /// Override the jitter seed
        #[arg(long)]
        seed: Option<u64>,

        /// Write job reports into this folder
        #[arg(long, value_name = "DIR")]
        report_dir: Option<PathBuf>,
    },
    /// Print the walking route between two points, given as x,y,z
    Route {
        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        from: Vec3,

        #[arg(long, value_parser = parse_vec3, allow_hyphen_values = true)]
        to: Vec3,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the session's waypoint graph to a file
    ExportLayout {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_vec3(s: &str) -> std::result::Result<Vec3, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f32>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        &[x, y, z] => Ok(Vec3::new(x, y, z)),
        _ => Err(format!("expected x,y,z, got {s:?}")),
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::WARN
    } else {
        match verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => SimConfig::default(),
    };

    match cli.command {
        Commands::Run {
            jobs,
            max_ticks,
            seed,
            report_dir,
        } => run(config, jobs, max_ticks, seed, report_dir),
        Commands::Route { from, to, json } => route(config, from, to, json),
        Commands::ExportLayout { output } => export_layout(config, output),
    }
}

fn run(
    mut config: SimConfig,
    jobs: usize,
    max_ticks: u64,
    seed: Option<u64>,
    report_dir: Option<PathBuf>,
) -> Result<()> {
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if report_dir.is_some() {
        config.report_dir = report_dir;
    }
    let mut session = Session::open(config.clone()).context("failed to open session")?;
    let mut walker = Walker::new(layout::START, &config);
    session.start(walker.position())?;
    info!(
        "job started with {} items over {} waypoints",
        session.tracker().total_count(),
        session.graph().len()
    );

    let reports = drive(&mut session, &mut walker, jobs, max_ticks)?;
    for (n, report) in reports.iter().enumerate() {
        let picks: Vec<String> = report
            .items
            .iter()
            .map(|item| format!("{}:{:.1}s", item.id, item.time_taken))
            .collect();
        println!(
            "job {}: {:.1}s total, return {:.1}s, picks [{}]",
            n + 1,
            report.total_time,
            report.return_time,
            picks.join(", ")
        );
    }
    for path in session.reports() {
        println!("report written to {}", path.display());
    }
    if reports.len() < jobs {
        warn!(
            "tick limit reached in state {:?} at {:.0}% progress",
            session.state(),
            session.progress() * 100.0
        );
        bail!("only {} of {jobs} jobs completed in {max_ticks} ticks", reports.len());
    }
    Ok(())
}

fn route(config: SimConfig, from: Vec3, to: Vec3, json: bool) -> Result<()> {
    let session = Session::open(config.clone()).context("failed to open session")?;
    let finder = PathFinder::new(session.graph(), config.steering);
    let Some(points) = finder.render_path(from, to) else {
        bail!("no waypoints to route through");
    };
    let distance = finder.path_distance(from, to).unwrap_or(f32::INFINITY);

    if json {
        let reachable = distance.is_finite().then_some(distance);
        let out = serde_json::json!({
            "distance": reachable,
            "points": points.iter().map(|&p| <[f32; 3]>::from(p)).collect::<Vec<_>>(),
            "steering": finder.next_steering_point(from, to).map(<[f32; 3]>::from),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if points.is_empty() {
        println!("{from} -> {to}: unreachable");
    } else {
        println!("{from} -> {to}: {distance:.2}");
        for p in &points {
            println!("  {p}");
        }
    }
    Ok(())
}

fn export_layout(config: SimConfig, output: PathBuf) -> Result<()> {
    let session = Session::open(config).context("failed to open session")?;
    storage::save(session.graph(), &output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("exported {} waypoints to {}", session.graph().len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec3_argument_parsing() {
        assert_eq!(parse_vec3("1, -2.5,3").unwrap(), Vec3::new(1.0, -2.5, 3.0));
        assert!(parse_vec3("1,2").is_err());
        assert!(parse_vec3("1,x,3").is_err());
    }

    #[test]
    fn cli_parses_route() {
        let cli = Cli::try_parse_from([
            "warehouse", "-v", "route", "--from", "-1,0,0", "--to", "8,0,9",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Route { from, to, json } => {
                assert_eq!(from, Vec3::new(-1.0, 0.0, 0.0));
                assert_eq!(to, Vec3::new(8.0, 0.0, 9.0));
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn export_layout_writes_demo_graph() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("layout.json");
        export_layout(SimConfig::default(), output.clone()).unwrap();
        let graph = storage::load(&output).unwrap();
        assert_eq!(graph.len(), 8);
    }
}
