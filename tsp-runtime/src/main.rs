use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, Command};
use log::info;
use std::{
    io::{self, Read, Write},
    thread,
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::runtime::Runtime;
use tsp_challenges::MapSettings;
use tsp_runtime::{compare, harness::SOLVER_ERROR_EXIT_CODE, worker, Harness};
use tsp_structs::{
    config::{parse_selections, ComparisonConfig, Selection},
    core::{CitySet, SolveRequest},
};
use tsp_utils::{dejsonify, init_logger, jsonify, jsonify_pretty, load_json, parse_level_filter};

fn cli() -> Command {
    Command::new("tsp-runtime")
        .about("Compares travelling salesman solvers under a wall-clock limit")
        .arg_required_else_help(true)
        .arg(
            arg!(--"log-level" [LEVEL] "One of off, error, warn, info, debug, trace")
                .default_value("info")
                .global(true)
                .value_parser(clap::value_parser!(String)),
        )
        .subcommand(
            Command::new("compare")
                .about("Generates a random map and runs every selected solver on it")
                .arg(
                    arg!(<NUM_CITIES> "Number of cities to generate")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--algorithms [LIST] "Comma separated name[:seconds] list (default: all)")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--timeout [SECS] "Default time limit per solver in seconds")
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(--workers [WORKERS] "Number of solvers run at the same time")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--seed [SEED] "Seed for map generation (default: current time)")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    arg!(--"max-coord" [MAX_COORD] "Largest x or y coordinate of a city")
                        .value_parser(clap::value_parser!(i32)),
                )
                .arg(
                    arg!(--"start-city" [START_CITY] "Start city for nearest neighbor")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--config [CONFIG] "Config json string or path to json file")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(arg!(--json "Print the whole run as json").action(ArgAction::SetTrue)),
        )
        .subcommand(
            Command::new("solve")
                .about("Reads a solve request from stdin and prints the tour as json")
                .arg(
                    arg!(--delay [SECS] "Sleep before solving")
                        .hide(true)
                        .value_parser(clap::value_parser!(f64)),
                )
                .arg(
                    arg!(--crash "Panic instead of solving")
                        .hide(true)
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("compare", sub_m)) => setup_logging(sub_m.get_one::<String>("log-level")).and_then(
            |_| {
                compare_solvers(
                    *sub_m.get_one::<usize>("NUM_CITIES").unwrap(),
                    sub_m.get_one::<String>("algorithms").cloned(),
                    sub_m.get_one::<f64>("timeout").copied(),
                    sub_m.get_one::<usize>("workers").copied(),
                    sub_m.get_one::<u64>("seed").copied(),
                    sub_m.get_one::<i32>("max-coord").copied(),
                    sub_m.get_one::<usize>("start-city").copied(),
                    sub_m.get_one::<String>("config").cloned(),
                    sub_m.get_flag("json"),
                )
            },
        ),
        Some(("solve", sub_m)) => setup_logging(sub_m.get_one::<String>("log-level")).and_then(
            |_| {
                solve(
                    sub_m.get_one::<f64>("delay").copied(),
                    sub_m.get_flag("crash"),
                )
            },
        ),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn setup_logging(level: Option<&String>) -> Result<()> {
    let level = level.map(String::as_str).unwrap_or("info");
    init_logger(parse_level_filter(level)?)
}

pub fn compare_solvers(
    num_cities: usize,
    algorithms: Option<String>,
    timeout: Option<f64>,
    workers: Option<usize>,
    seed: Option<u64>,
    max_coord: Option<i32>,
    start_city: Option<usize>,
    config: Option<String>,
    json: bool,
) -> Result<()> {
    let mut config = match config {
        Some(config) => load_json::<ComparisonConfig>(&config)?,
        None => ComparisonConfig::default(),
    };
    if let Some(timeout) = timeout {
        config.timeout_secs = timeout;
    }
    if let Some(workers) = workers {
        config.workers = workers;
    }
    if let Some(max_coord) = max_coord {
        config.max_coord = max_coord;
    }
    if let Some(start_city) = start_city {
        config.start_city = start_city;
    }
    config.validate().map_err(|e| anyhow!(e))?;

    let selections = match algorithms {
        Some(list) => parse_selections(&list).map_err(|e| anyhow!(e))?,
        None => Selection::all(),
    };
    let seed = seed.unwrap_or_else(time_seed);
    let cities = CitySet::generate_instance(
        seed,
        &MapSettings {
            num_cities,
            max_coord: config.max_coord,
        },
    )?;
    info!("generated {} cities with seed {}", cities.len(), seed);

    let harness = Harness::current_exe()?.start_city(config.start_city);
    let runtime = Runtime::new()?;
    let run = runtime.block_on(compare(&harness, cities, &selections, &config));

    if json {
        println!("{}", jsonify_pretty(&run));
    } else {
        println!("\nResults:");
        println!("{}", "-".repeat(60));
        for result in &run.results {
            println!("{}", result);
        }
        println!("{}", "-".repeat(60));
    }
    Ok(())
}

/// Entry point of the isolated solver process.
pub fn solve(delay: Option<f64>, crash: bool) -> Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let request: SolveRequest = dejsonify(&input)
        .map_err(|e| anyhow!("Failed to parse solve request: {}", e))?;

    if let Some(delay) = delay {
        thread::sleep(Duration::from_secs_f64(delay));
    }
    if crash {
        panic!("crash requested for {}", request.algorithm);
    }

    let output = worker::compute_solution(&request);
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", jsonify(&output))?;
    stdout.flush()?;
    if output.error.is_some() {
        std::process::exit(SOLVER_ERROR_EXIT_CODE);
    }
    Ok(())
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
