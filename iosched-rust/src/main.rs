#![warn(clippy::all)]

use std::path::Path;
use std::process;

use clap::{Arg, Command};
use iosched::utils::parse_line;
use iosched::{compare, run_all, schedule, DiskRun, Stop};
use simkit::logger::{self, Flags};
use simkit::{Error, Result, Selection, Settings};

struct Args {
    flags: Flags,
    max_cylinder: Option<usize>,
    config: Option<String>,
    input: String,
}

fn print_run(run: &DiskRun) {
    let mut path = run.start.to_string();
    for stop in &run.stops {
        match stop {
            Stop::Service(track) => path.push_str(&format!(" -> {}", track)),
            Stop::Pass(track) => path.push_str(&format!(" -> ({})", track)),
        }
    }
    println!("{:<7} {}", run.policy.name(), path);
    println!("{:<7} total head movement: {}", "", run.total_movement);
}

fn actual_main_fn(args: Args) -> Result<()> {
    logger::init(args.flags)?;

    let mut settings = Settings::load(args.config.as_deref().map(Path::new))?;
    if let Some(max_cylinder) = args.max_cylinder {
        settings.disk.max_cylinder = max_cylinder;
    }

    let input = parse_line(&args.input, &settings.disk)?;
    let workload = &input.workload;
    println!(
        "Head: {}  Direction: {}  Cylinders: 0-{}",
        workload.head, workload.direction, workload.max_cylinder
    );

    match input.selection {
        Selection::One(policy) => print_run(&schedule(policy, workload)?),
        Selection::All => {
            let runs = run_all(workload)?;
            for run in &runs {
                print_run(run);
            }
            println!("\n--- Ranking (head movement) ---");
            for (i, ranked) in compare(&runs).iter().enumerate() {
                println!("{:2}. {:<7} {}", i + 1, ranked.policy.name(), ranked.score);
            }
        }
    }
    Ok(())
}

fn parse_args(actual_args: &[String]) -> Result<Args> {
    let matches = Command::new("iosched")
        .about("Disk-head scheduling simulator")
        .arg(Arg::new("v_flag").short('v').help("trace every head stop"))
        .arg(Arg::new("q_flag").short('q').help("trace the scheduler queue"))
        .arg(
            Arg::new("max")
                .short('m')
                .long("max")
                .takes_value(true)
                .help("highest cylinder on the disk"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .help("configuration file"),
        )
        .arg(
            Arg::new("input")
                .required(true)
                .index(1)
                .help("`requests | algorithm | Head:n | ASC|DESC`, algorithm may be ALL"),
        )
        .get_matches_from(actual_args);

    let max_cylinder = matches
        .value_of("max")
        .map(|token| token.parse().map_err(|_| Error::malformed(token, "a cylinder number")))
        .transpose()?;

    Ok(Args {
        flags: Flags { verbose: matches.is_present("v_flag"), queue: matches.is_present("q_flag") },
        max_cylinder,
        config: matches.value_of("config").map(str::to_string),
        input: matches.value_of("input").unwrap_or_default().to_string(),
    })
}

fn get_default_args() -> Vec<String> {
    vec![
        "iosched".to_string(),
        "-v".to_string(),
        "98, 183, 37, 122, 14, 124, 65, 67 | ALL | Head:53 | ASC".to_string(),
    ]
}

fn main() {
    let default_args = get_default_args();
    let args = std::env::args().collect::<Vec<String>>();
    let actual_args = if args.len() > 1 { &args } else { &default_args };

    if let Err(err) = parse_args(actual_args).and_then(actual_main_fn) {
        eprintln!("iosched: {}", err);
        process::exit(if err.is_defect() { 70 } else { 1 });
    }
}
