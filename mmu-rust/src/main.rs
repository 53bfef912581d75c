#![warn(clippy::all)]

use std::path::Path;
use std::process;

use clap::{Arg, Command};
use log::warn;
use mmu::utils::{parse_accesses, parse_frame_count, parse_initial_state};
use mmu::{compare, run, run_all, run_nru_random, MemoryState, PagingRun, Policy, RandGenerator};
use simkit::logger::{self, Flags};
use simkit::{Result, Selection, Settings};

struct Args {
    flags: Flags,
    frames: Option<String>,
    algorithm: String,
    initial: String,
    randomfile: Option<String>,
    config: Option<String>,
    accesses: String,
}

fn print_memory(run: &PagingRun) {
    println!("{}: {} page faults", run.policy, run.faults);
    // FT: [0] 7:R-V t=1 f=1 [1] * ...
    print!("FT:");
    for (idx, frame) in run.frames().iter().enumerate() {
        print!(" [{}] {}", idx, frame);
    }
    println!();
}

/// Only NRU draws from the random file; anything else warns and drops it.
fn random_file(selection: Selection<Policy>, rfile: Option<&str>) -> Option<&str> {
    match (selection, rfile) {
        (Selection::One(Policy::Nru), rfile) => rfile,
        (selection, Some(rfile)) => {
            warn!("random file {} ignored: {} does not use it", rfile, selection);
            None
        }
        (_, None) => None,
    }
}

fn actual_main_fn(args: Args) -> Result<()> {
    logger::init(args.flags)?;

    let settings = Settings::load(args.config.as_deref().map(Path::new))?;
    let num_frames = match &args.frames {
        Some(token) => parse_frame_count(token)?,
        None => settings.memory.frames,
    };
    let selection: Selection<Policy> = args.algorithm.parse()?;
    let initial = MemoryState::preload(num_frames, &parse_initial_state(&args.initial)?)?;
    let accesses = parse_accesses(&args.accesses)?;

    println!("Frames: {}  Accesses: {}", num_frames, accesses.len());

    match (selection, random_file(selection, args.randomfile.as_deref())) {
        (Selection::One(Policy::Nru), Some(rfile)) => {
            let rng = RandGenerator::from_file(Path::new(rfile))?;
            print_memory(&run_nru_random(&accesses, &initial, rng)?);
        }
        (Selection::One(policy), _) => print_memory(&run(policy, &accesses, &initial)?),
        (Selection::All, _) => {
            let runs = run_all(&accesses, &initial)?;
            for run in &runs {
                print_memory(run);
            }
            println!("\n--- Ranking (page faults) ---");
            for (i, ranked) in compare(&runs).iter().enumerate() {
                println!("{:2}. {:<13} {}", i + 1, ranked.policy.name(), ranked.score);
            }
        }
    }
    Ok(())
}

fn parse_args(actual_args: &[String]) -> Args {
    let matches = Command::new("mmu")
        .about("Page replacement simulator")
        .arg(
            Arg::new("num_frames")
                .short('f')
                .long("frames")
                .takes_value(true)
                .help("number of frames, 0 for the default"),
        )
        .arg(
            Arg::new("algorithm")
                .short('a')
                .long("algorithm")
                .takes_value(true)
                .default_value("FIFO")
                .help("FIFO, SecondChance, NRU, LRU, Clock, LFU, MFU or ALL"),
        )
        .arg(
            Arg::new("initial")
                .short('i')
                .long("initial")
                .takes_value(true)
                .default_value("0")
                .help("pages already resident, e.g. [0,5,2,8]; 0 for empty"),
        )
        .arg(
            Arg::new("randomfile")
                .short('r')
                .long("rfile")
                .takes_value(true)
                .help("random file; makes NRU pick randomly within a class"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .help("configuration file"),
        )
        .arg(Arg::new("v_flag").short('v').help("trace every access"))
        .arg(Arg::new("q_flag").short('q').help("trace victim selection"))
        .arg(
            Arg::new("accesses")
                .required(true)
                .index(1)
                .help("access sequence, e.g. [2,6,1*,8]; * marks a write"),
        )
        .get_matches_from(actual_args);

    Args {
        flags: Flags { verbose: matches.is_present("v_flag"), queue: matches.is_present("q_flag") },
        frames: matches.value_of("num_frames").map(str::to_string),
        algorithm: matches.value_of("algorithm").unwrap_or("FIFO").to_string(),
        initial: matches.value_of("initial").unwrap_or("0").to_string(),
        randomfile: matches.value_of("randomfile").map(str::to_string),
        config: matches.value_of("config").map(str::to_string),
        accesses: matches.value_of("accesses").unwrap_or_default().to_string(),
    }
}

fn get_default_args() -> Vec<String> {
    vec![
        "mmu".to_string(),
        "-f4".to_string(),
        "-aALL".to_string(),
        "-i[0,5,2,8]".to_string(),
        "[2,6,1*,8,2,6,2,0,5*,3,1]".to_string(),
    ]
}

fn main() {
    let default_args = get_default_args();
    let args = std::env::args().collect::<Vec<String>>();
    let actual_args = if args.len() > 1 { &args } else { &default_args };

    if let Err(err) = actual_main_fn(parse_args(actual_args)) {
        eprintln!("mmu: {}", err);
        process::exit(if err.is_defect() { 70 } else { 1 });
    }
}
