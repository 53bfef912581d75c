#![warn(clippy::all)]

use std::path::Path;
use std::process;

use clap::{Arg, Command};
use scheduler::utils::{parse_algorithm, parse_line};
use scheduler::{compare, run_all, schedule, Process, RankBy, Schedule};
use simkit::logger::{self, Flags};
use simkit::{Error, Result, Selection, Settings};

struct Args {
    flags: Flags,
    schedspec: Option<String>,
    quantum: Option<usize>,
    rank_by: Option<String>,
    config: Option<String>,
    input: String,
}

fn valid_schedspec(value: &str) -> std::result::Result<(), String> {
    parse_algorithm(value).map(|_| ()).map_err(|err| {
        format!("{}; must be one of FCFS, SJF, RR, RR<num>, Priority, MLFQ or all (the first four)", err)
    })
}

fn print_processes(processes: &[Process]) {
    for p in processes {
        println!("P{}: BT={} Priority={} Arrival={}", p.pid, p.burst_time, p.priority, p.arrival);
    }
}

fn print_schedule(schedule: &Schedule) {
    println!("\n=== {} ===", schedule.policy);
    println!("{:>4} {:>5} {:>5} {:>5} {:>5} {:>5}", "PID", "AT", "BT", "ST", "END", "WT");
    for p in &schedule.processes {
        println!(
            "{:>4} {:>5} {:>5} {:>5} {:>5} {:>5}",
            format!("P{}", p.pid),
            p.arrival,
            p.burst_time,
            p.start,
            p.end,
            p.waiting_time
        );
    }
    let gantt: Vec<String> =
        schedule.timeline.iter().map(|s| format!("{}-P{}-{}", s.start, s.pid, s.end)).collect();
    println!("Gantt: {}", gantt.join(" | "));
    let m = &schedule.metrics;
    println!("Average waiting time: {:.2}", m.avg_waiting);
    println!("Average turnaround time: {:.2}", m.avg_turnaround);
    println!("Throughput: {:.2}", m.throughput);
}

fn actual_main_fn(args: Args) -> Result<()> {
    logger::init(args.flags)?;

    let settings = Settings::load(args.config.as_deref().map(Path::new))?;
    let rank_by: RankBy = args.rank_by.as_deref().unwrap_or(settings.cpu.rank_by.as_str()).parse()?;

    let mut input = parse_line(&args.input)?;
    if let Some(spec) = &args.schedspec {
        let (selection, quantum) = parse_algorithm(spec)?;
        input.selection = selection;
        input.quantum = quantum;
    }
    let quantum = args.quantum.or(input.quantum).unwrap_or(settings.cpu.quantum);

    println!("Selected algorithm: {}", input.selection);
    print_processes(&input.processes);

    match input.selection {
        Selection::One(policy) => print_schedule(&schedule(policy, &input.processes, Some(quantum))?),
        Selection::All => {
            let schedules = run_all(&input.processes, Some(quantum))?;
            for s in &schedules {
                print_schedule(s);
            }
            println!("\n--- Ranking ({}) ---", rank_by);
            for (i, ranked) in compare(&schedules, rank_by).iter().enumerate() {
                println!("{:2}. {:<9} {:.2}", i + 1, ranked.policy.name(), ranked.score);
            }
        }
    }
    Ok(())
}

fn parse_args(actual_args: &[String]) -> Result<Args> {
    let matches = Command::new("sched")
        .about("CPU scheduling simulator")
        .arg(
            Arg::new("schedspec")
                .short('s')
                .long("schedspec")
                .takes_value(true)
                .validator(valid_schedspec)
                .help("overrides the algorithm column (FCFS, SJF, RR<num>, Priority, MLFQ, all)"),
        )
        .arg(
            Arg::new("quantum")
                .long("quantum")
                .takes_value(true)
                .help("round robin quantum"),
        )
        .arg(
            Arg::new("rank_by")
                .long("rank-by")
                .takes_value(true)
                .help("waiting or turnaround"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .help("configuration file"),
        )
        .arg(Arg::new("v_flag").short('v').help("trace every slice"))
        .arg(Arg::new("q_flag").short('q').help("trace the ready queues"))
        .arg(
            Arg::new("input")
                .required(true)
                .index(1)
                .help("`n | bursts | priorities | arrivals | algorithm`"),
        )
        .get_matches_from(actual_args);

    let quantum = matches
        .value_of("quantum")
        .map(|token| token.parse().map_err(|_| Error::malformed(token, "a quantum")))
        .transpose()?;

    Ok(Args {
        flags: Flags { verbose: matches.is_present("v_flag"), queue: matches.is_present("q_flag") },
        schedspec: matches.value_of("schedspec").map(str::to_string),
        quantum,
        rank_by: matches.value_of("rank_by").map(str::to_string),
        config: matches.value_of("config").map(str::to_string),
        input: matches.value_of("input").unwrap_or_default().to_string(),
    })
}

fn get_default_args() -> Vec<String> {
    vec!["sched".to_string(), "5 | 10,1,2,1,3 | 3,1,4,5,2 | 0 | all".to_string()]
}

fn main() {
    let default_args = get_default_args();
    let args = std::env::args().collect::<Vec<String>>();
    let actual_args = if args.len() > 1 { &args } else { &default_args };

    if let Err(err) = parse_args(actual_args).and_then(actual_main_fn) {
        eprintln!("sched: {}", err);
        process::exit(if err.is_defect() { 70 } else { 1 });
    }
}
