//! CPU scheduling over a batch of processes.
//!
//! A single clock-driven loop admits arrivals, asks the policy's ready
//! queue for the next process, runs it for at most its budget and records
//! the slice. Policies differ only in their ready queue.

use std::collections::HashSet;
use std::fmt::{self, Display};
use std::str::FromStr;

use simkit::{rank, v_trace, Error, Ranked, Result};

pub mod process;
pub mod schedulers;
pub mod utils;

pub use process::{Pid, Process};
use schedulers::{Budget, Scheduler, FCFS, MLFQ, RR};

pub const DEFAULT_QUANTUM: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Policy {
    Fcfs,
    Sjf,
    RoundRobin,
    Priority,
    Mlfq,
}

impl Policy {
    /// Policies compared in ALL mode. MLFQ runs only when named.
    pub const ALL: [Policy; 4] = [Policy::Fcfs, Policy::Sjf, Policy::RoundRobin, Policy::Priority];

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::Sjf => "SJF",
            Policy::RoundRobin => "RR",
            Policy::Priority => "Priority",
            Policy::Mlfq => "MLFQ",
        }
    }

    fn scheduler(&self, quantum: usize) -> Box<dyn Scheduler> {
        match self {
            Policy::Fcfs => Box::new(FCFS::new()),
            Policy::Sjf => Box::new(schedulers::sjf()),
            Policy::RoundRobin => Box::new(RR::new(quantum)),
            Policy::Priority => Box::new(schedulers::priority()),
            Policy::Mlfq => Box::new(MLFQ::new()),
        }
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FCFS" | "FIFO" => Ok(Policy::Fcfs),
            "SJF" => Ok(Policy::Sjf),
            "RR" | "ROUNDROBIN" | "ROUND-ROBIN" => Ok(Policy::RoundRobin),
            "PRIORITY" | "PRIO" => Ok(Policy::Priority),
            "MLFQ" => Ok(Policy::Mlfq),
            _ => Err(Error::UnknownPolicy(s.trim().to_string())),
        }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One uninterrupted stretch of CPU time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slice {
    pub pid: Pid,
    pub start: usize,
    pub end: usize,
}

impl Slice {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Metrics {
    pub avg_waiting: f64,
    pub avg_turnaround: f64,
    /// completed processes per time unit
    pub throughput: f64,
}

impl Metrics {
    fn of(processes: &[Process], elapsed: usize) -> Metrics {
        if processes.is_empty() {
            return Metrics::default();
        }
        let n = processes.len() as f64;
        let waiting: f64 = processes.iter().map(|p| p.waiting_time as f64).sum();
        let turnaround: f64 = processes.iter().map(|p| p.turnaround_time as f64).sum();
        Metrics {
            avg_waiting: waiting / n,
            avg_turnaround: turnaround / n,
            throughput: if elapsed == 0 { 0.0 } else { n / elapsed as f64 },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Schedule {
    pub policy: Policy,
    /// finished processes, in completion order
    pub processes: Vec<Process>,
    pub timeline: Vec<Slice>,
    pub metrics: Metrics,
    /// time the last process finished
    pub elapsed: usize,
}

impl Schedule {
    pub fn process(&self, pid: Pid) -> Option<&Process> {
        self.processes.iter().find(|p| p.pid == pid)
    }
}

/// Per-process bookkeeping for one run.
struct Task {
    process: Process,
    remaining: usize,
    first_start: Option<usize>,
}

struct Simulation {
    tasks: Vec<Task>,
    /// task indices sorted by arrival, stable on declaration order
    arrivals: Vec<usize>,
    next_arrival: usize,
    clock: usize,
    scheduler: Box<dyn Scheduler>,
}

impl Simulation {
    fn new(processes: &[Process], scheduler: Box<dyn Scheduler>) -> Self {
        let tasks: Vec<Task> = processes
            .iter()
            .map(|p| Task { process: p.clone(), remaining: p.burst_time, first_start: None })
            .collect();
        let mut arrivals: Vec<usize> = (0..tasks.len()).collect();
        arrivals.sort_by_key(|&i| tasks[i].process.arrival);
        Simulation { tasks, arrivals, next_arrival: 0, clock: 0, scheduler }
    }

    fn task_index(&self, pid: Pid) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.process.pid == pid)
            .ok_or_else(|| Error::Internal(format!("scheduler returned unknown pid {}", pid)))
    }

    /// Hands every process that has arrived by now to the ready queue.
    fn admit(&mut self) {
        while let Some(&i) = self.arrivals.get(self.next_arrival) {
            if self.tasks[i].process.arrival > self.clock {
                break;
            }
            self.scheduler.add_process(&self.tasks[i].process);
            self.next_arrival += 1;
        }
    }

    fn run(mut self, policy: Policy) -> Result<Schedule> {
        let mut timeline = Vec::new();
        let mut finished = Vec::with_capacity(self.tasks.len());

        loop {
            self.admit();
            let (pid, budget): (Pid, Budget) = match self.scheduler.get_next_process() {
                Some(next) => next,
                None => match self.arrivals.get(self.next_arrival) {
                    // idle until the next arrival
                    Some(&i) => {
                        self.clock = self.tasks[i].process.arrival;
                        continue;
                    }
                    None => break,
                },
            };

            let i = self.task_index(pid)?;
            let task = &mut self.tasks[i];
            let run_for = budget.map_or(task.remaining, |q| q.min(task.remaining));
            let start = self.clock;
            task.first_start.get_or_insert(start);
            task.remaining -= run_for;
            self.clock += run_for;
            timeline.push(Slice { pid, start, end: self.clock });
            v_trace!("{}: {} runs {}..{} ({} left)", policy, pid, start, self.clock, task.remaining);

            // arrivals during the slice queue ahead of the preempted process
            self.admit();
            let task = &mut self.tasks[i];
            if task.remaining > 0 {
                self.scheduler.preempted(&task.process);
            } else {
                let first_start = task.first_start.unwrap_or(start);
                task.process.finish(first_start, self.clock);
                finished.push(task.process.clone());
            }
        }

        if finished.len() != self.tasks.len() {
            return Err(Error::Internal(format!(
                "{} finished {} of {} processes",
                policy,
                finished.len(),
                self.tasks.len()
            )));
        }

        let metrics = Metrics::of(&finished, self.clock);
        Ok(Schedule { policy, processes: finished, timeline, metrics, elapsed: self.clock })
    }
}

fn validate(processes: &[Process], quantum: usize) -> Result<()> {
    if quantum == 0 {
        return Err(Error::InvalidInput("quantum must be at least 1".to_string()));
    }
    let mut seen = HashSet::new();
    for process in processes {
        if !seen.insert(process.pid) {
            return Err(Error::InvalidInput(format!("duplicate pid {}", process.pid)));
        }
    }
    // the clock never passes the last arrival plus all the work
    let last_arrival = processes.iter().map(|p| p.arrival).max().unwrap_or(0);
    processes
        .iter()
        .try_fold(last_arrival, |horizon, p| horizon.checked_add(p.burst_time))
        .ok_or_else(|| Error::InvalidInput("total run time does not fit the clock".to_string()))?;
    Ok(())
}

/// Runs one policy over an independent copy of `processes`. `quantum` only
/// affects round robin and defaults to [`DEFAULT_QUANTUM`].
pub fn schedule(policy: Policy, processes: &[Process], quantum: Option<usize>) -> Result<Schedule> {
    let quantum = quantum.unwrap_or(DEFAULT_QUANTUM);
    validate(processes, quantum)?;
    Simulation::new(processes, policy.scheduler(quantum)).run(policy)
}

/// Runs the [`Policy::ALL`] policies, in order, each on its own copy.
pub fn run_all(processes: &[Process], quantum: Option<usize>) -> Result<Vec<Schedule>> {
    Policy::ALL.iter().map(|&policy| schedule(policy, processes, quantum)).collect()
}

/// Metric used to rank schedules in comparative mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankBy {
    Waiting,
    Turnaround,
}

impl RankBy {
    pub fn score(&self, metrics: &Metrics) -> f64 {
        match self {
            RankBy::Waiting => metrics.avg_waiting,
            RankBy::Turnaround => metrics.avg_turnaround,
        }
    }
}

impl FromStr for RankBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "waiting" | "wt" => Ok(RankBy::Waiting),
            "turnaround" | "tt" => Ok(RankBy::Turnaround),
            _ => Err(Error::InvalidInput(format!(
                "rank metric must be waiting or turnaround, got {:?}",
                s.trim()
            ))),
        }
    }
}

impl Display for RankBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RankBy::Waiting => "average waiting time",
            RankBy::Turnaround => "average turnaround time",
        })
    }
}

pub fn compare(schedules: &[Schedule], by: RankBy) -> Vec<Ranked<Policy>> {
    rank(schedules.iter().map(|s| (s.policy, by.score(&s.metrics))))
}
