//! Disk-head scheduling.
//!
//! Given a batch of cylinder requests and a starting head, each policy
//! produces the order in which the head stops and the total distance it
//! travels.

use std::fmt::{self, Display};
use std::str::FromStr;

use log::warn;
use simkit::{rank, v_trace, Error, Ranked, Result};

pub mod schedulers;
pub mod utils;

use schedulers::{IOScheduler, SweepKind, FIFO, SSTF, Sweep};

/// Initial sweep direction of the head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// Lenient form used on user input: anything other than ASC/DESC falls
    /// back to ASC with a warning.
    pub fn from_token(token: &str) -> Direction {
        token.parse().unwrap_or_else(|_| {
            warn!("invalid direction {:?}, using ASC", token.trim());
            Direction::Asc
        })
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Direction::Asc),
            "DESC" => Ok(Direction::Desc),
            _ => Err(Error::InvalidInput(format!("direction must be ASC or DESC, got {:?}", s))),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Policy {
    Fcfs,
    Sstf,
    Scan,
    CScan,
    Look,
    CLook,
}

impl Policy {
    pub const ALL: [Policy; 6] =
        [Policy::Fcfs, Policy::Sstf, Policy::Scan, Policy::CScan, Policy::Look, Policy::CLook];

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fcfs => "FCFS",
            Policy::Sstf => "SSTF",
            Policy::Scan => "SCAN",
            Policy::CScan => "C-SCAN",
            Policy::Look => "LOOK",
            Policy::CLook => "C-LOOK",
        }
    }

    fn scheduler(&self, direction: Direction, max_cylinder: usize) -> Box<dyn IOScheduler> {
        match self {
            Policy::Fcfs => Box::new(FIFO::new()),
            Policy::Sstf => Box::new(SSTF::new()),
            Policy::Scan => Box::new(Sweep::new(SweepKind::Scan, direction, max_cylinder)),
            Policy::CScan => Box::new(Sweep::new(SweepKind::CScan, direction, max_cylinder)),
            Policy::Look => Box::new(Sweep::new(SweepKind::Look, direction, max_cylinder)),
            Policy::CLook => Box::new(Sweep::new(SweepKind::CLook, direction, max_cylinder)),
        }
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FCFS" | "FIFO" => Ok(Policy::Fcfs),
            "SSTF" => Ok(Policy::Sstf),
            "SCAN" => Ok(Policy::Scan),
            "C-SCAN" | "CSCAN" => Ok(Policy::CScan),
            "LOOK" => Ok(Policy::Look),
            "C-LOOK" | "CLOOK" => Ok(Policy::CLook),
            _ => Err(Error::UnknownPolicy(s.trim().to_string())),
        }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A point where the head comes to rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stop {
    /// A request serviced at this cylinder.
    Service(usize),
    /// A boundary reached or wrapped to without servicing anything.
    Pass(usize),
}

impl Stop {
    pub fn track(&self) -> usize {
        match *self {
            Stop::Service(track) | Stop::Pass(track) => track,
        }
    }
}

/// Head position for one run. Never outlives the run.
#[derive(Debug)]
struct HeadState {
    position: usize,
    movement: usize,
}

impl HeadState {
    fn new(position: usize) -> Self {
        HeadState { position, movement: 0 }
    }

    fn seek(&mut self, track: usize) -> Result<()> {
        self.movement = self
            .movement
            .checked_add(self.position.abs_diff(track))
            .ok_or_else(|| Error::InvalidInput("total head movement overflows".to_string()))?;
        self.position = track;
        Ok(())
    }
}

/// Everything a run needs besides the policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workload {
    pub requests: Vec<usize>,
    pub head: usize,
    pub direction: Direction,
    pub max_cylinder: usize,
}

impl Workload {
    fn validate(&self) -> Result<()> {
        if self.head > self.max_cylinder {
            return Err(Error::InvalidInput(format!(
                "head {} is beyond cylinder {}",
                self.head, self.max_cylinder
            )));
        }
        if let Some(track) = self.requests.iter().find(|&&track| track > self.max_cylinder) {
            return Err(Error::InvalidInput(format!(
                "request {} is beyond cylinder {}",
                track, self.max_cylinder
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiskRun {
    pub policy: Policy,
    pub start: usize,
    pub stops: Vec<Stop>,
    pub total_movement: usize,
}

impl DiskRun {
    /// Serviced cylinders in visiting order.
    pub fn visited(&self) -> Vec<usize> {
        self.stops
            .iter()
            .filter_map(|stop| match stop {
                Stop::Service(track) => Some(*track),
                Stop::Pass(_) => None,
            })
            .collect()
    }

    /// Every head position, starting point included.
    pub fn path(&self) -> Vec<usize> {
        std::iter::once(self.start).chain(self.stops.iter().map(Stop::track)).collect()
    }
}

/// Runs one policy over the workload.
pub fn schedule(policy: Policy, workload: &Workload) -> Result<DiskRun> {
    workload.validate()?;

    let mut scheduler = policy.scheduler(workload.direction, workload.max_cylinder);
    for &track in &workload.requests {
        scheduler.add(track);
    }

    let mut head = HeadState::new(workload.head);
    let mut stops = Vec::with_capacity(workload.requests.len());
    let mut serviced = 0;
    while let Some(stop) = scheduler.next(head.position) {
        let from = head.position;
        head.seek(stop.track())?;
        match stop {
            Stop::Service(track) => {
                serviced += 1;
                v_trace!("{}: service {} (from {}, total {})", policy, track, from, head.movement);
            }
            Stop::Pass(track) => {
                v_trace!("{}: pass {} (from {}, total {})", policy, track, from, head.movement);
            }
        }
        stops.push(stop);
    }

    if serviced != workload.requests.len() {
        return Err(Error::Internal(format!(
            "{} serviced {} of {} requests",
            policy,
            serviced,
            workload.requests.len()
        )));
    }

    Ok(DiskRun { policy, start: workload.head, stops, total_movement: head.movement })
}

/// Runs every policy over the same workload, in declaration order.
pub fn run_all(workload: &Workload) -> Result<Vec<DiskRun>> {
    Policy::ALL.iter().map(|&policy| schedule(policy, workload)).collect()
}

/// Ranks finished runs by total head movement.
pub fn compare(runs: &[DiskRun]) -> Vec<Ranked<Policy>> {
    rank(runs.iter().map(|run| (run.policy, run.total_movement as f64)))
}
