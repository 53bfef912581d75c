//! Page replacement over a fixed-size frame table.
//!
//! A run feeds a sequence of page accesses through one replacement policy and
//! reports the fault count, one event per access and the final frame table.

use std::fmt::{self, Display};
use std::str::FromStr;

use simkit::{rank, v_trace, Error, Ranked, Result};

pub mod memory;
pub mod pager;
pub mod rand_generator;
pub mod utils;

pub use memory::{Access, AccessEvent, Frame, MemoryState, DEFAULT_FRAME_COUNT};
pub use rand_generator::RandGenerator;

use pager::{Clock, Fifo, Lfu, Lru, Mfu, Nru, Pager, SecondChance};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Policy {
    Fifo,
    SecondChance,
    Nru,
    Lru,
    Clock,
    Lfu,
    Mfu,
}

impl Policy {
    pub const ALL: [Policy; 7] = [
        Policy::Fifo,
        Policy::SecondChance,
        Policy::Nru,
        Policy::Lru,
        Policy::Clock,
        Policy::Lfu,
        Policy::Mfu,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Policy::Fifo => "FIFO",
            Policy::SecondChance => "SecondChance",
            Policy::Nru => "NRU",
            Policy::Lru => "LRU",
            Policy::Clock => "Clock",
            Policy::Lfu => "LFU",
            Policy::Mfu => "MFU",
        }
    }

    fn pager(&self) -> Box<dyn Pager> {
        match self {
            Policy::Fifo => Box::new(Fifo),
            Policy::SecondChance => Box::new(SecondChance),
            Policy::Nru => Box::new(Nru::new()),
            Policy::Lru => Box::new(Lru),
            Policy::Clock => Box::new(Clock),
            Policy::Lfu => Box::new(Lfu),
            Policy::Mfu => Box::new(Mfu),
        }
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(Policy::Fifo),
            "secondchance" | "second-chance" | "sc" => Ok(Policy::SecondChance),
            "nru" => Ok(Policy::Nru),
            "lru" => Ok(Policy::Lru),
            "clock" => Ok(Policy::Clock),
            "lfu" => Ok(Policy::Lfu),
            "mfu" => Ok(Policy::Mfu),
            _ => Err(Error::UnknownPolicy(s.trim().to_string())),
        }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagingRun {
    pub policy: Policy,
    pub faults: usize,
    pub events: Vec<AccessEvent>,
    pub state: MemoryState,
}

impl PagingRun {
    pub fn frames(&self) -> &[Frame] {
        self.state.frames()
    }
}

fn simulate(
    policy: Policy,
    mut pager: Box<dyn Pager>,
    accesses: &[Access],
    initial: &MemoryState,
) -> Result<PagingRun> {
    // the caller's state is never touched, an aborted run leaves nothing behind
    let mut state = initial.clone();
    let mut events = Vec::with_capacity(accesses.len());

    for (i, &access) in accesses.iter().enumerate() {
        let event = state.access(pager.as_mut(), access)?;
        match event {
            AccessEvent::Hit { page, frame } => v_trace!("{}: {} hit {} @{}", policy, i, page, frame),
            AccessEvent::Fault { page, frame } => {
                v_trace!("{}: {} fault {} -> free frame {}", policy, i, page, frame)
            }
            AccessEvent::Replace { page, frame, victim } => {
                v_trace!("{}: {} fault {} -> frame {} evicting {}", policy, i, page, frame, victim)
            }
        }
        events.push(event);
    }

    Ok(PagingRun { policy, faults: state.faults(), events, state })
}

/// Runs one policy starting from a copy of `initial`.
pub fn run(policy: Policy, accesses: &[Access], initial: &MemoryState) -> Result<PagingRun> {
    simulate(policy, policy.pager(), accesses, initial)
}

/// NRU picking its victim at random within the chosen class.
pub fn run_nru_random(
    accesses: &[Access],
    initial: &MemoryState,
    rng: RandGenerator,
) -> Result<PagingRun> {
    simulate(Policy::Nru, Box::new(Nru::with_random(rng)), accesses, initial)
}

/// Runs every policy, each from its own copy of `initial`.
pub fn run_all(accesses: &[Access], initial: &MemoryState) -> Result<Vec<PagingRun>> {
    Policy::ALL.iter().map(|&policy| run(policy, accesses, initial)).collect()
}

/// Ranks finished runs by fault count.
pub fn compare(runs: &[PagingRun]) -> Vec<Ranked<Policy>> {
    rank(runs.iter().map(|run| (run.policy, run.faults as f64)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reads(pages: &[usize]) -> Vec<Access> {
        pages.iter().map(|&page| Access::read(page)).collect()
    }

    fn textbook() -> Vec<PagingRun> {
        let empty = MemoryState::new(3).unwrap();
        run_all(&reads(&[7, 0, 1, 2, 0, 3, 0, 4]), &empty).unwrap()
    }

    fn faults(runs: &[PagingRun], policy: Policy) -> usize {
        runs.iter().find(|run| run.policy == policy).map(|run| run.faults).unwrap()
    }

    fn pages(run: &PagingRun) -> Vec<Option<usize>> {
        run.state.pages()
    }

    #[test]
    fn textbook_sequence_fault_counts() {
        let runs = textbook();
        // 2 evicts 7, 3 evicts 0, 0 evicts 1, 4 evicts 2
        assert_eq!(faults(&runs, Policy::Fifo), 7);
        assert_eq!(faults(&runs, Policy::Lru), 6);
        assert_eq!(faults(&runs, Policy::SecondChance), 6);
        assert_eq!(faults(&runs, Policy::Clock), 6);
        assert_eq!(faults(&runs, Policy::Nru), 6);
        assert_eq!(faults(&runs, Policy::Lfu), 6);
        assert_eq!(faults(&runs, Policy::Mfu), 7);
    }

    #[test]
    fn textbook_sequence_final_frames() {
        let runs = textbook();
        assert_eq!(pages(&runs[Policy::Fifo as usize]), vec![Some(4), Some(3), Some(0)]);
        assert_eq!(pages(&runs[Policy::Lru as usize]), vec![Some(4), Some(0), Some(3)]);
        assert_eq!(pages(&runs[Policy::Clock as usize]), vec![Some(4), Some(0), Some(3)]);
        assert_eq!(pages(&runs[Policy::Nru as usize]), vec![Some(3), Some(0), Some(4)]);
        assert_eq!(pages(&runs[Policy::Mfu as usize]), vec![Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn fifo_evicts_the_first_occupant_first() {
        let run = &textbook()[Policy::Fifo as usize];
        let victims: Vec<usize> = run
            .events
            .iter()
            .filter_map(|event| match event {
                AccessEvent::Replace { victim, .. } => Some(*victim),
                _ => None,
            })
            .collect();
        assert_eq!(victims, vec![7, 0, 1, 2]);
    }

    #[test]
    fn faults_count_every_miss_once() {
        for run in textbook() {
            let misses = run.events.iter().filter(|event| event.is_fault()).count();
            assert_eq!(misses, run.faults, "{}", run.policy);
        }
    }

    #[test]
    fn repeated_hits_never_fault_again() {
        let empty = MemoryState::new(3).unwrap();
        let run = run(Policy::Lru, &reads(&[5, 5, 5, 6, 5, 6, 5, 5]), &empty).unwrap();
        assert_eq!(run.faults, 2);
    }

    #[test]
    fn preloaded_fifo_run() {
        let initial = MemoryState::preload(4, &[0, 5, 2, 8]).unwrap();
        let accesses = utils::parse_accesses("[2,6,1*,8,2,6,2,0,5*,3,1]").unwrap();
        let run = run(Policy::Fifo, &accesses, &initial).unwrap();
        assert_eq!(run.faults, 5);
        assert_eq!(pages(&run), vec![Some(3), Some(1), Some(0), Some(5)]);
        assert!(run.frames()[1].modified);
        assert!(run.frames()[3].modified);
        assert!(!run.frames()[0].modified);
    }

    #[test]
    fn lfu_remembers_frequency_across_evictions() {
        let empty = MemoryState::new(2).unwrap();
        // 1 is read twice, pushed out by 3, then reloaded with its old count
        let run = run(Policy::Lfu, &reads(&[1, 1, 2, 2, 2, 3, 1, 4]), &empty).unwrap();
        assert_eq!(run.state.frequency(1), 3);
        assert_eq!(
            run.events[6],
            AccessEvent::Replace { page: 1, frame: 0, victim: 3 }
        );
        // 1 and 2 tie at three uses; 2 was placed earlier
        assert_eq!(run.events[7], AccessEvent::Replace { page: 4, frame: 1, victim: 2 });
    }

    #[test]
    fn comparisons_do_not_share_state() {
        let initial = MemoryState::preload(3, &[1, 2]).unwrap();
        let accesses = reads(&[3, 4, 1, 5, 2, 4, 3]);
        let together = run_all(&accesses, &initial).unwrap();
        assert_eq!(initial, MemoryState::preload(3, &[1, 2]).unwrap());
        for policy in Policy::ALL {
            let alone = run(policy, &accesses, &initial).unwrap();
            assert_eq!(together[policy as usize], alone);
        }
    }

    #[test]
    fn ranking_sorts_by_faults() {
        let runs = textbook();
        let ranked = compare(&runs);
        let mut expected: Vec<usize> = runs.iter().map(|run| run.faults).collect();
        expected.sort_unstable();
        let got: Vec<usize> = ranked.iter().map(|r| r.score as usize).collect();
        assert_eq!(got, expected);
        assert_eq!(ranked[0].policy, Policy::SecondChance);
    }

    #[test]
    fn seeded_nru_is_reproducible() {
        let initial = MemoryState::new(3).unwrap();
        let accesses = reads(&[1, 2, 3, 4, 1, 5, 2, 6]);
        let rng = RandGenerator::new(vec![4, 9, 2]).unwrap();
        let first = run_nru_random(&accesses, &initial, rng.clone()).unwrap();
        let second = run_nru_random(&accesses, &initial, rng).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!("second-chance".parse::<Policy>(), Ok(Policy::SecondChance));
        assert_eq!("OPT".parse::<Policy>(), Err(Error::UnknownPolicy("OPT".to_string())));
    }
}
