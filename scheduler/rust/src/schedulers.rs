//! Ready queues. Each one decides which admitted process runs next and for
//! how long it may hold the CPU before the simulation asks again.

use std::collections::VecDeque;

use simkit::q_trace;

use crate::process::{Pid, Process};

/// Slice budget handed out with a dispatch. `None` means run to completion.
pub type Budget = Option<usize>;

/// Quanta for the three MLFQ levels; the last level is FCFS.
pub const MLFQ_QUANTA: [Budget; 3] = [Some(2), Some(4), None];

pub trait Scheduler {
    /// A process has arrived and is ready.
    fn add_process(&mut self, process: &Process);

    /// Removes and returns the next process to run, with its budget.
    fn get_next_process(&mut self) -> Option<(Pid, Budget)>;

    /// The dispatched process used its whole budget and still has work.
    fn preempted(&mut self, process: &Process) {
        self.add_process(process);
    }
}

#[derive(Default)]
pub struct FCFS {
    queue: VecDeque<Pid>,
}

impl FCFS {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for FCFS {
    fn add_process(&mut self, process: &Process) {
        self.queue.push_back(process.pid);
    }

    fn get_next_process(&mut self) -> Option<(Pid, Budget)> {
        self.queue.pop_front().map(|pid| (pid, None))
    }
}

pub struct RR {
    queue: VecDeque<Pid>,
    quantum: usize,
}

impl RR {
    pub fn new(quantum: usize) -> Self {
        RR { queue: VecDeque::new(), quantum }
    }
}

impl Scheduler for RR {
    fn add_process(&mut self, process: &Process) {
        self.queue.push_back(process.pid);
        q_trace!("RR queue: {:?}", self.queue);
    }

    fn get_next_process(&mut self) -> Option<(Pid, Budget)> {
        self.queue.pop_front().map(|pid| (pid, Some(self.quantum)))
    }
}

/// Non-preemptive selection of the smallest key among ready processes.
/// Ties fall to the earlier key component, then to insertion order.
pub struct Shortest<K: Ord> {
    ready: Vec<(K, Pid)>,
    key: fn(&Process) -> K,
}

impl<K: Ord> Shortest<K> {
    pub fn new(key: fn(&Process) -> K) -> Self {
        Shortest { ready: Vec::new(), key }
    }
}

/// Shortest job first: burst, then pid.
pub fn sjf() -> Shortest<(usize, Pid)> {
    Shortest::new(|p| (p.burst_time, p.pid))
}

/// Lowest priority number first: priority, then arrival, then pid.
pub fn priority() -> Shortest<(i32, usize, Pid)> {
    Shortest::new(|p| (p.priority, p.arrival, p.pid))
}

impl<K: Ord> Scheduler for Shortest<K> {
    fn add_process(&mut self, process: &Process) {
        self.ready.push(((self.key)(process), process.pid));
    }

    fn get_next_process(&mut self) -> Option<(Pid, Budget)> {
        let at = self
            .ready
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.0.cmp(&b.0))
            .map(|(i, _)| i)?;
        Some((self.ready.remove(at).1, None))
    }
}

/// Multilevel feedback queue. New arrivals enter the top level; a process
/// that exhausts its budget drops one level. Lower levels only run while
/// every higher level is empty.
#[derive(Default)]
pub struct MLFQ {
    levels: [VecDeque<Pid>; 3],
    running_level: usize,
}

impl MLFQ {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for MLFQ {
    fn add_process(&mut self, process: &Process) {
        self.levels[0].push_back(process.pid);
    }

    fn get_next_process(&mut self) -> Option<(Pid, Budget)> {
        let (level, queue) = self.levels.iter_mut().enumerate().find(|(_, q)| !q.is_empty())?;
        let pid = queue.pop_front()?;
        self.running_level = level;
        Some((pid, MLFQ_QUANTA[level]))
    }

    fn preempted(&mut self, process: &Process) {
        let level = (self.running_level + 1).min(self.levels.len() - 1);
        q_trace!("MLFQ: demote {} to level {}", process.pid, level);
        self.levels[level].push_back(process.pid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn procs() -> Vec<Process> {
        vec![Process::new(1, 5, 2, 0), Process::new(2, 1, 2, 0), Process::new(3, 1, 1, 3)]
    }

    fn drain(scheduler: &mut dyn Scheduler) -> Vec<Pid> {
        std::iter::from_fn(|| scheduler.get_next_process().map(|(pid, _)| pid)).collect()
    }

    #[test]
    fn fcfs_keeps_arrival_order() {
        let mut s = FCFS::new();
        procs().iter().for_each(|p| s.add_process(p));
        assert_eq!(drain(&mut s), vec![1, 2, 3]);
    }

    #[test]
    fn sjf_breaks_ties_by_pid() {
        let mut s = sjf();
        procs().iter().rev().for_each(|p| s.add_process(p));
        assert_eq!(drain(&mut s), vec![2, 3, 1]);
    }

    #[test]
    fn priority_breaks_ties_by_arrival() {
        let mut s = priority();
        procs().iter().rev().for_each(|p| s.add_process(p));
        assert_eq!(drain(&mut s), vec![3, 1, 2]);
    }

    #[test]
    fn rr_hands_out_the_quantum() {
        let mut s = RR::new(3);
        s.add_process(&procs()[0]);
        assert_eq!(s.get_next_process(), Some((1, Some(3))));
        assert_eq!(s.get_next_process(), None);
    }

    #[test]
    fn mlfq_demotes_and_prefers_higher_levels() {
        let p = procs();
        let mut s = MLFQ::new();
        s.add_process(&p[0]);
        assert_eq!(s.get_next_process(), Some((1, Some(2))));
        s.preempted(&p[0]);
        s.add_process(&p[1]);
        assert_eq!(s.get_next_process(), Some((2, Some(2))));
        assert_eq!(s.get_next_process(), Some((1, Some(4))));
        s.preempted(&p[0]);
        assert_eq!(s.get_next_process(), Some((1, None)));
    }
}
