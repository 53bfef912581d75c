use std::collections::VecDeque;

use simkit::q_trace;

use crate::{Direction, Stop};

/// One head-ordering policy. Requests are queued with `add`; `next` is asked
/// for the following stop each time the head comes to rest.
pub trait IOScheduler {
    fn add(&mut self, track: usize);
    fn next(&mut self, track_head: usize) -> Option<Stop>;
}

pub struct FIFO {
    queue: VecDeque<usize>,
}

impl FIFO {
    pub fn new() -> Self {
        FIFO { queue: VecDeque::new() }
    }
}

impl IOScheduler for FIFO {
    fn add(&mut self, track: usize) {
        self.queue.push_back(track);
    }

    fn next(&mut self, _: usize) -> Option<Stop> {
        self.queue.pop_front().map(Stop::Service)
    }
}

pub struct SSTF {
    queue: Vec<usize>,
}

impl SSTF {
    pub fn new() -> Self {
        SSTF { queue: Vec::new() }
    }
}

impl IOScheduler for SSTF {
    fn add(&mut self, track: usize) {
        self.queue.push(track);
    }

    fn next(&mut self, track_head: usize) -> Option<Stop> {
        // closest request wins, the earliest queued one on equal distance
        let mut queue_string = String::new();
        let mut best: Option<(usize, usize)> = None;
        for (i, track) in self.queue.iter().enumerate() {
            let distance = track_head.abs_diff(*track);
            if best.map_or(true, |(_, min)| distance < min) {
                best = Some((i, distance));
            }
            queue_string.push_str(&format!("{}:{} ", track, distance));
        }

        let (index, _) = best?;
        q_trace!("\tGet: ({}) --> {}", queue_string.trim_end(), self.queue[index]);
        Some(Stop::Service(self.queue.remove(index)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SweepKind {
    Scan,
    CScan,
    Look,
    CLook,
}

/// SCAN, C-SCAN, LOOK and C-LOOK. They differ only in what happens at the
/// end of the first sweep, so the whole route is planned from the partition
/// of pending requests around the head and then handed out stop by stop.
pub struct Sweep {
    kind: SweepKind,
    direction: Direction,
    max_cylinder: usize,
    pending: Vec<usize>,
    plan: VecDeque<Stop>,
}

impl Sweep {
    pub fn new(kind: SweepKind, direction: Direction, max_cylinder: usize) -> Self {
        Sweep { kind, direction, max_cylinder, pending: Vec::new(), plan: VecDeque::new() }
    }

    fn plan_route(&mut self, track_head: usize) {
        let (mut below, mut above): (Vec<usize>, Vec<usize>) =
            self.pending.drain(..).partition(|&track| track < track_head);
        below.sort_unstable_by(|a, b| b.cmp(a));
        above.sort_unstable();

        // `first` is in travel order, `second` in the order a bounce off
        // `near_edge` would reach it
        let (near_edge, far_edge, first, second) = match self.direction {
            Direction::Asc => (self.max_cylinder, 0, above, below),
            Direction::Desc => (0, self.max_cylinder, below, above),
        };

        // the edges are only worth visiting on the way to the other side
        let last = first.last().copied().unwrap_or(track_head);
        self.plan.extend(first.into_iter().map(Stop::Service));

        let mut second = second;
        if !second.is_empty() {
            match self.kind {
                SweepKind::Scan => {
                    if last != near_edge {
                        self.plan.push_back(Stop::Pass(near_edge));
                    }
                }
                SweepKind::CScan => {
                    if last != near_edge {
                        self.plan.push_back(Stop::Pass(near_edge));
                    }
                    self.plan.push_back(Stop::Pass(far_edge));
                    second.reverse();
                }
                SweepKind::Look => {}
                SweepKind::CLook => second.reverse(),
            }
        }
        self.plan.extend(second.into_iter().map(Stop::Service));

        q_trace!("\tPlan: {:?}", self.plan);
    }
}

impl IOScheduler for Sweep {
    fn add(&mut self, track: usize) {
        self.pending.push(track);
    }

    fn next(&mut self, track_head: usize) -> Option<Stop> {
        if self.plan.is_empty() && !self.pending.is_empty() {
            self.plan_route(track_head);
        }
        self.plan.pop_front()
    }
}
