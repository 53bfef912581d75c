pub type Pid = usize;

/// A job to schedule. `burst_time`, `priority` and `arrival` come from the
/// input; the remaining fields are filled in by a scheduling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    pub pid: Pid,
    pub burst_time: usize,
    /// lower is more urgent
    pub priority: i32,
    pub arrival: usize,

    // stats
    pub start: usize,
    pub end: usize,
    pub waiting_time: usize,
    pub turnaround_time: usize,
}

impl Process {
    pub fn new(pid: Pid, burst_time: usize, priority: i32, arrival: usize) -> Process {
        Process {
            pid,
            burst_time,
            priority,
            arrival,
            start: 0,
            end: 0,
            waiting_time: 0,
            turnaround_time: 0,
        }
    }

    /// Records completion. `start` is the first dispatch, `end` the moment
    /// the last slice finished.
    pub(crate) fn finish(&mut self, start: usize, end: usize) {
        self.start = start;
        self.end = end;
        self.turnaround_time = end - self.arrival;
        self.waiting_time = self.turnaround_time - self.burst_time;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_derives_waiting_from_turnaround() {
        let mut process = Process::new(1, 4, 0, 2);
        process.finish(5, 11);
        assert_eq!(process.turnaround_time, 9);
        assert_eq!(process.waiting_time, 5);
        assert_eq!(process.turnaround_time, process.waiting_time + process.burst_time);
    }
}
