//! Victim selection. Every pager sees the whole frame table; the shared
//! hit/fault procedure lives in `MemoryState::access`.

use std::cmp::Reverse;

use simkit::{q_trace, Error, Result};

use crate::memory::MemoryState;
use crate::rand_generator::RandGenerator;

/// Only consulted once every frame is occupied.
pub trait Pager {
    fn select_victim_frame(&mut self, state: &mut MemoryState) -> Result<usize>;

    /// Whether a hit refreshes the frame timestamp.
    fn tracks_recency(&self) -> bool {
        false
    }

    fn after_access(&mut self, _state: &mut MemoryState) {}
}

fn empty_queue() -> Error {
    Error::Internal("arrival queue is empty while every frame is occupied".to_string())
}

/// Oldest load goes first. Hits do not reorder.
pub struct Fifo;

impl Pager for Fifo {
    fn select_victim_frame(&mut self, state: &mut MemoryState) -> Result<usize> {
        q_trace!("\tarrivals: {:?}", state.arrivals);
        state.arrivals.front().copied().ok_or_else(empty_queue)
    }
}

/// FIFO that spares a referenced page once, clearing its R bit and sending
/// it to the back of the queue.
pub struct SecondChance;

impl Pager for SecondChance {
    fn select_victim_frame(&mut self, state: &mut MemoryState) -> Result<usize> {
        q_trace!("\tarrivals: {:?}", state.arrivals);
        // one full lap clears every R bit, so the second lap must find a victim
        for _ in 0..=2 * state.arrivals.len() {
            let index = *state.arrivals.front().ok_or_else(empty_queue)?;
            let frame = &mut state.frames[index];
            if !frame.referenced {
                return Ok(index);
            }
            frame.referenced = false;
            state.arrivals.rotate_left(1);
        }
        Err(Error::Internal("second chance found no victim".to_string()))
    }
}

/// Not Recently Used. Picks from the lowest non-empty (R, M) class: the first
/// frame of the class, or a random one when a generator is supplied. R bits
/// are cleared after every `AGING_PERIOD` accesses.
pub struct Nru {
    rng: Option<RandGenerator>,
}

impl Nru {
    pub const AGING_PERIOD: usize = 5;

    pub fn new() -> Self {
        Nru { rng: None }
    }

    pub fn with_random(rng: RandGenerator) -> Self {
        Nru { rng: Some(rng) }
    }
}

impl Default for Nru {
    fn default() -> Self {
        Nru::new()
    }
}

impl Pager for Nru {
    fn select_victim_frame(&mut self, state: &mut MemoryState) -> Result<usize> {
        let lowest = state
            .frames
            .iter()
            .filter(|frame| !frame.is_free())
            .map(|frame| frame.class())
            .min()
            .ok_or_else(|| Error::Internal("no occupied frame to classify".to_string()))?;
        let class: Vec<usize> = state
            .frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| !frame.is_free() && frame.class() == lowest)
            .map(|(index, _)| index)
            .collect();
        q_trace!("\tclass {}: {:?}", lowest, class);

        let pick = match self.rng.as_mut() {
            Some(rng) => rng.next(class.len()),
            None => 0,
        };
        Ok(class[pick])
    }

    fn after_access(&mut self, state: &mut MemoryState) {
        if state.accesses % Self::AGING_PERIOD == 0 {
            q_trace!("\treset R bits after access {}", state.accesses);
            for frame in state.frames.iter_mut() {
                frame.referenced = false;
            }
        }
    }
}

/// Least recently touched frame.
pub struct Lru;

impl Pager for Lru {
    fn select_victim_frame(&mut self, state: &mut MemoryState) -> Result<usize> {
        state
            .frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| !frame.is_free())
            .min_by_key(|(_, frame)| frame.timestamp)
            .map(|(index, _)| index)
            .ok_or_else(|| Error::Internal("no occupied frame to evict".to_string()))
    }

    fn tracks_recency(&self) -> bool {
        true
    }
}

/// Circular scan over the frames, clearing R bits until an unreferenced
/// frame sits under the hand.
pub struct Clock;

impl Pager for Clock {
    fn select_victim_frame(&mut self, state: &mut MemoryState) -> Result<usize> {
        let len = state.frames.len();
        for _ in 0..=2 * len {
            let index = state.hand;
            state.hand = (state.hand + 1) % len;
            let frame = &mut state.frames[index];
            if !frame.referenced {
                return Ok(index);
            }
            frame.referenced = false;
        }
        Err(Error::Internal("clock hand found no victim".to_string()))
    }
}

/// Least frequently used page, oldest placement on ties.
pub struct Lfu;

impl Pager for Lfu {
    fn select_victim_frame(&mut self, state: &mut MemoryState) -> Result<usize> {
        state
            .frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| !frame.is_free())
            .min_by_key(|(_, frame)| (frame.frequency, frame.timestamp))
            .map(|(index, _)| index)
            .ok_or_else(|| Error::Internal("no occupied frame to evict".to_string()))
    }
}

/// Most frequently used page, oldest placement on ties.
pub struct Mfu;

impl Pager for Mfu {
    fn select_victim_frame(&mut self, state: &mut MemoryState) -> Result<usize> {
        state
            .frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| !frame.is_free())
            .min_by_key(|(_, frame)| (Reverse(frame.frequency), frame.timestamp))
            .map(|(index, _)| index)
            .ok_or_else(|| Error::Internal("no occupied frame to evict".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Access;

    fn full(pages: &[usize]) -> MemoryState {
        MemoryState::preload(pages.len(), pages).unwrap()
    }

    #[test]
    fn fifo_with_a_corrupt_queue_is_a_defect() {
        let mut state = full(&[1, 2]);
        state.arrivals.clear();
        let err = state.access(&mut Fifo, Access::read(3)).unwrap_err();
        assert!(err.is_defect());
    }

    #[test]
    fn second_chance_requeues_referenced_pages() {
        let mut state = full(&[1, 2, 3]);
        state.frames[0].referenced = true;
        state.frames[1].referenced = false;
        state.frames[2].referenced = true;
        assert_eq!(SecondChance.select_victim_frame(&mut state).unwrap(), 1);
        assert!(!state.frames[0].referenced);
        assert_eq!(state.arrivals, vec![1, 2, 0]);
    }

    #[test]
    fn nru_prefers_clean_unreferenced_frames() {
        let mut state = full(&[1, 2, 3, 4]);
        let bits = [(true, true), (false, true), (true, false), (false, true)];
        for (frame, (r, m)) in state.frames.iter_mut().zip(bits) {
            frame.referenced = r;
            frame.modified = m;
        }
        // class 1 (R=0, M=1) holds frames 1 and 3
        assert_eq!(Nru::new().select_victim_frame(&mut state).unwrap(), 1);

        let rng = RandGenerator::new(vec![7]).unwrap();
        assert_eq!(Nru::with_random(rng).select_victim_frame(&mut state).unwrap(), 3);
    }

    #[test]
    fn nru_ages_every_fifth_access() {
        let mut state = MemoryState::new(4).unwrap();
        let mut nru = Nru::new();
        for page in [1, 2, 3, 4] {
            state.access(&mut nru, Access::read(page)).unwrap();
        }
        assert!(state.frames().iter().all(|frame| frame.referenced));
        state.access(&mut nru, Access::read(1)).unwrap();
        assert!(state.frames().iter().all(|frame| !frame.referenced));
    }

    #[test]
    fn clock_hand_moves_past_the_victim() {
        let mut state = full(&[1, 2, 3]);
        state.frames[1].referenced = false;
        assert_eq!(Clock.select_victim_frame(&mut state).unwrap(), 1);
        assert_eq!(state.hand, 2);
        assert!(!state.frames[0].referenced);
        assert!(state.frames[2].referenced);
    }

    #[test]
    fn frequency_ties_go_to_the_oldest_placement() {
        let mut state = full(&[1, 2, 3]);
        state.frames[0].frequency = 3;
        // frames 1 and 2 share frequency 1; frame 1 was placed first
        assert_eq!(Lfu.select_victim_frame(&mut state).unwrap(), 1);
        assert_eq!(Mfu.select_victim_frame(&mut state).unwrap(), 0);
        state.frames[0].frequency = 1;
        assert_eq!(Mfu.select_victim_frame(&mut state).unwrap(), 0);
    }
}
