use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Display};

use simkit::{Error, Result};

use crate::pager::Pager;

pub const DEFAULT_FRAME_COUNT: usize = 4;

/// One physical frame. `timestamp` is the logical clock value of the last
/// placement (or last touch, for recency-tracking pagers); `frequency` is the
/// page's access count carried over from earlier residencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Frame {
    pub page: Option<usize>,
    pub referenced: bool,
    pub modified: bool,
    pub valid: bool,
    pub timestamp: u64,
    pub frequency: u64,
}

impl Frame {
    pub fn is_free(&self) -> bool {
        self.page.is_none()
    }

    /// NRU class: 0 = (R=0, M=0) up to 3 = (R=1, M=1).
    pub fn class(&self) -> u8 {
        ((self.referenced as u8) << 1) | self.modified as u8
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            None => f.write_str("*"),
            Some(page) => write!(
                f,
                "{}:{}{}{} t={} f={}",
                page,
                if self.referenced { 'R' } else { '-' },
                if self.modified { 'M' } else { '-' },
                if self.valid { 'V' } else { '-' },
                self.timestamp,
                self.frequency
            ),
        }
    }
}

/// A page reference; `modified` is the `*` of the textual notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub page: usize,
    pub modified: bool,
}

impl Access {
    pub fn read(page: usize) -> Self {
        Access { page, modified: false }
    }

    pub fn write(page: usize) -> Self {
        Access { page, modified: true }
    }
}

/// What one access did to the frame table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessEvent {
    Hit { page: usize, frame: usize },
    /// fault served from a free frame
    Fault { page: usize, frame: usize },
    /// fault that evicted `victim` from `frame`
    Replace { page: usize, frame: usize, victim: usize },
}

impl AccessEvent {
    pub fn is_fault(&self) -> bool {
        !matches!(self, AccessEvent::Hit { .. })
    }
}

/// Frame table plus the bookkeeping every policy may read. Owned by exactly
/// one run; comparisons start each policy from its own clone.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryState {
    pub(crate) frames: Vec<Frame>,
    pub(crate) faults: usize,
    pub(crate) clock: u64,
    pub(crate) accesses: usize,
    /// per-page access counts, kept across evictions
    pub(crate) frequencies: HashMap<usize, u64>,
    /// clock hand
    pub(crate) hand: usize,
    /// occupied frames in load order, oldest first
    pub(crate) arrivals: VecDeque<usize>,
}

impl MemoryState {
    pub fn new(frame_count: usize) -> Result<MemoryState> {
        if frame_count == 0 {
            return Err(Error::InvalidInput("frame count must be positive".to_string()));
        }
        Ok(MemoryState {
            frames: vec![Frame::default(); frame_count],
            faults: 0,
            clock: 0,
            accesses: 0,
            frequencies: HashMap::new(),
            hand: 0,
            arrivals: VecDeque::with_capacity(frame_count),
        })
    }

    /// Frame table with `pages` already resident in the first frames, each
    /// referenced, clean, and counted once.
    pub fn preload(frame_count: usize, pages: &[usize]) -> Result<MemoryState> {
        let mut state = MemoryState::new(frame_count)?;
        if pages.len() > frame_count {
            return Err(Error::InvalidInput(format!(
                "{} preloaded pages do not fit in {} frames",
                pages.len(),
                frame_count
            )));
        }
        for (i, page) in pages.iter().enumerate() {
            if pages[..i].contains(page) {
                return Err(Error::InvalidInput(format!("page {} preloaded twice", page)));
            }
        }

        for (frame, &page) in pages.iter().enumerate() {
            let now = state.tick();
            state.place(frame, Access::read(page), now);
        }
        Ok(state)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn faults(&self) -> usize {
        self.faults
    }

    /// Resident pages by frame, `None` for free frames.
    pub fn pages(&self) -> Vec<Option<usize>> {
        self.frames.iter().map(|frame| frame.page).collect()
    }

    pub fn frequency(&self, page: usize) -> u64 {
        self.frequencies.get(&page).copied().unwrap_or(0)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn count(&mut self, page: usize) -> u64 {
        let count = self.frequencies.entry(page).or_insert(0);
        *count += 1;
        *count
    }

    fn find(&self, page: usize) -> Option<usize> {
        self.frames.iter().position(|frame| frame.page == Some(page))
    }

    fn free_frame(&self) -> Option<usize> {
        self.frames.iter().position(Frame::is_free)
    }

    fn place(&mut self, frame: usize, access: Access, now: u64) {
        let frequency = self.count(access.page);
        self.frames[frame] = Frame {
            page: Some(access.page),
            referenced: true,
            modified: access.modified,
            valid: true,
            timestamp: now,
            frequency,
        };
        self.arrivals.push_back(frame);
    }

    /// Applies one access: a hit updates the frame's bits, a miss counts a
    /// fault and fills a free frame or the victim `pager` picks.
    pub fn access(&mut self, pager: &mut dyn Pager, access: Access) -> Result<AccessEvent> {
        self.accesses += 1;
        let now = self.tick();

        let event = if let Some(index) = self.find(access.page) {
            let frequency = self.count(access.page);
            let recency = pager.tracks_recency();
            let frame = &mut self.frames[index];
            frame.referenced = true;
            frame.modified |= access.modified;
            frame.frequency = frequency;
            if recency {
                frame.timestamp = now;
            }
            AccessEvent::Hit { page: access.page, frame: index }
        } else {
            self.faults += 1;
            match self.free_frame() {
                Some(index) => {
                    self.place(index, access, now);
                    AccessEvent::Fault { page: access.page, frame: index }
                }
                None => {
                    let index = pager.select_victim_frame(self)?;
                    let victim = self
                        .frames
                        .get(index)
                        .and_then(|frame| frame.page)
                        .ok_or_else(|| {
                            Error::Internal(format!("victim frame {} is not occupied", index))
                        })?;
                    self.arrivals.retain(|&frame| frame != index);
                    self.place(index, access, now);
                    AccessEvent::Replace { page: access.page, frame: index, victim }
                }
            }
        };

        pager.after_access(self);
        Ok(event)
    }
}
