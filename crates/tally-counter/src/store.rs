use std::fmt;

use crate::{Bounds, Clock, HistoryEntry, Operation, SystemClock, TransitionError};

/// Owned copy of the store's observable state. History is newest first.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CounterState {
    pub value: i32,
    pub bounds: Bounds,
    pub history: Vec<HistoryEntry>,
}

type Listener = Box<dyn FnMut(&HistoryEntry)>;

pub struct CounterStore {
    value: i32,
    bounds: Bounds,
    // Oldest first; exposed reversed.
    entries: Vec<HistoryEntry>,
    clock: Box<dyn Clock>,
    listeners: Vec<Listener>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::with_bounds(Bounds::default())
    }

    pub fn with_bounds(bounds: Bounds) -> Self {
        Self::with_clock(bounds, SystemClock)
    }

    pub fn with_clock(bounds: Bounds, clock: impl Clock) -> Self {
        Self {
            value: bounds.min(),
            bounds,
            entries: Vec::new(),
            clock: Box::new(clock),
            listeners: Vec::new(),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn can_increment(&self) -> bool {
        self.value < self.bounds.max()
    }

    pub fn can_decrement(&self) -> bool {
        self.value > self.bounds.min()
    }

    /// Newest first.
    pub fn history(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> + DoubleEndedIterator {
        self.entries.iter().rev()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> CounterState {
        CounterState {
            value: self.value,
            bounds: self.bounds,
            history: self.history().cloned().collect(),
        }
    }

    /// Registers `f` to run after every accepted transition.
    pub fn subscribe(&mut self, f: impl FnMut(&HistoryEntry) + 'static) {
        self.listeners.push(Box::new(f));
    }

    /// Adds one unless already at the maximum, in which case nothing changes.
    pub fn increment(&mut self) -> Option<&HistoryEntry> {
        self.apply(Operation::Increment)
    }

    /// Subtracts one unless already at the minimum, in which case nothing changes.
    pub fn decrement(&mut self) -> Option<&HistoryEntry> {
        self.apply(Operation::Decrement)
    }

    pub fn try_increment(&mut self) -> Result<&HistoryEntry, TransitionError> {
        self.try_apply(Operation::Increment)
    }

    pub fn try_decrement(&mut self) -> Result<&HistoryEntry, TransitionError> {
        self.try_apply(Operation::Decrement)
    }

    pub fn apply(&mut self, op: Operation) -> Option<&HistoryEntry> {
        self.try_apply(op).ok()
    }

    pub fn try_apply(&mut self, op: Operation) -> Result<&HistoryEntry, TransitionError> {
        self.guard(op).inspect_err(|e| {
            log::trace!("refused {:?} at {}: {}", op, self.value, e);
        })?;

        let timestamp = self.next_timestamp();
        let entry = HistoryEntry::record(timestamp, op, self.value);
        debug_assert!(self.bounds.contains(entry.after()));
        log::debug!("{entry} at {timestamp}");

        self.value = entry.after();
        for l in self.listeners.iter_mut() {
            l(&entry);
        }
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    fn guard(&self, op: Operation) -> Result<(), TransitionError> {
        match op {
            Operation::Increment if !self.can_increment() => Err(TransitionError::AtMaximum {
                max: self.bounds.max(),
            }),
            Operation::Decrement if !self.can_decrement() => Err(TransitionError::AtMinimum {
                min: self.bounds.min(),
            }),
            _ => Ok(()),
        }
    }

    fn next_timestamp(&self) -> u64 {
        let now = self.clock.now_millis();
        match self.entries.last() {
            Some(last) if now <= last.timestamp() => last.timestamp().saturating_add(1),
            _ => now,
        }
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CounterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterStore")
            .field("value", &self.value)
            .field("bounds", &self.bounds)
            .field("entries", &self.entries.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
