use std::fmt;

#[cfg(feature = "serde")]
use crate::EntryError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Operation {
    Increment,
    Decrement,
}

impl Operation {
    pub fn delta(self) -> i32 {
        match self {
            Operation::Increment => 1,
            Operation::Decrement => -1,
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            Operation::Increment => "Incremented",
            Operation::Decrement => "Decremented",
        }
    }
}

/// One applied transition. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawEntry"))]
pub struct HistoryEntry {
    timestamp: u64,
    operation: Operation,
    before: i32,
    after: i32,
}

impl HistoryEntry {
    pub(crate) fn record(timestamp: u64, operation: Operation, before: i32) -> Self {
        Self {
            timestamp,
            operation,
            before,
            after: before + operation.delta(),
        }
    }

    /// Milliseconds since the Unix epoch. Unique within a store.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Stable identity for list rows.
    pub fn key(&self) -> u64 {
        self.timestamp
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn before(&self) -> i32 {
        self.before
    }

    pub fn after(&self) -> i32 {
        self.after
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawEntry {
    timestamp: u64,
    operation: Operation,
    before: i32,
    after: i32,
}

#[cfg(feature = "serde")]
impl TryFrom<RawEntry> for HistoryEntry {
    type Error = EntryError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let entry = HistoryEntry::record(raw.timestamp, raw.operation, raw.before);
        if entry.after != raw.after {
            return Err(EntryError::Inconsistent {
                operation: raw.operation,
                before: raw.before,
                after: raw.after,
            });
        }
        Ok(entry)
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} from {} to {}",
            self.operation.past_tense(),
            self.before,
            self.after
        )
    }
}
