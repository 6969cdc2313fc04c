use thiserror::Error;

use crate::Operation;

/// A transition was refused because it would leave the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("counter is already at its maximum of {max}")]
    AtMaximum { max: i32 },
    #[error("counter is already at its minimum of {min}")]
    AtMinimum { min: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("minimum {min} is greater than maximum {max}")]
    Inverted { min: i32, max: i32 },
}

/// A stored entry whose values disagree with its operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("{operation:?} cannot go from {before} to {after}")]
    Inconsistent {
        operation: Operation,
        before: i32,
        after: i32,
    },
}
