//! # Counter store
//!
//! A single bounded integer plus the history of every transition applied to
//! it. The store is an ordinary value: construct it, hand it to whatever owns
//! the UI, and mutate it through the two transitions.
//!
//! ```rust
//! use tally_counter::*;
//!
//! let mut store = CounterStore::new();
//! store.increment();
//! store.increment();
//! store.decrement();
//! assert_eq!(store.value(), 1);
//! assert_eq!(store.len(), 3);
//!
//! // Newest first.
//! let latest = store.history().next().unwrap();
//! assert_eq!(latest.operation(), Operation::Decrement);
//! assert_eq!(latest.to_string(), "Decremented from 2 to 1");
//! ```
//!
//! ## Guards
//!
//! `increment` and `decrement` are no-ops at the bounds: the value stays put
//! and nothing is recorded. Use `try_increment` / `try_decrement` when the
//! refusal should be reported instead:
//!
//! ```rust
//! use tally_counter::*;
//!
//! let mut store = CounterStore::new();
//! assert!(store.decrement().is_none());
//! assert_eq!(
//!     store.try_decrement().unwrap_err(),
//!     TransitionError::AtMinimum { min: 0 }
//! );
//! ```
//!
//! ## Time
//!
//! Entries are stamped with milliseconds since the Unix epoch from a `Clock`.
//! `SystemClock` is the default; `ManualClock` makes tests deterministic.

pub mod bounds;
pub mod clock;
pub mod error;
pub mod history;
pub mod store;
mod tests;

pub use bounds::*;
pub use clock::*;
pub use error::*;
pub use history::*;
pub use store::*;
