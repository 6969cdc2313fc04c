#![allow(non_snake_case)]
//! Bounded counter with an operation history.
//!
//! ```rust
//! use tally_app::CounterApp;
//! use tally_core::Locals;
//! use tally_counter::Operation;
//!
//! let app = CounterApp::new();
//! app.dispatch(Operation::Increment);
//! assert_eq!(app.store().value(), 1);
//! let _view = app.view(&Locals::default());
//! ```

pub mod app;
pub mod format;
pub mod screen;

#[cfg(all(target_os = "android", feature = "android"))]
mod android;

pub use app::CounterApp;
pub use format::relative_time;
pub use screen::*;
