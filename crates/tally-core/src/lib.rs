//! # Views, modifiers and frames
//!
//! A UI is a tree of `View` values rebuilt from application state on every
//! frame. There is no retained widget state in this crate: anything that must
//! survive between frames (scroll offsets, the app's model) is owned by the
//! caller and reached through closures stored on the view.
//!
//! ```rust
//! use tally_core::*;
//!
//! let v = View::new(0, ViewKind::Column)
//!     .modifier(Modifier::new().padding(16.0).fill_max_width())
//!     .with_children(vec![View::new(
//!         0,
//!         ViewKind::Text {
//!             text: "Hello".into(),
//!             color: Color::WHITE,
//!             font_size: 16.0,
//!         },
//!     )]);
//! assert_eq!(v.children.len(), 1);
//! ```
//!
//! Layout turns the tree into a `Frame`: a flat `Scene` for the renderer,
//! hit regions for input routing and semantics nodes for inspection.
//!
//! Visual parameters (`Theme`, `Density`, `TextScale`) live in `Locals`, which
//! is passed explicitly to layout and to the app's view functions.

pub mod color;
pub mod geometry;
pub mod locals;
pub mod modifier;
pub mod render_api;
pub mod runtime;
pub mod semantics;
pub mod tests;
pub mod view;

pub use color::*;
pub use geometry::*;
pub use locals::*;
pub use modifier::*;
pub use render_api::*;
pub use runtime::*;
pub use semantics::*;
pub use view::*;
