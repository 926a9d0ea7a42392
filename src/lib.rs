//! Timeline core: lane packing for dated items and the drag, resize and
//! rename gestures that edit them.

pub mod board;
pub mod config;
pub mod error;
pub mod interaction;
pub mod io;
pub mod lanes;
pub mod model;

pub use board::Board;
pub use error::{Result, TimelineError};
pub use lanes::{pack, Packing, PlacedItem};
