//! LuckyDraw engine
//!
//! Drives a live drawing: shuffles through the eligible participants on a
//! fixed tick while running and commits whoever is on screen when stopped.

pub mod engine;
pub mod selection;
pub mod ticker;
pub mod view;

pub use engine::{DrawEngine, DrawState, Transition};
pub use selection::select_uniform;
pub use ticker::TickToken;
pub use view::{DrawView, ViewPhase};
