//! Renderable projection of the engine. Holds no state of its own.

use crate::engine::{DrawEngine, DrawState};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewPhase {
    /// Nothing loaded; the presenter should offer to open a roster
    AwaitingRoster,
    Ready,
    Shuffling,
    Winner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawView {
    pub phase: ViewPhase,
    /// Candidate name, large
    pub headline: Option<String>,
    /// Identifier shown under the name
    pub detail: Option<String>,
    pub show_winner_banner: bool,
    pub celebrate: bool,
    /// Changes with every new winner, even when `celebrate` stays set
    pub settle_count: u64,
    pub remaining: usize,
    pub total: usize,
}

impl DrawView {
    pub fn project(engine: &DrawEngine) -> Self {
        let phase = if !engine.is_ready() {
            ViewPhase::AwaitingRoster
        } else {
            match engine.state() {
                DrawState::Idle => ViewPhase::Ready,
                DrawState::Running => ViewPhase::Shuffling,
                DrawState::Settled => ViewPhase::Winner,
            }
        };

        let displayed = engine.displayed();

        Self {
            phase,
            headline: displayed.map(|p| p.identity().to_string()),
            detail: displayed.and_then(|p| p.identifier()).map(str::to_string),
            show_winner_banner: phase == ViewPhase::Winner,
            celebrate: phase == ViewPhase::Winner && engine.celebrating(),
            settle_count: engine.settle_count(),
            remaining: engine.remaining(),
            total: engine.total(),
        }
    }
}
