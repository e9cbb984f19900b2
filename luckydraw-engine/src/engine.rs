use crate::selection::select_uniform;
use crate::ticker::{TickToken, Ticker};
use luckydraw_core::config::DEFAULT_TICK_MS;
use luckydraw_core::{Participant, ParticipantRegistry, WinnerStore};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Draw state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawState {
    Idle,
    Running,
    Settled,
}

/// What a toggle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Animation started
    Started,
    /// Animation stopped and the displayed candidate was committed
    Settled(Participant),
    /// Animation stopped with nobody to commit
    Stopped,
    /// No roster loaded yet
    Ignored,
}

pub struct DrawEngine {
    registry: ParticipantRegistry,
    winners: WinnerStore,
    state: DrawState,
    displayed: Option<Participant>,
    celebrating: bool,
    ready: bool,
    /// Winners committed since construction, one per settle
    settles: u64,
    tick_interval: Duration,
    ticker: Option<Ticker>,
    generation: u64,
    rng: Box<dyn RngCore + Send>,
}

impl DrawEngine {
    pub fn new(winners: WinnerStore, tick_interval: Duration) -> Self {
        Self::with_rng(winners, tick_interval, Box::new(StdRng::from_entropy()))
    }

    /// A zero `tick_interval` falls back to the default cadence.
    pub fn with_rng(
        winners: WinnerStore,
        tick_interval: Duration,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let tick_interval = if tick_interval.is_zero() {
            tracing::warn!("Tick interval must be positive, using {}ms", DEFAULT_TICK_MS);
            Duration::from_millis(DEFAULT_TICK_MS)
        } else {
            tick_interval
        };

        Self {
            registry: ParticipantRegistry::new(),
            winners,
            state: DrawState::Idle,
            displayed: None,
            celebrating: false,
            ready: false,
            settles: 0,
            tick_interval,
            ticker: None,
            generation: 0,
            rng,
        }
    }

    /// Replace the roster and get ready for a fresh draw.
    ///
    /// A draw in progress is cancelled without committing anyone.
    pub fn load(&mut self, participants: Vec<Participant>) {
        if self.state == DrawState::Running {
            tracing::warn!("Roster replaced during a running draw; draw cancelled");
        }

        self.halt_ticking();
        self.registry.load(participants);
        self.state = DrawState::Idle;
        self.displayed = None;
        self.celebrating = false;
        self.ready = true;

        tracing::info!(
            "Ready to draw: {} of {} participants eligible",
            self.remaining(),
            self.total()
        );
    }

    /// Start the shuffle, or stop it and commit whoever is on screen.
    pub async fn toggle(&mut self) -> Transition {
        if !self.ready {
            tracing::debug!("Toggle ignored, no roster loaded");
            return Transition::Ignored;
        }

        match self.state {
            DrawState::Idle | DrawState::Settled => {
                self.start();
                Transition::Started
            }
            DrawState::Running => self.stop().await,
        }
    }

    fn start(&mut self) {
        self.celebrating = false;
        self.generation += 1;
        self.ticker = Some(Ticker::arm(self.tick_interval, self.generation));
        self.state = DrawState::Running;

        // the last winner is still on screen after a settle
        let needs_pick = match &self.displayed {
            Some(current) => self.winners.contains(current.identity()),
            None => true,
        };
        if needs_pick {
            self.reselect();
        }

        tracing::debug!(
            "Draw started (run {}), {} eligible",
            self.generation,
            self.remaining()
        );
    }

    async fn stop(&mut self) -> Transition {
        self.halt_ticking();

        let candidate = self
            .displayed
            .clone()
            .filter(|p| !self.winners.contains(p.identity()));

        let Some(winner) = candidate else {
            self.state = DrawState::Idle;
            tracing::debug!("Draw stopped with no eligible candidate on screen");
            return Transition::Stopped;
        };

        self.winners.commit(&winner);
        self.settles += 1;
        self.state = DrawState::Settled;
        self.celebrating = true;
        tracing::info!("Winner: {} ({} remaining)", winner, self.remaining());

        self.winners.persist().await;
        Transition::Settled(winner)
    }

    /// Drops the timer. Any token it already handed out becomes stale.
    fn halt_ticking(&mut self) {
        if self.ticker.take().is_some() {
            self.generation += 1;
        }
    }

    fn reselect(&mut self) {
        let eligible = self.registry.eligible(self.winners.record());
        match select_uniform(&eligible, self.rng.as_mut()) {
            Some(candidate) => self.displayed = Some(candidate),
            None => tracing::trace!("Nobody eligible, keeping current display"),
        }
    }

    /// Resolves at the next scheduled tick. Never resolves while the draw
    /// is not running.
    pub async fn next_tick(&mut self) -> TickToken {
        match self.ticker.as_mut() {
            Some(ticker) => ticker.tick().await,
            None => std::future::pending().await,
        }
    }

    /// Reselect on a tick. State is read here, when the tick fires, so a
    /// tick from a finished run changes nothing.
    pub fn on_tick(&mut self, token: TickToken) {
        if token.generation != self.generation || self.state != DrawState::Running {
            tracing::trace!("Dropping stale tick from run {}", token.generation);
            return;
        }

        self.reselect();
    }

    pub fn state(&self) -> DrawState {
        self.state
    }

    pub fn displayed(&self) -> Option<&Participant> {
        self.displayed.as_ref()
    }

    pub fn celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Number of winners committed by this engine
    pub fn settle_count(&self) -> u64 {
        self.settles
    }

    pub fn total(&self) -> usize {
        self.registry.len()
    }

    /// Roster entries that have not won yet
    pub fn remaining(&self) -> usize {
        self.registry.eligible_count(self.winners.record())
    }

    /// Roster entries that already won
    pub fn won_count(&self) -> usize {
        self.total() - self.remaining()
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn winners(&self) -> &WinnerStore {
        &self.winners
    }
}
