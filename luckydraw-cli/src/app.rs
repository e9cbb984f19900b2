use crate::controller::{command_for, Controller, Flow, Prompter};
use crate::ui::{self, Confetti, Screen, Tui};
use anyhow::Result;
use crossterm::event::{self, Event};
use dialoguer::{Confirm, Input};
use luckydraw_core::LuckyDrawError;
use luckydraw_engine::{DrawEngine, DrawView};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Redraw and input polling cadence
const FRAME: Duration = Duration::from_millis(25);

pub struct App {
    engine: DrawEngine,
    controller: Controller,
    confetti: Confetti,
}

impl App {
    pub fn new(engine: DrawEngine, controller: Controller) -> Self {
        Self {
            engine,
            controller,
            confetti: Confetti::default(),
        }
    }

    /// Runs the presentation until the host confirms exit.
    pub async fn run(mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        let mut frames = tokio::time::interval(FRAME);
        frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            self.draw(&mut tui)?;

            tokio::select! {
                token = self.engine.next_tick() => self.engine.on_tick(token),
                _ = frames.tick() => {
                    if self.handle_input(&mut tui).await? == Flow::Quit {
                        break;
                    }
                }
            }
        }

        tui.leave()?;
        tracing::info!(
            "Presenter closed with {} of {} participants still eligible",
            self.engine.remaining(),
            self.engine.total()
        );
        Ok(())
    }

    async fn handle_input(&mut self, tui: &mut Tui) -> Result<Flow> {
        while event::poll(Duration::ZERO)? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(command) = command_for(&key) else {
                continue;
            };

            let mut prompter = TerminalPrompter { tui: &mut *tui };
            let flow = self
                .controller
                .dispatch(command, &mut self.engine, &mut prompter)
                .await;
            if flow == Flow::Quit {
                return Ok(Flow::Quit);
            }
        }

        Ok(Flow::Continue)
    }

    fn draw(&mut self, tui: &mut Tui) -> Result<()> {
        let view = DrawView::project(&self.engine);
        let now = Instant::now();

        self.confetti.follow(&view, now);

        let confetti = &self.confetti;
        let status = self.controller.status();
        tui.draw(|frame| {
            ui::render(
                frame,
                Screen {
                    view: &view,
                    status,
                    confetti: confetti.is_active(now).then(|| confetti.frame(now)),
                },
            )
        })?;

        Ok(())
    }
}

/// Asks questions on the plain terminal, outside the full-screen view.
struct TerminalPrompter<'a> {
    tui: &'a mut Tui,
}

impl TerminalPrompter<'_> {
    fn with_plain_terminal<T>(
        &mut self,
        ask: impl FnOnce() -> luckydraw_core::Result<T>,
    ) -> luckydraw_core::Result<T> {
        self.tui
            .suspend()
            .map_err(|e| LuckyDrawError::terminal(e.to_string()))?;
        let answer = ask();
        self.tui
            .resume()
            .map_err(|e| LuckyDrawError::terminal(e.to_string()))?;
        answer
    }
}

impl Prompter for TerminalPrompter<'_> {
    fn confirm_exit(&mut self) -> luckydraw_core::Result<bool> {
        self.with_plain_terminal(|| {
            Ok(Confirm::new()
                .with_prompt("Are you sure you want to exit?")
                .default(false)
                .interact()?)
        })
    }

    fn roster_path(&mut self) -> luckydraw_core::Result<Option<PathBuf>> {
        self.with_plain_terminal(|| {
            let raw: String = Input::new()
                .with_prompt("Roster file (CSV, empty to cancel)")
                .allow_empty(true)
                .interact_text()?;

            let raw = raw.trim();
            Ok((!raw.is_empty()).then(|| PathBuf::from(raw)))
        })
    }
}
