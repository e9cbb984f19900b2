//! Maps keys to draw commands and carries them out.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use luckydraw_core::{CsvRecordSource, RecordSource, Result};
use luckydraw_engine::{DrawEngine, Transition};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    OpenRoster,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(Command::Toggle),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Exit),
        KeyCode::Char('o') | KeyCode::Char('O') => Some(Command::OpenRoster),
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Exit),
        _ => None,
    }
}

/// Questions the controller needs a human to answer
pub trait Prompter {
    fn confirm_exit(&mut self) -> Result<bool>;

    /// `None` when the user backs out
    fn roster_path(&mut self) -> Result<Option<PathBuf>>;
}

#[derive(Debug, Default)]
pub struct Controller {
    status: Option<String>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last thing worth telling the host, shown in the footer
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub async fn dispatch(
        &mut self,
        command: Command,
        engine: &mut DrawEngine,
        prompter: &mut dyn Prompter,
    ) -> Flow {
        match command {
            Command::Toggle => {
                match engine.toggle().await {
                    Transition::Started => self.status = None,
                    Transition::Settled(winner) => {
                        tracing::info!("Settled on {}", winner);
                    }
                    Transition::Stopped => {}
                    Transition::Ignored => self.set_status("Open a roster first (o)"),
                }
                Flow::Continue
            }
            Command::OpenRoster => {
                match prompter.roster_path() {
                    Ok(Some(path)) => self.load_roster(&CsvRecordSource::new(path), engine).await,
                    Ok(None) => tracing::debug!("Roster selection cancelled"),
                    Err(e) => tracing::warn!("Roster prompt failed: {}", e),
                }
                Flow::Continue
            }
            Command::Exit => match prompter.confirm_exit() {
                Ok(true) => Flow::Quit,
                Ok(false) => Flow::Continue,
                Err(e) => {
                    tracing::warn!("Exit confirmation failed: {}", e);
                    Flow::Continue
                }
            },
        }
    }

    /// Reads a roster and hands it to the engine. A failed read leaves the
    /// current roster in place.
    pub async fn load_roster(&mut self, source: &dyn RecordSource, engine: &mut DrawEngine) {
        match source.read().await {
            Ok(participants) => {
                engine.load(participants);
                self.set_status(format!(
                    "{} participants from {}",
                    engine.total(),
                    source.describe()
                ));
            }
            Err(e) => {
                tracing::error!("Could not load roster {}: {}", source.describe(), e);
                self.set_status("Roster not loaded, see log");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use luckydraw_core::{DrawConfig, LuckyDrawError, SqliteWinnerBackend, Storage, WinnerStore};
    use luckydraw_engine::DrawState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Scripted {
        exit_answers: Vec<Result<bool>>,
        paths: Vec<Option<PathBuf>>,
    }

    impl Prompter for Scripted {
        fn confirm_exit(&mut self) -> Result<bool> {
            self.exit_answers.remove(0)
        }

        fn roster_path(&mut self) -> Result<Option<PathBuf>> {
            Ok(self.paths.remove(0))
        }
    }

    async fn engine() -> DrawEngine {
        let storage = Arc::new(Storage::in_memory().await.unwrap());
        let backend = Arc::new(SqliteWinnerBackend::new(storage, "winners"));
        let winners = WinnerStore::initialize(backend, &DrawConfig::default()).await;
        DrawEngine::with_rng(
            winners,
            Duration::from_millis(50),
            Box::new(StdRng::seed_from_u64(5)),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(command_for(&key(KeyCode::Char(' '))), Some(Command::Toggle));
        assert_eq!(command_for(&key(KeyCode::Enter)), Some(Command::Toggle));
        assert_eq!(command_for(&key(KeyCode::Esc)), Some(Command::Exit));
        assert_eq!(command_for(&key(KeyCode::Char('o'))), Some(Command::OpenRoster));
        assert_eq!(
            command_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Exit)
        );
        assert_eq!(command_for(&key(KeyCode::Char('x'))), None);

        let mut release = key(KeyCode::Char(' '));
        release.kind = KeyEventKind::Release;
        assert_eq!(command_for(&release), None);
    }

    #[tokio::test]
    async fn test_exit_requires_confirmation() {
        let mut engine = engine().await;
        let mut controller = Controller::new();
        let mut prompter = Scripted {
            exit_answers: vec![
                Ok(false),
                Err(LuckyDrawError::dialog("not a terminal")),
                Ok(true),
            ],
            ..Scripted::default()
        };

        for expected in [Flow::Continue, Flow::Continue, Flow::Quit] {
            let flow = controller
                .dispatch(Command::Exit, &mut engine, &mut prompter)
                .await;
            assert_eq!(flow, expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_roster_then_draw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.csv");
        tokio::fs::write(&path, "Name,Identifier\nAda,1\nGrace,2\n")
            .await
            .unwrap();

        let mut engine = engine().await;
        let mut controller = Controller::new();
        let mut prompter = Scripted {
            paths: vec![Some(path)],
            ..Scripted::default()
        };

        controller
            .dispatch(Command::Toggle, &mut engine, &mut prompter)
            .await;
        assert_eq!(engine.state(), DrawState::Idle);
        assert!(controller.status().is_some());

        controller
            .dispatch(Command::OpenRoster, &mut engine, &mut prompter)
            .await;
        assert!(engine.is_ready());
        assert_eq!(engine.total(), 2);

        controller
            .dispatch(Command::Toggle, &mut engine, &mut prompter)
            .await;
        assert_eq!(engine.state(), DrawState::Running);
        controller
            .dispatch(Command::Toggle, &mut engine, &mut prompter)
            .await;
        assert_eq!(engine.state(), DrawState::Settled);
        assert_eq!(engine.remaining(), 1);
    }

    #[tokio::test]
    async fn test_bad_roster_keeps_previous_one() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.csv");
        let bad = dir.path().join("bad.csv");
        tokio::fs::write(&good, "Name\nAda\nGrace\nLinus\n").await.unwrap();
        tokio::fs::write(&bad, "Name,Identifier\n,7\n").await.unwrap();

        let mut engine = engine().await;
        let mut controller = Controller::new();
        controller
            .load_roster(&CsvRecordSource::new(&good), &mut engine)
            .await;
        assert_eq!(engine.total(), 3);

        let mut prompter = Scripted {
            paths: vec![Some(bad), None],
            ..Scripted::default()
        };
        controller
            .dispatch(Command::OpenRoster, &mut engine, &mut prompter)
            .await;
        assert_eq!(engine.total(), 3);
        assert_eq!(controller.status(), Some("Roster not loaded, see log"));

        // cancelling the prompt changes nothing either
        controller
            .dispatch(Command::OpenRoster, &mut engine, &mut prompter)
            .await;
        assert_eq!(engine.total(), 3);
    }
}
