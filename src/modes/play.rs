use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::interval;
use tracing::{info, warn};

use crate::game::{Command, FrameClock, GameConfig, GameEngine, GameState, Phase};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::{RenderOptions, Renderer};
use crate::service::{ScoreService, ScoreSubmission, ServiceResult, SubmitReceipt};
use crate::storage::BestScoreStore;

/// Display refresh rate driving both the frame clock and redraws
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Interactive game in the terminal
pub struct PlayMode {
    engine: GameEngine,
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    options: RenderOptions,
    input_handler: InputHandler,
    clock: FrameClock,
    store: Option<BestScoreStore>,
    service: Option<Arc<dyn ScoreService>>,
    submission_tx: UnboundedSender<ServiceResult<SubmitReceipt>>,
    submission_rx: UnboundedReceiver<ServiceResult<SubmitReceipt>>,
    should_quit: bool,
}

impl PlayMode {
    pub fn new(config: GameConfig) -> Self {
        Self::with_engine(GameEngine::new(config))
    }

    pub fn with_engine(mut engine: GameEngine) -> Self {
        let state = engine.new_game();
        let (submission_tx, submission_rx) = unbounded_channel();

        Self {
            engine,
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            options: RenderOptions::default(),
            input_handler: InputHandler::new(),
            clock: FrameClock::new(),
            store: None,
            service: None,
            submission_tx,
            submission_rx,
            should_quit: false,
        }
    }

    /// Persist best scores to `store`, seeding the session best from it
    pub fn with_store(mut self, store: BestScoreStore) -> Self {
        match store.load() {
            Ok(best) => self.metrics = GameMetrics::with_best_score(best),
            Err(err) => warn!(error = %err, "ignoring unreadable best score"),
        }
        self.store = Some(store);
        self
    }

    /// Submit finished games to `service`
    pub fn with_service(mut self, service: Arc<dyn ScoreService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut frame_timer = interval(FRAME_INTERVAL);
        let mut last_frame = Instant::now();

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Frame: advance the simulation, then redraw
                _ = frame_timer.tick() => {
                    let now = Instant::now();
                    self.advance(now - last_frame);
                    last_frame = now;

                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.metrics, &self.options);
                    }).context("Failed to draw frame")?;
                }

                // Score submission finished
                Some(outcome) = self.submission_rx.recv() => {
                    self.on_submission(outcome);
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Game(command) => self.handle_command(command),
                KeyAction::ToggleGrid => self.options.show_grid = !self.options.show_grid,
                KeyAction::Quit => self.should_quit = true,
                KeyAction::None => {}
            }
        }
    }

    fn handle_command(&mut self, command: Command) {
        let before = self.state.phase;
        self.engine.apply(&mut self.state, command);
        let after = self.state.phase;

        if after == Phase::Running && before != Phase::Running {
            // Resuming never replays time spent paused
            self.clock.reset();
            if before != Phase::Paused {
                self.metrics.on_game_start();
            }
        }
    }

    /// Feed wall-clock time into the frame clock and run whatever ticks are due
    fn advance(&mut self, delta: Duration) {
        if !self.state.is_running() {
            return;
        }

        self.clock.accumulate(delta);
        while self.clock.try_tick(self.engine.tick_interval(&self.state)) {
            let result = self.engine.tick(&mut self.state);
            if result.terminated() {
                self.finish_game();
                break;
            }
        }
    }

    fn finish_game(&mut self) {
        let score = self.state.score;
        let time_played = self.state.elapsed.as_secs();

        if self.metrics.on_game_over(score) {
            if let Some(store) = &self.store {
                if let Err(err) = store.record(score, time_played) {
                    warn!(error = %err, "failed to save best score");
                }
            }
        }

        // The service treats a zero score as missing
        if score > 0 {
            self.submit_score(ScoreSubmission { score, time_played });
        }
    }

    fn submit_score(&mut self, submission: ScoreSubmission) {
        let Some(service) = self.service.clone() else {
            return;
        };

        self.metrics.submission_status = Some("Submitting score...".to_string());
        let tx = self.submission_tx.clone();
        tokio::task::spawn_blocking(move || {
            // Receiver gone means the game has quit; nothing left to report to
            let _ = tx.send(service.submit_score(submission));
        });
    }

    fn on_submission(&mut self, outcome: ServiceResult<SubmitReceipt>) {
        let status = match outcome {
            Ok(receipt) => {
                info!(id = ?receipt.id, "leaderboard updated");
                receipt
                    .message
                    .unwrap_or_else(|| "Score submitted".to_string())
            }
            Err(err) => {
                warn!(error = %err, code = err.code(), "score not submitted");
                format!("Score not submitted: {}", err)
            }
        };

        // A new game may already be under way; only show results on the
        // game-over screen they belong to
        if self.state.phase == Phase::GameOver {
            self.metrics.submission_status = Some(status);
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
