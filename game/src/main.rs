use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};
use engine::app::{AppConfig, AppContext, GameApp, InputFrame, run_game};
use engine::graphics::Renderer2d;
use tracing_subscriber::EnvFilter;
use winit::event::{Event, WindowEvent};
use winit::event_loop::ControlFlow;

use tetris::agent::TetrisGame;
use tetris::session::TetrisSession;
use tetris::settings::{GameSettings, SettingsStore};
use tetris::tetris_core::ColorMode;
use tetris::view::{WINDOW_SIZE, draw_game};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorModeArg {
    Random,
    ByShape,
}

impl From<ColorModeArg> for ColorMode {
    fn from(arg: ColorModeArg) -> Self {
        match arg {
            ColorModeArg::Random => ColorMode::Random,
            ColorModeArg::ByShape => ColorMode::ByShape,
        }
    }
}

/// Falling-block puzzle game.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Seed for the piece generator (random when omitted and not set in settings)
    #[arg(long)]
    seed: Option<u64>,

    /// Settings file (defaults to TETRIS_SETTINGS_PATH or the user config dir)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Milliseconds between automatic drops
    #[arg(long)]
    gravity_ms: Option<u64>,

    #[arg(long, value_enum)]
    color_mode: Option<ColorModeArg>,

    /// Write the effective settings back to the settings file
    #[arg(long)]
    save_settings: bool,

    /// Save the recorded state history as JSON when the window closes
    #[arg(long)]
    replay_out: Option<PathBuf>,
}

struct TetrisApp {
    session: TetrisSession,
    replay_out: Option<PathBuf>,
}

impl TetrisApp {
    fn save_replay(&self) {
        let Some(path) = &self.replay_out else {
            return;
        };
        match self.session.save_history(path) {
            Ok(()) => tracing::info!(path = %path.display(), "replay saved"),
            Err(err) => tracing::warn!(path = %path.display(), "failed to save replay: {err}"),
        }
    }
}

impl GameApp for TetrisApp {
    // The session owns all game state; the event loop only needs a placeholder.
    type State = ();

    fn init_state(&mut self, ctx: &mut AppContext) -> Self::State {
        ctx.window.request_redraw();
    }

    fn update_state(
        &mut self,
        _state: &mut Self::State,
        input: &InputFrame,
        dt: Duration,
        _ctx: &mut AppContext,
    ) {
        self.session.handle_frame(input, dt);
    }

    fn render(&mut self, _state: &Self::State, renderer: &mut dyn Renderer2d) {
        draw_game(
            renderer,
            &self.session.state().tetris,
            self.session.cursor(),
        );
    }

    fn handle_event(
        &mut self,
        event: &Event<()>,
        _state: &mut Self::State,
        _control_flow: &mut ControlFlow,
    ) -> bool {
        if let Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } = event
        {
            tracing::info!(score = self.session.state().tetris.score(), "window closed");
            self.save_replay();
        }
        false
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn effective_settings(args: &Args, store: &SettingsStore) -> GameSettings {
    let mut settings = store.load();
    if let Some(seed) = args.seed {
        settings.gameplay.seed = Some(seed);
    }
    if let Some(ms) = args.gravity_ms {
        settings.gameplay.gravity_interval_ms = ms;
    }
    if let Some(mode) = args.color_mode {
        settings.gameplay.color_mode = mode.into();
    }
    settings.sanitized()
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let store = args
        .settings
        .clone()
        .map(SettingsStore::new)
        .unwrap_or_else(SettingsStore::from_env);
    let settings = effective_settings(&args, &store);
    if args.save_settings {
        store
            .save(&settings)
            .with_context(|| format!("saving settings to {}", store.path().display()))?;
    }

    let seed = settings.gameplay.seed.unwrap_or_else(rand::random);
    tracing::info!(
        seed,
        gravity_ms = settings.gameplay.gravity_interval_ms,
        settings = %store.path().display(),
        "starting tetris"
    );

    let game = TetrisGame::from_settings(seed, &settings.gameplay);
    let app = TetrisApp {
        session: TetrisSession::new(game, settings.history_frames),
        replay_out: args.replay_out,
    };
    let config = AppConfig {
        title: "Tetris".to_string(),
        logical_size: WINDOW_SIZE,
        resizable: false,
        vsync: settings.video.vsync,
        frame_interval: settings.video.frame_interval(),
    };

    run_game(config, app).map_err(|err| anyhow!("window loop failed: {err}"))
}
