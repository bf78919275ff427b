//! shellbay — run commands in the background and switch between them.
//!
//! Every positional argument is started as a background shell under its own
//! pty. The panel shows one shell at a time; keystrokes go to the active
//! shell unless they are panel shortcuts.

mod config;
mod io_thread;
mod state;
mod terminal;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use shellbay_panel::{KeyEvent, Viewport};
use shellbay_pty::OutputMode;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::state::{App, Launch};
use crate::terminal::{TerminalGuard, Tui};

const TICK: Duration = Duration::from_millis(33);
const INPUT_POLL: Duration = Duration::from_millis(100);

/// shellbay — background shells in one terminal
#[derive(Parser)]
#[command(name = "shellbay", version, about = "Run commands in background shells and switch between them")]
struct Cli {
    /// Shell used to run each command (`<shell> -c <command>`)
    #[arg(short, long)]
    shell: Option<String>,

    /// Keep plain text output instead of a terminal grid
    #[arg(long)]
    text: bool,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Commands to start; an interactive shell when none are given
    #[arg(trailing_var_arg = true)]
    commands: Vec<String>,
}

fn init_logging(path: &Path, verbose: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let default = if verbose {
        "shellbay=debug,shellbay_panel=debug,shellbay_pty=debug,shellbay_vt=debug"
    } else {
        "warn,shellbay=info,shellbay_pty=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))
}

/// Forward terminal events until the receiver goes away.
fn input_loop(tx: mpsc::UnboundedSender<Event>) {
    while !tx.is_closed() {
        match event::poll(INPUT_POLL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(e) => {
                log::error!("terminal input failed: {e}");
                return;
            }
        }
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::error!("terminal input failed: {e}");
                return;
            }
        }
    }
}

fn handle_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            app.handle_key(&KeyEvent::from(key));
        }
        Event::Paste(text) => app.paste(&text),
        Event::Resize(cols, rows) => app.set_viewport(Viewport::new(cols, rows)),
        _ => {}
    }
}

async fn run(app: &mut App, tui: &mut Tui) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let input = tokio::task::spawn_blocking(move || input_loop(tx));
    let mut tick = tokio::time::interval(TICK);

    while !app.should_quit() {
        tokio::select! {
            Some(event) = rx.recv() => handle_event(app, event),
            _ = tick.tick() => {}
        }
        app.tick();
        tui.draw(|frame| app.draw(frame))
            .context("failed to draw")?;
    }

    drop(rx);
    let _ = input.await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(config::default_path);
    let cfg = Config::load(&config_path)?;
    init_logging(&cfg.log.path(), cli.verbose)?;
    log::info!("starting with config {}", config_path.display());

    let program = cli.shell.unwrap_or(cfg.shell.program);
    let mode = if cli.text {
        OutputMode::Text
    } else {
        cfg.shell.output.into()
    };
    let commands = if cli.commands.is_empty() {
        vec![program.clone()]
    } else {
        cli.commands
    };

    let (cols, rows) = terminal::size();
    let mut app = App::new(Launch { program, mode }, cfg.keys, Viewport::new(cols, rows));
    for command in &commands {
        app.spawn(command)?;
    }

    let result = {
        let (_guard, mut tui) = TerminalGuard::enter()?;
        run(&mut app, &mut tui).await
    };
    app.shutdown();
    result
}
