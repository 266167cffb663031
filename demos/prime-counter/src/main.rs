//! Prime counter TUI
//!
//! Event (keyboard) -> CounterUi -> scoped store -> root store -> reducer.
//! A requested nth prime is looked up off-thread and comes back through the
//! mailbox as a normal action.
//!
//! # Usage
//!
//! ```sh
//! # Offline (sieve) lookups
//! cargo run -p prime-counter -- --offline
//!
//! # Wolfram|Alpha lookups, logging to a file
//! WOLFRAM_APP_ID=... cargo run -p prime-counter -- --log-file prime-counter.log
//! ```

use std::io;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use prime_counter::app::App;
use prime_counter::config::{init_logging, Args};
use prime_counter::events::{EventPoller, InputEvent};
use prime_counter::state::AppState;
use prime_counter::view::{self, CounterUi, KeyOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let lookup = args.lookup_config().build()?;
    let mut app = App::new(AppState::new(args.start), lookup);

    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app).await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> anyhow::Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let poller = EventPoller::start(event_tx);

    let result = event_loop(terminal, app, event_rx).await;

    poller.shutdown().await;
    result
}

async fn event_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut event_rx: mpsc::UnboundedReceiver<InputEvent>,
) -> anyhow::Result<()> {
    let mut ui = CounterUi::new(app.counter_view())?;

    let mut should_render = true;
    loop {
        let dirty = ui.take_dirty();
        if should_render || dirty {
            let screen = ui.screen()?;
            terminal.draw(|frame| view::render(frame, &screen))?;
            should_render = false;
        }

        tokio::select! {
            Some(input) = event_rx.recv() => match input {
                InputEvent::Key(key) => match ui.handle_key(key)? {
                    KeyOutcome::Quit => break,
                    KeyOutcome::Handled => should_render = true,
                    KeyOutcome::Ignored => {}
                },
                InputEvent::Resize(..) => should_render = true,
            },
            Some(action) = app.mailbox.recv() => app.store.send(action),
            else => break,
        }
    }

    Ok(())
}
