//! battview terminal frontend
//!
//! Draws the battery widget and forwards key presses to the dispatcher.
//! Logs go to stderr so they never land on the alternate screen.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use battview::{ControllerOptions, Dispatcher, Message, platform_from_config, tui};
use battview_config::BattviewConfig;
use battview_hal::host_label;

const INPUT_POLL: Duration = Duration::from_millis(100);

fn setup_logging() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
        .init();
}

/// Read terminal events on a blocking thread until the dispatcher goes away
fn spawn_input(tx: mpsc::UnboundedSender<Message>) {
    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    debug!("Input poll failed: {}", e);
                    break;
                }
            }

            let message = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    tui::key_to_message(key.code)
                }
                Ok(Event::Resize(_, _)) => Some(Message::RenderTick),
                Ok(_) => None,
                Err(e) => {
                    debug!("Input read failed: {}", e);
                    break;
                }
            };

            if let Some(message) = message {
                if tx.send(message).is_err() {
                    break;
                }
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();

    info!("battview {} starting...", env!("CARGO_PKG_VERSION"));

    let config = BattviewConfig::load_default().context("Failed to load configuration")?;
    let platform = platform_from_config(&config.platform);
    let options = ControllerOptions::from_config(&config, host_label());
    let liquid_height = options.liquid_height;

    let mut dispatcher = Dispatcher::new(platform, options);
    dispatcher.start(
        config.refresh.render_interval(),
        config.refresh.live_region_interval(),
    );

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    spawn_input(dispatcher.sender());

    let result = run(&mut terminal, &mut dispatcher, liquid_height).await;
    debug!("Final surface:\n{}", dispatcher.controller().surface().dump());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("battview exiting");
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    dispatcher: &mut Dispatcher,
    liquid_height: f64,
) -> Result<()> {
    loop {
        terminal.draw(|f| tui::draw(f, dispatcher.controller().surface(), liquid_height))?;

        if !dispatcher.next().await {
            break;
        }
        dispatcher.drain();
        if dispatcher.is_quit() {
            break;
        }
    }
    Ok(())
}
