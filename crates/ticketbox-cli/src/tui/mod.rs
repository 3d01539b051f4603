//! Terminal user interface (TUI) for ticketbox.
//!
//! A full-screen ticket table with a new ticket form, expandable detail rows,
//! inline editing, and import/export/clear modals.
//!
//! ## Entry points
//!
//! - [`run`]: open the TUI on the tickets in the resolved data directory.

pub mod app;
pub mod input;
pub mod ui;

use crate::cmd::Context;
use anyhow::{Context as _, Result};
use app::App;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use std::io;
use std::time::Duration;
use ticketbox_core::clock::Clock;
use ticketbox_core::storage::KeyValueStore;
use tracing::info;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run the TUI until the user quits.
///
/// `focus` names a ticket whose detail row starts expanded.
pub fn run(ctx: &Context, focus: Option<&str>) -> Result<()> {
    let mut app = App::new(ctx.dispatcher(), &ctx.config.ui, focus)
        .context("Failed to load tickets")?;
    info!(data_dir = %ctx.data_dir.display(), "starting tui");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: Backend, S: KeyValueStore, C: Clock>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, C>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            ui::draw(frame, app, area);
        })?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Paste(text) => app.handle_paste(&text),
                _ => {}
            }
        }
        app.tick();

        if app.should_quit() {
            return Ok(());
        }
    }
}
