use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event as TermEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use sheetcards::app::App;
use sheetcards::auth::AccountStore;
use sheetcards::config::Config;
use sheetcards::{logger, source, ui, worker};

fn main() -> std::io::Result<()> {
    logger::init();
    let config = Config::load()?;

    let accounts = Arc::new(AccountStore::new(config.accounts.clone()));
    let grid_backend = source::build(&config.source, accounts.clone());

    let (request_tx, request_rx) = crossbeam_channel::unbounded();
    let (response_tx, response_rx) = crossbeam_channel::unbounded();
    let _worker = worker::spawn_io_worker(grid_backend, response_tx, request_rx);

    let (mut app, startup_requests) = App::new(config, accounts);
    for request in startup_requests {
        request_tx.send(request).ok();
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;

    let tick = Duration::from_millis(app.config.tick_millis);
    loop {
        // Worker responses first, so the frame below reflects them.
        for response in response_rx.try_iter() {
            for request in app.on_response(response) {
                request_tx.send(request).ok();
            }
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(tick)? {
            if let TermEvent::Key(key) = event::read()? {
                for request in app.on_key(key) {
                    request_tx.send(request).ok();
                }
            }
        } else {
            app.on_tick();
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
