pub mod layout;
mod picker;
mod shell;
mod task;

pub use layout::calculate_task_chunks;
pub use picker::draw_account_picker;
pub use shell::{draw_news, draw_profile};
pub use task::draw_task;

use ratatui::Frame;

use crate::app::App;
use crate::models::Screen;

/// One full frame: the active screen, or the account picker while it is
/// up.
pub fn draw(f: &mut Frame, app: &App) {
    if app.picking_account {
        draw_account_picker(f, app);
        return;
    }
    match app.screen {
        Screen::Task => draw_task(f, app),
        Screen::News => draw_news(f),
        Screen::Profile => draw_profile(f),
    }
}
