use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::ui::layout::calculate_task_chunks;

// News and Profile exist only as navigation targets for now.

pub fn draw_news(f: &mut Frame) {
    draw_placeholder(f, "News");
}

pub fn draw_profile(f: &mut Frame) {
    draw_placeholder(f, "Profile");
}

fn draw_placeholder(f: &mut Frame, name: &str) {
    let layout = calculate_task_chunks(f.area());

    let header = Paragraph::new(name.to_string())
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    let body = Paragraph::new("Nothing here yet")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(body, layout.body_area);

    let help = Paragraph::new("n/t/p Screen  q Quit")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}
