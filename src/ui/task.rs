use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::session::Phase;
use crate::ui::layout::calculate_task_chunks;

pub fn draw_task(f: &mut Frame, app: &App) {
    let layout = calculate_task_chunks(f.area());

    let mut title = format!("Level {}", app.level);
    if app.level > 1 {
        title = format!("← {}", title);
    }
    if app.level < app.config.levels {
        title = format!("{} →", title);
    }
    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, layout.header_area);

    if app.loading {
        let loading = Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(loading, layout.body_area);
    } else if app.load_failed || app.session.is_none() {
        let empty = Paragraph::new("No data available")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, layout.body_area);
    } else {
        draw_exercise(f, app, layout.body_area);
    }

    let help = Paragraph::new(help_line(app))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, layout.help_area);
}

fn draw_exercise(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let session = app.session.as_ref().unwrap();

    if session.phase == Phase::LevelComplete {
        let done = Paragraph::new(format!("Level {} complete!", app.level))
            .style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(done, area);
        return;
    }

    let Some(record) = app.current_record() else {
        let empty = Paragraph::new("No data available")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    };

    match session.phase {
        Phase::Prompt => {
            let word = Paragraph::new(record.prompt.as_str())
                .style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Word"));
            f.render_widget(word, area);
        }
        Phase::Revealed if session.hint_visible => {
            let mut text = Text::default();
            text.push_line(Line::from(Span::styled(
                "Hint:",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            )));
            text.push_line(Line::from(""));
            text.push_line(Line::from(record.hint.as_str()));
            let hint = Paragraph::new(text)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(record.prompt.as_str()));
            f.render_widget(hint, area);
        }
        Phase::Revealed => {
            let items: Vec<ListItem> = record
                .candidates
                .iter()
                .enumerate()
                .map(|(i, candidate)| {
                    let style = if i == app.selected {
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    ListItem::new(candidate.as_str()).style(style)
                })
                .collect();

            let title = if session.chosen_so_far.is_empty() {
                format!(
                    "{}  ({}s, {} wrong)",
                    record.prompt,
                    session.elapsed_millis / 1000,
                    session.attempts
                )
            } else {
                format!(
                    "{}  [{}]  ({}s, {} wrong)",
                    record.prompt,
                    session.chosen_so_far.join(" "),
                    session.elapsed_millis / 1000,
                    session.attempts
                )
            };
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            f.render_widget(list, area);
        }
        Phase::Correct => {
            let mut text = Text::default();
            text.push_line(Line::from(Span::styled(
                "Correct!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            text.push_line(Line::from(""));
            text.push_line(Line::from(format!(
                "{} — {}",
                record.prompt, record.correct_answer
            )));
            let correct = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(correct, area);
        }
        Phase::LevelComplete => {}
    }
}

fn help_line(app: &App) -> Vec<Line<'static>> {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut spans = Vec::new();
    if let Some(session) = &app.session {
        match session.phase {
            Phase::Prompt => {
                spans.push(Span::styled("Enter", key_style));
                spans.push(Span::from(" Show translations  "));
            }
            Phase::Revealed if session.hint_visible => {
                spans.push(Span::styled("Enter", key_style));
                spans.push(Span::from(" Hide hint  "));
            }
            Phase::Revealed => {
                spans.push(Span::styled("↑/↓", key_style));
                spans.push(Span::from(" Choose  "));
                spans.push(Span::styled("Enter", key_style));
                spans.push(Span::from(" Answer  "));
            }
            Phase::Correct => {
                spans.push(Span::styled("Enter", key_style));
                spans.push(Span::from(" Next exercise  "));
            }
            Phase::LevelComplete => {}
        }
    }
    spans.push(Span::styled("←/→", key_style));
    spans.push(Span::from(" Level  "));
    spans.push(Span::styled("n/t/p", key_style));
    spans.push(Span::from(" Screen  "));
    spans.push(Span::styled("q", key_style));
    spans.push(Span::from(" Quit"));

    vec![Line::from(spans)]
}
