//! Full-screen presentation of a [`DrawView`].

pub mod confetti;
pub mod terminal;

pub use confetti::Confetti;
pub use terminal::Tui;

use luckydraw_engine::{DrawView, ViewPhase};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

const BACKGROUND: Color = Color::Rgb(51, 65, 85);
const MUTED: Color = Color::Rgb(100, 116, 139);
const SUBTLE: Color = Color::Rgb(203, 213, 225);

/// Everything the screen needs for one frame
pub struct Screen<'a> {
    pub view: &'a DrawView,
    pub status: Option<&'a str>,
    pub confetti: Option<confetti::ConfettiFrame<'a>>,
}

pub fn render(frame: &mut Frame, screen: Screen<'_>) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(BACKGROUND)), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let view = screen.view;
    if view.show_winner_banner {
        frame.render_widget(
            Paragraph::new(Line::from("W I N N E R").bold().fg(Color::Yellow))
                .alignment(Alignment::Center),
            rows[1],
        );
    }

    frame.render_widget(card(view), centered(rows[2], 80));

    if let Some(confetti) = screen.confetti {
        frame.render_widget(confetti, area);
    }

    frame.render_widget(footer(view, screen.status), rows[4]);
}

fn card(view: &DrawView) -> Paragraph<'static> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(MUTED));

    let text = match view.phase {
        ViewPhase::AwaitingRoster => Text::from(vec![
            Line::from(""),
            Line::from("Open a roster to begin").bold(),
            Line::from(""),
            Line::from("press  o").fg(SUBTLE),
        ]),
        _ => match &view.headline {
            Some(name) => {
                let mut lines = vec![
                    Line::from(""),
                    Line::from(Span::styled(
                        name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                ];
                if let Some(detail) = &view.detail {
                    lines.push(Line::from(""));
                    lines.push(Line::from(detail.clone()).fg(SUBTLE));
                }
                Text::from(lines)
            }
            None if view.phase == ViewPhase::Shuffling => {
                Text::from(vec![Line::from(""), Line::from("Nobody left to draw").fg(SUBTLE)])
            }
            None => Text::from(vec![
                Line::from(""),
                Line::from(format!("{} participants loaded", view.total)).fg(SUBTLE),
                Line::from(""),
                Line::from("press  space  to draw").fg(SUBTLE),
            ]),
        },
    };

    Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White))
        .block(block)
}

fn footer(view: &DrawView, status: Option<&str>) -> Paragraph<'static> {
    let mut spans = vec![Span::styled(
        format!(" {} ", view.remaining),
        Style::default().fg(MUTED),
    )];

    if let Some(status) = status {
        spans.push(Span::styled(
            format!("  {}", status),
            Style::default().fg(SUBTLE),
        ));
    }

    spans.push(Span::styled(
        "   space start/stop · o open roster · esc exit",
        Style::default().fg(MUTED),
    ));

    Paragraph::new(Line::from(spans))
}

fn centered(area: Rect, percent_x: u16) -> Rect {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area)[1]
}
