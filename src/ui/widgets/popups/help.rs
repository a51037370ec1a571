use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

fn heading(text: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text,
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Yellow),
    )])
}

pub fn render_help_popup(f: &mut Frame) {
    // 70% width, 80% height
    let popup_width = (f.area().width as f32 * 0.7) as u16;
    let popup_height = (f.area().height as f32 * 0.8) as u16;

    let popup_area = Rect {
        x: f.area().width.saturating_sub(popup_width) / 2,
        y: f.area().height.saturating_sub(popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    let help_text = vec![
        heading("SCROLLING"),
        Line::from(""),
        Line::from("  j / k              Scroll down/up one row"),
        Line::from("  ↓ / ↑              Scroll (or move between form fields)"),
        Line::from("  Space / PgDn       Scroll down one page"),
        Line::from("  PgUp               Scroll up one page"),
        Line::from("  g / G              Jump to top/bottom"),
        Line::from(""),
        heading("CAROUSELS"),
        Line::from("  Tab                Move the pointer: page, hero, testimonials, form"),
        Line::from("  ← / →              Previous/next slide of the hovered carousel"),
        Line::from("  1-9                Jump to hero slide"),
        Line::from("  , / .              Hero previous/next buttons"),
        Line::from("  [ / ]              Testimonial previous/next buttons"),
        Line::from(""),
        heading("BOOKING"),
        Line::from(""),
        Line::from("  ← / →              Change the selected field"),
        Line::from("  o                  Open the date field's calendar"),
        Line::from("  f                  Book the next bike from the fleet"),
        Line::from("  Enter              Submit the booking"),
        Line::from(""),
        heading("APPLICATION"),
        Line::from(""),
        Line::from("  m                  Toggle the menu"),
        Line::from("  ? / F1             Toggle this help"),
        Line::from("  Esc                Close menu, release pointer"),
        Line::from("  q / Ctrl-c         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(Color::Gray),
        )]),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(paragraph, popup_area);
}
