use super::widgets::popups::{alert::render_alert_popup, help::render_help_popup};
use super::widgets::spinner::SpinnerStyle;
use super::{Preview, SUBMIT_INDENT, form_fields, text_columns};
use crate::app::PageController;
use crate::components::booking::{ButtonStyle, SubmitState};
use crate::components::date_picker::popup_offset;
use crate::constants::BOOKING_ANCHOR;
use crate::types::{CarouselKind, DateField, Field, FocusTarget, UiMode};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const HERO_ROWS: usize = 7;
const STATS_ROWS: usize = 3;
const LABEL_WIDTH: usize = 14;

/// Page sections the preview lays out top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionId {
    Hero,
    Stats,
    Highlights,
    Fleet,
    Testimonials,
    Booking,
}

impl SectionId {
    /// Element ids that scroll to this section
    fn anchors(self) -> &'static [&'static str] {
        match self {
            SectionId::Hero => &["home", "hero"],
            SectionId::Stats => &["stats"],
            SectionId::Highlights => &["features", "highlights"],
            SectionId::Fleet => &["fleet", "bikes"],
            SectionId::Testimonials => &["testimonials", "reviews"],
            SectionId::Booking => &[BOOKING_ANCHOR],
        }
    }

    fn title(self) -> &'static str {
        match self {
            SectionId::Hero => "",
            SectionId::Stats => "",
            SectionId::Highlights => "Highlights",
            SectionId::Fleet => "Our Fleet",
            SectionId::Testimonials => "What riders say",
            SectionId::Booking => "Book your ride",
        }
    }
}

/// A section's rows in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    pub top: usize,
    pub height: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub sections: Vec<Section>,
}

impl PageLayout {
    /// Stack the sections the page actually has
    pub fn compute(controller: &PageController) -> Self {
        let bindings = controller.bindings();
        let mut sections = Vec::new();
        let mut top = 0;
        let mut push = |id, height| {
            sections.push(Section { id, top, height });
            top += height;
        };

        if !bindings.hero_slides.is_empty() {
            push(SectionId::Hero, HERO_ROWS);
        }
        if !bindings.counters.is_empty() {
            push(SectionId::Stats, STATS_ROWS);
        }
        if !bindings.reveal_targets.is_empty() {
            push(SectionId::Highlights, bindings.reveal_targets.len() + 2);
        }
        if !bindings.bike_cards.is_empty() {
            push(SectionId::Fleet, bindings.bike_cards.len() + 2);
        }
        if !bindings.text_slides.is_empty() {
            push(
                SectionId::Testimonials,
                controller.text_carousel_height().max(1) + 3,
            );
        }
        if let Some(form) = controller.form() {
            push(SectionId::Booking, form_fields(form).len() + 3);
        }

        PageLayout { sections }
    }

    pub fn height(&self) -> usize {
        self.sections.last().map(|s| s.top + s.height).unwrap_or(0)
    }

    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn section_for_anchor(&self, anchor: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id.anchors().contains(&anchor))
    }

    /// Row of the `idx`th animated element
    pub fn reveal_row(&self, idx: usize) -> Option<usize> {
        self.section(SectionId::Highlights).map(|s| s.top + 1 + idx)
    }

    /// Row of the submit button below `fields` form rows
    pub fn submit_row(&self, fields: usize) -> Option<usize> {
        self.section(SectionId::Booking).map(|s| s.top + 1 + fields)
    }
}

pub fn render(f: &mut Frame, preview: &Preview) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Navbar
            Constraint::Min(0),    // Page
            Constraint::Length(1), // Statusbar
        ])
        .split(f.area());

    render_navbar(f, preview, chunks[0]);
    render_page(f, preview, chunks[1]);
    render_statusbar(f, preview, chunks[2]);

    if let Some(field) = preview.calendar {
        render_calendar(f, preview, field, chunks[1]);
    }
    if preview.controller.menu_open() {
        render_menu(f, preview, chunks[1]);
    }

    match &preview.ui_mode {
        UiMode::Alert(message) => render_alert_popup(f, message),
        UiMode::Help => render_help_popup(f),
        UiMode::Normal => {}
    }
}

fn render_navbar(f: &mut Frame, preview: &Preview, area: Rect) {
    let controller = &preview.controller;
    // Pages without a .navbar get a plain title bar
    let style = if controller.bindings().navbar && controller.navbar_scrolled() {
        Style::default()
            .fg(Color::White)
            .bg(Color::Rgb(20, 40, 80))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    };

    let title = &controller.bindings().title;
    let menu_hint = if controller.bindings().menu.is_some() {
        "≡ menu [m] "
    } else {
        ""
    };
    let used = title.chars().count() + menu_hint.chars().count() + 1;
    let gap = (area.width as usize).saturating_sub(used);

    let navbar =
        Paragraph::new(format!(" {}{}{}", title, " ".repeat(gap), menu_hint)).style(style);
    f.render_widget(navbar, area);
}

fn render_page(f: &mut Frame, preview: &Preview, area: Rect) {
    let width = area.width as usize;
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(preview.layout.height());

    for section in &preview.layout.sections {
        let mut section_lines = match section.id {
            SectionId::Hero => hero_lines(preview, width),
            SectionId::Stats => stats_lines(preview),
            SectionId::Highlights => highlight_lines(preview),
            SectionId::Fleet => fleet_lines(preview),
            SectionId::Testimonials => testimonial_lines(preview, width),
            SectionId::Booking => booking_lines(preview),
        };
        section_lines.resize(section.height, Line::from(""));
        lines.extend(section_lines);
    }

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(preview.scroll_rows)
        .take(area.height as usize)
        .collect();

    f.render_widget(Paragraph::new(visible), area);
}

fn heading(id: SectionId) -> Line<'static> {
    Line::from(Span::styled(
        id.title(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn hero_lines(preview: &Preview, width: usize) -> Vec<Line<'static>> {
    let controller = &preview.controller;
    let Some(hero) = controller.carousel(CarouselKind::Hero) else {
        return Vec::new();
    };
    let slides = &controller.bindings().hero_slides;
    let focused = preview.focus == FocusTarget::Hero;

    // Background drifts down as the page scrolls
    let background = if controller.bindings().hero_background {
        format!("background +{:.0}px", controller.hero_background_y())
    } else {
        String::new()
    };
    let mut lines = vec![
        Line::from(Span::styled(format!("{:>width$}", background), dim())),
        Line::from(""),
    ];

    let caption = slides.get(hero.current()).cloned().unwrap_or_default();
    let view = hero.slide_view(hero.current());
    let caption_style = if view.opaque {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        dim()
    };
    lines.push(Line::from(Span::styled(caption, caption_style)).alignment(Alignment::Center));
    lines.push(Line::from(""));

    let mut indicators = vec![Span::raw("‹  ")];
    for idx in 0..hero.slide_count() {
        let (mark, style) = if hero.indicator_active(idx) {
            ("● ", Style::default().fg(Color::Yellow))
        } else {
            ("○ ", dim())
        };
        indicators.push(Span::styled(mark, style));
    }
    indicators.push(Span::raw(" ›"));
    let mut indicator_line = Line::from(indicators).alignment(Alignment::Center);
    if focused {
        indicator_line = indicator_line.style(Style::default().fg(Color::Cyan));
    }
    lines.push(indicator_line);

    let state = if controller.is_autoplaying(CarouselKind::Hero) {
        "autoplay"
    } else {
        "paused"
    };
    lines.push(Line::from(Span::styled(state, dim())).alignment(Alignment::Center));

    lines
}

fn stats_lines(preview: &Preview) -> Vec<Line<'static>> {
    let labels = &preview.controller.bindings().counters;
    let mut spans = vec![Span::raw("  ")];

    for (counter, binding) in preview.controller.counters().iter().zip(labels) {
        // Bold once the count has landed
        let style = if counter.finished {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        spans.push(Span::styled(counter.displayed.to_string(), style));
        spans.push(Span::raw(format!(" {}     ", binding.label)));
    }

    vec![Line::from(""), Line::from(spans), Line::from("")]
}

fn highlight_lines(preview: &Preview) -> Vec<Line<'static>> {
    let mut lines = vec![heading(SectionId::Highlights)];

    for (idx, text) in preview
        .controller
        .bindings()
        .reveal_targets
        .iter()
        .enumerate()
    {
        // Unrevealed elements are still invisible
        let line = if preview.controller.is_revealed(idx) {
            Line::from(format!("  ▸ {}", text))
        } else {
            Line::from(Span::styled(
                format!("    {}", text),
                Style::default()
                    .fg(Color::Black)
                    .add_modifier(Modifier::HIDDEN),
            ))
        };
        lines.push(line);
    }

    lines
}

fn fleet_lines(preview: &Preview) -> Vec<Line<'static>> {
    let cards = &preview.controller.bindings().bike_cards;
    let mut lines = vec![heading(SectionId::Fleet)];

    for (idx, title) in cards.iter().enumerate() {
        let next = idx == preview.bike_cursor % cards.len().max(1);
        let hint = if next { "  [f] book" } else { "" };
        lines.push(Line::from(vec![
            Span::raw(format!("  {}", title)),
            Span::styled(hint, dim()),
        ]));
    }

    lines
}

fn testimonial_lines(preview: &Preview, width: usize) -> Vec<Line<'static>> {
    let controller = &preview.controller;
    let Some(text) = controller.carousel(CarouselKind::Text) else {
        return Vec::new();
    };
    let height = controller.text_carousel_height().max(1);

    let mut lines = vec![heading(SectionId::Testimonials)];

    let slide = controller
        .bindings()
        .text_slides
        .get(text.current())
        .cloned()
        .unwrap_or_default();
    let mut body: Vec<Line> = textwrap::wrap(&slide, text_columns(width as u16))
        .into_iter()
        .map(|row| Line::from(format!("  {}", row)))
        .collect();
    body.resize(height, Line::from(""));
    lines.extend(body);

    let mut footer = format!("  ‹ {}/{} ›", text.current() + 1, text.slide_count());
    if !controller.is_autoplaying(CarouselKind::Text) {
        footer.push_str("  paused");
    }
    let style = if preview.focus == FocusTarget::Text {
        Style::default().fg(Color::Cyan)
    } else {
        dim()
    };
    lines.push(Line::from(Span::styled(footer, style)));

    lines
}

fn field_value(preview: &Preview, field: Field) -> String {
    let controller = &preview.controller;
    let Some(form) = controller.form() else {
        return String::new();
    };
    let value = form.value(field);

    match field {
        Field::PickupTime | Field::DropTime => {
            let Some(times) = controller.times() else {
                return value.to_string();
            };
            let label = times
                .index_of(value)
                .and_then(|idx| times.options().get(idx))
                .map(|o| o.label.clone())
                .unwrap_or_else(|| value.to_string());
            if field == Field::DropTime {
                let disabled = (0..times.options().len())
                    .filter(|idx| times.is_drop_disabled(*idx))
                    .count();
                if disabled > 0 {
                    return format!("{}  ({} slots unavailable)", label, disabled);
                }
            }
            label
        }
        Field::PickupDate | Field::DropDate if value.is_empty() => "dd/mm/yyyy".to_string(),
        _ if value.is_empty() => "-".to_string(),
        _ => value.to_string(),
    }
}

fn booking_lines(preview: &Preview) -> Vec<Line<'static>> {
    let controller = &preview.controller;
    let Some(form) = controller.form() else {
        return Vec::new();
    };
    let focused = preview.focus == FocusTarget::Booking;

    let mut lines = vec![heading(SectionId::Booking)];

    for (idx, field) in form_fields(form).into_iter().enumerate() {
        let selected = focused && idx == preview.form_cursor;
        let marker = if selected { "›" } else { " " };
        let style = if selected {
            Style::default().bg(Color::Rgb(40, 40, 50))
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {:<LABEL_WIDTH$}", marker, field.label()),
                style.fg(Color::Gray),
            ),
            Span::styled(field_value(preview, field), style),
        ]));
    }

    let mut button_style = match form.state().style() {
        ButtonStyle::Plain => Style::default().fg(Color::Cyan),
        ButtonStyle::Pulse => Style::default().fg(Color::Green),
        ButtonStyle::Danger => Style::default().fg(Color::Red),
    }
    .add_modifier(Modifier::BOLD);
    if form.state().is_disabled() {
        button_style = button_style.add_modifier(Modifier::DIM);
    }
    if controller
        .ripples()
        .on_button(preview.submit_button_index())
        .next()
        .is_some()
    {
        button_style = button_style.add_modifier(Modifier::REVERSED);
    }

    let label = if form.state() == SubmitState::Processing {
        format!(
            "{} {}",
            SpinnerStyle::Dots.current_frame(preview.started),
            form.button_label()
        )
    } else {
        form.button_label().to_string()
    };
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(SUBMIT_INDENT)),
        Span::styled(format!("[ {} ]", label), button_style),
    ]));

    lines
}

fn render_statusbar(f: &mut Frame, preview: &Preview, area: Rect) {
    let pointer = match preview.focus {
        FocusTarget::Page => "page",
        FocusTarget::Hero => "hero",
        FocusTarget::Text => "testimonials",
        FocusTarget::Booking => "booking form",
    };
    let percentage = if preview.max_scroll() > 0 {
        preview.scroll_rows * 100 / preview.max_scroll()
    } else {
        100
    };

    let mut text = format!(" Pointer: {} | {}%", pointer, percentage);
    if !preview.status.is_empty() {
        text.push_str(" | ");
        text.push_str(&preview.status);
    }
    text.push_str(" | ? help");

    let status = Paragraph::new(text).style(Style::default().fg(Color::White).bg(Color::DarkGray));
    f.render_widget(status, area);
}

/// Date picker popup anchored under its input
fn render_calendar(f: &mut Frame, preview: &Preview, field: DateField, area: Rect) {
    let controller = &preview.controller;
    let (Some(dates), Some(form)) = (controller.dates(), controller.form()) else {
        return;
    };
    let fields = form_fields(form);
    let Some(idx) = fields.iter().position(|f| *f == field.field()) else {
        return;
    };
    let Some(booking) = preview.layout.section(SectionId::Booking) else {
        return;
    };
    let Some(row) = (booking.top + 1 + idx).checked_sub(preview.scroll_rows) else {
        return;
    };

    let input_x = 2 + LABEL_WIDTH;
    let input_cells = (area.width as usize).saturating_sub(input_x);
    let px = preview.px_per_cell as i32;
    let offset = popup_offset(input_cells as u32 * preview.px_per_cell);
    let dy = 1 + (offset.margin_top_px as f32 / (px * 2) as f32).round() as i32;
    let dx = offset.margin_left_px / px;

    let (min, max) = dates.bounds(field);
    let lines = vec![
        Line::from(format!(" From {}", dates.format(min))),
        Line::from(format!(" To   {}", dates.format(max))),
        Line::from(Span::styled(" ←/→ day  Esc close", dim())),
    ];

    let width = 24u16.min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let x = (area.x as i32 + input_x as i32 + dx).max(area.x as i32) as u16;
    let y = (area.y as i32 + row as i32 + dy) as u16;
    let popup_area = Rect {
        x: x.min(area.right().saturating_sub(width)),
        y: y.min(area.bottom().saturating_sub(height)),
        width,
        height,
    };

    f.render_widget(Clear, popup_area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Calendar ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup_area,
    );
}

fn render_menu(f: &mut Frame, preview: &Preview, area: Rect) {
    let Some(items) = &preview.controller.bindings().menu else {
        return;
    };

    let width = items
        .iter()
        .map(|i| i.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(12) as u16
        + 4;
    let popup_area = Rect {
        x: area.right().saturating_sub(width + 1),
        y: area.y,
        width: width.min(area.width),
        height: (items.len() as u16 + 2).min(area.height),
    };

    let lines: Vec<Line> = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let style = if idx == preview.menu_cursor {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!(" {}", item.label), style))
        })
        .collect();

    f.render_widget(Clear, popup_area);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Menu ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        popup_area,
    );
}
