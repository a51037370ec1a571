//! Terminal preview host
//!
//! [`Preview`] stands in for the browser: it turns key presses into
//! [`PageEvent`]s, carries out the controller's [`Effect`]s and reports
//! what part of the page is on screen so reveal and counter observers fire.

pub mod layout;
pub mod widgets;

use crate::app::PageController;
use crate::components::BookingForm;
use crate::components::reveal::visibility_ratio;
use crate::types::{
    CarouselKind, ClickTarget, DateField, Effect, Field, FocusTarget, NavKey, Observed, PageEvent,
    Point, TimeSelector, UiMode,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use layout::{PageLayout, SectionId};
use std::time::Instant;

/// Rows taken by the navbar and the status bar
const CHROME_ROWS: u16 = 2;

/// Indent of the booking form's submit button, in cells
pub const SUBMIT_INDENT: usize = 2;

/// Form fields present on the page, in display order
pub fn form_fields(form: &BookingForm) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|f| form.data().contains_key(f.name()))
        .collect()
}

/// Columns available to testimonial text at `width` terminal columns
pub fn text_columns(width: u16) -> usize {
    (width as usize).saturating_sub(4).max(1)
}

pub struct Preview {
    pub controller: PageController,
    pub layout: PageLayout,
    pub ui_mode: UiMode,
    pub focus: FocusTarget,
    pub form_cursor: usize,
    pub menu_cursor: usize,
    pub bike_cursor: usize,
    /// Date input whose calendar popup is open
    pub calendar: Option<DateField>,
    pub scroll_rows: usize,
    scroll_target: Option<usize>,
    pub width: u16,
    pub height: u16,
    pub px_per_cell: u32,
    pub status: String,
    pub should_quit: bool,
    pub started: Instant,
}

impl Preview {
    pub fn new(controller: PageController, px_per_cell: u32, width: u16, height: u16) -> Self {
        let mut preview = Preview {
            controller,
            layout: PageLayout::default(),
            ui_mode: UiMode::Normal,
            focus: FocusTarget::Page,
            form_cursor: 0,
            menu_cursor: 0,
            bike_cursor: 0,
            calendar: None,
            scroll_rows: 0,
            scroll_target: None,
            width,
            height,
            px_per_cell: px_per_cell.max(1),
            status: String::new(),
            should_quit: false,
            started: Instant::now(),
        };
        preview.resize(width, height);
        preview.refit();
        preview
    }

    /// Rows of page visible between navbar and status bar
    pub fn body_rows(&self) -> usize {
        self.height.saturating_sub(CHROME_ROWS) as usize
    }

    /// Terminal rows are roughly twice as tall as they are wide
    fn row_px(&self) -> f64 {
        (self.px_per_cell * 2) as f64
    }

    /// Immediate part of a terminal resize
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.controller.handle_event(PageEvent::Resize {
            width_px: width as u32 * self.px_per_cell,
            height_px: (self.body_rows() as f64 * self.row_px()) as u32,
        });
        self.scroll_to(self.scroll_rows);
    }

    /// Re-measure width-dependent sections; run once resizing settles
    pub fn refit(&mut self) {
        let rows = self.controller.fit_text_carousel(text_columns(self.width));
        tracing::debug!("Text carousel fitted to {} rows", rows);
        self.layout = PageLayout::compute(&self.controller);
        self.scroll_to(self.scroll_rows);
    }

    pub fn max_scroll(&self) -> usize {
        self.layout.height().saturating_sub(self.body_rows())
    }

    pub fn scroll_to(&mut self, rows: usize) {
        let rows = rows.min(self.max_scroll());
        if rows == self.scroll_rows {
            return;
        }
        self.scroll_rows = rows;
        self.controller.handle_event(PageEvent::Scroll {
            offset_y: rows as f64 * self.row_px(),
        });
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.scroll_target = None;
        self.scroll_to(self.scroll_rows.saturating_add_signed(delta));
    }

    /// Start a smooth scroll bringing `section` to the top
    fn scroll_into_view(&mut self, section: SectionId) {
        if let Some(s) = self.layout.section(section) {
            self.scroll_target = Some(s.top.min(self.max_scroll()));
        }
    }

    /// Per-frame work: smooth scrolling, effects and visibility
    pub fn tick(&mut self) {
        // Form fields and slide heights can change between frames
        self.layout = PageLayout::compute(&self.controller);

        if let Some(target) = self.scroll_target {
            let distance = target.abs_diff(self.scroll_rows);
            let step = (distance / 4).max(1);
            let next = if target > self.scroll_rows {
                self.scroll_rows + step.min(distance)
            } else {
                self.scroll_rows - step.min(distance)
            };
            self.scroll_to(next);
            if self.scroll_rows == target || next != self.scroll_rows {
                self.scroll_target = None;
            }
        }

        self.apply_effects();
        self.report_visibility();
    }

    pub fn apply_effects(&mut self) {
        for effect in self.controller.take_effects() {
            match effect {
                Effect::Alert(message) => {
                    tracing::debug!("Alert: {}", message);
                    self.ui_mode = UiMode::Alert(message);
                }
                Effect::ScrollIntoView { id } => {
                    let section = self.layout.section_for_anchor(&id).map(|s| s.id);
                    match section {
                        Some(section) => {
                            self.status = format!("#{}", id);
                            self.scroll_into_view(section);
                        }
                        None => tracing::debug!("No preview section for #{}", id),
                    }
                }
                Effect::FocusField(field) => {
                    self.set_focus(FocusTarget::Booking);
                    if let Some(idx) = self.fields().iter().position(|f| *f == field) {
                        self.form_cursor = idx;
                    }
                    self.calendar = match field {
                        Field::PickupDate => Some(DateField::Pickup),
                        Field::DropDate => Some(DateField::Drop),
                        _ => None,
                    };
                    self.status = format!("Choose a {}", field.label().to_lowercase());
                }
            }
        }
    }

    /// Feed what is on screen to the reveal and counter observers
    fn report_visibility(&mut self) {
        let top = self.scroll_rows as f64;
        let height = self.body_rows() as f64;

        let reveals = self.controller.bindings().reveal_targets.len();
        for idx in 0..reveals {
            if let Some(row) = self.layout.reveal_row(idx) {
                let ratio = visibility_ratio(row as f64, 1.0, top, height);
                self.controller.handle_event(PageEvent::Visibility {
                    target: Observed::Reveal(idx),
                    ratio,
                });
            }
        }

        if let Some(stats) = self.layout.section(SectionId::Stats) {
            let ratio = visibility_ratio(stats.top as f64, stats.height as f64, top, height);
            for idx in 0..self.controller.counters().len() {
                self.controller.handle_event(PageEvent::Visibility {
                    target: Observed::Counter(idx),
                    ratio,
                });
            }
        }
    }

    /// Moving focus onto a carousel is the pointer entering it
    pub fn set_focus(&mut self, focus: FocusTarget) {
        if focus == self.focus {
            return;
        }
        if let Some(kind) = self.focus.carousel() {
            self.controller.handle_event(PageEvent::HoverLeave(kind));
        }
        if let Some(kind) = focus.carousel() {
            self.controller.handle_event(PageEvent::HoverEnter(kind));
        }
        self.focus = focus;
        self.calendar = None;

        let section = match focus {
            FocusTarget::Page => None,
            FocusTarget::Hero => Some(SectionId::Hero),
            FocusTarget::Text => Some(SectionId::Testimonials),
            FocusTarget::Booking => Some(SectionId::Booking),
        };
        if let Some(section) = section {
            self.scroll_into_view(section);
        }
    }

    fn fields(&self) -> Vec<Field> {
        self.controller.form().map(form_fields).unwrap_or_default()
    }

    pub fn selected_field(&self) -> Option<Field> {
        self.fields().get(self.form_cursor).copied()
    }

    fn click(&mut self, target: ClickTarget) {
        self.controller.handle_event(PageEvent::Click(target));
    }

    /// Step the selected form field to its previous or next value
    fn adjust_field(&mut self, forward: bool) {
        let Some(field) = self.selected_field() else {
            return;
        };

        let event = match field {
            Field::PickupTime | Field::DropTime => self.time_step(field, forward),
            Field::PickupDate | Field::DropDate => self.date_step(field, forward),
            Field::Age | Field::BikeModel => self.choice_step(field, forward),
        };

        if let Some(event) = event {
            self.controller.handle_event(event);
        }
    }

    fn time_step(&self, field: Field, forward: bool) -> Option<PageEvent> {
        let times = self.controller.times()?;
        let (selector, current) = match field {
            Field::PickupTime => (TimeSelector::Pickup, times.pickup_index()),
            _ => (TimeSelector::Drop, times.drop_index()),
        };
        let last = times.options().len().checked_sub(1)?;
        let index = if forward {
            (current + 1).min(last)
        } else {
            current.saturating_sub(1)
        };
        (index != current).then_some(PageEvent::TimeSelected { selector, index })
    }

    fn date_step(&self, field: Field, forward: bool) -> Option<PageEvent> {
        let dates = self.controller.dates()?;
        let form = self.controller.form()?;
        let date_field = match field {
            Field::PickupDate => DateField::Pickup,
            _ => DateField::Drop,
        };
        let (min, max) = dates.bounds(date_field);

        let date = match dates.parse(form.value(field)) {
            Ok(current) if forward => current.succ_opt()?,
            Ok(current) => current.pred_opt()?,
            Err(_) => min,
        };
        Some(PageEvent::DateSelected {
            field: date_field,
            date: date.clamp(min, max),
        })
    }

    fn choice_step(&self, field: Field, forward: bool) -> Option<PageEvent> {
        let form = self.controller.form()?;
        let options: Vec<String> = match field {
            Field::BikeModel => form.bike_models().to_vec(),
            _ => self
                .controller
                .bindings()
                .form
                .as_ref()?
                .choices
                .get(field.name())?
                .clone(),
        };
        if options.is_empty() {
            return None;
        }

        let current = options.iter().position(|o| o == form.value(field));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % options.len(),
            (Some(i), false) => (i + options.len() - 1) % options.len(),
            (None, true) => 0,
            (None, false) => options.len() - 1,
        };
        Some(PageEvent::FieldInput {
            field,
            value: options[next].clone(),
        })
    }

    /// Click the booking form's submit button
    fn press_submit(&mut self) {
        let Some(form) = self.controller.form() else {
            return;
        };
        if form.state().is_disabled() {
            return;
        }
        let Some(row) = self.layout.submit_row(self.fields().len()) else {
            return;
        };

        let label_cells = form.button_label().chars().count() + 4;
        let button = self.submit_button_index();
        let px = self.px_per_cell as f64;
        let origin = Point::new(SUBMIT_INDENT as f64 * px, row as f64 * self.row_px());
        let pointer = Point::new(
            origin.x + label_cells as f64 * px / 2.0,
            origin.y + self.row_px() / 2.0,
        );

        self.controller.handle_event(PageEvent::ButtonPress {
            button,
            pointer,
            origin,
        });
        self.controller.handle_event(PageEvent::Submit);
    }

    /// Position of the submit button among the page's `.btn` elements
    pub fn submit_button_index(&self) -> usize {
        let bindings = self.controller.bindings();
        bindings
            .form
            .as_ref()
            .and_then(|f| bindings.buttons.iter().position(|b| *b == f.submit_label))
            .unwrap_or(0)
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        let items = self
            .controller
            .bindings()
            .menu
            .as_ref()
            .map(|m| m.len())
            .unwrap_or(0);

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.menu_cursor = (self.menu_cursor + 1).min(items.saturating_sub(1));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.menu_cursor = self.menu_cursor.saturating_sub(1);
            }
            KeyCode::Enter => {
                let href = self
                    .controller
                    .bindings()
                    .menu
                    .as_ref()
                    .and_then(|m| m.get(self.menu_cursor))
                    .map(|item| item.href.clone());
                if let Some(href) = href {
                    self.click(ClickTarget::MenuLink(href));
                }
            }
            KeyCode::Char('m') => self.click(ClickTarget::MenuToggle),
            KeyCode::Esc => self.click(ClickTarget::Elsewhere),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }
}

pub fn handle_key_event(preview: &mut Preview, key: KeyEvent) {
    match preview.ui_mode {
        UiMode::Alert(_) => {
            preview.ui_mode = UiMode::Normal;
            return;
        }
        UiMode::Help => {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)
            ) {
                preview.ui_mode = UiMode::Normal;
            }
            return;
        }
        UiMode::Normal => {}
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        preview.should_quit = true;
        return;
    }

    if preview.controller.menu_open() {
        preview.handle_menu_key(key);
        return;
    }

    let booking = preview.focus == FocusTarget::Booking;
    let page = preview.body_rows() as isize;

    match key.code {
        KeyCode::Char('q') => preview.should_quit = true,
        KeyCode::Char('?') | KeyCode::F(1) => preview.ui_mode = UiMode::Help,

        KeyCode::Tab => preview.set_focus(preview.focus.next()),
        KeyCode::Esc if preview.calendar.is_some() => preview.calendar = None,
        KeyCode::Esc => {
            if preview.focus == FocusTarget::Page {
                preview.click(ClickTarget::Elsewhere);
            } else {
                preview.set_focus(FocusTarget::Page);
            }
        }
        KeyCode::Char('m') => {
            preview.menu_cursor = 0;
            preview.click(ClickTarget::MenuToggle);
        }

        // Scrolling
        KeyCode::Char('j') => preview.scroll_by(1),
        KeyCode::Char('k') => preview.scroll_by(-1),
        KeyCode::Char(' ') | KeyCode::PageDown => preview.scroll_by(page),
        KeyCode::PageUp => preview.scroll_by(-page),
        KeyCode::Char('g') | KeyCode::Home => preview.scroll_by(isize::MIN / 2),
        KeyCode::Char('G') | KeyCode::End => preview.scroll_by(isize::MAX / 2),
        KeyCode::Down if booking => {
            preview.calendar = None;
            let last = preview.fields().len().saturating_sub(1);
            preview.form_cursor = (preview.form_cursor + 1).min(last);
        }
        KeyCode::Up if booking => {
            preview.calendar = None;
            preview.form_cursor = preview.form_cursor.saturating_sub(1);
        }
        KeyCode::Down => preview.scroll_by(1),
        KeyCode::Up => preview.scroll_by(-1),

        // Carousels
        KeyCode::Left if booking => preview.adjust_field(false),
        KeyCode::Right if booking => preview.adjust_field(true),
        KeyCode::Left => preview
            .controller
            .handle_event(PageEvent::Key(NavKey::ArrowLeft)),
        KeyCode::Right => preview
            .controller
            .handle_event(PageEvent::Key(NavKey::ArrowRight)),
        KeyCode::Char(c @ '1'..='9') => {
            let idx = c as usize - '1' as usize;
            preview.click(ClickTarget::HeroIndicator(idx));
        }
        KeyCode::Char(',') => preview.click(ClickTarget::CarouselPrev(CarouselKind::Hero)),
        KeyCode::Char('.') => preview.click(ClickTarget::CarouselNext(CarouselKind::Hero)),
        KeyCode::Char('[') => preview.click(ClickTarget::CarouselPrev(CarouselKind::Text)),
        KeyCode::Char(']') => preview.click(ClickTarget::CarouselNext(CarouselKind::Text)),

        // Booking
        KeyCode::Char('f') => {
            let cards = preview.controller.bindings().bike_cards.len();
            if cards > 0 {
                let idx = preview.bike_cursor % cards;
                preview.bike_cursor = (idx + 1) % cards;
                preview.click(ClickTarget::BikeCard(idx));
            }
        }
        KeyCode::Char('o') if booking => match preview.selected_field() {
            Some(Field::PickupDate) => preview.click(ClickTarget::CalendarIcon(DateField::Pickup)),
            Some(Field::DropDate) => preview.click(ClickTarget::CalendarIcon(DateField::Drop)),
            _ => {}
        },
        KeyCode::Enter if booking => preview.press_submit(),

        _ => {}
    }
}
