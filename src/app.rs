use crate::async_tasks::{AsyncTaskRunner, TaskHandle, TaskMessage};
use crate::components::booking::{SubmitCheck, SubmitState};
use crate::components::date_picker::parse_date;
use crate::components::{
    BookingForm, Carousel, Counter, CounterAnimation, DatePicker, DropOutcome, PopupMenu,
    Ripples, ScrollEffects, SimulatedSubmitter, Submitter, TimeRange, VisibilityObserver,
};
use crate::constants::BOOKING_ANCHOR;
use crate::error::Result;
use crate::markup::{PageBindings, tallest_slide};
use crate::types::{
    CarouselKind, ClickTarget, Config, DateField, Effect, Field, NavKey, Observed, PageEvent,
    TimeSelector, Viewport,
};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
enum SlideStep {
    Next,
    Prev,
    To(usize),
}

/// Autoplay bookkeeping for one carousel
#[derive(Debug, Default)]
struct Autoplay {
    // Bumped on every start/stop so ticks already in flight are dropped
    generation: u64,
    handle: Option<TaskHandle>,
}

/// Page Behavior Controller
///
/// Owns one state object per page component, routes [`PageEvent`]s and
/// [`TaskMessage`]s to them and schedules the timers they need. Hosts read
/// the component state back to render and drain [`Effect`]s to carry out.
pub struct PageController {
    config: Config,
    bindings: PageBindings,
    runner: AsyncTaskRunner,
    submitter: Arc<dyn Submitter>,

    pub viewport: Viewport,
    scroll: ScrollEffects,
    menu: PopupMenu,
    ripples: Ripples,

    hero: Option<Carousel>,
    text: Option<Carousel>,
    hero_autoplay: Autoplay,
    text_autoplay: Autoplay,
    // Carousel under the pointer; arrow keys only drive this one
    hovered: Option<CarouselKind>,
    text_carousel_height: usize,

    form: Option<BookingForm>,
    times: Option<TimeRange>,
    dates: Option<DatePicker>,

    reveal_observer: VisibilityObserver,
    revealed: Vec<bool>,
    counter_observer: VisibilityObserver,
    counters: Vec<Counter>,
    tooltips: Vec<String>,

    effects: Vec<Effect>,
}

impl PageController {
    /// Bind a controller to a parsed page; `today` anchors the date picker
    pub fn new(
        bindings: PageBindings,
        config: Config,
        runner: AsyncTaskRunner,
        today: NaiveDate,
    ) -> Result<Self> {
        let config = config.sanitized();

        let non_empty = |kind, slides: &Vec<String>| {
            (!slides.is_empty()).then(|| Carousel::new(kind, slides.len()))
        };
        let hero = non_empty(CarouselKind::Hero, &bindings.hero_slides);
        let text = non_empty(CarouselKind::Text, &bindings.text_slides);

        let form = bindings.form.as_ref().map(|f| {
            BookingForm::new(
                f.fields.clone(),
                f.submit_label.clone(),
                f.choices.get(Field::BikeModel.name()).cloned().unwrap_or_default(),
            )
        });

        let times = (!bindings.time_options.is_empty())
            .then(|| TimeRange::new(bindings.time_options.clone()));

        let dates = if bindings.date_inputs {
            Some(DatePicker::new(today, &config.date_format, &config.date_max_offset)?)
        } else {
            None
        };

        let submitter = Arc::new(SimulatedSubmitter::new(Duration::from_millis(
            config.submit_latency_ms,
        )));

        Ok(PageController {
            reveal_observer: VisibilityObserver::new(config.reveal_threshold),
            counter_observer: VisibilityObserver::new(config.counter_threshold),
            revealed: vec![false; bindings.reveal_targets.len()],
            counters: bindings.counters.iter().map(|c| Counter::new(c.target)).collect(),
            config,
            runner,
            submitter,
            viewport: Viewport::default(),
            scroll: ScrollEffects::new(),
            menu: PopupMenu::new(),
            ripples: Ripples::new(),
            hero,
            text,
            hero_autoplay: Autoplay::default(),
            text_autoplay: Autoplay::default(),
            hovered: None,
            text_carousel_height: 0,
            form,
            times,
            dates,
            tooltips: Vec::new(),
            effects: Vec::new(),
            bindings,
        })
    }

    /// Replace the simulated backend
    pub fn with_submitter(mut self, submitter: Arc<dyn Submitter>) -> Self {
        self.submitter = submitter;
        self
    }

    /// Page-load wiring: tooltips, observers, first hero slide, autoplay
    pub fn start(&mut self) {
        self.tooltips = self.bindings.tooltips.clone();
        tracing::debug!("Initialized {} tooltips", self.tooltips.len());

        for idx in 0..self.revealed.len() {
            self.reveal_observer.observe(Observed::Reveal(idx));
        }
        for idx in 0..self.counters.len() {
            self.counter_observer.observe(Observed::Counter(idx));
        }

        if self.hero.is_some() {
            self.step(CarouselKind::Hero, SlideStep::To(0));
        }
        self.start_autoplay(CarouselKind::Hero);
        self.start_autoplay(CarouselKind::Text);

        tracing::info!(
            "Page controller started: {} reveal targets, {} counters, form bound: {}",
            self.revealed.len(),
            self.counters.len(),
            self.form.is_some()
        );
    }

    /// Effects produced since the last call
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn handle_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::Scroll { offset_y } => {
                self.viewport.scroll_y = offset_y.max(0.0);
                self.scroll.update(&self.viewport, &self.config);
            }
            PageEvent::Resize {
                width_px,
                height_px,
            } => {
                self.viewport.width_px = width_px;
                self.viewport.height_px = height_px;
                self.menu.close();
            }
            PageEvent::Key(key) => self.handle_key(key),
            PageEvent::Click(target) => self.handle_click(target),
            PageEvent::ButtonPress {
                button,
                pointer,
                origin,
            } => {
                let id = self.ripples.spawn(button, pointer, origin);
                self.runner.spawn_delayed(
                    Duration::from_millis(self.config.ripple_lifetime_ms),
                    TaskMessage::RippleExpired { id },
                );
            }
            PageEvent::HoverEnter(kind) => {
                self.hovered = Some(kind);
                self.stop_autoplay(kind);
            }
            PageEvent::HoverLeave(kind) => {
                if self.hovered == Some(kind) {
                    self.hovered = None;
                }
                self.start_autoplay(kind);
            }
            PageEvent::Visibility { target, ratio } => self.handle_visibility(target, ratio),
            PageEvent::FieldInput { field, value } => self.handle_field_input(field, value),
            PageEvent::TimeSelected { selector, index } => self.select_time(selector, index),
            PageEvent::DateSelected { field, date } => self.select_date(field, date),
            PageEvent::Submit => self.submit(),
        }
    }

    pub fn handle_task_message(&mut self, msg: TaskMessage) {
        match msg {
            TaskMessage::AutoplayTick {
                carousel,
                generation,
            } => {
                let autoplay = self.autoplay(carousel);
                if autoplay.handle.is_some() && autoplay.generation == generation {
                    self.step(carousel, SlideStep::Next);
                } else {
                    tracing::debug!("Dropping stale {:?} autoplay tick", carousel);
                }
            }

            TaskMessage::SlideFadeIn { carousel, index } => {
                if let Some(c) = self.carousel_mut(carousel) {
                    c.reveal(index);
                }
            }

            TaskMessage::SubmissionSettled { outcome } => {
                let succeeded = outcome.is_ok();
                if let Some(form) = &mut self.form {
                    form.finish_submission(succeeded);
                }
                if succeeded {
                    tracing::info!("Booking submitted");
                    if let Some(times) = &mut self.times {
                        times.reset();
                    }
                    if let Some(dates) = &mut self.dates {
                        dates.reset();
                    }
                }
                self.schedule_submit_feedback();
            }

            TaskMessage::SubmitFeedbackElapsed => {
                if let Some(form) = &mut self.form {
                    form.restore();
                }
            }

            TaskMessage::RippleExpired { id } => {
                self.ripples.remove(id);
            }

            TaskMessage::CounterFrame {
                counter,
                value,
                finished,
            } => {
                if let Some(c) = self.counters.get_mut(counter) {
                    c.displayed = value;
                    c.finished = finished;
                    if finished {
                        tracing::debug!("Counter {} settled at {}", counter, value);
                    }
                }
            }

            TaskMessage::ResizeComplete { width, height } => {
                tracing::debug!("Resize complete at {}x{} (host concern)", width, height);
            }
        }
    }

    fn handle_key(&mut self, key: NavKey) {
        let Some(kind) = self.hovered else {
            tracing::debug!("{:?} ignored: no carousel under the pointer", key);
            return;
        };
        match key {
            NavKey::ArrowLeft => self.step(kind, SlideStep::Prev),
            NavKey::ArrowRight => self.step(kind, SlideStep::Next),
        }
    }

    fn handle_click(&mut self, target: ClickTarget) {
        self.menu.handle_click(&target);

        match target {
            ClickTarget::Anchor(href) | ClickTarget::MenuLink(href) => {
                if self.bindings.has_target(&href) {
                    self.effects.push(Effect::ScrollIntoView {
                        id: href.trim_start_matches('#').to_string(),
                    });
                } else {
                    tracing::debug!("Anchor {} has no target on this page", href);
                }
            }
            ClickTarget::BikeCard(idx) => self.choose_bike(idx),
            ClickTarget::CarouselPrev(kind) => self.step(kind, SlideStep::Prev),
            ClickTarget::CarouselNext(kind) => self.step(kind, SlideStep::Next),
            ClickTarget::HeroIndicator(idx) => self.step(CarouselKind::Hero, SlideStep::To(idx)),
            ClickTarget::CalendarIcon(field) => {
                self.effects.push(Effect::FocusField(field.field()));
            }
            ClickTarget::MenuToggle | ClickTarget::MenuPanel | ClickTarget::Elsewhere => {}
        }
    }

    fn choose_bike(&mut self, idx: usize) {
        let Some(title) = self.bindings.bike_cards.get(idx).cloned() else {
            return;
        };

        if let Some(form) = &mut self.form {
            // A select cannot hold a value it has no option for
            let known = form.bike_models().is_empty() || form.bike_models().contains(&title);
            if known {
                form.set(Field::BikeModel, title);
            } else {
                tracing::warn!("Bike '{}' is not a booking option", title);
                form.set(Field::BikeModel, "");
            }
        }

        self.effects.push(Effect::ScrollIntoView {
            id: BOOKING_ANCHOR.to_string(),
        });
    }

    fn handle_visibility(&mut self, target: Observed, ratio: f64) {
        match target {
            Observed::Reveal(idx) => {
                if self.reveal_observer.notify(target, ratio)
                    && let Some(flag) = self.revealed.get_mut(idx)
                {
                    tracing::debug!("Reveal target {} animated", idx);
                    *flag = true;
                }
            }
            Observed::Counter(idx) => {
                if !self.counter_observer.notify(target, ratio) {
                    return;
                }
                let Some(counter) = self.counters.get_mut(idx) else {
                    return;
                };
                counter.started = true;
                let animation = CounterAnimation::new(
                    counter.target,
                    self.config.counter_duration_ms,
                    self.config.frame_ms,
                );
                self.runner.spawn_counter(
                    idx,
                    animation,
                    Duration::from_millis(self.config.frame_ms),
                );
            }
        }
    }

    fn handle_field_input(&mut self, field: Field, value: String) {
        let selector = match field {
            Field::PickupTime => Some(TimeSelector::Pickup),
            Field::DropTime => Some(TimeSelector::Drop),
            _ => None,
        };

        if let Some(selector) = selector
            && let Some(index) = self.times.as_ref().and_then(|t| t.index_of(&value))
        {
            self.select_time(selector, index);
            return;
        }

        if let Some(form) = &mut self.form {
            form.set(field, value);
        }
    }

    fn select_time(&mut self, selector: TimeSelector, index: usize) {
        let Some(times) = &mut self.times else {
            return;
        };

        match selector {
            TimeSelector::Pickup => {
                times.select_pickup(index);
            }
            TimeSelector::Drop => {
                if let DropOutcome::Adjusted { reason, .. } = times.select_drop(index) {
                    self.effects.push(Effect::Alert(reason.to_string()));
                }
            }
        }

        let pickup = times.pickup_value().to_string();
        let drop = times.drop_value().to_string();
        if let Some(form) = &mut self.form {
            form.set(Field::PickupTime, pickup);
            form.set(Field::DropTime, drop);
        }
    }

    fn select_date(&mut self, field: DateField, date: NaiveDate) {
        let Some(dates) = &mut self.dates else {
            return;
        };

        let current_drop = self
            .form
            .as_ref()
            .and_then(|f| dates.parse(f.value(Field::DropDate)).ok());

        match dates.select(field, date, current_drop) {
            Ok(selection) => {
                if let Some(form) = &mut self.form {
                    form.set(field.field(), selection.value);
                    if selection.clear_drop {
                        form.set(Field::DropDate, "");
                    }
                }
            }
            Err(e) => tracing::warn!("Date not applied: {}", e),
        }
    }

    fn submit(&mut self) {
        let Some(form) = &mut self.form else {
            return;
        };
        if form.state() != SubmitState::Idle {
            tracing::debug!("Submit ignored: attempt already in flight");
            return;
        }

        let format = &self.config.date_format;
        match form.check(|value| parse_date(value, format)) {
            Ok(SubmitCheck::Ready(request)) => {
                form.begin_submission();
                tracing::info!(
                    "Submitting booking {} -> {} ({})",
                    request.pickup_date,
                    request.drop_date,
                    request.bike_model
                );
                self.runner
                    .spawn_submission(Arc::clone(&self.submitter), request);
            }
            Ok(SubmitCheck::Rejected(reason)) => {
                tracing::debug!("Booking rejected: {}", reason);
                self.effects.push(Effect::Alert(reason.to_string()));
            }
            Err(e) => {
                tracing::warn!("Booking could not be read: {}", e);
                form.begin_submission();
                form.finish_submission(false);
                self.schedule_submit_feedback();
            }
        }
    }

    fn schedule_submit_feedback(&self) {
        self.runner.spawn_delayed(
            Duration::from_millis(self.config.submit_feedback_ms),
            TaskMessage::SubmitFeedbackElapsed,
        );
    }

    fn step(&mut self, kind: CarouselKind, step: SlideStep) {
        let Some(carousel) = self.carousel_mut(kind) else {
            return;
        };

        let shown = match step {
            SlideStep::Next => carousel.next(),
            SlideStep::Prev => carousel.prev(),
            SlideStep::To(idx) => carousel.show(idx),
        };
        let fades_in = carousel.fades_in();

        if let Some(index) = shown
            && fades_in
        {
            self.runner.spawn_delayed(
                Duration::from_millis(self.config.hero_fade_delay_ms),
                TaskMessage::SlideFadeIn {
                    carousel: kind,
                    index,
                },
            );
        }
    }

    fn start_autoplay(&mut self, kind: CarouselKind) {
        if self.carousel(kind).is_none_or(Carousel::is_empty) {
            return;
        }

        let period = self.config.autoplay_period(kind);
        let runner = self.runner.clone();
        let autoplay = self.autoplay_mut(kind);
        if let Some(handle) = autoplay.handle.take() {
            handle.cancel();
        }
        autoplay.generation += 1;
        autoplay.handle = Some(runner.spawn_autoplay(kind, autoplay.generation, period));
    }

    fn stop_autoplay(&mut self, kind: CarouselKind) {
        let autoplay = self.autoplay_mut(kind);
        if let Some(handle) = autoplay.handle.take() {
            handle.cancel();
            autoplay.generation += 1;
            tracing::debug!("{:?} autoplay paused", kind);
        }
    }

    fn autoplay(&self, kind: CarouselKind) -> &Autoplay {
        match kind {
            CarouselKind::Hero => &self.hero_autoplay,
            CarouselKind::Text => &self.text_autoplay,
        }
    }

    fn autoplay_mut(&mut self, kind: CarouselKind) -> &mut Autoplay {
        match kind {
            CarouselKind::Hero => &mut self.hero_autoplay,
            CarouselKind::Text => &mut self.text_autoplay,
        }
    }

    fn carousel_mut(&mut self, kind: CarouselKind) -> Option<&mut Carousel> {
        match kind {
            CarouselKind::Hero => self.hero.as_mut(),
            CarouselKind::Text => self.text.as_mut(),
        }
    }

    pub fn carousel(&self, kind: CarouselKind) -> Option<&Carousel> {
        match kind {
            CarouselKind::Hero => self.hero.as_ref(),
            CarouselKind::Text => self.text.as_ref(),
        }
    }

    pub fn is_autoplaying(&self, kind: CarouselKind) -> bool {
        self.autoplay(kind).handle.is_some()
    }

    pub fn hovered(&self) -> Option<CarouselKind> {
        self.hovered
    }

    /// Size the text carousel to its tallest slide at `columns` wide
    pub fn fit_text_carousel(&mut self, columns: usize) -> usize {
        self.text_carousel_height = tallest_slide(&self.bindings.text_slides, columns);
        self.text_carousel_height
    }

    pub fn text_carousel_height(&self) -> usize {
        self.text_carousel_height
    }

    pub fn bindings(&self) -> &PageBindings {
        &self.bindings
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn form(&self) -> Option<&BookingForm> {
        self.form.as_ref()
    }

    pub fn times(&self) -> Option<&TimeRange> {
        self.times.as_ref()
    }

    pub fn dates(&self) -> Option<&DatePicker> {
        self.dates.as_ref()
    }

    pub fn menu_open(&self) -> bool {
        self.menu.is_open()
    }

    pub fn navbar_scrolled(&self) -> bool {
        self.scroll.navbar_scrolled()
    }

    pub fn hero_background_y(&self) -> f64 {
        self.scroll.hero_background_y()
    }

    pub fn ripples(&self) -> &Ripples {
        &self.ripples
    }

    pub fn is_revealed(&self, idx: usize) -> bool {
        self.revealed.get(idx).copied().unwrap_or(false)
    }

    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    pub fn tooltips(&self) -> &[String] {
        &self.tooltips
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::booking::{BookingRequest, SubmitFuture};
    use crate::constants::{MSG_DROP_BEFORE_PICKUP, MSG_MIN_DURATION, MSG_UNDERAGE};
    use crate::error::PageError;
    use crate::markup::parse_html;
    use crate::types::Point;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    const PAGE: &str = include_str!("../assets/index.html");

    struct Harness {
        controller: PageController,
        rx: mpsc::UnboundedReceiver<TaskMessage>,
    }

    impl Harness {
        fn new() -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
            let controller = PageController::new(
                parse_html(PAGE).unwrap(),
                Config::default(),
                AsyncTaskRunner::new(tx),
                today,
            )
            .unwrap();
            Harness { controller, rx }
        }

        fn started() -> Self {
            let mut harness = Self::new();
            harness.controller.start();
            harness
        }

        fn send(&mut self, event: PageEvent) {
            self.controller.handle_event(event);
        }

        /// Let `ms` of virtual time pass, feeding task messages back in
        async fn pump(&mut self, ms: u64) {
            for _ in 0..ms {
                tokio::time::sleep(Duration::from_millis(1)).await;
                tokio::task::yield_now().await;
                while let Ok(msg) = self.rx.try_recv() {
                    self.controller.handle_task_message(msg);
                }
            }
        }

        fn form(&self) -> &BookingForm {
            self.controller.form().unwrap()
        }

        fn input(&mut self, field: Field, value: &str) {
            self.send(PageEvent::FieldInput {
                field,
                value: value.to_string(),
            });
        }

        fn fill_valid_booking(&mut self) {
            let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
            self.send(PageEvent::DateSelected {
                field: DateField::Pickup,
                date: day(12),
            });
            self.send(PageEvent::DateSelected {
                field: DateField::Drop,
                date: day(14),
            });
            self.send(PageEvent::TimeSelected {
                selector: TimeSelector::Pickup,
                index: 2,
            });
            self.input(Field::Age, "yes");
            self.input(Field::BikeModel, "Himalayan");
        }
    }

    struct FailingSubmitter;

    impl Submitter for FailingSubmitter {
        fn submit(&self, _request: BookingRequest) -> SubmitFuture {
            Box::pin(async { Err::<(), _>(PageError::Submission("offline".to_string())) })
        }
    }

    struct CountingSubmitter(Arc<AtomicUsize>);

    impl Submitter for CountingSubmitter {
        fn submit(&self, _request: BookingRequest) -> SubmitFuture {
            self.0.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(())
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hero_fades_in_then_autoplays() {
        let mut h = Harness::started();
        let hero = |h: &Harness| h.controller.carousel(CarouselKind::Hero).unwrap().clone();

        assert_eq!(hero(&h).current(), 0);
        assert!(!hero(&h).is_revealed());

        h.pump(60).await;
        assert!(hero(&h).is_revealed());

        h.pump(960).await;
        assert_eq!(hero(&h).current(), 1);
        assert_eq!(
            h.controller.carousel(CarouselKind::Text).unwrap().current(),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hover_pauses_autoplay() {
        let mut h = Harness::started();
        h.send(PageEvent::HoverEnter(CarouselKind::Hero));
        assert!(!h.controller.is_autoplaying(CarouselKind::Hero));

        h.pump(3000).await;
        assert_eq!(h.controller.carousel(CarouselKind::Hero).unwrap().current(), 0);

        h.send(PageEvent::HoverLeave(CarouselKind::Hero));
        assert!(h.controller.is_autoplaying(CarouselKind::Hero));
        h.pump(1010).await;
        assert_eq!(h.controller.carousel(CarouselKind::Hero).unwrap().current(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_arrow_keys_drive_hovered_carousel_only() {
        let mut h = Harness::started();
        let current = |h: &Harness, kind| h.controller.carousel(kind).unwrap().current();

        h.send(PageEvent::Key(NavKey::ArrowRight));
        assert_eq!(current(&h, CarouselKind::Text), 0);
        assert_eq!(current(&h, CarouselKind::Hero), 0);

        h.send(PageEvent::HoverEnter(CarouselKind::Text));
        h.send(PageEvent::Key(NavKey::ArrowLeft));
        assert_eq!(current(&h, CarouselKind::Text), 2);
        assert_eq!(current(&h, CarouselKind::Hero), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_indicator_and_buttons_step_carousels() {
        let mut h = Harness::started();
        h.send(PageEvent::Click(ClickTarget::HeroIndicator(2)));
        assert_eq!(h.controller.carousel(CarouselKind::Hero).unwrap().current(), 2);

        // Out of range indicators are ignored
        h.send(PageEvent::Click(ClickTarget::HeroIndicator(7)));
        assert_eq!(h.controller.carousel(CarouselKind::Hero).unwrap().current(), 2);

        h.send(PageEvent::Click(ClickTarget::CarouselNext(CarouselKind::Text)));
        assert_eq!(h.controller.carousel(CarouselKind::Text).unwrap().current(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_valid_submission_lifecycle() {
        let mut h = Harness::started();
        h.fill_valid_booking();
        assert_eq!(h.form().value(Field::DropTime), "09:30");

        h.send(PageEvent::Submit);
        assert!(h.controller.take_effects().is_empty());
        assert_eq!(h.form().state(), SubmitState::Processing);
        assert_eq!(h.form().button_label(), "Processing...");

        h.pump(1400).await;
        assert_eq!(h.form().state(), SubmitState::Processing);

        h.pump(200).await;
        assert_eq!(h.form().state(), SubmitState::Success);
        assert_eq!(h.form().button_label(), "Success!");
        assert_eq!(h.form().value(Field::PickupDate), "");
        assert_eq!(h.form().value(Field::BikeModel), "");
        assert_eq!(h.controller.times().unwrap().pickup_index(), 0);

        h.pump(2010).await;
        assert_eq!(h.form().state(), SubmitState::Idle);
        assert_eq!(h.form().button_label(), "Book Now");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_submissions_alert_and_keep_fields() {
        let mut h = Harness::started();
        h.fill_valid_booking();
        h.input(Field::DropDate, "12/03/2026");

        h.send(PageEvent::Submit);
        assert_eq!(
            h.controller.take_effects(),
            vec![Effect::Alert(MSG_DROP_BEFORE_PICKUP.to_string())]
        );
        assert_eq!(h.form().state(), SubmitState::Idle);
        assert_eq!(h.form().value(Field::DropDate), "12/03/2026");

        h.input(Field::DropDate, "14/03/2026");
        h.input(Field::Age, "no");
        h.send(PageEvent::Submit);
        assert_eq!(
            h.controller.take_effects(),
            vec![Effect::Alert(MSG_UNDERAGE.to_string())]
        );

        h.pump(2000).await;
        assert_eq!(h.form().state(), SubmitState::Idle);
        assert_eq!(h.form().value(Field::BikeModel), "Himalayan");
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_date_shows_error_state() {
        let mut h = Harness::started();
        h.send(PageEvent::Submit);

        assert!(h.controller.take_effects().is_empty());
        assert_eq!(h.form().state(), SubmitState::Failed);
        assert_eq!(h.form().button_label(), "Error");

        h.pump(2010).await;
        assert_eq!(h.form().state(), SubmitState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_backend_keeps_fields() {
        let mut h = Harness::new();
        h.controller = h.controller.with_submitter(Arc::new(FailingSubmitter));
        h.controller.start();
        h.fill_valid_booking();

        h.send(PageEvent::Submit);
        h.pump(10).await;
        assert_eq!(h.form().state(), SubmitState::Failed);
        assert_eq!(h.form().value(Field::PickupDate), "12/03/2026");

        h.pump(2010).await;
        assert_eq!(h.form().state(), SubmitState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_ignored_while_in_flight() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut h = Harness::new();
        h.controller = h
            .controller
            .with_submitter(Arc::new(CountingSubmitter(Arc::clone(&calls))));
        h.controller.start();
        h.fill_valid_booking();

        h.send(PageEvent::Submit);
        h.send(PageEvent::Submit);
        h.pump(50).await;
        h.send(PageEvent::Submit);
        h.pump(100).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.form().state(), SubmitState::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_rental_alerts_and_moves_drop() {
        let mut h = Harness::started();
        h.send(PageEvent::TimeSelected {
            selector: TimeSelector::Pickup,
            index: 2,
        });
        h.send(PageEvent::TimeSelected {
            selector: TimeSelector::Drop,
            index: 3,
        });

        assert_eq!(
            h.controller.take_effects(),
            vec![Effect::Alert(MSG_MIN_DURATION.to_string())]
        );
        assert_eq!(h.form().value(Field::PickupTime), "09:00");
        assert_eq!(h.form().value(Field::DropTime), "10:00");
        assert!(h.controller.times().unwrap().is_drop_disabled(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_field_input_routes_through_range() {
        let mut h = Harness::started();
        h.input(Field::PickupTime, "09:00");
        assert_eq!(h.controller.times().unwrap().pickup_index(), 2);
        assert_eq!(h.form().value(Field::DropTime), "09:30");
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_pickup_clears_earlier_drop() {
        let mut h = Harness::started();
        let day = |d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();
        h.send(PageEvent::DateSelected {
            field: DateField::Drop,
            date: day(14),
        });
        h.send(PageEvent::DateSelected {
            field: DateField::Pickup,
            date: day(15),
        });

        assert_eq!(h.form().value(Field::PickupDate), "15/03/2026");
        assert_eq!(h.form().value(Field::DropDate), "");
        assert_eq!(h.controller.dates().unwrap().bounds(DateField::Drop).0, day(15));

        // Before the new minimum: ignored
        h.send(PageEvent::DateSelected {
            field: DateField::Drop,
            date: day(13),
        });
        assert_eq!(h.form().value(Field::DropDate), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unusable_date_format_falls_back_to_default() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = Config {
            date_format: "%Q".to_string(),
            ..Config::default()
        };
        let mut controller = PageController::new(
            parse_html(PAGE).unwrap(),
            config,
            AsyncTaskRunner::new(tx),
            NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        )
        .unwrap();

        controller.handle_event(PageEvent::DateSelected {
            field: DateField::Pickup,
            date: NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(),
        });
        assert_eq!(
            controller.form().unwrap().value(Field::PickupDate),
            "12/03/2026"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_counter_runs_to_target_once_visible() {
        let mut h = Harness::started();
        h.send(PageEvent::Visibility {
            target: Observed::Counter(0),
            ratio: 0.4,
        });
        h.pump(100).await;
        assert_eq!(h.controller.counters()[0].displayed, 0);

        h.send(PageEvent::Visibility {
            target: Observed::Counter(0),
            ratio: 0.6,
        });
        h.pump(1000).await;
        let midway = h.controller.counters()[0].displayed;
        assert!(midway > 0 && midway < 1200);
        assert!(!h.controller.counters()[0].finished);

        h.pump(1100).await;
        assert_eq!(h.controller.counters()[0].displayed, 1200);
        assert!(h.controller.counters()[0].finished);
        assert_eq!(h.controller.counters()[1].displayed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_fires_once() {
        let mut h = Harness::started();
        h.send(PageEvent::Visibility {
            target: Observed::Reveal(1),
            ratio: 0.05,
        });
        assert!(!h.controller.is_revealed(1));

        h.send(PageEvent::Visibility {
            target: Observed::Reveal(1),
            ratio: 0.3,
        });
        assert!(h.controller.is_revealed(1));

        h.send(PageEvent::Visibility {
            target: Observed::Reveal(1),
            ratio: 0.0,
        });
        assert!(h.controller.is_revealed(1));
        assert!(!h.controller.is_revealed(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_anchor_and_bike_card_clicks() {
        let mut h = Harness::started();
        h.send(PageEvent::Click(ClickTarget::Anchor("#fleet".to_string())));
        h.send(PageEvent::Click(ClickTarget::Anchor("#nowhere".to_string())));
        h.send(PageEvent::Click(ClickTarget::BikeCard(1)));

        assert_eq!(
            h.controller.take_effects(),
            vec![
                Effect::ScrollIntoView {
                    id: "fleet".to_string()
                },
                Effect::ScrollIntoView {
                    id: BOOKING_ANCHOR.to_string()
                },
            ]
        );
        assert_eq!(h.form().value(Field::BikeModel), "Himalayan");
    }

    #[tokio::test(start_paused = true)]
    async fn test_calendar_icon_focuses_input() {
        let mut h = Harness::started();
        h.send(PageEvent::Click(ClickTarget::CalendarIcon(DateField::Drop)));
        assert_eq!(
            h.controller.take_effects(),
            vec![Effect::FocusField(Field::DropDate)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_menu_toggle_outside_click_and_resize() {
        let mut h = Harness::started();
        h.send(PageEvent::Click(ClickTarget::MenuToggle));
        assert!(h.controller.menu_open());

        h.send(PageEvent::Click(ClickTarget::MenuPanel));
        assert!(h.controller.menu_open());

        // A link in the panel scrolls but leaves the menu up
        h.controller.take_effects();
        h.send(PageEvent::Click(ClickTarget::MenuLink("#booking".to_string())));
        assert!(h.controller.menu_open());
        assert_eq!(
            h.controller.take_effects(),
            vec![Effect::ScrollIntoView {
                id: "booking".to_string()
            }]
        );

        h.send(PageEvent::Click(ClickTarget::Elsewhere));
        assert!(!h.controller.menu_open());

        h.send(PageEvent::Click(ClickTarget::MenuToggle));
        h.send(PageEvent::Resize {
            width_px: 800,
            height_px: 600,
        });
        assert!(!h.controller.menu_open());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_styles_navbar_and_parallax() {
        let mut h = Harness::started();
        h.send(PageEvent::Scroll { offset_y: 50.0 });
        assert!(!h.controller.navbar_scrolled());

        h.send(PageEvent::Scroll { offset_y: 60.0 });
        assert!(h.controller.navbar_scrolled());
        assert_eq!(h.controller.hero_background_y(), 30.0);

        h.send(PageEvent::Resize {
            width_px: 600,
            height_px: 800,
        });
        h.send(PageEvent::Scroll { offset_y: 200.0 });
        assert_eq!(h.controller.hero_background_y(), 30.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ripple_expires() {
        let mut h = Harness::started();
        h.send(PageEvent::ButtonPress {
            button: 0,
            pointer: Point::new(30.0, 12.0),
            origin: Point::new(10.0, 10.0),
        });
        assert_eq!(h.controller.ripples().active().len(), 1);

        h.pump(590).await;
        assert_eq!(h.controller.ripples().active().len(), 1);
        h.pump(20).await;
        assert!(h.controller.ripples().active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_carousel_fits_tallest_slide() {
        let mut h = Harness::new();
        let wide = h.controller.fit_text_carousel(200);
        let narrow = h.controller.fit_text_carousel(30);
        assert_eq!(wide, 1);
        assert!(narrow > wide);
        assert_eq!(h.controller.text_carousel_height(), narrow);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tooltips_initialized_on_start() {
        let mut h = Harness::new();
        assert!(h.controller.tooltips().is_empty());
        h.controller.start();
        assert_eq!(h.controller.tooltips().len(), 2);
    }
}
