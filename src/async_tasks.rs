//! Timer tasks for the page controller
//!
//! Every deferred piece of page behavior runs as a tokio task that reports
//! back over one channel:
//! - Carousel autoplay intervals (cancellable)
//! - Hero fade-in, ripple removal and submit button resets (one-shot delays)
//! - The simulated booking submission
//! - Counter animation frames
//! - Resize debouncing for the terminal host

use crate::components::Submitter;
use crate::components::booking::BookingRequest;
use crate::components::reveal::CounterAnimation;
use crate::types::CarouselKind;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Messages sent from timer tasks to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum TaskMessage {
    /// Autoplay period elapsed; stale generations are ignored
    AutoplayTick {
        carousel: CarouselKind,
        generation: u64,
    },

    /// A freshly shown slide may fade in
    SlideFadeIn { carousel: CarouselKind, index: usize },

    /// The booking submission finished
    SubmissionSettled { outcome: Result<(), String> },

    /// The success/error button state has been shown long enough
    SubmitFeedbackElapsed,

    /// A ripple reached the end of its lifetime
    RippleExpired { id: u64 },

    /// One animation frame of a counter
    CounterFrame {
        counter: usize,
        value: u64,
        finished: bool,
    },

    /// The viewport stopped changing size
    ResizeComplete { width: u16, height: u16 },
}

/// Handle for cancelling a background task; dropping it cancels too
#[derive(Debug)]
pub struct TaskHandle {
    cancel_tx: watch::Sender<bool>,
}

impl TaskHandle {
    pub fn cancel(self) {
        let _ = self.cancel_tx.send(true);
    }
}

/// Manages spawning and communication with timer tasks
#[derive(Clone)]
pub struct AsyncTaskRunner {
    tx: mpsc::UnboundedSender<TaskMessage>,
}

impl AsyncTaskRunner {
    /// Create a new task runner
    pub fn new(tx: mpsc::UnboundedSender<TaskMessage>) -> Self {
        Self { tx }
    }

    /// Spawn an autoplay interval for `carousel`
    ///
    /// Sends an [`TaskMessage::AutoplayTick`] every `period` until the
    /// returned handle is cancelled or dropped.
    pub fn spawn_autoplay(
        &self,
        carousel: CarouselKind,
        generation: u64,
        period: Duration,
    ) -> TaskHandle {
        let tx = self.tx.clone();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        tokio::spawn(async move { autoplay_task(carousel, generation, period, tx, cancel_rx).await });

        TaskHandle { cancel_tx }
    }

    /// Send `msg` once after `delay`
    pub fn spawn_delayed(&self, delay: Duration, msg: TaskMessage) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(msg);
        })
    }

    /// Run one booking submission and report how it went
    pub fn spawn_submission(
        &self,
        submitter: Arc<dyn Submitter>,
        request: BookingRequest,
    ) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = submitter.submit(request).await.map_err(|e| {
                tracing::error!("Booking submission failed: {}", e);
                e.to_string()
            });
            let _ = tx.send(TaskMessage::SubmissionSettled { outcome });
        })
    }

    /// Drive a counter animation, one message per frame
    pub fn spawn_counter(
        &self,
        counter: usize,
        animation: CounterAnimation,
        frame: Duration,
    ) -> JoinHandle<()> {
        let tx = self.tx.clone();
        tokio::spawn(async move { counter_task(counter, animation, frame, tx).await })
    }

    /// Spawn the viewport debouncer and return its input side
    ///
    /// Each burst of sizes yields one `ResizeComplete` after `debounce_ms` of quiet
    pub fn spawn_resize_debouncer(&self, debounce_ms: u64) -> mpsc::UnboundedSender<(u16, u16)> {
        let tx = self.tx.clone();
        let (resize_tx, resize_rx) = mpsc::unbounded_channel::<(u16, u16)>();

        tokio::spawn(async move { resize_debounce_task(resize_rx, tx, debounce_ms).await });

        resize_tx
    }
}

async fn autoplay_task(
    carousel: CarouselKind,
    generation: u64,
    period: Duration,
    tx: mpsc::UnboundedSender<TaskMessage>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    tracing::debug!(
        "Autoplay started: {:?} every {:?} (generation {})",
        carousel,
        period,
        generation
    );

    loop {
        tokio::select! {
            _ = tokio::time::sleep(period) => {
                if tx.send(TaskMessage::AutoplayTick { carousel, generation }).is_err() {
                    break;
                }
            }
            // Fires on cancel and when the handle is dropped
            _ = cancel_rx.changed() => break,
        }
    }

    tracing::debug!("Autoplay stopped: {:?} (generation {})", carousel, generation);
}

async fn counter_task(
    counter: usize,
    mut animation: CounterAnimation,
    frame: Duration,
    tx: mpsc::UnboundedSender<TaskMessage>,
) {
    tracing::debug!("Counter {} animating to {}", counter, animation.target());

    loop {
        let value = animation.advance();
        let finished = animation.is_finished();
        if tx
            .send(TaskMessage::CounterFrame {
                counter,
                value,
                finished,
            })
            .is_err()
            || finished
        {
            break;
        }
        tokio::time::sleep(frame).await;
    }
}

/// Hold back terminal sizes until the window has been still for `quiet_ms`
///
/// Only the last size of a burst is reported, so the text carousel is
/// re-measured once per drag rather than once per event.
async fn resize_debounce_task(
    mut sizes: mpsc::UnboundedReceiver<(u16, u16)>,
    tx: mpsc::UnboundedSender<TaskMessage>,
    quiet_ms: u64,
) {
    let quiet = Duration::from_millis(quiet_ms);
    tracing::debug!("Watching viewport size ({}ms quiet period)", quiet_ms);

    // Idle until a burst starts, then keep the newest size until it settles
    while let Some(mut latest) = sizes.recv().await {
        loop {
            match tokio::time::timeout(quiet, sizes.recv()).await {
                Ok(Some(size)) => latest = size,
                Ok(None) => return,
                Err(_) => break,
            }
        }

        let (width, height) = latest;
        tracing::debug!("Viewport settled at {}x{}", width, height);
        if tx.send(TaskMessage::ResizeComplete { width, height }).is_err() {
            return;
        }
    }

    tracing::debug!("Viewport watcher stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_ticks_until_cancelled() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = AsyncTaskRunner::new(tx);

        let handle = runner.spawn_autoplay(CarouselKind::Hero, 7, Duration::from_millis(1000));
        tokio::time::sleep(Duration::from_millis(3500)).await;

        let mut ticks = 0;
        while let Ok(msg) = rx.try_recv() {
            assert_eq!(
                msg,
                TaskMessage::AutoplayTick {
                    carousel: CarouselKind::Hero,
                    generation: 7
                }
            );
            ticks += 1;
        }
        assert_eq!(ticks, 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = AsyncTaskRunner::new(tx);

        runner.spawn_delayed(Duration::from_millis(600), TaskMessage::RippleExpired { id: 4 });
        tokio::time::sleep(Duration::from_millis(599)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.try_recv().unwrap(), TaskMessage::RippleExpired { id: 4 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_counter_frames_end_on_target() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = AsyncTaskRunner::new(tx);

        let animation = CounterAnimation::new(50, 2000, 16);
        runner
            .spawn_counter(0, animation, Duration::from_millis(16))
            .await
            .unwrap();

        let mut last = None;
        while let Ok(msg) = rx.try_recv() {
            last = Some(msg);
        }
        assert_eq!(
            last,
            Some(TaskMessage::CounterFrame {
                counter: 0,
                value: 50,
                finished: true
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_debounce_collapses_bursts() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let runner = AsyncTaskRunner::new(tx);

        let resize_tx = runner.spawn_resize_debouncer(200);
        resize_tx.send((80, 24)).unwrap();
        resize_tx.send((100, 30)).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(
            rx.try_recv().unwrap(),
            TaskMessage::ResizeComplete {
                width: 100,
                height: 30
            }
        );
        assert!(rx.try_recv().is_err());

        // A later burst is reported on its own
        resize_tx.send((120, 40)).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(
            rx.try_recv().unwrap(),
            TaskMessage::ResizeComplete {
                width: 120,
                height: 40
            }
        );
    }
}
