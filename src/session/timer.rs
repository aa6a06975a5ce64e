//! Cancellable periodic tasks
//!
//! A timer's first tick fires one full period after it is armed. Cancelling
//! aborts the task; it is idempotent and also happens on drop.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Smallest accepted period; `interval_at` rejects zero
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub(crate) struct TimerHandle {
    name: &'static str,
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Spawn a periodic task; it ends when `tick` returns `Break`
    pub fn spawn<T, Fut>(name: &'static str, period: Duration, mut tick: T) -> Self
    where
        T: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                if tick().await.is_break() {
                    break;
                }
            }
            log::debug!("{} timer finished", name);
        });
        log::debug!("{} timer armed ({:?})", name, period);
        Self {
            name,
            task: Some(task),
        }
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("{} timer cancelled", self.name);
        }
    }

    /// Let the task run to completion on its own
    ///
    /// Used when the timer's own tick drives the transition that would
    /// otherwise cancel it.
    pub fn detach(mut self) {
        self.task.take();
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The three session timers
///
/// Recording timers and the playback timer belong to mutually exclusive
/// session phases and are never armed together.
#[derive(Debug, Default)]
pub(crate) struct Timers {
    duration: Option<TimerHandle>,
    amplitude: Option<TimerHandle>,
    playback: Option<TimerHandle>,
}

impl Timers {
    pub fn arm_recording(&mut self, duration: TimerHandle, amplitude: TimerHandle) {
        self.cancel_playback();
        self.cancel_recording();
        self.duration = Some(duration);
        self.amplitude = Some(amplitude);
    }

    pub fn arm_playback(&mut self, playback: TimerHandle) {
        self.cancel_recording();
        self.cancel_playback();
        self.playback = Some(playback);
    }

    pub fn cancel_recording(&mut self) {
        if let Some(mut t) = self.duration.take() {
            t.cancel();
        }
        if let Some(mut t) = self.amplitude.take() {
            t.cancel();
        }
    }

    pub fn cancel_playback(&mut self) {
        if let Some(mut t) = self.playback.take() {
            t.cancel();
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel_recording();
        self.cancel_playback();
    }

    /// Release the playback timer without aborting it
    pub fn detach_playback(&mut self) {
        if let Some(t) = self.playback.take() {
            t.detach();
        }
    }

    pub fn recording_active(&self) -> bool {
        self.duration.is_some() || self.amplitude.is_some()
    }

    pub fn playback_active(&self) -> bool {
        self.playback.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(period_ms: u64, counter: &Arc<AtomicUsize>) -> TimerHandle {
        let counter = counter.clone();
        TimerHandle::spawn("test", Duration::from_millis(period_ms), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Continue(())
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let _timer = counting(100, &counter);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_is_idempotent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut timer = counting(100, &counter);

        tokio::time::sleep(Duration::from_millis(250)).await;
        timer.cancel();
        timer.cancel();
        assert!(!timer.is_active());

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_break_ends_timer() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let timer = TimerHandle::spawn("once", Duration::from_millis(10), move || {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                ControlFlow::Break(())
            }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!timer.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_arming_playback_cancels_recording() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut timers = Timers::default();
        timers.arm_recording(counting(100, &counter), counting(50, &counter));
        assert!(timers.recording_active());

        timers.arm_playback(counting(100, &Arc::new(AtomicUsize::new(0))));
        assert!(!timers.recording_active());
        assert!(timers.playback_active());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        timers.cancel_all();
        timers.cancel_all();
        assert!(!timers.playback_active());
    }
}
