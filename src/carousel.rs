//! Slide rotation for the landing-page hero carousel.
//!
//! [`Carousel`] is the bare index state machine. [`CarouselHandle`] shares
//! one carousel between manual navigation and an [`Autoplay`] timer; the
//! most recent transition wins.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CarouselError {
    #[error("slide {index} out of range (carousel has {len} slides)")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn current(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    pub fn previous(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.index
    }

    pub fn select(&mut self, index: usize) -> Result<usize, CarouselError> {
        if index >= self.len {
            return Err(CarouselError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.index = index;
        Ok(self.index)
    }

    /// Change the slide count, pulling the index back in range.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }
}

/// Shared carousel whose index changes can be observed.
#[derive(Clone, Debug)]
pub struct CarouselHandle {
    state: Arc<Mutex<Carousel>>,
    changes: Arc<watch::Sender<usize>>,
    lengths: Arc<watch::Sender<usize>>,
}

impl CarouselHandle {
    pub fn new(len: usize) -> Self {
        let (tx, _rx) = watch::channel(0);
        let (lengths, _rx) = watch::channel(len);
        Self {
            state: Arc::new(Mutex::new(Carousel::new(len))),
            changes: Arc::new(tx),
            lengths: Arc::new(lengths),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Carousel> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, f: impl FnOnce(&mut Carousel) -> usize) -> usize {
        let index = f(&mut self.lock());
        self.changes.send_replace(index);
        index
    }

    pub fn current(&self) -> usize {
        self.lock().current()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn next(&self) -> usize {
        self.transition(Carousel::next)
    }

    pub fn previous(&self) -> usize {
        self.transition(Carousel::previous)
    }

    pub fn select(&self, index: usize) -> Result<usize, CarouselError> {
        let selected = self.lock().select(index)?;
        self.changes.send_replace(selected);
        Ok(selected)
    }

    pub fn set_len(&self, len: usize) {
        self.transition(|c| {
            c.set_len(len);
            c.current()
        });
        self.lengths.send_replace(len);
    }

    /// Autoplay step: advance only while there is more than one slide.
    fn rotate(&self) -> Option<usize> {
        let index = {
            let mut carousel = self.lock();
            if carousel.len() <= 1 {
                return None;
            }
            carousel.next()
        };
        self.changes.send_replace(index);
        Some(index)
    }

    /// Receiver that observes every index change.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.changes.subscribe()
    }

    /// Start advancing every `interval`. Ticks are skipped while the
    /// carousel has fewer than two slides, and the timer restarts whenever
    /// the slide count changes. Returns `None` for a zero interval.
    pub fn autoplay(&self, interval: Duration) -> Option<Autoplay> {
        if interval.is_zero() {
            return None;
        }
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = self.clone();
        let mut lengths = self.lengths.subscribe();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = lengths.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let len = *lengths.borrow_and_update();
                        ticker.reset();
                        tracing::trace!(len, "carousel timer restarted");
                    }
                    _ = ticker.tick() => {
                        if let Some(index) = handle.rotate() {
                            tracing::trace!(index, "carousel advanced");
                        }
                    }
                }
            }
        });
        Some(Autoplay {
            cancel,
            task: Some(task),
        })
    }
}

/// Running autoplay timer. Dropping it stops the timer.
#[derive(Debug)]
pub struct Autoplay {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Autoplay {
    /// Stop the timer and wait for the task to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Autoplay {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_and_previous_wrap() {
        let mut c = Carousel::new(3);
        assert_eq!(c.next(), 1);
        assert_eq!(c.next(), 2);
        assert_eq!(c.next(), 0);
        assert_eq!(c.previous(), 2);
        assert_eq!(c.previous(), 1);
    }

    #[test]
    fn empty_carousel_stays_at_zero() {
        let mut c = Carousel::new(0);
        assert_eq!(c.next(), 0);
        assert_eq!(c.previous(), 0);
        assert!(c.select(0).is_err());
    }

    #[test]
    fn select_jumps_and_rejects_out_of_range() {
        let mut c = Carousel::new(4);
        assert_eq!(c.select(3), Ok(3));
        assert_eq!(
            c.select(4),
            Err(CarouselError::OutOfRange { index: 4, len: 4 })
        );
        assert_eq!(c.current(), 3);
    }

    #[test]
    fn shrinking_resets_index() {
        let mut c = Carousel::new(5);
        c.select(4).unwrap();
        c.set_len(2);
        assert_eq!(c.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn autoplay_advances_each_interval() {
        let carousel = CarouselHandle::new(3);
        let _autoplay = carousel
            .autoplay(Duration::from_millis(6000))
            .expect("three slides rotate");

        tokio::time::sleep(Duration::from_millis(6001)).await;
        assert_eq!(carousel.current(), 1);

        tokio::time::sleep(Duration::from_millis(12000)).await;
        assert_eq!(carousel.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn single_slide_does_not_rotate() {
        let carousel = CarouselHandle::new(1);
        let changes = carousel.subscribe();
        let _autoplay = carousel
            .autoplay(DEFAULT_AUTOPLAY_INTERVAL)
            .expect("timer starts");
        tokio::time::sleep(DEFAULT_AUTOPLAY_INTERVAL * 3).await;
        assert_eq!(carousel.current(), 0);
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_has_no_autoplay() {
        let carousel = CarouselHandle::new(3);
        assert!(carousel.autoplay(Duration::ZERO).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn shrinking_to_one_slide_pauses_rotation() {
        let carousel = CarouselHandle::new(3);
        let mut changes = carousel.subscribe();
        let autoplay = carousel.autoplay(Duration::from_millis(1000)).unwrap();
        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(carousel.current(), 1);

        carousel.set_len(1);
        assert_eq!(*changes.borrow_and_update(), 0);
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(carousel.current(), 0);
        assert!(!changes.has_changed().unwrap());
        assert!(autoplay.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn growing_past_one_slide_starts_rotation() {
        let carousel = CarouselHandle::new(1);
        let _autoplay = carousel.autoplay(Duration::from_millis(1000)).unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(carousel.current(), 0);

        carousel.set_len(3);
        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(carousel.current(), 1);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(carousel.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_autoplay_stops_rotation() {
        let carousel = CarouselHandle::new(3);
        let autoplay = carousel.autoplay(Duration::from_millis(1000)).unwrap();
        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(carousel.current(), 1);

        drop(autoplay);
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(carousel.current(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_waits_for_timer_task() {
        let carousel = CarouselHandle::new(2);
        let autoplay = carousel.autoplay(Duration::from_millis(1000)).unwrap();
        assert!(autoplay.is_running());
        autoplay.stop().await;
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(carousel.current(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_navigation_shares_index_with_autoplay() {
        let carousel = CarouselHandle::new(3);
        let mut changes = carousel.subscribe();
        let _autoplay = carousel.autoplay(Duration::from_millis(1000)).unwrap();

        carousel.select(2).unwrap();
        assert_eq!(*changes.borrow_and_update(), 2);

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(carousel.current(), 0);
        assert!(changes.has_changed().unwrap());
        assert_eq!(*changes.borrow_and_update(), 0);
    }
}
