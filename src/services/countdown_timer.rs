use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use tokio::{
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
    time::{self, Duration, Instant},
};

/// Emitted by a running countdown. Each event carries the generation of the
/// `start` call that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { generation: u64, remaining: u32 },
    Timeout { generation: u64 },
}

impl TimerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            TimerEvent::Tick { generation, .. } | TimerEvent::Timeout { generation } => *generation,
        }
    }
}

/// A single one-second-resolution countdown.
///
/// Starting a new countdown stops the previous one, and both `start` and a
/// `stop` of a live countdown advance the generation, so events still queued
/// from an earlier countdown can be told apart from current ones.
pub struct CountdownTimer {
    events: UnboundedSender<TimerEvent>,
    generation: u64,
    remaining: Arc<AtomicU32>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTimer {
    pub fn new(events: UnboundedSender<TimerEvent>) -> Self {
        Self {
            events,
            generation: 0,
            remaining: Arc::new(AtomicU32::new(0)),
            handle: None,
        }
    }

    /// Starts counting down from `duration_seconds` and returns the new generation.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, duration_seconds: u32) -> u64 {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let events = self.events.clone();
        let remaining = Arc::clone(&self.remaining);
        remaining.store(duration_seconds, Ordering::SeqCst);

        self.handle = Some(tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut interval = time::interval_at(Instant::now() + period, period);
            let mut left = duration_seconds;

            while left > 0 {
                interval.tick().await;
                left -= 1;
                remaining.store(left, Ordering::SeqCst);

                if events
                    .send(TimerEvent::Tick {
                        generation,
                        remaining: left,
                    })
                    .is_err()
                {
                    return;
                }
            }

            let _ = events.send(TimerEvent::Timeout { generation });
        }));

        generation
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            self.generation += 1;
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining.load(Ordering::SeqCst)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, event: &TimerEvent) -> bool {
        event.generation() == self.generation
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn counts_down_then_times_out_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new(tx);

        let generation = timer.start(3);
        assert!(timer.is_running());
        assert_eq!(timer.remaining_seconds(), 3);

        for remaining in [2, 1, 0] {
            assert_eq!(
                rx.recv().await,
                Some(TimerEvent::Tick {
                    generation,
                    remaining
                })
            );
        }
        assert_eq!(rx.recv().await, Some(TimerEvent::Timeout { generation }));

        time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
        assert!(!timer.is_running());
        assert_eq!(timer.remaining_seconds(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_arrive_one_second_apart() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new(tx);
        let started = Instant::now();

        timer.start(60);
        rx.recv().await.expect("first tick");
        assert_eq!(started.elapsed(), Duration::from_secs(1));

        rx.recv().await.expect("second tick");
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_delivery_and_is_idempotent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new(tx);

        let generation = timer.start(5);
        assert_eq!(
            rx.recv().await,
            Some(TimerEvent::Tick {
                generation,
                remaining: 4
            })
        );

        timer.stop();
        let after_stop = timer.generation();
        assert_ne!(after_stop, generation);

        timer.stop();
        assert_eq!(timer.generation(), after_stop);

        time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_countdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new(tx);

        let first = timer.start(5);
        let event = rx.recv().await.expect("tick from first countdown");
        assert_eq!(event.generation(), first);

        let second = timer.start(2);
        assert_ne!(first, second);
        assert!(!timer.is_current(&event));

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push(event);
            if matches!(event, TimerEvent::Timeout { .. }) {
                break;
            }
        }

        assert_eq!(
            received,
            vec![
                TimerEvent::Tick {
                    generation: second,
                    remaining: 1
                },
                TimerEvent::Tick {
                    generation: second,
                    remaining: 0
                },
                TimerEvent::Timeout { generation: second },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_times_out_without_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = CountdownTimer::new(tx);

        let generation = timer.start(0);

        assert_eq!(rx.recv().await, Some(TimerEvent::Timeout { generation }));
    }
}
