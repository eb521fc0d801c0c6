use tokio::time::Instant;

use crate::time_source::{SubscriptionId, TimeSource};

/// A media clock with no audio behind it.
///
/// While playing, the position is the base position plus the time elapsed
/// since playback last (re)started. Reaching `duration` behaves like a media
/// element ending: the position stops there and the clock reports paused.
#[derive(Debug)]
pub struct SimulatedClock {
    base_time: f64,
    playing_since: Option<Instant>,
    duration: Option<f64>,
    next_id: u64,
    subscriptions: Vec<SubscriptionId>,
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SimulatedClock {
    pub fn new(duration: Option<f64>) -> Self {
        Self {
            base_time: 0.0,
            playing_since: None,
            duration,
            next_id: 0,
            subscriptions: Vec::new(),
        }
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn clamp(&self, position: f64) -> f64 {
        let position = position.max(0.0);
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.duration
            .is_some_and(|duration| self.current_time() >= duration)
    }

    /// Moves the position forward by `secs` regardless of the play state.
    pub fn advance_by(&mut self, secs: f64) {
        self.base_time = self.clamp(self.base_time + secs);
    }

    /// Subscriptions that have not been cancelled, oldest first.
    pub fn active_subscriptions(&self) -> &[SubscriptionId] {
        &self.subscriptions
    }
}

impl TimeSource for SimulatedClock {
    fn current_time(&self) -> f64 {
        let elapsed = self
            .playing_since
            .map(|since| since.elapsed().as_secs_f64())
            .unwrap_or_default();
        self.clamp(self.base_time + elapsed)
    }

    fn set_current_time(&mut self, position: f64) {
        self.base_time = self.clamp(position);
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn play(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.base_time = self.current_time();
        self.playing_since = None;
    }

    fn is_paused(&self) -> bool {
        self.playing_since.is_none() || self.is_ended()
    }

    fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(id);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.retain(|x| *x != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn clock_advances_only_while_playing() {
        let mut clock = SimulatedClock::new(None);
        assert!(clock.is_paused());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(clock.current_time(), 0.0);

        clock.play();
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert_eq!(clock.current_time(), 1.5);

        clock.pause();
        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(clock.current_time(), 1.5);
        assert!(clock.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn seek_keeps_play_state() {
        let mut clock = SimulatedClock::new(None);
        clock.play();
        tokio::time::advance(Duration::from_secs(2)).await;
        clock.set_current_time(10.0);
        assert_eq!(clock.current_time(), 10.0);
        assert!(!clock.is_paused());

        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(clock.current_time(), 10.5);
    }

    #[tokio::test(start_paused = true)]
    async fn clock_stops_at_duration() {
        let mut clock = SimulatedClock::new(Some(3.0));
        clock.set_current_time(2.0);
        clock.play();
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(clock.current_time(), 3.0);
        assert!(clock.is_ended());
        assert!(clock.is_paused());

        clock.set_current_time(-4.0);
        assert_eq!(clock.current_time(), 0.0);
    }

    #[test]
    fn subscriptions_are_unique_and_cancellable() {
        let mut clock = SimulatedClock::default();
        let a = clock.subscribe();
        let b = clock.subscribe();
        assert_ne!(a, b);
        assert_eq!(clock.active_subscriptions(), &[a, b]);

        clock.unsubscribe(a);
        assert_eq!(clock.active_subscriptions(), &[b]);

        // 重复取消不会出错
        clock.unsubscribe(a);
        clock.unsubscribe(b);
        assert!(clock.active_subscriptions().is_empty());

        let c = clock.subscribe();
        assert!(c > b);
    }

    #[test]
    fn advance_by_moves_paused_clock() {
        let mut clock = SimulatedClock::new(Some(4.0));
        clock.advance_by(1.25);
        assert_eq!(clock.current_time(), 1.25);
        clock.advance_by(10.0);
        assert_eq!(clock.current_time(), 4.0);
    }
}
