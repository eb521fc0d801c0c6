use std::time::Duration;

use looper_lyric::Segment;
use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tracing::{info, trace, warn};

use crate::{
    PlayMode, PlayerEvent, PlayerEventEmitter, PlayerEventReceiver, PlayerEventSender,
    PlayerMessage, PlayerMessageReceiver, PlayerMessageSender, SegmentPlayer, SimulatedClock,
    time_source::TimeSource,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// How often the clock reports progress while playing.
    pub tick_interval_ms: u64,
    pub initial_mode: PlayMode,
    /// Length of the media, if known. The clock stops there.
    pub duration: Option<f64>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            initial_mode: PlayMode::default(),
            duration: None,
        }
    }
}

impl PlayerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Owns a [`SegmentPlayer`] on a [`SimulatedClock`] and drives it from a
/// message channel and a fixed progress tick.
pub struct PlayerRunner {
    player: SegmentPlayer<SimulatedClock>,
    evt_sender: PlayerEventSender,
    msg_sender: PlayerMessageSender,
    msg_receiver: PlayerMessageReceiver,
    evt_receiver: PlayerEventReceiver,
    tick_interval: Duration,
}

impl PlayerRunner {
    pub fn new(config: PlayerConfig, segments: Vec<Segment>) -> Self {
        let (evt_sender, evt_receiver) = tokio::sync::mpsc::unbounded_channel();
        let (msg_sender, msg_receiver) = tokio::sync::mpsc::unbounded_channel();

        info!(
            "player ready with {} segments, mode {:?}",
            segments.len(),
            config.initial_mode
        );

        let clock = SimulatedClock::new(config.duration);
        let player =
            SegmentPlayer::new(segments, clock, evt_sender.clone()).with_mode(config.initial_mode);

        Self {
            player,
            evt_sender,
            msg_sender,
            msg_receiver,
            evt_receiver,
            tick_interval: config.tick_interval(),
        }
    }

    pub fn handle(&self) -> PlayerHandle {
        PlayerHandle::new(self.msg_sender.clone())
    }

    pub fn player(&self) -> &SegmentPlayer<SimulatedClock> {
        &self.player
    }

    fn emitter(&self) -> PlayerEventEmitter {
        // 和 SegmentPlayer 共用同一个事件通道，保证事件顺序
        PlayerEventEmitter::new(self.evt_sender.clone())
    }

    pub async fn run(mut self, on_event: impl Fn(PlayerEvent) + Send + 'static) {
        let mut tick = tokio::time::interval(self.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                msg = self.msg_receiver.recv() => {
                    match msg {
                        Some(PlayerMessage::Close) | None => break,
                        Some(msg) => {
                            if let Err(err) = self.process_message(msg) {
                                warn!("error while processing player message: {err:?}");
                            }
                        }
                    }
                },
                evt = self.evt_receiver.recv() => {
                    if let Some(evt) = evt { on_event(evt); }
                    else { break; }
                }
                _ = tick.tick() => self.tick(),
            }
        }

        while let Ok(evt) = self.evt_receiver.try_recv() {
            on_event(evt);
        }
        info!("player closed");
    }

    pub fn process_message(&mut self, msg: PlayerMessage) -> anyhow::Result<()> {
        match msg {
            PlayerMessage::SelectSegment { index } => self.player.select_segment(index),
            PlayerMessage::SetMode { mode } => self.player.set_mode(mode),
            PlayerMessage::ToggleMode => self.player.toggle_mode(),
            PlayerMessage::SyncStatus => {
                self.emitter()
                    .emit(PlayerEvent::Status(self.player.status()))?;
            }
            PlayerMessage::Close => {}
        }
        Ok(())
    }

    /// Delivers one progress notification to every subscription the clock
    /// still holds.
    fn tick(&mut self) {
        let clock = self.player.time_source();
        if clock.is_paused() {
            return;
        }
        trace!(position = clock.current_time(), "tick");

        let live = clock.active_subscriptions().to_vec();
        for id in live {
            self.player.on_progress(id);
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerHandle {
    msg_sender: PlayerMessageSender,
}

impl PlayerHandle {
    pub(crate) fn new(msg_sender: PlayerMessageSender) -> Self {
        Self { msg_sender }
    }

    pub fn send(&self, msg: PlayerMessage) -> anyhow::Result<()> {
        self.msg_sender.send(msg)?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.msg_sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlayerStatus;
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn segments() -> Vec<Segment> {
        looper_lyric::parse_lrc("[00:00.00]a\n[00:01.00]b")
    }

    fn spawn(
        config: PlayerConfig,
    ) -> (
        PlayerHandle,
        UnboundedReceiver<PlayerEvent>,
        tokio::task::JoinHandle<()>,
    ) {
        let runner = PlayerRunner::new(config, segments());
        let handle = runner.handle();
        let (tx, rx) = unbounded_channel();
        let task = tokio::spawn(runner.run(move |evt| {
            let _ = tx.send(evt);
        }));
        (handle, rx, task)
    }

    #[test]
    fn config_defaults_and_partial_json() {
        let config: PlayerConfig = serde_json::from_str(r#"{"initialMode":"continuous"}"#).unwrap();
        assert_eq!(config.initial_mode, PlayMode::Continuous);
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
        assert_eq!(config.duration, None);

        let zero = PlayerConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(zero.tick_interval(), Duration::from_millis(1));
    }

    #[tokio::test(start_paused = true)]
    async fn continuous_playback_runs_to_the_end() {
        let (handle, mut rx, task) = spawn(PlayerConfig {
            initial_mode: PlayMode::Continuous,
            ..Default::default()
        });

        handle
            .send(PlayerMessage::SelectSegment { index: 0 })
            .unwrap();
        assert_eq!(rx.recv().await, Some(PlayerEvent::Highlight { index: 0 }));
        assert_eq!(rx.recv().await, Some(PlayerEvent::Highlight { index: 1 }));
        assert_eq!(rx.recv().await, Some(PlayerEvent::Finished { index: 1 }));

        handle.send(PlayerMessage::SyncStatus).unwrap();
        match rx.recv().await {
            Some(PlayerEvent::Status(PlayerStatus {
                current_index,
                is_playing,
                position,
                ..
            })) => {
                assert_eq!(current_index, Some(1));
                assert!(!is_playing);
                assert!(position >= 6.0);
            }
            other => panic!("unexpected event {other:?}"),
        }

        handle.send(PlayerMessage::Close).unwrap();
        task.await.unwrap();
        assert!(handle.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn repeat_playback_loops_segment() {
        let (handle, mut rx, task) = spawn(PlayerConfig::default());

        handle
            .send(PlayerMessage::SelectSegment { index: 1 })
            .unwrap();
        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(PlayerEvent::Highlight { index: 1 }));
        }

        handle.send(PlayerMessage::ToggleMode).unwrap();
        assert_eq!(
            rx.recv().await,
            Some(PlayerEvent::ModeChanged {
                mode: PlayMode::Continuous
            })
        );
        assert_eq!(rx.recv().await, Some(PlayerEvent::Finished { index: 1 }));

        handle.send(PlayerMessage::Close).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn out_of_range_selection_emits_nothing() {
        let (handle, mut rx, task) = spawn(PlayerConfig::default());

        handle
            .send(PlayerMessage::SelectSegment { index: 7 })
            .unwrap();
        handle.send(PlayerMessage::SyncStatus).unwrap();
        assert_eq!(
            rx.recv().await,
            Some(PlayerEvent::Status(PlayerStatus {
                current_index: None,
                mode: PlayMode::Repeat,
                is_playing: false,
                position: 0.0,
                segment_count: 2,
            }))
        );

        handle.send(PlayerMessage::Close).unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn clock_end_stops_progress() {
        let (handle, mut rx, task) = spawn(PlayerConfig {
            duration: Some(1.5),
            ..Default::default()
        });

        handle
            .send(PlayerMessage::SelectSegment { index: 1 })
            .unwrap();
        assert_eq!(rx.recv().await, Some(PlayerEvent::Highlight { index: 1 }));

        tokio::time::sleep(Duration::from_secs(10)).await;
        handle.send(PlayerMessage::SyncStatus).unwrap();
        match rx.recv().await {
            Some(PlayerEvent::Status(status)) => {
                assert_eq!(status.position, 1.5);
                assert!(!status.is_playing);
            }
            other => panic!("unexpected event {other:?}"),
        }

        handle.send(PlayerMessage::Close).unwrap();
        task.await.unwrap();
    }
}
