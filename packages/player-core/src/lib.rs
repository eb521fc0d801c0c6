pub mod clock;
pub mod player;
pub mod segment_player;
pub mod time_source;

pub use clock::SimulatedClock;
pub use looper_lyric::Segment;
pub use player::{PlayerConfig, PlayerHandle, PlayerRunner};
pub use segment_player::{PlaybackState, ProgressSubscription, SegmentPlayer};
pub use time_source::{SubscriptionId, TimeSource};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub type PlayerEventSender = UnboundedSender<PlayerEvent>;
pub type PlayerEventReceiver = UnboundedReceiver<PlayerEvent>;
pub type PlayerMessageSender = UnboundedSender<PlayerMessage>;
pub type PlayerMessageReceiver = UnboundedReceiver<PlayerMessage>;

/// What happens when playback reaches the end of the active segment.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlayMode {
    /// Replay the same segment from its start.
    #[default]
    Repeat,
    /// Move on to the next segment, stopping after the last one.
    Continuous,
}

impl PlayMode {
    pub fn toggled(self) -> Self {
        match self {
            PlayMode::Repeat => PlayMode::Continuous,
            PlayMode::Continuous => PlayMode::Repeat,
        }
    }
}

/// Requests sent from the presentation side to the player.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PlayerMessage {
    /// The user picked a segment.
    SelectSegment { index: usize },
    SetMode { mode: PlayMode },
    ToggleMode,
    /// Ask for a [`PlayerEvent::Status`] snapshot.
    SyncStatus,
    Close,
}

/// Signals sent from the player to the presentation side.
#[derive(Serialize, Deserialize, PartialEq, Debug, Clone)]
#[serde(rename_all = "camelCase", tag = "type", content = "value")]
pub enum PlayerEvent {
    /// Exactly one segment should be shown as active.
    Highlight { index: usize },
    ModeChanged { mode: PlayMode },
    /// Continuous playback ran past the end of the last segment.
    Finished { index: usize },
    Status(PlayerStatus),
}

#[derive(Serialize, Deserialize, PartialEq, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatus {
    pub current_index: Option<usize>,
    pub mode: PlayMode,
    pub is_playing: bool,
    pub position: f64,
    pub segment_count: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct PlayerEventEmitter {
    evt_sender: PlayerEventSender,
}

impl PlayerEventEmitter {
    pub(crate) fn new(evt_sender: PlayerEventSender) -> Self {
        Self { evt_sender }
    }

    pub fn emit(&self, evt: PlayerEvent) -> anyhow::Result<()> {
        self.evt_sender.send(evt)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_wire_shape() {
        let msg = PlayerMessage::SelectSegment { index: 3 };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"selectSegment","index":3}"#);

        let parsed: PlayerMessage =
            serde_json::from_str(r#"{"type":"setMode","mode":"continuous"}"#).unwrap();
        assert_eq!(
            parsed,
            PlayerMessage::SetMode {
                mode: PlayMode::Continuous
            }
        );

        let parsed: PlayerMessage = serde_json::from_str(r#"{"type":"toggleMode"}"#).unwrap();
        assert_eq!(parsed, PlayerMessage::ToggleMode);
    }

    #[test]
    fn event_wire_shape() {
        let evt = PlayerEvent::Highlight { index: 1 };
        assert_eq!(
            serde_json::to_value(&evt).unwrap(),
            serde_json::json!({ "type": "highlight", "value": { "index": 1 } })
        );

        let evt = PlayerEvent::Status(PlayerStatus {
            current_index: None,
            mode: PlayMode::Repeat,
            is_playing: false,
            position: 0.0,
            segment_count: 2,
        });
        assert_eq!(
            serde_json::to_value(&evt).unwrap(),
            serde_json::json!({
                "type": "status",
                "value": {
                    "currentIndex": null,
                    "mode": "repeat",
                    "isPlaying": false,
                    "position": 0.0,
                    "segmentCount": 2
                }
            })
        );
    }

    #[test]
    fn mode_toggles() {
        assert_eq!(PlayMode::default(), PlayMode::Repeat);
        assert_eq!(PlayMode::Repeat.toggled(), PlayMode::Continuous);
        assert_eq!(PlayMode::Continuous.toggled(), PlayMode::Repeat);
    }
}
