use looper_lyric::Segment;
use tracing::{debug, trace, warn};

use crate::{
    PlayMode, PlayerEvent, PlayerEventEmitter, PlayerEventSender, PlayerStatus,
    time_source::{SubscriptionId, TimeSource},
};

/// The progress subscription that watches one segment's end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSubscription {
    pub id: SubscriptionId,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    /// `None` until a segment has been selected.
    pub current_index: Option<usize>,
    pub mode: PlayMode,
    /// At most one subscription is live at any time.
    pub subscription: Option<ProgressSubscription>,
}

/// Plays one segment at a time against a [`TimeSource`].
///
/// Every activation cancels the previous progress subscription before it
/// seeks, so a notification meant for an earlier segment can never end the
/// current one.
pub struct SegmentPlayer<S: TimeSource> {
    segments: Vec<Segment>,
    source: S,
    state: PlaybackState,
    emitter: PlayerEventEmitter,
}

impl<S: TimeSource> SegmentPlayer<S> {
    pub fn new(segments: Vec<Segment>, source: S, evt_sender: PlayerEventSender) -> Self {
        Self {
            segments,
            source,
            state: PlaybackState::default(),
            emitter: PlayerEventEmitter::new(evt_sender),
        }
    }

    pub fn with_mode(mut self, mode: PlayMode) -> Self {
        self.state.mode = mode;
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.current_index
    }

    pub fn mode(&self) -> PlayMode {
        self.state.mode
    }

    pub fn live_subscription(&self) -> Option<ProgressSubscription> {
        self.state.subscription
    }

    pub fn time_source(&self) -> &S {
        &self.source
    }

    pub fn time_source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn status(&self) -> PlayerStatus {
        PlayerStatus {
            current_index: self.state.current_index,
            mode: self.state.mode,
            is_playing: !self.source.is_paused(),
            position: self.source.current_time(),
            segment_count: self.segments.len(),
        }
    }

    fn emit(&self, evt: PlayerEvent) {
        if let Err(err) = self.emitter.emit(evt) {
            warn!("failed to emit player event: {err:?}");
        }
    }

    fn highlight(&self, index: usize) {
        self.emit(PlayerEvent::Highlight { index });
    }

    fn cancel_subscription(&mut self) {
        if let Some(sub) = self.state.subscription.take() {
            self.source.unsubscribe(sub.id);
        }
    }

    /// Handles the user picking segment `index`.
    ///
    /// Picking the current segment toggles play/pause in place. Picking any
    /// other segment makes it current and plays it from its start. Indices
    /// outside the segment list are ignored.
    pub fn select_segment(&mut self, index: usize) {
        if index >= self.segments.len() {
            debug!(index, len = self.segments.len(), "ignoring out of range selection");
            return;
        }

        if self.state.current_index == Some(index) {
            if self.source.is_paused() {
                self.source.play();
            } else {
                self.source.pause();
            }
        } else {
            self.state.current_index = Some(index);
            self.activate(index);
        }

        self.highlight(index);
    }

    /// Seeks to the start of segment `index`, starts playing and installs a
    /// fresh progress subscription for its end. Out of range is a no-op.
    pub fn activate(&mut self, index: usize) {
        let Some(segment) = self.segments.get(index) else {
            return;
        };
        let start = segment.start;

        self.cancel_subscription();

        self.source.pause();
        self.source.set_current_time(start);
        self.source.play();

        let id = self.source.subscribe();
        self.state.subscription = Some(ProgressSubscription { id, index });
        debug!(index, start, ?id, "activated segment");
    }

    /// Progress notification from the time source.
    ///
    /// Returns `true` when the notification crossed the watched segment's
    /// end and was acted on. Notifications for any subscription other than
    /// the live one are dropped.
    pub fn on_progress(&mut self, id: SubscriptionId) -> bool {
        let Some(sub) = self.state.subscription.filter(|sub| sub.id == id) else {
            trace!(?id, "dropping notification for stale subscription");
            return false;
        };
        let Some(end) = self.segments.get(sub.index).map(|s| s.end) else {
            return false;
        };

        if self.source.current_time() < end {
            return false;
        }

        self.source.pause();
        self.cancel_subscription();

        match self.state.mode {
            PlayMode::Continuous => {
                let next = sub.index + 1;
                if next < self.segments.len() {
                    self.state.current_index = Some(next);
                    self.activate(next);
                    self.highlight(next);
                } else {
                    debug!(index = sub.index, "reached end of last segment");
                    self.emit(PlayerEvent::Finished { index: sub.index });
                }
            }
            PlayMode::Repeat => {
                self.activate(sub.index);
                self.highlight(sub.index);
            }
        }
        true
    }

    /// Notifies the live subscription, if any.
    pub fn poll_progress(&mut self) -> bool {
        match self.state.subscription {
            Some(sub) => self.on_progress(sub.id),
            None => false,
        }
    }

    /// Only affects what happens at the next segment end.
    pub fn set_mode(&mut self, mode: PlayMode) {
        self.state.mode = mode;
        self.emit(PlayerEvent::ModeChanged { mode });
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.state.mode.toggled());
    }
}
