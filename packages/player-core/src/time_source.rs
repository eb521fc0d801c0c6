use serde::{Deserialize, Serialize};

/// Handle to one progress subscription on a [`TimeSource`].
#[derive(Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone, Copy, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// The media element a [`crate::SegmentPlayer`] drives.
///
/// The source owns the playback position and the play/pause state. It
/// notifies subscribers of progress by calling
/// [`crate::SegmentPlayer::on_progress`] with the id returned from
/// [`TimeSource::subscribe`]; once an id has been passed to
/// [`TimeSource::unsubscribe`] it must not be notified again.
pub trait TimeSource {
    /// Current playback position in seconds.
    fn current_time(&self) -> f64;
    /// Seeks to `position` seconds without changing the play state.
    fn set_current_time(&mut self, position: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn subscribe(&mut self) -> SubscriptionId;
    fn unsubscribe(&mut self, id: SubscriptionId);
}

impl<T: TimeSource + ?Sized> TimeSource for Box<T> {
    fn current_time(&self) -> f64 {
        (**self).current_time()
    }

    fn set_current_time(&mut self, position: f64) {
        (**self).set_current_time(position)
    }

    fn play(&mut self) {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn is_paused(&self) -> bool {
        (**self).is_paused()
    }

    fn subscribe(&mut self) -> SubscriptionId {
        (**self).subscribe()
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        (**self).unsubscribe(id)
    }
}
