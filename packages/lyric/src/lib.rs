//! 时间轴歌词解析模块
//!
//! Parses timestamped lyric text into an ordered list of [`Segment`]s whose
//! boundaries tile the timeline without gaps or overlaps.

#[cfg(feature = "lrc")]
pub mod lrc;

#[cfg(feature = "load")]
pub mod load;

#[cfg(feature = "lrc")]
pub use lrc::{format_lrc_time, parse_lrc, stringify_lrc};

#[cfg(feature = "load")]
pub use load::{LoadError, load_lrc, read_lrc};

/// Length given to the last segment, which has no successor to bound it.
pub const DEFAULT_TAIL: f64 = 5.0;

/// One timed line of text. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[cfg(all(test, feature = "serde"))]
#[test]
fn test_segment_serde_shape() {
    let seg = Segment::new(1.5, 3.0, "hello");
    let json = serde_json::to_value(&seg).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "start": 1.5, "end": 3.0, "text": "hello" })
    );
    assert_eq!(seg.duration(), 1.5);
}
