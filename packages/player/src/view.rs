use std::fmt::Write;

use looper_lyric::format_lrc_time;
use looper_player_core::{PlayMode, PlayerEvent, Segment};

/// Terminal stand-in for the lyric list: one row per segment, at most one
/// of them marked active.
pub struct LyricView {
    segments: Vec<Segment>,
    active: Option<usize>,
}

fn mode_name(mode: PlayMode) -> &'static str {
    match mode {
        PlayMode::Repeat => "repeat",
        PlayMode::Continuous => "continuous",
    }
}

impl LyricView {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            active: None,
        }
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    fn row(&self, index: usize, segment: &Segment) -> String {
        let marker = if self.active == Some(index) { '>' } else { ' ' };
        format!(
            "{marker} {index:>3}  [{} - {}]  {}",
            format_lrc_time(segment.start),
            format_lrc_time(segment.end),
            segment.text
        )
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, segment) in self.segments.iter().enumerate() {
            let _ = writeln!(out, "{}", self.row(i, segment));
        }
        out
    }

    /// Applies a player event and returns what should be printed for it.
    pub fn apply(&mut self, evt: &PlayerEvent) -> Option<String> {
        match evt {
            PlayerEvent::Highlight { index } => {
                let segment = self.segments.get(*index)?;
                self.active = Some(*index);
                Some(self.row(*index, segment))
            }
            PlayerEvent::ModeChanged { mode } => Some(format!("mode: {}", mode_name(*mode))),
            PlayerEvent::Finished { index } => Some(format!("finished after segment {index}")),
            PlayerEvent::Status(status) => Some(format!(
                "segment {} of {}, {} at {}, mode {}",
                status
                    .current_index
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "-".into()),
                status.segment_count,
                if status.is_playing { "playing" } else { "paused" },
                format_lrc_time(status.position),
                mode_name(status.mode)
            )),
        }
    }
}
