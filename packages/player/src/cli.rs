use clap::Parser;
use looper_player_core::{PlayMode, PlayerConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "looper-player")]
#[command(version, about = "Loop or step through the lines of an LRC file")]
pub struct Cli {
    /// Timed lyric file to load
    #[arg(required = true)]
    pub file: PathBuf,

    /// Advance through all segments instead of repeating the selected one
    #[arg(short, long)]
    pub continuous: bool,

    /// Progress tick interval in milliseconds
    #[arg(long, default_value = "16")]
    pub tick_ms: u64,

    /// Media length in seconds; playback stops there
    #[arg(long)]
    pub duration: Option<f64>,

    /// Segment to start playing right away
    #[arg(long)]
    pub start: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn player_config(&self) -> PlayerConfig {
        PlayerConfig {
            tick_interval_ms: self.tick_ms,
            initial_mode: if self.continuous {
                PlayMode::Continuous
            } else {
                PlayMode::Repeat
            },
            duration: self.duration,
        }
    }
}
