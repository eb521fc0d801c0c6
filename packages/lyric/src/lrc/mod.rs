mod read;
mod write;

pub use read::{parse_lrc, parse_lrc_timestamp};
pub use write::{format_lrc_time, stringify_lrc};
