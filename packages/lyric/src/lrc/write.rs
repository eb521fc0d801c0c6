use std::fmt::Write;

use crate::Segment;

/// Formats seconds as `MM:SS.ff`, rounded to the nearest centisecond.
/// Negative times are written as zero.
pub fn format_lrc_time(time: f64) -> String {
    let centis = (time.max(0.0) * 100.0).round() as u64;
    let minutes = centis / 6000;
    let seconds = (centis / 100) % 60;
    let fraction = centis % 100;
    format!("{minutes:02}:{seconds:02}.{fraction:02}")
}

fn write_timestamp(result: &mut String, time: f64) {
    let _ = write!(result, "[{}]", format_lrc_time(time));
}

/// Writes segments back out as LRC, one `[MM:SS.ff]text` line per segment.
///
/// End times are not stored; they are implied by the following line.
pub fn stringify_lrc(segments: &[Segment]) -> String {
    let capacity = segments.iter().map(|s| s.text.len() + 11).sum();
    let mut result = String::with_capacity(capacity);

    for segment in segments {
        write_timestamp(&mut result, segment.start);
        result.push_str(&segment.text);
        result.push('\n');
    }

    result
}

#[test]
fn test_stringify_lrc() {
    let segments = vec![
        Segment::new(0.0, 5.0, "b"),
        Segment::new(5.0, 62.5, "a"),
        Segment::new(62.5, 67.5, ""),
    ];
    assert_eq!(
        stringify_lrc(&segments),
        "[00:00.00]b\n[00:05.00]a\n[01:02.50]\n"
    );
}

#[test]
fn test_stringify_then_parse() {
    let src = "[00:12.00]one\n[00:17.20]two\n[03:01.05]three\n";
    let segments = crate::lrc::parse_lrc(src);
    assert_eq!(stringify_lrc(&segments), src);
}

#[test]
fn test_format_lrc_time() {
    assert_eq!(format_lrc_time(0.0), "00:00.00");
    assert_eq!(format_lrc_time(62.5), "01:02.50");
    assert_eq!(format_lrc_time(-3.0), "00:00.00");
    assert_eq!(format_lrc_time(6000.0), "100:00.00");
}

#[test]
fn test_stringify_rounds_to_centis() {
    let segments = vec![Segment::new(59.996, 65.0, "x")];
    assert_eq!(stringify_lrc(&segments), "[01:00.00]x\n");
}
